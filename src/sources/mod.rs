use crate::config::LaunchGroup;
use crate::model::CatalogEntry;
use anyhow::Result;
use log::{info, warn};
use regex::Regex;
use std::sync::Arc;
use std::thread;

pub trait Source: Send + Sync {
    fn scan(&self) -> Result<Vec<CatalogEntry>>;
}

pub mod custom;
pub mod desktop;
pub mod history;

/// A launch group's blacklist/whitelist rules.
#[derive(Debug, Default)]
pub struct EntryFilter {
    blacklist: Vec<Regex>,
    whitelist: Option<Vec<String>>,
}

impl EntryFilter {
    pub fn from_group(group: &LaunchGroup) -> Self {
        let blacklist = group.blacklist.as_ref()
            .map(|bl| bl.iter().filter_map(|s| match Regex::new(s) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Ignoring invalid blacklist pattern {:?}: {}", s, e);
                    None
                }
            }).collect())
            .unwrap_or_default();

        Self {
            blacklist,
            whitelist: group.whitelist.clone(),
        }
    }

    pub fn allows(&self, entry: &CatalogEntry) -> bool {
        if let Some(whitelist) = &self.whitelist {
            if !whitelist.iter().any(|w| entry.name.contains(w) || entry.id.contains(w)) {
                return false;
            }
        }
        !self.blacklist.iter().any(|re| re.is_match(&entry.name) || re.is_match(&entry.id))
    }
}

/// Runs every source of a launch group and merges their entries.
pub struct CatalogSupplier {
    sources: Vec<Box<dyn Source>>,
    filter: EntryFilter,
}

impl CatalogSupplier {
    pub fn new(sources: Vec<Box<dyn Source>>, filter: EntryFilter) -> Self {
        Self { sources, filter }
    }

    pub fn for_group(group: &LaunchGroup) -> Self {
        let mut sources: Vec<Box<dyn Source>> = Vec::new();

        if !group.items.is_empty() {
            sources.push(Box::new(custom::StaticSource::new(group.items.clone())));
        }
        for name in &group.sources {
            match name.as_str() {
                "desktop" => sources.push(Box::new(desktop::DesktopSource::system())),
                other => warn!("Unknown source {:?}, skipping", other),
            }
        }

        Self::new(sources, EntryFilter::from_group(group))
    }

    /// Failing sources are logged and contribute nothing.
    pub fn refresh(&self) -> Vec<CatalogEntry> {
        let mut entries = Vec::new();
        for source in &self.sources {
            match source.scan() {
                Ok(mut e) => entries.append(&mut e),
                Err(e) => warn!("Source scan failed: {:#}", e),
            }
        }
        entries.retain(|e| self.filter.allows(e));
        info!("CatalogSupplier: {} entries after filtering", entries.len());
        entries
    }

    /// Refreshes on a worker thread and delivers the result over `tx`.
    pub fn spawn_refresh(self: &Arc<Self>, tx: &calloop::channel::Sender<Vec<CatalogEntry>>) {
        let supplier = Arc::clone(self);
        let tx = tx.clone();
        thread::spawn(move || {
            let entries = supplier.refresh();
            if tx.send(entries).is_err() {
                warn!("Catalog receiver closed before refresh finished");
            }
        });
    }
}
