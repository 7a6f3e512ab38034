use crate::config::StaticEntry;
use crate::model::CatalogEntry;
use crate::sources::Source;
use anyhow::Result;
use log::info;

pub const CUSTOM_PREFIX: &str = "custom:";

pub fn custom_id(name: &str) -> String {
    format!("{CUSTOM_PREFIX}{name}")
}

/// Items declared directly in a launch group.
pub struct StaticSource {
    items: Vec<StaticEntry>,
}

impl StaticSource {
    pub fn new(items: Vec<StaticEntry>) -> Self {
        Self { items }
    }
}

impl Source for StaticSource {
    fn scan(&self) -> Result<Vec<CatalogEntry>> {
        let entries: Vec<CatalogEntry> = self.items
            .iter()
            .map(|item| CatalogEntry::new(custom_id(&item.name), item.name.clone(), item.category.clone()))
            .collect();
        info!("StaticSource: {} entries", entries.len());
        Ok(entries)
    }
}
