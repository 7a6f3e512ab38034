use crate::model::CatalogEntry;
use log::{debug, warn};
use std::collections::{BTreeMap, HashSet};

/// A titled block of entries in the idle view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub entries: Vec<CatalogEntry>,
}

/// The set of entries from one scan, sorted by name (case-insensitive).
///
/// Entries are never mutated; a refresh replaces the whole catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Builds a catalog, dropping later entries whose `id` was already seen.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut seen = HashSet::new();
        let supplied = entries.len();
        let mut entries: Vec<CatalogEntry> = entries
            .into_iter()
            .filter(|entry| {
                let fresh = seen.insert(entry.id.clone());
                if !fresh {
                    warn!("Catalog: dropping duplicate id {:?}", entry.id);
                }
                fresh
            })
            .collect();

        // Stable, so entries with equal folded names keep supplied order
        entries.sort_by_cached_key(|entry| entry.name.to_lowercase());

        debug!("Catalog: {} entries ({} supplied)", entries.len(), supplied);
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Buckets every entry not in `exclude` by category.
    ///
    /// Blank category labels are dropped. Sections are ordered by ordinal
    /// label comparison and keep the catalog's alphabetical order inside.
    pub fn group_by_category(&self, exclude: &HashSet<&str>) -> Vec<Section> {
        let mut buckets: BTreeMap<&str, Vec<CatalogEntry>> = BTreeMap::new();

        for entry in &self.entries {
            if exclude.contains(entry.id.as_str()) || entry.category.trim().is_empty() {
                continue;
            }
            buckets.entry(entry.category.as_str()).or_default().push(entry.clone());
        }

        buckets
            .into_iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(title, entries)| Section {
                title: title.to_string(),
                entries,
            })
            .collect()
    }
}
