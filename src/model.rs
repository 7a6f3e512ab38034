/// One launchable item as handed to the ranking engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogEntry {
    pub id: String,       // Stable unique ID (e.g. "/usr/share/applications/firefox.desktop")
    pub name: String,     // Display name
    pub category: String, // Free-form section label, may be empty
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
        }
    }
}

/// An entry paired with its fuzzy match score. Only lives while ranking.
#[derive(Debug, Clone)]
pub struct ScoredResult {
    pub entry: CatalogEntry,
    pub score: i64,
}
