use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use log::debug;
use crate::error::StoreError;
use crate::recency::RecencyStore;

#[derive(Serialize, Deserialize, Default)]
struct History {
    #[serde(default)]
    recent: Vec<String>,
}

pub fn get_history_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "quickrun", "quickrun")
        .map(|dirs| dirs.data_dir().join("history.json"))
}

/// Recency list kept as JSON on disk.
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the per-user data directory, if one can be determined.
    pub fn default_location() -> Option<Self> {
        get_history_path().map(Self::new)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io { path: self.path.clone(), source }
    }
}

impl RecencyStore for JsonHistoryStore {
    fn load(&self) -> Result<Vec<String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No history at {:?}", self.path);
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };
        let history: History = serde_json::from_str(&content)?;
        Ok(history.recent)
    }

    fn save(&self, ids: &[String]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let history = History { recent: ids.to_vec() };
        let content = serde_json::to_string_pretty(&history)?;
        fs::write(&self.path, content).map_err(|e| self.io_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_creates_directories() {
        let dir = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("nested/data/history.json"));
        store.save(&["/a".to_string(), "/b".to_string()]).unwrap();
        assert_eq!(store.load().unwrap(), vec!["/a", "/b"]);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json").unwrap();
        let store = JsonHistoryStore::new(path);
        assert!(matches!(store.load(), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_tracker_survives_corrupt_file() {
        use crate::recency::RecencyTracker;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "[1, 2").unwrap();

        let mut tracker = RecencyTracker::new(Box::new(JsonHistoryStore::new(path.clone())), 4);
        assert!(tracker.current_list().is_empty());
        tracker.record_use("/a");

        let reloaded = JsonHistoryStore::new(path);
        assert_eq!(reloaded.load().unwrap(), vec!["/a"]);
    }
}
