use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use directories::ProjectDirs;
use anyhow::{Context, Result};
use std::fs;
use crate::recency::DEFAULT_RECENT_LIMIT;

pub const DEFAULT_GROUP: &str = "default";

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub groups: HashMap<String, LaunchGroup>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub terminal: Option<String>,
}

fn default_recent_limit() -> usize { DEFAULT_RECENT_LIMIT }
fn default_debounce_ms() -> u64 { 100 }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
            debounce_ms: default_debounce_ms(),
            terminal: None,
        }
    }
}

impl GeneralConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct LaunchGroup {
    #[serde(default)]
    pub sources: Vec<String>,
    pub env: Option<HashMap<String, String>>,
    pub blacklist: Option<Vec<String>>,
    pub whitelist: Option<Vec<String>>,
    #[serde(default)]
    pub items: Vec<StaticEntry>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct StaticEntry {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub terminal: bool,
}

impl Default for Config {
    fn default() -> Self {
        let mut groups = HashMap::new();
        groups.insert(DEFAULT_GROUP.to_string(), LaunchGroup {
            sources: vec!["desktop".to_string()],
            env: None,
            blacklist: None,
            whitelist: None,
            items: vec![],
        });

        Self {
            general: GeneralConfig::default(),
            groups,
        }
    }
}

impl Config {
    /// Resolves a requested group name, falling back to the default group.
    pub fn resolve_group(&self, requested: &str) -> (String, LaunchGroup) {
        let name = if self.groups.contains_key(requested) {
            requested.to_string()
        } else {
            log::warn!("Unknown group {:?}, using {:?}", requested, DEFAULT_GROUP);
            DEFAULT_GROUP.to_string()
        };
        let group = self.groups.get(&name).cloned().unwrap_or_default();
        (name, group)
    }
}

pub fn config_path() -> PathBuf {
    let proj_dirs = ProjectDirs::from("org", "quickrun", "quickrun");
    if let Some(dirs) = &proj_dirs {
        dirs.config_dir().join("config.toml")
    } else {
        PathBuf::from("config.toml")
    }
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}
