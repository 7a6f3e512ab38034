use crate::model::CatalogEntry;
use crate::sources::Source;
use anyhow::Result;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use directories::BaseDirs;
use walkdir::WalkDir;
use log::{info, debug};

/// Fields of a `[Desktop Entry]` group that the launcher cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopFile {
    pub name: String,
    pub exec: String,
    pub terminal: bool,
    pub categories: Vec<String>,
    pub container: Option<String>,
}

impl DesktopFile {
    pub fn display_name(&self) -> String {
        match &self.container {
            Some(c) => format!("{} ({})", self.name, c),
            None => self.name.clone(),
        }
    }

    /// First freedesktop main category, as a section label.
    pub fn category_label(&self) -> &'static str {
        self.categories
            .iter()
            .find_map(|c| main_category_label(c))
            .unwrap_or("Other")
    }
}

fn main_category_label(category: &str) -> Option<&'static str> {
    let label = match category {
        "AudioVideo" | "Audio" | "Video" => "Multimedia",
        "Development" => "Development",
        "Education" => "Education",
        "Game" => "Games",
        "Graphics" => "Graphics",
        "Network" => "Internet",
        "Office" => "Office",
        "Science" => "Science",
        "Settings" => "Settings",
        "System" => "System",
        "Utility" => "Utilities",
        _ => return None,
    };
    Some(label)
}

pub struct DesktopSource {
    dirs: Vec<PathBuf>,
}

impl DesktopSource {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// User applications first so they shadow system files with the same ID.
    pub fn system() -> Self {
        let mut dirs = Vec::new();
        if let Some(base_dirs) = BaseDirs::new() {
            dirs.push(base_dirs.data_dir().join("applications"));
        }
        dirs.push(Path::new("/usr/local/share/applications").to_path_buf());
        dirs.push(Path::new("/usr/share/applications").to_path_buf());
        Self::new(dirs)
    }
}

/// Desktop-file ID: path below the applications dir with `/` replaced by `-`.
fn desktop_file_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("-")
}

impl Source for DesktopSource {
    fn scan(&self) -> Result<Vec<CatalogEntry>> {
        let mut entries = Vec::new();
        let mut seen_ids = HashSet::new();

        for dir in &self.dirs {
            if !dir.exists() {
                continue;
            }
            debug!("Scanning desktop files in {:?}", dir);
            for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name().into_iter().flatten() {
                let path = entry.path();
                if !entry.file_type().is_file()
                    || path.extension().and_then(|s| s.to_str()) != Some("desktop")
                {
                    continue;
                }
                // Shadowed or hidden files still claim their ID
                if !seen_ids.insert(desktop_file_id(dir, path)) {
                    continue;
                }
                let Ok(content) = fs::read_to_string(path) else {
                    debug!("Unreadable desktop file {:?}", path);
                    continue;
                };
                if let Some(desktop) = parse_desktop_file(&content) {
                    entries.push(CatalogEntry::new(
                        path.to_string_lossy().to_string(),
                        desktop.display_name(),
                        desktop.category_label(),
                    ));
                }
            }
        }
        info!("DesktopSource: found {} entries", entries.len());
        Ok(entries)
    }
}

pub fn parse_desktop_file(content: &str) -> Option<DesktopFile> {
    let mut name = None;
    let mut exec = None;
    let mut terminal = false;
    let mut hidden = false;
    let mut categories = Vec::new();
    let mut is_application = true;
    let mut is_desktop_entry = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }

        if line == "[Desktop Entry]" {
            is_desktop_entry = true;
            continue;
        }

        if line.starts_with('[') {
            is_desktop_entry = false;
            continue;
        }

        if !is_desktop_entry { continue; }

        let Some((key, value)) = line.split_once('=') else { continue };
        match key.trim() {
            "Name" => name = Some(value.trim().to_string()),
            "Exec" => {
                let clean_exec: String = value.split_whitespace()
                    .filter(|s| !s.starts_with('%'))
                    .collect::<Vec<_>>()
                    .join(" ");
                exec = Some(clean_exec);
            }
            "Terminal" => terminal = value.trim() == "true",
            "NoDisplay" | "Hidden" => hidden |= value.trim() == "true",
            "Type" => is_application = value.trim() == "Application",
            "Categories" => {
                categories = value.split(';')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            _ => {}
        }
    }

    if hidden || !is_application { return None; }

    let exec = exec?;
    let container = container_name(&exec);

    Some(DesktopFile {
        name: name?,
        exec,
        terminal,
        categories,
        container,
    })
}

/// Container name for distrobox/toolbox wrapper commands.
fn container_name(cmd: &str) -> Option<String> {
    let flags: &[&str] = if cmd.contains("distrobox-enter") {
        &["-n", "--name"]
    } else if cmd.contains("toolbox run") {
        &["-c", "--container"]
    } else {
        return None;
    };

    let parts: Vec<&str> = cmd.split_whitespace().collect();
    let pos = parts.iter().position(|x| flags.contains(x))?;
    parts.get(pos + 1).map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FIREFOX: &str = "\
[Desktop Entry]
Type=Application
Name=Firefox
Exec=firefox %u
Categories=GTK;Network;WebBrowser;

[Desktop Action new-window]
Name=New Window
Exec=firefox --new-window
";

    #[test]
    fn test_parse_basic_entry() {
        let desktop = parse_desktop_file(FIREFOX).unwrap();
        assert_eq!(desktop.name, "Firefox");
        assert_eq!(desktop.exec, "firefox");
        assert!(!desktop.terminal);
        assert_eq!(desktop.category_label(), "Internet");
    }

    #[test]
    fn test_parse_skips_hidden_and_non_applications() {
        let hidden = "[Desktop Entry]\nName=X\nExec=x\nNoDisplay=true\n";
        assert_eq!(parse_desktop_file(hidden), None);
        let link = "[Desktop Entry]\nType=Link\nName=X\nExec=x\n";
        assert_eq!(parse_desktop_file(link), None);
        let no_exec = "[Desktop Entry]\nName=X\n";
        assert_eq!(parse_desktop_file(no_exec), None);
    }

    #[test]
    fn test_container_suffix_and_default_category() {
        let content = "[Desktop Entry]\nName=Code\nExec=distrobox-enter -n dev -- code\nTerminal=true\n";
        let desktop = parse_desktop_file(content).unwrap();
        assert_eq!(desktop.display_name(), "Code (dev)");
        assert!(desktop.terminal);
        assert_eq!(desktop.category_label(), "Other");
    }

    #[test]
    fn test_scan_recurses_and_shadows_by_id() {
        let user = TempDir::new().unwrap();
        let system = TempDir::new().unwrap();

        fs::write(user.path().join("firefox.desktop"), FIREFOX.replace("Name=Firefox", "Name=My Firefox")).unwrap();
        fs::write(system.path().join("firefox.desktop"), FIREFOX).unwrap();
        fs::create_dir(system.path().join("kde")).unwrap();
        fs::write(
            system.path().join("kde/calc.desktop"),
            "[Desktop Entry]\nName=KCalc\nExec=kcalc\nCategories=Qt;Utility;Calculator;\n",
        ).unwrap();
        fs::write(system.path().join("notes.txt"), "ignored").unwrap();

        let source = DesktopSource::new(vec![user.path().to_path_buf(), system.path().to_path_buf()]);
        let mut entries = source.scan().unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["KCalc", "My Firefox"]);
        assert_eq!(entries[0].category, "Utilities");
        assert!(entries[0].id.ends_with("calc.desktop"));
    }

    #[test]
    fn test_missing_dirs_are_skipped() {
        let source = DesktopSource::new(vec![PathBuf::from("/definitely/not/here")]);
        assert!(source.scan().unwrap().is_empty());
    }
}
