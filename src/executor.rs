use std::collections::HashMap;
use std::fs;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::thread;
use log::info;
use crate::config::{Config, LaunchGroup, StaticEntry};
use crate::error::LaunchError;
use crate::sources::custom::CUSTOM_PREFIX;
use crate::sources::desktop::parse_desktop_file;

/// Opens the item behind a catalog id.
pub trait LaunchAction {
    fn invoke(&self, id: &str) -> Result<(), LaunchError>;
}

/// Resolved invocation for one id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub command: String,
    pub terminal: bool,
}

/// Spawns programs for static items and desktop files.
pub struct CommandLauncher {
    terminal: Option<String>,
    items: Vec<StaticEntry>,
    env: HashMap<String, String>,
}

impl CommandLauncher {
    pub fn new(config: &Config, group: &LaunchGroup) -> Self {
        Self {
            terminal: config.general.terminal.clone(),
            items: group.items.clone(),
            env: group.env.clone().unwrap_or_default(),
        }
    }

    pub fn resolve(&self, id: &str) -> Result<LaunchSpec, LaunchError> {
        if let Some(name) = id.strip_prefix(CUSTOM_PREFIX) {
            return self.items
                .iter()
                .find(|item| item.name == name)
                .map(|item| LaunchSpec {
                    command: item.command.clone(),
                    terminal: item.terminal,
                })
                .ok_or_else(|| LaunchError::UnknownId(id.to_string()));
        }

        // Anything else is a desktop file path
        let content = fs::read_to_string(id).map_err(|_| LaunchError::UnknownId(id.to_string()))?;
        let desktop = parse_desktop_file(&content).ok_or_else(|| LaunchError::UnknownId(id.to_string()))?;
        Ok(LaunchSpec {
            command: desktop.exec,
            terminal: desktop.terminal,
        })
    }

    /// Full argv, with the terminal prefix when the item needs one.
    pub fn command_line(&self, spec: &LaunchSpec) -> Vec<String> {
        let mut cmd_parts: Vec<String> = Vec::new();

        if spec.terminal {
            if let Some(term_cmd) = &self.terminal {
                cmd_parts.extend(term_cmd.split_whitespace().map(str::to_string));
            }
        }
        cmd_parts.extend(spec.command.split_whitespace().map(str::to_string));
        cmd_parts
    }
}

impl LaunchAction for CommandLauncher {
    fn invoke(&self, id: &str) -> Result<(), LaunchError> {
        let spec = self.resolve(id)?;
        let cmd_parts = self.command_line(&spec);

        let Some((program, args)) = cmd_parts.split_first() else {
            return Err(LaunchError::EmptyCommand(id.to_string()));
        };

        let mut command = Command::new(program);
        command.args(args)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Own process group, so terminal signals aimed at the launcher skip it
        command.process_group(0);

        let mut child = command.spawn().map_err(|source| LaunchError::Spawn {
            command: cmd_parts.join(" "),
            source,
        })?;

        // Reap in the background so exited children do not linger as zombies
        thread::spawn(move || {
            let _ = child.wait();
        });

        info!("Launched {:?}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn launcher(terminal: Option<&str>) -> CommandLauncher {
        let mut config = Config::default();
        config.general.terminal = terminal.map(str::to_string);
        let group = LaunchGroup {
            items: vec![
                StaticEntry {
                    name: "Notes".to_string(),
                    command: "nvim notes.md".to_string(),
                    category: String::new(),
                    terminal: true,
                },
                StaticEntry {
                    name: "Noop".to_string(),
                    command: "true".to_string(),
                    category: String::new(),
                    terminal: false,
                },
                StaticEntry {
                    name: "Blank".to_string(),
                    command: "   ".to_string(),
                    category: String::new(),
                    terminal: false,
                },
            ],
            ..Default::default()
        };
        CommandLauncher::new(&config, &group)
    }

    #[test]
    fn test_resolves_static_items_with_terminal() {
        let launcher = launcher(Some("foot -e"));
        let spec = launcher.resolve("custom:Notes").unwrap();
        assert_eq!(launcher.command_line(&spec), vec!["foot", "-e", "nvim", "notes.md"]);
    }

    #[test]
    fn test_terminal_items_without_terminal_run_directly() {
        let launcher = launcher(None);
        let spec = launcher.resolve("custom:Notes").unwrap();
        assert_eq!(launcher.command_line(&spec), vec!["nvim", "notes.md"]);
    }

    #[test]
    fn test_resolves_desktop_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("calc.desktop");
        fs::write(&path, "[Desktop Entry]\nName=Calc\nExec=gnome-calculator %U\n").unwrap();

        let spec = launcher(None).resolve(path.to_str().unwrap()).unwrap();
        assert_eq!(spec, LaunchSpec { command: "gnome-calculator".to_string(), terminal: false });
    }

    #[test]
    fn test_unknown_and_empty_commands_are_errors() {
        let launcher = launcher(None);
        assert!(matches!(launcher.invoke("custom:Missing"), Err(LaunchError::UnknownId(_))));
        assert!(matches!(launcher.invoke("/no/such/file.desktop"), Err(LaunchError::UnknownId(_))));
        assert!(matches!(launcher.invoke("custom:Blank"), Err(LaunchError::EmptyCommand(_))));
    }

    #[test]
    fn test_spawns_in_own_process_group() {
        assert!(launcher(None).invoke("custom:Noop").is_ok());
    }
}
