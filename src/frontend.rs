//! Line-oriented terminal driver.
//!
//! Each stdin line is one input event; every published view is printed.

use std::fmt::Write as _;
use crate::state::View;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Replace the query text.
    Query(String),
    /// Activate the highlighted entry.
    Confirm,
    /// Activate the n-th visible entry (1-based).
    Select(usize),
    MoveSelection(i32),
    Refresh,
    Quit,
}

pub fn parse_line(line: &str) -> Result<InputEvent, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Ok(InputEvent::Confirm);
    }

    let Some(command) = line.strip_prefix('/') else {
        return Ok(InputEvent::Query(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("go"), None) => Ok(InputEvent::Confirm),
        (Some("up"), None) => Ok(InputEvent::MoveSelection(-1)),
        (Some("down"), None) => Ok(InputEvent::MoveSelection(1)),
        (Some("refresh"), None) => Ok(InputEvent::Refresh),
        (Some("quit"), None) => Ok(InputEvent::Quit),
        (Some("clear"), None) => Ok(InputEvent::Query(String::new())),
        (Some("select"), Some(n)) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Ok(InputEvent::Select(n)),
            _ => Err(format!("not a position: {n}")),
        },
        _ => Err(format!("unknown command: /{command}")),
    }
}

/// Renders a view with numbered rows, marking the highlighted one.
pub fn render_view(view: &View, selected: usize) -> String {
    let mut out = String::new();
    let mut row = 0;

    if view.visible().is_empty() {
        let _ = writeln!(out, "  (no results)");
        return out;
    }

    for (title, entries) in view.sections() {
        if !title.is_empty() {
            let _ = writeln!(out, "{title}");
        }
        for entry in entries {
            row += 1;
            let marker = if row - 1 == selected { '>' } else { ' ' };
            let _ = writeln!(out, "{marker} {row:>3}. {}", entry.name);
        }
    }
    out
}
