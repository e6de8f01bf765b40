//! Plain-text rendering of projections for terminals and logs.

use std::fmt::Write as _;

use super::{project, GapIndicator, ListEntry, Projection, WallItem};
use crate::models::Stream;
use crate::registry::RegistrySnapshot;

pub const UNTITLED_STREAM: &str = "Untitled Stream";
pub const UNTITLED_DOCK: &str = "Untitled";

/// Columns used for a full-width divider or a 100% pause bar.
const BAR_COLUMNS: usize = 40;

pub fn display_title(title: &str) -> &str {
    if title.is_empty() {
        UNTITLED_STREAM
    } else {
        title
    }
}

/// Header line: total typing time, view label, title, and an active marker.
pub fn header(stream: &Stream, is_active: bool) -> String {
    format!(
        "{} {:.1}s  [{}]  {}",
        if is_active { "*" } else { " " },
        stream.total_duration(),
        stream.view_mode.label(),
        display_title(&stream.title)
    )
}

pub fn render_stream(stream: &Stream, is_active: bool, paragraph_threshold_ms: u64) -> String {
    let mut out = header(stream, is_active);
    out.push('\n');
    match project(stream, paragraph_threshold_ms) {
        Projection::Wall(items) => render_wall(&mut out, &items),
        Projection::Ordered(entries) | Projection::Reversed(entries) => {
            render_list(&mut out, &entries)
        }
    }
    out
}

fn render_wall(out: &mut String, items: &[WallItem<'_>]) {
    let mut line = String::new();
    for item in items {
        match item {
            WallItem::ParagraphBreak => {
                out.push_str(line.trim_end());
                out.push_str("\n\n");
                line.clear();
            }
            WallItem::Spurt { spurt } => {
                line.push_str(&spurt.text);
                line.push(' ');
            }
        }
    }
    if !line.is_empty() {
        out.push_str(line.trim_end());
        out.push('\n');
    }
}

fn render_list(out: &mut String, entries: &[ListEntry<'_>]) {
    for entry in entries {
        let _ = writeln!(out, "{}  {:.1}s", entry.spurt.text, entry.spurt.duration);
        if let Some(gap) = entry.gap_after {
            let _ = writeln!(out, "{}", gap_line(&gap));
        }
    }
}

fn gap_line(gap: &GapIndicator) -> String {
    let bar = match gap {
        GapIndicator::ParagraphBreak { .. } => "─".repeat(BAR_COLUMNS),
        GapIndicator::Pause { width_percent, .. } => {
            let cols = ((width_percent / 100.0) * BAR_COLUMNS as f64).round() as usize;
            // Bars never vanish entirely, matching the minimum width on screen.
            "▬".repeat(cols.max(1))
        }
    };
    match gap.label() {
        Some(label) => format!("{:<width$} {}", bar, label, width = BAR_COLUMNS),
        None => bar,
    }
}

/// Dock line listing minimized streams, or `None` when nothing is minimized.
pub fn render_dock(snapshot: &RegistrySnapshot) -> Option<String> {
    let entries: Vec<String> = snapshot
        .streams
        .iter()
        .filter(|s| s.minimized)
        .map(|s| {
            let title = if s.title.is_empty() { UNTITLED_DOCK } else { s.title.as_str() };
            let marker = if s.id == snapshot.active_stream_id { "*" } else { "" };
            format!("{}{} [{}]", marker, title, s.spurts.len())
        })
        .collect();
    (!entries.is_empty()).then(|| format!("DOCK  {}", entries.join("  ")))
}

/// Every visible stream followed by the dock.
pub fn render_layout(snapshot: &RegistrySnapshot) -> String {
    let threshold = snapshot.config.paragraph_threshold_ms;
    let mut sections: Vec<String> = snapshot
        .streams
        .iter()
        .filter(|s| !s.minimized)
        .map(|s| render_stream(s, s.id == snapshot.active_stream_id, threshold))
        .collect();
    if let Some(dock) = render_dock(snapshot) {
        sections.push(dock);
    }
    sections.join("\n")
}
