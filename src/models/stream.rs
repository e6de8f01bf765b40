use serde::{Deserialize, Serialize};

use super::spurt::Spurt;

pub const DEFAULT_FIRST_STREAM_TITLE: &str = "Stream Alpha";
pub const DEFAULT_STREAM_TITLE: &str = "New Stream";

/// How a stream's spurts are laid out. Cycles wall → ordered → reversed → wall.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    Wall,
    Ordered,
    Reversed,
}

impl Default for ViewMode {
    fn default() -> Self {
        ViewMode::Wall
    }
}

impl ViewMode {
    pub fn next(self) -> Self {
        match self {
            ViewMode::Wall => ViewMode::Ordered,
            ViewMode::Ordered => ViewMode::Reversed,
            ViewMode::Reversed => ViewMode::Wall,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Wall => "wall",
            ViewMode::Ordered => "ordered",
            ViewMode::Reversed => "reversed",
        }
    }

    /// Button label shown in a stream header.
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Wall => "Wall View",
            ViewMode::Ordered => "Ordered",
            ViewMode::Reversed => "Reversed",
        }
    }
}

/// An independent recording session: an append-only list of spurts plus
/// display state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    pub id: String,
    pub title: String,
    pub spurts: Vec<Spurt>,
    pub view_mode: ViewMode,
    pub minimized: bool,
}

impl Stream {
    pub fn new(id: String, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            spurts: Vec::new(),
            view_mode: ViewMode::default(),
            minimized: false,
        }
    }

    pub fn last_spurt(&self) -> Option<&Spurt> {
        self.spurts.last()
    }

    /// Sum of spurt durations in seconds, whatever the view mode.
    pub fn total_duration(&self) -> f64 {
        self.spurts.iter().map(|s| s.duration).sum()
    }

    pub fn summary(&self, active_id: &str) -> StreamSummary {
        StreamSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            view_mode: self.view_mode,
            minimized: self.minimized,
            spurt_count: self.spurts.len(),
            total_duration: self.total_duration(),
            is_active: self.id == active_id,
        }
    }
}

/// Row in the stream listing exposed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSummary {
    pub id: String,
    pub title: String,
    pub view_mode: ViewMode,
    pub minimized: bool,
    pub spurt_count: usize,
    pub total_duration: f64,
    pub is_active: bool,
}
