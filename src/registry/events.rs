use serde::Serialize;

use crate::models::{Spurt, ViewMode};
use crate::segmentation::SegmentationConfig;

/// Change notification published after every applied registry mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RegistryEvent {
    #[serde(rename_all = "camelCase")]
    SpurtAppended { stream_id: String, spurt: Spurt },
    #[serde(rename_all = "camelCase")]
    StreamCreated { stream_id: String },
    #[serde(rename_all = "camelCase")]
    StreamRenamed { stream_id: String, title: String },
    #[serde(rename_all = "camelCase")]
    StreamCleared { stream_id: String },
    #[serde(rename_all = "camelCase")]
    StreamDeleted { stream_id: String, active_stream_id: String },
    #[serde(rename_all = "camelCase")]
    ViewModeChanged { stream_id: String, view_mode: ViewMode },
    #[serde(rename_all = "camelCase")]
    MinimizeToggled { stream_id: String, minimized: bool },
    #[serde(rename_all = "camelCase")]
    ActiveStreamChanged { stream_id: String },
    ConfigChanged { config: SegmentationConfig },
    /// The in-progress burst changed; `recording` drives the RECORDING/IDLE badge.
    RecorderChanged { recording: bool },
}

impl RegistryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RegistryEvent::SpurtAppended { .. } => "spurt-appended",
            RegistryEvent::StreamCreated { .. } => "stream-created",
            RegistryEvent::StreamRenamed { .. } => "stream-renamed",
            RegistryEvent::StreamCleared { .. } => "stream-cleared",
            RegistryEvent::StreamDeleted { .. } => "stream-deleted",
            RegistryEvent::ViewModeChanged { .. } => "view-mode-changed",
            RegistryEvent::MinimizeToggled { .. } => "minimize-toggled",
            RegistryEvent::ActiveStreamChanged { .. } => "active-stream-changed",
            RegistryEvent::ConfigChanged { .. } => "config-changed",
            RegistryEvent::RecorderChanged { .. } => "recorder-changed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = RegistryEvent::MinimizeToggled {
            stream_id: "s".into(),
            minimized: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "minimizeToggled");
        assert_eq!(json["streamId"], "s");
        assert_eq!(event.name(), "minimize-toggled");
    }
}
