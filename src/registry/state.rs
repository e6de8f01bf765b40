use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    Spurt, SpurtCandidate, Stream, StreamSummary, ViewMode, DEFAULT_FIRST_STREAM_TITLE,
    DEFAULT_STREAM_TITLE,
};
use crate::segmentation::{is_paragraph_start, SegmentationConfig};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Owns every stream and decides where finished spurts go.
///
/// Commands never fail: unknown ids and deleting the last stream are ignored.
/// Mutating commands report whether anything changed so callers can decide
/// whether to notify observers.
#[derive(Debug, Clone)]
pub struct StreamRegistry {
    /// Creation order; the first entry becomes active when the active stream is deleted.
    streams: Vec<Stream>,
    active_id: String,
    config: SegmentationConfig,
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::new(SegmentationConfig::default())
    }
}

impl StreamRegistry {
    /// Creates a registry holding one empty, active stream.
    pub fn new(config: SegmentationConfig) -> Self {
        let first = Stream::new(new_id(), DEFAULT_FIRST_STREAM_TITLE);
        let active_id = first.id.clone();
        Self {
            streams: vec![first],
            active_id,
            config: config.clamped(),
        }
    }

    pub fn config(&self) -> SegmentationConfig {
        self.config
    }

    pub fn set_config(&mut self, config: SegmentationConfig) {
        self.config = config.clamped();
        log_info!(
            "segmentation thresholds now cut={}ms paragraph={}ms",
            self.config.cut_threshold_ms,
            self.config.paragraph_threshold_ms
        );
    }

    pub fn set_cut_threshold_ms(&mut self, value: u64) {
        let mut config = self.config;
        config.set_cut_threshold_ms(value);
        self.set_config(config);
    }

    pub fn set_paragraph_threshold_ms(&mut self, value: u64) {
        let mut config = self.config;
        config.set_paragraph_threshold_ms(value);
        self.set_config(config);
    }

    /// Classifies `candidate` against the active stream's last spurt and
    /// appends it there. Returns the stored spurt.
    pub fn append_spurt(&mut self, candidate: SpurtCandidate) -> Option<Spurt> {
        let paragraph_threshold_ms = self.config.paragraph_threshold_ms;
        let active_id = self.active_id.clone();
        let Some(stream) = self.stream_mut(&active_id) else {
            log::warn!("no active stream {}; dropping spurt", active_id);
            return None;
        };

        let paragraph = is_paragraph_start(&candidate, stream.last_spurt(), paragraph_threshold_ms);
        let spurt = Spurt::from_candidate(new_id(), candidate, paragraph);
        stream.spurts.push(spurt.clone());

        log_info!(
            "appended spurt {} to stream {} ({:.1}s, paragraph={})",
            spurt.id,
            stream.id,
            spurt.duration,
            spurt.is_paragraph_start
        );
        Some(spurt)
    }

    /// Adds an empty stream and makes it active.
    pub fn create_stream(&mut self) -> String {
        let stream = Stream::new(new_id(), DEFAULT_STREAM_TITLE);
        let id = stream.id.clone();
        self.streams.push(stream);
        self.active_id = id.clone();
        log_info!("created stream {} ({} total)", id, self.streams.len());
        id
    }

    /// Sets the title. Empty titles are allowed and rendered with a placeholder.
    pub fn rename_stream(&mut self, id: &str, title: impl Into<String>) -> bool {
        match self.stream_mut(id) {
            Some(stream) => {
                stream.title = title.into();
                true
            }
            None => ignored("rename", id),
        }
    }

    /// Drops every spurt of the stream, leaving its other fields untouched.
    pub fn clear_stream(&mut self, id: &str) -> bool {
        match self.stream_mut(id) {
            Some(stream) => {
                stream.spurts.clear();
                log_info!("cleared stream {}", id);
                true
            }
            None => ignored("clear", id),
        }
    }

    /// Removes a stream unless it is the only one left.
    pub fn delete_stream(&mut self, id: &str) -> bool {
        if self.streams.len() <= 1 {
            log_debug!("refusing to delete the last stream {}", id);
            return false;
        }
        let Some(index) = self.position(id) else {
            return ignored("delete", id);
        };

        self.streams.remove(index);
        if self.active_id == id {
            // Always the first stream in creation order, not a neighbour.
            self.active_id = self.streams[0].id.clone();
            log_info!("deleted active stream {}; {} is now active", id, self.active_id);
        } else {
            log_info!("deleted stream {}", id);
        }
        true
    }

    pub fn cycle_view_mode(&mut self, id: &str) -> Option<ViewMode> {
        match self.stream_mut(id) {
            Some(stream) => {
                stream.view_mode = stream.view_mode.next();
                Some(stream.view_mode)
            }
            None => {
                ignored("cycle view mode", id);
                None
            }
        }
    }

    /// Flips `minimized`. A minimized stream keeps receiving spurts if active.
    pub fn toggle_minimize(&mut self, id: &str) -> Option<bool> {
        match self.stream_mut(id) {
            Some(stream) => {
                stream.minimized = !stream.minimized;
                Some(stream.minimized)
            }
            None => {
                ignored("toggle minimize", id);
                None
            }
        }
    }

    pub fn set_active(&mut self, id: &str) -> bool {
        if self.position(id).is_none() {
            return ignored("activate", id);
        }
        self.active_id = id.to_string();
        true
    }

    pub fn active_stream_id(&self) -> &str {
        &self.active_id
    }

    pub fn active_stream(&self) -> Option<&Stream> {
        self.stream(&self.active_id)
    }

    pub fn stream(&self, id: &str) -> Option<&Stream> {
        self.streams.iter().find(|s| s.id == id)
    }

    /// All streams in creation order.
    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn summaries(&self) -> Vec<StreamSummary> {
        self.streams
            .iter()
            .map(|s| s.summary(&self.active_id))
            .collect()
    }

    /// Streams shown in the main layout.
    pub fn visible(&self) -> impl Iterator<Item = &Stream> {
        self.streams.iter().filter(|s| !s.minimized)
    }

    /// Minimized streams, listed in the dock.
    pub fn dock(&self) -> impl Iterator<Item = &Stream> {
        self.streams.iter().filter(|s| s.minimized)
    }

    /// Owned copy for readers that must not observe later mutations.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            streams: self.streams.clone(),
            active_stream_id: self.active_id.clone(),
            config: self.config,
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.streams.iter().position(|s| s.id == id)
    }

    fn stream_mut(&mut self, id: &str) -> Option<&mut Stream> {
        self.streams.iter_mut().find(|s| s.id == id)
    }
}

/// Point-in-time copy of the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySnapshot {
    pub streams: Vec<Stream>,
    pub active_stream_id: String,
    pub config: SegmentationConfig,
}

impl RegistrySnapshot {
    pub fn stream(&self, id: &str) -> Option<&Stream> {
        self.streams.iter().find(|s| s.id == id)
    }

    pub fn summaries(&self) -> Vec<StreamSummary> {
        self.streams
            .iter()
            .map(|s| s.summary(&self.active_stream_id))
            .collect()
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn ignored(command: &str, id: &str) -> bool {
    log_debug!("{} ignored: unknown stream {}", command, id);
    false
}
