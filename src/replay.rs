//! Deterministic replay of a timestamped event script.
//!
//! Drives the same recorder and registry as the live engine, but time only
//! moves when the script says so: a pending idle deadline fires at its due
//! time as soon as an event at or after that time is processed.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::models::Spurt;
use crate::registry::{RegistrySnapshot, StreamRegistry};
use crate::segmentation::{SegmentationConfig, SpurtRecorder};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayScript {
    /// Thresholds to start with; defaults when absent.
    #[serde(default)]
    pub config: Option<SegmentationConfig>,
    pub events: Vec<ScriptEvent>,
}

impl ReplayScript {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay script {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Invalid replay script {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptEvent {
    /// Epoch milliseconds; must not decrease along the script.
    pub at: i64,
    #[serde(flatten)]
    pub action: ScriptAction,
}

/// Streams are addressed by literal id or by position in creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamRef {
    Index { index: usize },
    Id(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ScriptAction {
    /// Full current text of the input after a change.
    Input { text: String },
    /// Finish the in-progress burst without waiting for the idle timeout.
    Flush,
    CreateStream,
    RenameStream { stream: StreamRef, title: String },
    ClearStream { stream: StreamRef },
    DeleteStream { stream: StreamRef },
    CycleViewMode { stream: StreamRef },
    ToggleMinimize { stream: StreamRef },
    SetActive { stream: StreamRef },
    SetCutThreshold { ms: u64 },
    SetParagraphThreshold { ms: u64 },
}

pub struct Replay {
    registry: StreamRegistry,
    recorder: SpurtRecorder,
    now_ms: Option<i64>,
    finished: Vec<Spurt>,
}

impl Replay {
    pub fn new(config: SegmentationConfig) -> Self {
        Self {
            registry: StreamRegistry::new(config),
            recorder: SpurtRecorder::new(),
            now_ms: None,
            finished: Vec::new(),
        }
    }

    /// Replays every event, then lets the last pending timeout fire.
    pub fn run(script: &ReplayScript) -> Result<Self> {
        let mut replay = Self::new(script.config.unwrap_or_default());
        for (index, event) in script.events.iter().enumerate() {
            replay
                .apply(event)
                .with_context(|| format!("event #{index} at {}ms", event.at))?;
        }
        replay.drain();
        log_info!(
            "replayed {} events into {} spurts",
            script.events.len(),
            replay.finished.len()
        );
        Ok(replay)
    }

    pub fn apply(&mut self, event: &ScriptEvent) -> Result<()> {
        self.advance_to(event.at)?;

        match &event.action {
            ScriptAction::Input { text } => {
                let cut = self.registry.config().cut_threshold_ms;
                let deadline = self.recorder.on_input(text, event.at, cut);
                log_debug!("input at {} armed deadline {}", event.at, deadline.due_ms);
            }
            ScriptAction::Flush => {
                if let Some(candidate) = self.recorder.flush(event.at) {
                    self.finished.extend(self.registry.append_spurt(candidate));
                }
            }
            ScriptAction::CreateStream => {
                self.registry.create_stream();
            }
            ScriptAction::RenameStream { stream, title } => {
                if let Some(id) = self.resolve(stream) {
                    self.registry.rename_stream(&id, title.clone());
                }
            }
            ScriptAction::ClearStream { stream } => {
                if let Some(id) = self.resolve(stream) {
                    self.registry.clear_stream(&id);
                }
            }
            ScriptAction::DeleteStream { stream } => {
                if let Some(id) = self.resolve(stream) {
                    self.registry.delete_stream(&id);
                }
            }
            ScriptAction::CycleViewMode { stream } => {
                if let Some(id) = self.resolve(stream) {
                    self.registry.cycle_view_mode(&id);
                }
            }
            ScriptAction::ToggleMinimize { stream } => {
                if let Some(id) = self.resolve(stream) {
                    self.registry.toggle_minimize(&id);
                }
            }
            ScriptAction::SetActive { stream } => {
                if let Some(id) = self.resolve(stream) {
                    self.registry.set_active(&id);
                }
            }
            ScriptAction::SetCutThreshold { ms } => self.registry.set_cut_threshold_ms(*ms),
            ScriptAction::SetParagraphThreshold { ms } => {
                self.registry.set_paragraph_threshold_ms(*ms)
            }
        }
        Ok(())
    }

    /// Moves time forward to `at`, firing a pending timeout due by then.
    pub fn advance_to(&mut self, at: i64) -> Result<()> {
        if let Some(now) = self.now_ms {
            if at < now {
                bail!("timestamp {at}ms is earlier than {now}ms");
            }
        }
        if let Some(deadline) = self.recorder.pending() {
            if deadline.due_ms <= at {
                self.fire(deadline.generation, deadline.due_ms);
            }
        }
        self.now_ms = Some(at);
        Ok(())
    }

    /// Fires whatever timeout is still pending, as if input stopped for good.
    pub fn drain(&mut self) {
        if let Some(deadline) = self.recorder.pending() {
            self.fire(deadline.generation, deadline.due_ms);
            self.now_ms = Some(self.now_ms.map_or(deadline.due_ms, |now| now.max(deadline.due_ms)));
        }
    }

    pub fn registry(&self) -> &StreamRegistry {
        &self.registry
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry.snapshot()
    }

    /// Spurts in the order they were finished, across all streams.
    pub fn finished(&self) -> &[Spurt] {
        &self.finished
    }

    fn fire(&mut self, generation: u64, due_ms: i64) {
        if let Some(candidate) = self.recorder.finish(generation, due_ms) {
            self.finished.extend(self.registry.append_spurt(candidate));
        }
    }

    fn resolve(&self, stream: &StreamRef) -> Option<String> {
        match stream {
            StreamRef::Index { index } => {
                let id = self.registry.streams().get(*index).map(|s| s.id.clone());
                if id.is_none() {
                    log_debug!("no stream at index {}", index);
                }
                id
            }
            StreamRef::Id(id) => Some(id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ViewMode;

    fn script(json: &str) -> ReplayScript {
        ReplayScript::from_json(json).unwrap()
    }

    #[test]
    fn keystrokes_then_silence_make_one_spurt() {
        let replay = Replay::run(&script(
            r#"{
                "config": { "cutThresholdMs": 1000, "paragraphThresholdMs": 1000 },
                "events": [
                    { "at": 0, "type": "input", "text": "h" },
                    { "at": 300, "type": "input", "text": "hi" },
                    { "at": 600, "type": "input", "text": "hi!" }
                ]
            }"#,
        ))
        .unwrap();
        let spurts = replay.finished();
        assert_eq!(spurts.len(), 1);
        assert_eq!(spurts[0].created_at, 1_600);
        assert!((spurts[0].duration - 0.6).abs() < 1e-9);
    }

    #[test]
    fn gap_of_exactly_cut_threshold_splits() {
        let replay = Replay::run(&script(
            r#"{
                "config": { "cutThresholdMs": 1000 },
                "events": [
                    { "at": 0, "type": "input", "text": "a" },
                    { "at": 1000, "type": "input", "text": "b" }
                ]
            }"#,
        ))
        .unwrap();
        let texts: Vec<&str> = replay.finished().iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn commands_address_streams_by_index() {
        let replay = Replay::run(&script(
            r#"{
                "events": [
                    { "at": 0, "type": "createStream" },
                    { "at": 0, "type": "renameStream", "stream": { "index": 1 }, "title": "Second" },
                    { "at": 0, "type": "cycleViewMode", "stream": { "index": 1 } },
                    { "at": 0, "type": "toggleMinimize", "stream": { "index": 0 } },
                    { "at": 0, "type": "deleteStream", "stream": { "index": 7 } },
                    { "at": 0, "type": "setActive", "stream": "not-a-stream" }
                ]
            }"#,
        ))
        .unwrap();
        let streams = replay.registry().streams();
        assert_eq!(streams.len(), 2);
        assert_eq!(streams[1].title, "Second");
        assert_eq!(streams[1].view_mode, ViewMode::Ordered);
        assert!(streams[0].minimized);
        assert_eq!(replay.registry().active_stream_id(), streams[1].id);
    }

    #[test]
    fn flush_finishes_burst_at_event_time() {
        let replay = Replay::run(&script(
            r#"{
                "events": [
                    { "at": 0, "type": "input", "text": "a" },
                    { "at": 400, "type": "input", "text": "ab" },
                    { "at": 500, "type": "flush" }
                ]
            }"#,
        ))
        .unwrap();
        assert_eq!(replay.finished().len(), 1);
        assert_eq!(replay.finished()[0].created_at, 500);
    }

    #[test]
    fn decreasing_timestamps_are_rejected() {
        let result = Replay::run(&script(
            r#"{
                "events": [
                    { "at": 100, "type": "input", "text": "a" },
                    { "at": 50, "type": "input", "text": "ab" }
                ]
            }"#,
        ));
        let err = result.err().unwrap();
        assert!(format!("{err:#}").contains("earlier than"));
    }

    #[test]
    fn threshold_change_applies_to_later_spurts_only() {
        let replay = Replay::run(&script(
            r#"{
                "config": { "cutThresholdMs": 500, "paragraphThresholdMs": 1000 },
                "events": [
                    { "at": 0, "type": "input", "text": "a" },
                    { "at": 3000, "type": "input", "text": "b" },
                    { "at": 4000, "type": "setParagraphThreshold", "ms": 60000 },
                    { "at": 9000, "type": "input", "text": "c" }
                ]
            }"#,
        ))
        .unwrap();
        let flags: Vec<bool> = replay
            .finished()
            .iter()
            .map(|s| s.is_paragraph_start)
            .collect();
        assert_eq!(flags, vec![true, true, false]);
    }
}
