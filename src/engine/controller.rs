use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    models::{InputEvent, Spurt, Stream, StreamSummary, ViewMode},
    projection::{self, Projection},
    registry::{RegistryEvent, RegistrySnapshot, StreamRegistry},
    segmentation::{SegmentationConfig, SpurtRecorder},
};

use super::clock::{AnchoredClock, Clock};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Everything a mutation touches, behind one lock so keystrokes, timer
/// firings and commands apply one at a time in arrival order.
struct EngineState {
    registry: StreamRegistry,
    recorder: SpurtRecorder,
}

/// Owned copy of one stream plus the threshold needed to project it.
#[derive(Debug, Clone)]
pub struct StreamView {
    pub stream: Stream,
    pub is_active: bool,
    pub paragraph_threshold_ms: u64,
}

impl StreamView {
    pub fn projection(&self) -> Projection<'_> {
        projection::project(&self.stream, self.paragraph_threshold_ms)
    }

    pub fn render(&self) -> String {
        projection::render::render_stream(&self.stream, self.is_active, self.paragraph_threshold_ms)
    }
}

/// Live driver: turns keystrokes into spurts using a real idle timer.
///
/// Cheap to clone; clones share state. At most one idle timeout is pending at
/// any moment and every new keystroke replaces it.
#[derive(Clone)]
pub struct SpurtEngine {
    state: Arc<Mutex<EngineState>>,
    idle_timer: Arc<Mutex<Option<JoinHandle<()>>>>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<RegistryEvent>,
    shutdown: CancellationToken,
}

impl SpurtEngine {
    pub fn new(config: SegmentationConfig) -> Self {
        Self::with_clock(config, Arc::new(AnchoredClock::new()))
    }

    pub fn with_clock(config: SegmentationConfig, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(EngineState {
                registry: StreamRegistry::new(config),
                recorder: SpurtRecorder::new(),
            })),
            idle_timer: Arc::new(Mutex::new(None)),
            clock,
            events,
            shutdown: CancellationToken::new(),
        }
    }

    /// Receives a notification for every applied change.
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Records a content change stamped with the engine clock.
    pub async fn input(&self, text: impl Into<String>) {
        let event = InputEvent::new(text, self.clock.now_ms());
        self.handle_input(event).await;
    }

    /// Records a content change and re-arms the idle timeout.
    ///
    /// Timestamps should come from the same clock as the engine's, since the
    /// completion time is read from it when the timeout fires.
    pub async fn handle_input(&self, event: InputEvent) {
        if self.shutdown.is_cancelled() {
            log_warn!("input after shutdown ignored");
            return;
        }

        let mut state = self.state.lock().await;
        let was_recording = state.recorder.is_recording();
        let cut_threshold_ms = state.registry.config().cut_threshold_ms;
        let deadline = state
            .recorder
            .on_input(&event.text, event.timestamp, cut_threshold_ms);
        let recording = state.recorder.is_recording();

        log_debug!(
            "keystroke at {} ({} chars), idle deadline {}",
            event.timestamp,
            event.text.chars().count(),
            deadline.due_ms
        );

        // Arm while still holding the state lock so concurrent inputs cannot
        // leave an older generation's timer as the only one pending.
        self.arm_idle_timer(deadline.generation, Duration::from_millis(cut_threshold_ms))
            .await;
        drop(state);

        if was_recording != recording {
            self.emit(RegistryEvent::RecorderChanged { recording });
        }
    }

    /// Finishes the in-progress burst now instead of waiting for the timeout.
    pub async fn flush(&self) -> Option<Spurt> {
        let now = self.clock.now_ms();
        let (appended, was_recording) = {
            let mut state = self.state.lock().await;
            self.cancel_idle_timer().await;
            let was_recording = state.recorder.is_recording();
            let candidate = state.recorder.flush(now);
            let appended = candidate.and_then(|c| append_to_active(&mut state.registry, c));
            (appended, was_recording)
        };
        self.publish_finish(appended, was_recording)
    }

    pub async fn is_recording(&self) -> bool {
        self.state.lock().await.recorder.is_recording()
    }

    /// Text of the burst currently being typed.
    pub async fn recorder_text(&self) -> String {
        self.state.lock().await.recorder.buffer().to_string()
    }

    pub async fn create_stream(&self) -> String {
        let id = self.state.lock().await.registry.create_stream();
        self.emit(RegistryEvent::StreamCreated {
            stream_id: id.clone(),
        });
        self.emit(RegistryEvent::ActiveStreamChanged {
            stream_id: id.clone(),
        });
        id
    }

    pub async fn rename_stream(&self, id: &str, title: impl Into<String>) {
        let title = title.into();
        let applied = self.state.lock().await.registry.rename_stream(id, title.clone());
        if applied {
            self.emit(RegistryEvent::StreamRenamed {
                stream_id: id.to_string(),
                title,
            });
        }
    }

    pub async fn clear_stream(&self, id: &str) {
        if self.state.lock().await.registry.clear_stream(id) {
            self.emit(RegistryEvent::StreamCleared {
                stream_id: id.to_string(),
            });
        }
    }

    pub async fn delete_stream(&self, id: &str) {
        let active = {
            let mut state = self.state.lock().await;
            state
                .registry
                .delete_stream(id)
                .then(|| state.registry.active_stream_id().to_string())
        };
        if let Some(active_stream_id) = active {
            self.emit(RegistryEvent::StreamDeleted {
                stream_id: id.to_string(),
                active_stream_id,
            });
        }
    }

    pub async fn cycle_view_mode(&self, id: &str) -> Option<ViewMode> {
        let mode = self.state.lock().await.registry.cycle_view_mode(id);
        if let Some(view_mode) = mode {
            self.emit(RegistryEvent::ViewModeChanged {
                stream_id: id.to_string(),
                view_mode,
            });
        }
        mode
    }

    pub async fn toggle_minimize(&self, id: &str) -> Option<bool> {
        let minimized = self.state.lock().await.registry.toggle_minimize(id);
        if let Some(minimized) = minimized {
            self.emit(RegistryEvent::MinimizeToggled {
                stream_id: id.to_string(),
                minimized,
            });
        }
        minimized
    }

    pub async fn set_active(&self, id: &str) {
        if self.state.lock().await.registry.set_active(id) {
            self.emit(RegistryEvent::ActiveStreamChanged {
                stream_id: id.to_string(),
            });
        }
    }

    /// Applies to the next idle timeout armed; a pending one keeps its delay.
    pub async fn set_cut_threshold_ms(&self, value: u64) {
        let config = {
            let mut state = self.state.lock().await;
            state.registry.set_cut_threshold_ms(value);
            state.registry.config()
        };
        self.emit(RegistryEvent::ConfigChanged { config });
    }

    pub async fn set_paragraph_threshold_ms(&self, value: u64) {
        let config = {
            let mut state = self.state.lock().await;
            state.registry.set_paragraph_threshold_ms(value);
            state.registry.config()
        };
        self.emit(RegistryEvent::ConfigChanged { config });
    }

    pub async fn config(&self) -> SegmentationConfig {
        self.state.lock().await.registry.config()
    }

    pub async fn active_stream_id(&self) -> String {
        self.state.lock().await.registry.active_stream_id().to_string()
    }

    pub async fn summaries(&self) -> Vec<StreamSummary> {
        self.state.lock().await.registry.summaries()
    }

    pub async fn snapshot(&self) -> RegistrySnapshot {
        self.state.lock().await.registry.snapshot()
    }

    /// Copy of one stream ready to be projected without holding the lock.
    pub async fn view(&self, id: &str) -> Option<StreamView> {
        let state = self.state.lock().await;
        let registry = &state.registry;
        registry.stream(id).map(|stream| StreamView {
            stream: stream.clone(),
            is_active: registry.active_stream_id() == id,
            paragraph_threshold_ms: registry.config().paragraph_threshold_ms,
        })
    }

    /// Flushes any pending burst, then stops the idle timer for good.
    pub async fn shutdown(&self) -> Result<()> {
        self.flush().await;
        self.shutdown.cancel();

        let handle = self.idle_timer.lock().await.take();
        match handle {
            Some(handle) => match handle.await {
                Ok(()) => Ok(()),
                Err(err) if err.is_cancelled() => Ok(()),
                Err(err) => Err(err).context("idle timer task failed to join"),
            },
            None => Ok(()),
        }
    }

    async fn arm_idle_timer(&self, generation: u64, delay: Duration) {
        let mut timer_guard = self.idle_timer.lock().await;
        if let Some(handle) = timer_guard.take() {
            handle.abort();
        }

        let engine = self.clone();
        let cancel_token = self.shutdown.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    engine.finish_burst(generation).await;
                }
                _ = cancel_token.cancelled() => {}
            }
        });

        *timer_guard = Some(handle);
    }

    async fn cancel_idle_timer(&self) {
        if let Some(handle) = self.idle_timer.lock().await.take() {
            handle.abort();
        }
    }

    async fn finish_burst(&self, generation: u64) {
        let now = self.clock.now_ms();
        let (appended, was_recording) = {
            let mut state = self.state.lock().await;
            if state.recorder.pending().map(|d| d.generation) != Some(generation) {
                // Superseded by a later keystroke while waiting for the lock.
                return;
            }
            let was_recording = state.recorder.is_recording();
            let candidate = state.recorder.finish(generation, now);
            let appended = candidate.and_then(|c| append_to_active(&mut state.registry, c));
            (appended, was_recording)
        };
        self.publish_finish(appended, was_recording);
    }

    fn publish_finish(&self, appended: Option<(String, Spurt)>, was_recording: bool) -> Option<Spurt> {
        if was_recording {
            self.emit(RegistryEvent::RecorderChanged { recording: false });
        }
        let (stream_id, spurt) = appended?;
        self.emit(RegistryEvent::SpurtAppended {
            stream_id,
            spurt: spurt.clone(),
        });
        Some(spurt)
    }

    fn emit(&self, event: RegistryEvent) {
        log_debug!("emitting {}", event.name());
        // No subscribers is fine; the registry stays the source of truth.
        let _ = self.events.send(event);
    }
}

fn append_to_active(
    registry: &mut StreamRegistry,
    candidate: crate::models::SpurtCandidate,
) -> Option<(String, Spurt)> {
    let stream_id = registry.active_stream_id().to_string();
    let spurt = registry.append_spurt(candidate)?;
    log_info!("spurt finished: {:?} -> stream {}", spurt.text, stream_id);
    Some((stream_id, spurt))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUT: u64 = 1_000;

    fn engine() -> SpurtEngine {
        SpurtEngine::with_clock(
            SegmentationConfig::new(CUT, 1_000),
            Arc::new(AnchoredClock::starting_at(0)),
        )
    }

    async fn pause(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    async fn active_spurts(engine: &SpurtEngine) -> Vec<Spurt> {
        let id = engine.active_stream_id().await;
        engine.view(&id).await.unwrap().stream.spurts
    }

    #[tokio::test(start_paused = true)]
    async fn keystrokes_within_threshold_form_one_spurt() {
        let engine = engine();
        engine.input("a").await;
        pause(300).await;
        engine.input("ab").await;
        pause(300).await;
        engine.input("abc").await;
        pause(1_100).await;

        let spurts = active_spurts(&engine).await;
        assert_eq!(spurts.len(), 1);
        assert_eq!(spurts[0].text, "abc");
        assert_eq!(spurts[0].created_at, 1_600);
        assert!((spurts[0].duration - 0.6).abs() < 1e-9);
        assert!(spurts[0].is_paragraph_start);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_gap_splits_and_classifies_paragraphs() {
        let engine = engine();
        engine.input("a").await;
        pause(200).await;
        engine.input("ab").await;
        // Cut fires at 1200. Widget is cleared, next burst starts at 1500.
        pause(1_300).await;
        engine.input("c").await;
        pause(1_100).await;
        // Cut fires at 2500. Silence until 6000 opens a new paragraph.
        pause(3_400).await;
        engine.input("d").await;
        pause(1_500).await;

        let spurts = active_spurts(&engine).await;
        let texts: Vec<&str> = spurts.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["ab", "c", "d"]);
        assert!(spurts[0].is_paragraph_start);
        // gap = 2500 - (1200 + 200) = 1100 > 1000
        assert!(spurts[1].is_paragraph_start);
        // gap = 7000 - (2500 + 100) = 4400
        assert!(spurts[2].is_paragraph_start);
    }

    #[tokio::test(start_paused = true)]
    async fn short_pause_does_not_open_paragraph() {
        let engine = SpurtEngine::with_clock(
            SegmentationConfig::new(500, 5_000),
            Arc::new(AnchoredClock::starting_at(0)),
        );
        engine.input("one").await;
        pause(600).await;
        engine.input("t").await;
        engine.input("tw").await;
        pause(600).await;

        let spurts = active_spurts(&engine).await;
        assert_eq!(spurts.len(), 2);
        assert!(!spurts[1].is_paragraph_start);
    }

    #[tokio::test(start_paused = true)]
    async fn whitespace_burst_emits_nothing() {
        let engine = engine();
        let mut events = engine.subscribe();
        engine.input("  ").await;
        pause(1_500).await;

        assert!(active_spurts(&engine).await.is_empty());
        assert!(!engine.is_recording().await);
        assert_eq!(
            events.recv().await.unwrap(),
            RegistryEvent::RecorderChanged { recording: true }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            RegistryEvent::RecorderChanged { recording: false }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn spurt_lands_in_stream_active_when_timer_fires() {
        let engine = engine();
        let first = engine.active_stream_id().await;
        engine.input("hello").await;
        let second = engine.create_stream().await;
        pause(1_500).await;

        assert!(engine.view(&first).await.unwrap().stream.spurts.is_empty());
        assert_eq!(engine.view(&second).await.unwrap().stream.spurts.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn appended_spurts_are_broadcast() {
        let engine = engine();
        let mut events = engine.subscribe();
        engine.input("x").await;
        pause(1_500).await;

        let mut appended = None;
        while let Ok(event) = events.try_recv() {
            if let RegistryEvent::SpurtAppended { spurt, .. } = event {
                appended = Some(spurt);
            }
        }
        assert_eq!(appended.unwrap().text, "x");
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_flushes_pending_burst() {
        let engine = engine();
        engine.input("unfinished").await;
        pause(100).await;
        engine.shutdown().await.unwrap();

        let spurts = active_spurts(&engine).await;
        assert_eq!(spurts.len(), 1);
        assert_eq!(spurts[0].created_at, 100);

        engine.input("late").await;
        pause(2_000).await;
        assert_eq!(active_spurts(&engine).await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn commands_on_unknown_ids_emit_nothing() {
        let engine = engine();
        let mut events = engine.subscribe();
        engine.rename_stream("missing", "x").await;
        engine.clear_stream("missing").await;
        engine.delete_stream("missing").await;
        engine.set_active("missing").await;
        assert!(engine.cycle_view_mode("missing").await.is_none());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn views_project_by_mode() {
        let engine = engine();
        let id = engine.active_stream_id().await;
        engine.input("a").await;
        pause(1_500).await;
        engine.input("b").await;
        pause(1_500).await;

        assert_eq!(engine.cycle_view_mode(&id).await, Some(ViewMode::Ordered));
        let view = engine.view(&id).await.unwrap();
        match view.projection() {
            Projection::Ordered(entries) => {
                assert_eq!(entries.len(), 2);
                assert!(entries[0].gap_after.is_some());
            }
            other => panic!("unexpected projection {:?}", other.mode()),
        }
        assert!(view.render().contains("[Ordered]"));
    }
}
