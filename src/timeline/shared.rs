//! Shared timeline handle.
//!
//! The engine itself is single-threaded by design; `SharedTimeline` is the
//! serialization layer a multi-threaded host uses. Every mutating call locks
//! the one writer mutex, applies atomically, and notifies subscribers after
//! the lock is released. Master-track repairs triggered by a mutation run in
//! a follow-up lock scope, never re-entrantly inside the mutation itself.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use serde::Serialize;
use ts_rs::TS;

use crate::config::EngineConfig;

use super::clip::{ClipDraft, ClipPatch, PipCorner};
use super::engine::{EditOutcome, TimelineEngine};
use super::playback::{self, PreviewTarget};
use super::tracks::MASTER_TRACK;

/// Change notification sent to subscribers after a mutation commits.
/// The rendering collaborator re-resolves the preview on each one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase", tag = "type")]
#[ts(export)]
pub enum TimelineEvent {
    /// The clip set changed (add/remove/update/move/split/combine/repair).
    ClipsChanged,
    /// The playhead moved.
    TimeChanged { time: f64 },
    /// Playback started or stopped.
    PlaybackChanged { playing: bool },
}

/// Cloneable handle to a timeline engine behind a single-writer mutex.
#[derive(Clone)]
pub struct SharedTimeline {
    engine: Arc<Mutex<TimelineEngine>>,
    subscribers: Arc<Mutex<Vec<Sender<TimelineEvent>>>>,
}

impl Default for SharedTimeline {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl SharedTimeline {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            engine: Arc::new(Mutex::new(TimelineEngine::new(config))),
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Run a read-only closure against the engine.
    pub fn with<R>(&self, f: impl FnOnce(&TimelineEngine) -> R) -> R {
        f(&self.engine.lock())
    }

    /// Run a mutating closure against the engine. No notification is sent;
    /// prefer the named operations below, which notify subscribers.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut TimelineEngine) -> R) -> R {
        f(&mut self.engine.lock())
    }

    /// Subscribe to change notifications. Dropped receivers are pruned on
    /// the next emit.
    pub fn subscribe(&self) -> Receiver<TimelineEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    fn emit(&self, event: TimelineEvent) {
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event).is_ok());
    }

    /// Repair master continuity in its own lock scope and notify again.
    fn repair_master(&self) {
        self.engine.lock().ensure_master_track_continuity();
        self.emit(TimelineEvent::ClipsChanged);
    }

    // ------------------------------------------------------------------
    // Clip mutations
    // ------------------------------------------------------------------

    pub fn add_clip(&self, draft: ClipDraft) -> String {
        let id = self.engine.lock().add_clip(draft);
        self.emit(TimelineEvent::ClipsChanged);
        id
    }

    /// Remove a clip; a master-track removal is followed by a continuity
    /// repair once the removal has been observed.
    pub fn remove_clip(&self, id: &str) -> EditOutcome {
        let (outcome, on_master) = {
            let mut engine = self.engine.lock();
            let on_master = engine.clip(id).map(|c| c.track == MASTER_TRACK);
            (engine.remove_clip(id), on_master.unwrap_or(false))
        };
        if outcome.is_applied() {
            self.emit(TimelineEvent::ClipsChanged);
            if on_master {
                self.repair_master();
            }
        }
        outcome
    }

    pub fn update_clip(&self, id: &str, patch: ClipPatch) -> EditOutcome {
        let outcome = self.engine.lock().update_clip(id, patch);
        if outcome.is_applied() {
            self.emit(TimelineEvent::ClipsChanged);
        }
        outcome
    }

    /// Move a clip. Any move that touches the master track (in-place shuffle
    /// or promotion copy) is followed by a continuity repair.
    pub fn move_clip(&self, id: &str, new_position: f64, new_track: usize) -> EditOutcome {
        let (outcome, touched_master) = {
            let mut engine = self.engine.lock();
            let was_master = engine
                .clip(id)
                .map(|c| c.track == MASTER_TRACK)
                .unwrap_or(false);
            let outcome = engine.move_clip(id, new_position, new_track);
            (outcome, was_master || new_track == MASTER_TRACK)
        };
        if outcome.is_applied() {
            self.emit(TimelineEvent::ClipsChanged);
            if touched_master {
                self.repair_master();
            }
        }
        outcome
    }

    pub fn split_clip(&self, id: &str, split_time: f64) -> EditOutcome {
        let outcome = self.engine.lock().split_clip(id, split_time);
        if outcome.is_applied() {
            self.emit(TimelineEvent::ClipsChanged);
        }
        outcome
    }

    /// Merge two clips; a master-track merge is followed by a continuity
    /// repair once the merge has been observed.
    pub fn combine_clips(&self, first_id: &str, second_id: &str) -> EditOutcome {
        let (outcome, on_master) = {
            let mut engine = self.engine.lock();
            let on_master = engine
                .clip(first_id)
                .map(|c| c.track == MASTER_TRACK)
                .unwrap_or(false);
            (engine.combine_clips(first_id, second_id), on_master)
        };
        if outcome.is_applied() {
            self.emit(TimelineEvent::ClipsChanged);
            if on_master {
                self.repair_master();
            }
        }
        outcome
    }

    pub fn set_trim_points(&self, id: &str, start: f64, end: f64) -> EditOutcome {
        let outcome = self.engine.lock().set_trim_points(id, start, end);
        if outcome.is_applied() {
            self.emit(TimelineEvent::ClipsChanged);
        }
        outcome
    }

    pub fn set_pip_overlay(&self, master_id: &str, overlay_id: &str, corner: PipCorner) -> EditOutcome {
        let outcome = self.engine.lock().set_pip_overlay(master_id, overlay_id, corner);
        if outcome.is_applied() {
            self.emit(TimelineEvent::ClipsChanged);
        }
        outcome
    }

    pub fn clear_pip_overlay(&self, master_id: &str) -> EditOutcome {
        let outcome = self.engine.lock().clear_pip_overlay(master_id);
        if outcome.is_applied() {
            self.emit(TimelineEvent::ClipsChanged);
        }
        outcome
    }

    /// Explicit continuity repair, for callers that batched raw mutations.
    pub fn ensure_master_track_continuity(&self) {
        self.repair_master();
    }

    // ------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------

    pub fn set_current_time(&self, time: f64) {
        let time = {
            let mut engine = self.engine.lock();
            engine.set_current_time(time);
            engine.current_time()
        };
        self.emit(TimelineEvent::TimeChanged { time });
    }

    pub fn set_playing(&self, playing: bool) {
        self.engine.lock().set_playing(playing);
        self.emit(TimelineEvent::PlaybackChanged { playing });
    }

    /// One playback tick: apply the end-of-clip policy against the latest
    /// committed state and notify for whatever changed.
    pub fn tick(&self) {
        let (before_time, before_playing, time, playing) = {
            let mut engine = self.engine.lock();
            let before_time = engine.current_time();
            let before_playing = engine.is_playing();
            playback::tick(&mut engine);
            (
                before_time,
                before_playing,
                engine.current_time(),
                engine.is_playing(),
            )
        };
        if time != before_time {
            self.emit(TimelineEvent::TimeChanged { time });
        }
        if playing != before_playing {
            self.emit(TimelineEvent::PlaybackChanged { playing });
        }
    }

    /// Resolve the preview descriptor for the current playhead position.
    pub fn resolve_preview(&self) -> Option<PreviewTarget> {
        playback::resolve_preview(&self.engine.lock())
    }
}
