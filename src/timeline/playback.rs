//! Playback position resolution.
//!
//! Maps the playhead onto whichever clip should drive the preview, computes
//! the seek offset inside that clip's own source timeline (honoring trim),
//! resolves an attached PiP overlay, and applies the end-of-clip transition
//! policy on each playback tick.

use std::time::Duration;

use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use ts_rs::TS;

use super::clip::{Clip, PipCorner};
use super::engine::TimelineEngine;
use super::shared::SharedTimeline;
use super::tracks::MASTER_TRACK;

// ============================================================================
// Preview targets
// ============================================================================

/// What the rendering collaborator should show right now.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PreviewTarget {
    /// The active clip.
    pub clip_id: String,
    /// Media reference to load.
    pub path: String,
    /// Seek offset inside the clip's own source timeline, seconds.
    pub seek_time: f64,
    /// Picture-in-picture overlay, when the active clip carries a live link.
    pub overlay: Option<OverlayTarget>,
}

/// The PiP inset to composite over the main preview.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OverlayTarget {
    pub clip_id: String,
    pub path: String,
    /// Corner anchor for the inset.
    pub corner: PipCorner,
    /// Seek offset inside the overlay clip's source timeline, seconds.
    pub seek_time: f64,
}

// ============================================================================
// Active clip resolution
// ============================================================================

/// Three-tier priority search for the clip containing `time`, first match in
/// array order per tier: the preferred track if one is set, then the master
/// track, then any track.
pub fn resolve_active_clip(engine: &TimelineEngine, time: f64) -> Option<&Clip> {
    if let Some(track) = engine.preferred_track() {
        if let Some(clip) = engine.clip_at(track, time) {
            return Some(clip);
        }
    }
    if let Some(clip) = engine.clip_at(MASTER_TRACK, time) {
        return Some(clip);
    }
    engine.any_clip_at(time)
}

/// Resolve the preview descriptor for the current playhead position.
pub fn resolve_preview(engine: &TimelineEngine) -> Option<PreviewTarget> {
    let time = engine.current_time();
    let clip = resolve_active_clip(engine, time)?;
    let seek_time = clip.start_time + (time - clip.position);

    Some(PreviewTarget {
        clip_id: clip.id.clone(),
        path: clip.path.clone(),
        seek_time,
        overlay: resolve_overlay(engine, clip, time),
    })
}

/// Resolve a clip's PiP link for the given playhead time. The overlay shares
/// the main clip's timeline offset; it is inactive outside its own trim
/// window, and a dangling link reads as no overlay.
fn resolve_overlay(engine: &TimelineEngine, clip: &Clip, time: f64) -> Option<OverlayTarget> {
    let link = clip.pip_overlay_clip_id.as_deref()?;
    let Some(overlay) = engine.clip(link) else {
        log::debug!("[PLAYBACK] pip link {} on {} is dangling", link, clip.id);
        return None;
    };

    let seek_time = overlay.start_time + (time - clip.position);
    if seek_time < overlay.start_time || seek_time > overlay.end_time {
        return None;
    }

    Some(OverlayTarget {
        clip_id: overlay.id.clone(),
        path: overlay.path.clone(),
        corner: clip.pip_corner_or_default(),
        seek_time,
    })
}

// ============================================================================
// Tick / end-of-clip policy
// ============================================================================

/// A clip whose end boundary the playhead has just reached (within epsilon),
/// searched with the same tier priority as the active-clip resolver. Covers
/// the instant where the half-open span no longer contains the playhead.
fn ending_clip(engine: &TimelineEngine, time: f64, eps: f64) -> Option<&Clip> {
    let ending = |c: &&Clip| {
        time >= c.position && time >= c.end_position() - eps && time < c.end_position() + eps
    };
    if let Some(track) = engine.preferred_track() {
        if let Some(clip) = engine
            .clips()
            .iter()
            .find(|c| c.track == track && ending(c))
        {
            return Some(clip);
        }
    }
    if let Some(clip) = engine
        .clips()
        .iter()
        .find(|c| c.track == MASTER_TRACK && ending(c))
    {
        return Some(clip);
    }
    engine.clips().iter().find(ending)
}

/// Advance the playhead by one tick.
///
/// When the playhead reaches the effective end of the active clip, it jumps
/// to the same-track clip with the smallest position past the ending clip
/// (an exact boundary jump, not a minimal increment), or playback stops when
/// there is none. In a gap, time advances linearly until past the last
/// effective end.
pub fn tick(engine: &mut TimelineEngine) {
    if !engine.is_playing() {
        return;
    }

    let dt = engine.config().tick_interval;
    let eps = engine.config().end_epsilon;
    let time = engine.current_time();

    // Snapshot the placement of the clip under the playhead before mutating.
    // The boundary policy applies to the active clip only; the ending-clip
    // lookup covers the instant where the half-open span just released it.
    let active = resolve_active_clip(engine, time)
        .map(|c| (c.track, c.position, c.end_position()))
        .or_else(|| ending_clip(engine, time, eps).map(|c| (c.track, c.position, c.end_position())));

    match active {
        Some((track, position, end)) if time >= end - eps => {
            let next_start = engine
                .clips()
                .iter()
                .filter(|c| c.track == track && c.position > position)
                .map(|c| c.position)
                .min_by(f64::total_cmp);
            match next_start {
                Some(start) => {
                    log::debug!("[PLAYBACK] clip ended, jumping to {:.3}", start);
                    engine.set_current_time(start);
                }
                None => {
                    log::debug!("[PLAYBACK] reached end of track {}, stopping", track);
                    engine.set_playing(false);
                }
            }
        }
        Some(_) => engine.set_current_time(time + dt),
        None => {
            if time >= engine.timeline_duration() {
                log::debug!("[PLAYBACK] reached end of timeline, stopping");
                engine.set_playing(false);
            } else {
                // Gap: keep advancing until the next clip or the end.
                engine.set_current_time(time + dt);
            }
        }
    }
}

// ============================================================================
// Tick driver
// ============================================================================

/// Fixed-cadence playback clock.
///
/// Re-reads the latest committed timeline state on every tick, so edits made
/// between ticks are always observed. The driver is the only repeating task
/// the engine owns; everything else is synchronous.
pub struct PlaybackDriver {
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

impl PlaybackDriver {
    /// Spawn the tick loop on the current tokio runtime.
    pub fn spawn(timeline: SharedTimeline) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let tick_interval = timeline.with(|engine| engine.config().tick_interval);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs_f64(tick_interval));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => timeline.tick(),
                }
            }
        });

        Self { cancel, handle }
    }

    /// Request the loop to stop after the in-flight tick.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Stop and wait for the loop to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}
