//! The timeline engine.
//!
//! Owns the clip collection and every mutating operation over it: add,
//! remove, update, move, split, combine, trim, PiP linking, and master-track
//! continuity repair. One engine instance per editing session; collaborators
//! receive it by reference (or through `SharedTimeline`), never through a
//! global.

use crate::config::EngineConfig;
use serde::Serialize;
use ts_rs::TS;

use super::clip::{generate_clip_id, Clip, ClipDraft, ClipPatch, PipCorner, RecordingType};
use super::tracks::{self, MASTER_TRACK};

// ============================================================================
// Edit outcomes
// ============================================================================

/// Result of a structural mutation.
///
/// Infeasible requests are rejected without touching state. Callers are
/// expected to have pre-checked feasibility through a query, so a rejection
/// is ordinary control flow, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum EditOutcome {
    Applied,
    Rejected(RejectReason),
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied)
    }
}

/// Why a mutation was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum RejectReason {
    /// No clip with the given id.
    NoSuchClip,
    /// Split point outside the clip's effective span.
    OutsideClipSpan,
    /// Split would leave a segment shorter than the configured floor.
    SegmentTooShort,
    /// Combine operands sit on different tracks.
    DifferentTracks,
    /// Combine operands are not positionally adjacent.
    NotAdjacent,
}

// ============================================================================
// Engine
// ============================================================================

/// The timeline store: all clips plus the timeline-wide scalars.
#[derive(Debug, Clone)]
pub struct TimelineEngine {
    config: EngineConfig,
    clips: Vec<Clip>,
    current_time: f64,
    zoom_level: f64,
    is_playing: bool,
    selected_clips: Vec<String>,
    dragging_clip: Option<String>,
    preferred_track: Option<usize>,
    /// High-water mark of allocated source tracks. Grows on demand, never
    /// shrinks, even when high-numbered tracks empty out.
    num_source_tracks: usize,
}

impl Default for TimelineEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl TimelineEngine {
    /// Create an empty timeline. The editor starts with two staging tracks,
    /// matching the default track layout of the timeline panel.
    pub fn new(mut config: EngineConfig) -> Self {
        config.validate();
        let zoom_level = config.default_zoom;
        Self {
            config,
            clips: Vec::new(),
            current_time: 0.0,
            zoom_level,
            is_playing: false,
            selected_clips: Vec::new(),
            dragging_clip: None,
            preferred_track: None,
            num_source_tracks: 2,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn selected_clips(&self) -> &[String] {
        &self.selected_clips
    }

    pub fn dragging_clip(&self) -> Option<&str> {
        self.dragging_clip.as_deref()
    }

    pub fn preferred_track(&self) -> Option<usize> {
        self.preferred_track
    }

    pub fn num_source_tracks(&self) -> usize {
        self.num_source_tracks
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Look up a clip by id.
    pub fn clip(&self, id: &str) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    fn clip_mut(&mut self, id: &str) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == id)
    }

    /// All clips on a track, in array order.
    pub fn clips_on_track(&self, track: usize) -> Vec<&Clip> {
        self.clips.iter().filter(|c| c.track == track).collect()
    }

    /// Master-track clips sorted by position: the exported program order.
    pub fn master_clips(&self) -> Vec<&Clip> {
        let mut clips = self.clips_on_track(MASTER_TRACK);
        clips.sort_by(|a, b| a.position.total_cmp(&b.position));
        clips
    }

    /// Where the next master-track clip would land: the end of the current
    /// master sequence, 0 when the track is empty.
    pub fn master_append_point(&self) -> f64 {
        self.clips
            .iter()
            .filter(|c| c.track == MASTER_TRACK)
            .map(|c| c.end_position())
            .fold(0.0, f64::max)
    }

    /// First clip (array order) on `track` whose effective span contains `time`.
    pub fn clip_at(&self, track: usize, time: f64) -> Option<&Clip> {
        self.clips
            .iter()
            .find(|c| c.track == track && c.contains(time))
    }

    /// First clip (array order) on any track whose effective span contains `time`.
    pub fn any_clip_at(&self, time: f64) -> Option<&Clip> {
        self.clips.iter().find(|c| c.contains(time))
    }

    /// Whether any clip sits under `time`. The split tool checks this before
    /// enabling itself.
    pub fn has_clip_at(&self, time: f64) -> bool {
        self.any_clip_at(time).is_some()
    }

    /// The clip that starts where `id` ends, within the merge tolerance.
    /// This is the pre-check the merge tool runs before `combine_clips`.
    pub fn find_adjacent_clip(&self, id: &str) -> Option<&Clip> {
        let clip = self.clip(id)?;
        let seam = clip.end_position();
        self.clips
            .iter()
            .find(|c| {
                c.track == clip.track
                    && c.id != clip.id
                    && (c.position - seam).abs() < self.config.merge_tolerance
            })
    }

    /// Latest effective end across all clips; 0 for an empty timeline.
    pub fn timeline_duration(&self) -> f64 {
        self.clips
            .iter()
            .map(|c| c.end_position())
            .fold(0.0, f64::max)
    }

    /// Display label for a track, derived from its current contents.
    pub fn track_label(&self, track: usize) -> String {
        tracks::track_label(&self.clips, track)
    }

    /// Source clips eligible as PiP overlays (webcam/pip recordings).
    pub fn pip_eligible_clips(&self) -> Vec<&Clip> {
        self.clips
            .iter()
            .filter(|c| {
                matches!(
                    c.recording_type,
                    Some(RecordingType::Webcam) | Some(RecordingType::Pip)
                )
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Structural mutations
    // ------------------------------------------------------------------

    /// Add a clip and return its fresh id.
    ///
    /// Master-track adds ignore the requested position and append at the end
    /// of the current master sequence, so the gap-free invariant holds after
    /// every add. Source-track adds honor the requested position as-is.
    pub fn add_clip(&mut self, draft: ClipDraft) -> String {
        let position = if draft.track == MASTER_TRACK {
            self.master_append_point()
        } else {
            self.ensure_track_exists(draft.track);
            draft.position.max(0.0)
        };

        let id = generate_clip_id();
        log::debug!(
            "[TIMELINE] add_clip '{}' track={} position={:.3} trim=[{:.3},{:.3}]",
            draft.name,
            draft.track,
            position,
            draft.start_time,
            draft.end_time
        );

        self.clips.push(Clip {
            id: id.clone(),
            name: draft.name,
            path: draft.path,
            duration: draft.duration,
            start_time: draft.start_time,
            end_time: draft.end_time,
            track: draft.track,
            position,
            file_size: draft.file_size,
            recording_type: draft.recording_type,
            pip_overlay_clip_id: None,
            pip_position: None,
        });
        id
    }

    /// Remove a clip by id. Continuity on the master track is not repaired
    /// here; callers invoke `ensure_master_track_continuity` when they need
    /// the output to stay gap-free. PiP links pointing at the removed clip
    /// are left in place and resolve to "no overlay" at read time.
    pub fn remove_clip(&mut self, id: &str) -> EditOutcome {
        let before = self.clips.len();
        self.clips.retain(|c| c.id != id);
        if self.clips.len() == before {
            return EditOutcome::Rejected(RejectReason::NoSuchClip);
        }
        log::debug!("[TIMELINE] remove_clip {}", id);
        EditOutcome::Applied
    }

    /// Shallow-merge `patch` into the clip. No validation: the trim and PiP
    /// convenience operations compute safe values before calling this.
    pub fn update_clip(&mut self, id: &str, patch: ClipPatch) -> EditOutcome {
        let Some(clip) = self.clip_mut(id) else {
            return EditOutcome::Rejected(RejectReason::NoSuchClip);
        };

        if let Some(name) = patch.name {
            clip.name = name;
        }
        if let Some(start_time) = patch.start_time {
            clip.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            clip.end_time = end_time;
        }
        if let Some(track) = patch.track {
            clip.track = track;
        }
        if let Some(position) = patch.position {
            clip.position = position;
        }
        if let Some(link) = patch.pip_overlay_clip_id {
            clip.pip_overlay_clip_id = link;
        }
        if let Some(corner) = patch.pip_position {
            clip.pip_position = corner;
        }
        EditOutcome::Applied
    }

    /// Move a clip to a new position/track.
    ///
    /// Promoting a staged clip onto the master track does not relocate it:
    /// the original stays put and a copy (fresh id) is appended to the master
    /// sequence, the same placement rule `add_clip` uses. Every other
    /// transition is an in-place update.
    pub fn move_clip(&mut self, id: &str, new_position: f64, new_track: usize) -> EditOutcome {
        let Some(clip) = self.clip(id) else {
            return EditOutcome::Rejected(RejectReason::NoSuchClip);
        };

        if new_track == MASTER_TRACK && clip.track != MASTER_TRACK {
            let mut copy = clip.clone();
            copy.id = generate_clip_id();
            copy.track = MASTER_TRACK;
            copy.position = self.master_append_point();
            log::debug!(
                "[TIMELINE] move_clip {} promoted to master as {} at {:.3}",
                id,
                copy.id,
                copy.position
            );
            self.clips.push(copy);
            return EditOutcome::Applied;
        }

        self.ensure_track_exists(new_track);
        let clip = self.clip_mut(id).expect("clip existence checked above");
        clip.position = new_position.max(0.0);
        clip.track = new_track;
        EditOutcome::Applied
    }

    /// Split a clip at a timeline-absolute time strictly inside its effective
    /// span. The original keeps the left half; a fresh clip takes the right
    /// half, starting exactly at the split point so the seam has no gap.
    pub fn split_clip(&mut self, id: &str, split_time: f64) -> EditOutcome {
        let min_len = self.config.min_clip_len;
        let Some(clip) = self.clip(id) else {
            return EditOutcome::Rejected(RejectReason::NoSuchClip);
        };
        if split_time <= clip.position || split_time >= clip.end_position() {
            return EditOutcome::Rejected(RejectReason::OutsideClipSpan);
        }

        let offset = split_time - clip.position;
        if offset < min_len || clip.trimmed_len() - offset < min_len {
            return EditOutcome::Rejected(RejectReason::SegmentTooShort);
        }

        let idx = self
            .clips
            .iter()
            .position(|c| c.id == id)
            .expect("clip existence checked above");

        let mut second = self.clips[idx].clone();
        second.id = generate_clip_id();
        second.start_time = self.clips[idx].start_time + offset;
        second.position = split_time;

        self.clips[idx].end_time = self.clips[idx].start_time + offset;

        log::debug!(
            "[TIMELINE] split_clip {} at {:.3} -> {} (offset {:.3})",
            id,
            split_time,
            second.id,
            offset
        );
        self.clips.insert(idx + 1, second);
        EditOutcome::Applied
    }

    /// Merge `second_id` into `first_id`.
    ///
    /// Only same-track, positionally adjacent pairs merge, with the first
    /// clip preceding the second. The survivor keeps the first clip's
    /// identity and position; its trim window grows by the second clip's
    /// trimmed length; the second clip is discarded. Master-track merges are
    /// followed by a continuity repair at the shared-handle layer.
    pub fn combine_clips(&mut self, first_id: &str, second_id: &str) -> EditOutcome {
        let (Some(first), Some(second)) = (self.clip(first_id), self.clip(second_id)) else {
            return EditOutcome::Rejected(RejectReason::NoSuchClip);
        };
        if first.track != second.track {
            return EditOutcome::Rejected(RejectReason::DifferentTracks);
        }
        if (first.end_position() - second.position).abs() >= self.config.merge_tolerance {
            return EditOutcome::Rejected(RejectReason::NotAdjacent);
        }

        let absorbed = second.trimmed_len();
        self.clips.retain(|c| c.id != second_id);
        let first = self
            .clip_mut(first_id)
            .expect("clip existence checked above");
        first.end_time += absorbed;

        log::debug!(
            "[TIMELINE] combine_clips {} <- {} (+{:.3}s)",
            first_id,
            second_id,
            absorbed
        );
        EditOutcome::Applied
    }

    /// Repair the master track: rewrite each clip's position to the running
    /// sum of its predecessors' trimmed lengths, in position order. Idempotent
    /// and order-preserving; the sole mechanism that restores the gap-free
    /// invariant after moves, removals, and merges.
    pub fn ensure_master_track_continuity(&mut self) {
        let mut order: Vec<usize> = (0..self.clips.len())
            .filter(|&i| self.clips[i].track == MASTER_TRACK)
            .collect();
        order.sort_by(|&a, &b| self.clips[a].position.total_cmp(&self.clips[b].position));

        let mut cursor = 0.0;
        let mut moved = 0usize;
        for i in order {
            let clip = &mut self.clips[i];
            if (clip.position - cursor).abs() > f64::EPSILON {
                clip.position = cursor;
                moved += 1;
            }
            cursor += clip.trimmed_len();
        }
        if moved > 0 {
            log::debug!("[TIMELINE] master continuity repaired ({} clips moved)", moved);
        }
    }

    // ------------------------------------------------------------------
    // Trim operations
    // ------------------------------------------------------------------

    /// Drag the start handle: clamps to `[0, end_time - min_clip_len]`.
    pub fn trim_start_to(&mut self, id: &str, time: f64) -> EditOutcome {
        let min_len = self.config.min_clip_len;
        let Some(clip) = self.clip(id) else {
            return EditOutcome::Rejected(RejectReason::NoSuchClip);
        };
        let new_start = time.clamp(0.0, clip.end_time - min_len);
        self.update_clip(
            id,
            ClipPatch {
                start_time: Some(new_start),
                ..Default::default()
            },
        )
    }

    /// Drag the end handle: clamps to `[start_time + min_clip_len, +inf)`.
    pub fn trim_end_to(&mut self, id: &str, time: f64) -> EditOutcome {
        let min_len = self.config.min_clip_len;
        let Some(clip) = self.clip(id) else {
            return EditOutcome::Rejected(RejectReason::NoSuchClip);
        };
        let new_end = time.max(clip.start_time + min_len);
        self.update_clip(
            id,
            ClipPatch {
                end_time: Some(new_end),
                ..Default::default()
            },
        )
    }

    /// Set both trim points, clamped so the clip keeps the minimum length.
    pub fn set_trim_points(&mut self, id: &str, start: f64, end: f64) -> EditOutcome {
        let min_len = self.config.min_clip_len;
        if self.clip(id).is_none() {
            return EditOutcome::Rejected(RejectReason::NoSuchClip);
        }
        let end = end.max(start + min_len);
        let start = start.clamp(0.0, end - min_len);
        self.update_clip(id, ClipPatch::trim(start, end))
    }

    // ------------------------------------------------------------------
    // PiP link operations
    // ------------------------------------------------------------------

    /// Attach a PiP overlay to a master-track clip. Both clips must exist at
    /// link time; the link may dangle later if the overlay clip is removed.
    pub fn set_pip_overlay(
        &mut self,
        master_id: &str,
        overlay_id: &str,
        corner: PipCorner,
    ) -> EditOutcome {
        if self.clip(overlay_id).is_none() {
            return EditOutcome::Rejected(RejectReason::NoSuchClip);
        }
        log::debug!(
            "[TIMELINE] pip overlay {} -> {} ({:?})",
            master_id,
            overlay_id,
            corner
        );
        self.update_clip(master_id, ClipPatch::pip_link(overlay_id, corner))
    }

    /// Detach a clip's PiP overlay, clearing both link fields.
    pub fn clear_pip_overlay(&mut self, master_id: &str) -> EditOutcome {
        self.update_clip(master_id, ClipPatch::clear_pip())
    }

    // ------------------------------------------------------------------
    // Track allocation
    // ------------------------------------------------------------------

    /// Lowest-numbered source track with no clips, allocating a new one when
    /// every existing track is occupied. Used to auto-place new recordings
    /// without collisions.
    pub fn get_next_available_track(&mut self) -> usize {
        for track in 1..=self.num_source_tracks {
            if !self.clips.iter().any(|c| c.track == track) {
                return track;
            }
        }
        self.num_source_tracks += 1;
        log::info!(
            "[TIMELINE] allocated source track {}",
            self.num_source_tracks
        );
        self.num_source_tracks
    }

    /// Raise the source-track high-water mark to cover `track`. Never lowers it.
    pub fn ensure_track_exists(&mut self, track: usize) {
        if track > self.num_source_tracks {
            self.num_source_tracks = track;
            log::info!("[TIMELINE] source tracks grown to {}", track);
        }
    }

    // ------------------------------------------------------------------
    // Scalar setters
    // ------------------------------------------------------------------

    /// Move the playhead. Negative times clamp to 0.
    pub fn set_current_time(&mut self, time: f64) {
        self.current_time = time.max(0.0);
    }

    /// Set the zoom multiplier. Non-positive values are ignored.
    pub fn set_zoom_level(&mut self, zoom: f64) {
        if zoom > 0.0 {
            self.zoom_level = zoom;
        }
    }

    /// Zoom step in, matching the toolbar's 1.5x buttons.
    pub fn zoom_in(&mut self) {
        self.zoom_level *= 1.5;
    }

    /// Zoom step out.
    pub fn zoom_out(&mut self) {
        self.zoom_level /= 1.5;
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.is_playing = playing;
    }

    pub fn set_selected_clips(&mut self, ids: Vec<String>) {
        self.selected_clips = ids;
    }

    pub fn set_dragging_clip(&mut self, id: Option<String>) {
        self.dragging_clip = id;
    }

    /// Hint used by the playback resolver to disambiguate overlapping clips.
    pub fn set_preferred_track(&mut self, track: Option<usize>) {
        self.preferred_track = track;
    }
}
