//! Clip value types for the timeline.
//!
//! A Clip is one piece of media placed on the timeline: a trim window into
//! its source plus a track/position placement. The engine treats the media
//! reference as an opaque handle; duration and file size arrive already
//! probed by the import collaborator.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

// ============================================================================
// Clip
// ============================================================================

/// A single clip placed on the timeline.
///
/// The trim window `[start_time, end_time]` addresses the clip's own source
/// timeline; `position` places the trimmed span on the shared timeline. The
/// authoritative placement interval is `[position, end_position())`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Clip {
    /// Unique clip identifier, assigned at creation, immutable.
    pub id: String,
    /// Display label.
    pub name: String,
    /// Resolvable path/URL of the underlying media. Opaque to the engine.
    pub path: String,
    /// Total decodable length of the source in seconds. Fixed at import.
    pub duration: f64,
    /// Trim start inside the source, seconds.
    pub start_time: f64,
    /// Trim end inside the source, seconds. Always greater than `start_time`.
    pub end_time: f64,
    /// Track number. 0 is the master/output track, >= 1 are source tracks.
    #[ts(type = "number")]
    pub track: usize,
    /// Start time on the shared timeline, seconds.
    pub position: f64,
    /// Source file size in bytes, informational only.
    #[serde(default)]
    #[ts(type = "number | null")]
    pub file_size: Option<u64>,
    /// Set only for clips produced by a recording session.
    #[serde(default)]
    pub recording_type: Option<RecordingType>,
    /// Id of another clip to composite as a picture-in-picture overlay while
    /// this clip plays. Only meaningful on the master track. Soft reference:
    /// consumers resolve it at read time and treat a dangling id as
    /// "no overlay".
    #[serde(default)]
    pub pip_overlay_clip_id: Option<String>,
    /// Corner anchor for the PiP overlay.
    #[serde(default)]
    pub pip_position: Option<PipCorner>,
}

impl Clip {
    /// Placed length on the shared timeline, seconds.
    pub fn trimmed_len(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// End of the effective span on the shared timeline.
    pub fn end_position(&self) -> f64 {
        self.position + self.trimmed_len()
    }

    /// Whether `time` falls inside the effective span `[position, end_position())`.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.position && time < self.end_position()
    }

    /// Corner to use for an attached overlay. Bottom-left when a link exists
    /// but no corner was picked.
    pub fn pip_corner_or_default(&self) -> PipCorner {
        self.pip_position.unwrap_or(PipCorner::BottomLeft)
    }
}

/// Generate a fresh clip id.
pub(crate) fn generate_clip_id() -> String {
    format!("clip-{}", Uuid::new_v4())
}

// ============================================================================
// Recording type and PiP corner
// ============================================================================

/// How a recorded clip was captured. Used for track labeling and for
/// selecting PiP-eligible source clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum RecordingType {
    /// Screen capture.
    Screen,
    /// Webcam capture.
    Webcam,
    /// Combined screen+webcam capture.
    Pip,
}

/// Corner anchor for a picture-in-picture overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, Default)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum PipCorner {
    TopLeft,
    TopRight,
    #[default]
    BottomLeft,
    BottomRight,
}

// ============================================================================
// Draft and patch
// ============================================================================

/// Everything needed to create a clip, minus the id the engine assigns.
///
/// Numeric sanity (`start_time < end_time`) is a caller contract; the
/// import and recording paths construct drafts that satisfy it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ClipDraft {
    pub name: String,
    pub path: String,
    pub duration: f64,
    pub start_time: f64,
    pub end_time: f64,
    #[ts(type = "number")]
    pub track: usize,
    /// Requested timeline position. Ignored for the master track, which
    /// always appends.
    pub position: f64,
    #[serde(default)]
    #[ts(type = "number | null")]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub recording_type: Option<RecordingType>,
}

/// Partial update for `update_clip`: `Some` fields are written, `None`
/// fields are left alone. The PiP fields are doubly optional so a patch can
/// also clear them.
#[derive(Debug, Clone, Default)]
pub struct ClipPatch {
    pub name: Option<String>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub track: Option<usize>,
    pub position: Option<f64>,
    pub pip_overlay_clip_id: Option<Option<String>>,
    pub pip_position: Option<Option<PipCorner>>,
}

impl ClipPatch {
    /// Patch that sets both trim points.
    pub fn trim(start_time: f64, end_time: f64) -> Self {
        Self {
            start_time: Some(start_time),
            end_time: Some(end_time),
            ..Default::default()
        }
    }

    /// Patch that attaches a PiP overlay link.
    pub fn pip_link(overlay_clip_id: impl Into<String>, corner: PipCorner) -> Self {
        Self {
            pip_overlay_clip_id: Some(Some(overlay_clip_id.into())),
            pip_position: Some(Some(corner)),
            ..Default::default()
        }
    }

    /// Patch that clears both PiP link fields.
    pub fn clear_pip() -> Self {
        Self {
            pip_overlay_clip_id: Some(None),
            pip_position: Some(None),
            ..Default::default()
        }
    }
}
