//! Timeline engine core.
//!
//! Everything that defines how clips occupy tracks and time: the clip data
//! model, track indexing, the mutating engine, playback position resolution,
//! and the shared handle multi-threaded hosts drive it through.

pub mod clip;
pub mod engine;
pub mod playback;
pub mod shared;
pub mod tracks;


pub use clip::{Clip, ClipDraft, ClipPatch, PipCorner, RecordingType};
pub use engine::{EditOutcome, RejectReason, TimelineEngine};
pub use playback::{
    resolve_active_clip, resolve_preview, OverlayTarget, PlaybackDriver, PreviewTarget,
};
pub use shared::{SharedTimeline, TimelineEvent};
pub use tracks::{is_master, track_label, MASTER_TRACK};
