//! ClipForge timeline engine.
//!
//! The core of the ClipForge video editor: the timeline data model and its
//! consistency rules. Clips occupy tracks and time; trimming, splitting and
//! merging mutate the model without corrupting positions; the master output
//! track is kept gap-free; and the playback resolver maps the playhead onto
//! whichever clip drives the preview, including picture-in-picture overlays.
//!
//! The UI shell, capture devices, decoders, and the encode process are
//! external collaborators. They talk to this crate through [`SharedTimeline`]
//! and the `media`/`export` boundary modules.

pub mod config;
pub mod error;
pub mod export;
pub mod media;
pub mod timeline;

pub use config::EngineConfig;
pub use error::{ClipForgeError, ClipForgeResult};
pub use timeline::{
    Clip, ClipDraft, ClipPatch, EditOutcome, OverlayTarget, PipCorner, PlaybackDriver,
    PreviewTarget, RecordingType, RejectReason, SharedTimeline, TimelineEngine, TimelineEvent,
    MASTER_TRACK,
};

/// Initialize logging for the process. Call once from the host shell;
/// respects `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
