//! Media boundary: imported files and finished recordings.
//!
//! The engine never probes media itself. The import collaborator hands over
//! name/path/duration (and optionally dimensions and file size) once the
//! metadata is known; the recording collaborator does the same when a
//! capture session completes. Both paths reduce to `add_clip` drafts.

use std::path::PathBuf;

use chrono::Local;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ClipForgeResult;
use crate::timeline::{ClipDraft, RecordingType, TimelineEngine};

/// An importable media file with its probed metadata.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MediaFile {
    /// Display name, usually the filename.
    pub name: String,
    /// Resolvable path/URL of the media.
    pub path: String,
    /// Decodable length in seconds.
    pub duration: f64,
    /// Frame width, when the probe reported it.
    #[serde(default)]
    pub width: Option<u32>,
    /// Frame height, when the probe reported it.
    #[serde(default)]
    pub height: Option<u32>,
    /// File size in bytes.
    #[serde(default)]
    #[ts(type = "number | null")]
    pub file_size: Option<u64>,
}

impl MediaFile {
    /// Draft a full-length, untrimmed clip of this file.
    pub fn to_draft(&self, track: usize, position: f64) -> ClipDraft {
        ClipDraft {
            name: self.name.clone(),
            path: self.path.clone(),
            duration: self.duration,
            start_time: 0.0,
            end_time: self.duration,
            track,
            position,
            file_size: self.file_size,
            recording_type: None,
        }
    }
}

/// A capture session's output, ready to land on the timeline.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FinishedRecording {
    /// Path the recorder wrote the file to.
    pub path: String,
    /// Decodable length in seconds.
    pub duration: f64,
    /// How the session captured.
    pub recording_type: RecordingType,
    /// File size in bytes.
    #[serde(default)]
    #[ts(type = "number | null")]
    pub file_size: Option<u64>,
}

/// Place an imported file on a staging track at an explicit position
/// (the drag-and-drop target the user picked).
pub fn import_media(
    engine: &mut TimelineEngine,
    media: &MediaFile,
    track: usize,
    position: f64,
) -> String {
    log::debug!("[MEDIA] import '{}' -> track {}", media.name, track);
    engine.add_clip(media.to_draft(track, position))
}

/// Place an imported file on the first staging track at the playhead
/// (the preview-drop path).
pub fn import_media_at_playhead(engine: &mut TimelineEngine, media: &MediaFile) -> String {
    let position = engine.current_time();
    import_media(engine, media, 1, position)
}

/// Land a finished recording on the lowest collision-free staging track.
/// The clip is named after the local wall-clock time the session ended.
pub fn ingest_recording(engine: &mut TimelineEngine, recording: &FinishedRecording) -> String {
    let track = engine.get_next_available_track();
    let name = format!("Recording {}", Local::now().format("%H:%M:%S"));
    log::info!(
        "[MEDIA] recording finished ({:?}, {:.1}s) -> track {}",
        recording.recording_type,
        recording.duration,
        track
    );

    engine.add_clip(ClipDraft {
        name,
        path: recording.path.clone(),
        duration: recording.duration,
        start_time: 0.0,
        end_time: recording.duration,
        track,
        position: 0.0,
        file_size: recording.file_size,
        recording_type: Some(recording.recording_type),
    })
}

/// Persist raw media bytes handed over by the shell into the temp directory
/// and return the resolvable path. Used for blob-backed imports whose file
/// path is generated lazily, right before an export needs one.
pub fn stage_media_bytes(file_name: &str, bytes: &[u8]) -> ClipForgeResult<PathBuf> {
    let path = std::env::temp_dir().join(file_name);
    std::fs::write(&path, bytes)?;
    log::debug!("[MEDIA] staged {} bytes at {}", bytes.len(), path.display());
    Ok(path)
}

/// Format a timeline position as `m:ss` for rulers and the time display.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::MASTER_TRACK;

    fn media(name: &str, duration: f64) -> MediaFile {
        MediaFile {
            name: name.to_string(),
            path: format!("/tmp/{}", name),
            duration,
            width: Some(1920),
            height: Some(1080),
            file_size: Some(5_000_000),
        }
    }

    #[test]
    fn test_draft_covers_full_source() {
        let draft = media("intro.mp4", 42.5).to_draft(1, 3.0);
        assert_eq!(draft.start_time, 0.0);
        assert_eq!(draft.end_time, 42.5);
        assert_eq!(draft.track, 1);
        assert_eq!(draft.position, 3.0);
        assert!(draft.recording_type.is_none());
    }

    #[test]
    fn test_import_at_playhead() {
        let mut engine = TimelineEngine::default();
        engine.set_current_time(7.5);

        let id = import_media_at_playhead(&mut engine, &media("drop.mp4", 10.0));
        let clip = engine.clip(&id).unwrap();
        assert_eq!(clip.track, 1);
        assert_eq!(clip.position, 7.5);
    }

    #[test]
    fn test_recording_lands_on_free_track() {
        let mut engine = TimelineEngine::default();
        import_media(&mut engine, &media("staged.mp4", 5.0), 1, 0.0);

        let rec = FinishedRecording {
            path: "/tmp/recording_1.mp4".to_string(),
            duration: 12.0,
            recording_type: RecordingType::Webcam,
            file_size: None,
        };
        let id = ingest_recording(&mut engine, &rec);

        let clip = engine.clip(&id).unwrap();
        assert_eq!(clip.track, 2, "track 1 is occupied");
        assert_ne!(clip.track, MASTER_TRACK);
        assert_eq!(clip.position, 0.0);
        assert_eq!(clip.recording_type, Some(RecordingType::Webcam));
        assert!(clip.name.starts_with("Recording "));
    }

    #[test]
    fn test_stage_media_bytes_round_trips() {
        let name = format!("clipforge-test-{}.bin", std::process::id());
        let path = stage_media_bytes(&name, b"not really a video").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"not really a video");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "0:00");
        assert_eq!(format_timestamp(65.4), "1:05");
        assert_eq!(format_timestamp(600.0), "10:00");
        assert_eq!(format_timestamp(-3.0), "0:00");
    }
}
