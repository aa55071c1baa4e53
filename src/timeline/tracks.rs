//! Track numbering and labeling rules.
//!
//! Track 0 is the single master/output track: its clip sequence is kept
//! gap-free and defines the exported program order. Tracks >= 1 are source
//! staging tracks, created on demand and never reclaimed.

use super::clip::{Clip, RecordingType};

/// The master/output track number.
pub const MASTER_TRACK: usize = 0;

/// Whether `track` is the master/output track.
pub fn is_master(track: usize) -> bool {
    track == MASTER_TRACK
}

/// Derive the display label for a track from the clips currently on it.
///
/// Recomputed on every query, never cached: a track that holds only screen
/// recordings reads "Screen Recording N", only webcam recordings "Camera
/// Recording N", anything else (mixed, untyped, empty) the generic
/// "Source Track N".
pub fn track_label(clips: &[Clip], track: usize) -> String {
    if is_master(track) {
        return "Master Track".to_string();
    }

    let mut kinds = clips
        .iter()
        .filter(|c| c.track == track)
        .map(|c| c.recording_type);

    let label = match kinds.next() {
        Some(first) if kinds.all(|k| k == first) => match first {
            Some(RecordingType::Screen) => "Screen Recording",
            Some(RecordingType::Webcam) => "Camera Recording",
            _ => "Source Track",
        },
        _ => "Source Track",
    };

    format!("{} {}", label, track)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::clip::generate_clip_id;

    fn clip_on(track: usize, recording_type: Option<RecordingType>) -> Clip {
        Clip {
            id: generate_clip_id(),
            name: "c".to_string(),
            path: "/tmp/c.mp4".to_string(),
            duration: 10.0,
            start_time: 0.0,
            end_time: 10.0,
            track,
            position: 0.0,
            file_size: None,
            recording_type,
            pip_overlay_clip_id: None,
            pip_position: None,
        }
    }

    #[test]
    fn test_master_track_label() {
        assert_eq!(track_label(&[], MASTER_TRACK), "Master Track");
    }

    #[test]
    fn test_uniform_screen_track() {
        let clips = vec![
            clip_on(1, Some(RecordingType::Screen)),
            clip_on(1, Some(RecordingType::Screen)),
        ];
        assert_eq!(track_label(&clips, 1), "Screen Recording 1");
    }

    #[test]
    fn test_uniform_webcam_track() {
        let clips = vec![clip_on(2, Some(RecordingType::Webcam))];
        assert_eq!(track_label(&clips, 2), "Camera Recording 2");
    }

    #[test]
    fn test_mixed_and_untyped_tracks_are_generic() {
        let mixed = vec![
            clip_on(1, Some(RecordingType::Screen)),
            clip_on(1, Some(RecordingType::Webcam)),
        ];
        assert_eq!(track_label(&mixed, 1), "Source Track 1");

        let untyped = vec![clip_on(3, None)];
        assert_eq!(track_label(&untyped, 3), "Source Track 3");

        // Empty tracks fall back to the generic label too.
        assert_eq!(track_label(&[], 4), "Source Track 4");
    }

    #[test]
    fn test_label_ignores_other_tracks() {
        let clips = vec![
            clip_on(1, Some(RecordingType::Screen)),
            clip_on(2, Some(RecordingType::Webcam)),
        ];
        assert_eq!(track_label(&clips, 1), "Screen Recording 1");
        assert_eq!(track_label(&clips, 2), "Camera Recording 2");
    }
}
