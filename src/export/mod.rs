//! Export boundary.
//!
//! Reads the master-track sequence and hands trim points and paths to the
//! external encoder. Only a single master-track clip is exportable at a
//! time; multi-clip concatenation is a known limitation of this design
//! generation, surfaced as an explicit error rather than silently dropping
//! clips.

pub mod ffmpeg;

use std::path::{Path, PathBuf};

use serde::Serialize;
use ts_rs::TS;

use crate::error::{ClipForgeError, ClipForgeResult};
use crate::timeline::{PipCorner, TimelineEngine};

/// A fully-resolved export request for the external encoder.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum ExportJob {
    /// Trim one input to its window and encode it.
    Single(SingleClipExport),
    /// Composite a second input over the first as a corner inset.
    PipComposite(PipCompositeExport),
}

impl ExportJob {
    pub fn output_path(&self) -> &str {
        match self {
            ExportJob::Single(job) => &job.output_path,
            ExportJob::PipComposite(job) => &job.output_path,
        }
    }
}

/// Single-input export: trim window plus destination.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SingleClipExport {
    pub input_path: String,
    pub output_path: String,
    pub start_time: f64,
    pub end_time: f64,
}

/// Two-input export: the main clip's trim window, the overlay clip's trim
/// window, and the corner to anchor the inset at.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PipCompositeExport {
    pub main_path: String,
    pub pip_path: String,
    pub output_path: String,
    pub main_start_time: f64,
    pub main_end_time: f64,
    pub pip_start_time: f64,
    pub pip_end_time: f64,
    pub pip_position: PipCorner,
}

/// Build the export job for the current master track.
///
/// Exactly one master clip is required. A live PiP link selects the
/// composite form; a dangling link degrades to the single-input form
/// instead of failing.
pub fn build_export_job(
    engine: &TimelineEngine,
    output_path: impl Into<String>,
) -> ClipForgeResult<ExportJob> {
    let master = engine.master_clips();
    let clip = match master.as_slice() {
        [] => return Err(ClipForgeError::EmptyMasterTrack),
        [clip] => *clip,
        clips => {
            return Err(ClipForgeError::MultiClipExportUnsupported {
                clip_count: clips.len(),
            })
        }
    };
    let output_path = output_path.into();

    if let Some(link) = clip.pip_overlay_clip_id.as_deref() {
        match engine.clip(link) {
            Some(overlay) => {
                log::info!(
                    "[EXPORT] composite: '{}' + '{}' at {:?}",
                    clip.name,
                    overlay.name,
                    clip.pip_corner_or_default()
                );
                return Ok(ExportJob::PipComposite(PipCompositeExport {
                    main_path: clip.path.clone(),
                    pip_path: overlay.path.clone(),
                    output_path,
                    main_start_time: clip.start_time,
                    main_end_time: clip.end_time,
                    pip_start_time: overlay.start_time,
                    pip_end_time: overlay.end_time,
                    pip_position: clip.pip_corner_or_default(),
                }));
            }
            None => {
                log::warn!(
                    "[EXPORT] pip link {} on '{}' is dangling, exporting without overlay",
                    link,
                    clip.name
                );
            }
        }
    }

    log::info!(
        "[EXPORT] single: '{}' [{:.3}s - {:.3}s]",
        clip.name,
        clip.start_time,
        clip.end_time
    );
    Ok(ExportJob::Single(SingleClipExport {
        input_path: clip.path.clone(),
        output_path,
        start_time: clip.start_time,
        end_time: clip.end_time,
    }))
}

/// Default destination for an export: `<Documents>/<stem>_exported.mp4`,
/// falling back to the temp directory when no Documents folder exists.
pub fn default_output_path(clip_name: &str) -> PathBuf {
    let stem = Path::new(clip_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export".to_string());
    let dir = dirs::document_dir().unwrap_or_else(std::env::temp_dir);
    dir.join(format!("{}_exported.mp4", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{ClipDraft, ClipPatch, MASTER_TRACK};

    fn draft(name: &str, track: usize, duration: f64) -> ClipDraft {
        ClipDraft {
            name: name.to_string(),
            path: format!("/tmp/{}", name),
            duration,
            start_time: 0.0,
            end_time: duration,
            track,
            position: 0.0,
            file_size: None,
            recording_type: None,
        }
    }

    #[test]
    fn test_empty_master_track_is_an_error() {
        let mut engine = TimelineEngine::default();
        engine.add_clip(draft("staged.mp4", 1, 10.0));

        let err = build_export_job(&engine, "/tmp/out.mp4").unwrap_err();
        assert!(matches!(err, ClipForgeError::EmptyMasterTrack));
    }

    #[test]
    fn test_multi_clip_export_rejected() {
        let mut engine = TimelineEngine::default();
        engine.add_clip(draft("a.mp4", MASTER_TRACK, 10.0));
        engine.add_clip(draft("b.mp4", MASTER_TRACK, 5.0));

        let err = build_export_job(&engine, "/tmp/out.mp4").unwrap_err();
        assert!(matches!(
            err,
            ClipForgeError::MultiClipExportUnsupported { clip_count: 2 }
        ));
    }

    #[test]
    fn test_single_clip_job_carries_trim_window() {
        let mut engine = TimelineEngine::default();
        let id = engine.add_clip(draft("main.mp4", MASTER_TRACK, 20.0));
        let _ = engine.set_trim_points(&id, 2.5, 14.0);

        let job = build_export_job(&engine, "/tmp/out.mp4").unwrap();
        match job {
            ExportJob::Single(single) => {
                assert_eq!(single.input_path, "/tmp/main.mp4");
                assert_eq!(single.start_time, 2.5);
                assert_eq!(single.end_time, 14.0);
                assert_eq!(single.output_path, "/tmp/out.mp4");
            }
            other => panic!("expected single export, got {:?}", other),
        }
    }

    #[test]
    fn test_pip_link_selects_composite_job() {
        let mut engine = TimelineEngine::default();
        let main = engine.add_clip(draft("main.mp4", MASTER_TRACK, 20.0));
        let cam = engine.add_clip(draft("cam.mp4", 1, 15.0));
        let _ = engine.set_trim_points(&cam, 1.0, 9.0);
        let _ = engine.set_pip_overlay(&main, &cam, PipCorner::TopRight);

        let job = build_export_job(&engine, "/tmp/out.mp4").unwrap();
        match job {
            ExportJob::PipComposite(pip) => {
                assert_eq!(pip.main_path, "/tmp/main.mp4");
                assert_eq!(pip.pip_path, "/tmp/cam.mp4");
                assert_eq!(pip.pip_start_time, 1.0);
                assert_eq!(pip.pip_end_time, 9.0);
                assert_eq!(pip.pip_position, PipCorner::TopRight);
            }
            other => panic!("expected composite export, got {:?}", other),
        }
    }

    #[test]
    fn test_dangling_pip_link_degrades_to_single() {
        let mut engine = TimelineEngine::default();
        let main = engine.add_clip(draft("main.mp4", MASTER_TRACK, 20.0));
        let cam = engine.add_clip(draft("cam.mp4", 1, 15.0));
        let _ = engine.set_pip_overlay(&main, &cam, PipCorner::BottomLeft);
        let _ = engine.remove_clip(&cam);

        // Link still present on the master clip, but unresolvable.
        assert!(engine.clip(&main).unwrap().pip_overlay_clip_id.is_some());
        let job = build_export_job(&engine, "/tmp/out.mp4").unwrap();
        assert!(matches!(job, ExportJob::Single(_)));
    }

    #[test]
    fn test_unset_corner_defaults_to_bottom_left() {
        let mut engine = TimelineEngine::default();
        let main = engine.add_clip(draft("main.mp4", MASTER_TRACK, 20.0));
        let cam = engine.add_clip(draft("cam.mp4", 1, 15.0));
        let _ = engine.update_clip(
            &main,
            ClipPatch {
                pip_overlay_clip_id: Some(Some(cam.clone())),
                ..Default::default()
            },
        );

        let job = build_export_job(&engine, "/tmp/out.mp4").unwrap();
        match job {
            ExportJob::PipComposite(pip) => {
                assert_eq!(pip.pip_position, PipCorner::BottomLeft)
            }
            other => panic!("expected composite export, got {:?}", other),
        }
    }

    #[test]
    fn test_default_output_path_naming() {
        let path = default_output_path("screen capture.mp4");
        let name = path.file_name().unwrap().to_string_lossy();
        assert_eq!(name, "screen capture_exported.mp4");
    }
}
