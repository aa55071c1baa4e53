//! FFmpeg invocation for the export boundary.
//!
//! The encoder is an opaque external process: the engine hands it trim
//! points and paths and reads back an exit status. A failed export leaves
//! engine state untouched.

use std::path::PathBuf;
use std::process::Command;

use crate::error::{ClipForgeError, ClipForgeResult};
use crate::timeline::PipCorner;

use super::{ExportJob, PipCompositeExport, SingleClipExport};

/// Inset margin from the frame edge, in pixels. Matches the preview overlay.
const PIP_MARGIN: u32 = 16;

/// Find an ffmpeg binary using ffmpeg-sidecar's path resolution with
/// validation. Tests if the binary works, falls back to system PATH if not.
pub fn find_ffmpeg() -> Option<PathBuf> {
    let sidecar_path = ffmpeg_sidecar::paths::ffmpeg_path();

    if test_ffmpeg_binary(&sidecar_path) {
        log::debug!("[EXPORT] Using sidecar ffmpeg: {}", sidecar_path.display());
        return Some(sidecar_path);
    }

    let binary_name = if cfg!(windows) { "ffmpeg.exe" } else { "ffmpeg" };
    if let Some(path) = find_in_system_path(binary_name) {
        if test_ffmpeg_binary(&path) {
            log::debug!("[EXPORT] Using system ffmpeg: {}", path.display());
            return Some(path);
        }
    }

    log::warn!("[EXPORT] No working ffmpeg found");
    None
}

/// Whether an FFmpeg binary is reachable (bundled sidecar or PATH).
pub fn check_ffmpeg() -> bool {
    find_ffmpeg().is_some()
}

/// Test if an ffmpeg binary works by running -version
fn test_ffmpeg_binary(path: &PathBuf) -> bool {
    Command::new(path)
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Find an executable in system PATH
fn find_in_system_path(name: &str) -> Option<PathBuf> {
    let cmd = if cfg!(windows) { "where" } else { "which" };

    Command::new(cmd)
        .arg(name)
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                let path_str = String::from_utf8_lossy(&output.stdout);
                let first_line = path_str.lines().next()?.trim();
                if !first_line.is_empty() {
                    return Some(PathBuf::from(first_line));
                }
            }
            None
        })
}

/// Run an export job to completion, returning the output path.
pub fn run_export(job: &ExportJob) -> ClipForgeResult<PathBuf> {
    let binary = find_ffmpeg().ok_or(ClipForgeError::FfmpegNotFound)?;
    let args = match job {
        ExportJob::Single(single) => single_clip_args(single),
        ExportJob::PipComposite(pip) => pip_composite_args(pip),
    };

    log::info!("[EXPORT] ffmpeg {}", args.join(" "));

    let output = Command::new(&binary)
        .args(&args)
        .output()
        .map_err(|e| {
            ClipForgeError::ExportError(format!(
                "Failed to execute FFmpeg: {}. Make sure FFmpeg is installed on your system.",
                e
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ClipForgeError::ExportError(format!(
            "FFmpeg error: {}",
            stderr
        )));
    }

    log::info!("[EXPORT] wrote {}", job.output_path());
    Ok(PathBuf::from(job.output_path()))
}

/// Arguments for a single-input trim export.
fn single_clip_args(job: &SingleClipExport) -> Vec<String> {
    let duration = job.end_time - job.start_time;
    vec![
        "-i".to_string(),
        job.input_path.clone(),
        "-ss".to_string(),
        format!("{}", job.start_time),
        "-t".to_string(),
        format!("{}", duration),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-preset".to_string(),
        "medium".to_string(),
        "-y".to_string(), // Overwrite output file
        job.output_path.clone(),
    ]
}

/// Arguments for a two-input PiP composite export. Both inputs are trimmed
/// in the filter graph; the overlay is scaled to a quarter-size inset and
/// anchored at the requested corner.
fn pip_composite_args(job: &PipCompositeExport) -> Vec<String> {
    let filter = format!(
        "[0:v]trim=start={ms}:end={me},setpts=PTS-STARTPTS[main];\
         [1:v]trim=start={ps}:end={pe},setpts=PTS-STARTPTS,scale=iw/4:ih/4[pip];\
         [main][pip]overlay={pos}[vout];\
         [0:a]atrim=start={ms}:end={me},asetpts=PTS-STARTPTS[aout]",
        ms = job.main_start_time,
        me = job.main_end_time,
        ps = job.pip_start_time,
        pe = job.pip_end_time,
        pos = overlay_position(job.pip_position),
    );

    vec![
        "-i".to_string(),
        job.main_path.clone(),
        "-i".to_string(),
        job.pip_path.clone(),
        "-filter_complex".to_string(),
        filter,
        "-map".to_string(),
        "[vout]".to_string(),
        "-map".to_string(),
        "[aout]".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-preset".to_string(),
        "medium".to_string(),
        "-y".to_string(),
        job.output_path.clone(),
    ]
}

/// Overlay filter coordinates for a corner anchor.
fn overlay_position(corner: PipCorner) -> String {
    match corner {
        PipCorner::TopLeft => format!("{m}:{m}", m = PIP_MARGIN),
        PipCorner::TopRight => format!("main_w-overlay_w-{m}:{m}", m = PIP_MARGIN),
        PipCorner::BottomLeft => format!("{m}:main_h-overlay_h-{m}", m = PIP_MARGIN),
        PipCorner::BottomRight => {
            format!("main_w-overlay_w-{m}:main_h-overlay_h-{m}", m = PIP_MARGIN)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_job() -> SingleClipExport {
        SingleClipExport {
            input_path: "/tmp/in.mp4".to_string(),
            output_path: "/tmp/out.mp4".to_string(),
            start_time: 3.0,
            end_time: 10.5,
        }
    }

    fn pip_job(corner: PipCorner) -> PipCompositeExport {
        PipCompositeExport {
            main_path: "/tmp/main.mp4".to_string(),
            pip_path: "/tmp/cam.mp4".to_string(),
            output_path: "/tmp/out.mp4".to_string(),
            main_start_time: 0.0,
            main_end_time: 10.0,
            pip_start_time: 1.0,
            pip_end_time: 9.0,
            pip_position: corner,
        }
    }

    #[test]
    fn test_single_clip_args() {
        let args = single_clip_args(&single_job());

        let ss = args.iter().position(|a| a == "-ss").unwrap();
        assert_eq!(args[ss + 1], "3");
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "7.5");

        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"aac".to_string()));
        assert!(args.contains(&"medium".to_string()));
        assert!(args.contains(&"-y".to_string()));
        assert_eq!(args.last().unwrap(), "/tmp/out.mp4");
    }

    #[test]
    fn test_pip_filter_trims_both_inputs() {
        let args = pip_composite_args(&pip_job(PipCorner::BottomLeft));
        let fc = args.iter().position(|a| a == "-filter_complex").unwrap();
        let filter = &args[fc + 1];

        assert!(filter.contains("trim=start=0:end=10"));
        assert!(filter.contains("trim=start=1:end=9"));
        assert!(filter.contains("scale=iw/4:ih/4"));
        assert!(filter.contains("atrim=start=0:end=10"));
    }

    #[test]
    fn test_overlay_corner_coordinates() {
        assert_eq!(overlay_position(PipCorner::TopLeft), "16:16");
        assert_eq!(
            overlay_position(PipCorner::TopRight),
            "main_w-overlay_w-16:16"
        );
        assert_eq!(
            overlay_position(PipCorner::BottomLeft),
            "16:main_h-overlay_h-16"
        );
        assert_eq!(
            overlay_position(PipCorner::BottomRight),
            "main_w-overlay_w-16:main_h-overlay_h-16"
        );
    }

    #[test]
    fn test_composite_maps_filtered_streams() {
        let args = pip_composite_args(&pip_job(PipCorner::TopLeft));
        assert!(args.contains(&"[vout]".to_string()));
        assert!(args.contains(&"[aout]".to_string()));
        assert_eq!(args.last().unwrap(), "/tmp/out.mp4");
    }
}
