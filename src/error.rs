//! Central error types for the ClipForge timeline engine.
//!
//! This module provides typed errors for better error handling across the
//! crate. All errors implement `Serialize` so a host shell can forward them
//! over IPC unchanged.

use serde::Serialize;
use thiserror::Error;

/// Main error type for ClipForge operations.
#[derive(Error, Debug)]
pub enum ClipForgeError {
    /// Media import/ingest failed
    #[error("Media error: {0}")]
    MediaError(String),

    /// FFmpeg binary not found
    #[error("FFmpeg not found. Please ensure FFmpeg is installed or bundled.")]
    FfmpegNotFound,

    /// Export/encode pipeline error
    #[error("Export error: {0}")]
    ExportError(String),

    /// Nothing on the master track to export
    #[error("No clips on master track to export")]
    EmptyMasterTrack,

    /// More than one master-track clip queued for export.
    /// Multi-clip concatenation is a known limitation, not a bug.
    #[error("Multiple clip export not yet implemented. Please export clips one at a time.")]
    MultiClipExportUnsupported { clip_count: usize },

    /// Storage operation failed
    #[error("Storage error: {0}")]
    StorageError(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

/// Implement Serialize for IPC compatibility.
/// Host shells require errors to be serializable to send to the frontend.
impl Serialize for ClipForgeError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Serialize as the error message string
        serializer.serialize_str(&self.to_string())
    }
}

impl From<String> for ClipForgeError {
    fn from(msg: String) -> Self {
        ClipForgeError::Other(msg)
    }
}

impl From<&str> for ClipForgeError {
    fn from(msg: &str) -> Self {
        ClipForgeError::Other(msg.to_string())
    }
}

/// Extension trait for adding context to Results.
///
/// Similar to anyhow's `Context` trait, this allows chaining context
/// information onto errors for better debugging.
///
/// # Example
/// ```ignore
/// use clipforge::error::{ClipForgeResult, ResultExt};
///
/// fn locate_media(path: &str) -> ClipForgeResult<std::path::PathBuf> {
///     std::fs::canonicalize(path)
///         .context("failed to resolve media path")
/// }
/// ```
pub trait ResultExt<T> {
    /// Add context to an error, converting it to ClipForgeError::Other.
    fn context(self, msg: &str) -> ClipForgeResult<T>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F: FnOnce() -> String>(self, f: F) -> ClipForgeResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn context(self, msg: &str) -> ClipForgeResult<T> {
        self.map_err(|e| ClipForgeError::Other(format!("{}: {}", msg, e)))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> ClipForgeResult<T> {
        self.map_err(|e| ClipForgeError::Other(format!("{}: {}", f(), e)))
    }
}

/// Extension trait for adding context to Option types.
pub trait OptionExt<T> {
    /// Convert None to ClipForgeError::Other with the given message.
    fn context(self, msg: &str) -> ClipForgeResult<T>;

    /// Convert None to ClipForgeError::Other with a lazily evaluated message.
    fn with_context<F: FnOnce() -> String>(self, f: F) -> ClipForgeResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn context(self, msg: &str) -> ClipForgeResult<T> {
        self.ok_or_else(|| ClipForgeError::Other(msg.to_string()))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> ClipForgeResult<T> {
        self.ok_or_else(|| ClipForgeError::Other(f()))
    }
}

/// Type alias for Results using ClipForgeError.
pub type ClipForgeResult<T> = Result<T, ClipForgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClipForgeError::MediaError("bad probe".to_string());
        assert_eq!(err.to_string(), "Media error: bad probe");
    }

    #[test]
    fn test_error_serialization() {
        let err = ClipForgeError::FfmpegNotFound;
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("FFmpeg not found"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ClipForgeError = io_err.into();
        assert!(matches!(err, ClipForgeError::StorageError(_)));
    }

    #[test]
    fn test_from_string() {
        let err: ClipForgeError = "test error".into();
        assert!(matches!(err, ClipForgeError::Other(_)));
    }

    #[test]
    fn test_export_errors() {
        let export = ClipForgeError::ExportError("encoding failed".to_string());
        assert!(export.to_string().contains("Export error"));

        let empty = ClipForgeError::EmptyMasterTrack;
        assert!(empty.to_string().contains("master track"));

        let multi = ClipForgeError::MultiClipExportUnsupported { clip_count: 3 };
        assert!(multi.to_string().contains("not yet implemented"));
    }

    #[test]
    fn test_result_ext_context() {
        let result: Result<(), &str> = Err("original error");
        let with_context = result.context("operation failed");

        assert!(matches!(with_context, Err(ClipForgeError::Other(_))));
        let msg = with_context.unwrap_err().to_string();
        assert!(msg.contains("operation failed"));
        assert!(msg.contains("original error"));
    }

    #[test]
    fn test_result_ext_with_context() {
        let result: Result<(), &str> = Err("inner");
        let with_context = result.with_context(|| format!("ctx-{}", 42));

        let msg = with_context.unwrap_err().to_string();
        assert!(msg.contains("ctx-42"));
        assert!(msg.contains("inner"));
    }

    #[test]
    fn test_result_ext_ok_passthrough() {
        let result: Result<i32, &str> = Ok(42);
        let with_context = result.context("should not appear");

        assert_eq!(with_context.unwrap(), 42);
    }

    #[test]
    fn test_option_ext_context() {
        let opt: Option<i32> = None;
        let result = opt.context("value was missing");

        assert!(matches!(result, Err(ClipForgeError::Other(_))));
        assert!(result.unwrap_err().to_string().contains("value was missing"));
    }

    #[test]
    fn test_option_ext_some_passthrough() {
        let opt: Option<i32> = Some(42);
        let result = opt.context("should not appear");

        assert_eq!(result.unwrap(), 42);
    }
}
