//! Error types for record generation and export

use thiserror::Error;

/// Result type alias for generator and export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating or exporting a record
#[derive(Error, Debug)]
pub enum Error {
    /// Track identifier has no registered course pool
    #[error("Invalid track: {0}")]
    InvalidTrack(String),

    /// GPA requested over zero attempted hours
    #[error("GPA undefined: zero attempted hours")]
    DivisionUndefined,

    /// Rasterizing a capture region failed
    #[error("Capture failed for region '{region}': {reason}")]
    CaptureFailed { region: String, reason: String },

    /// Writing the exported file failed
    #[error("Save failed: {0}")]
    SaveFailed(String),

    /// Packing raster entries into an archive failed
    #[error("Archive assembly failed: {0}")]
    ArchiveFailed(String),

    /// Another export is still in flight
    #[error("An export is already in progress")]
    ExportInProgress,

    /// Export was cancelled at a suspension point
    #[error("Export cancelled")]
    Cancelled,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Failed to lay out or encode a surface
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::SaveFailed(err.to_string())
    }
}

impl Error {
    /// Whether this error came from the export path (capture, archive, save).
    pub fn is_export_failure(&self) -> bool {
        matches!(
            self,
            Error::CaptureFailed { .. }
                | Error::SaveFailed(_)
                | Error::ArchiveFailed(_)
                | Error::Cancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_failed_names_region() {
        let err = Error::CaptureFailed {
            region: "transcript".into(),
            reason: "surface detached".into(),
        };
        assert!(err.to_string().contains("transcript"));
        assert!(err.is_export_failure());
        assert!(!Error::DivisionUndefined.is_export_failure());
    }

    #[test]
    fn io_errors_surface_as_save_failures() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        assert!(matches!(Error::from(io), Error::SaveFailed(_)));
    }
}
