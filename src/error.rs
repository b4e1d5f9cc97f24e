//! Engine Error Types

use thiserror::Error;

/// Result type for canvas operations
pub type Result<T> = std::result::Result<T, CanvasError>;

/// Canvas engine error types
///
/// Expected empty-result situations (unknown contact, unmatched correlation
/// key, commit with too few samples) are deliberately *not* errors; they are
/// silent no-ops per the engine contract. Everything here is a genuine
/// failure the caller must handle.
#[derive(Error, Debug)]
pub enum CanvasError {
    /// Raster surface allocation was requested with a zero-area size
    #[error("invalid surface size: {width}x{height} at scale {scale}")]
    InvalidSurfaceSize {
        /// Requested logical width
        width: f64,
        /// Requested logical height
        height: f64,
        /// Requested device scale
        scale: f64,
    },

    /// Configuration failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Event channel closed while events were still expected
    #[error("event channel disconnected")]
    ChannelDisconnected,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
