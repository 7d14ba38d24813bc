//! Error types for the eyewear measurement library.
//!
//! Per-tick validation failures (face out of range, frame not worn, depth
//! missing for a moment) are *not* errors — they surface as hints and a
//! progress reset on the tick report. `Error` covers setup problems and
//! collaborator failures that the caller must handle.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// The device lacks a capability the selected camera mode requires
    /// (e.g. front mode without face tracking). Reported once at session
    /// construction, never per tick.
    #[error("Capability unavailable: {0}")]
    Capability(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Depth buffer layout does not match its declared dimensions
    #[error("Depth buffer error: {0}")]
    DepthBuffer(String),

    /// The external contour/landmark detector failed
    #[error("Detection error: {0}")]
    Detection(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
