//! Canvas error types

use thiserror::Error;

/// Errors raised while setting up surfaces and configuration.
///
/// Drawing calls never produce these; malformed script input is ignored.
#[derive(Error, Debug)]
pub enum CanvasError {
    /// Host reported a size that cannot back a surface
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSurfaceSize { width: f32, height: f32 },

    /// Surface id is not (or no longer) registered
    #[error("Unknown surface")]
    UnknownSurface,

    /// Failed to parse configuration
    #[error("Config parse failed: {0}")]
    Config(#[from] toml::de::Error),

    /// Failed to read configuration
    #[error("Config read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for canvas setup operations
pub type Result<T> = std::result::Result<T, CanvasError>;

/// Errors reported by a draw backend while replaying a command
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DrawError {
    /// Backend failed to execute a draw call
    #[error("Backend draw failed: {0}")]
    Backend(String),

    /// Backend cannot render the given text (missing font, shaping failure)
    #[error("Text rendering failed: {0}")]
    Text(String),
}
