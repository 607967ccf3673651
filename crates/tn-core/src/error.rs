//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

/// Errors produced by tile addressing and the binary codec.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("zoom level {0} is not supported (max {max})", max = crate::tiles::MAX_ZOOM)]
    InvalidZoom(u32),

    #[error("tile ({x}, {y}) is outside zoom level {zoom}")]
    TileOutOfRange { x: u32, y: u32, zoom: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid data: unknown {what} version {found} (expected {supported})")]
    UnknownVersion {
        what:      &'static str,
        found:     u64,
        supported: u64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `tn-core`.
pub type CoreResult<T> = Result<T, CoreError>;
