//! # Error Types
//!
//! Custom error types for the ground station using `thiserror`.

use thiserror::Error;

/// Errors raised while building or validating an FCP frame
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Buffer is shorter than the header (or than its declared payload)
    #[error("Frame truncated: need at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Embedded callsign does not match ours
    #[error("Frame not addressed to this station")]
    NotAddressedToUs,

    /// Optional data does not fit in the frame
    #[error("Optional data of {len} bytes exceeds maximum {max}")]
    PayloadTooLarge { len: usize, max: usize },

    /// Callsign is empty, non-printable or too long
    #[error("Invalid callsign: {0}")]
    InvalidCallsign(String),
}

/// Errors raised while interpreting the optional data of a known response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{layout} payload too short: expected {expected} bytes, got {actual}")]
    PayloadTooShort {
        layout: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{layout} payload too long: expected {expected} bytes, got {actual}")]
    PayloadTooLong {
        layout: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Main error type for the ground station
#[derive(Debug, Error)]
pub enum GroundStationError {
    /// FCP framing errors
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// Telemetry payload errors
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Radio driver reported a non-success status code
    #[error("Radio {operation} failed, code {code}")]
    Transport { operation: &'static str, code: i16 },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the ground station
pub type Result<T> = std::result::Result<T, GroundStationError>;
