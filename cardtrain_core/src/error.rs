//! Error types for configuration and feed handling.

use thiserror::Error;

/// Fatal configuration errors.
///
/// These are raised once, before the first frame. Nothing inside the frame
/// loop can fail.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The rail step vector has zero (or near-zero) length
    #[error("Rail step vector has zero length; direction is undefined")]
    ZeroStep,

    /// A value that must be finite is NaN or infinite
    #[error("Non-finite value for {0}")]
    NonFinite(&'static str),

    /// A value that must be strictly positive is not
    #[error("{field} must be > 0 (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    /// Wrap repeat count below 1
    #[error("Wrap repeat count must be >= 1 (got {0})")]
    InvalidRepeat(u32),

    /// Depth bias zero, negative, or not small relative to the card spacing
    #[error("Depth bias {eps} must be in (0, step length {step})")]
    DepthBiasOutOfRange { eps: f64, step: f64 },

    /// Camera clip planes out of order
    #[error("Camera planes must satisfy 0 < near < far (near={near}, far={far})")]
    ClipPlanes { near: f64, far: f64 },

    /// Orientation quaternion has zero length
    #[error("Card orientation quaternion has zero length")]
    ZeroOrientation,

    /// Config file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Card feed errors.
///
/// Always recovered by the caller (empty feed); exposed for logging and tests.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The feed source failed
    #[error("Feed unavailable: {0}")]
    Unavailable(#[from] cardtrain_env::EnvError),

    /// The feed is not valid JSON
    #[error("Feed is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}
