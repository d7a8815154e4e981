//! Error types for the CardTrain environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvError {
    /// An image could not be fetched or decoded
    #[error("Asset error for {url}: {reason}")]
    AssetError { url: String, reason: String },

    /// A card had no source URL to load
    #[error("Missing asset URL")]
    MissingUrl,

    /// The card feed could not be fetched
    #[error("Feed error: {0}")]
    FeedError(String),

    /// Context operation failed
    #[error("Context error: {0}")]
    ContextError(String),

    /// Operation timed out
    #[error("Timeout after {0}ms")]
    Timeout(u64),
}

impl EnvError {
    /// Creates an asset error for the given URL.
    pub fn asset(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::AssetError {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a feed error.
    pub fn feed(msg: impl std::fmt::Display) -> Self {
        Self::FeedError(msg.to_string())
    }
}
