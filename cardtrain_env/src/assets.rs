//! Asset and feed transport abstractions.

use crate::error::EnvError;
use crate::types::ImageInfo;
use async_trait::async_trait;

/// Loads card images.
///
/// # Implementations
///
/// - **Production**: HTTP fetch + decode, owned by the host
/// - **Simulation**: `SimAssetLoader` with seeded sizes and failures
///
/// Loads are spawned as background tasks; a slow or failing load never
/// delays a frame.
#[async_trait]
pub trait AssetLoader: Send + Sync + 'static {
    /// Fetches and decodes the image at `url`.
    ///
    /// # Returns
    /// * `Ok(ImageInfo)` - The texture is ready to attach
    /// * `Err(EnvError::AssetError)` - Fetch or decode failed
    async fn load_image(&self, url: &str) -> Result<ImageInfo, EnvError>;
}

/// Provides the raw card feed document.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetches the feed bytes (JSON).
    async fn fetch_feed(&self) -> Result<Vec<u8>, EnvError>;
}
