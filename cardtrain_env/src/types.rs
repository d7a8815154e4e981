//! Common types for the CardTrain environment abstraction.

use serde::{Deserialize, Serialize};

/// One entry of the card feed.
///
/// The feed only promises an image URL, and even that may be missing. A
/// descriptor without a URL still occupies a slot on the rail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDescriptor {
    /// Image URL (absolute or relative to the feed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

impl CardDescriptor {
    /// Creates a descriptor for the given image URL.
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
        }
    }

    /// Creates a descriptor with no image.
    pub fn empty() -> Self {
        Self { src: None }
    }

    /// Returns the URL if present and non-blank.
    pub fn url(&self) -> Option<&str> {
        self.src.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Decoded image metadata returned by an [`crate::AssetLoader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, with zero dimensions treated as 1.
    pub fn aspect(&self) -> f64 {
        let w = self.width.max(1) as f64;
        let h = self.height.max(1) as f64;
        let aspect = w / h;
        if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        }
    }
}
