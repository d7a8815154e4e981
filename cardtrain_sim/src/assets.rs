//! Seeded asset loader and feed source.
//!
//! Every outcome is a pure function of `(seed, url)`, so a scenario sees the
//! same sizes and failures no matter in which order the loads complete.

use async_trait::async_trait;
use cardtrain_env::{AssetLoader, EnvError, FeedSource, ImageInfo};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Image loader with seeded sizes and failure rates.
#[derive(Debug)]
pub struct SimAssetLoader {
    seed: u64,

    /// Probability that any single load fails
    failure_rate: f64,

    /// Loads whose URL contains this fragment always fail
    fail_fragment: Option<String>,

    requests: AtomicU64,
}

impl SimAssetLoader {
    /// Creates a loader where every image loads.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            failure_rate: 0.0,
            fail_fragment: None,
            requests: AtomicU64::new(0),
        }
    }

    /// Sets the probability that a load fails.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Makes every URL containing `fragment` fail (e.g. `"_blur"`).
    pub fn failing_urls_containing(mut self, fragment: impl Into<String>) -> Self {
        self.fail_fragment = Some(fragment.into());
        self
    }

    /// Number of loads requested so far.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// The outcome for `url`, without counting a request.
    pub fn outcome_for(&self, url: &str) -> Result<ImageInfo, EnvError> {
        if let Some(fragment) = &self.fail_fragment {
            if url.contains(fragment.as_str()) {
                return Err(EnvError::asset(url, "404 not found"));
            }
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed ^ fnv1a(url));
        if rng.gen::<f64>() < self.failure_rate {
            return Err(EnvError::asset(url, "decode failed"));
        }

        Ok(ImageInfo::new(rng.gen_range(600..=1600), rng.gen_range(400..=1200)))
    }
}

#[async_trait]
impl AssetLoader for SimAssetLoader {
    async fn load_image(&self, url: &str) -> Result<ImageInfo, EnvError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.outcome_for(url)
    }
}

/// What the simulated feed endpoint returns.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMode {
    /// A well-formed feed with this many cards
    Cards(usize),

    /// The request itself fails
    Unavailable,

    /// The endpoint answers with something that is not JSON
    Garbage,

    /// Exact body to return
    Raw(String),
}

/// Feed endpoint stand-in.
#[derive(Debug, Clone)]
pub struct SimFeedSource {
    mode: FeedMode,
}

impl SimFeedSource {
    pub fn new(mode: FeedMode) -> Self {
        Self { mode }
    }

    pub fn with_cards(count: usize) -> Self {
        Self::new(FeedMode::Cards(count))
    }

    /// Builds the JSON body for `count` cards.
    pub fn feed_json(count: usize) -> String {
        let cards: Vec<serde_json::Value> = (0..count)
            .map(|i| serde_json::json!({ "src": format!("cards/{:03}.jpg", i) }))
            .collect();
        serde_json::json!({ "cards": cards }).to_string()
    }
}

#[async_trait]
impl FeedSource for SimFeedSource {
    async fn fetch_feed(&self) -> Result<Vec<u8>, EnvError> {
        match &self.mode {
            FeedMode::Cards(count) => Ok(Self::feed_json(*count).into_bytes()),
            FeedMode::Unavailable => Err(EnvError::feed("connection refused")),
            FeedMode::Garbage => Ok(b"<!doctype html><title>502</title>".to_vec()),
            FeedMode::Raw(body) => Ok(body.clone().into_bytes()),
        }
    }
}

/// FNV-1a, used to give each URL its own RNG stream.
fn fnv1a(s: &str) -> u64 {
    s.bytes().fold(0xcbf29ce484222325u64, |hash, b| {
        (hash ^ b as u64).wrapping_mul(0x100000001b3)
    })
}
