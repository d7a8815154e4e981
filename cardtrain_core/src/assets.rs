//! Asynchronous texture loading.
//!
//! Every texture request becomes a background task that reports its result
//! on a channel. The engine drains that channel once per frame, so a load
//! never blocks a frame and layout never waits for one.

use crate::appearance::AssetRequest;
use cardtrain_env::{AssetLoader, EnvError, ImageInfo, LayerRole, TrainContext};
use std::sync::Arc;
use tokio::sync::mpsc;

/// A resolved texture load.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetEvent {
    /// Card index
    pub card: usize,

    /// Layer index within the card's panel
    pub layer: usize,

    pub role: LayerRole,
    pub url: String,
    pub result: Result<ImageInfo, EnvError>,
}

/// Spawns loads and collects their results.
#[derive(Debug)]
pub struct AssetPipeline {
    tx: mpsc::UnboundedSender<AssetEvent>,
    rx: mpsc::UnboundedReceiver<AssetEvent>,
    pending: usize,
    loaded: usize,
    failed: usize,
}

impl AssetPipeline {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            pending: 0,
            loaded: 0,
            failed: 0,
        }
    }

    /// Starts loading one texture for `card`.
    pub fn request<Ctx, L>(&mut self, context: &Ctx, loader: &Arc<L>, card: usize, request: &AssetRequest)
    where
        Ctx: TrainContext,
        L: AssetLoader,
    {
        let tx = self.tx.clone();
        let loader = Arc::clone(loader);
        let layer = request.layer;
        let role = request.role;
        let url = request.url.clone();

        self.pending += 1;
        context.spawn("asset-load", async move {
            let result = loader.load_image(&url).await;
            // The engine may already be gone; nothing left to update then
            let _ = tx.send(AssetEvent {
                card,
                layer,
                role,
                url,
                result,
            });
        });
    }

    /// Sender for hosts that resolve textures through their own machinery.
    pub fn sender(&self) -> mpsc::UnboundedSender<AssetEvent> {
        self.tx.clone()
    }

    /// Takes every result that has arrived since the last call.
    pub fn drain(&mut self) -> Vec<AssetEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            if event.result.is_ok() {
                self.loaded += 1;
            } else {
                self.failed += 1;
            }
            events.push(event);
        }
        events
    }

    /// Requests spawned but not yet drained.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn loaded(&self) -> usize {
        self.loaded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }
}

impl Default for AssetPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cardtrain_env::TokioContext;
    use std::time::Duration;

    struct FixedLoader;

    #[async_trait]
    impl AssetLoader for FixedLoader {
        async fn load_image(&self, url: &str) -> Result<ImageInfo, EnvError> {
            if url.contains("missing") {
                Err(EnvError::asset(url, "404"))
            } else {
                Ok(ImageInfo::new(400, 200))
            }
        }
    }

    fn request(url: &str) -> AssetRequest {
        AssetRequest {
            layer: 1,
            role: LayerRole::Sharp,
            url: url.to_string(),
        }
    }

    async fn drain_until(pipeline: &mut AssetPipeline, n: usize) -> Vec<AssetEvent> {
        let mut events = Vec::new();
        for _ in 0..100 {
            events.extend(pipeline.drain());
            if events.len() >= n {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        events
    }

    #[tokio::test]
    async fn test_results_arrive_on_drain() {
        let ctx = TokioContext::new();
        let loader = Arc::new(FixedLoader);
        let mut pipeline = AssetPipeline::new();

        pipeline.request(&ctx, &loader, 0, &request("a.png"));
        pipeline.request(&ctx, &loader, 1, &request("missing.png"));
        assert_eq!(pipeline.pending(), 2);

        let mut events = drain_until(&mut pipeline, 2).await;
        events.sort_by_key(|e| e.card);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].result, Ok(ImageInfo::new(400, 200)));
        assert!(events[1].result.is_err());
        assert_eq!(pipeline.pending(), 0);
        assert_eq!(pipeline.loaded(), 1);
        assert_eq!(pipeline.failed(), 1);
    }

    #[test]
    fn test_external_sender() {
        let mut pipeline = AssetPipeline::new();
        let tx = pipeline.sender();
        tx.send(AssetEvent {
            card: 3,
            layer: 0,
            role: LayerRole::Blur,
            url: "x_blur.png".into(),
            result: Err(EnvError::MissingUrl),
        })
        .unwrap();

        let events = pipeline.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].card, 3);
        assert_eq!(pipeline.failed(), 1);
    }
}
