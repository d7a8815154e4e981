//! CardTrain Environment Abstraction Layer
//!
//! This crate provides the "Sans-IO" seams that let the CardTrain engine run
//! against a real host (window, GPU renderer, HTTP assets) or inside the
//! deterministic simulation harness.
//!
//! # Core Concept: Everything Outside The Engine Is A Trait
//!
//! The engine never touches a clock, a scene graph or the network directly:
//! - Time (`now()`, `sleep()`, `spawn()`) goes through [`TrainContext`]
//! - Drawing goes through [`Renderer`]
//! - Images and the card feed go through [`AssetLoader`] and [`FeedSource`]
//!
//! Swapping these for virtual implementations makes every frame
//! reproducible.
//!
//! # Example
//!
//! ```ignore
//! use cardtrain_env::{TrainContext, Renderer};
//!
//! async fn frame_loop<Ctx: TrainContext, R: Renderer>(ctx: &Ctx, renderer: &mut R) {
//!     loop {
//!         renderer.render_frame();
//!         ctx.sleep(Duration::from_millis(16)).await;
//!     }
//! }
//! ```

mod assets;
mod context;
mod error;
mod renderer;
mod tokio_impl;
mod types;

pub use assets::{AssetLoader, FeedSource};
pub use context::TrainContext;
pub use error::EnvError;
pub use renderer::{
    CameraDesc, LayerDesc, LayerRole, LayerState, PanelDesc, PanelHandle, PanelTransform, Renderer,
};
pub use tokio_impl::{FileFeedSource, TokioContext};
pub use types::{CardDescriptor, ImageInfo};
