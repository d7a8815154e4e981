//! CardTrain Core - Endless 3D Card Rail
//!
//! This library turns wheel, pointer and touch input into the motion of an
//! endless, cyclically wrapped train of image cards:
//! 1. **Scroll Physics**: frame-rate independent momentum with exponential decay
//! 2. **Activity & Zoom**: a smoothed 0..1 activity level that widens the camera fov
//! 3. **Cyclic Layout**: cards placed along a 3D rail inside a window of `W` repeats,
//!    so scrolling in either direction never runs out of cards
//!
//! The engines are pure; [`TrainEngine`] wires them to the environment seams
//! in `cardtrain_env`.

pub mod activity;
pub mod appearance;
pub mod assets;
pub mod config;
pub mod engine;
pub mod error;
pub mod feed;
pub mod input;
pub mod layout;
pub mod rail;
pub mod scroll;
pub mod zoom;

// Re-export key types for convenience
pub use activity::{ActivityEstimator, ActivitySignals};
pub use appearance::{derive_blur_url, CardAppearance, FlatCard, LayeredGlass};
pub use config::TrainConfig;
pub use engine::{FramePhysics, FrameReport, TrainEngine};
pub use error::{ConfigError, FeedError};
pub use feed::{load_feed_or_empty, parse_feed};
pub use input::{InputEvent, InputQueue, InputSampler, InputSender, PointerButton};
pub use layout::{layout, CardItem, CardPlacement, WrapParams};
pub use rail::Rail;
pub use scroll::{ScrollIntegrator, ScrollState};
pub use zoom::ZoomController;
