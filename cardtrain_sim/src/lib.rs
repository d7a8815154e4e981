//! CardTrain Deterministic Simulation Harness
//!
//! This crate runs the CardTrain engine inside a fully controlled
//! environment: virtual time, a recording renderer, seeded assets and
//! scripted gestures. Every run is a pure function of its seed.
//!
//! # Core Principle: Nothing Real Gets In
//!
//! All sources of non-determinism are intercepted:
//! - **Time**: Virtual clock advanced once per simulated frame
//! - **Input**: `GestureScript` replays timestamped events
//! - **Assets**: Sizes and failures derived from `(seed, url)`
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ScenarioRunner                         │
//! │                                                             │
//! │  GestureScript ──► InputQueue ──► TrainEngine ◄── SimContext│
//! │                                     │    ▲                  │
//! │                                     │    │ AssetEvents      │
//! │                                     ▼    │                  │
//! │                       RecordingRenderer  SimAssetLoader     │
//! │                                     │                       │
//! │                                     ▼                       │
//! │                            InvariantChecker                 │
//! │                      (window, continuity, fov)              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use cardtrain_sim::{ScenarioRunner, ScenarioId};
//!
//! let runner = ScenarioRunner::new(42, 12).with_duration(5.0);
//! let result = runner.run(ScenarioId::RandomSession);
//! assert!(result.passed);
//! ```

mod assets;
mod context;
mod exporter;
mod gestures;
mod invariants;
mod renderer;
mod runner;
mod visualizer;
pub mod scenarios;

pub use assets::{FeedMode, SimAssetLoader, SimFeedSource};
pub use context::SimContext;
pub use exporter::{CardPosition, SimEvent, SimExport, SimFrame};
pub use gestures::GestureScript;
pub use invariants::{InvariantChecker, InvariantViolation};
pub use renderer::RecordingRenderer;
pub use runner::{FrameSample, ScenarioMetrics, ScenarioResult, ScenarioRunner, SimEngine, SimRun};
pub use scenarios::ScenarioId;
pub use visualizer::RerunLogger;
