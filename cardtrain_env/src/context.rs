//! Core environment context trait for the CardTrain engine.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// The central interface for host interaction.
///
/// This trait abstracts the host's clock and task scheduler so that the
/// engine can run in both production (tokio) and simulation (virtual clock)
/// environments.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`
/// - **Simulation**: `SimContext` - manually advanced virtual clock
///
/// # Determinism
///
/// Input timestamps and frame deltas are both read from `now()`, so a
/// virtual clock makes the whole scroll pipeline replayable.
#[async_trait]
pub trait TrainContext: Send + Sync + 'static {
    /// Returns the current monotonic time since context creation.
    ///
    /// Used for frame deltas and the wheel activity window.
    /// In simulation, this is the virtual clock time.
    fn now(&self) -> Duration;

    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In simulation: advances virtual clock
    async fn sleep(&self, duration: Duration);

    /// Spawns a background task (asset loads).
    ///
    /// The task must report back through a channel; the engine never
    /// awaits it.
    fn spawn<F>(&self, name: &str, future: F)
    where
        F: Future<Output = ()> + Send + 'static;

    /// Returns the context's seed (for logging/debugging).
    ///
    /// In production, returns 0 (not seeded).
    /// In simulation, returns the master seed.
    fn seed(&self) -> u64;
}
