//! The Scroll Integrator.
//!
//! Turns impulses into a continuous, unbounded scroll position measured in
//! "turns". Velocity decays exponentially with a fixed time constant, so the
//! damping is independent of frame rate.

use crate::config::ScrollConfig;
use serde::{Deserialize, Serialize};

/// The single piece of mutable scroll state.
///
/// Passed by value into the per-frame update and returned from it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollState {
    /// Accumulated scroll in turns (unbounded)
    pub offset: f64,

    /// Scroll velocity in turns/second
    pub velocity: f64,

    /// Smoothed activity in [0, 1]
    pub activity: f64,
}

impl ScrollState {
    /// Adds a velocity impulse (wheel ticks, drag release).
    pub fn add_velocity(&mut self, delta: f64) {
        self.velocity += delta;
    }

    /// Moves the scroll position directly (drag in progress).
    pub fn shift_offset(&mut self, delta: f64) {
        self.offset += delta;
    }
}

/// Clamps a frame delta into `[0, max_dt]`.
///
/// Negative and NaN deltas become 0; stalls longer than `max_dt` are cut
/// down to `max_dt`.
pub fn sanitize_dt(dt: f64, max_dt: f64) -> f64 {
    if dt.is_nan() || dt <= 0.0 {
        0.0
    } else {
        dt.min(max_dt)
    }
}

/// Floored modulo: result in `[0, n)` for positive `n`, whatever the sign of `a`.
pub fn floored_mod(a: f64, n: f64) -> f64 {
    let r = a.rem_euclid(n);
    // rem_euclid can round up to exactly n for tiny negative a
    if r >= n {
        0.0
    } else {
        r
    }
}

/// Frame-rate independent integrator with exponential velocity decay.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollIntegrator {
    /// Velocity decay time constant (seconds)
    pub velocity_tau: f64,

    /// Maximum dt accepted per frame (seconds)
    pub max_frame_dt: f64,
}

impl ScrollIntegrator {
    pub fn new(velocity_tau: f64, max_frame_dt: f64) -> Self {
        Self {
            velocity_tau,
            max_frame_dt,
        }
    }

    pub fn from_config(config: &ScrollConfig) -> Self {
        Self::new(config.velocity_tau, config.max_frame_dt)
    }

    /// Advances the state by one frame.
    ///
    /// `offset += v * dt`, then `v *= exp(-dt / tau)`. `dt` is sanitized
    /// first, so a zero, negative or NaN delta leaves the state untouched.
    pub fn integrate(&self, mut state: ScrollState, dt: f64) -> ScrollState {
        let dt = sanitize_dt(dt, self.max_frame_dt);
        if dt == 0.0 {
            return state;
        }
        state.offset += state.velocity * dt;
        state.velocity *= (-dt / self.velocity_tau).exp();
        state
    }

    /// Folds `offset` back into one layout period once it has drifted far
    /// enough to cost precision.
    ///
    /// The layout repeats exactly every `period_turns`, so the wrapped
    /// positions do not change. Returns true if the offset was re-centered.
    pub fn recenter(state: &mut ScrollState, period_turns: f64, after_periods: f64) -> bool {
        if !(period_turns > 0.0) || !state.offset.is_finite() {
            return false;
        }
        if state.offset.abs() <= period_turns * after_periods {
            return false;
        }
        state.offset = floored_mod(state.offset, period_turns);
        true
    }
}

impl Default for ScrollIntegrator {
    fn default() -> Self {
        Self::from_config(&ScrollConfig::default())
    }
}
