//! The Activity State Estimator.
//!
//! A smoothed 0-1 proxy for "the user is interacting, or motion is still
//! visible". Rises quickly on new input and settles slowly once it stops, so
//! micro-pauses between wheel ticks do not make the zoom flicker.

use crate::config::ActivityConfig;
use crate::scroll::ScrollState;
use std::time::Duration;

/// Input facts the estimator needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActivitySignals {
    /// A pointer or touch drag is in progress
    pub dragging: bool,

    /// Time since the last wheel event, if there ever was one
    pub since_last_wheel: Option<Duration>,
}

/// Exponential smoother with asymmetric attack/release.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEstimator {
    pub attack_tau: f64,
    pub release_tau: f64,
    pub wheel_window: Duration,
    pub velocity_threshold: f64,
}

impl ActivityEstimator {
    pub fn from_config(config: &ActivityConfig) -> Self {
        Self {
            attack_tau: config.attack_tau,
            release_tau: config.release_tau,
            wheel_window: config.wheel_window(),
            velocity_threshold: config.velocity_threshold,
        }
    }

    /// Binary target: 1 while dragging, shortly after a wheel tick, or while
    /// velocity is still above the threshold.
    pub fn target(&self, signals: &ActivitySignals, velocity: f64) -> f64 {
        let recent_wheel = signals
            .since_last_wheel
            .map_or(false, |elapsed| elapsed < self.wheel_window);

        if signals.dragging || recent_wheel || velocity.abs() > self.velocity_threshold {
            1.0
        } else {
            0.0
        }
    }

    /// One smoothing step from `activity` towards `target`.
    ///
    /// `k = 1 - exp(-dt / tau)` lies in `[0, 1)`, so the result never
    /// overshoots the target.
    pub fn smooth(&self, activity: f64, target: f64, dt: f64) -> f64 {
        let tau = if target > activity {
            self.attack_tau
        } else {
            self.release_tau
        };
        let k = 1.0 - (-dt.max(0.0) / tau).exp();
        activity + (target - activity) * k
    }

    /// Updates `state.activity` for a frame of length `dt`.
    pub fn update(&self, mut state: ScrollState, signals: &ActivitySignals, dt: f64) -> ScrollState {
        let target = self.target(signals, state.velocity);
        state.activity = self.smooth(state.activity, target, dt).clamp(0.0, 1.0);
        state
    }
}

impl Default for ActivityEstimator {
    fn default() -> Self {
        Self::from_config(&ActivityConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn idle() -> ActivitySignals {
        ActivitySignals::default()
    }

    #[test]
    fn test_target_sources() {
        let est = ActivityEstimator::default();

        assert_eq!(est.target(&idle(), 0.0), 0.0);
        assert_eq!(est.target(&idle(), 0.01), 1.0);
        assert_eq!(est.target(&idle(), -0.01), 1.0);
        assert_eq!(est.target(&idle(), 0.001), 0.0);

        let dragging = ActivitySignals {
            dragging: true,
            ..idle()
        };
        assert_eq!(est.target(&dragging, 0.0), 1.0);

        let wheel = |ms| ActivitySignals {
            since_last_wheel: Some(Duration::from_millis(ms)),
            ..idle()
        };
        assert_eq!(est.target(&wheel(50), 0.0), 1.0);
        assert_eq!(est.target(&wheel(119), 0.0), 1.0);
        assert_eq!(est.target(&wheel(120), 0.0), 0.0);
    }

    #[test]
    fn test_attack_faster_than_release() {
        let est = ActivityEstimator::default();
        let up = est.smooth(0.0, 1.0, 0.016);
        let down = 1.0 - est.smooth(1.0, 0.0, 0.016);
        assert!(up > down, "attack {} should beat release {}", up, down);
        assert_relative_eq!(up, 1.0 - (-0.016f64 / 0.10).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_monotonic_convergence_up() {
        let est = ActivityEstimator::default();
        let mut a = 0.0;
        for _ in 0..300 {
            let next = est.smooth(a, 1.0, 1.0 / 60.0);
            assert!(next >= a);
            assert!(next <= 1.0);
            a = next;
        }
        assert!(a > 0.999);
    }

    #[test]
    fn test_monotonic_convergence_down() {
        let est = ActivityEstimator::default();
        let mut a = 1.0;
        for _ in 0..300 {
            let next = est.smooth(a, 0.0, 1.0 / 60.0);
            assert!(next <= a);
            assert!(next >= 0.0);
            a = next;
        }
        assert!(a < 0.001);
    }

    #[test]
    fn test_zero_dt_keeps_activity() {
        let est = ActivityEstimator::default();
        assert_eq!(est.smooth(0.3, 1.0, 0.0), 0.3);
        assert_eq!(est.smooth(0.3, 0.0, 0.0), 0.3);
    }

    #[test]
    fn test_update_uses_state_velocity() {
        let est = ActivityEstimator::default();
        let state = ScrollState {
            velocity: 1.0,
            ..Default::default()
        };
        let next = est.update(state, &idle(), 0.05);
        assert!(next.activity > 0.0);
        assert_eq!(next.velocity, 1.0);
    }
}
