//! Rail geometry: the infinite line the cards ride on.

use crate::config::{RailConfig, MIN_STEP_LENGTH};
use crate::error::ConfigError;
use nalgebra::{Quaternion, UnitQuaternion, Vector3};

/// An infinite line in 3D with a fixed card spacing.
///
/// Invariants: `direction` has unit length and `step_length > 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rail {
    /// Anchor point (configured base plus nudge)
    pub base: Vector3<f64>,

    /// Unit vector along which cards advance
    pub direction: Vector3<f64>,

    /// Distance between consecutive cards
    pub step_length: f64,

    /// Raw step vector (`direction * step_length`)
    pub step: Vector3<f64>,

    /// Orientation shared by every card
    pub orientation: UnitQuaternion<f64>,
}

/// Index-derived placement of a card relative to the rail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Signed projection onto `direction`
    pub s0: f64,

    /// Component perpendicular to `direction`
    pub perp: Vector3<f64>,
}

impl Rail {
    /// Builds the rail, rejecting a zero-length step vector.
    pub fn from_config(config: &RailConfig) -> Result<Self, ConfigError> {
        if config.step.iter().any(|c| !c.is_finite()) {
            return Err(ConfigError::NonFinite("rail.step"));
        }
        let step_length = config.step.norm();
        if step_length < MIN_STEP_LENGTH {
            return Err(ConfigError::ZeroStep);
        }

        let [x, y, z, w] = config.orientation;
        let raw = Quaternion::new(w, x, y, z);
        if raw.norm() < 1e-6 {
            return Err(ConfigError::ZeroOrientation);
        }

        Ok(Self {
            base: config.base + config.nudge.as_vector(),
            direction: config.step / step_length,
            step_length,
            step: config.step,
            orientation: UnitQuaternion::from_quaternion(raw),
        })
    }

    /// Placement of the card at `index`, before any scrolling.
    pub fn placement(&self, index: usize) -> Placement {
        let from_base = self.step * index as f64;
        let s0 = from_base.dot(&self.direction);
        let perp = from_base - self.direction * s0;
        Placement { s0, perp }
    }

    /// World position of a point `along` units down the rail, shifted by `perp`.
    pub fn point_at(&self, perp: &Vector3<f64>, along: f64) -> Vector3<f64> {
        self.base + perp + self.direction * along
    }
}
