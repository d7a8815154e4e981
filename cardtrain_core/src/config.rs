//! Engine configuration.
//!
//! All tunables are fixed for the lifetime of an engine. `Default` carries the
//! production values; JSON files may override any subset of them:
//!
//! ```json
//! { "scroll": { "wheel_sensitivity": 0.004 }, "rail": { "wrap_repeats": 5 } }
//! ```

use crate::error::ConfigError;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Step vectors shorter than this are treated as zero.
pub const MIN_STEP_LENGTH: f64 = 1e-9;

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub rail: RailConfig,
    pub scroll: ScrollConfig,
    pub activity: ActivityConfig,
    pub camera: CameraConfig,
}

/// Rail geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RailConfig {
    /// Anchor point of card 0 before nudging
    pub base: Vector3<f64>,

    /// Offset from one card to the next
    pub step: Vector3<f64>,

    /// Screen-space adjustment added to `base`
    pub nudge: Nudge,

    /// Card orientation quaternion as `[x, y, z, w]`
    pub orientation: [f64; 4],

    /// Number of full sequence lengths in the wrap window
    pub wrap_repeats: u32,

    /// Per-index depth bias along the rail
    pub eps_along: f64,
}

impl Default for RailConfig {
    fn default() -> Self {
        Self {
            base: Vector3::new(3.945000, 2.867638, -44.981224),
            step: Vector3::new(-0.375000, -0.272589, 0.715546),
            nudge: Nudge::default(),
            orientation: [0.174819586, -0.254544801, -0.046842770, 0.949974111],
            wrap_repeats: 3,
            eps_along: 0.0008,
        }
    }
}

/// Adjustment applied to the rail base (x += right, y += down, z += z_pull).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nudge {
    pub right: f64,
    pub down: f64,
    pub z_pull: f64,
}

impl Default for Nudge {
    fn default() -> Self {
        Self {
            right: 0.0,
            down: 0.0,
            z_pull: 8.0,
        }
    }
}

impl Nudge {
    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.right, self.down, self.z_pull)
    }
}

/// Scroll integrator and input tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Velocity decay time constant (seconds)
    pub velocity_tau: f64,

    /// Upper bound on a frame's dt (seconds)
    pub max_frame_dt: f64,

    /// Turns/second added per wheel delta unit
    pub wheel_sensitivity: f64,

    /// Turns added per pixel of drag
    pub drag_sensitivity: f64,

    /// Fraction of the last drag delta converted into velocity on release
    pub release_gain: f64,

    /// Re-center `offset` once it exceeds this many layout periods
    pub recenter_after_periods: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            velocity_tau: 0.18,
            max_frame_dt: 0.05,
            wheel_sensitivity: 0.0020,
            drag_sensitivity: 0.0100,
            release_gain: 0.4,
            recenter_after_periods: 1024.0,
        }
    }
}

/// Activity estimator tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Rise time constant (seconds)
    pub attack_tau: f64,

    /// Fall time constant (seconds)
    pub release_tau: f64,

    /// How long a wheel tick keeps the user "active" (milliseconds)
    pub wheel_window_ms: u64,

    /// |v| above which residual motion counts as activity
    pub velocity_threshold: f64,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            attack_tau: 0.10,
            release_tau: 0.16,
            wheel_window_ms: 120,
            velocity_threshold: 0.002,
        }
    }
}

impl ActivityConfig {
    pub fn wheel_window(&self) -> Duration {
        Duration::from_millis(self.wheel_window_ms)
    }
}

/// Camera and zoom tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Resting vertical field of view (degrees)
    pub base_fov_deg: f64,

    /// Extra field of view at full activity (degrees)
    pub zoom_fov_add: f64,

    /// Minimum fov change worth pushing to the renderer
    pub fov_epsilon: f64,

    pub near: f64,
    pub far: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            base_fov_deg: 5.0,
            zoom_fov_add: 1.2,
            fov_epsilon: 1e-4,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl TrainConfig {
    /// Parses a (possibly partial) JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: TrainConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks every invariant the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rail = &self.rail;
        finite_vec("rail.base", &rail.base)?;
        finite_vec("rail.step", &rail.step)?;
        finite("rail.nudge.right", rail.nudge.right)?;
        finite("rail.nudge.down", rail.nudge.down)?;
        finite("rail.nudge.z_pull", rail.nudge.z_pull)?;

        let step_length = rail.step.norm();
        if step_length < MIN_STEP_LENGTH {
            return Err(ConfigError::ZeroStep);
        }
        if rail.wrap_repeats < 1 {
            return Err(ConfigError::InvalidRepeat(rail.wrap_repeats));
        }
        finite("rail.eps_along", rail.eps_along)?;
        if rail.eps_along <= 0.0 || rail.eps_along >= step_length {
            return Err(ConfigError::DepthBiasOutOfRange {
                eps: rail.eps_along,
                step: step_length,
            });
        }
        if rail.orientation.iter().any(|c| !c.is_finite()) {
            return Err(ConfigError::NonFinite("rail.orientation"));
        }
        if rail.orientation.iter().map(|c| c * c).sum::<f64>() < 1e-12 {
            return Err(ConfigError::ZeroOrientation);
        }

        let scroll = &self.scroll;
        positive("scroll.velocity_tau", scroll.velocity_tau)?;
        positive("scroll.max_frame_dt", scroll.max_frame_dt)?;
        positive("scroll.recenter_after_periods", scroll.recenter_after_periods)?;
        finite("scroll.wheel_sensitivity", scroll.wheel_sensitivity)?;
        finite("scroll.drag_sensitivity", scroll.drag_sensitivity)?;
        finite("scroll.release_gain", scroll.release_gain)?;

        let activity = &self.activity;
        positive("activity.attack_tau", activity.attack_tau)?;
        positive("activity.release_tau", activity.release_tau)?;
        finite("activity.velocity_threshold", activity.velocity_threshold)?;

        let camera = &self.camera;
        finite("camera.base_fov_deg", camera.base_fov_deg)?;
        finite("camera.zoom_fov_add", camera.zoom_fov_add)?;
        finite("camera.fov_epsilon", camera.fov_epsilon)?;
        finite("camera.near", camera.near)?;
        finite("camera.far", camera.far)?;
        if !(camera.near > 0.0 && camera.near < camera.far) {
            return Err(ConfigError::ClipPlanes {
                near: camera.near,
                far: camera.far,
            });
        }

        Ok(())
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite(field))
    }
}

fn finite_vec(field: &'static str, value: &Vector3<f64>) -> Result<(), ConfigError> {
    if value.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(ConfigError::NonFinite(field))
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_step_rejected() {
        let mut config = TrainConfig::default();
        config.rail.step = Vector3::zeros();
        assert!(matches!(config.validate(), Err(ConfigError::ZeroStep)));
    }

    #[test]
    fn test_nan_step_rejected() {
        let mut config = TrainConfig::default();
        config.rail.step = Vector3::new(f64::NAN, 0.0, 1.0);
        assert!(matches!(config.validate(), Err(ConfigError::NonFinite("rail.step"))));
    }

    #[test]
    fn test_zero_repeats_rejected() {
        let mut config = TrainConfig::default();
        config.rail.wrap_repeats = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRepeat(0))));
    }

    #[test]
    fn test_depth_bias_must_be_small() {
        let mut config = TrainConfig::default();
        config.rail.eps_along = 5.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DepthBiasOutOfRange { .. })
        ));
    }

    #[test]
    fn test_zero_depth_bias_rejected() {
        // Zero bias would give every card the same depth offset
        let mut config = TrainConfig::default();
        config.rail.eps_along = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DepthBiasOutOfRange { eps, .. }) if eps == 0.0
        ));

        config.rail.eps_along = -0.0008;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_tau_rejected() {
        let mut config = TrainConfig::default();
        config.scroll.velocity_tau = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "scroll.velocity_tau", .. })
        ));
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = TrainConfig::from_json_str(
            r#"{ "scroll": { "wheel_sensitivity": 0.004 }, "rail": { "wrap_repeats": 5 } }"#,
        )
        .unwrap();

        assert_eq!(config.scroll.wheel_sensitivity, 0.004);
        assert_eq!(config.rail.wrap_repeats, 5);
        // Untouched fields keep their defaults
        assert_eq!(config.scroll.drag_sensitivity, 0.01);
        assert_eq!(config.camera.base_fov_deg, 5.0);
    }

    #[test]
    fn test_json_with_zero_step_fails() {
        let result = TrainConfig::from_json_str(r#"{ "rail": { "step": [0.0, 0.0, 0.0] } }"#);
        assert!(matches!(result, Err(ConfigError::ZeroStep)));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result = TrainConfig::from_json_str("{ nope");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
