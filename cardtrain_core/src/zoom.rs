//! The Zoom Controller: activity → camera field of view.

use crate::config::CameraConfig;

/// Stateless mapping from activity to fov.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomController {
    pub base_fov_deg: f64,
    pub zoom_fov_add: f64,
    pub fov_epsilon: f64,
}

impl ZoomController {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            base_fov_deg: config.base_fov_deg,
            zoom_fov_add: config.zoom_fov_add,
            fov_epsilon: config.fov_epsilon,
        }
    }

    /// `base + add * activity`
    pub fn fov_for(&self, activity: f64) -> f64 {
        self.base_fov_deg + self.zoom_fov_add * activity
    }

    /// Returns the new fov if it differs from `current` by more than the
    /// epsilon, so the renderer can skip rebuilding its projection.
    pub fn update(&self, current_fov: f64, activity: f64) -> Option<f64> {
        let target = self.fov_for(activity);
        if (current_fov - target).abs() > self.fov_epsilon {
            Some(target)
        } else {
            None
        }
    }
}

impl Default for ZoomController {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fov_range() {
        let zoom = ZoomController::default();
        assert_relative_eq!(zoom.fov_for(0.0), 5.0);
        assert_relative_eq!(zoom.fov_for(1.0), 6.2);
        assert_relative_eq!(zoom.fov_for(0.5), 5.6);
    }

    #[test]
    fn test_small_changes_are_skipped() {
        let zoom = ZoomController::default();
        assert_eq!(zoom.update(5.0, 0.00005), None);
        assert_eq!(zoom.update(5.0, 0.0), None);
        let updated = zoom.update(5.0, 0.5).unwrap();
        assert_relative_eq!(updated, 5.6);
    }
}
