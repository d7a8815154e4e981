//! Rerun visualization for simulation runs.
//!
//! Visualization is optional and only available with the `visualization` feature.
//!
//! # What Gets Logged
//!
//! - Card positions as points, coloured by feed index
//! - The rail direction as a line strip through the wrap window
//! - Offset, velocity, activity and fov as scalar timelines

#[cfg(feature = "visualization")]
use rerun::{Color, LineStrips3D, Points3D, Position3D, Radius, RecordingStream};
use nalgebra::Vector3;

/// Rerun logger for simulation visualization.
pub struct RerunLogger {
    #[cfg(feature = "visualization")]
    rec: Option<RecordingStream>,

    /// Whether visualization is enabled
    enabled: bool,
}

impl RerunLogger {
    /// Creates a new logger with visualization disabled.
    pub fn disabled() -> Self {
        Self {
            #[cfg(feature = "visualization")]
            rec: None,
            enabled: false,
        }
    }

    /// Creates a new logger with visualization enabled.
    #[cfg(feature = "visualization")]
    pub fn new(name: &str) -> Self {
        match rerun::RecordingStreamBuilder::new(name).spawn() {
            Ok(rec) => {
                tracing::info!("Rerun visualization enabled");
                Self {
                    rec: Some(rec),
                    enabled: true,
                }
            }
            Err(e) => {
                tracing::warn!(error = ?e, "failed to initialize Rerun");
                Self {
                    rec: None,
                    enabled: false,
                }
            }
        }
    }

    /// Creates a logger - returns disabled if visualization feature not enabled.
    #[cfg(not(feature = "visualization"))]
    pub fn new(_name: &str) -> Self {
        tracing::info!("Rerun visualization not available (compile with --features visualization)");
        Self::disabled()
    }

    /// Returns whether visualization is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sets the simulation time for subsequent logs.
    #[cfg(feature = "visualization")]
    pub fn set_time(&self, seconds: f64) {
        if let Some(ref rec) = self.rec {
            rec.set_time_seconds("sim_time", seconds);
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn set_time(&self, _seconds: f64) {}

    /// Logs card positions.
    #[cfg(feature = "visualization")]
    pub fn log_cards(&self, cards: &[(usize, Vector3<f64>)]) {
        if let Some(ref rec) = self.rec {
            let points: Vec<Position3D> = cards
                .iter()
                .map(|(_, pos)| Position3D::new(pos.x as f32, pos.y as f32, pos.z as f32))
                .collect();
            let colors: Vec<Color> = cards
                .iter()
                .map(|(i, _)| {
                    let shade = (64 + (i * 37) % 192) as u8;
                    Color::from_rgb(shade, 180, 255 - shade)
                })
                .collect();

            let _ = rec.log(
                "world/cards",
                &Points3D::new(points)
                    .with_colors(colors)
                    .with_radii([Radius::new_scene_units(0.25)]),
            );
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_cards(&self, _cards: &[(usize, Vector3<f64>)]) {}

    /// Logs the rail segment covered by the wrap window.
    #[cfg(feature = "visualization")]
    pub fn log_rail(&self, start: Vector3<f64>, end: Vector3<f64>) {
        if let Some(ref rec) = self.rec {
            let strip = vec![
                [start.x as f32, start.y as f32, start.z as f32],
                [end.x as f32, end.y as f32, end.z as f32],
            ];
            let _ = rec.log_static(
                "world/rail",
                &LineStrips3D::new([strip]).with_colors([Color::from_rgb(120, 120, 120)]),
            );
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_rail(&self, _start: Vector3<f64>, _end: Vector3<f64>) {}

    /// Logs the scroll state as scalar metrics.
    #[cfg(feature = "visualization")]
    pub fn log_scroll(&self, offset: f64, velocity: f64, activity: f64, fov: f64) {
        if let Some(ref rec) = self.rec {
            let _ = rec.log("metrics/offset", &rerun::Scalar::new(offset));
            let _ = rec.log("metrics/velocity", &rerun::Scalar::new(velocity));
            let _ = rec.log("metrics/activity", &rerun::Scalar::new(activity));
            let _ = rec.log("metrics/fov", &rerun::Scalar::new(fov));
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_scroll(&self, _offset: f64, _velocity: f64, _activity: f64, _fov: f64) {}

    /// Logs a text annotation (e.g., re-centering).
    #[cfg(feature = "visualization")]
    pub fn log_event(&self, path: &str, message: &str) {
        if let Some(ref rec) = self.rec {
            let _ = rec.log(path, &rerun::TextLog::new(message));
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_event(&self, _path: &str, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_logger() {
        let logger = RerunLogger::disabled();
        assert!(!logger.is_enabled());

        // These should be no-ops
        logger.set_time(1.0);
        logger.log_cards(&[(0, Vector3::new(0.0, 0.0, 0.0))]);
        logger.log_scroll(0.0, 0.0, 0.0, 5.0);
    }
}
