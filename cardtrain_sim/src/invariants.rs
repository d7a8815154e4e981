//! Per-frame invariant checks.
//!
//! The checker plays the role of a ground-truth oracle: it knows what the
//! layout must look like for any scroll state and flags every frame where
//! the engine's output disagrees.

use cardtrain_core::config::CameraConfig;
use cardtrain_core::scroll::floored_mod;
use cardtrain_core::{CardItem, FrameReport, WrapParams};
use thiserror::Error;

/// Tolerance for rail-coordinate comparisons.
const ALONG_TOLERANCE: f64 = 1e-6;

/// A broken invariant, tagged with the frame it was seen on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("frame {frame}: card {card} at s={s} outside window [{lo}, {hi})")]
    OutOfWindow {
        frame: u64,
        card: usize,
        s: f64,
        lo: f64,
        hi: f64,
    },

    #[error("frame {frame}: cards {a} and {b} share along={along}")]
    SharedAlong { frame: u64, a: usize, b: usize, along: f64 },

    #[error("frame {frame}: card {card} moved {error} off its expected rail position")]
    Discontinuity { frame: u64, card: usize, error: f64 },

    #[error("frame {frame}: activity {activity} outside [0, 1]")]
    ActivityRange { frame: u64, activity: f64 },

    #[error("frame {frame}: fov {fov} outside [{min}, {max}]")]
    FovRange { frame: u64, fov: f64, min: f64, max: f64 },

    #[error("frame {frame}: {written} transforms written for {cards} cards")]
    TransformCount { frame: u64, written: usize, cards: usize },

    #[error("frame {frame}: scroll state is not finite")]
    NonFinite { frame: u64 },
}

/// Accumulates violations over a run.
#[derive(Debug, Clone)]
pub struct InvariantChecker {
    fov_min: f64,
    fov_max: f64,

    /// Offset and alongs of the previous frame
    previous: Option<(f64, Vec<f64>)>,

    violations: Vec<InvariantViolation>,
    frames_checked: u64,

    /// Largest continuity error seen (rail units)
    max_discontinuity: f64,
}

impl InvariantChecker {
    pub fn new(camera: &CameraConfig) -> Self {
        Self {
            fov_min: camera.base_fov_deg - camera.fov_epsilon,
            fov_max: camera.base_fov_deg + camera.zoom_fov_add + camera.fov_epsilon,
            previous: None,
            violations: Vec::new(),
            frames_checked: 0,
            max_discontinuity: 0.0,
        }
    }

    /// Checks one frame. `written` is the number of transforms the renderer
    /// received for it.
    pub fn check(&mut self, report: &FrameReport, items: &[CardItem], wrap: &WrapParams, written: usize) {
        self.frames_checked += 1;
        let frame = report.frame;
        let state = report.state;

        if !(state.offset.is_finite() && state.velocity.is_finite() && state.activity.is_finite()) {
            self.violations.push(InvariantViolation::NonFinite { frame });
            return;
        }

        if !(0.0..=1.0).contains(&state.activity) {
            self.violations.push(InvariantViolation::ActivityRange {
                frame,
                activity: state.activity,
            });
        }

        if report.fov < self.fov_min || report.fov > self.fov_max {
            self.violations.push(InvariantViolation::FovRange {
                frame,
                fov: report.fov,
                min: self.fov_min,
                max: self.fov_max,
            });
        }

        if written != items.len() || report.placements.len() != items.len() {
            self.violations.push(InvariantViolation::TransformCount {
                frame,
                written,
                cards: items.len(),
            });
        }

        let lo = wrap.s_start;
        let hi = wrap.s_start + wrap.s_total;
        for (item, placement) in items.iter().zip(&report.placements) {
            let s = placement.along - item.eps_along;
            if s < lo - ALONG_TOLERANCE || s >= hi + ALONG_TOLERANCE {
                self.violations.push(InvariantViolation::OutOfWindow {
                    frame,
                    card: item.index,
                    s,
                    lo,
                    hi,
                });
            }
        }

        let mut sorted: Vec<(f64, usize)> = report
            .placements
            .iter()
            .zip(items)
            .map(|(p, item)| (p.along, item.index))
            .collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in sorted.windows(2) {
            if pair[0].0 == pair[1].0 {
                self.violations.push(InvariantViolation::SharedAlong {
                    frame,
                    a: pair[0].1,
                    b: pair[1].1,
                    along: pair[0].0,
                });
            }
        }

        let alongs: Vec<f64> = report.placements.iter().map(|p| p.along).collect();
        if let Some((prev_offset, prev_alongs)) = &self.previous {
            // Re-centering shifts offset by whole periods, which vanish mod sTotal
            let expected_shift = -(state.offset - prev_offset) * wrap.step_length;
            for (i, (now, before)) in alongs.iter().zip(prev_alongs).enumerate() {
                let error = circular_diff(now - before, expected_shift, wrap.s_total).abs();
                self.max_discontinuity = self.max_discontinuity.max(error);
                if error > ALONG_TOLERANCE {
                    self.violations.push(InvariantViolation::Discontinuity { frame, card: i, error });
                }
            }
        }
        self.previous = Some((state.offset, alongs));
    }

    pub fn violations(&self) -> &[InvariantViolation] {
        &self.violations
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn frames_checked(&self) -> u64 {
        self.frames_checked
    }

    pub fn max_discontinuity(&self) -> f64 {
        self.max_discontinuity
    }

    /// First violation, formatted for a failure message.
    pub fn first_failure(&self) -> Option<String> {
        self.violations.first().map(|v| v.to_string())
    }
}

/// Signed difference `a - b` folded into `[-period/2, period/2)`.
fn circular_diff(a: f64, b: f64, period: f64) -> f64 {
    floored_mod(a - b + period / 2.0, period) - period / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardtrain_core::config::RailConfig;
    use cardtrain_core::layout::build_items;
    use cardtrain_core::{layout, Rail, ScrollState};
    use cardtrain_env::PanelHandle;

    fn report(frame: u64, rail: &Rail, wrap: &WrapParams, items: &[CardItem], offset: f64) -> FrameReport {
        FrameReport {
            frame,
            dt: 1.0 / 60.0,
            state: ScrollState {
                offset,
                ..Default::default()
            },
            fov: 5.0,
            fov_changed: false,
            recentered: false,
            placements: layout(rail, wrap, items, offset),
            assets_applied: 0,
        }
    }

    fn setup(n: usize) -> (Rail, WrapParams, Vec<CardItem>) {
        let rail = Rail::from_config(&RailConfig::default()).unwrap();
        let visuals: Vec<PanelHandle> = (0..n as u64).map(PanelHandle).collect();
        let items = build_items(&rail, &visuals, 0.0008);
        let wrap = WrapParams::compute(&items, rail.step_length, 3);
        (rail, wrap, items)
    }

    #[test]
    fn test_smooth_scroll_is_clean() {
        let (rail, wrap, items) = setup(6);
        let mut checker = InvariantChecker::new(&CameraConfig::default());
        for f in 0..200 {
            let offset = f as f64 * 0.37;
            checker.check(&report(f, &rail, &wrap, &items, offset), &items, &wrap, items.len());
        }
        assert!(checker.is_clean(), "{:?}", checker.first_failure());
        assert_eq!(checker.frames_checked(), 200);
    }

    #[test]
    fn test_recentering_is_not_a_pop() {
        let (rail, wrap, items) = setup(4);
        let mut checker = InvariantChecker::new(&CameraConfig::default());
        let far = wrap.period_turns() * 2000.0 + 1.5;
        checker.check(&report(1, &rail, &wrap, &items, far), &items, &wrap, 4);
        checker.check(&report(2, &rail, &wrap, &items, 1.6), &items, &wrap, 4);
        assert!(checker.is_clean(), "{:?}", checker.first_failure());
    }

    #[test]
    fn test_detects_pop() {
        let (rail, wrap, items) = setup(4);
        let mut checker = InvariantChecker::new(&CameraConfig::default());
        let first = report(1, &rail, &wrap, &items, 0.0);
        let mut second = report(2, &rail, &wrap, &items, 0.0);
        second.placements[2].along += 0.4;

        checker.check(&first, &items, &wrap, 4);
        checker.check(&second, &items, &wrap, 4);
        assert!(matches!(
            checker.violations()[0],
            InvariantViolation::Discontinuity { card: 2, .. }
        ));
    }

    #[test]
    fn test_detects_missing_transforms_and_bad_fov() {
        let (rail, wrap, items) = setup(3);
        let mut checker = InvariantChecker::new(&CameraConfig::default());
        let mut r = report(1, &rail, &wrap, &items, 0.0);
        r.fov = 9.0;
        checker.check(&r, &items, &wrap, 1);
        assert_eq!(checker.violations().len(), 2);
    }
}
