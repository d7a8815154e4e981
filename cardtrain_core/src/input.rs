//! The Input Sampler.
//!
//! Normalizes wheel, pointer-drag and touch-drag events into two impulses on
//! [`ScrollState`]: velocity kicks and positional shifts. Every event is
//! applied immediately; nothing is buffered here.
//!
//! For hosts that deliver input on another thread, [`InputQueue`] collects
//! timestamped events so the engine can apply them all at the start of the
//! next frame.

use crate::activity::ActivitySignals;
use crate::config::ScrollConfig;
use crate::scroll::ScrollState;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::trace;

/// Pointer button that started a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Auxiliary,
}

/// Raw host input. All Y values are screen-space pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    Wheel { delta_y: f64 },
    PointerDown { y: f64, button: PointerButton },
    PointerMove { y: f64 },
    PointerUp,
    /// Y of every active touch point; only the first is used
    TouchStart { touches: Vec<f64> },
    TouchMove { touches: Vec<f64> },
    TouchEnd,
}

/// Which device owns the current drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSource {
    Pointer,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    source: DragSource,
    last_y: f64,
    last_dy: f64,
}

/// Turns host events into scroll impulses.
#[derive(Debug, Clone)]
pub struct InputSampler {
    wheel_sensitivity: f64,
    drag_sensitivity: f64,
    release_gain: f64,
    drag: Option<DragState>,
    last_wheel_at: Option<Duration>,
    last_input_at: Option<Duration>,
}

impl InputSampler {
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            wheel_sensitivity: config.wheel_sensitivity,
            drag_sensitivity: config.drag_sensitivity,
            release_gain: config.release_gain,
            drag: None,
            last_wheel_at: None,
            last_input_at: None,
        }
    }

    /// Applies one event at host time `now`.
    pub fn apply(&mut self, event: &InputEvent, now: Duration, state: &mut ScrollState) {
        self.last_input_at = Some(now);

        match event {
            InputEvent::Wheel { delta_y } => {
                if delta_y.is_finite() {
                    state.add_velocity(delta_y * self.wheel_sensitivity);
                }
                self.last_wheel_at = Some(now);
            }
            InputEvent::PointerDown { y, button } => {
                if *button == PointerButton::Primary {
                    self.begin_drag(DragSource::Pointer, *y);
                }
            }
            InputEvent::PointerMove { y } => self.move_drag(DragSource::Pointer, *y, state),
            InputEvent::PointerUp => self.end_drag(DragSource::Pointer, state),
            InputEvent::TouchStart { touches } => {
                if let Some(y) = touches.first() {
                    self.begin_drag(DragSource::Touch, *y);
                }
            }
            InputEvent::TouchMove { touches } => {
                if let Some(y) = touches.first() {
                    self.move_drag(DragSource::Touch, *y, state);
                }
            }
            InputEvent::TouchEnd => self.end_drag(DragSource::Touch, state),
        }
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Device that owns the current drag, if any.
    pub fn drag_source(&self) -> Option<DragSource> {
        self.drag.map(|d| d.source)
    }

    /// Host time of the most recent event of any kind.
    pub fn last_input_at(&self) -> Option<Duration> {
        self.last_input_at
    }

    /// Host time of the most recent wheel event.
    pub fn last_wheel_at(&self) -> Option<Duration> {
        self.last_wheel_at
    }

    /// Activity inputs as of `now`.
    pub fn signals(&self, now: Duration) -> ActivitySignals {
        ActivitySignals {
            dragging: self.is_dragging(),
            since_last_wheel: self.last_wheel_at.map(|t| now.saturating_sub(t)),
        }
    }

    // ========== Private Helper Methods ==========

    fn begin_drag(&mut self, source: DragSource, y: f64) {
        if !y.is_finite() {
            return;
        }
        match self.drag {
            // A second device cannot take over a drag in progress
            Some(active) if active.source != source => {}
            _ => {
                self.drag = Some(DragState {
                    source,
                    last_y: y,
                    last_dy: 0.0,
                });
            }
        }
    }

    fn move_drag(&mut self, source: DragSource, y: f64, state: &mut ScrollState) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        if drag.source != source || !y.is_finite() {
            return;
        }
        let dy = y - drag.last_y;
        drag.last_y = y;
        drag.last_dy = dy;
        state.shift_offset(dy * self.drag_sensitivity);
    }

    fn end_drag(&mut self, source: DragSource, state: &mut ScrollState) {
        match self.drag {
            Some(drag) if drag.source == source => {
                let kick = drag.last_dy * self.drag_sensitivity * self.release_gain;
                state.add_velocity(kick);
                trace!(?source, kick, "drag released");
                self.drag = None;
            }
            _ => {}
        }
    }
}

impl Default for InputSampler {
    fn default() -> Self {
        Self::new(&ScrollConfig::default())
    }
}

/// Producer half of the input queue; cheap to clone across threads.
#[derive(Debug, Clone)]
pub struct InputSender {
    tx: mpsc::UnboundedSender<(Duration, InputEvent)>,
}

impl InputSender {
    /// Enqueues an event stamped with host time `at`.
    ///
    /// Returns false if the engine side has been dropped.
    pub fn send(&self, at: Duration, event: InputEvent) -> bool {
        self.tx.send((at, event)).is_ok()
    }
}

/// Consumer half of the input queue, drained once per frame.
#[derive(Debug)]
pub struct InputQueue {
    rx: mpsc::UnboundedReceiver<(Duration, InputEvent)>,
}

impl InputQueue {
    /// Creates a connected sender/queue pair.
    pub fn channel() -> (InputSender, InputQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (InputSender { tx }, InputQueue { rx })
    }

    /// Removes every event queued so far, in arrival order.
    pub fn drain(&mut self) -> Vec<(Duration, InputEvent)> {
        let mut events = Vec::new();
        while let Ok(item) = self.rx.try_recv() {
            events.push(item);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn down(y: f64) -> InputEvent {
        InputEvent::PointerDown {
            y,
            button: PointerButton::Primary,
        }
    }

    #[test]
    fn test_wheel_adds_velocity_only() {
        let mut sampler = InputSampler::default();
        let mut state = ScrollState::default();

        sampler.apply(&InputEvent::Wheel { delta_y: 100.0 }, ms(5), &mut state);

        assert_relative_eq!(state.velocity, 0.2, epsilon = 1e-12);
        assert_eq!(state.offset, 0.0);
        assert_eq!(sampler.last_wheel_at(), Some(ms(5)));
        assert!(!sampler.is_dragging());
    }

    #[test]
    fn test_drag_total_is_independent_of_event_count() {
        for steps in [1usize, 2, 7, 50] {
            let mut sampler = InputSampler::default();
            let mut state = ScrollState::default();

            sampler.apply(&down(500.0), ms(0), &mut state);
            for k in 1..=steps {
                let y = 500.0 - 100.0 * k as f64 / steps as f64;
                sampler.apply(&InputEvent::PointerMove { y }, ms(k as u64), &mut state);
            }

            assert_relative_eq!(state.offset, -1.0, epsilon = 1e-9);
            assert_eq!(state.velocity, 0.0, "no velocity until release");
        }
    }

    #[test]
    fn test_release_throws_with_last_delta() {
        let mut sampler = InputSampler::default();
        let mut state = ScrollState::default();

        sampler.apply(&down(100.0), ms(0), &mut state);
        sampler.apply(&InputEvent::PointerMove { y: 90.0 }, ms(16), &mut state);
        sampler.apply(&InputEvent::PointerMove { y: 70.0 }, ms(32), &mut state);
        sampler.apply(&InputEvent::PointerUp, ms(40), &mut state);

        // last delta -20 px * 0.01 * 0.4
        assert_relative_eq!(state.velocity, -0.08, epsilon = 1e-12);
        assert!(!sampler.is_dragging());
    }

    #[test]
    fn test_move_without_down_is_ignored() {
        let mut sampler = InputSampler::default();
        let mut state = ScrollState::default();

        sampler.apply(&InputEvent::PointerMove { y: 10.0 }, ms(0), &mut state);
        sampler.apply(&InputEvent::PointerUp, ms(1), &mut state);

        assert_eq!(state, ScrollState::default());
    }

    #[test]
    fn test_secondary_button_does_not_drag() {
        let mut sampler = InputSampler::default();
        let mut state = ScrollState::default();

        sampler.apply(
            &InputEvent::PointerDown {
                y: 0.0,
                button: PointerButton::Secondary,
            },
            ms(0),
            &mut state,
        );
        sampler.apply(&InputEvent::PointerMove { y: 50.0 }, ms(1), &mut state);

        assert!(!sampler.is_dragging());
        assert_eq!(state.offset, 0.0);
    }

    #[test]
    fn test_touch_uses_first_point_and_throws() {
        let mut sampler = InputSampler::default();
        let mut state = ScrollState::default();

        sampler.apply(&InputEvent::TouchStart { touches: vec![200.0, 10.0] }, ms(0), &mut state);
        assert_eq!(sampler.drag_source(), Some(DragSource::Touch));

        sampler.apply(&InputEvent::TouchMove { touches: vec![230.0, 900.0] }, ms(16), &mut state);
        assert_relative_eq!(state.offset, 0.3, epsilon = 1e-12);

        sampler.apply(&InputEvent::TouchEnd, ms(20), &mut state);
        assert_relative_eq!(state.velocity, 30.0 * 0.01 * 0.4, epsilon = 1e-12);
        assert!(!sampler.is_dragging());
    }

    #[test]
    fn test_empty_touch_list_is_ignored() {
        let mut sampler = InputSampler::default();
        let mut state = ScrollState::default();

        sampler.apply(&InputEvent::TouchStart { touches: vec![] }, ms(0), &mut state);
        assert!(!sampler.is_dragging());
    }

    #[test]
    fn test_second_device_cannot_steal_drag() {
        let mut sampler = InputSampler::default();
        let mut state = ScrollState::default();

        sampler.apply(&down(0.0), ms(0), &mut state);
        sampler.apply(&InputEvent::TouchStart { touches: vec![300.0] }, ms(1), &mut state);
        sampler.apply(&InputEvent::TouchMove { touches: vec![400.0] }, ms(2), &mut state);
        sampler.apply(&InputEvent::TouchEnd, ms(3), &mut state);

        assert_eq!(sampler.drag_source(), Some(DragSource::Pointer));
        assert_eq!(state, ScrollState::default());
    }

    #[test]
    fn test_signals_report_wheel_age() {
        let mut sampler = InputSampler::default();
        let mut state = ScrollState::default();
        assert_eq!(sampler.signals(ms(10)).since_last_wheel, None);

        sampler.apply(&InputEvent::Wheel { delta_y: 1.0 }, ms(100), &mut state);
        let signals = sampler.signals(ms(150));
        assert_eq!(signals.since_last_wheel, Some(ms(50)));
        assert!(!signals.dragging);
    }

    #[test]
    fn test_queue_preserves_order() {
        let (tx, mut queue) = InputQueue::channel();
        assert!(tx.send(ms(1), InputEvent::Wheel { delta_y: 1.0 }));
        assert!(tx.send(ms(2), InputEvent::PointerUp));

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].0, ms(1));
        assert_eq!(drained[1].1, InputEvent::PointerUp);
        assert!(queue.drain().is_empty());
    }
}
