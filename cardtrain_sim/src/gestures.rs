//! Scripted user input.
//!
//! A `GestureScript` is a time-ordered list of input events. The runner
//! replays it against the virtual clock, delivering each event once its
//! timestamp has passed.

use cardtrain_core::{InputEvent, PointerButton};
use rand::Rng;
use std::time::Duration;

/// Time-ordered input events.
#[derive(Debug, Clone, Default)]
pub struct GestureScript {
    events: Vec<(Duration, InputEvent)>,
    cursor: usize,
}

impl GestureScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one event; the script stays sorted by time.
    pub fn push(&mut self, at: Duration, event: InputEvent) {
        let pos = self.events.partition_point(|(t, _)| *t <= at);
        self.events.insert(pos, (at, event));
    }

    /// Merges another script into this one.
    pub fn merge(mut self, other: GestureScript) -> Self {
        for (at, event) in other.events {
            self.push(at, event);
        }
        self
    }

    /// `ticks` wheel events of `delta_y` each, `interval` apart.
    pub fn wheel_flick(start: Duration, ticks: usize, interval: Duration, delta_y: f64) -> Self {
        let mut script = Self::new();
        for i in 0..ticks {
            script.push(start + interval * i as u32, InputEvent::Wheel { delta_y });
        }
        script
    }

    /// Mouse drag from `from_y` to `to_y` in `moves` equal steps, then release.
    pub fn drag_throw(start: Duration, from_y: f64, to_y: f64, moves: usize, interval: Duration) -> Self {
        let mut script = Self::new();
        script.push(
            start,
            InputEvent::PointerDown {
                y: from_y,
                button: PointerButton::Primary,
            },
        );
        let moves = moves.max(1);
        for i in 1..=moves {
            let y = from_y + (to_y - from_y) * i as f64 / moves as f64;
            script.push(start + interval * i as u32, InputEvent::PointerMove { y });
        }
        script.push(start + interval * (moves as u32 + 1), InputEvent::PointerUp);
        script
    }

    /// Single-finger swipe, same shape as [`GestureScript::drag_throw`].
    pub fn touch_swipe(start: Duration, from_y: f64, to_y: f64, moves: usize, interval: Duration) -> Self {
        let mut script = Self::new();
        script.push(start, InputEvent::TouchStart { touches: vec![from_y] });
        let moves = moves.max(1);
        for i in 1..=moves {
            let y = from_y + (to_y - from_y) * i as f64 / moves as f64;
            script.push(start + interval * i as u32, InputEvent::TouchMove { touches: vec![y] });
        }
        script.push(start + interval * (moves as u32 + 1), InputEvent::TouchEnd);
        script
    }

    /// A seeded mix of wheel bursts, drags and swipes with idle gaps.
    pub fn random_session<R: Rng>(rng: &mut R, duration: Duration) -> Self {
        let mut script = Self::new();
        let mut t = Duration::from_millis(rng.gen_range(0..300));

        while t < duration {
            let gesture = match rng.gen_range(0..3) {
                0 => {
                    let ticks = rng.gen_range(1..12);
                    let delta = rng.gen_range(-240.0..240.0);
                    Self::wheel_flick(t, ticks, Duration::from_millis(rng.gen_range(8..60)), delta)
                }
                1 => {
                    let from = rng.gen_range(100.0..700.0);
                    let to = rng.gen_range(100.0..700.0);
                    Self::drag_throw(t, from, to, rng.gen_range(2..20), Duration::from_millis(16))
                }
                _ => {
                    let from = rng.gen_range(100.0..700.0);
                    let to = rng.gen_range(100.0..700.0);
                    Self::touch_swipe(t, from, to, rng.gen_range(2..20), Duration::from_millis(16))
                }
            };
            let end = gesture.last_at().unwrap_or(t);
            script = script.merge(gesture);
            t = end + Duration::from_millis(rng.gen_range(50..1500));
        }
        script
    }

    /// Removes and returns every event due at or before `now`.
    pub fn due(&mut self, now: Duration) -> Vec<(Duration, InputEvent)> {
        let start = self.cursor;
        while self.cursor < self.events.len() && self.events[self.cursor].0 <= now {
            self.cursor += 1;
        }
        self.events[start..self.cursor].to_vec()
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.events.len()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timestamp of the final event.
    pub fn last_at(&self) -> Option<Duration> {
        self.events.last().map(|(t, _)| *t)
    }

    pub fn events(&self) -> &[(Duration, InputEvent)] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_drag_throw_shape() {
        let script = GestureScript::drag_throw(Duration::ZERO, 400.0, 300.0, 4, Duration::from_millis(10));
        let events = script.events();
        assert_eq!(events.len(), 6);
        assert!(matches!(events[0].1, InputEvent::PointerDown { .. }));
        assert_eq!(events[4].1, InputEvent::PointerMove { y: 300.0 });
        assert_eq!(events[5].1, InputEvent::PointerUp);
    }

    #[test]
    fn test_due_releases_in_order() {
        let mut script = GestureScript::wheel_flick(Duration::from_millis(10), 3, Duration::from_millis(10), 50.0);
        assert!(script.due(Duration::from_millis(5)).is_empty());
        assert_eq!(script.due(Duration::from_millis(20)).len(), 2);
        assert_eq!(script.due(Duration::from_millis(100)).len(), 1);
        assert!(script.is_finished());
    }

    #[test]
    fn test_merge_keeps_order() {
        let a = GestureScript::wheel_flick(Duration::from_millis(0), 2, Duration::from_millis(20), 1.0);
        let b = GestureScript::wheel_flick(Duration::from_millis(10), 2, Duration::from_millis(20), 2.0);
        let merged = a.merge(b);
        let times: Vec<u64> = merged.events().iter().map(|(t, _)| t.as_millis() as u64).collect();
        assert_eq!(times, vec![0, 10, 20, 30]);
    }

    #[test]
    fn test_random_session_is_seeded() {
        let a = GestureScript::random_session(&mut ChaCha8Rng::seed_from_u64(5), Duration::from_secs(5));
        let b = GestureScript::random_session(&mut ChaCha8Rng::seed_from_u64(5), Duration::from_secs(5));
        assert_eq!(a.events(), b.events());
        assert!(!a.is_empty());
    }
}
