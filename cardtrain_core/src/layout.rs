//! The Cyclic Layout Engine.
//!
//! Folds every card's rail coordinate into a finite wrap window so that the
//! sequence appears to run forever in both directions.
//!
//! # Algorithm
//!
//! ```text
//! sShift   = offset * stepLength
//! s        = s0 - sShift
//! sWrapped = sStart + floorMod(s - sStart, sTotal)
//! along    = sWrapped + epsAlong
//! position = base + perp + direction * along
//! ```
//!
//! Each card wraps on its own phase, so cards cross the window boundary one
//! at a time and the visible run stays evenly spaced. The window is `W`
//! sequence lengths wide with the unwrapped layout centred in it.
//!
//! The per-frame pass is a pure function over a slice of [`CardItem`]s: no
//! sorting, no search, no state carried between frames.

use crate::rail::Rail;
use crate::scroll::floored_mod;
use cardtrain_env::PanelHandle;
use nalgebra::Vector3;

/// One card on the rail.
///
/// Everything here is fixed at creation; only the wrapped position computed
/// from it changes per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CardItem {
    /// Position in the feed
    pub index: usize,

    /// Renderer panel (owned by the appearance strategy)
    pub visual: PanelHandle,

    /// Signed projection onto the rail direction
    pub s0: f64,

    /// Lateral offset from the rail
    pub perp: Vector3<f64>,

    /// Tiny, strictly decreasing bias that breaks depth ties
    pub eps_along: f64,
}

impl CardItem {
    /// Creates the item for `index` from the rail geometry.
    pub fn new(rail: &Rail, index: usize, visual: PanelHandle, eps_z: f64) -> Self {
        let placement = rail.placement(index);
        Self {
            index,
            visual,
            s0: placement.s0,
            perp: placement.perp,
            eps_along: -eps_z * index as f64,
        }
    }

    /// Position before any scrolling or wrapping.
    pub fn initial_position(&self, rail: &Rail) -> Vector3<f64> {
        rail.point_at(&self.perp, self.s0 + self.eps_along)
    }
}

/// Wrap window derived once from the loaded cards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapParams {
    /// Lower bound of the window
    pub s_start: f64,

    /// Window length (`W` sequence lengths)
    pub s_total: f64,

    /// One sequence length (`stepLength * max(1, cardCount)`)
    pub wrap_len: f64,

    /// Rail spacing the window was built for
    pub step_length: f64,
}

impl WrapParams {
    /// Derives the window from the items' `s0` values.
    ///
    /// Sorting happens here, once, never per frame. An empty slice still
    /// yields a valid window one step long per repeat.
    pub fn compute(items: &[CardItem], step_length: f64, wrap_repeats: u32) -> Self {
        let mut s_values: Vec<f64> = items.iter().map(|it| it.s0).collect();
        s_values.sort_by(|a, b| a.total_cmp(b));
        let first_s = s_values.first().copied().unwrap_or(0.0);

        let repeats = wrap_repeats.max(1) as f64;
        let wrap_len = step_length * items.len().max(1) as f64;
        let s_start = first_s - wrap_len * ((repeats - 1.0) / 2.0);
        let s_total = wrap_len * repeats;

        Self {
            s_start,
            s_total,
            wrap_len,
            step_length,
        }
    }

    /// Scroll distance (turns) after which the layout repeats exactly.
    pub fn period_turns(&self) -> f64 {
        self.s_total / self.step_length
    }

    /// Rail distance covered by `offset` turns.
    pub fn shift_for(&self, offset: f64) -> f64 {
        offset * self.step_length
    }

    /// Folds a rail coordinate into `[s_start, s_start + s_total)`.
    pub fn wrap(&self, s: f64) -> f64 {
        self.s_start + floored_mod(s - self.s_start, self.s_total)
    }

    /// Wrapped coordinate of `item` at the given scroll offset.
    pub fn wrapped_s(&self, item: &CardItem, offset: f64) -> f64 {
        self.wrap(item.s0 - self.shift_for(offset))
    }

    /// Wrapped coordinate plus the item's depth bias.
    pub fn along(&self, item: &CardItem, offset: f64) -> f64 {
        self.wrapped_s(item, offset) + item.eps_along
    }
}

/// Per-card output of one layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardPlacement {
    pub visual: PanelHandle,
    pub along: f64,
    pub position: Vector3<f64>,
}

/// Lays out every item for the given scroll offset.
pub fn layout(rail: &Rail, wrap: &WrapParams, items: &[CardItem], offset: f64) -> Vec<CardPlacement> {
    let s_shift = wrap.shift_for(offset);
    items
        .iter()
        .map(|item| {
            let along = wrap.wrap(item.s0 - s_shift) + item.eps_along;
            CardPlacement {
                visual: item.visual,
                along,
                position: rail.point_at(&item.perp, along),
            }
        })
        .collect()
}

/// Builds the items for `count` cards with the given visuals.
pub fn build_items(rail: &Rail, visuals: &[PanelHandle], eps_z: f64) -> Vec<CardItem> {
    visuals
        .iter()
        .enumerate()
        .map(|(i, visual)| CardItem::new(rail, i, *visual, eps_z))
        .collect()
}
