use core::cmp;

use crate::ScrollDirection;
use crate::num::approx_eq;

/// A snapshot of the window after one engine tick.
///
/// Owned by the engine and replaced (never mutated) on every tick. Two states with
/// equal fields are interchangeable, so callers can compare the previous and next
/// state to skip a re-render.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowState {
    pub first_rendered_index: usize,
    /// Inclusive.
    pub last_rendered_index: usize,
    /// Smoothed per-item size along the stacking axis; `0` before the first measurement.
    pub average_item_size: f64,
    /// Leading space standing in for unrendered (and offscreen) leading items.
    pub scroll_offset_compensation: f64,
    /// Rendered items relocated off-canvas at the window's leading edge.
    pub offscreen_items_count: usize,
    /// Scroll offset this state was computed against.
    pub effective_scroll_offset: f64,
}

impl WindowState {
    /// Number of materialized items (offscreen buffer included), `0` for an empty list.
    pub fn rendered_count(&self, list_len: usize) -> usize {
        if list_len == 0 {
            return 0;
        }
        let last = cmp::min(self.last_rendered_index, list_len - 1);
        last.saturating_sub(self.first_rendered_index) + 1
    }

    /// Index of the first item that is actually on screen.
    pub fn first_on_screen_index(&self) -> usize {
        self.first_rendered_index
            .saturating_add(self.offscreen_items_count)
    }

    pub fn is_measured(&self) -> bool {
        self.average_item_size > 0.0
    }

    /// Direction of a scroll from this state's offset to `scroll_offset`, if any.
    pub fn direction_to(&self, scroll_offset: f64) -> Option<ScrollDirection> {
        if scroll_offset > self.effective_scroll_offset {
            Some(ScrollDirection::Forward)
        } else if scroll_offset < self.effective_scroll_offset {
            Some(ScrollDirection::Backward)
        } else {
            None
        }
    }

    /// Field-wise equality with a tolerance on the float fields.
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.first_rendered_index == other.first_rendered_index
            && self.last_rendered_index == other.last_rendered_index
            && self.offscreen_items_count == other.offscreen_items_count
            && approx_eq(self.average_item_size, other.average_item_size)
            && approx_eq(
                self.scroll_offset_compensation,
                other.scroll_offset_compensation,
            )
            && approx_eq(self.effective_scroll_offset, other.effective_scroll_offset)
    }
}
