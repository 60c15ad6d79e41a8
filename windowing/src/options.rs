use crate::num::{ceil_count, non_negative};

/// Configuration for [`crate::WindowEngine`].
///
/// Immutable per engine instance. All distances are in the host's units along the
/// stacking axis (e.g. CSS pixels).
#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WindowConfig {
    /// Extra viewports worth of items rendered after the visible window.
    pub page_buffer_size: usize,
    /// Distance before the viewport that must stay covered by rendered items.
    ///
    /// Capped by the current scroll offset, so it never asks for space before the
    /// start of the list.
    pub viewport_safety_margin_before: f64,
    /// Distance after the viewport that must stay covered by rendered items.
    pub viewport_safety_margin_after: f64,
    /// Lower clamp for measured item sizes.
    ///
    /// Items in the middle of a size transition can report near-zero sizes that
    /// would otherwise drag the average down.
    pub min_item_size: f64,
    /// Scales the offscreen buffer (one viewport of items at `1.0`).
    ///
    /// Supplied by the host to compensate for platform-specific scroll event
    /// coalescing. `0.0` disables the buffer.
    pub offscreen_buffer_multiplier: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            page_buffer_size: 0,
            viewport_safety_margin_before: 200.0,
            viewport_safety_margin_after: 200.0,
            min_item_size: 1.0,
            offscreen_buffer_multiplier: 1.0,
        }
    }
}

impl WindowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_buffer_size(mut self, page_buffer_size: usize) -> Self {
        self.page_buffer_size = page_buffer_size;
        self
    }

    pub fn with_safety_margins(mut self, before: f64, after: f64) -> Self {
        self.viewport_safety_margin_before = before;
        self.viewport_safety_margin_after = after;
        self
    }

    pub fn with_min_item_size(mut self, min_item_size: f64) -> Self {
        self.min_item_size = min_item_size;
        self
    }

    pub fn with_offscreen_buffer_multiplier(mut self, multiplier: f64) -> Self {
        self.offscreen_buffer_multiplier = multiplier;
        self
    }

    /// `min_item_size`, never below a hair above zero so averages stay positive.
    pub(crate) fn item_size_floor(&self) -> f64 {
        self.min_item_size.max(f64::EPSILON)
    }

    pub(crate) fn clamp_item_size(&self, size: f64) -> f64 {
        size.max(self.item_size_floor())
    }

    /// Margin before the viewport, capped by the scroll offset.
    pub(crate) fn margin_before(&self, scroll_offset: f64) -> f64 {
        non_negative(self.viewport_safety_margin_before).min(non_negative(scroll_offset))
    }

    pub(crate) fn margin_after(&self) -> f64 {
        non_negative(self.viewport_safety_margin_after)
    }

    pub(crate) fn max_offscreen(&self, items_fitting_viewport: usize) -> usize {
        ceil_count(items_fitting_viewport as f64 * non_negative(self.offscreen_buffer_multiplier))
    }

    pub(crate) fn safety_after_items(&self, avg: f64, items_fitting_viewport: usize) -> usize {
        ceil_count(self.margin_after() / avg)
            .saturating_add(self.page_buffer_size.saturating_mul(items_fitting_viewport))
    }
}

impl core::fmt::Debug for WindowConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WindowConfig")
            .field("page_buffer_size", &self.page_buffer_size)
            .field("margin_before", &self.viewport_safety_margin_before)
            .field("margin_after", &self.viewport_safety_margin_after)
            .field("min_item_size", &self.min_item_size)
            .field(
                "offscreen_buffer_multiplier",
                &self.offscreen_buffer_multiplier,
            )
            .finish()
    }
}
