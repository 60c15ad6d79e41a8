use alloc::vec::Vec;

use thiserror::Error;

use crate::{Axis, ItemBounds, ScrollSample};

/// Failure reported by a scroll host while it is being queried or driven.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HostError {
    #[error("scroll host is detached")]
    Detached,

    #[error("measurement unavailable: {0}")]
    Unavailable(&'static str),

    #[error("scroll request rejected: {0}")]
    Rejected(&'static str),
}

/// Reads the scroll geometry of the host at frame time.
pub trait ScrollSampleProvider {
    /// Scroll offset and viewport projected onto `axis`.
    fn scroll_sample(&self, axis: Axis) -> Result<ScrollSample, HostError>;
}

/// Reads the geometry of the currently materialized items.
pub trait MeasurementProvider {
    /// Bounds of the leading spacer (the element sized by the scroll compensation).
    fn leading_spacer(&self) -> Result<ItemBounds, HostError>;

    /// Appends the bounds of every materialized item, in render order, to `out`.
    ///
    /// `out` is cleared by the caller; adapters can reuse one scratch buffer across
    /// frames.
    fn measure_items(&self, out: &mut Vec<ItemBounds>) -> Result<(), HostError>;
}

/// Applies a scroll offset to the host.
pub trait ScrollMutator {
    fn scroll_to(&mut self, offset: f64) -> Result<(), HostError>;
}

/// The full capability set a list needs from its scroll host.
///
/// Window and element hosts implement the same three capabilities.
pub trait ScrollHost: ScrollSampleProvider + MeasurementProvider + ScrollMutator {}

impl<T: ScrollSampleProvider + MeasurementProvider + ScrollMutator> ScrollHost for T {}

/// Finds the nearest scrollable ancestor of `start` (inclusive).
///
/// Walks `parent_of` iteratively for at most `max_depth` steps. `None` means no
/// scrollable ancestor was found before the root (or the bound), so the window
/// is the scroll host.
pub fn discover_scroll_host<N: Copy>(
    start: N,
    mut parent_of: impl FnMut(N) -> Option<N>,
    mut is_scrollable: impl FnMut(N) -> bool,
    max_depth: usize,
) -> Option<N> {
    let mut node = start;
    for _ in 0..=max_depth {
        if is_scrollable(node) {
            return Some(node);
        }
        node = parent_of(node)?;
    }
    wdebug!(max_depth, "discover_scroll_host: depth bound reached");
    None
}
