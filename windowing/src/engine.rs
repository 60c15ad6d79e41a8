use core::cmp;

use crate::num::{abs, ceil_count, floor_count, non_negative};
use crate::{Measurements, ScrollSample, VirtualRange, WindowConfig, WindowFrame, WindowState};

/// Weights of the previous average and of the new sample.
///
/// Damps oscillation from items whose size changes shortly after mount.
const PREVIOUS_AVERAGE_WEIGHT: f64 = 0.8;
const SAMPLE_WEIGHT: f64 = 0.2;

/// Working copy of the leading-edge fields while a tick is computed.
#[derive(Clone, Copy, Debug)]
struct Cursor {
    first: usize,
    offscreen: usize,
    compensation: f64,
}

/// Per-tick quantities derived from the configuration and the new average.
#[derive(Clone, Copy, Debug)]
struct Budget {
    avg: f64,
    margin_before: f64,
    items_fitting_viewport: usize,
    max_offscreen: usize,
    safety_before_items: usize,
    safety_after_items: usize,
}

/// The windowing engine.
///
/// A pure state-transition function over [`WindowState`]: all inputs (measurements,
/// scroll sample, list length) are passed in and the next state is returned. The
/// engine holds no UI objects and performs no I/O.
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowEngine {
    config: WindowConfig,
}

impl WindowEngine {
    pub fn new(config: WindowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// The bootstrap window: the first two items, no size estimate yet.
    pub fn initial_window(&self, list_len: usize) -> WindowState {
        WindowState {
            last_rendered_index: cmp::min(1, list_len.saturating_sub(1)),
            ..WindowState::default()
        }
    }

    /// A window covering the whole list, used when virtualization cannot engage.
    pub fn unvirtualized_window(&self, state: &WindowState, list_len: usize) -> WindowState {
        if list_len == 0 {
            return WindowState::default();
        }
        WindowState {
            first_rendered_index: 0,
            last_rendered_index: list_len.saturating_sub(1),
            average_item_size: state.average_item_size,
            scroll_offset_compensation: 0.0,
            offscreen_items_count: 0,
            effective_scroll_offset: state.effective_scroll_offset,
        }
    }

    /// Folds the on-screen item sizes into the running average.
    ///
    /// Returns `None` when nothing has ever been measured.
    pub fn measure_average(&self, state: &WindowState, measured: &Measurements<'_>) -> Option<f64> {
        let on_screen = measured.on_screen(state.offscreen_items_count);
        if on_screen.is_empty() {
            return state.is_measured().then_some(state.average_item_size);
        }

        let total: f64 = on_screen
            .iter()
            .map(|span| self.config.clamp_item_size(span.size()))
            .sum();
        let sampled = total / on_screen.len() as f64;

        Some(if state.is_measured() {
            PREVIOUS_AVERAGE_WEIGHT * state.average_item_size + SAMPLE_WEIGHT * sampled
        } else {
            sampled
        })
    }

    /// Computes the next window.
    ///
    /// Small scrolls move items between the on-screen window and the offscreen
    /// buffer using their measured sizes. Large jumps (or `force_recalc`) re-derive
    /// the window from the scroll position and the average item size.
    ///
    /// `force_recalc` is also implied when the scroll offset sits in the first
    /// quarter of the viewport while the window is not anchored at index `0`.
    ///
    /// When nothing has been measured yet the input state is returned unchanged. When
    /// the result equals the input within float tolerance, the input is returned
    /// as-is so callers can skip re-rendering.
    pub fn update_window(
        &self,
        state: &WindowState,
        measured: &Measurements<'_>,
        sample: &ScrollSample,
        list_len: usize,
        force_recalc: bool,
    ) -> WindowState {
        if list_len == 0 {
            return WindowState::default();
        }
        let Some(avg) = self.measure_average(state, measured) else {
            wtrace!("update_window: no measurements yet");
            return *state;
        };

        let last_index = list_len - 1;
        let budget = self.budget(avg, sample);
        let snap_back =
            state.first_rendered_index > 0 && sample.scroll_offset < sample.viewport_size / 4.0;

        let current = Cursor {
            first: state.first_rendered_index,
            offscreen: cmp::min(state.offscreen_items_count, measured.items.len()),
            compensation: state.scroll_offset_compensation,
        };

        let incremental = if force_recalc
            || snap_back
            || !state.is_measured()
            || state.first_rendered_index > last_index
            || self.is_large_jump(state, measured, sample)
        {
            None
        } else {
            self.small_delta(current, measured, sample, &budget)
        };

        let cursor = match incremental {
            Some(cursor) => cursor,
            None => self.slow_path(measured, sample, list_len, &budget),
        };

        let next = self.finish(cursor, avg, measured, sample, last_index, &budget);
        if next.approx_eq(state) { *state } else { next }
    }

    /// Size of the trailing spacer.
    pub fn remaining_size(&self, state: &WindowState, list_len: usize) -> f64 {
        if list_len == 0 || state.last_rendered_index >= list_len - 1 {
            return 0.0;
        }
        let avg = state.average_item_size;
        let on_screen = state
            .rendered_count(list_len)
            .saturating_sub(state.offscreen_items_count) as f64;
        non_negative(avg * list_len as f64 - (avg * on_screen + state.scroll_offset_compensation))
    }

    /// Scroll-into-view target for `target_index`.
    ///
    /// Returns `None` when the item is already within the viewport.
    pub fn resolve_scroll_to_index(
        &self,
        state: &WindowState,
        target_index: usize,
        viewport_size: f64,
    ) -> Option<f64> {
        let avg = state.average_item_size;
        let position = target_index as f64 * avg;
        let current = state.effective_scroll_offset;

        if position < current {
            Some(position)
        } else if position > current + viewport_size - avg {
            Some(non_negative(position - (viewport_size - avg)))
        } else {
            None
        }
    }

    /// The render instruction for `state`.
    pub fn frame(&self, state: &WindowState, list_len: usize) -> WindowFrame {
        if list_len == 0 {
            return WindowFrame::default();
        }
        let end_index = cmp::min(state.last_rendered_index, list_len - 1) + 1;
        WindowFrame {
            range: VirtualRange {
                start_index: cmp::min(state.first_rendered_index, end_index - 1),
                end_index,
            },
            offscreen_items_count: state.offscreen_items_count,
            leading_spacer: state.scroll_offset_compensation,
            trailing_spacer: self.remaining_size(state, list_len),
        }
    }

    fn budget(&self, avg: f64, sample: &ScrollSample) -> Budget {
        let margin_before = self.config.margin_before(sample.scroll_offset);
        let items_fitting_viewport = ceil_count(sample.viewport_size / avg);
        Budget {
            avg,
            margin_before,
            items_fitting_viewport,
            max_offscreen: self.config.max_offscreen(items_fitting_viewport),
            safety_before_items: ceil_count(margin_before / avg),
            safety_after_items: self.config.safety_after_items(avg, items_fitting_viewport),
        }
    }

    /// A scroll delta larger than everything rendered plus one viewport cannot be
    /// reasoned about incrementally.
    fn is_large_jump(
        &self,
        state: &WindowState,
        measured: &Measurements<'_>,
        sample: &ScrollSample,
    ) -> bool {
        let extent: f64 = measured.items.iter().map(|s| non_negative(s.size())).sum();
        abs(sample.scroll_offset - state.effective_scroll_offset) > extent + sample.viewport_size
    }

    fn small_delta(
        &self,
        cursor: Cursor,
        measured: &Measurements<'_>,
        sample: &ScrollSample,
        budget: &Budget,
    ) -> Option<Cursor> {
        let target = sample.viewport.start - budget.margin_before;
        let gap = target - measured.window_start(cursor.offscreen);
        if gap > 0.0 {
            self.scroll_forward(cursor, measured, gap, budget)
        } else if gap < 0.0 {
            self.scroll_backward(cursor, measured, sample, -gap, budget)
        } else {
            Some(cursor)
        }
    }

    /// The window start has scrolled past the margin: move leading on-screen items
    /// into the offscreen buffer.
    fn scroll_forward(
        &self,
        mut cursor: Cursor,
        measured: &Measurements<'_>,
        gap: f64,
        budget: &Budget,
    ) -> Option<Cursor> {
        let on_screen = measured.on_screen(cursor.offscreen);
        let mut consumed = 0usize;
        let mut consumed_size = 0.0;
        for span in on_screen {
            let size = self.config.clamp_item_size(span.size());
            if consumed_size + size > gap {
                break;
            }
            consumed_size += size;
            consumed += 1;
        }
        if consumed == on_screen.len() {
            // Scrolled past everything that is rendered.
            return None;
        }

        cursor.compensation += consumed_size;
        cursor.offscreen += consumed;
        if cursor.offscreen > budget.max_offscreen {
            let overflow = cursor.offscreen - budget.max_offscreen;
            cursor.first = cursor.first.saturating_add(overflow);
            cursor.offscreen = budget.max_offscreen;
        }

        wtrace!(
            gap,
            consumed,
            first = cursor.first,
            offscreen = cursor.offscreen,
            compensation = cursor.compensation,
            "update_window: small delta forward"
        );
        Some(cursor)
    }

    /// The window start lags the margin: promote offscreen items back on screen,
    /// then pull estimated items in front of the window.
    fn scroll_backward(
        &self,
        mut cursor: Cursor,
        measured: &Measurements<'_>,
        sample: &ScrollSample,
        mut lag: f64,
        budget: &Budget,
    ) -> Option<Cursor> {
        let buffer = measured.offscreen(cursor.offscreen);
        let buffered: f64 = buffer
            .iter()
            .map(|span| self.config.clamp_item_size(span.size()))
            .sum();
        if lag > buffered + sample.viewport_size + budget.margin_before {
            return None;
        }

        while lag > 0.0 && cursor.offscreen > 0 {
            let Some(span) = buffer.get(cursor.offscreen - 1) else {
                break;
            };
            let size = self.config.clamp_item_size(span.size());
            lag -= size;
            cursor.compensation -= size;
            cursor.offscreen -= 1;
        }

        if lag > 0.0 {
            if !invariant!(
                cursor.offscreen == 0,
                "offscreen buffer should be empty after full promotion"
            ) {
                cursor.offscreen = 0;
            }
            let count = cmp::min(ceil_count(lag / budget.avg), cursor.first);
            cursor.first -= count;
            cursor.compensation -= count as f64 * budget.avg;
        }

        let room = budget.max_offscreen.saturating_sub(cursor.offscreen);
        let pulled = cmp::min(room, cursor.first);
        cursor.first -= pulled;
        cursor.offscreen += pulled;

        wtrace!(
            first = cursor.first,
            offscreen = cursor.offscreen,
            pulled,
            compensation = cursor.compensation,
            "update_window: small delta backward"
        );
        Some(cursor)
    }

    /// Re-derives the window from the scroll position alone.
    fn slow_path(
        &self,
        measured: &Measurements<'_>,
        sample: &ScrollSample,
        list_len: usize,
        budget: &Budget,
    ) -> Cursor {
        let start_offset = non_negative(sample.viewport.start - measured.spacer.start);
        let window_span = budget
            .items_fitting_viewport
            .saturating_add(budget.safety_before_items)
            .saturating_add(budget.safety_after_items);
        let upper = (list_len - 1).saturating_sub(window_span);

        let first = floor_count(start_offset / budget.avg)
            .saturating_sub(1)
            .saturating_sub(floor_count(budget.margin_before / budget.avg))
            .min(upper);

        wtrace!(start_offset, first, "update_window: slow path");
        Cursor {
            first,
            offscreen: 0,
            compensation: first as f64 * budget.avg,
        }
    }

    fn finish(
        &self,
        mut cursor: Cursor,
        avg: f64,
        measured: &Measurements<'_>,
        sample: &ScrollSample,
        last_index: usize,
        budget: &Budget,
    ) -> WindowState {
        if cursor.offscreen > budget.max_offscreen {
            // The viewport shrank since the buffer was filled.
            let overflow = cursor.offscreen - budget.max_offscreen;
            cursor.first = cursor.first.saturating_add(overflow);
            cursor.offscreen = budget.max_offscreen;
        }
        if cursor.first > last_index {
            cursor.first = last_index;
            cursor.offscreen = 0;
        }

        // Leading items are either replaced by the spacer or rendered above the
        // viewport (near the list start, where the spacer is empty).
        let implied_by_compensation = floor_count(non_negative(cursor.compensation) / avg);
        let above_viewport = floor_count(
            non_negative(sample.viewport.start - measured.spacer.start - cursor.compensation) / avg,
        );
        let rendered = budget
            .items_fitting_viewport
            .saturating_add(cmp::min(
                budget.safety_before_items,
                cmp::max(implied_by_compensation, above_viewport),
            ))
            .saturating_add(budget.safety_after_items)
            .saturating_add(cursor.offscreen);
        let mut last = cmp::min(last_index, cursor.first.saturating_add(rendered));
        if !invariant!(
            cursor.first <= last,
            "first rendered index must not exceed the last"
        ) {
            last = cursor.first;
        }
        // At least one rendered item stays on screen.
        let offscreen = cmp::min(cursor.offscreen, last - cursor.first);
        cursor.compensation -= (cursor.offscreen - offscreen) as f64 * avg;
        cursor.offscreen = offscreen;

        if cursor.first == 0 && cursor.offscreen == 0 {
            cursor.compensation = 0.0;
        }
        let compensation = non_negative(cursor.compensation);

        WindowState {
            first_rendered_index: cursor.first,
            last_rendered_index: last,
            average_item_size: avg,
            scroll_offset_compensation: compensation,
            offscreen_items_count: offscreen,
            effective_scroll_offset: sample.scroll_offset,
        }
    }
}
