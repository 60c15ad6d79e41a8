use crate::*;

use alloc::vec;
use alloc::vec::Vec;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }

    fn gen_range_f64(&mut self, start: f64, end_exclusive: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        start + (end_exclusive - start) * unit
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// A list laid out the way a host would render a window: list origin, leading spacer
/// sized by the compensation, offscreen items parked off-canvas, then on-screen items.
struct SimList {
    sizes: Vec<f64>,
    origin: f64,
    scroll: f64,
    viewport: f64,
}

const OFF_CANVAS: f64 = -1.0e9;

impl SimList {
    fn uniform(count: usize, size: f64, viewport: f64) -> Self {
        Self {
            sizes: vec![size; count],
            origin: 0.0,
            scroll: 0.0,
            viewport,
        }
    }

    fn len(&self) -> usize {
        self.sizes.len()
    }

    fn sample(&self) -> ScrollSample {
        ScrollSample::for_window(self.scroll, self.viewport)
    }

    fn layout(&self, state: &WindowState) -> (Span, Vec<Span>) {
        let spacer = Span::from_size(self.origin - self.scroll, state.scroll_offset_compensation);
        let mut items = Vec::new();
        if self.len() == 0 {
            return (spacer, items);
        }
        let last = state.last_rendered_index.min(self.len() - 1);
        let mut pos = spacer.end;
        for (k, i) in (state.first_rendered_index..=last).enumerate() {
            let size = self.sizes[i];
            if k < state.offscreen_items_count {
                items.push(Span::from_size(OFF_CANVAS, size));
            } else {
                items.push(Span::from_size(pos, size));
                pos += size;
            }
        }
        (spacer, items)
    }

    fn tick(&self, engine: &WindowEngine, state: &WindowState, force: bool) -> WindowState {
        let (spacer, items) = self.layout(state);
        engine.update_window(
            state,
            &Measurements::new(spacer, &items),
            &self.sample(),
            self.len(),
            force,
        )
    }

    /// Ticks until the window stops changing.
    fn settle(&self, engine: &WindowEngine, state: &WindowState) -> WindowState {
        let mut cur = *state;
        for _ in 0..32 {
            let next = self.tick(engine, &cur, false);
            if next == cur {
                break;
            }
            cur = next;
        }
        cur
    }

    fn bootstrap(&self, engine: &WindowEngine) -> WindowState {
        let initial = engine.initial_window(self.len());
        self.tick(engine, &initial, false)
    }
}

fn zero_margin_config() -> WindowConfig {
    WindowConfig::default().with_safety_margins(0.0, 0.0)
}

fn expected_max_offscreen(config: &WindowConfig, viewport: f64, avg: f64) -> usize {
    let fitting = (viewport / avg).ceil();
    (fitting * config.offscreen_buffer_multiplier.max(0.0)).ceil() as usize
}

fn assert_invariants(config: &WindowConfig, state: &WindowState, sim: &SimList) {
    let len = sim.len();
    if len == 0 {
        assert_eq!(*state, WindowState::default());
        return;
    }
    assert!(state.first_rendered_index <= state.last_rendered_index, "{state:?}");
    assert!(state.last_rendered_index < len, "{state:?}");
    assert!(state.scroll_offset_compensation >= 0.0, "{state:?}");
    if state.is_measured() {
        // A state kept within float tolerance may carry a slightly older average.
        let max = expected_max_offscreen(config, sim.viewport, state.average_item_size - 2e-3);
        assert!(state.offscreen_items_count <= max, "{state:?} max={max}");
    }
    assert!(
        state.first_rendered_index + state.offscreen_items_count <= state.last_rendered_index
            || state.offscreen_items_count == 0,
        "{state:?}"
    );
}

#[derive(Default)]
struct RecordingHost {
    scrolled: Vec<f64>,
    reject: bool,
}

impl ScrollMutator for RecordingHost {
    fn scroll_to(&mut self, offset: f64) -> Result<(), HostError> {
        if self.reject {
            return Err(HostError::Rejected("test"));
        }
        self.scrolled.push(offset);
        Ok(())
    }
}

fn bounds_v(top: f64, bottom: f64) -> ItemBounds {
    ItemBounds::new(top, 0.0, bottom, 100.0)
}

#[test]
fn initial_window_renders_the_first_two_items() {
    let engine = WindowEngine::default();
    let s = engine.initial_window(1000);
    assert_eq!(s.first_rendered_index, 0);
    assert_eq!(s.last_rendered_index, 1);
    assert_eq!(s.average_item_size, 0.0);

    assert_eq!(engine.initial_window(1).last_rendered_index, 0);
    assert_eq!(engine.initial_window(0).last_rendered_index, 0);
}

#[test]
fn empty_list_yields_zero_state() {
    let engine = WindowEngine::default();
    let prev = WindowState {
        first_rendered_index: 4,
        last_rendered_index: 9,
        average_item_size: 20.0,
        scroll_offset_compensation: 80.0,
        offscreen_items_count: 2,
        effective_scroll_offset: 120.0,
    };
    let items = [Span::from_size(0.0, 20.0)];
    let next = engine.update_window(
        &prev,
        &Measurements::new(Span::default(), &items),
        &ScrollSample::for_window(120.0, 300.0),
        0,
        false,
    );
    assert_eq!(next, WindowState::default());
    assert_eq!(engine.remaining_size(&next, 0), 0.0);
    assert!(engine.frame(&next, 0).range.is_empty());
    assert_eq!(engine.unvirtualized_window(&prev, 0), WindowState::default());
}

#[test]
fn nothing_measured_keeps_state() {
    let engine = WindowEngine::default();
    let initial = engine.initial_window(50);
    let next = engine.update_window(
        &initial,
        &Measurements::new(Span::default(), &[]),
        &ScrollSample::for_window(0.0, 300.0),
        50,
        false,
    );
    assert_eq!(next, initial);
}

#[test]
fn bootstrap_fills_one_viewport() {
    let engine = WindowEngine::new(zero_margin_config());
    let sim = SimList::uniform(1000, 50.0, 500.0);
    let s = sim.bootstrap(&engine);

    assert_eq!(s.average_item_size, 50.0);
    assert_eq!(s.first_rendered_index, 0);
    assert_eq!(s.last_rendered_index - s.first_rendered_index + 1, 11);
    assert_eq!(s.scroll_offset_compensation, 0.0);
}

#[test]
fn update_is_a_no_op_once_settled() {
    let engine = WindowEngine::new(zero_margin_config());
    let sim = SimList::uniform(1000, 50.0, 500.0);
    let s = sim.bootstrap(&engine);
    let again = sim.tick(&engine, &s, false);
    assert_eq!(again, s);
}

#[test]
fn update_is_idempotent_for_identical_inputs() {
    let engine = WindowEngine::default();
    let mut sim = SimList::uniform(500, 37.0, 420.0);
    let mut s = sim.bootstrap(&engine);
    sim.scroll = 913.0;

    let (spacer, items) = sim.layout(&s);
    let m = Measurements::new(spacer, &items);
    let a = engine.update_window(&s, &m, &sim.sample(), sim.len(), false);
    let b = engine.update_window(&s, &m, &sim.sample(), sim.len(), false);
    assert_eq!(a, b);

    s = a;
    assert_invariants(engine.config(), &s, &sim);
}

#[test]
fn small_forward_scroll_advances_window_without_buffer() {
    let config = zero_margin_config().with_offscreen_buffer_multiplier(0.0);
    let engine = WindowEngine::new(config);
    let mut sim = SimList::uniform(1000, 50.0, 500.0);
    let s0 = sim.bootstrap(&engine);
    assert_eq!(s0.first_rendered_index, 0);

    sim.scroll = 500.0;
    let s1 = sim.tick(&engine, &s0, false);
    assert_eq!(s1.first_rendered_index, s0.first_rendered_index + 10);
    assert_eq!(
        s1.scroll_offset_compensation,
        s0.scroll_offset_compensation + 500.0
    );
    assert_eq!(s1.offscreen_items_count, 0);
    assert_eq!(s1.last_rendered_index, 20);
}

#[test]
fn small_forward_scroll_fills_offscreen_buffer_first() {
    let engine = WindowEngine::new(zero_margin_config());
    let mut sim = SimList::uniform(1000, 50.0, 500.0);
    let s0 = sim.bootstrap(&engine);

    sim.scroll = 500.0;
    let s1 = sim.tick(&engine, &s0, false);
    assert_eq!(s1.first_rendered_index, 0);
    assert_eq!(s1.offscreen_items_count, 10);
    assert_eq!(s1.scroll_offset_compensation, 500.0);
    assert_eq!(s1.last_rendered_index, 20);

    // The first on-screen item now sits exactly at the top of the viewport.
    let (_, items) = sim.layout(&s1);
    assert_eq!(items[s1.offscreen_items_count].start, 0.0);

    // Overflowing the buffer drops items from the front.
    sim.scroll = 800.0;
    let s2 = sim.tick(&engine, &s1, false);
    assert_eq!(s2.offscreen_items_count, 10);
    assert_eq!(s2.first_rendered_index, 6);
    assert_eq!(s2.scroll_offset_compensation, 800.0);
}

#[test]
fn small_backward_scroll_promotes_buffered_items() {
    let engine = WindowEngine::new(zero_margin_config());
    let mut sim = SimList::uniform(1000, 50.0, 500.0);
    let s0 = sim.bootstrap(&engine);
    sim.scroll = 500.0;
    let s1 = sim.tick(&engine, &s0, false);

    sim.scroll = 300.0;
    let s2 = sim.tick(&engine, &s1, false);
    assert_eq!(s2.first_rendered_index, 0);
    assert_eq!(s2.offscreen_items_count, 6);
    assert_eq!(s2.scroll_offset_compensation, 300.0);

    let (spacer, _) = sim.layout(&s2);
    assert_eq!(spacer.end, 0.0);
}

#[test]
fn small_backward_scroll_past_buffer_uses_estimates() {
    let config = zero_margin_config().with_offscreen_buffer_multiplier(0.0);
    let engine = WindowEngine::new(config);
    let mut sim = SimList::uniform(1000, 50.0, 500.0);
    let s0 = sim.bootstrap(&engine);
    sim.scroll = 500.0;
    let s1 = sim.tick(&engine, &s0, false);
    assert_eq!(s1.first_rendered_index, 10);

    sim.scroll = 350.0;
    let s2 = sim.tick(&engine, &s1, false);
    assert_eq!(s2.first_rendered_index, 7);
    assert_eq!(s2.offscreen_items_count, 0);
    assert_eq!(s2.scroll_offset_compensation, 350.0);
}

#[test]
fn backward_scroll_regrows_the_buffer() {
    let engine = WindowEngine::new(zero_margin_config().with_offscreen_buffer_multiplier(0.5));
    let mut sim = SimList::uniform(1000, 50.0, 500.0);
    let mut s = sim.bootstrap(&engine);
    sim.scroll = 5000.0;
    s = sim.tick(&engine, &s, true);
    s = sim.settle(&engine, &s);
    assert!(s.first_rendered_index > 50);

    sim.scroll = 4900.0;
    let next = sim.tick(&engine, &s, false);
    assert_eq!(next.offscreen_items_count, 5);
    assert_eq!(
        next.first_rendered_index + next.offscreen_items_count,
        (4900.0f64 / 50.0) as usize
    );
}

#[test]
fn large_jump_takes_the_slow_path() {
    let engine = WindowEngine::new(zero_margin_config());
    let mut sim = SimList::uniform(10_000, 50.0, 500.0);
    let mut s = sim.bootstrap(&engine);

    sim.scroll = 5000.0;
    s = sim.tick(&engine, &s, true);
    s = sim.settle(&engine, &s);
    assert!(s.first_rendered_index > 0);

    sim.scroll = 100_000.0;
    let jumped = sim.tick(&engine, &s, false);
    let expected = (100_000.0 / jumped.average_item_size) as i64;
    assert!((jumped.first_rendered_index as i64 - expected).abs() <= 1);
    assert_eq!(jumped.offscreen_items_count, 0);
    assert_eq!(
        jumped.scroll_offset_compensation,
        jumped.first_rendered_index as f64 * jumped.average_item_size
    );
    assert_invariants(engine.config(), &jumped, &sim);

    // The viewport is covered after the jump.
    let settled = sim.settle(&engine, &jumped);
    let (_, items) = sim.layout(&settled);
    let on_screen = &items[settled.offscreen_items_count..];
    assert!(on_screen.first().unwrap().start <= 0.0);
    assert!(on_screen.last().unwrap().end >= sim.viewport);
}

#[test]
fn slow_path_accounts_for_safety_margin_before() {
    let engine = WindowEngine::new(WindowConfig::default().with_safety_margins(200.0, 0.0));
    let mut sim = SimList::uniform(1000, 50.0, 500.0);
    let s = sim.bootstrap(&engine);

    sim.scroll = 5000.0;
    let s = sim.tick(&engine, &s, true);
    // floor(5000 / 50) - 1 - floor(200 / 50)
    assert_eq!(s.first_rendered_index, 95);
    assert_eq!(s.scroll_offset_compensation, 95.0 * 50.0);
}

#[test]
fn safety_margin_before_is_capped_by_scroll_offset() {
    let engine = WindowEngine::new(WindowConfig::default().with_safety_margins(200.0, 0.0));
    let sim = SimList::uniform(1000, 50.0, 500.0);
    let s = sim.bootstrap(&engine);
    // At offset 0 there is no room before the list: nothing extra is rendered.
    assert_eq!(s.first_rendered_index, 0);
    assert_eq!(s.last_rendered_index, 10);
}

#[test]
fn items_above_the_viewport_count_toward_margin_before() {
    let engine = WindowEngine::new(WindowConfig::default().with_safety_margins(200.0, 0.0));
    let mut sim = SimList::uniform(1000, 50.0, 500.0);
    let s = sim.bootstrap(&engine);

    // Still at the list start: the spacer is empty and items 0..=2 sit above the
    // viewport, so three more are rendered below it.
    sim.scroll = 150.0;
    let s = sim.tick(&engine, &s, false);
    assert_eq!(s.first_rendered_index, 0);
    assert_eq!(s.scroll_offset_compensation, 0.0);
    assert_eq!(s.last_rendered_index, 13);

    let (_, items) = sim.layout(&s);
    assert!(items.first().unwrap().start <= sim.sample().viewport.start);
    assert!(items.last().unwrap().end >= sim.sample().viewport.end);
    assert_eq!(sim.tick(&engine, &s, false), s);
}

#[test]
fn scrolling_into_first_quarter_snaps_back() {
    let engine = WindowEngine::new(zero_margin_config());
    let mut sim = SimList::uniform(1000, 50.0, 500.0);
    let mut s = sim.bootstrap(&engine);
    sim.scroll = 5000.0;
    s = sim.tick(&engine, &s, true);

    sim.scroll = 100.0;
    let snapped = sim.tick(&engine, &s, false);
    assert_eq!(snapped.first_rendered_index, 1);
    assert_eq!(snapped.offscreen_items_count, 0);
    assert_eq!(snapped.scroll_offset_compensation, 50.0);
}

#[test]
fn window_at_list_start_has_no_compensation() {
    let engine = WindowEngine::new(zero_margin_config());
    let mut sim = SimList::uniform(1000, 50.0, 500.0);
    let mut s = sim.bootstrap(&engine);
    sim.scroll = 5000.0;
    s = sim.tick(&engine, &s, true);

    sim.scroll = 0.0;
    s = sim.tick(&engine, &s, false);
    s = sim.settle(&engine, &s);
    assert_eq!(s.first_rendered_index, 0);
    assert_eq!(s.offscreen_items_count, 0);
    assert_eq!(s.scroll_offset_compensation, 0.0);
}

#[test]
fn page_buffer_extends_the_window() {
    let engine = WindowEngine::new(zero_margin_config().with_page_buffer_size(2));
    let sim = SimList::uniform(1000, 50.0, 500.0);
    let s = sim.bootstrap(&engine);
    assert_eq!(s.last_rendered_index, 30);
}

#[test]
fn tiny_item_sizes_are_clamped() {
    let engine = WindowEngine::new(zero_margin_config().with_min_item_size(10.0));
    let mut sim = SimList::uniform(100, 50.0, 500.0);
    sim.sizes[0] = 0.0;
    sim.sizes[1] = -4.0;
    let s = sim.bootstrap(&engine);
    assert_eq!(s.average_item_size, 10.0);
}

#[test]
fn average_is_smoothed() {
    let engine = WindowEngine::new(zero_margin_config());
    let mut sim = SimList::uniform(100, 50.0, 500.0);
    let s = sim.bootstrap(&engine);
    assert_eq!(s.average_item_size, 50.0);

    for size in sim.sizes.iter_mut() {
        *size = 100.0;
    }
    let next = sim.tick(&engine, &s, false);
    assert!((next.average_item_size - 60.0).abs() < 1e-9);
}

#[test]
fn remaining_size_estimates_the_tail() {
    let engine = WindowEngine::default();
    let s = WindowState {
        first_rendered_index: 10,
        last_rendered_index: 20,
        average_item_size: 50.0,
        scroll_offset_compensation: 500.0,
        offscreen_items_count: 0,
        effective_scroll_offset: 500.0,
    };
    assert_eq!(engine.remaining_size(&s, 1000), 50.0 * (1000.0 - 21.0));

    let tail = WindowState {
        last_rendered_index: 999,
        ..s
    };
    assert_eq!(engine.remaining_size(&tail, 1000), 0.0);

    // Never negative.
    let overshoot = WindowState {
        scroll_offset_compensation: 1.0e9,
        ..s
    };
    assert_eq!(engine.remaining_size(&overshoot, 1000), 0.0);
}

#[test]
fn frame_bundles_range_and_spacers() {
    let engine = WindowEngine::default();
    let s = WindowState {
        first_rendered_index: 10,
        last_rendered_index: 20,
        average_item_size: 50.0,
        scroll_offset_compensation: 600.0,
        offscreen_items_count: 2,
        effective_scroll_offset: 600.0,
    };
    let f = engine.frame(&s, 100);
    assert_eq!(
        f.range,
        VirtualRange {
            start_index: 10,
            end_index: 21
        }
    );
    assert_eq!(f.range.len(), 11);
    assert_eq!(f.offscreen_items_count, 2);
    assert_eq!(f.leading_spacer, 600.0);
    assert_eq!(f.trailing_spacer, 50.0 * 100.0 - (50.0 * 9.0 + 600.0));
}

#[test]
fn resolve_scroll_to_index_uses_scroll_into_view_semantics() {
    let engine = WindowEngine::default();
    let s = WindowState {
        first_rendered_index: 90,
        last_rendered_index: 120,
        average_item_size: 50.0,
        scroll_offset_compensation: 4500.0,
        offscreen_items_count: 0,
        effective_scroll_offset: 5000.0,
    };
    // Above the viewport: align to its start.
    assert_eq!(engine.resolve_scroll_to_index(&s, 40, 500.0), Some(2000.0));
    // Already visible.
    assert_eq!(engine.resolve_scroll_to_index(&s, 100, 500.0), None);
    assert_eq!(engine.resolve_scroll_to_index(&s, 109, 500.0), None);
    // Below the viewport: scroll just enough to reveal it.
    assert_eq!(engine.resolve_scroll_to_index(&s, 110, 500.0), Some(5050.0));
    assert_eq!(engine.resolve_scroll_to_index(&s, 0, 500.0), Some(0.0));
}

#[test]
fn random_scrolling_preserves_invariants() {
    let mut rng = Lcg::new(0x5eed);
    for round in 0..8u64 {
        let count = rng.gen_range_u64(2, 3000) as usize;
        let mut sim = SimList {
            sizes: (0..count).map(|_| rng.gen_range_f64(20.0, 80.0)).collect(),
            origin: if round % 2 == 0 { 0.0 } else { 120.0 },
            scroll: 0.0,
            viewport: rng.gen_range_f64(100.0, 900.0),
        };
        let config = WindowConfig::default()
            .with_safety_margins(rng.gen_range_f64(0.0, 300.0), rng.gen_range_f64(0.0, 300.0))
            .with_page_buffer_size((round % 3) as usize)
            .with_offscreen_buffer_multiplier(rng.gen_range_f64(0.0, 2.0));
        let engine = WindowEngine::new(config);
        let total: f64 = sim.sizes.iter().sum();

        let mut s = sim.bootstrap(&engine);
        assert_invariants(&config, &s, &sim);

        for _ in 0..200 {
            sim.scroll = if rng.gen_bool() {
                (sim.scroll + rng.gen_range_f64(-300.0, 300.0)).clamp(0.0, total)
            } else {
                rng.gen_range_f64(0.0, total)
            };
            let force = rng.gen_range_u64(0, 10) == 0;
            let next = sim.tick(&engine, &s, force);
            assert_invariants(&config, &next, &sim);

            let again = sim.tick(&engine, &s, force);
            assert_eq!(next, again);
            s = next;
        }
    }
}

#[test]
fn stacking_axis_uses_the_last_two_items() {
    let vertical = [bounds_v(0.0, 20.0), bounds_v(20.0, 40.0)];
    assert_eq!(detect_stacking_axis(&vertical), Some(Axis::Vertical));

    let horizontal = [
        ItemBounds::new(0.0, 0.0, 20.0, 50.0),
        ItemBounds::new(0.0, 50.0, 20.0, 100.0),
    ];
    assert_eq!(detect_stacking_axis(&horizontal), Some(Axis::Horizontal));

    let overlapping = [
        ItemBounds::new(0.0, 0.0, 20.0, 50.0),
        ItemBounds::new(10.0, 25.0, 30.0, 75.0),
    ];
    assert_eq!(detect_stacking_axis(&overlapping), None);

    // An off-canvas item in front does not matter.
    let relocated = [
        bounds_v(OFF_CANVAS, OFF_CANVAS + 20.0),
        bounds_v(100.0, 120.0),
        bounds_v(120.0, 140.0),
    ];
    assert_eq!(detect_stacking_axis(&relocated), Some(Axis::Vertical));
}

#[test]
fn stacking_axis_needs_two_items() {
    assert_eq!(detect_stacking_axis(&[]), None);
    assert_eq!(detect_stacking_axis(&[bounds_v(0.0, 20.0)]), None);
}

#[test]
fn bounds_project_onto_axis() {
    let b = ItemBounds::new(10.0, 5.0, 30.0, 45.0);
    assert_eq!(b.span(Axis::Vertical), Span::new(10.0, 30.0));
    assert_eq!(b.span(Axis::Horizontal).size(), 40.0);
}

#[test]
fn reconciler_ignores_user_scroll() {
    let state = WindowState {
        first_rendered_index: 20,
        last_rendered_index: 40,
        average_item_size: 50.0,
        scroll_offset_compensation: 1000.0,
        offscreen_items_count: 0,
        effective_scroll_offset: 1000.0,
    };
    let mut r = Reconciler::default();
    r.start(0, 1000.0, 40.0);

    let mut now = 0u64;
    let mut scroll = 1000.0;
    let mut sentinel = 40.0;
    let finished_at = loop {
        now += 16;
        // Sentinel moves exactly as far as the scroll: no drift.
        scroll += 7.0;
        sentinel += 7.0;
        match r.poll(now, scroll, sentinel, &state) {
            ReconcileStep::Watching => {}
            ReconcileStep::Finished => break now,
            other => panic!("unexpected step {other:?}"),
        }
        assert!(now < 10_000);
    };
    assert!(finished_at >= DEFAULT_RECONCILE_TIMEOUT_MS);
    assert!(!r.is_active());
}

#[test]
fn reconciler_cancels_layout_drift() {
    let state = WindowState {
        first_rendered_index: 5,
        last_rendered_index: 25,
        average_item_size: 50.0,
        scroll_offset_compensation: 250.0,
        offscreen_items_count: 0,
        effective_scroll_offset: 300.0,
    };
    let mut r = Reconciler::new(500);
    r.start(0, 300.0, 0.0);

    // An item above the sentinel rendered 20 larger than estimated.
    let ReconcileStep::Corrected { state: fixed, delta } = r.poll(16, 300.0, 20.0, &state) else {
        panic!("expected a correction");
    };
    assert_eq!(delta, -20.0);
    assert_eq!(fixed.scroll_offset_compensation, 230.0);
    assert_eq!(fixed.first_rendered_index, state.first_rendered_index);

    // After re-render the sentinel is back: nothing more to do.
    assert_eq!(r.poll(32, 300.0, 0.0, &fixed), ReconcileStep::Watching);
    assert_eq!(r.poll(600, 300.0, 0.0, &fixed), ReconcileStep::Finished);
}

#[test]
fn reconciler_stops_at_list_start() {
    let state = WindowState {
        first_rendered_index: 0,
        last_rendered_index: 10,
        average_item_size: 50.0,
        scroll_offset_compensation: 0.0,
        offscreen_items_count: 0,
        effective_scroll_offset: 0.0,
    };
    let mut r = Reconciler::default();
    r.start(0, 0.0, 0.0);
    assert_eq!(r.poll(16, 0.0, 35.0, &state), ReconcileStep::Finished);
    assert_eq!(r.poll(32, 0.0, 35.0, &state), ReconcileStep::Idle);
}

#[test]
fn reconciler_needs_compensation_to_correct() {
    let state = WindowState {
        first_rendered_index: 3,
        last_rendered_index: 10,
        average_item_size: 50.0,
        scroll_offset_compensation: 0.0,
        offscreen_items_count: 0,
        effective_scroll_offset: 0.0,
    };
    let mut r = Reconciler::default();
    r.start(0, 0.0, 0.0);
    assert_eq!(r.poll(16, 0.0, 12.0, &state), ReconcileStep::Watching);

    r.cancel();
    assert!(!r.is_active());
    assert_eq!(r.poll(32, 0.0, 12.0, &state), ReconcileStep::Idle);
}

#[test]
fn commander_scrolls_to_index_zero_from_anywhere() {
    let engine = WindowEngine::default();
    let state = WindowState {
        first_rendered_index: 200,
        last_rendered_index: 230,
        average_item_size: 50.0,
        scroll_offset_compensation: 10_000.0,
        offscreen_items_count: 0,
        effective_scroll_offset: 12_345.0,
    };
    let cx = CommandContext {
        engine: &engine,
        state: &state,
        list_len: 1000,
        viewport_size: 500.0,
        is_initialized: true,
    };
    let mut host = RecordingHost::default();
    let mut c = ScrollCommander::new();
    assert_eq!(
        c.scroll_to_index(&cx, 0, &mut host),
        Ok(CommandOutcome::Scrolled(0.0))
    );
    assert_eq!(host.scrolled, vec![0.0]);

    assert_eq!(
        c.scroll_to_index(&cx, 250, &mut host),
        Ok(CommandOutcome::AlreadyVisible)
    );
    assert_eq!(
        c.scroll_to_offset(&cx, 777.0, &mut host),
        Ok(CommandOutcome::Scrolled(777.0))
    );
    // Out-of-range indexes clamp to the last item.
    assert_eq!(
        c.scroll_to_index(&cx, 5000, &mut host),
        Ok(CommandOutcome::Scrolled(999.0 * 50.0 - 450.0))
    );
}

#[test]
fn commander_queues_until_initialized_and_replays_once() {
    let engine = WindowEngine::default();
    let boot = engine.initial_window(1000);
    let mut c = ScrollCommander::new();
    let mut host = RecordingHost::default();

    let cx = CommandContext {
        engine: &engine,
        state: &boot,
        list_len: 1000,
        viewport_size: 500.0,
        is_initialized: false,
    };
    assert_eq!(c.scroll_to_index(&cx, 10, &mut host), Ok(CommandOutcome::Queued));
    assert_eq!(c.scroll_to_index(&cx, 40, &mut host), Ok(CommandOutcome::Queued));
    assert_eq!(c.pending(), Some(ScrollRequest::Index(40)));
    assert_eq!(c.replay(&cx, &mut host), Ok(None));
    assert!(host.scrolled.is_empty());

    let ready = WindowState {
        last_rendered_index: 10,
        average_item_size: 50.0,
        ..boot
    };
    let cx = CommandContext {
        state: &ready,
        is_initialized: true,
        ..cx
    };
    assert_eq!(
        c.replay(&cx, &mut host),
        Ok(Some(CommandOutcome::Scrolled(40.0 * 50.0 - 450.0)))
    );
    assert_eq!(c.replay(&cx, &mut host), Ok(None));
    assert_eq!(host.scrolled, vec![1550.0]);

    assert_eq!(c.scroll_to_offset(&cx, 75.0, &mut host), Ok(CommandOutcome::Scrolled(75.0)));
    let cx = CommandContext {
        is_initialized: false,
        ..cx
    };
    assert_eq!(c.scroll_to_index(&cx, 3, &mut host), Ok(CommandOutcome::Queued));
    assert_eq!(c.take(), Some(ScrollRequest::Index(3)));
    assert_eq!(c.pending(), None);
}

#[test]
fn commander_propagates_host_errors() {
    let engine = WindowEngine::default();
    let state = WindowState {
        average_item_size: 50.0,
        effective_scroll_offset: 900.0,
        ..WindowState::default()
    };
    let cx = CommandContext {
        engine: &engine,
        state: &state,
        list_len: 100,
        viewport_size: 300.0,
        is_initialized: true,
    };
    let mut host = RecordingHost {
        reject: true,
        ..RecordingHost::default()
    };
    let err = ScrollCommander::new()
        .scroll_to_index(&cx, 0, &mut host)
        .unwrap_err();
    assert_eq!(err, HostError::Rejected("test"));
}

#[test]
fn discover_scroll_host_walks_ancestors_iteratively() {
    // 0 <- 1 <- 2 <- 3 (parent links), node 1 scrolls.
    let parents = [None, Some(0usize), Some(1), Some(2)];
    let found = discover_scroll_host(3usize, |n| parents[n], |n| n == 1, 16);
    assert_eq!(found, Some(1));

    let none = discover_scroll_host(3usize, |n| parents[n], |_| false, 16);
    assert_eq!(none, None);

    // A cyclic parent chain terminates at the depth bound.
    let cyclic = discover_scroll_host(0usize, |n| Some((n + 1) % 3), |_| false, 8);
    assert_eq!(cyclic, None);
}

#[test]
fn state_direction_and_counts() {
    let s = WindowState {
        first_rendered_index: 4,
        last_rendered_index: 9,
        offscreen_items_count: 2,
        effective_scroll_offset: 100.0,
        ..WindowState::default()
    };
    assert_eq!(s.rendered_count(100), 6);
    assert_eq!(s.rendered_count(0), 0);
    assert_eq!(s.first_on_screen_index(), 6);
    assert_eq!(s.direction_to(150.0), Some(ScrollDirection::Forward));
    assert_eq!(s.direction_to(50.0), Some(ScrollDirection::Backward));
    assert_eq!(s.direction_to(100.0), None);
}
