// Example: driving the engine by hand against a simulated list.
use windowing::{Measurements, ScrollSample, Span, WindowConfig, WindowEngine, WindowState};

const LEN: usize = 100_000;
const VIEWPORT: f64 = 600.0;

fn item_size(i: usize) -> f64 {
    // Two row heights, like a feed with occasional taller entries.
    if i % 7 == 0 { 90.0 } else { 40.0 }
}

/// Lays out the rendered window the way a host would and measures it.
fn measure(state: &WindowState, scroll: f64) -> (Span, Vec<Span>) {
    let spacer = Span::from_size(-scroll, state.scroll_offset_compensation);
    let mut pos = spacer.end;
    let mut items = Vec::new();
    for (k, i) in (state.first_rendered_index..=state.last_rendered_index).enumerate() {
        if k < state.offscreen_items_count {
            items.push(Span::from_size(-1.0e9, item_size(i)));
        } else {
            items.push(Span::from_size(pos, item_size(i)));
            pos += item_size(i);
        }
    }
    (spacer, items)
}

fn main() {
    let engine = WindowEngine::new(WindowConfig::default().with_page_buffer_size(1));
    let mut state = engine.initial_window(LEN);

    for scroll in [0.0, 0.0, 180.0, 420.0, 900.0, 250_000.0, 249_700.0, 10.0] {
        let (spacer, items) = measure(&state, scroll);
        state = engine.update_window(
            &state,
            &Measurements::new(spacer, &items),
            &ScrollSample::for_window(scroll, VIEWPORT),
            LEN,
            false,
        );
        let frame = engine.frame(&state, LEN);
        println!(
            "scroll={scroll:>9.1} range={:?} offscreen={} leading={:.1} trailing={:.1} avg={:.2}",
            frame.range,
            frame.offscreen_items_count,
            frame.leading_spacer,
            frame.trailing_spacer,
            state.average_item_size,
        );
    }

    let target = engine.resolve_scroll_to_index(&state, 5_000, VIEWPORT);
    println!("scroll_to_index(5000) -> {target:?}");
}
