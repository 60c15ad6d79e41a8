use windowing::{
    Axis, HostError, ItemBounds, MeasurementProvider, ScrollMutator, ScrollSample,
    ScrollSampleProvider, WindowConfig, WindowFrame,
};
use windowing_adapter::{ControllerOptions, ListController, TaskToken};

/// A pretend scroll container: a vertical list whose rows load "late" and come out
/// taller than the first rows the engine saw.
struct Host {
    scroll: f64,
    viewport: f64,
    frame: WindowFrame,
}

fn row_size(i: usize) -> f64 {
    if i < 500 { 64.0 } else { 48.0 }
}

impl ScrollSampleProvider for Host {
    fn scroll_sample(&self, _axis: Axis) -> Result<ScrollSample, HostError> {
        Ok(ScrollSample::for_window(self.scroll, self.viewport))
    }
}

impl MeasurementProvider for Host {
    fn leading_spacer(&self) -> Result<ItemBounds, HostError> {
        Ok(ItemBounds::new(
            -self.scroll,
            0.0,
            -self.scroll + self.frame.leading_spacer,
            320.0,
        ))
    }

    fn measure_items(&self, out: &mut Vec<ItemBounds>) -> Result<(), HostError> {
        let mut top = -self.scroll + self.frame.leading_spacer;
        let range = self.frame.range;
        for (k, i) in (range.start_index..range.end_index).enumerate() {
            let size = row_size(i);
            if k < self.frame.offscreen_items_count {
                out.push(ItemBounds::new(-1.0e9, 0.0, -1.0e9 + size, 320.0));
            } else {
                out.push(ItemBounds::new(top, 0.0, top + size, 320.0));
                top += size;
            }
        }
        Ok(())
    }
}

impl ScrollMutator for Host {
    fn scroll_to(&mut self, offset: f64) -> Result<(), HostError> {
        self.scroll = offset;
        Ok(())
    }
}

enum Callback {
    Frame(TaskToken),
    Reconcile(TaskToken),
}

fn main() {
    // Example: a host frame loop. Scroll events are coalesced into one recompute per
    // frame, and reconcile callbacks keep running until the controller stops asking.
    let mut c = ListController::new(WindowConfig::default(), ControllerOptions::default(), 1_000);
    let mut host = Host {
        scroll: 0.0,
        viewport: 720.0,
        frame: WindowFrame::default(),
    };

    let mut queue = Vec::new();
    if let Some(token) = c.bootstrap() {
        queue.push(Callback::Frame(token));
    }
    host.frame = c.frame();

    // Queued until the first window is computed, then replayed once.
    let queued = c.scroll_to_index(600, &mut host);
    println!("scroll_to_index(600) before init: {queued:?}");

    let gestures = [0.0, 0.0, 900.0, 1_400.0, 1_200.0, 1_000.0, 980.0];
    let mut now_ms = 0u64;
    for frame_no in 0..60 {
        now_ms += 16;
        if let Some(&target) = gestures.get(frame_no) {
            if target > 0.0 {
                host.scroll = target;
                if let Some(token) = c.on_scroll(now_ms) {
                    queue.push(Callback::Frame(token));
                }
            }
        }

        for cb in std::mem::take(&mut queue) {
            let outcome = match cb {
                Callback::Frame(token) => c.on_frame(token, now_ms, &mut host),
                Callback::Reconcile(token) => c.on_reconcile_frame(token, now_ms, &mut host),
            };
            if let Some(frame) = outcome.render {
                host.frame = frame;
                println!(
                    "t={now_ms:>4} scroll={:>7.1} range={:?} offscreen={} leading={:.1}",
                    host.scroll, frame.range, frame.offscreen_items_count, frame.leading_spacer
                );
            }
            if let Some(token) = outcome.reconcile {
                queue.push(Callback::Reconcile(token));
            }
            if let Some(token) = outcome.frame {
                queue.push(Callback::Frame(token));
            }
        }
        c.tick(now_ms);
    }

    println!(
        "lifecycle={:?} axis={:?} scrolling={} reconciling={}",
        c.lifecycle(),
        c.axis(),
        c.is_scrolling(),
        c.is_reconciling()
    );
    let disposal = c.dispose();
    println!("disposed: {disposal:?}");
}
