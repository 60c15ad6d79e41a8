use crate::WindowState;
use crate::num::non_negative;

/// Default length of one observation window.
pub const DEFAULT_RECONCILE_TIMEOUT_MS: u64 = 500;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Baseline {
    started_ms: u64,
    scroll_offset: f64,
    sentinel_offset: f64,
}

/// Result of one reconciler poll.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReconcileStep {
    /// Not observing.
    Idle,
    /// No drift this frame; poll again next frame.
    Watching,
    /// Drift was cancelled out: render `state` and poll again next frame.
    Corrected { state: WindowState, delta: f64 },
    /// The observation window ended (timeout or nothing left to correct).
    Finished,
}

/// Cancels scroll "jumps" caused by items that entered at the window's leading edge
/// with an estimated size and then rendered at a different size.
///
/// Adapter-driven: call [`Reconciler::start`] once the new items are rendered, then
/// [`Reconciler::poll`] once per animation frame with the current scroll offset and
/// the current position of a sentinel item that stays rendered. The clock is the
/// caller's `now_ms`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reconciler {
    timeout_ms: u64,
    baseline: Option<Baseline>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(DEFAULT_RECONCILE_TIMEOUT_MS)
    }
}

impl Reconciler {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            baseline: None,
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn is_active(&self) -> bool {
        self.baseline.is_some()
    }

    /// Begins an observation window. Restarts it if one is already running.
    pub fn start(&mut self, now_ms: u64, scroll_offset: f64, sentinel_offset: f64) {
        wtrace!(now_ms, scroll_offset, sentinel_offset, "reconciler: start");
        self.baseline = Some(Baseline {
            started_ms: now_ms,
            scroll_offset,
            sentinel_offset,
        });
    }

    /// Stops observing without further correction.
    pub fn cancel(&mut self) {
        if self.baseline.take().is_some() {
            wtrace!("reconciler: cancelled");
        }
    }

    /// Compares scroll movement against sentinel movement since the baseline.
    ///
    /// Any difference is drift introduced by layout, not by the user. It is folded
    /// into `scroll_offset_compensation` as long as there is leading space left to
    /// adjust.
    pub fn poll(
        &mut self,
        now_ms: u64,
        scroll_offset: f64,
        sentinel_offset: f64,
        state: &WindowState,
    ) -> ReconcileStep {
        let Some(baseline) = self.baseline else {
            return ReconcileStep::Idle;
        };

        if state.first_rendered_index == 0 {
            self.baseline = None;
            return ReconcileStep::Finished;
        }

        if now_ms.saturating_sub(baseline.started_ms) >= self.timeout_ms {
            self.baseline = None;
            wtrace!(now_ms, "reconciler: timed out");
            return ReconcileStep::Finished;
        }

        let delta = (scroll_offset - baseline.scroll_offset)
            - (sentinel_offset - baseline.sentinel_offset);

        if delta != 0.0 && state.scroll_offset_compensation != 0.0 {
            let corrected = WindowState {
                scroll_offset_compensation: non_negative(state.scroll_offset_compensation + delta),
                ..*state
            };
            // The correction moves the sentinel by `delta` once rendered.
            self.baseline = Some(Baseline {
                started_ms: baseline.started_ms,
                scroll_offset,
                sentinel_offset: sentinel_offset + delta,
            });
            wtrace!(
                delta,
                compensation = corrected.scroll_offset_compensation,
                "reconciler: corrected drift"
            );
            return ReconcileStep::Corrected {
                state: corrected,
                delta,
            };
        }

        ReconcileStep::Watching
    }
}
