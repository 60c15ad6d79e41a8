use alloc::vec::Vec;

use windowing::{
    Axis, CommandContext, CommandOutcome, HostError, HostKind, ItemBounds, Lifecycle,
    Measurements, MeasurementProvider, ReconcileStep, Reconciler, ScrollCommander,
    ScrollDirection, ScrollHost, ScrollMutator, ScrollRequest, ScrollSample, Span, WindowConfig,
    WindowEngine, WindowFrame, WindowState, detect_stacking_axis,
};

use crate::{FrameTask, TaskToken};

pub const DEFAULT_IS_SCROLLING_RESET_DELAY_MS: u64 = 150;

/// Adapter-level timing options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerOptions {
    /// Length of the observation window after new items enter at the front.
    pub reconcile_timeout_ms: u64,
    /// Quiet time after the last scroll event before `is_scrolling` clears.
    pub is_scrolling_reset_delay_ms: u64,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            reconcile_timeout_ms: windowing::DEFAULT_RECONCILE_TIMEOUT_MS,
            is_scrolling_reset_delay_ms: DEFAULT_IS_SCROLLING_RESET_DELAY_MS,
        }
    }
}

impl ControllerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reconcile_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.reconcile_timeout_ms = timeout_ms;
        self
    }

    pub fn with_is_scrolling_reset_delay_ms(mut self, delay_ms: u64) -> Self {
        self.is_scrolling_reset_delay_ms = delay_ms;
        self
    }
}

/// What the host should do after a frame callback.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameOutcome {
    /// Re-render with this frame. `None` means the window did not change.
    pub render: Option<WindowFrame>,
    /// Schedule a reconcile callback for the next animation frame with this token.
    pub reconcile: Option<TaskToken>,
    /// Schedule another recompute callback with this token. Set when the host could
    /// not be measured before the first window was computed.
    pub frame: Option<TaskToken>,
}

/// Callbacks cancelled by [`ListController::dispose`].
///
/// The host should cancel whatever it scheduled with these tokens. Callbacks that
/// fire anyway are ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Disposal {
    pub frame: Option<TaskToken>,
    pub reconcile: Option<TaskToken>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Fallback {
    /// Fewer than two items; virtualization engages once the list grows.
    TooShort,
    /// Items do not stack along a single axis.
    UnsupportedLayout,
}

/// Drives one virtualized list through its lifecycle.
///
/// Holds no UI objects. Adapters drive it by calling:
/// - `bootstrap` once the list is mounted
/// - `on_scroll` / `on_resize` / `set_list_length` when UI events occur
/// - `on_frame` / `on_reconcile_frame` from the animation-frame callbacks scheduled
///   with the returned tokens
/// - `tick(now_ms)` each frame/timer tick for `is_scrolling` debouncing
/// - `dispose` on teardown
///
/// Scroll and resize notifications are coalesced into a single pending recompute,
/// which samples the host when it runs. A new scroll event cancels any in-flight
/// reconciliation.
#[derive(Clone, Debug)]
pub struct ListController {
    engine: WindowEngine,
    options: ControllerOptions,
    lifecycle: Lifecycle,
    fallback: Option<Fallback>,
    axis: Option<Axis>,
    state: WindowState,
    list_len: usize,

    host: Option<HostKind>,
    viewport_size: Option<f64>,
    force_recalc: bool,

    recompute: FrameTask,
    reconcile: FrameTask,
    reconciler: Reconciler,
    sentinel_index: usize,
    commander: ScrollCommander,

    is_scrolling: bool,
    last_scroll_event_ms: Option<u64>,
    scroll_direction: Option<ScrollDirection>,

    bounds: Vec<ItemBounds>,
    spans: Vec<Span>,
}

impl ListController {
    pub fn new(config: WindowConfig, options: ControllerOptions, list_len: usize) -> Self {
        Self {
            engine: WindowEngine::new(config),
            options,
            lifecycle: Lifecycle::Uninitialized,
            fallback: None,
            axis: None,
            state: WindowState::default(),
            list_len,
            host: None,
            viewport_size: None,
            force_recalc: false,
            recompute: FrameTask::new(),
            reconcile: FrameTask::new(),
            reconciler: Reconciler::new(options.reconcile_timeout_ms),
            sentinel_index: 0,
            commander: ScrollCommander::new(),
            is_scrolling: false,
            last_scroll_event_ms: None,
            scroll_direction: None,
            bounds: Vec::new(),
            spans: Vec::new(),
        }
    }

    pub fn config(&self) -> &WindowConfig {
        self.engine.config()
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn axis(&self) -> Option<Axis> {
        self.axis
    }

    pub fn state(&self) -> &WindowState {
        &self.state
    }

    pub fn list_len(&self) -> usize {
        self.list_len
    }

    /// The render instruction for the current state.
    pub fn frame(&self) -> WindowFrame {
        self.engine.frame(&self.state, self.list_len)
    }

    /// `true` once scroll requests are dispatched instead of queued: the window has
    /// been computed from real measurements, or every item is rendered.
    pub fn is_initialized(&self) -> bool {
        match self.lifecycle {
            Lifecycle::Windowed => self.state.is_measured(),
            Lifecycle::Unvirtualized => true,
            _ => false,
        }
    }

    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll_direction
    }

    pub fn is_reconciling(&self) -> bool {
        self.reconciler.is_active()
    }

    pub fn pending_request(&self) -> Option<ScrollRequest> {
        self.commander.pending()
    }

    /// Starts the list: renders the first two items so the stacking axis can be
    /// detected on the first frame.
    ///
    /// Returns the token of the first frame callback. Lists with fewer than two
    /// items go straight to [`Lifecycle::Unvirtualized`]; render [`Self::frame`].
    pub fn bootstrap(&mut self) -> Option<TaskToken> {
        if self.lifecycle != Lifecycle::Uninitialized {
            return None;
        }
        self.enter_bootstrap()
    }

    /// Call this when the host reports a scroll event.
    ///
    /// Returns a token when a new recompute callback must be scheduled. `None`
    /// means one is already in flight (or the list is not windowed).
    pub fn on_scroll(&mut self, now_ms: u64) -> Option<TaskToken> {
        if !self.lifecycle.is_active() {
            return None;
        }
        self.last_scroll_event_ms = Some(now_ms);
        self.is_scrolling = true;
        self.cancel_reconciliation();
        self.schedule_recompute()
    }

    /// Call this when the host viewport was resized.
    pub fn on_resize(&mut self) -> Option<TaskToken> {
        if !self.lifecycle.is_active() {
            return None;
        }
        self.force_recalc = true;
        self.schedule_recompute()
    }

    /// Updates the source list length.
    ///
    /// The current window is clamped into the new bounds and fully recomputed on
    /// the next frame.
    pub fn set_list_length(&mut self, list_len: usize) -> Option<TaskToken> {
        if self.lifecycle == Lifecycle::Disposed || list_len == self.list_len {
            return None;
        }
        wdebug!(from = self.list_len, to = list_len, "list length changed");
        self.list_len = list_len;

        match self.lifecycle {
            Lifecycle::Uninitialized | Lifecycle::Disposed => None,
            Lifecycle::Bootstrapping if list_len < 2 => {
                self.recompute.cancel();
                self.fall_back(Fallback::TooShort);
                None
            }
            Lifecycle::Bootstrapping => {
                self.state = self.engine.initial_window(list_len);
                self.recompute.schedule()
            }
            Lifecycle::Unvirtualized
                if self.fallback == Some(Fallback::TooShort) && list_len >= 2 =>
            {
                self.fallback = None;
                self.enter_bootstrap()
            }
            Lifecycle::Unvirtualized => {
                self.state = self.engine.unvirtualized_window(&self.state, list_len);
                None
            }
            Lifecycle::Windowed if list_len < 2 => {
                self.recompute.cancel();
                self.fall_back(Fallback::TooShort);
                None
            }
            Lifecycle::Windowed => {
                self.state = clamp_to_length(self.state, list_len);
                self.cancel_reconciliation();
                self.force_recalc = true;
                self.recompute.schedule()
            }
        }
    }

    /// Runs a recompute callback.
    ///
    /// Stale tokens and callbacks after [`Self::dispose`] do nothing. Failed host
    /// calls are treated as "no new information": the window is kept and the frame
    /// is consumed. Before the first window is computed the outcome carries a
    /// `frame` token to retry with.
    pub fn on_frame<H: ScrollHost>(
        &mut self,
        token: TaskToken,
        now_ms: u64,
        host: &mut H,
    ) -> FrameOutcome {
        if !self.recompute.begin(token) {
            wtrace!(token = token.id(), "stale frame callback ignored");
            return FrameOutcome::default();
        }

        match self.lifecycle {
            Lifecycle::Bootstrapping => self.bootstrap_frame(now_ms, host),
            Lifecycle::Windowed => match self.axis {
                Some(axis) => self.window_frame(axis, now_ms, host),
                None => FrameOutcome::default(),
            },
            _ => FrameOutcome::default(),
        }
    }

    /// Runs a reconcile callback.
    ///
    /// Polls the sentinel item and applies drift corrections. Keep scheduling with
    /// the returned `reconcile` token until it is `None`.
    pub fn on_reconcile_frame<H: ScrollHost>(
        &mut self,
        token: TaskToken,
        now_ms: u64,
        host: &mut H,
    ) -> FrameOutcome {
        if !self.reconcile.begin(token) {
            return FrameOutcome::default();
        }
        if self.lifecycle != Lifecycle::Windowed || !self.reconciler.is_active() {
            return FrameOutcome::default();
        }
        let Some(axis) = self.axis else {
            return FrameOutcome::default();
        };

        let sample = match host.scroll_sample(axis) {
            Ok(sample) => sample,
            Err(err) => {
                host_call_failed("scroll sample", err);
                self.reconciler.cancel();
                return FrameOutcome::default();
            }
        };
        self.bounds.clear();
        if let Err(err) = host.measure_items(&mut self.bounds) {
            host_call_failed("items", err);
            self.reconciler.cancel();
            return FrameOutcome::default();
        }

        let sentinel = self
            .sentinel_index
            .checked_sub(self.state.first_rendered_index)
            .and_then(|pos| self.bounds.get(pos))
            .map(|bounds| bounds.span(axis).start);
        let Some(sentinel_offset) = sentinel else {
            wdebug!(
                sentinel = self.sentinel_index,
                "sentinel no longer rendered; reconciliation stopped"
            );
            self.reconciler.cancel();
            return FrameOutcome::default();
        };

        match self
            .reconciler
            .poll(now_ms, sample.scroll_offset, sentinel_offset, &self.state)
        {
            ReconcileStep::Idle | ReconcileStep::Finished => FrameOutcome::default(),
            ReconcileStep::Watching => FrameOutcome {
                reconcile: self.reconcile.schedule(),
                ..FrameOutcome::default()
            },
            ReconcileStep::Corrected { state, .. } => {
                self.state = state;
                FrameOutcome {
                    render: Some(self.frame()),
                    reconcile: self.reconcile.schedule(),
                    frame: None,
                }
            }
        }
    }

    /// Advances time-based state (`is_scrolling` debouncing).
    pub fn tick(&mut self, now_ms: u64) {
        if !self.is_scrolling {
            return;
        }
        let Some(last) = self.last_scroll_event_ms else {
            return;
        };
        if now_ms.saturating_sub(last) >= self.options.is_scrolling_reset_delay_ms {
            self.is_scrolling = false;
            self.scroll_direction = None;
            self.last_scroll_event_ms = None;
        }
    }

    /// Scrolls `index` into view.
    ///
    /// Before the first window is computed the request is queued and replayed once
    /// after the first successful update. When every item is rendered there is no
    /// size estimate, so this returns [`CommandOutcome::Unresolved`].
    pub fn scroll_to_index(
        &mut self,
        index: usize,
        host: &mut impl ScrollMutator,
    ) -> Result<CommandOutcome, HostError> {
        self.request(ScrollRequest::Index(index), host)
    }

    pub fn scroll_to_offset(
        &mut self,
        offset: f64,
        host: &mut impl ScrollMutator,
    ) -> Result<CommandOutcome, HostError> {
        self.request(ScrollRequest::Offset(offset), host)
    }

    /// Tears the list down and cancels all pending callbacks.
    ///
    /// Every later call is a no-op.
    pub fn dispose(&mut self) -> Disposal {
        let disposal = Disposal {
            frame: self.recompute.cancel(),
            reconcile: self.reconcile.cancel(),
        };
        self.reconciler.cancel();
        self.commander.clear();
        self.is_scrolling = false;
        self.set_lifecycle(Lifecycle::Disposed);
        disposal
    }

    fn request(
        &mut self,
        request: ScrollRequest,
        host: &mut impl ScrollMutator,
    ) -> Result<CommandOutcome, HostError> {
        match self.lifecycle {
            Lifecycle::Disposed => return Err(HostError::Detached),
            Lifecycle::Unvirtualized => {
                // A newer request supersedes anything queued before the fallback.
                self.commander.clear();
                return dispatch_unvirtualized(request, host);
            }
            _ => {}
        }
        let is_initialized = self.is_initialized();
        let cx = CommandContext {
            engine: &self.engine,
            state: &self.state,
            list_len: self.list_len,
            viewport_size: self.viewport_size.unwrap_or(0.0),
            is_initialized,
        };
        self.commander.request(&cx, request, host)
    }

    fn enter_bootstrap(&mut self) -> Option<TaskToken> {
        if self.list_len < 2 {
            self.fall_back(Fallback::TooShort);
            return None;
        }
        self.state = self.engine.initial_window(self.list_len);
        self.set_lifecycle(Lifecycle::Bootstrapping);
        self.recompute.schedule()
    }

    fn fall_back(&mut self, reason: Fallback) {
        wdebug!(?reason, list_len = self.list_len, "rendering every item");
        self.fallback = Some(reason);
        self.cancel_reconciliation();
        self.state = self.engine.unvirtualized_window(&self.state, self.list_len);
        self.set_lifecycle(Lifecycle::Unvirtualized);
    }

    fn set_lifecycle(&mut self, next: Lifecycle) {
        if self.lifecycle != next {
            wdebug!(from = ?self.lifecycle, to = ?next, "lifecycle transition");
            self.lifecycle = next;
        }
    }

    fn schedule_recompute(&mut self) -> Option<TaskToken> {
        match self.lifecycle {
            Lifecycle::Bootstrapping | Lifecycle::Windowed => self.recompute.schedule(),
            _ => None,
        }
    }

    fn cancel_reconciliation(&mut self) {
        self.reconciler.cancel();
        self.reconcile.cancel();
    }

    fn measure(&mut self, host: &impl MeasurementProvider) -> Result<ItemBounds, HostError> {
        self.bounds.clear();
        host.measure_items(&mut self.bounds)?;
        host.leading_spacer()
    }

    fn bootstrap_frame<H: ScrollHost>(&mut self, now_ms: u64, host: &mut H) -> FrameOutcome {
        let spacer = match self.measure(&*host) {
            Ok(spacer) => spacer,
            Err(err) => {
                host_call_failed("items", err);
                return self.retry_until_measured();
            }
        };

        let Some(axis) = detect_stacking_axis(&self.bounds) else {
            let reason = if self.bounds.len() < 2 {
                Fallback::TooShort
            } else {
                Fallback::UnsupportedLayout
            };
            self.fall_back(reason);
            if let Some(request) = self.commander.take() {
                match dispatch_unvirtualized(request, host) {
                    Ok(outcome) => {
                        wdebug!(?outcome, "queued scroll request replayed");
                    }
                    Err(err) => host_call_failed("queued scroll request", err),
                }
            }
            return FrameOutcome {
                render: Some(self.frame()),
                ..FrameOutcome::default()
            };
        };
        wdebug!(?axis, "stacking axis detected");
        self.axis = Some(axis);
        self.set_lifecycle(Lifecycle::Windowed);
        self.recompute_window(axis, spacer, now_ms, host)
    }

    fn window_frame<H: ScrollHost>(&mut self, axis: Axis, now_ms: u64, host: &mut H) -> FrameOutcome {
        match self.measure(&*host) {
            Ok(spacer) => self.recompute_window(axis, spacer, now_ms, host),
            Err(err) => {
                host_call_failed("items", err);
                self.retry_until_measured()
            }
        }
    }

    fn recompute_window<H: ScrollHost>(
        &mut self,
        axis: Axis,
        spacer: ItemBounds,
        now_ms: u64,
        host: &mut H,
    ) -> FrameOutcome {
        let sample = match host.scroll_sample(axis) {
            Ok(sample) => sample,
            Err(err) => {
                host_call_failed("scroll sample", err);
                return self.retry_until_measured();
            }
        };
        self.observe_host(&sample);

        self.spans.clear();
        self.spans
            .extend(self.bounds.iter().map(|bounds| bounds.span(axis)));

        let was_initialized = self.is_initialized();
        let previous = self.state;
        let next = self.engine.update_window(
            &previous,
            &Measurements::new(spacer.span(axis), &self.spans),
            &sample,
            self.list_len,
            self.force_recalc,
        );
        self.force_recalc = false;
        self.state = next;

        if self.is_scrolling {
            if let Some(direction) = previous.direction_to(sample.scroll_offset) {
                self.scroll_direction = Some(direction);
            }
        }

        let mut outcome = FrameOutcome::default();
        if next != previous {
            outcome.render = Some(self.frame());
            self.cancel_reconciliation();
        }
        if next.first_rendered_index < previous.first_rendered_index
            && next.scroll_offset_compensation > 0.0
        {
            outcome.reconcile = self.arm_reconciler(now_ms, &sample, &previous);
        }

        if !was_initialized && self.is_initialized() {
            self.replay_pending(sample.viewport_size, host);
        }
        outcome
    }

    /// Until the first window is computed there is no scroll event to trigger the
    /// next frame, so a failed host call asks for another one.
    fn retry_until_measured(&mut self) -> FrameOutcome {
        if self.state.is_measured() {
            return FrameOutcome::default();
        }
        FrameOutcome {
            frame: self.recompute.schedule(),
            ..FrameOutcome::default()
        }
    }

    /// Watches the first item that was on screen before new items entered in front
    /// of it.
    fn arm_reconciler(
        &mut self,
        now_ms: u64,
        sample: &ScrollSample,
        previous: &WindowState,
    ) -> Option<TaskToken> {
        let sentinel = previous.first_on_screen_index();
        if sentinel > self.state.last_rendered_index {
            return None;
        }
        let sentinel_offset = self.spans.get(previous.offscreen_items_count)?.start;
        self.sentinel_index = sentinel;
        self.reconciler
            .start(now_ms, sample.scroll_offset, sentinel_offset);
        self.reconcile.cancel();
        self.reconcile.schedule()
    }

    fn replay_pending(&mut self, viewport_size: f64, host: &mut impl ScrollMutator) {
        let cx = CommandContext {
            engine: &self.engine,
            state: &self.state,
            list_len: self.list_len,
            viewport_size,
            is_initialized: true,
        };
        match self.commander.replay(&cx, host) {
            Ok(Some(outcome)) => {
                wdebug!(?outcome, "queued scroll request replayed");
            }
            Ok(None) => {}
            Err(err) => host_call_failed("queued scroll request", err),
        }
    }

    fn observe_host(&mut self, sample: &ScrollSample) {
        if let Some(previous) = self.host {
            if previous != sample.host {
                wdebug!(?previous, next = ?sample.host, "scroll host changed");
                self.force_recalc = true;
                self.cancel_reconciliation();
            }
        }
        self.host = Some(sample.host);

        if self.viewport_size.is_some_and(|size| size != sample.viewport_size) {
            self.force_recalc = true;
        }
        self.viewport_size = Some(sample.viewport_size);
    }
}

/// Routes a request for a list that renders every item. Offsets go straight to the
/// host; indices cannot be resolved without a size estimate.
fn dispatch_unvirtualized(
    request: ScrollRequest,
    host: &mut impl ScrollMutator,
) -> Result<CommandOutcome, HostError> {
    match request {
        ScrollRequest::Offset(offset) => {
            host.scroll_to(offset)?;
            Ok(CommandOutcome::Scrolled(offset))
        }
        ScrollRequest::Index(_) => Ok(CommandOutcome::Unresolved),
    }
}

fn clamp_to_length(state: WindowState, list_len: usize) -> WindowState {
    let Some(last_index) = list_len.checked_sub(1) else {
        return WindowState::default();
    };
    let last = state.last_rendered_index.min(last_index);
    let first = state.first_rendered_index.min(last);
    WindowState {
        first_rendered_index: first,
        last_rendered_index: last,
        offscreen_items_count: state.offscreen_items_count.min(last - first),
        ..state
    }
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn host_call_failed(what: &'static str, err: HostError) {
    wwarn!(what, %err, "host call failed; keeping the previous window");
}
