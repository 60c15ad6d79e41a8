use core::cmp;

use crate::{HostError, ScrollMutator, WindowEngine, WindowState};

/// A programmatic scroll request.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollRequest {
    /// Scroll the item into view.
    Index(usize),
    /// Scroll the host to an absolute offset along the stacking axis.
    Offset(f64),
}

/// What a scroll request resulted in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CommandOutcome {
    /// The engine is not initialized yet; the request replays after the first update.
    Queued,
    /// The host was scrolled to this offset.
    Scrolled(f64),
    /// The item is already visible; nothing was issued.
    AlreadyVisible,
    /// There is no size estimate to turn the index into an offset (every item is
    /// rendered). The host should scroll the item's own element into view.
    Unresolved,
}

/// Everything the commander needs to know about the current window.
#[derive(Clone, Copy, Debug)]
pub struct CommandContext<'a> {
    pub engine: &'a WindowEngine,
    pub state: &'a WindowState,
    pub list_len: usize,
    pub viewport_size: f64,
    pub is_initialized: bool,
}

/// Translates "scroll to index/offset" into host scroll offsets.
///
/// Requests made before initialization are held in a single slot (the latest wins)
/// and replayed exactly once by [`ScrollCommander::replay`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollCommander {
    pending: Option<ScrollRequest>,
}

impl ScrollCommander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<ScrollRequest> {
        self.pending
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Removes the queued request without dispatching it.
    pub fn take(&mut self) -> Option<ScrollRequest> {
        self.pending.take()
    }

    pub fn scroll_to_index(
        &mut self,
        cx: &CommandContext<'_>,
        index: usize,
        host: &mut impl ScrollMutator,
    ) -> Result<CommandOutcome, HostError> {
        self.request(cx, ScrollRequest::Index(index), host)
    }

    pub fn scroll_to_offset(
        &mut self,
        cx: &CommandContext<'_>,
        offset: f64,
        host: &mut impl ScrollMutator,
    ) -> Result<CommandOutcome, HostError> {
        self.request(cx, ScrollRequest::Offset(offset), host)
    }

    pub fn request(
        &mut self,
        cx: &CommandContext<'_>,
        request: ScrollRequest,
        host: &mut impl ScrollMutator,
    ) -> Result<CommandOutcome, HostError> {
        if !cx.is_initialized {
            wdebug!(?request, "scroll request queued until initialized");
            self.pending = Some(request);
            return Ok(CommandOutcome::Queued);
        }
        Self::dispatch(cx, request, host)
    }

    /// Replays the queued request, if any. The slot is emptied even if the host
    /// rejects the scroll.
    ///
    /// Returns `Ok(None)` when nothing was queued or the context is still not
    /// initialized.
    pub fn replay(
        &mut self,
        cx: &CommandContext<'_>,
        host: &mut impl ScrollMutator,
    ) -> Result<Option<CommandOutcome>, HostError> {
        if !cx.is_initialized {
            return Ok(None);
        }
        let Some(request) = self.pending.take() else {
            return Ok(None);
        };
        wdebug!(?request, "replaying queued scroll request");
        Self::dispatch(cx, request, host).map(Some)
    }

    fn dispatch(
        cx: &CommandContext<'_>,
        request: ScrollRequest,
        host: &mut impl ScrollMutator,
    ) -> Result<CommandOutcome, HostError> {
        let target = match request {
            ScrollRequest::Index(index) => {
                let index = cmp::min(index, cx.list_len.saturating_sub(1));
                cx.engine
                    .resolve_scroll_to_index(cx.state, index, cx.viewport_size)
            }
            ScrollRequest::Offset(offset) => Some(offset),
        };

        match target {
            Some(offset) => {
                host.scroll_to(offset)?;
                Ok(CommandOutcome::Scrolled(offset))
            }
            None => Ok(CommandOutcome::AlreadyVisible),
        }
    }
}
