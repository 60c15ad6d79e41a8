/// Identifies one scheduled frame callback.
///
/// The host schedules its animation-frame callback with the token and hands it back
/// when the callback fires. Tokens of cancelled or superseded tasks are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskToken(u64);

impl TaskToken {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// A single-flight, cancellable frame task.
///
/// At most one callback is pending at a time: scheduling while one is pending is
/// coalesced into it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameTask {
    next_id: u64,
    pending: Option<TaskToken>,
}

impl FrameTask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<TaskToken> {
        self.pending
    }

    /// Returns a fresh token for the host to schedule, or `None` when a callback is
    /// already in flight.
    pub fn schedule(&mut self) -> Option<TaskToken> {
        if self.pending.is_some() {
            return None;
        }
        self.next_id = self.next_id.wrapping_add(1);
        let token = TaskToken(self.next_id);
        self.pending = Some(token);
        Some(token)
    }

    /// Marks the callback for `token` as running.
    ///
    /// Returns `false` for stale tokens; the callback must then do nothing.
    pub fn begin(&mut self, token: TaskToken) -> bool {
        if self.pending != Some(token) {
            return false;
        }
        self.pending = None;
        true
    }

    /// Cancels the pending callback and returns its token.
    pub fn cancel(&mut self) -> Option<TaskToken> {
        self.pending.take()
    }
}
