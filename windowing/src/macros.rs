#[cfg(feature = "tracing")]
macro_rules! wtrace {
    ($($tt:tt)*) => {
        tracing::trace!(target: "windowing", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! wtrace {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! wdebug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "windowing", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! wdebug {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! wwarn {
    ($($tt:tt)*) => {
        tracing::warn!(target: "windowing", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! wwarn {
    ($($tt:tt)*) => {};
}

/// Checks an internal invariant.
///
/// Fatal in debug builds. In release builds the violation is logged and the
/// expression evaluates to `false` so the caller can clamp.
macro_rules! invariant {
    ($cond:expr, $msg:literal) => {{
        let ok = $cond;
        if !ok {
            wwarn!("invariant violated: {}", $msg);
            debug_assert!(ok, $msg);
        }
        ok
    }};
}
