//! A headless windowing engine for very large scrollable lists.
//!
//! Only a small slice of the list is materialized. A leading spacer
//! ("scroll offset compensation") and a trailing spacer stand in for everything
//! else, so the scrollbar behaves as if the whole list were present.
//!
//! The engine works from an adaptively smoothed average item size, so item sizes
//! never need to be known up front. It tells small incremental scrolls apart from
//! large jumps, and keeps a buffer of rendered-but-offscreen items to avoid
//! remount churn. The [`Reconciler`] corrects for items whose size changes after
//! they were placed with an estimate.
//!
//! It is UI-agnostic. A host layer is expected to provide:
//! - a [`ScrollSample`] (scroll offset, viewport size and bounds)
//! - the bounds of the rendered items and of the leading spacer
//! - a way to apply a scroll offset (for [`ScrollCommander`])
//!
//! For frame scheduling and the per-list lifecycle, see the `windowing-adapter` crate.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod axis;
mod commander;
mod engine;
mod host;
mod num;
mod options;
mod reconciler;
mod state;
mod types;

#[cfg(test)]
mod tests;

pub use axis::detect_stacking_axis;
pub use commander::{CommandContext, CommandOutcome, ScrollCommander, ScrollRequest};
pub use engine::WindowEngine;
pub use host::{
    HostError, MeasurementProvider, ScrollHost, ScrollMutator, ScrollSampleProvider,
    discover_scroll_host,
};
pub use options::WindowConfig;
pub use reconciler::{DEFAULT_RECONCILE_TIMEOUT_MS, ReconcileStep, Reconciler};
pub use state::WindowState;
pub use types::{
    Axis, HostKind, ItemBounds, Lifecycle, Measurements, ScrollDirection, ScrollSample, Span,
    VirtualRange, WindowFrame,
};
