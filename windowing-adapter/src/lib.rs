//! Frame-driven host glue for the `windowing` crate.
//!
//! The `windowing` crate is UI-agnostic and focuses on the windowing math and state.
//! This crate provides the per-list lifecycle most hosts need on top of it:
//!
//! - Single-flight, cancellable frame tasks ([`FrameTask`], [`TaskToken`])
//! - A [`ListController`] that coalesces scroll/resize notifications, runs the
//!   engine at frame time, schedules reconciliation and queues early scroll commands
//!
//! This crate is framework-agnostic: hosts implement [`windowing::ScrollHost`] and
//! schedule callbacks with the returned tokens.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod task;


pub use controller::{
    ControllerOptions, DEFAULT_IS_SCROLLING_RESET_DELAY_MS, Disposal, FrameOutcome, ListController,
};
pub use task::{FrameTask, TaskToken};
