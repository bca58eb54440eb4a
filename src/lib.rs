//! # pcq
//!
//! Dual-lane producer/consumer work queue.
//!
//! [`queue::DualLaneQueue`] runs two independent FIFO lanes over one
//! processing function and hands every submitter a [`queue::Completion`]
//! for its item. The remaining modules supply the pieces the `pcq` binary
//! wires around it: CSV input, file/console handlers, pacing, the confirmation
//! prompt, the shutdown timer, configuration and telemetry.

pub mod config;
pub mod error;
pub mod handler;
pub mod input;
pub mod model;
pub mod pacing;
pub mod prompt;
pub mod queue;
pub mod shutdown;
pub mod telemetry;
