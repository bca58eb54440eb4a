//! Error types for pcq.
//!
//! [`Error`] covers the crate's own fallible operations (configuration,
//! input loading, worker lifecycle). [`ProcessError`] is what a completion
//! handle carries when its item could not be processed.

use std::sync::Arc;

use thiserror::Error;

use crate::model::LaneKind;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("input line {line}: {reason}")]
    Input { line: usize, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} lane worker panicked")]
    WorkerPanicked(LaneKind),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure delivered through a completion handle.
///
/// Cloneable so every waiter on the same ticket observes the same outcome.
#[derive(Debug, Clone, Error)]
pub enum ProcessError {
    /// The processing function returned an error.
    #[error("processing failed: {0:#}")]
    Failed(Arc<anyhow::Error>),

    /// The processing function panicked. The worker caught it and moved on.
    #[error("processing panicked: {0}")]
    Panicked(String),

    /// The ticket was dropped before anything resolved it.
    #[error("ticket dropped before it was resolved")]
    Abandoned,

    /// The lane's worker is gone, so nothing will ever pick the item up.
    #[error("{0} lane is closed")]
    Closed(LaneKind),
}

impl ProcessError {
    /// The error returned by the processing function, if that is what failed.
    pub fn source_error(&self) -> Option<&anyhow::Error> {
        match self {
            ProcessError::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for ProcessError {
    fn from(err: anyhow::Error) -> Self {
        ProcessError::Failed(Arc::new(err))
    }
}
