//! Dual-lane producer/consumer queue.
//!
//! Two independent FIFO lanes ("file" and "console") share one processing
//! function. Each lane has its own worker thread, so a slow item in one lane
//! never holds up the other. Submission returns a [`Completion`] right away;
//! the worker resolves it once the item has been processed.

mod lane;
mod ticket;

pub use lane::{Lane, ProcessFn};
pub use ticket::{Completion, Outcome};

use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::model::LaneKind;

/// Owns both lanes and the processing function they share.
pub struct DualLaneQueue<T, U> {
    file: Lane<T, U>,
    console: Lane<T, U>,
}

impl<T, U> DualLaneQueue<T, U>
where
    T: Send + 'static,
    U: Send + Sync + 'static,
{
    /// Start both lane workers around `process`.
    ///
    /// Returns as soon as the workers are running. Fails only if a worker
    /// thread cannot be spawned.
    pub fn new<F>(process: F) -> Result<Self>
    where
        F: Fn(T) -> anyhow::Result<U> + Send + Sync + 'static,
    {
        let process: Arc<ProcessFn<T, U>> = Arc::new(process);
        let file = Lane::spawn(LaneKind::File, Arc::clone(&process))?;
        let console = Lane::spawn(LaneKind::Console, process)?;
        info!("queue started with file and console lanes");
        Ok(Self { file, console })
    }

    pub fn submit_to_file_lane(&self, item: T) -> Completion<U> {
        self.file.submit(item)
    }

    pub fn submit_to_console_lane(&self, item: T) -> Completion<U> {
        self.console.submit(item)
    }

    /// Submit to the lane named by `lane`.
    pub fn submit(&self, lane: LaneKind, item: T) -> Completion<U> {
        self.lane(lane).submit(item)
    }

    pub fn lane(&self, lane: LaneKind) -> &Lane<T, U> {
        match lane {
            LaneKind::File => &self.file,
            LaneKind::Console => &self.console,
        }
    }

    /// Items waiting in `lane` that its worker has not picked up yet.
    pub fn pending(&self, lane: LaneKind) -> usize {
        self.lane(lane).pending()
    }

    /// Stop accepting work, let both workers drain their backlog, and join them.
    ///
    /// Both lanes are always closed; if either worker panicked, the first
    /// failure is returned after the other lane has been joined.
    pub fn shutdown(self) -> Result<()> {
        let DualLaneQueue { file, console } = self;
        let file = file.close();
        let console = console.close();
        info!("queue shut down");
        file.and(console)
    }
}
