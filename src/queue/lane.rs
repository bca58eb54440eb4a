//! A single ordered lane: an unbounded channel drained by one dedicated worker.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use opentelemetry::KeyValue;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{Error, ProcessError, Result};
use crate::model::LaneKind;
use crate::telemetry::lane::{record_state_transition, start_ticket_span};
use crate::telemetry::metrics;

use super::ticket::{Completion, Ticket};

/// The processing function shared by both lanes.
pub type ProcessFn<T, U> = dyn Fn(T) -> anyhow::Result<U> + Send + Sync;

/// One lane of the queue. Owns the sending half of its channel and the
/// worker thread that drains it.
pub struct Lane<T, U> {
    kind: LaneKind,
    tx: mpsc::UnboundedSender<Ticket<T, U>>,
    pending: Arc<AtomicUsize>,
    worker: JoinHandle<()>,
}

impl<T, U> Lane<T, U>
where
    T: Send + 'static,
    U: Send + Sync + 'static,
{
    /// Start the lane's worker thread.
    pub(crate) fn spawn(kind: LaneKind, process: Arc<ProcessFn<T, U>>) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));

        let worker = {
            let pending = Arc::clone(&pending);
            thread::Builder::new()
                .name(format!("pcq-{kind}-lane"))
                .spawn(move || run_worker(kind, rx, pending, process))?
        };

        debug!(lane = %kind, "lane started");
        Ok(Self {
            kind,
            tx,
            pending,
            worker,
        })
    }

    /// Enqueue `item` and return its completion handle. Never blocks.
    pub fn submit(&self, item: T) -> Completion<U> {
        let (ticket, completion) = Ticket::new(item);
        let id = ticket.id;

        // Count before sending so the worker's decrement can't run first.
        self.pending.fetch_add(1, Ordering::AcqRel);
        if let Err(mpsc::error::SendError(ticket)) = self.tx.send(ticket) {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            ticket.resolver.fail(ProcessError::Closed(self.kind));
            return completion;
        }

        metrics::lane_submitted().add(1, &[KeyValue::new("lane", self.kind.as_str())]);
        debug!(lane = %self.kind, ticket = %id, "ticket queued");
        completion
    }

    /// Tickets submitted but not yet picked up by the worker.
    ///
    /// Zero once the worker has gone away: whatever was still queued has
    /// been dropped and its handles failed with `Abandoned`.
    pub fn pending(&self) -> usize {
        if self.tx.is_closed() {
            return 0;
        }
        self.pending.load(Ordering::Acquire)
    }

    /// Close the channel and wait for the worker to drain it.
    pub(crate) fn close(self) -> Result<()> {
        let Lane {
            kind, tx, worker, ..
        } = self;
        drop(tx);
        worker.join().map_err(|_| Error::WorkerPanicked(kind))?;
        debug!(lane = %kind, "lane stopped");
        Ok(())
    }
}

fn run_worker<T, U>(
    kind: LaneKind,
    mut rx: mpsc::UnboundedReceiver<Ticket<T, U>>,
    pending: Arc<AtomicUsize>,
    process: Arc<ProcessFn<T, U>>,
) {
    let processed = metrics::lane_processed();
    let duration = metrics::lane_process_duration_ms();
    let lane_label = KeyValue::new("lane", kind.as_str());

    while let Some(ticket) = rx.blocking_recv() {
        pending.fetch_sub(1, Ordering::AcqRel);

        let Ticket { id, item, resolver } = ticket;
        let span = start_ticket_span(kind, &id);
        let _entered = span.enter();
        record_state_transition(&span, "queued", "processing");

        let start = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| process(item)));
        duration.record(
            start.elapsed().as_secs_f64() * 1000.0,
            std::slice::from_ref(&lane_label),
        );

        let result = match outcome {
            Ok(Ok(value)) => {
                resolver.resolve(value);
                "resolved"
            }
            Ok(Err(err)) => {
                resolver.fail(ProcessError::from(err));
                "failed"
            }
            Err(payload) => {
                resolver.fail(ProcessError::Panicked(panic_message(payload.as_ref())));
                "failed"
            }
        };
        record_state_transition(&span, "processing", result);
        processed.add(1, &[lane_label.clone(), KeyValue::new("result", result)]);
    }

    debug!(lane = %kind, "lane channel closed, worker exiting");
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
