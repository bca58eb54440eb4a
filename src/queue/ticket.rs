//! Work tickets and their single-assignment completion cells.
//!
//! A [`Ticket`] pairs an item with a [`Resolver`]; the submitter keeps the
//! matching [`Completion`]. `Resolver::resolve` and `Resolver::fail` consume
//! the resolver, so an outcome can only be written once.

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::{Arc, Condvar, Mutex, OnceLock, PoisonError};

use tokio::sync::Notify;

use crate::error::ProcessError;
use crate::model::TicketId;

/// Outcome stored in a completion cell.
pub type Outcome<U> = std::result::Result<U, ProcessError>;

struct Slot<U> {
    outcome: OnceLock<Outcome<U>>,
    // async waiters
    notify: Notify,
    // blocking waiters
    lock: Mutex<()>,
    ready: Condvar,
}

impl<U> Slot<U> {
    fn new() -> Self {
        Self {
            outcome: OnceLock::new(),
            notify: Notify::new(),
            lock: Mutex::new(()),
            ready: Condvar::new(),
        }
    }

    fn set(&self, outcome: Outcome<U>) {
        if self.outcome.set(outcome).is_err() {
            return;
        }
        // Taking the lock orders the store before any blocked waiter re-checks.
        drop(self.lock.lock().unwrap_or_else(PoisonError::into_inner));
        self.ready.notify_all();
        self.notify.notify_waiters();
    }
}

/// Write side of a completion cell. Held by the lane worker.
pub(crate) struct Resolver<U> {
    slot: Option<Arc<Slot<U>>>,
}

impl<U> Resolver<U> {
    pub(crate) fn resolve(mut self, value: U) {
        if let Some(slot) = self.slot.take() {
            slot.set(Ok(value));
        }
    }

    pub(crate) fn fail(mut self, error: ProcessError) {
        if let Some(slot) = self.slot.take() {
            slot.set(Err(error));
        }
    }
}

impl<U> Drop for Resolver<U> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            slot.set(Err(ProcessError::Abandoned));
        }
    }
}

/// One submitted item and the resolver for its completion.
pub(crate) struct Ticket<T, U> {
    pub(crate) id: TicketId,
    pub(crate) item: T,
    pub(crate) resolver: Resolver<U>,
}

impl<T, U> Ticket<T, U> {
    /// Create a ticket and the completion handle that observes it.
    pub(crate) fn new(item: T) -> (Self, Completion<U>) {
        let id = TicketId::random();
        let slot = Arc::new(Slot::new());
        let ticket = Self {
            id,
            item,
            resolver: Resolver {
                slot: Some(Arc::clone(&slot)),
            },
        };
        (ticket, Completion { id, slot })
    }
}

/// Read side of a ticket: a waitable handle for the processed result.
///
/// Clones share the same cell, and every clone observes the same outcome.
pub struct Completion<U> {
    id: TicketId,
    slot: Arc<Slot<U>>,
}

impl<U> Clone for Completion<U> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<U> std::fmt::Debug for Completion<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("id", &self.id)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

impl<U> Completion<U> {
    pub fn id(&self) -> TicketId {
        self.id
    }

    pub fn is_resolved(&self) -> bool {
        self.slot.outcome.get().is_some()
    }

    /// Borrow the outcome without waiting. `None` while still pending.
    pub fn peek(&self) -> Option<&Outcome<U>> {
        self.slot.outcome.get()
    }

    /// Wait asynchronously until the ticket is resolved.
    pub async fn resolved(&self) -> &Outcome<U> {
        loop {
            let notified = self.slot.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a concurrent resolve cannot slip between.
            notified.as_mut().enable();
            if let Some(outcome) = self.slot.outcome.get() {
                return outcome;
            }
            notified.await;
        }
    }

    /// Block the current thread until the ticket is resolved.
    ///
    /// Must not be called from inside an async task.
    pub fn resolved_blocking(&self) -> &Outcome<U> {
        let mut guard = self.slot.lock.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(outcome) = self.slot.outcome.get() {
                return outcome;
            }
            guard = self
                .slot
                .ready
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl<U: Clone> Completion<U> {
    /// Wait for the result, cloning it out of the shared cell.
    pub async fn wait(&self) -> Outcome<U> {
        self.resolved().await.clone()
    }

    /// Blocking counterpart of [`Completion::wait`].
    pub fn wait_blocking(&self) -> Outcome<U> {
        self.resolved_blocking().clone()
    }
}

impl<U> IntoFuture for Completion<U>
where
    U: Clone + Send + Sync + 'static,
{
    type Output = Outcome<U>;
    type IntoFuture = Pin<Box<dyn Future<Output = Outcome<U>> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.wait().await })
    }
}
