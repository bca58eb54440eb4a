//! Ticket span helpers.
//!
//! Every ticket a lane worker picks up runs inside a `lane.ticket` span so
//! the processing function's own events nest under it. The span's
//! `ticket.state` field holds the latest state the ticket moved to.

use tracing::Span;

use crate::model::{LaneKind, TicketId};

/// Start a span for one ticket being processed on `lane`.
pub fn start_ticket_span(lane: LaneKind, ticket: &TicketId) -> Span {
    tracing::debug_span!(
        "lane.ticket",
        "lane.name" = lane.as_str(),
        "ticket.id" = %ticket,
        "ticket.state" = tracing::field::Empty,
    )
}

/// Record a ticket state transition on `span` and as a debug event inside it.
///
/// Only the state names are recorded; processing errors stay with the
/// completion handle.
pub fn record_state_transition(span: &Span, from: &str, to: &str) {
    span.record("ticket.state", to);
    span.in_scope(|| {
        tracing::debug!(from = from, to = to, "state_transition");
    });
}
