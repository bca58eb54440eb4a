//! Ticket span state recording, checked with a capturing subscriber layer.

use std::fmt;
use std::sync::{Arc, Mutex};

use pcq::model::{LaneKind, TicketId};
use pcq::queue::DualLaneQueue;
use pcq::telemetry::lane::{record_state_transition, start_ticket_span};
use tracing::field::{Field, Visit};
use tracing::span::{Id, Record};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Collects every value recorded into a `ticket.state` span field.
#[derive(Clone, Default)]
struct StateCapture {
    states: Arc<Mutex<Vec<String>>>,
}

impl StateCapture {
    fn states(&self) -> Vec<String> {
        self.states.lock().unwrap().clone()
    }
}

struct StateVisitor<'a>(&'a mut Vec<String>);

impl Visit for StateVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "ticket.state" {
            self.0.push(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "ticket.state" {
            self.0.push(format!("{value:?}"));
        }
    }
}

impl<S: Subscriber> Layer<S> for StateCapture {
    fn on_record(&self, _id: &Id, values: &Record<'_>, _ctx: Context<'_, S>) {
        let mut states = self.states.lock().unwrap();
        values.record(&mut StateVisitor(&mut states));
    }
}

#[test]
fn transitions_update_the_ticket_state_field() {
    let capture = StateCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let span = start_ticket_span(LaneKind::Console, &TicketId::random());
        record_state_transition(&span, "queued", "processing");
        record_state_transition(&span, "processing", "resolved");
    });

    assert_eq!(capture.states(), ["processing", "resolved"]);
}

#[test]
fn lane_worker_records_final_state_of_each_ticket() {
    // Worker threads only see the global dispatcher. This is the only test
    // in this binary that installs one.
    let capture = StateCapture::default();
    tracing::subscriber::set_global_default(tracing_subscriber::registry().with(capture.clone()))
        .expect("no other global subscriber in this test binary");

    let queue = DualLaneQueue::new(|n: u32| {
        if n == 0 {
            anyhow::bail!("zero is not accepted");
        }
        Ok(n)
    })
    .unwrap();

    let ok = queue.submit_to_file_lane(7);
    let bad = queue.submit_to_file_lane(0);
    assert_eq!(ok.wait_blocking().unwrap(), 7);
    assert!(bad.wait_blocking().is_err());
    queue.shutdown().unwrap();

    assert_eq!(
        capture.states(),
        ["processing", "resolved", "processing", "failed"]
    );
}
