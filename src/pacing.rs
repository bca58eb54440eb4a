//! Submission pacing: at most `n` records per one-second window.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::input::Record;
use crate::model::QueueItem;
use crate::queue::{Completion, DualLaneQueue};

const WINDOW: Duration = Duration::from_secs(1);

/// Fixed-window limiter for the producer side.
#[derive(Debug)]
pub struct Pacer {
    max_per_window: u32,
    used: u32,
    window_start: Instant,
}

impl Pacer {
    /// Allow `max` submissions per second. Zero means unlimited.
    pub fn per_second(max: u32) -> Self {
        Self {
            max_per_window: max,
            used: 0,
            window_start: Instant::now(),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.max_per_window == 0
    }

    /// Wait until one more submission is allowed, then count it.
    pub async fn tick(&mut self) {
        if self.is_unlimited() {
            return;
        }

        if self.used >= self.max_per_window {
            let elapsed = self.window_start.elapsed();
            if elapsed < WINDOW {
                let wait = WINDOW - elapsed;
                debug!(wait_ms = wait.as_millis() as u64, "rate limit reached, pausing");
                tokio::time::sleep(wait).await;
            }
            self.used = 0;
            self.window_start = Instant::now();
        }
        self.used += 1;
    }
}

/// Feed `records` into `queue` at the pacer's rate.
///
/// Every record uses up quota, including unknown ones that are skipped
/// rather than submitted.
pub async fn submit_paced<U>(
    queue: &DualLaneQueue<QueueItem, U>,
    records: Vec<Record>,
    pacer: &mut Pacer,
) -> Vec<Completion<U>>
where
    U: Send + Sync + 'static,
{
    let mut completions = Vec::with_capacity(records.len());
    for record in records {
        pacer.tick().await;
        if let Some(item) = record.into_item() {
            completions.push(queue.submit(item.lane(), item));
        }
    }
    completions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn pauses_once_quota_is_used() {
        let start = Instant::now();
        let mut pacer = Pacer::per_second(3);

        for _ in 0..3 {
            pacer.tick().await;
        }
        assert!(start.elapsed() < Duration::from_millis(10));

        pacer.tick().await;
        assert!(start.elapsed() >= WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn seven_ticks_at_three_per_second_span_two_windows() {
        let start = Instant::now();
        let mut pacer = Pacer::per_second(3);
        for _ in 0..7 {
            pacer.tick().await;
        }
        let elapsed = start.elapsed();
        assert!(elapsed >= 2 * WINDOW);
        assert!(elapsed < 3 * WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_records_use_up_quota() {
        let queue = DualLaneQueue::new(|item: QueueItem| Ok(item.lane())).unwrap();
        let unknown = |line| Record::Unknown {
            line,
            kind: "printer".to_string(),
        };
        let records = vec![
            unknown(1),
            unknown(2),
            unknown(3),
            Record::Item(QueueItem::console("late")),
        ];

        let start = Instant::now();
        let mut pacer = Pacer::per_second(3);
        let completions = submit_paced(&queue, records, &mut pacer).await;

        assert!(start.elapsed() >= WINDOW);
        assert_eq!(completions.len(), 1);
        assert!(completions[0].wait().await.is_ok());
        queue.shutdown().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn zero_is_unlimited() {
        let start = Instant::now();
        let mut pacer = Pacer::per_second(0);
        for _ in 0..1000 {
            pacer.tick().await;
        }
        assert!(pacer.is_unlimited());
        assert!(start.elapsed() < Duration::from_millis(10));
    }
}
