//! Auto-shutdown timer.
//!
//! The deadline is fixed when the timer starts, so one timer can bound
//! several phases of a run (the confirmation prompt, then processing).

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct ShutdownTimer {
    deadline: Option<Instant>,
}

impl ShutdownTimer {
    /// Start counting down `secs` seconds from now. Zero disables the timer.
    pub fn start(secs: u64) -> Self {
        Self {
            deadline: (secs > 0).then(|| Instant::now() + Duration::from_secs(secs)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.deadline.is_some()
    }

    /// Resolves when the deadline passes. Never resolves if disabled.
    pub async fn elapsed(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }

    /// Run `fut` until it finishes or the deadline passes, whichever is first.
    ///
    /// Returns `None` if the deadline won.
    pub async fn guard<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            out = fut => Some(out),
            _ = self.elapsed() => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn deadline_cuts_off_a_slow_phase() {
        let start = Instant::now();
        let timer = ShutdownTimer::start(5);

        let out = timer
            .guard(tokio::time::sleep(Duration::from_secs(60)))
            .await;
        assert!(out.is_none());
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(5));
        assert!(elapsed < Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_spans_consecutive_phases() {
        let start = Instant::now();
        let timer = ShutdownTimer::start(10);

        // First phase finishes in time and uses up 7 of the 10 seconds.
        let first = timer
            .guard(async {
                tokio::time::sleep(Duration::from_secs(7)).await;
                "confirmed"
            })
            .await;
        assert_eq!(first, Some("confirmed"));

        // Second phase only gets the remaining 3.
        let second = timer.guard(std::future::pending::<()>()).await;
        assert!(second.is_none());
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(10));
        assert!(elapsed < Duration::from_secs(11));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_disables_the_timer() {
        let timer = ShutdownTimer::start(0);
        assert!(!timer.is_enabled());

        let out = timer
            .guard(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                1
            })
            .await;
        assert_eq!(out, Some(1));
    }
}
