//! Timer abstraction for the retry loop.

use std::future::Future;
use std::time::Duration;

/// Suspends the agent between reconnect attempts.
pub trait Scheduler {
    fn sleep(&mut self, delay: Duration) -> impl Future<Output = ()>;
}

/// Scheduler backed by the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    async fn sleep(&mut self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}
