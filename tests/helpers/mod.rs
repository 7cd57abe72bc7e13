//! Shared fetch doubles for cache integration tests.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub type Fetch<T> = Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<T>> + Send>;

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Counts how many fetches were actually started.
#[derive(Clone, Default)]
pub struct FetchProbe {
    calls: Arc<AtomicUsize>,
}

impl FetchProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// A fetch that resolves to `value` after `delay`.
    pub fn resolves<T: Send + 'static>(&self, value: T, delay: Duration) -> Fetch<T> {
        let calls = Arc::clone(&self.calls);
        Box::new(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(delay).await;
                Ok(value)
            }
            .boxed()
        })
    }

    /// A fetch that fails with `message` after `delay`.
    pub fn rejects<T: Send + 'static>(&self, message: &'static str, delay: Duration) -> Fetch<T> {
        let calls = Arc::clone(&self.calls);
        Box::new(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(delay).await;
                Err(anyhow::anyhow!(message))
            }
            .boxed()
        })
    }
}
