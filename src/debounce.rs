//! Coalesces bursts of change notifications.
//!
//! Each submission for a key cancels the one still waiting for that key and starts a
//! new quiet window. Only the last submission of a burst runs; the earlier ones resolve
//! to [`Cancelled`].

use crate::config::GeneratorConfig;
use crate::error::Cancelled;
use ahash::AHashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct PendingTask {
    generation: u64,
    handle: JoinHandle<()>,
}

type PendingMap<K> = Arc<Mutex<AHashMap<K, PendingTask>>>;

fn lock<K>(pending: &PendingMap<K>) -> MutexGuard<'_, AHashMap<K, PendingTask>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The eventual result of a debounced submission.
#[must_use = "a pending submission does nothing unless awaited or dropped on purpose"]
pub struct Pending<R> {
    receiver: oneshot::Receiver<R>,
}

impl<R> Pending<R> {
    /// Waits for the submission to run. Fails when a later submission replaced it.
    pub async fn wait(self) -> Result<R, Cancelled> {
        self.receiver.await.map_err(|_| Cancelled)
    }
}

/// Delays work per key until no new work for the key arrived for `delay`.
///
/// Must be used from within a tokio runtime.
pub struct Debouncer<K> {
    delay: Duration,
    pending: PendingMap<K>,
    generation: AtomicU64,
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(AHashMap::new())),
            generation: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.debounce_delay())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `task` for `key`, replacing whatever was waiting for it.
    pub fn submit<F, Fut, R>(&self, key: K, task: F) -> Pending<R>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let delay = self.delay;
        let pending = Arc::clone(&self.pending);
        let task_key = key.clone();

        // The task deregisters itself under the same lock, so it has to be registered
        // before it can possibly wake up.
        let mut map = lock(&self.pending);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut map = lock(&pending);
                match map.get(&task_key) {
                    Some(current) if current.generation == generation => {
                        map.remove(&task_key);
                    }
                    _ => return,
                }
            }
            // The receiver may be gone; the work still counts as done.
            let _ = sender.send(task().await);
        });
        if let Some(previous) = map.insert(key, PendingTask { generation, handle }) {
            tracing::debug!("Superseding debounced task #{}", previous.generation);
            previous.handle.abort();
        }
        Pending { receiver }
    }

    /// Cancels the task waiting for `key`. Returns whether there was one.
    pub fn cancel(&self, key: &K) -> bool {
        match lock(&self.pending).remove(key) {
            Some(task) => {
                task.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Number of keys with a task still waiting.
    pub fn pending_len(&self) -> usize {
        lock(&self.pending).len()
    }
}

impl<K> Drop for Debouncer<K> {
    fn drop(&mut self) {
        for (_, task) in lock(&self.pending).drain() {
            task.handle.abort();
        }
    }
}
