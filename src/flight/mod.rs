//! Request Coalescing Module
//!
//! Collapses concurrent lookups of the same key into a single computation.

use std::collections::hash_map::{Entry, HashMap};
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::{CacheError, Result};

type Waiters<T> = Vec<oneshot::Sender<T>>;
type Calls<T> = Arc<Mutex<HashMap<String, Waiters<T>>>>;

// == Flight ==
/// Ensures at most one computation per key is running at any time.
///
/// The first caller for a key starts the computation; callers arriving while
/// it runs wait for it and receive a clone of the same result. The record is
/// dropped in the same critical section that hands the result out, so the
/// next call after completion always computes again. Results are not cached.
///
/// Computations run on their own tokio task: dropping every caller does not
/// cancel a computation that has started.
pub struct Flight<T> {
    calls: Calls<T>,
}

impl<T> Flight<T>
where
    T: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // == Work ==
    /// Runs `fut` for `key` unless a computation for `key` is already in
    /// flight, in which case its result is awaited instead.
    ///
    /// Fails with [`CacheError::Internal`] only if the computation panicked
    /// or was torn down with the runtime.
    pub async fn work<F>(&self, key: &str, fut: F) -> Result<T>
    where
        F: Future<Output = T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();

        let leader = {
            let mut calls = self.calls.lock();
            match calls.entry(key.to_string()) {
                Entry::Occupied(mut waiters) => {
                    waiters.get_mut().push(tx);
                    false
                }
                Entry::Vacant(slot) => {
                    slot.insert(vec![tx]);
                    true
                }
            }
        };

        if leader {
            let guard = CallGuard {
                calls: self.calls.clone(),
                key: key.to_string(),
                completed: false,
            };
            tokio::spawn(async move {
                let value = fut.await;
                guard.complete(value);
            });
        } else {
            debug!("Joining in-flight computation for key {}", key);
        }

        rx.await.map_err(|_| {
            CacheError::Internal(format!("computation for key {} did not complete", key))
        })
    }

    /// Number of keys currently being computed.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

impl<T> Default for Flight<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the in-flight record of one key while its computation runs.
///
/// Dropping the guard without completing removes the record, which drops all
/// senders and wakes the waiters with an error.
struct CallGuard<T> {
    calls: Calls<T>,
    key: String,
    completed: bool,
}

impl<T: Clone> CallGuard<T> {
    fn complete(mut self, value: T) {
        let waiters = self.calls.lock().remove(&self.key).unwrap_or_default();
        self.completed = true;
        for waiter in waiters {
            // Receiver may have been dropped by a caller that gave up
            let _ = waiter.send(value.clone());
        }
    }
}

impl<T> Drop for CallGuard<T> {
    fn drop(&mut self) {
        // A completed record may already belong to a newer computation
        if !self.completed {
            self.calls.lock().remove(&self.key);
        }
    }
}
