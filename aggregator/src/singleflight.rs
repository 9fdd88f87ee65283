use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

type Registry<T> = Arc<Mutex<HashMap<String, watch::Receiver<Option<T>>>>>;

/// Coalesces concurrent work per key: the first caller for a key becomes the
/// leader and spawns the work on the runtime, later callers attach to the
/// same flight and all observe the identical result.
///
/// The work runs as a spawned task, so a caller abandoning its request does
/// not cancel the flight for the other waiters. The registry entry is
/// removed by a drop guard when the flight terminates, whether it produced a
/// value, failed, or panicked.
pub struct SingleFlight<T> {
    inflight: Registry<T>,
}

impl<T> Clone for SingleFlight<T> {
    fn clone(&self) -> Self {
        SingleFlight {
            inflight: Arc::clone(&self.inflight),
        }
    }
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SingleFlight<T> {
    pub fn new() -> Self {
        SingleFlight {
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of flights currently registered.
    pub fn len(&self) -> usize {
        self.inflight.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inflight.lock().is_empty()
    }
}

impl<T: Clone + Send + Sync + 'static> SingleFlight<T> {
    /// Join the flight for `key`, creating it with `work` if none exists.
    ///
    /// Returns `None` only if the flight task terminated without publishing
    /// a result (it panicked); callers map that to their own error type.
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let mut rx = {
            let mut inflight = self.inflight.lock();
            if let Some(rx) = inflight.get(key) {
                rx.clone()
            } else {
                let (tx, rx) = watch::channel(None);
                inflight.insert(key.to_string(), rx.clone());

                let guard = RemoveOnDrop {
                    registry: Arc::clone(&self.inflight),
                    key: key.to_string(),
                };
                let fut = work();
                tokio::spawn(async move {
                    let _guard = guard;
                    let result = fut.await;
                    let _ = tx.send(Some(result));
                });
                rx
            }
        };

        loop {
            if let Some(result) = rx.borrow_and_update().as_ref() {
                return Some(result.clone());
            }
            if rx.changed().await.is_err() {
                // Sender dropped without a value: the flight task died.
                return rx.borrow().clone();
            }
        }
    }
}

struct RemoveOnDrop<T> {
    registry: Registry<T>,
    key: String,
}

impl<T> Drop for RemoveOnDrop<T> {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.key);
    }
}
