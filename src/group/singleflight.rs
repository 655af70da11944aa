//! Request Deduplication
//!
//! Collapses concurrent calls for the same key into one execution.

use std::collections::HashMap;
use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::watch;

type Slot<T, E> = watch::Receiver<Option<Result<T, E>>>;
type Calls<T, E> = Mutex<HashMap<String, Slot<T, E>>>;

// == Flight ==
/// Tracks in-flight computations by key.
///
/// The first caller for a key runs the computation on its own task; callers
/// arriving while it runs wait for and share its result. The record is
/// dropped as soon as the computation finishes, so later calls run afresh.
pub struct Flight<T, E> {
    calls: Calls<T, E>,
}

impl<T, E> Default for Flight<T, E> {
    fn default() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }
}

impl<T, E> Flight<T, E>
where
    T: Clone + Send + Sync,
    E: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self::default()
    }

    // == Run ==
    /// Runs `f` unless a call for `key` is already in flight, in which case
    /// the in-flight result is awaited and returned instead.
    ///
    /// There is no timeout. If the running caller is dropped before finishing,
    /// one of the waiters takes over and runs its own `f`.
    pub async fn run<F, Fut>(&self, key: &str, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let tx = loop {
            let rx = {
                let mut calls = self.calls.lock();
                match calls.get(key) {
                    Some(rx) => rx.clone(),
                    None => {
                        let (tx, rx) = watch::channel(None);
                        calls.insert(key.to_string(), rx);
                        break tx;
                    }
                }
            };

            if let Some(result) = wait(rx).await {
                return result;
            }
        };

        let _in_flight = InFlight {
            calls: &self.calls,
            key,
        };
        let result = f().await;
        tx.send_replace(Some(result.clone()));
        result
    }

    /// Number of keys currently being computed.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

/// Waits for the running call to publish; `None` if it was abandoned.
async fn wait<T: Clone, E: Clone>(mut rx: Slot<T, E>) -> Option<Result<T, E>> {
    let published = rx.wait_for(Option::is_some).await.ok()?;
    published.clone()
}

/// Removes the call record when the running caller finishes or is dropped.
struct InFlight<'a, T, E> {
    calls: &'a Calls<T, E>,
    key: &'a str,
}

impl<T, E> Drop for InFlight<'_, T, E> {
    fn drop(&mut self) {
        self.calls.lock().remove(self.key);
    }
}
