use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

type InFlight<T> = Shared<BoxFuture<'static, T>>;

/// Collapses overlapping calls of one operation into a single execution.
///
/// While a call is running, later callers await the same future and get a
/// clone of its output. The slot is emptied as soon as that future finishes,
/// so the next call after completion starts fresh.
pub struct SingleFlight<T> {
    slot: Arc<Mutex<Option<InFlight<T>>>>,
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `start()` unless a run is already in flight, then await the result.
    ///
    /// `start` is only invoked when no run is in flight.
    pub async fn run<F, Fut>(&self, start: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let flight = {
            let mut slot = lock(&*self.slot);
            match slot.as_ref() {
                Some(flight) => flight.clone(),
                None => {
                    let work = start();
                    let release = Arc::clone(&self.slot);
                    let flight = async move {
                        let output = work.await;
                        lock(&*release).take();
                        output
                    }
                    .boxed()
                    .shared();
                    *slot = Some(flight.clone());
                    flight
                }
            }
        };
        flight.await
    }

    pub fn is_in_flight(&self) -> bool {
        lock(&*self.slot).is_some()
    }
}

fn lock<T>(slot: &Mutex<T>) -> MutexGuard<'_, T> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
