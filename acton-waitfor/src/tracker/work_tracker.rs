/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::convert::Infallible;
use std::future::Future;

use tokio::runtime::Handle;
use tracing::{error, instrument, trace};

use crate::common::{Count, Store};
use crate::message::WaitError;
use crate::tracker::in_flight::InFlight;
use crate::tracker::{Tracked, Work};

/// Counts deferred work per key in a shared [`Store`].
///
/// Overlapping work under the same key is additive: the key stays busy until
/// the last of them settles, whatever order they finish in.
///
/// There is no cancellation and no timeout. Work that never settles keeps its
/// key busy for the life of the store.
///
/// ```rust,ignore
/// let store = Store::new();
/// let tracker = Tracker::new(&store);
/// let users = tracker.track_future("users", fetch_users());
/// assert!(store.is_busy("users"));
/// let users = users.await?;
/// ```
#[derive(Debug, Clone)]
pub struct Tracker {
    store: Store<Count>,
    runtime: Option<Handle>,
}

impl Tracker {
    /// Creates a tracker over `store`.
    ///
    /// Captures the current Tokio runtime when called from inside one;
    /// otherwise the runtime is looked up each time work is tracked.
    #[must_use]
    pub fn new(store: &Store<Count>) -> Self {
        Self {
            store: store.clone(),
            runtime: Handle::try_current().ok(),
        }
    }

    /// Creates a tracker that spawns deferred work on `runtime`.
    #[must_use]
    pub fn with_runtime(store: &Store<Count>, runtime: Handle) -> Self {
        Self {
            store: store.clone(),
            runtime: Some(runtime),
        }
    }

    /// The store counts are kept in.
    #[must_use]
    pub const fn store(&self) -> &Store<Count> {
        &self.store
    }

    /// Invokes `work` and counts it under `key` while it is in flight.
    ///
    /// `work` runs synchronously first. A panic from it propagates straight
    /// out of this call without touching any count. `Work::Ready` is returned
    /// as is, uncounted. `Work::Deferred` increments `key` immediately, runs
    /// the future as a task and decrements `key` exactly once when it settles.
    /// A listener that panics on that final decrement is logged and counted
    /// in [`StoreStats`](crate::common::StoreStats); it never changes what the
    /// returned [`Tracked`] yields.
    pub fn track<T, F, W>(&self, key: &str, work: W) -> Tracked<T>
    where
        W: FnOnce() -> Work<T, F>,
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        match self.try_track(key, || Ok::<_, Infallible>(work())) {
            Ok(tracked) => tracked,
            Err(never) => match never {},
        }
    }

    /// Like [`track`](Self::track) for work that can fail before it starts.
    ///
    /// # Errors
    ///
    /// Returns the error from `work` unchanged. No count is touched.
    #[instrument(skip(self, work), level = "debug")]
    pub fn try_track<T, F, E, W>(&self, key: &str, work: W) -> Result<Tracked<T>, E>
    where
        W: FnOnce() -> Result<Work<T, F>, E>,
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        Ok(match work()? {
            Work::Ready(value) => {
                trace!(key, "Work settled synchronously, count untouched");
                Tracked::ready(key, value)
            }
            Work::Deferred(future) => self.spawn(key, future),
        })
    }

    /// Counts `future` under `key` until it settles.
    pub fn track_future<T, F>(&self, key: &str, future: F) -> Tracked<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.track(key, || Work::deferred(future))
    }

    fn spawn<T, F>(&self, key: &str, future: F) -> Tracked<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            error!(key, "No Tokio runtime available, deferred work dropped uncounted");
            return Tracked::failed(key, WaitError::NoRuntime);
        };
        let in_flight = InFlight::begin(&self.store, key);
        let handle = runtime.spawn(async move {
            let _in_flight = in_flight;
            future.await
        });
        Tracked::running(key, handle)
    }
}
