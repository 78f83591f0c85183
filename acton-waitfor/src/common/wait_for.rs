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

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;

use crate::common::{Count, Store, WaitForConfig};
use crate::message::WaitError;
use crate::observer::{Attached, Idle, Observer, UpdateFeed};
use crate::tracker::{Tracked, Tracker, Work};

/// Entry point that pairs one [`Store`] with a [`Tracker`] over a typed key space.
///
/// `K` is anything that reads as a string, typically an enum naming every
/// loading flag of an application, so call sites cannot misspell a key.
///
/// ```rust,ignore
/// use acton_waitfor::prelude::*;
///
/// #[derive(Clone, Copy)]
/// enum Loading { List, Table }
///
/// impl AsRef<str> for Loading {
///     fn as_ref(&self) -> &str {
///         match self {
///             Loading::List => "list-loading",
///             Loading::Table => "table-loading",
///         }
///     }
/// }
///
/// let wait_for: WaitFor<Loading> = WaitFor::new();
/// let (observer, mut updates) = wait_for.watch([Loading::List, Loading::Table])?;
/// let rows = wait_for.track_future(Loading::List, fetch_rows());
/// ```
pub struct WaitFor<K = String> {
    store: Store<Count>,
    tracker: Tracker,
    _keys: PhantomData<fn(K)>,
}

impl<K> Clone for WaitFor<K> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            tracker: self.tracker.clone(),
            _keys: PhantomData,
        }
    }
}

impl<K> fmt::Debug for WaitFor<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitFor")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl<K: AsRef<str>> Default for WaitFor<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: AsRef<str>> WaitFor<K> {
    /// Creates a new, empty store configured from the global config.
    #[must_use]
    pub fn new() -> Self {
        Self::from_store(Store::new())
    }

    /// Creates a new, empty store with an explicit configuration.
    #[must_use]
    pub fn with_config(config: WaitForConfig) -> Self {
        Self::from_store(Store::with_config(config))
    }

    /// Wraps an existing store, sharing its counts with every other user of it.
    #[must_use]
    pub fn from_store(store: Store<Count>) -> Self {
        let tracker = Tracker::new(&store);
        Self {
            store,
            tracker,
            _keys: PhantomData,
        }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &Store<Count> {
        &self.store
    }

    /// The tracker counting work in the store.
    #[must_use]
    pub const fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Invokes `work` and counts it under `key` while it is in flight.
    ///
    /// See [`Tracker::track`].
    pub fn track<T, F, W>(&self, key: K, work: W) -> Tracked<T>
    where
        W: FnOnce() -> Work<T, F>,
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.tracker.track(key.as_ref(), work)
    }

    /// Invokes fallible `work` and counts it under `key` while it is in flight.
    ///
    /// # Errors
    ///
    /// Returns the error from `work` unchanged. See [`Tracker::try_track`].
    pub fn try_track<T, F, E, W>(&self, key: K, work: W) -> Result<Tracked<T>, E>
    where
        W: FnOnce() -> Result<Work<T, F>, E>,
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.tracker.try_track(key.as_ref(), work)
    }

    /// Counts `future` under `key` until it settles.
    pub fn track_future<T, F>(&self, key: K, future: F) -> Tracked<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.tracker.track_future(key.as_ref(), future)
    }

    /// Computes the initial projection for `keys` without subscribing.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::InvalidArgument`] when `keys` is empty.
    pub fn observer(&self, keys: impl IntoIterator<Item = K>) -> Result<Observer<Idle>, WaitError> {
        Observer::new(&self.store, keys)
    }

    /// Observes `keys` and returns the attached observer with its update feed.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::InvalidArgument`] when `keys` is empty.
    pub fn watch(
        &self,
        keys: impl IntoIterator<Item = K>,
    ) -> Result<(Observer<Attached>, UpdateFeed), WaitError> {
        self.observer(keys)?.attach()
    }

    /// Whether work is in flight under `key`.
    #[must_use]
    pub fn is_busy(&self, key: K) -> bool {
        self.store.is_busy(key.as_ref())
    }

    /// How many tracked operations are in flight under `key`.
    #[must_use]
    pub fn count(&self, key: K) -> Count {
        self.store.count(key.as_ref())
    }
}
