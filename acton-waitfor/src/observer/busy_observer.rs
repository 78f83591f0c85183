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
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::common::{Count, Projection, Store, Subscription};
use crate::message::WaitError;
use crate::observer::UpdateFeed;

/// Contains the `Attached` type-state marker and teardown for live observers.
pub mod attached;
/// Contains the `Idle` type-state marker, construction and attaching.
pub mod idle;

use attached::Attached;

/// A consumer's view of whether work is in flight under each of a set of keys.
///
/// The observer owns a [`Projection`] with one slot per distinct key, in the
/// order the keys were first given. While [`Attached`] it keeps every slot in
/// step with the store and reports each change on its [`UpdateFeed`].
///
/// Detaching happens exactly once: explicitly through
/// `Observer::<Attached>::detach`, or when an attached
/// observer is dropped.
pub struct Observer<ObserverState> {
    pub(crate) store: Store<Count>,
    pub(crate) keys: Vec<String>,
    pub(crate) projection: Arc<RwLock<Projection>>,
    /// `Some` only while attached.
    pub(crate) subscriptions: Option<Vec<Subscription<Count>>>,
    _observer_state: PhantomData<ObserverState>,
}

/// Creates an observer for `keys` on `store` and attaches it immediately.
///
/// # Errors
///
/// Returns [`WaitError::InvalidArgument`] when `keys` is empty or contains an
/// empty key.
pub fn observe<K: AsRef<str>>(
    store: &Store<Count>,
    keys: impl IntoIterator<Item = K>,
) -> Result<(Observer<Attached>, UpdateFeed), WaitError> {
    Observer::new(store, keys)?.attach()
}

impl<ObserverState> Observer<ObserverState> {
    pub(crate) fn from_parts(
        store: Store<Count>,
        keys: Vec<String>,
        projection: Arc<RwLock<Projection>>,
        subscriptions: Option<Vec<Subscription<Count>>>,
    ) -> Self {
        Self {
            store,
            keys,
            projection,
            subscriptions,
            _observer_state: PhantomData,
        }
    }

    /// A copy of the current projection.
    #[must_use]
    pub fn projection(&self) -> Projection {
        self.projection.read().clone()
    }

    /// The busy signal in `key`'s slot, or `None` if the observer does not watch `key`.
    #[must_use]
    pub fn is_busy(&self, key: &str) -> Option<bool> {
        self.projection.read().get(key).copied()
    }

    /// The distinct keys this observer watches, in order.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// The store this observer reads from.
    #[must_use]
    pub const fn store(&self) -> &Store<Count> {
        &self.store
    }
}

impl<ObserverState> Drop for Observer<ObserverState> {
    fn drop(&mut self) {
        if let Some(subscriptions) = self.subscriptions.take() {
            attached::teardown(&self.store, &self.keys, subscriptions);
        }
    }
}

impl<ObserverState> fmt::Debug for Observer<ObserverState> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("state", &std::any::type_name::<ObserverState>())
            .field("projection", &*self.projection.read())
            .field("attached", &self.subscriptions.is_some())
            .finish()
    }
}
