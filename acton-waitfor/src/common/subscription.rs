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
use std::sync::Weak;

use tracing::trace;

use crate::common::store::StoreInner;
use crate::common::ListenerId;

/// A single listener registration, returned by [`Store::subscribe`](super::Store::subscribe).
///
/// Releasing a subscription removes exactly the registration it was created
/// for, even when the same listener is registered several times under the
/// same key. It is released when dropped or by calling
/// [`unsubscribe`](Self::unsubscribe); either way it can only happen once.
/// Call [`forget`](Self::forget) to keep the listener registered for the life
/// of the store.
#[must_use = "dropping a Subscription unregisters its listener immediately"]
pub struct Subscription<T> {
    store: Option<Weak<StoreInner<T>>>,
    key: String,
    id: ListenerId,
}

impl<T> Subscription<T> {
    pub(crate) const fn new(store: Weak<StoreInner<T>>, key: String, id: ListenerId) -> Self {
        Self {
            store: Some(store),
            key,
            id,
        }
    }

    /// The key this subscription listens on.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Unregisters the listener now.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Leaves the listener registered after this handle is gone.
    ///
    /// It can still be removed with [`Store::unsubscribe`](super::Store::unsubscribe).
    pub fn forget(mut self) {
        self.store = None;
    }

    fn release(&mut self) {
        let Some(store) = self.store.take().and_then(|weak| weak.upgrade()) else {
            return;
        };
        if store.remove_registration(&self.key, self.id) {
            trace!(key = %self.key, id = self.id, "Subscription released");
        }
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("id", &self.id)
            .field("active", &self.store.is_some())
            .finish()
    }
}
