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

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters describing the work a [`Store`](super::Store) has done.
#[derive(Debug, Default)]
pub struct StoreStats {
    /// Listener invocations that returned normally.
    pub notifications_delivered: AtomicUsize,
    /// Listener invocations that panicked and were isolated.
    pub listener_panics: AtomicUsize,
    /// Values removed through `del_value` or `remove_if`.
    pub values_removed: AtomicUsize,
}

impl StoreStats {
    pub(crate) fn record_listener_panic(&self) {
        self.listener_panics.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the number of listener invocations that returned normally.
    #[must_use]
    pub fn notifications_delivered(&self) -> usize {
        self.notifications_delivered.load(Ordering::Relaxed)
    }

    /// Get the number of listener panics that were caught.
    #[must_use]
    pub fn listener_panics(&self) -> usize {
        self.listener_panics.load(Ordering::Relaxed)
    }

    /// Get the number of values removed from the store.
    #[must_use]
    pub fn values_removed(&self) -> usize {
        self.values_removed.load(Ordering::Relaxed)
    }
}
