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

use tracing::{debug, instrument};

use crate::common::{Count, Store, Subscription};
use crate::observer::Observer;

/// Type-state marker for an [`Observer`] subscribed to its keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attached;

impl Observer<Attached> {
    /// Stops observing and returns the keys reaped from the store.
    ///
    /// Every listener is unregistered first, so no later store change reaches
    /// this observer. Then each watched key whose count is exactly zero is
    /// removed from the store. Keys with work still in flight are left for the
    /// work's own decrement and a later observer to clean up.
    pub fn detach(mut self) -> Vec<String> {
        self.subscriptions
            .take()
            .map(|subscriptions| teardown(&self.store, &self.keys, subscriptions))
            .unwrap_or_default()
    }
}

/// Unsubscribes, then reaps zero-count keys unless reaping is disabled.
#[instrument(skip(store, subscriptions), level = "debug")]
pub(crate) fn teardown(
    store: &Store<Count>,
    keys: &[String],
    subscriptions: Vec<Subscription<Count>>,
) -> Vec<String> {
    drop(subscriptions);

    if !store.config().observer.reap_idle_keys {
        return Vec::new();
    }
    let reaped: Vec<String> = keys
        .iter()
        .filter(|key| store.remove_if(key, |count| *count == 0).is_some())
        .cloned()
        .collect();
    debug!(?reaped, "Observer detached");
    reaped
}
