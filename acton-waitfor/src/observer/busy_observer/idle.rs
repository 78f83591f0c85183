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

use std::mem;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{instrument, trace};

use crate::common::{Count, Listener, Projection, Store};
use crate::message::{BusyUpdate, WaitError};
use crate::observer::{Attached, Observer, UpdateFeed};

/// Type-state marker for an [`Observer`] that holds its initial projection
/// but has not subscribed to the store yet.
///
/// Dropping an idle observer has no effect on the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Idle;

impl Observer<Idle> {
    /// Computes the initial projection for `keys`.
    ///
    /// Each distinct key gets one slot holding `count(key) > 0`, read once,
    /// now. Repeated keys share their first slot.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::InvalidArgument`] when `keys` is empty or contains
    /// an empty key.
    pub fn new<K: AsRef<str>>(
        store: &Store<Count>,
        keys: impl IntoIterator<Item = K>,
    ) -> Result<Self, WaitError> {
        let mut projection = Projection::new();
        for key in keys {
            let key = key.as_ref();
            if key.is_empty() {
                return Err(WaitError::empty_key());
            }
            if !projection.contains_key(key) {
                projection.insert(key.to_owned(), store.is_busy(key));
            }
        }
        if projection.is_empty() {
            return Err(WaitError::InvalidArgument(
                "an observer needs at least one key".into(),
            ));
        }
        trace!(?projection, "Initial projection computed");

        let keys = projection.keys().cloned().collect();
        Ok(Self::from_parts(
            store.clone(),
            keys,
            Arc::new(RwLock::new(projection)),
            None,
        ))
    }

    /// Subscribes one listener per key and starts maintaining the projection.
    ///
    /// Each listener rewrites only its own key's slot. An update is sent on
    /// the returned feed when the slot's value flips, or on every notification
    /// when `observer.emit_unchanged` is configured.
    ///
    /// # Errors
    ///
    /// Propagates [`WaitError::InvalidArgument`] from the store. Keys were
    /// validated by [`Observer::new`], so this does not happen in practice.
    #[instrument(skip(self), fields(keys = ?self.keys), level = "debug")]
    pub fn attach(mut self) -> Result<(Observer<Attached>, UpdateFeed), WaitError> {
        let emit_unchanged = self.store.config().observer.emit_unchanged;
        let (sender, receiver) = mpsc::unbounded_channel();

        let mut subscriptions = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            let projection = Arc::clone(&self.projection);
            let sender = sender.clone();
            let slot = key.clone();
            let listener: Listener<Count> = Arc::new(move |count: &Count| {
                let busy = *count > 0;
                let previous = projection.write().insert(slot.clone(), busy);
                if emit_unchanged || previous != Some(busy) {
                    trace!(key = %slot, busy, "Projection slot updated");
                    // A dropped feed only means the consumer stopped reading.
                    let _ = sender.send(BusyUpdate::new(slot.clone(), busy));
                }
            });
            subscriptions.push(self.store.subscribe(key, listener)?);
        }

        let attached = Observer::from_parts(
            self.store.clone(),
            mem::take(&mut self.keys),
            Arc::clone(&self.projection),
            Some(subscriptions),
        );
        Ok((attached, UpdateFeed::new(receiver)))
    }
}
