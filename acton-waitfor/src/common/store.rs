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
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::ReentrantMutex;
use tracing::{error, instrument, trace, warn};

use crate::common::config::{WaitForConfig, CONFIG};
use crate::common::{Count, Listener, ListenerId, Registration, StoreStats, Subscription};
use crate::message::WaitError;

/// A keyed value store that synchronously notifies per-key listeners on every write.
///
/// `Store` is a cheap handle: clones share the same values, listeners and
/// statistics. Build one explicitly and pass it to every
/// [`Tracker`](crate::tracker::Tracker) and [`Observer`](crate::observer::Observer)
/// that should share state; there is no process-wide instance.
///
/// # Ordering
///
/// Every mutation and the notification pass it triggers run under one
/// store-wide reentrant write gate. Mutations are therefore totally ordered and
/// listeners observe values in the order they were written. A listener may
/// write to the store from inside its own callback. Reads never take the gate.
///
/// Listeners for a key fire in registration order. Nothing is guaranteed about
/// the relative order of notifications for different keys written from
/// different threads.
pub struct Store<T = Count> {
    inner: Arc<StoreInner<T>>,
}

/// Crate-internal: state shared by every clone of a [`Store`].
pub(crate) struct StoreInner<T> {
    values: DashMap<String, T>,
    listeners: DashMap<String, Vec<Registration<T>>>,
    write_gate: ReentrantMutex<()>,
    next_listener_id: AtomicU64,
    stats: StoreStats,
    config: WaitForConfig,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("value_count", &self.inner.values.len())
            .field("listened_keys", &self.inner.listeners.len())
            .field("stats", &self.inner.stats)
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StoreInner<T> {
    /// Removes the single registration `id` under `key`. Returns whether it was present.
    pub(crate) fn remove_registration(&self, key: &str, id: ListenerId) -> bool {
        let removed = match self.listeners.get_mut(key) {
            Some(mut registrations) => {
                let before = registrations.len();
                registrations.retain(|registration| registration.id != id);
                before != registrations.len()
            }
            None => false,
        };
        self.listeners.remove_if(key, |_, registrations| registrations.is_empty());
        removed
    }
}

impl<T: Clone + Send + Sync + 'static> Store<T> {
    /// Creates an empty store configured from the global [`CONFIG`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CONFIG.clone())
    }

    /// Creates an empty store with an explicit configuration.
    #[must_use]
    pub fn with_config(config: WaitForConfig) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                values: DashMap::new(),
                listeners: DashMap::new(),
                write_gate: ReentrantMutex::new(()),
                next_listener_id: AtomicU64::new(0),
                stats: StoreStats::default(),
                config,
            }),
        }
    }

    /// Stores `value` under `key` and notifies every listener registered for `key`.
    ///
    /// Listeners are called synchronously, in registration order, with a
    /// snapshot of the listener list taken before the first call. Listeners
    /// added or removed while the pass runs only affect later writes.
    pub fn set_value(&self, key: &str, value: T) {
        let _gate = self.inner.write_gate.lock();
        self.inner.values.insert(key.to_owned(), value.clone());
        self.notify(key, &value);
    }

    /// Returns the value stored under `key`, or `default` when there is none.
    #[must_use]
    pub fn get_value(&self, key: &str, default: T) -> T {
        self.inner
            .values
            .get(key)
            .map_or(default, |entry| entry.value().clone())
    }

    /// Removes the value stored under `key` without notifying anyone.
    ///
    /// Listeners registered for `key` stay registered and fire again on the
    /// next write.
    pub fn del_value(&self, key: &str) -> Option<T> {
        let _gate = self.inner.write_gate.lock();
        let removed = self.inner.values.remove(key).map(|(_, value)| value);
        if removed.is_some() {
            self.inner.stats.values_removed.fetch_add(1, Ordering::Relaxed);
            trace!(key, "Value deleted");
        }
        removed
    }

    /// Replaces the value under `key` with `f(current)` and notifies listeners.
    ///
    /// `current` is the stored value or `default`. No other write can land
    /// between the read and the write. Returns the new value.
    pub fn update(&self, key: &str, default: T, f: impl FnOnce(T) -> T) -> T {
        let _gate = self.inner.write_gate.lock();
        let next = f(self.get_value(key, default));
        self.inner.values.insert(key.to_owned(), next.clone());
        self.notify(key, &next);
        next
    }

    /// Removes the value under `key` if `predicate` holds for it.
    ///
    /// The check and the removal happen without any other write in between.
    pub fn remove_if(&self, key: &str, predicate: impl FnOnce(&T) -> bool) -> Option<T> {
        let _gate = self.inner.write_gate.lock();
        let removed = self
            .inner
            .values
            .remove_if(key, |_, value| predicate(value))
            .map(|(_, value)| value);
        if removed.is_some() {
            self.inner.stats.values_removed.fetch_add(1, Ordering::Relaxed);
            trace!(key, "Value removed");
        }
        removed
    }

    /// Registers `listener` for `key`.
    ///
    /// Registering the same listener twice produces two independent
    /// registrations that both fire on every write. The returned
    /// [`Subscription`] releases exactly the registration made by this call.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::InvalidArgument`] when `key` is empty.
    #[instrument(skip(self, listener), level = "trace")]
    pub fn subscribe(&self, key: &str, listener: Listener<T>) -> Result<Subscription<T>, WaitError> {
        if key.is_empty() {
            return Err(WaitError::empty_key());
        }
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .entry(key.to_owned())
            .or_default()
            .push(Registration { id, listener });
        trace!(key, id, "Listener registered");
        Ok(Subscription::new(Arc::downgrade(&self.inner), key.to_owned(), id))
    }

    /// Removes every registration of `listener` under `key`.
    ///
    /// Unlike releasing a [`Subscription`], this drops all registrations that
    /// share the same `Arc`, not only one. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::InvalidArgument`] when `key` is empty.
    pub fn unsubscribe(&self, key: &str, listener: &Listener<T>) -> Result<usize, WaitError> {
        if key.is_empty() {
            return Err(WaitError::empty_key());
        }
        let removed = match self.inner.listeners.get_mut(key) {
            Some(mut registrations) => {
                let before = registrations.len();
                registrations.retain(|registration| !Arc::ptr_eq(&registration.listener, listener));
                before - registrations.len()
            }
            None => 0,
        };
        self.inner
            .listeners
            .remove_if(key, |_, registrations| registrations.is_empty());
        trace!(key, removed, "Listener unsubscribed");
        Ok(removed)
    }

    /// Number of registrations currently listening on `key`.
    #[must_use]
    pub fn listener_count(&self, key: &str) -> usize {
        self.inner
            .listeners
            .get(key)
            .map_or(0, |registrations| registrations.len())
    }

    /// Whether a value is stored under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.values.contains_key(key)
    }

    /// The keys that currently hold a value, in no particular order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .values
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Number of keys that currently hold a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.values.len()
    }

    /// Whether no key holds a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.values.is_empty()
    }

    /// Statistics for this store.
    #[must_use]
    pub fn stats(&self) -> &StoreStats {
        &self.inner.stats
    }

    /// The configuration this store was built with.
    #[must_use]
    pub fn config(&self) -> &WaitForConfig {
        &self.inner.config
    }

    /// Calls every listener registered for `key` with `value`.
    ///
    /// Must run with the write gate held. No map guard is held while a
    /// listener runs.
    fn notify(&self, key: &str, value: &T) {
        let snapshot: Vec<Listener<T>> = self
            .inner
            .listeners
            .get(key)
            .map(|registrations| {
                registrations
                    .iter()
                    .map(|registration| Arc::clone(&registration.listener))
                    .collect()
            })
            .unwrap_or_default();

        if snapshot.is_empty() {
            return;
        }
        trace!(key, count = snapshot.len(), "Notifying listeners");

        let isolate = self.inner.config.notify.isolate_listener_panics;
        for listener in snapshot {
            if isolate {
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener(value))) {
                    self.inner.stats.record_listener_panic();
                    error!(key, panic = %panic_message(payload.as_ref()), "Listener panicked during notification");
                    continue;
                }
            } else {
                listener(value);
            }
            self.inner
                .stats
                .notifications_delivered
                .fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl Store<Count> {
    /// Adds one in-flight operation under `key` and returns the new count.
    pub fn increment(&self, key: &str) -> Count {
        self.update(key, 0, |count| count + 1)
    }

    /// Removes one in-flight operation under `key` and returns the new count.
    ///
    /// Decrementing a key that is already at zero means an operation was
    /// released without being registered. Debug builds panic; release builds
    /// log the misuse and leave the count at zero.
    pub fn decrement(&self, key: &str) -> Count {
        self.update(key, 0, |count| {
            if count == 0 {
                warn!(key, "Decrement without a matching increment");
                // Never panic while already unwinding: that would abort the process.
                if !std::thread::panicking() {
                    debug_assert!(count > 0, "decrement below zero for key '{key}'");
                }
            }
            count.saturating_sub(1)
        })
    }

    /// Current in-flight count for `key`.
    #[must_use]
    pub fn count(&self, key: &str) -> Count {
        self.get_value(key, 0)
    }

    /// Whether any tracked operation under `key` is still in flight.
    #[must_use]
    pub fn is_busy(&self, key: &str) -> bool {
        self.count(key) > 0
    }
}

/// Best-effort text for a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
