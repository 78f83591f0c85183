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

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error};

use crate::common::store::panic_message;
use crate::common::{Count, Store};

/// Holds one unit of `key`'s count from creation until drop.
///
/// Dropping runs the decrement, so it happens exactly once whether the work
/// completes, panics or is dropped by a runtime shutting down.
pub(crate) struct InFlight {
    store: Store<Count>,
    key: String,
}

impl InFlight {
    pub(crate) fn begin(store: &Store<Count>, key: &str) -> Self {
        let count = store.increment(key);
        debug!(key, count, "Tracked work started");
        Self {
            store: store.clone(),
            key: key.to_owned(),
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        // Runs inside the work's task, possibly while it unwinds. A listener
        // panic here must not replace the work's own outcome.
        let store = &self.store;
        let key = self.key.as_str();
        match panic::catch_unwind(AssertUnwindSafe(|| store.decrement(key))) {
            Ok(count) => debug!(key, count, "Tracked work settled"),
            Err(payload) => {
                store.stats().record_listener_panic();
                error!(key, panic = %panic_message(payload.as_ref()), "Listener panicked while tracked work settled");
            }
        }
    }
}
