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

//! Type aliases and small supporting structures shared across `acton-waitfor`.

use std::sync::Arc;

use indexmap::IndexMap;

/// Number of not-yet-settled tracked operations registered under a key.
///
/// A key with no entry in the store has a count of zero.
pub type Count = usize;

/// A callback invoked with a key's new value every time the value is set.
///
/// Registration identity for [`Store::unsubscribe`](crate::common::Store::unsubscribe)
/// is the `Arc` allocation, so clone the same `Listener` to refer to it again.
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync + 'static>;

/// Insertion-ordered `key -> busy` mapping maintained by an observer.
pub type Projection = IndexMap<String, bool>;

/// Crate-internal: identifies one registration of a listener under a key.
pub(crate) type ListenerId = u64;

/// Crate-internal: one entry in a key's listener list.
pub(crate) struct Registration<T> {
    pub(crate) id: ListenerId,
    pub(crate) listener: Listener<T>,
}
