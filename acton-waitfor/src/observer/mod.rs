//! Deriving a `key -> busy` projection for one consumer.
//!
//! This module provides:
//! *   [`Observer`]: holds the projection for a fixed set of keys and keeps it
//!     current while attached to a [`Store`](crate::common::Store).
//! *   [`Idle`]: a type-state marker for an observer whose initial projection
//!     has been computed but which is not yet subscribed.
//! *   [`Attached`]: a type-state marker for a subscribed observer.
//! *   [`UpdateFeed`]: the stream of partial updates an attached observer emits.
//!
//! A consumer that starts caring about some keys creates an observer and
//! attaches it; when it stops caring it detaches, which unsubscribes and reaps
//! keys whose count has returned to zero.
//!
//! # Attach window
//!
//! The initial projection is read in [`Observer::new`] and the subscriptions
//! are made in [`Observer::attach`]. A change to a key between the two is not
//! reflected in the projection. Consumers that need the latest value can
//! re-read it from the store after attaching.

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

pub use busy_observer::attached::Attached;
pub use busy_observer::idle::Idle;
pub use busy_observer::{observe, Observer};
pub use update_feed::UpdateFeed;

/// Contains the `Observer` struct and its state-specific implementations (`Idle`, `Attached`).
mod busy_observer;

/// Contains the feed of partial projection updates.
mod update_feed;
