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

#![forbid(unsafe_code)]
#![forbid(missing_docs)] // Keep this to enforce coverage

//! # Acton WaitFor
//!
//! Counts asynchronous operations that are in flight under string keys and
//! publishes, per key, a derived busy signal (`count > 0`). A UI layer can ask
//! "is anything still loading under this key" without each call site keeping
//! its own counter. State lives in memory for the life of the process.
//!
//! ## Key Concepts
//!
//! - **Store (`Store`)**: keyed values with per-key listeners that are
//!   notified synchronously, in registration order, on every write.
//! - **Tracker (`Tracker`)**: invokes a unit of work and, if it is deferred,
//!   counts it under a key from the moment it starts until it settles,
//!   successfully or not.
//! - **Observer (`Observer`)**: derives a `key -> busy` projection for a
//!   consumer, keeps it current while attached, and reaps zero-count keys
//!   when it detaches.
//! - **WaitFor (`WaitFor`)**: entry point bundling a store and a tracker over
//!   a typed key space.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use acton_waitfor::prelude::*;
//!
//! let wait_for: WaitFor<&str> = WaitFor::new();
//! let (observer, mut updates) = wait_for.watch(["list-loading", "table-loading"])?;
//!
//! let rows = wait_for.track_future("list-loading", fetch_rows());
//! assert_eq!(observer.is_busy("list-loading"), Some(true));
//!
//! let rows = rows.await?;
//! assert_eq!(updates.recv().await, Some(BusyUpdate::new("list-loading", false)));
//! ```

/// Core store, configuration and shared types.
pub mod common;

/// Errors and partial updates.
pub mod message;

/// Counting asynchronous work per key.
pub mod tracker;

/// Deriving busy projections for consumers.
pub mod observer;

/// A prelude module for conveniently importing the most commonly used items.
///
/// # Re-exports
///
/// *   [`crate::common::Store`]: the keyed store.
/// *   [`crate::common::Subscription`]: handle releasing one listener registration.
/// *   [`crate::common::WaitFor`]: typed-key entry point.
/// *   [`crate::common::WaitForConfig`]: configuration.
/// *   [`crate::common::Count`], [`crate::common::Listener`], [`crate::common::Projection`]: type aliases.
/// *   [`crate::message::BusyUpdate`], [`crate::message::WaitError`]: values flowing out of the crate.
/// *   [`crate::observer::Observer`], [`crate::observer::Idle`], [`crate::observer::Attached`],
///     [`crate::observer::UpdateFeed`], [`crate::observer::observe`]: observation.
/// *   [`crate::tracker::Tracker`], [`crate::tracker::Tracked`], [`crate::tracker::Work`]: tracking.
pub mod prelude {
    pub use crate::common::{
        Count, Listener, Projection, Store, Subscription, WaitFor, WaitForConfig,
    };
    pub use crate::message::{BusyUpdate, WaitError};
    pub use crate::observer::{observe, Attached, Idle, Observer, UpdateFeed};
    pub use crate::tracker::{Tracked, Tracker, Work};
}
