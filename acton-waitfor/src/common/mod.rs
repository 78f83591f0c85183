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

//! The keyed store, its subscriptions, configuration and shared type aliases.
//!
//! # Key Re-exported Components:
//!
//! *   [`Store`]: keyed values with synchronous per-key notification.
//! *   [`Subscription`]: the handle that releases one listener registration.
//! *   [`WaitFor`]: typed-key entry point bundling a store and a tracker.
//! *   [`WaitForConfig`]: configuration loaded from XDG locations.

// --- Public Re-exports ---
pub use config::{NotifyConfig, ObserverConfig, WaitForConfig, CONFIG};
pub use store::Store;
pub use store_stats::StoreStats;
pub use subscription::Subscription;
pub use wait_for::WaitFor;

// --- Crate-Internal Re-exports ---
pub use types::*;

// --- Submodules ---

/// Defines common type aliases and supporting structs.
mod types;

/// Defines the configuration loaded from XDG-compliant locations.
pub mod config;
/// Defines the keyed store.
pub(crate) mod store;
/// Defines the statistics counters kept by a store.
mod store_stats;
/// Defines the single-registration subscription handle.
mod subscription;
/// Defines the `WaitFor` entry point.
mod wait_for;
