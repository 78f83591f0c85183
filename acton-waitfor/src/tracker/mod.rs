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

//! Counting asynchronous work per key.
//!
//! A [`Tracker`] invokes a unit of work and, when the work hands back a future,
//! registers it as in flight under a key until it settles. The future is run
//! as a Tokio task so the count is released even if nobody awaits the
//! returned [`Tracked`] handle.

pub use tracked::Tracked;
pub use work::Work;
pub use work_tracker::Tracker;

/// Defines the guard that holds one unit of a key's count.
mod in_flight;
/// Defines the handle returned for tracked work.
mod tracked;
/// Defines the shape of a unit of work.
mod work;
/// Defines the `Tracker`.
mod work_tracker;
