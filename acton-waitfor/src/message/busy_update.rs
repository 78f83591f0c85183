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

/// A partial update to an observer's projection: one key's busy signal.
///
/// Observers never resend the whole projection. Consumers apply each update to
/// their own copy of the state however they re-render.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BusyUpdate {
    /// The key whose slot changed.
    pub key: String,
    /// `true` while at least one tracked operation under `key` is in flight.
    pub busy: bool,
}

impl BusyUpdate {
    /// Creates an update for `key`.
    pub fn new(key: impl Into<String>, busy: bool) -> Self {
        Self {
            key: key.into(),
            busy,
        }
    }
}
