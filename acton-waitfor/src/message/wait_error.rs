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

/// Errors raised by the store, the tracker and observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitError {
    /// A key was empty, or an observer was given no keys at all.
    ///
    /// Fatal to the call that raised it, never to the store.
    InvalidArgument(String),
    /// Tracked work under the given key was cancelled before it settled,
    /// which only happens when its Tokio runtime shuts down.
    Cancelled(String),
    /// Deferred work was handed to a tracker outside of any Tokio runtime.
    /// The work was dropped without touching the counter.
    NoRuntime,
}

impl fmt::Display for WaitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            Self::Cancelled(key) => write!(f, "Tracked work for key '{key}' was cancelled"),
            Self::NoRuntime => write!(f, "No Tokio runtime available to drive tracked work"),
        }
    }
}

impl std::error::Error for WaitError {}

impl WaitError {
    pub(crate) fn empty_key() -> Self {
        Self::InvalidArgument("key must not be empty".into())
    }
}
