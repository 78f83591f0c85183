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

use std::future::Future;

/// What a unit of work produced when it was invoked.
///
/// Work that finished synchronously is `Ready` and is never counted. Work that
/// still has to finish is `Deferred` and is counted until its future settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Work<T, F> {
    /// The work already produced its value.
    Ready(T),
    /// The work continues in this future.
    Deferred(F),
}

impl<T> Work<T, std::future::Ready<T>> {
    /// Work that completed synchronously with `value`.
    ///
    /// This fixes the future type to `std::future::Ready<T>`. Work that picks
    /// between an immediate value and a future at run time should build the
    /// variant directly, so both arms share the deferred future's type:
    ///
    /// ```rust,ignore
    /// tracker.track("users", || match cache.get() {
    ///     Some(users) => Work::Ready(users),
    ///     None => Work::deferred(fetch_users()),
    /// });
    /// ```
    pub const fn ready(value: T) -> Self {
        Self::Ready(value)
    }
}

impl<T, F: Future<Output = T>> Work<T, F> {
    /// Work that settles when `future` does.
    pub const fn deferred(future: F) -> Self {
        Self::Deferred(future)
    }

    /// Whether the work still has to settle.
    pub const fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}
