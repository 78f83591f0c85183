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
use std::future::{self, Future};
use std::panic;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use tokio::task::JoinHandle;

use crate::message::WaitError;

/// Handle to a unit of work passed through a [`Tracker`](super::Tracker).
///
/// Awaiting it yields the work's own output unchanged. A panic inside the work
/// resumes on the awaiting task. Dropping the handle does not cancel the work;
/// it keeps running and its key stays busy until it settles.
pub struct Tracked<T> {
    key: String,
    state: TrackedState<T>,
}

enum TrackedState<T> {
    /// Settled before it was ever counted.
    Settled(future::Ready<Result<T, WaitError>>),
    /// Running as a task and counted under `key`.
    Running(JoinHandle<T>),
}

impl<T> Tracked<T> {
    pub(crate) fn ready(key: &str, value: T) -> Self {
        Self {
            key: key.to_owned(),
            state: TrackedState::Settled(future::ready(Ok(value))),
        }
    }

    pub(crate) fn failed(key: &str, error: WaitError) -> Self {
        Self {
            key: key.to_owned(),
            state: TrackedState::Settled(future::ready(Err(error))),
        }
    }

    pub(crate) fn running(key: &str, handle: JoinHandle<T>) -> Self {
        Self {
            key: key.to_owned(),
            state: TrackedState::Running(handle),
        }
    }

    /// The key the work is counted under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the work was counted, i.e. it was deferred and spawned.
    #[must_use]
    pub fn is_tracked(&self) -> bool {
        matches!(self.state, TrackedState::Running(_))
    }

    /// Whether the work has settled. Untracked work is always settled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        match &self.state {
            TrackedState::Settled(_) => true,
            TrackedState::Running(handle) => handle.is_finished(),
        }
    }
}

impl<T> Future for Tracked<T> {
    type Output = Result<T, WaitError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            TrackedState::Settled(settled) => Pin::new(settled).poll(cx),
            TrackedState::Running(handle) => match ready!(Pin::new(handle).poll(cx)) {
                Ok(value) => Poll::Ready(Ok(value)),
                Err(join_error) if join_error.is_panic() => {
                    panic::resume_unwind(join_error.into_panic())
                }
                Err(_) => Poll::Ready(Err(WaitError::Cancelled(this.key.clone()))),
            },
        }
    }
}

impl<T> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("key", &self.key)
            .field("tracked", &self.is_tracked())
            .field("finished", &self.is_finished())
            .finish()
    }
}
