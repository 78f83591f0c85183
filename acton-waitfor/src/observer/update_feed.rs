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

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::message::BusyUpdate;

/// Partial projection updates from an attached [`Observer`](super::Observer).
///
/// Each item names one key and its new busy signal. The feed ends once the
/// observer has detached and no notification is still being delivered.
#[derive(Debug)]
pub struct UpdateFeed {
    receiver: UnboundedReceiver<BusyUpdate>,
}

impl UpdateFeed {
    pub(crate) const fn new(receiver: UnboundedReceiver<BusyUpdate>) -> Self {
        Self { receiver }
    }

    /// Waits for the next update. Returns `None` once the feed has ended.
    pub async fn recv(&mut self) -> Option<BusyUpdate> {
        self.receiver.recv().await
    }

    /// Returns the next update if one is already queued.
    pub fn try_recv(&mut self) -> Option<BusyUpdate> {
        self.receiver.try_recv().ok()
    }

    /// Takes every update queued so far, oldest first.
    pub fn drain(&mut self) -> Vec<BusyUpdate> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

impl Stream for UpdateFeed {
    type Item = BusyUpdate;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}
