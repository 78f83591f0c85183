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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use acton_waitfor::prelude::*;
use tracing::info;
use waitfor_test::prelude::*;

use crate::setup::*;

mod setup;

#[waitfor_test]
async fn immediate_work_never_touches_the_count() -> anyhow::Result<()> {
    initialize_tracing();
    let store = test_store();
    let tracker = Tracker::new(&store);
    let (listener, seen) = recorder();
    let _subscription = store.subscribe("k", listener)?;

    let tracked = tracker.track("k", || Work::ready(42));

    assert!(!tracked.is_tracked());
    assert!(tracked.is_finished());
    assert_eq!(store.count("k"), 0);
    assert!(!store.contains_key("k"));
    assert_eq!(tracked.await?, 42);
    assert!(seen.lock().is_empty());
    Ok(())
}

#[waitfor_test]
async fn synchronous_failure_propagates_without_counting() -> anyhow::Result<()> {
    initialize_tracing();
    let store = test_store();
    let tracker = Tracker::new(&store);

    let result = tracker.try_track("k", || -> Result<Work<u8, std::future::Ready<u8>>, String> {
        Err("refused before starting".to_string())
    });

    assert_eq!(result.err(), Some("refused before starting".to_string()));
    assert!(!store.contains_key("k"));
    Ok(())
}

#[waitfor_test]
async fn work_can_choose_between_ready_and_deferred_at_run_time() -> anyhow::Result<()> {
    initialize_tracing();
    let store = test_store();
    let tracker = Tracker::new(&store);
    let load = |cached: Option<u32>| {
        move || match cached {
            Some(value) => Work::Ready(value),
            None => Work::deferred(async {
                sleep(20).await;
                7
            }),
        }
    };

    let hit = tracker.track("k", load(Some(3)));
    assert!(!hit.is_tracked());
    assert_eq!(store.count("k"), 0);
    assert_eq!(hit.await?, 3);

    let miss = tracker.track("k", load(None));
    assert!(miss.is_tracked());
    assert_eq!(store.count("k"), 1);
    assert_eq!(miss.await?, 7);
    assert_eq!(store.count("k"), 0);
    Ok(())
}

#[waitfor_test]
async fn deferred_work_is_counted_until_it_settles() -> anyhow::Result<()> {
    initialize_tracing();
    let store = test_store();
    let tracker = Tracker::new(&store);

    let tracked = tracker.track_future("k", async {
        sleep(100).await;
        "done"
    });

    assert!(tracked.is_tracked());
    assert_eq!(store.count("k"), 1);
    assert_eq!(tracked.await?, "done");
    assert_eq!(store.count("k"), 0);
    // Reaching zero never removes the entry on its own.
    assert!(store.contains_key("k"));
    Ok(())
}

#[waitfor_test]
async fn failed_work_passes_through_and_still_decrements() -> anyhow::Result<()> {
    initialize_tracing();
    let store = test_store();
    let tracker = Tracker::new(&store);

    let tracked = tracker.track("k", || {
        Work::deferred(async {
            sleep(50).await;
            Err::<u32, String>("backend unavailable".to_string())
        })
    });
    assert!(store.is_busy("k"));

    let output = tracked.await?;
    assert_eq!(output, Err("backend unavailable".to_string()));
    assert!(!store.is_busy("k"));
    Ok(())
}

#[waitfor_test]
async fn overlapping_work_keeps_the_key_busy_until_the_last_settles() -> anyhow::Result<()> {
    initialize_tracing();
    let store = test_store();
    let tracker = Tracker::new(&store);

    let handles: Vec<_> = [200, 400, 600, 800]
        .into_iter()
        .map(|ms| tracker.track_future("loading", sleep(ms)))
        .collect();

    assert_eq!(store.count("loading"), 4);
    assert!(!store.is_busy("loading2"));

    sleep(600).await;
    info!(count = store.count("loading"), "Halfway through");
    assert!(store.is_busy("loading"));
    assert!(!store.is_busy("loading2"));

    sleep(400).await;
    assert!(!store.is_busy("loading"));
    assert!(!store.is_busy("loading2"));

    for handle in handles {
        handle.await?;
    }
    Ok(())
}

#[waitfor_test]
async fn already_settled_future_is_counted_then_released() -> anyhow::Result<()> {
    initialize_tracing();
    let store = test_store();
    let tracker = Tracker::new(&store);
    let (listener, seen) = recorder();
    let _subscription = store.subscribe("k", listener)?;

    let tracked = tracker.track_future("k", std::future::ready(7));
    assert_eq!(tracked.await?, 7);

    assert_eq!(*seen.lock(), vec![1, 0]);
    Ok(())
}

#[waitfor_test]
async fn dropping_the_handle_does_not_cancel_the_work() -> anyhow::Result<()> {
    initialize_tracing();
    let store = test_store();
    let tracker = Tracker::new(&store);
    let finished = Arc::new(AtomicUsize::new(0));
    let finished_in_task = Arc::clone(&finished);

    drop(tracker.track_future("k", async move {
        sleep(100).await;
        finished_in_task.fetch_add(1, Ordering::SeqCst);
    }));
    assert!(store.is_busy("k"));

    sleep(300).await;
    assert_eq!(finished.load(Ordering::SeqCst), 1);
    assert!(!store.is_busy("k"));
    Ok(())
}

#[waitfor_test]
async fn keys_are_counted_independently() -> anyhow::Result<()> {
    initialize_tracing();
    let store = test_store();
    let tracker = Tracker::new(&store);

    let slow = tracker.track_future("slow", sleep(300));
    let fast = tracker.track_future("fast", sleep(50));

    fast.await?;
    assert!(!store.is_busy("fast"));
    assert!(store.is_busy("slow"));

    slow.await?;
    assert!(!store.is_busy("slow"));
    Ok(())
}

#[test]
fn deferred_work_without_a_runtime_is_rejected_uncounted() {
    let store = test_store();
    let tracker = Tracker::new(&store);

    let tracked = tracker.track_future("k", async { 1 });

    assert!(!tracked.is_tracked());
    assert_eq!(futures::executor::block_on(tracked), Err(WaitError::NoRuntime));
    assert!(!store.contains_key("k"));
}

#[test]
fn tracker_with_explicit_runtime_spawns_there() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();
    let store = test_store();
    let tracker = Tracker::with_runtime(&store, runtime.handle().clone());

    let tracked = tracker.track_future("k", async { 5 });

    assert!(tracked.is_tracked());
    assert_eq!(runtime.block_on(tracked), Ok(5));
    assert!(!store.is_busy("k"));
}

#[test]
fn runtime_shutdown_cancels_and_releases_the_count() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();
    let store = test_store();
    let tracker = Tracker::with_runtime(&store, runtime.handle().clone());

    let tracked = tracker.track_future("k", std::future::pending::<()>());
    assert!(store.is_busy("k"));

    runtime.shutdown_background();
    // Shutdown drops the task, and with it the in-flight guard.
    let result = futures::executor::block_on(tracked);

    assert_eq!(result, Err(WaitError::Cancelled("k".to_string())));
    assert!(!store.is_busy("k"));
}
