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

//! Panics raised by tracked work and by listeners.
//!
//! Note: These tests use `#[tokio::test]` instead of `#[waitfor_test]` because
//! the `waitfor_test` macro's panic detection would fail the test when we
//! intentionally trigger panics. They live in their own test binary so the
//! panic hook installed by `waitfor_test` never sees them.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use acton_waitfor::prelude::*;
use futures::FutureExt;

use crate::setup::*;

mod setup;

#[tokio::test]
async fn panicking_work_resumes_on_the_awaiter_and_decrements() {
    let store = test_store();
    let tracker = Tracker::new(&store);

    let tracked = tracker.track_future("k", async {
        sleep(20).await;
        let exploded = true;
        assert!(!exploded, "work exploded");
    });
    assert!(store.is_busy("k"));

    let outcome = AssertUnwindSafe(tracked).catch_unwind().await;
    let payload = outcome.expect_err("the panic should reach the awaiter");
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned());
    assert_eq!(message.as_deref(), Some("work exploded"));
    assert!(!store.is_busy("k"));
}

#[tokio::test]
async fn panicking_invocation_propagates_before_counting() {
    let store = test_store();
    let tracker = Tracker::new(&store);

    let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
        tracker.track("k", || -> Work<(), std::future::Ready<()>> { panic!("invocation failed") })
    }));

    assert!(outcome.is_err());
    assert!(!store.contains_key("k"));
}

#[tokio::test]
async fn panicking_listener_does_not_starve_the_observer() {
    let store = test_store();
    let tracker = Tracker::new(&store);
    let _boom = store
        .subscribe("k", Arc::new(|_: &Count| panic!("listener failure")))
        .unwrap();
    let (observer, mut updates) = observe(&store, ["k"]).unwrap();

    let tracked = tracker.track_future("k", sleep(20));
    assert_eq!(observer.is_busy("k"), Some(true));
    tracked.await.unwrap();

    assert_eq!(observer.is_busy("k"), Some(false));
    assert_eq!(
        updates.drain(),
        vec![BusyUpdate::new("k", true), BusyUpdate::new("k", false)]
    );
    assert_eq!(store.stats().listener_panics(), 2);
}

#[tokio::test]
async fn unisolated_listener_panic_surfaces_from_the_increment() {
    let mut config = WaitForConfig::default();
    config.notify.isolate_listener_panics = false;
    let store = Store::with_config(config);
    let tracker = Tracker::new(&store);
    let _boom = store
        .subscribe("k", Arc::new(|_: &Count| panic!("listener failure")))
        .unwrap();

    let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
        tracker.track_future("k", async {})
    }));

    assert!(outcome.is_err());
    // The increment landed before the pass aborted. The work was never
    // spawned, so nothing will release it.
    assert_eq!(store.count("k"), 1);
}

fn unisolated_store_panicking_on_settle() -> Store<Count> {
    let mut config = WaitForConfig::default();
    config.notify.isolate_listener_panics = false;
    let store = Store::with_config(config);
    store
        .subscribe(
            "k",
            Arc::new(|count: &Count| {
                if *count == 0 {
                    panic!("listener on settle");
                }
            }),
        )
        .unwrap()
        .forget();
    store
}

#[tokio::test]
async fn settle_listener_panic_leaves_the_work_result_untouched() {
    let store = unisolated_store_panicking_on_settle();
    let tracker = Tracker::new(&store);

    let tracked = tracker.track_future("k", async {
        sleep(10).await;
        5
    });
    assert_eq!(store.count("k"), 1);

    let outcome = AssertUnwindSafe(tracked).catch_unwind().await;
    assert!(matches!(outcome, Ok(Ok(5))));
    assert_eq!(store.count("k"), 0);
    assert_eq!(store.stats().listener_panics(), 1);
}

#[tokio::test]
async fn settle_listener_panic_during_failed_work_keeps_the_work_panic() {
    let store = unisolated_store_panicking_on_settle();
    let tracker = Tracker::new(&store);

    let tracked = tracker.track_future("k", async {
        sleep(10).await;
        let failed = true;
        assert!(!failed, "work failed");
    });
    // Awaited from its own task, like any consumer of the handle.
    let awaiter = tokio::spawn(async move { AssertUnwindSafe(tracked).catch_unwind().await });

    let payload = awaiter
        .await
        .expect("the awaiting task should finish")
        .expect_err("the work's panic should reach the awaiter");
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned());
    assert_eq!(message.as_deref(), Some("work failed"));
    assert_eq!(store.count("k"), 0);
    assert_eq!(store.stats().listener_panics(), 1);
}
