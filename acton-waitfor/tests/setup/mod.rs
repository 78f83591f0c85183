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

#![allow(dead_code)] // Not every test binary uses every helper.

use std::sync::{Arc, Once};
use std::time::Duration;

use acton_waitfor::prelude::*;
use parking_lot::Mutex;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// Ensures tracing initialization happens only once across all tests.
static INIT: Once = Once::new();

/// Initializes the global tracing subscriber for tests.
///
/// Logs go to `logs/waitfor_tests.txt` so test output stays readable. Uses
/// `std::sync::Once`, so calling it from every test is fine.
pub fn initialize_tracing() {
    INIT.call_once(|| {
        std::fs::create_dir_all("logs").expect("could not create logs dir");

        let file_appender = RollingFileAppender::new(Rotation::NEVER, "logs", "waitfor_tests.txt");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        // Leak the guard so the non-blocking writer is not dropped before process exit
        Box::leak(Box::new(guard));

        let filter = EnvFilter::new("info")
            .add_directive("acton_waitfor=trace".parse().unwrap())
            .add_directive("store_tests=trace".parse().unwrap())
            .add_directive("tracker_tests=trace".parse().unwrap())
            .add_directive("observer_tests=trace".parse().unwrap())
            .add_directive("wait_for_tests=trace".parse().unwrap())
            .add_directive("config_loading_tests=trace".parse().unwrap());

        let subscriber = FmtSubscriber::builder()
            .with_span_events(FmtSpan::NONE)
            .with_max_level(Level::TRACE)
            .compact()
            .with_line_number(true)
            .without_time()
            .with_target(true)
            .with_env_filter(filter)
            .with_writer(non_blocking)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("setting default subscriber failed");
    });
}

/// A store that ignores any config file on the machine running the tests.
pub fn test_store() -> Store<Count> {
    Store::with_config(WaitForConfig::default())
}

/// Completes after `ms` milliseconds.
pub async fn sleep(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// A listener that records every value it is called with.
pub fn recorder() -> (Listener<Count>, Arc<Mutex<Vec<Count>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let listener: Listener<Count> = Arc::new(move |value: &Count| sink.lock().push(*value));
    (listener, seen)
}

/// Builds a projection from `(key, busy)` pairs.
pub fn projection<const N: usize>(slots: [(&str, bool); N]) -> Projection {
    slots
        .into_iter()
        .map(|(key, busy)| (key.to_string(), busy))
        .collect()
}
