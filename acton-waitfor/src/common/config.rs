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

use std::path::Path;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Configuration for Acton WaitFor.
///
/// Loaded from TOML files in XDG-compliant directories. Every section and field
/// is optional in the file; anything missing takes its default.
///
/// ```toml
/// [notify]
/// isolate_listener_panics = true
///
/// [observer]
/// reap_idle_keys = true
/// emit_unchanged = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitForConfig {
    /// Listener notification behavior.
    pub notify: NotifyConfig,
    /// Observer projection and teardown behavior.
    pub observer: ObserverConfig,
}

/// How a [`Store`](crate::common::Store) delivers notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// When `true`, a panicking listener is logged and skipped and the rest of
    /// the notification pass still runs. When `false`, the panic propagates to
    /// the caller of `set_value` and the remaining listeners are not called.
    /// The decrement run when tracked work settles always isolates.
    pub isolate_listener_panics: bool,
}

/// How an [`Observer`](crate::observer::Observer) maintains its projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Remove zero-count keys from the store when an observer detaches.
    pub reap_idle_keys: bool,
    /// Emit a [`BusyUpdate`](crate::message::BusyUpdate) for every store
    /// notification, not only when a key's busy signal flips.
    pub emit_unchanged: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            isolate_listener_panics: true,
        }
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            reap_idle_keys: true,
            emit_unchanged: false,
        }
    }
}

impl WaitForConfig {
    /// Load configuration from XDG-compliant locations.
    ///
    /// Looks for `waitfor/config.toml` under `$XDG_CONFIG_HOME` (falling back to
    /// `~/.config`). If no file is found the defaults are returned. A file that
    /// cannot be read or parsed is logged and the defaults are used instead.
    pub fn load() -> Self {
        let xdg_dirs = match xdg::BaseDirectories::with_prefix("waitfor") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        match xdg_dirs.find_config_file("config.toml") {
            Some(path) => Self::load_from(&path),
            None => {
                info!("No configuration file found, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit file path, falling back to the
    /// defaults when the file is unreadable or malformed.
    pub fn load_from(path: &Path) -> Self {
        info!("Loading configuration from: {}", path.display());
        let config_str = match std::fs::read_to_string(path) {
            Ok(config_str) => config_str,
            Err(e) => {
                error!("Failed to read configuration file {}: {}", path.display(), e);
                return Self::default();
            }
        };
        match toml::from_str::<Self>(&config_str) {
            Ok(config) => {
                info!("Successfully loaded configuration");
                config
            }
            Err(e) => {
                error!("Failed to parse configuration file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

lazy_static! {
    /// Global configuration loaded from XDG-compliant locations on first use.
    ///
    /// Used by [`Store::new`](crate::common::Store::new); pass a config to
    /// [`Store::with_config`](crate::common::Store::with_config) to bypass it.
    pub static ref CONFIG: WaitForConfig = WaitForConfig::load();
}
