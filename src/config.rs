// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration management.
//!
//! The monitored servers and the polling parameters live in a TOML file
//! managed by confy. A missing file is created with the defaults, which
//! describe the two services this monitor was first written for.

use std::path::{Path, PathBuf};
use std::time::Duration;

use health_poller::{PollSettings, ServerTarget};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_NAME: &str = "wakeup-monitor";
const CONFIG_NAME: &str = "config";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Confy(#[from] confy::ConfyError),

    #[error("no servers configured")]
    NoServers,

    #[error("server #{index} ({name:?}) has an empty {field}")]
    EmptyField {
        index: usize,
        name: String,
        field: &'static str,
    },

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Monitored servers, checked in this order
    #[serde(default = "default_servers")]
    pub servers: Vec<ServerTarget>,

    /// Client-side deadline for one health check
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Pending checks older than this are shown as "waking up"
    #[serde(default = "default_wake_threshold_ms")]
    pub wake_threshold_ms: u64,

    /// Repaint interval of the elapsed-time display
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_servers() -> Vec<ServerTarget> {
    vec![
        ServerTarget::new(
            "Server 1: Decision Tree Model",
            "https://career-comm-priv-1.onrender.com/health",
            "https://career-comm-priv-1.onrender.com",
        ),
        ServerTarget::new(
            "Server 2: Main Laravel Web App",
            "https://career-comm-main-laravel.onrender.com",
            "https://career-comm-main-laravel.onrender.com",
        ),
    ]
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_wake_threshold_ms() -> u64 {
    2_000
}

fn default_tick_interval_ms() -> u64 {
    100
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            servers: default_servers(),
            request_timeout_secs: default_request_timeout_secs(),
            wake_threshold_ms: default_wake_threshold_ms(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or from the per-user config location when `None`
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config: AppConfig = match path {
            Some(path) => confy::load_path(path)?,
            None => confy::load(APP_NAME, CONFIG_NAME)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Get the config file path for display to user
    pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Ok(confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)?),
        }
    }

    /// Reject configurations the poller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.servers.is_empty() {
            return Err(ConfigError::NoServers);
        }

        for (index, server) in self.servers.iter().enumerate() {
            let empty = [
                ("name", &server.name),
                ("health_url", &server.health_url),
                ("main_url", &server.main_url),
            ]
            .into_iter()
            .find(|(_, value)| value.trim().is_empty());

            if let Some((field, _)) = empty {
                return Err(ConfigError::EmptyField {
                    index,
                    name: server.name.clone(),
                    field,
                });
            }
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroDuration("request_timeout_secs"));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration("tick_interval_ms"));
        }

        Ok(())
    }

    #[must_use]
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            wake_threshold: Duration::from_millis(self.wake_threshold_ms),
            tick_interval: Duration::from_millis(self.tick_interval_ms),
        }
    }
}
