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

//! Monitored server definitions and polling parameters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default client-side deadline for a single health check.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default elapsed time after which a pending check reads as a cold start.
pub const DEFAULT_WAKE_THRESHOLD: Duration = Duration::from_secs(2);

/// Default repaint interval of the clock ticker.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// A monitored service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerTarget {
    /// User-friendly display name
    pub name: String,

    /// Endpoint probed by the health check
    pub health_url: String,

    /// Page opened when the user navigates to the server
    pub main_url: String,
}

impl ServerTarget {
    pub fn new(
        name: impl Into<String>,
        health_url: impl Into<String>,
        main_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            health_url: health_url.into(),
            main_url: main_url.into(),
        }
    }
}

/// Timing parameters shared by the poller, the ticker and the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Deadline after which an in-flight check is cancelled and marked as failed.
    pub request_timeout: Duration,
    /// Pending checks older than this are shown as "waking up".
    pub wake_threshold: Duration,
    /// How often the clock ticker publishes a fresh instant.
    pub tick_interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            wake_threshold: DEFAULT_WAKE_THRESHOLD,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}
