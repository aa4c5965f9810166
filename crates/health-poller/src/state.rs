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

//! Per-server check state.

use std::time::Duration;

use tokio::time::Instant;

/// Outcome of the most recent health check for a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Request in flight
    Checking,
    /// Server answered with a success status
    Online,
    /// HTTP error, transport error or timeout
    Error,
}

/// Mutable state of one monitored server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerState {
    pub status: CheckStatus,

    /// When the current (or last) check was issued
    pub started_at: Instant,

    /// Time until the last check settled, `None` while checking
    pub response_time: Option<Duration>,
}

impl ServerState {
    /// Fresh state for a check issued at `started_at`.
    #[must_use]
    pub const fn checking(started_at: Instant) -> Self {
        Self {
            status: CheckStatus::Checking,
            started_at,
            response_time: None,
        }
    }

    /// Record the outcome of a settled check.
    pub fn settle(&mut self, status: CheckStatus, response_time: Duration) {
        self.status = status;
        self.response_time = Some(response_time);
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.status == CheckStatus::Online
    }

    /// Time spent in the current check as of `now`.
    #[must_use]
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }
}

/// True iff every server is online. An empty set is vacuously online.
#[must_use]
pub fn all_online(states: &[ServerState]) -> bool {
    states.iter().all(ServerState::is_online)
}
