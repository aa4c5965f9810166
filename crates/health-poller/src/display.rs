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

//! Display derivation for a server state.
//!
//! Everything here is a pure function of the state, the current instant and
//! the wake threshold, so the front end can call it on every frame.

use std::time::Duration;

use tokio::time::Instant;

use crate::state::{CheckStatus, ServerState};

/// Icon category shown next to a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    /// Check mark
    Online,
    /// Solid red dot
    Error,
    /// Clock face, short checks
    Clock,
    /// Spinner, slow checks that look like a cold start
    Spinner,
}

/// Color category of the status text and icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Green,
    Red,
    Blue,
    Orange,
}

/// What to show for one server at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusDisplay {
    pub text: String,
    pub icon: StatusIcon,
    pub tone: StatusTone,
}

pub const ERROR_TEXT: &str = "Error - Check URL";
pub const CHECKING_TEXT: &str = "Checking server status";
pub const WAKING_TEXT: &str = "Waking up server...";

/// Derive the display for `state` as of `now`.
///
/// A pending check reads as "checking" while younger than `wake_threshold`
/// and as "waking up" from the threshold on.
#[must_use]
pub fn derive_display(state: &ServerState, now: Instant, wake_threshold: Duration) -> StatusDisplay {
    match state.status {
        CheckStatus::Online => StatusDisplay {
            text: format!(
                "Online ({}ms)",
                state.response_time.unwrap_or_default().as_millis()
            ),
            icon: StatusIcon::Online,
            tone: StatusTone::Green,
        },
        CheckStatus::Error => StatusDisplay {
            text: ERROR_TEXT.to_string(),
            icon: StatusIcon::Error,
            tone: StatusTone::Red,
        },
        CheckStatus::Checking if state.elapsed(now) < wake_threshold => StatusDisplay {
            text: CHECKING_TEXT.to_string(),
            icon: StatusIcon::Clock,
            tone: StatusTone::Blue,
        },
        CheckStatus::Checking => StatusDisplay {
            text: WAKING_TEXT.to_string(),
            icon: StatusIcon::Spinner,
            tone: StatusTone::Orange,
        },
    }
}

/// Seconds spent in the current check, e.g. `"3.4s"`. `None` once settled.
#[must_use]
pub fn elapsed_label(state: &ServerState, now: Instant) -> Option<String> {
    (state.status == CheckStatus::Checking)
        .then(|| format!("{:.1}s", state.elapsed(now).as_secs_f64()))
}
