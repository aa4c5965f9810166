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

//! Health-check polling for services that go to sleep when idle.
//!
//! The crate is split into small layers that a front end composes:
//!
//! - **Probe layer**: [`HealthProbe`] performs one GET against a health URL;
//!   [`HttpProbe`] is the `reqwest` implementation.
//! - **Poller layer**: [`StatusPoller`] owns one [`ServerState`] per server,
//!   runs every check as its own task bounded by a deadline, and publishes
//!   state changes through a `watch` channel.
//! - **Clock layer**: [`ClockTicker`] republishes "now" on a short interval
//!   for repainting.
//! - **Display layer**: [`derive_display`] turns a state and an instant into
//!   text, icon and color, distinguishing an ordinary check from a cold start
//!   purely by elapsed time.
//!
//! # Quick Start
//!
//! ```no_run
//! use health_poller::{HttpProbe, PollSettings, ServerTarget, StatusPoller};
//!
//! #[tokio::main]
//! async fn main() {
//!     let servers = vec![ServerTarget::new(
//!         "API",
//!         "https://api.example.com/health",
//!         "https://api.example.com",
//!     )];
//!     let probe = HttpProbe::new().expect("http client");
//!     let mut poller = StatusPoller::new(servers, probe, &PollSettings::default());
//!
//!     poller.check_all();
//!     for state in poller.settled().await {
//!         println!("{:?} after {:?}", state.status, state.response_time);
//!     }
//! }
//! ```

pub mod clock;
pub mod config;
pub mod deadline;
pub mod display;
pub mod poller;
pub mod probe;
pub mod state;

pub use clock::ClockTicker;
pub use config::{PollSettings, ServerTarget};
pub use deadline::with_deadline;
pub use display::{derive_display, elapsed_label, StatusDisplay, StatusIcon, StatusTone};
pub use poller::{PollError, StatusPoller};
pub use probe::{HealthProbe, HttpProbe, ProbeError};
pub use state::{all_online, CheckStatus, ServerState};
