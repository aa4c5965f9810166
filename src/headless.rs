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

//! One-shot terminal mode: check every server once and report.

use std::time::Duration;

use health_poller::{
    all_online, derive_display, HttpProbe, ProbeError, ServerState, ServerTarget, StatusPoller,
};
use tokio::time::Instant;

use crate::config::AppConfig;
use crate::navigation;

/// Check all servers, print a report and return whether all are online.
pub async fn run(config: &AppConfig, open_when_ready: bool) -> Result<bool, ProbeError> {
    let settings = config.poll_settings();
    let probe = HttpProbe::new()?;
    let mut poller = StatusPoller::new(config.servers.clone(), probe, &settings);

    poller.check_all();
    let states = poller.settled().await;

    for line in report_lines(poller.servers(), &states, Instant::now(), settings.wake_threshold) {
        println!("{line}");
    }

    let ready = all_online(&states);
    if ready && open_when_ready {
        navigation::open_all(poller.servers());
    }

    Ok(ready)
}

/// One line per server followed by a summary line.
pub fn report_lines(
    servers: &[ServerTarget],
    states: &[ServerState],
    now: Instant,
    wake_threshold: Duration,
) -> Vec<String> {
    let width = servers.iter().map(|s| s.name.len()).max().unwrap_or(0);

    let mut lines: Vec<String> = servers
        .iter()
        .zip(states)
        .map(|(server, state)| {
            let display = derive_display(state, now, wake_threshold);
            format!("{:<width$}  {:<24}  {}", server.name, display.text, server.main_url)
        })
        .collect();

    let online = states.iter().filter(|s| s.is_online()).count();
    if all_online(states) {
        lines.push("All servers are online and ready!".to_string());
    } else {
        lines.push(format!("{online} of {} servers online", states.len()));
    }

    lines
}
