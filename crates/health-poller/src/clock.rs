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

//! Repaint clock.
//!
//! Publishes a fresh "now" on a fixed interval so elapsed times and the
//! checking/waking-up transition can be redrawn without touching the network.
//! The ticker never reads or writes poller state.

use std::time::Duration;

use log::debug;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Handle to a running clock task. Dropping it stops the task.
pub struct ClockTicker {
    now_rx: watch::Receiver<Instant>,
    cancel_token: CancellationToken,
    handle: JoinHandle<()>,
}

impl std::fmt::Debug for ClockTicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockTicker")
            .field("now", &*self.now_rx.borrow())
            .field("running", &self.is_running())
            .finish()
    }
}

impl ClockTicker {
    /// Start ticking every `period`.
    #[must_use]
    pub fn start(period: Duration) -> Self {
        Self::start_with_hook(period, || {})
    }

    /// Start ticking every `period`, calling `on_tick` after each published instant.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start_with_hook<F>(period: Duration, on_tick: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let (now_tx, now_rx) = watch::channel(Instant::now());
        let cancel_token = CancellationToken::new();
        let task_cancel = cancel_token.clone();

        // interval() panics on a zero period
        let period = period.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            debug!("Clock ticker started ({}ms)", period.as_millis());
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    now = interval.tick() => {
                        if now_tx.send(now).is_err() {
                            break;
                        }
                        on_tick();
                    }
                    () = task_cancel.cancelled() => break,
                }
            }

            debug!("Clock ticker stopped");
        });

        Self {
            now_rx,
            cancel_token,
            handle,
        }
    }

    /// Most recently published instant.
    #[must_use]
    pub fn now(&self) -> Instant {
        *self.now_rx.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Instant> {
        self.now_rx.clone()
    }

    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for ClockTicker {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
