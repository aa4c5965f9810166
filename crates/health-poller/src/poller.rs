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

//! Status poller owning the per-server state and the in-flight checks.
//!
//! Every check runs as its own tokio task and writes only the slot of the
//! server it belongs to. A check that has been superseded by a newer one for
//! the same server is cancelled, and a per-slot generation number guarantees
//! that a late result can never overwrite the state of the newer check.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::{PollSettings, ServerTarget};
use crate::deadline::with_deadline;
use crate::probe::{HealthProbe, ProbeError};
use crate::state::{self, CheckStatus, ServerState};

/// Errors returned by the poller API.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollError {
    #[error("no server at index {index} ({count} configured)")]
    UnknownServer { index: usize, count: usize },

    #[error("poller has been shut down")]
    ShutDown,
}

/// A spawned check that may still be running.
struct InFlight {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Polls a fixed list of servers and tracks one [`ServerState`] per server.
///
/// States start out as [`CheckStatus::Checking`]; call
/// [`check_all`](Self::check_all) to issue the first round of requests.
pub struct StatusPoller<P: HealthProbe> {
    servers: Arc<[ServerTarget]>,
    probe: Arc<P>,
    request_timeout: Duration,

    /// Published server states, indexed like `servers`
    states: Arc<watch::Sender<Vec<ServerState>>>,

    /// Generation of the latest check per slot, only mutated under the watch lock
    generations: Arc<[AtomicU64]>,

    in_flight: HashMap<usize, InFlight>,

    /// Parent of every per-check token
    shutdown: CancellationToken,
}

impl<P: HealthProbe> std::fmt::Debug for StatusPoller<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusPoller")
            .field("servers", &self.servers)
            .field("request_timeout", &self.request_timeout)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

impl<P: HealthProbe> StatusPoller<P> {
    /// Create a poller with every server in the checking state.
    ///
    /// No request is issued until [`check`](Self::check) or
    /// [`check_all`](Self::check_all) is called.
    pub fn new(servers: Vec<ServerTarget>, probe: P, settings: &PollSettings) -> Self {
        let now = Instant::now();
        let states: Vec<ServerState> = servers.iter().map(|_| ServerState::checking(now)).collect();
        let generations: Arc<[AtomicU64]> = servers.iter().map(|_| AtomicU64::new(0)).collect();
        let (states, _) = watch::channel(states);

        Self {
            servers: servers.into(),
            probe: Arc::new(probe),
            request_timeout: settings.request_timeout,
            states: Arc::new(states),
            generations,
            in_flight: HashMap::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Configured servers, in state order.
    #[must_use]
    pub fn servers(&self) -> &[ServerTarget] {
        &self.servers
    }

    /// Re-check a single server.
    ///
    /// The server's state is reset to checking right away. Any check still in
    /// flight for the same server is cancelled and its result discarded.
    /// Must be called from within a tokio runtime.
    pub fn check(&mut self, index: usize) -> Result<(), PollError> {
        if self.shutdown.is_cancelled() {
            return Err(PollError::ShutDown);
        }
        if index >= self.servers.len() {
            return Err(PollError::UnknownServer {
                index,
                count: self.servers.len(),
            });
        }

        self.start_check(index);
        Ok(())
    }

    /// Re-check every server concurrently. Does nothing once shut down.
    pub fn check_all(&mut self) {
        if self.shutdown.is_cancelled() {
            warn!("Ignoring check of {} servers, poller is shut down", self.servers.len());
            return;
        }
        info!("Checking {} servers", self.servers.len());
        for index in 0..self.servers.len() {
            self.start_check(index);
        }
    }

    fn start_check(&mut self, index: usize) {
        let target = self.servers[index].clone();

        if let Some(previous) = self.in_flight.remove(&index) {
            if !previous.handle.is_finished() {
                debug!("[{}] Superseding check still in flight", target.name);
            }
            previous.cancel.cancel();
        }

        let started_at = Instant::now();
        let mut generation = 0;
        self.states.send_modify(|states| {
            generation = self.generations[index].fetch_add(1, Ordering::SeqCst) + 1;
            states[index] = ServerState::checking(started_at);
        });

        let cancel = self.shutdown.child_token();
        let task = CheckTask {
            index,
            generation,
            started_at,
            target,
            timeout: self.request_timeout,
            probe: Arc::clone(&self.probe),
            states: Arc::clone(&self.states),
            generations: Arc::clone(&self.generations),
            cancel: cancel.clone(),
        };
        let handle = tokio::spawn(task.run());

        self.in_flight.insert(index, InFlight { cancel, handle });
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<ServerState>> {
        self.states.subscribe()
    }

    /// Current state of every server.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ServerState> {
        self.states.borrow().clone()
    }

    /// Current state of one server.
    #[must_use]
    pub fn state(&self, index: usize) -> Option<ServerState> {
        self.states.borrow().get(index).copied()
    }

    /// True iff every server's last check succeeded.
    #[must_use]
    pub fn all_online(&self) -> bool {
        state::all_online(&self.states.borrow())
    }

    /// Number of checks whose task has not finished yet.
    #[must_use]
    pub fn pending_checks(&self) -> usize {
        self.in_flight
            .values()
            .filter(|flight| !flight.handle.is_finished())
            .count()
    }

    /// Wait until no server is in the checking state and return the states.
    ///
    /// Only meaningful after checks were issued; checks cancelled by
    /// [`shutdown`](Self::shutdown) leave their servers checking.
    pub async fn settled(&self) -> Vec<ServerState> {
        let mut rx = self.states.subscribe();
        let result = rx
            .wait_for(|states| states.iter().all(|s| s.status != CheckStatus::Checking))
            .await
            .map(|states| states.to_vec());

        match result {
            Ok(states) => states,
            Err(_closed) => self.snapshot(),
        }
    }

    /// Cancel every outstanding check. Later checks are rejected.
    pub fn shutdown(&mut self) {
        if !self.shutdown.is_cancelled() {
            info!("Shutting down status poller - cancelling {} checks", self.pending_checks());
            self.shutdown.cancel();
        }
        self.in_flight.clear();
    }
}

impl<P: HealthProbe> Drop for StatusPoller<P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Everything a spawned check needs, owned so the task is `'static`.
struct CheckTask<P> {
    index: usize,
    generation: u64,
    started_at: Instant,
    target: ServerTarget,
    timeout: Duration,
    probe: Arc<P>,
    states: Arc<watch::Sender<Vec<ServerState>>>,
    generations: Arc<[AtomicU64]>,
    cancel: CancellationToken,
}

impl<P: HealthProbe> CheckTask<P> {
    async fn run(self) {
        let name = &self.target.name;
        info!("[{}] Checking {}...", name, self.target.health_url);

        let result = with_deadline(
            self.probe.probe(&self.target.health_url),
            self.timeout,
            &self.cancel,
        )
        .await;
        let elapsed = self.started_at.elapsed();

        let status = match result {
            Ok(()) => {
                info!("[{}] Online after {}ms", name, elapsed.as_millis());
                CheckStatus::Online
            }
            Err(ProbeError::Cancelled) => {
                debug!("[{}] Check cancelled", name);
                return;
            }
            Err(e) => {
                warn!("[{}] Health check failed after {}ms: {}", name, elapsed.as_millis(), e);
                CheckStatus::Error
            }
        };

        let applied = self.states.send_if_modified(|states| {
            if self.generations[self.index].load(Ordering::SeqCst) != self.generation {
                return false;
            }
            states[self.index].settle(status, elapsed);
            true
        });

        if !applied {
            debug!("[{}] Discarding result of superseded check", name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::HttpProbe;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::Mutex;
    use tokio::time::sleep;

    #[derive(Debug, Clone, Copy)]
    enum Reply {
        Ok,
        Status(u16),
        Hang,
    }

    /// Probe answering each URL from a queue of (delay, reply) pairs.
    /// URLs with an empty queue hang forever.
    #[derive(Default)]
    struct ScriptedProbe {
        replies: Mutex<HashMap<String, VecDeque<(Duration, Reply)>>>,
    }

    impl ScriptedProbe {
        fn reply(self, url: &str, delay_ms: u64, reply: Reply) -> Self {
            self.replies
                .lock()
                .unwrap()
                .entry(url.to_string())
                .or_default()
                .push_back((Duration::from_millis(delay_ms), reply));
            self
        }
    }

    impl HealthProbe for ScriptedProbe {
        fn probe(&self, url: &str) -> impl Future<Output = Result<(), ProbeError>> + Send {
            let next = self
                .replies
                .lock()
                .unwrap()
                .get_mut(url)
                .and_then(VecDeque::pop_front)
                .unwrap_or((Duration::ZERO, Reply::Hang));

            async move {
                let (delay, reply) = next;
                sleep(delay).await;
                match reply {
                    Reply::Ok => Ok(()),
                    Reply::Status(code) => Err(ProbeError::Status(code)),
                    Reply::Hang => std::future::pending().await,
                }
            }
        }
    }

    fn servers() -> Vec<ServerTarget> {
        vec![
            ServerTarget::new("A", "http://a/health", "http://a"),
            ServerTarget::new("B", "http://b/health", "http://b"),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_checking_after_creation() {
        let poller = StatusPoller::new(servers(), ScriptedProbe::default(), &PollSettings::default());

        let states = poller.snapshot();
        assert_eq!(states.len(), 2);
        assert!(states.iter().all(|s| s.status == CheckStatus::Checking));
        assert!(states.iter().all(|s| s.response_time.is_none()));
        assert!(!poller.all_online());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_success_and_timeout() {
        let probe = ScriptedProbe::default().reply("http://a/health", 500, Reply::Ok);
        let mut poller = StatusPoller::new(servers(), probe, &PollSettings::default());

        poller.check_all();
        let states = poller.settled().await;

        assert_eq!(states[0].status, CheckStatus::Online);
        let a_time = states[0].response_time.unwrap();
        assert!(a_time >= Duration::from_millis(500) && a_time < Duration::from_millis(600));

        assert_eq!(states[1].status, CheckStatus::Error);
        let b_time = states[1].response_time.unwrap();
        assert!(b_time >= Duration::from_secs(30) && b_time < Duration::from_secs(31));

        assert!(!poller.all_online());
    }

    #[tokio::test(start_paused = true)]
    async fn test_http_error_status_is_error() {
        let probe = ScriptedProbe::default()
            .reply("http://a/health", 100, Reply::Status(502))
            .reply("http://b/health", 100, Reply::Ok);
        let mut poller = StatusPoller::new(servers(), probe, &PollSettings::default());

        poller.check_all();
        let states = poller.settled().await;

        assert_eq!(states[0].status, CheckStatus::Error);
        assert!(states[0].response_time.is_some());
        assert_eq!(states[1].status, CheckStatus::Online);
    }

    #[tokio::test]
    async fn test_transport_failure_is_error() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let servers = vec![ServerTarget::new("Closed", format!("{base}/health"), base)];
        let mut poller = StatusPoller::new(servers, HttpProbe::new().unwrap(), &PollSettings::default());

        poller.check_all();
        let states = poller.settled().await;

        assert_eq!(states[0].status, CheckStatus::Error);
        assert!(states[0].response_time.unwrap() < Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_online_when_every_check_succeeds() {
        let probe = ScriptedProbe::default()
            .reply("http://a/health", 200, Reply::Ok)
            .reply("http://b/health", 3_000, Reply::Ok);
        let mut poller = StatusPoller::new(servers(), probe, &PollSettings::default());

        poller.check_all();
        poller.settled().await;

        assert!(poller.all_online());
    }

    #[tokio::test(start_paused = true)]
    async fn test_recheck_discards_stale_result() {
        let probe = ScriptedProbe::default()
            .reply("http://a/health", 3_000, Reply::Status(500))
            .reply("http://a/health", 5_000, Reply::Ok);
        let mut poller = StatusPoller::new(servers(), probe, &PollSettings::default());

        poller.check(0).unwrap();
        let first_start = poller.state(0).unwrap().started_at;

        sleep(Duration::from_secs(1)).await;
        poller.check(0).unwrap();

        let restarted = poller.state(0).unwrap();
        assert_eq!(restarted.status, CheckStatus::Checking);
        assert!(restarted.started_at > first_start);
        assert!(restarted.response_time.is_none());

        // The first check would have failed at t=3s
        sleep(Duration::from_secs(3)).await;
        assert_eq!(poller.state(0).unwrap().status, CheckStatus::Checking);

        let mut rx = poller.subscribe();
        rx.wait_for(|states| states[0].status != CheckStatus::Checking)
            .await
            .unwrap();

        let settled = poller.state(0).unwrap();
        assert_eq!(settled.status, CheckStatus::Online);
        assert!(settled.response_time.unwrap() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_only_touches_its_own_slot() {
        let probe = ScriptedProbe::default().reply("http://b/health", 100, Reply::Ok);
        let mut poller = StatusPoller::new(servers(), probe, &PollSettings::default());
        let before = poller.state(0).unwrap();

        poller.check(1).unwrap();
        let mut rx = poller.subscribe();
        rx.wait_for(|states| states[1].status == CheckStatus::Online)
            .await
            .unwrap();

        assert_eq!(poller.state(0).unwrap(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_index_is_rejected() {
        let mut poller = StatusPoller::new(servers(), ScriptedProbe::default(), &PollSettings::default());

        assert_eq!(
            poller.check(5),
            Err(PollError::UnknownServer { index: 5, count: 2 })
        );
        assert_eq!(poller.pending_checks(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_timeout_is_honoured() {
        let settings = PollSettings {
            request_timeout: Duration::from_secs(2),
            ..PollSettings::default()
        };
        let mut poller = StatusPoller::new(servers(), ScriptedProbe::default(), &settings);

        poller.check_all();
        let states = poller.settled().await;

        for state in states {
            assert_eq!(state.status, CheckStatus::Error);
            assert!(state.response_time.unwrap() < Duration::from_secs(3));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_in_flight_checks() {
        let mut poller = StatusPoller::new(servers(), ScriptedProbe::default(), &PollSettings::default());

        poller.check_all();
        assert_eq!(poller.pending_checks(), 2);

        let handles: Vec<_> = poller.in_flight.drain().map(|(_, f)| f).collect();
        let tokens: Vec<_> = handles.iter().map(|f| f.cancel.clone()).collect();
        poller.shutdown();

        assert!(tokens.iter().all(CancellationToken::is_cancelled));
        for flight in handles {
            flight.handle.await.unwrap();
        }

        // Cancelled checks leave no result behind
        assert!(poller.snapshot().iter().all(|s| s.status == CheckStatus::Checking));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_settled_state() {
        let probe = ScriptedProbe::default().reply("http://a/health", 250, Reply::Ok);
        let mut poller = StatusPoller::new(servers(), probe, &PollSettings::default());
        let mut rx = poller.subscribe();

        poller.check(0).unwrap();
        rx.wait_for(|states| states[0].is_online()).await.unwrap();

        assert_eq!(rx.borrow()[1].status, CheckStatus::Checking);
    }

    #[tokio::test(start_paused = true)]
    async fn test_checks_rejected_after_shutdown() {
        let probe = ScriptedProbe::default().reply("http://a/health", 100, Reply::Ok);
        let mut poller = StatusPoller::new(servers(), probe, &PollSettings::default());
        let before = poller.snapshot();

        poller.shutdown();

        assert_eq!(poller.check(0), Err(PollError::ShutDown));
        poller.check_all();
        assert_eq!(poller.pending_checks(), 0);

        sleep(Duration::from_secs(60)).await;
        assert_eq!(poller.snapshot(), before);
    }
}
