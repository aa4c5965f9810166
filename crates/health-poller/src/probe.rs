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

//! HTTP client boundary for health checks.
//!
//! The poller only needs to know whether an endpoint answered with a success
//! status. [`HealthProbe`] captures that question so the poller can be driven
//! by a scripted probe in tests; [`HttpProbe`] answers it over the network.

use std::future::Future;
use std::time::Duration;

use reqwest::header::CACHE_CONTROL;
use thiserror::Error;

/// Why a health check did not succeed.
///
/// All variants collapse to [`CheckStatus::Error`](crate::CheckStatus::Error)
/// in the server state; the variant only ends up in the log.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("check cancelled")]
    Cancelled,

    #[error("server returned HTTP {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Performs a single health request against an endpoint.
pub trait HealthProbe: Send + Sync + 'static {
    /// Resolves to `Ok(())` when the endpoint answers with a success status.
    ///
    /// The returned future may be dropped at any point; dropping it must
    /// abandon the request.
    fn probe(&self, url: &str) -> impl Future<Output = Result<(), ProbeError>> + Send;
}

/// [`HealthProbe`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("health-poller/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl HealthProbe for HttpProbe {
    fn probe(&self, url: &str) -> impl Future<Output = Result<(), ProbeError>> + Send {
        let request = self.client.get(url).header(CACHE_CONTROL, "no-cache");

        async move {
            let response = request.send().await?;
            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                Err(ProbeError::Status(status.as_u16()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one connection with a canned response and return the request head.
    async fn serve_once(status_line: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/health", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut head = Vec::new();
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let response = format!("{status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&head).to_lowercase()
        });

        (url, handle)
    }

    #[tokio::test]
    async fn test_success_status_is_ok() {
        let (url, server) = serve_once("HTTP/1.1 200 OK").await;
        let probe = HttpProbe::new().unwrap();

        assert!(probe.probe(&url).await.is_ok());

        let head = server.await.unwrap();
        assert!(head.starts_with("get /health"));
        assert!(head.contains("cache-control: no-cache"));
    }

    #[tokio::test]
    async fn test_server_error_status_is_reported() {
        let (url, server) = serve_once("HTTP/1.1 503 Service Unavailable").await;
        let probe = HttpProbe::new().unwrap();

        let result = probe.probe(&url).await;
        assert!(matches!(result, Err(ProbeError::Status(503))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/health", listener.local_addr().unwrap());
        drop(listener);

        let probe = HttpProbe::new().unwrap();
        assert!(matches!(probe.probe(&url).await, Err(ProbeError::Transport(_))));
    }

    #[tokio::test]
    async fn test_invalid_url_is_transport_error() {
        let probe = HttpProbe::new().unwrap();
        assert!(matches!(
            probe.probe("not a url").await,
            Err(ProbeError::Transport(_))
        ));
    }
}
