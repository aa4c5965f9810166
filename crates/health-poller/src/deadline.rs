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

//! Scoped async operations bounded by a deadline and a cancellation token.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::probe::ProbeError;

/// Run `operation` until it settles, `deadline` elapses, or `cancel` fires.
///
/// Whichever happens first wins. The operation future is dropped on return,
/// which abandons any request it still has in flight.
pub async fn with_deadline<F, T>(
    operation: F,
    deadline: Duration,
    cancel: &CancellationToken,
) -> Result<T, ProbeError>
where
    F: Future<Output = Result<T, ProbeError>>,
{
    tokio::select! {
        // Cancellation is checked first so a superseded check never records a result
        biased;
        () = cancel.cancelled() => Err(ProbeError::Cancelled),
        result = operation => result,
        () = sleep(deadline) => Err(ProbeError::Timeout(deadline)),
    }
}
