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

//! Opening a server's main page in the system browser.

use health_poller::ServerTarget;
use log::{info, warn};

/// Open `server.main_url` in a new browser tab. Failures are only logged.
pub fn open_main_page(server: &ServerTarget) {
    info!("[{}] Opening {}", server.name, server.main_url);

    if let Err(e) = webbrowser::open(&server.main_url) {
        warn!("[{}] Failed to open {}: {}", server.name, server.main_url, e);
    }
}

/// Open the main page of every server.
pub fn open_all(servers: &[ServerTarget]) {
    for server in servers {
        open_main_page(server);
    }
}
