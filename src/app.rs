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

//! Main window.
//!
//! Owns the status poller and the clock ticker for the lifetime of the
//! window. Dropping the app stops the ticker and cancels outstanding checks.

use eframe::egui;
use health_poller::{ClockTicker, HttpProbe, PollSettings, ProbeError, StatusPoller};
use log::info;

use crate::config::AppConfig;
use crate::navigation;
use crate::ui::summary_panel::{self, SummaryAction};
use crate::ui::{server_card, TEXT_MUTED};

pub struct MonitorApp {
    poller: StatusPoller<HttpProbe>,
    clock: ClockTicker,
    settings: PollSettings,
}

impl MonitorApp {
    /// Build the app and issue the first round of checks.
    ///
    /// Must be called with a tokio runtime entered.
    pub fn new(cc: &eframe::CreationContext<'_>, config: &AppConfig) -> Result<Self, ProbeError> {
        let settings = config.poll_settings();
        let probe = HttpProbe::new()?;
        let mut poller = StatusPoller::new(config.servers.clone(), probe, &settings);

        // Repaint on every tick so elapsed times and the waking-up state stay current
        let ctx = cc.egui_ctx.clone();
        let clock = ClockTicker::start_with_hook(settings.tick_interval, move || {
            ctx.request_repaint();
        });

        info!("Monitoring {} servers", config.servers.len());
        poller.check_all();

        Ok(Self {
            poller,
            clock,
            settings,
        })
    }

    fn apply(&mut self, action: SummaryAction) {
        match action {
            SummaryAction::Refresh => {
                info!("Manual refresh requested");
                self.poller.check_all();
            }
            SummaryAction::Open(index) => {
                if let Some(server) = self.poller.servers().get(index) {
                    navigation::open_main_page(server);
                }
            }
        }
    }
}

impl eframe::App for MonitorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = self.clock.now();
        let states = self.poller.snapshot();
        let all_online = health_poller::all_online(&states);
        let mut action = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(8.0);
                    ui.heading(egui::RichText::new("Server Status Monitor").size(24.0).strong());
                    ui.label(egui::RichText::new("Checking and waking up your services")
                        .color(TEXT_MUTED));
                });

                ui.add_space(16.0);

                for (index, (server, state)) in self.poller.servers().iter().zip(&states).enumerate() {
                    if server_card::render(ui, server, state, now, self.settings.wake_threshold) {
                        action = Some(SummaryAction::Open(index));
                    }
                    ui.add_space(10.0);
                }

                ui.add_space(8.0);

                if let Some(summary_action) = summary_panel::render(ui, self.poller.servers(), all_online) {
                    action = Some(summary_action);
                }
            });
        });

        if let Some(action) = action {
            self.apply(action);
        }
    }
}
