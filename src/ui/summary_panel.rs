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

use eframe::egui;
use health_poller::ServerTarget;

use super::{tone_color, BUTTON_GO, BUTTON_REFRESH, TEXT_MUTED};

/// User actions raised by the summary panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryAction {
    Refresh,
    Open(usize),
}

/// Render the refresh button, the all-online banner and the footer notes.
pub fn render(ui: &mut egui::Ui, servers: &[ServerTarget], all_online: bool) -> Option<SummaryAction> {
    let mut action = None;

    ui.vertical_centered(|ui| {
        let refresh = egui::Button::new(egui::RichText::new("Refresh Status")
            .color(egui::Color32::WHITE)
            .strong())
            .fill(BUTTON_REFRESH)
            .min_size(egui::vec2(160.0, 36.0));

        if ui.add(refresh).on_hover_text("Re-check every server").clicked() {
            action = Some(SummaryAction::Refresh);
        }

        // Bulk navigation is only offered once every server answered
        if all_online {
            ui.add_space(12.0);
            ui.label(egui::RichText::new("✅ All servers are online and ready!")
                .color(tone_color(health_poller::StatusTone::Green))
                .size(14.0)
                .strong());
            ui.add_space(6.0);

            ui.horizontal_wrapped(|ui| {
                for (index, server) in servers.iter().enumerate() {
                    let button = egui::Button::new(egui::RichText::new(format!("Go to {} ↗", server.name))
                        .color(egui::Color32::WHITE))
                        .fill(BUTTON_GO);
                    if ui.add(button).on_hover_text(server.main_url.as_str()).clicked() {
                        action = Some(SummaryAction::Open(index));
                    }
                }
            });
        }

        ui.add_space(16.0);
        ui.label(egui::RichText::new("This tool wakes up sleeping services by sending health check requests.")
            .color(TEXT_MUTED)
            .size(11.0));
        ui.label(egui::RichText::new("Response times over 3 seconds typically indicate the server was sleeping.")
            .color(TEXT_MUTED)
            .size(11.0));
    });

    action
}
