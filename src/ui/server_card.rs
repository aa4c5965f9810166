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

use std::time::Duration;

use eframe::egui;
use health_poller::{derive_display, elapsed_label, ServerState, ServerTarget, StatusIcon};
use tokio::time::Instant;

use super::{tone_color, BUTTON_GO, TEXT_MUTED};

/// Render one server's status card.
///
/// Returns true when the user asked to open the server's main page.
pub fn render(
    ui: &mut egui::Ui,
    server: &ServerTarget,
    state: &ServerState,
    now: Instant,
    wake_threshold: Duration,
) -> bool {
    let display = derive_display(state, now, wake_threshold);
    let color = tone_color(display.tone);
    let mut open_clicked = false;

    egui::Frame::group(ui.style())
        .corner_radius(6.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());

            ui.horizontal(|ui| {
                status_icon(ui, display.icon, color);

                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(&server.name)
                        .size(16.0)
                        .strong());
                    ui.label(egui::RichText::new(&server.main_url)
                        .color(TEXT_MUTED)
                        .size(11.0));
                });

                ui.with_layout(egui::Layout::top_down(egui::Align::Max), |ui| {
                    ui.label(egui::RichText::new(&display.text)
                        .color(color)
                        .strong());

                    // Elapsed time only while the check is pending
                    if let Some(elapsed) = elapsed_label(state, now) {
                        ui.label(egui::RichText::new(elapsed)
                            .color(TEXT_MUTED)
                            .size(11.0)
                            .monospace());
                    }
                });
            });

            if state.is_online() {
                ui.add_space(8.0);

                let button = egui::Button::new(egui::RichText::new(format!("Go to {} ↗", server.name))
                    .color(egui::Color32::WHITE)
                    .strong())
                    .fill(BUTTON_GO)
                    .min_size(egui::vec2(ui.available_width(), 32.0));

                if ui.add(button).on_hover_text(server.main_url.as_str()).clicked() {
                    open_clicked = true;
                }
            }
        });

    open_clicked
}

fn status_icon(ui: &mut egui::Ui, icon: StatusIcon, color: egui::Color32) {
    let glyph = match icon {
        StatusIcon::Spinner => {
            ui.add(egui::Spinner::new().size(18.0).color(color));
            return;
        }
        StatusIcon::Online => "✔",
        StatusIcon::Error => "●",
        StatusIcon::Clock => "⏳",
    };

    ui.label(egui::RichText::new(glyph)
        .color(color)
        .size(18.0));
}
