//! UI components for the server status monitor.
//!
//! This module contains the per-server card and the summary panel, plus the
//! shared palette mapping status tones to colors.

pub mod server_card;
pub mod summary_panel;

use eframe::egui::Color32;
use health_poller::StatusTone;

pub const TEXT_MUTED: Color32 = Color32::from_rgb(150, 150, 150);
pub const BUTTON_GO: Color32 = Color32::from_rgb(40, 150, 70);
pub const BUTTON_REFRESH: Color32 = Color32::from_rgb(50, 110, 200);

/// Color for a status tone
pub fn tone_color(tone: StatusTone) -> Color32 {
    match tone {
        StatusTone::Green => Color32::from_rgb(100, 220, 100),
        StatusTone::Red => Color32::from_rgb(255, 100, 100),
        StatusTone::Blue => Color32::from_rgb(100, 180, 255),
        StatusTone::Orange => Color32::from_rgb(255, 170, 80),
    }
}
