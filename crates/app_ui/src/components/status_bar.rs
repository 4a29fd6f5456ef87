//! Status bar component

use app_core::{format_file_size, AppState};
use egui::Ui;

/// Status bar information
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusInfo {
    /// "N files"
    pub file_count: String,

    /// Sum of all file sizes
    pub total_size: String,

    /// "Page x of y"
    pub position: String,

    /// Transient message (last upload, errors)
    pub message: String,
}

impl StatusInfo {
    pub fn from_state(state: &AppState, message: &str) -> Self {
        let count = state.catalog().len();
        let total: u64 = state.catalog().iter().map(|r| r.size()).sum();
        let position = match state.total_pages() {
            0 => String::new(),
            pages => format!("Page {} of {}", state.current_page(), pages),
        };

        Self {
            file_count: format!("{} {}", count, if count == 1 { "file" } else { "files" }),
            total_size: format_file_size(total),
            position,
            message: message.to_string(),
        }
    }
}

/// Status bar component
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar
    pub fn ui(ui: &mut Ui, info: &StatusInfo) {
        ui.horizontal(|ui| {
            ui.label(&info.file_count);
            ui.separator();
            ui.label(&info.total_size);

            if !info.position.is_empty() {
                ui.separator();
                ui.label(&info.position);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if !info.message.is_empty() {
                    ui.label(&info.message);
                }
            });
        });
    }
}
