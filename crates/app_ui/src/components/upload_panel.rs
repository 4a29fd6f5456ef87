//! Upload buttons, drop zone and intake progress

use crate::theme::Theme;
use app_core::{FileType, IntakeJob};
use egui::{RichText, Ui};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadAction {
    PickFiles,
    PickFolder,
}

/// Progress line of one running intake
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatus {
    pub label: String,
    pub fraction: f32,
    pub detail: String,
}

impl JobStatus {
    pub fn from_job(job: &IntakeJob) -> Self {
        match job.progress() {
            Some(p) => Self {
                label: job.label().to_string(),
                fraction: p.fraction(),
                detail: format!("{} / {} · {}", p.processed, p.total, p.current),
            },
            None => Self {
                label: job.label().to_string(),
                fraction: 0.0,
                detail: "Scanning…".to_string(),
            },
        }
    }
}

/// Upload panel component
pub struct UploadPanel;

impl UploadPanel {
    /// Render the panel; `hovering` is true while files are dragged over the window
    pub fn ui(ui: &mut Ui, theme: &Theme, hovering: bool, jobs: &[JobStatus]) -> Option<UploadAction> {
        let mut action = None;

        let (stroke_color, fill) = if hovering {
            (theme.accent, theme.accent.linear_multiply(0.15))
        } else {
            (theme.text_secondary, theme.surface)
        };

        egui::Frame::none()
            .fill(fill)
            .stroke(egui::Stroke::new(1.5, stroke_color))
            .rounding(8.0)
            .inner_margin(egui::Margin::same(16.0))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    let hint = if hovering {
                        "Release to upload"
                    } else {
                        "Drop files or folders here"
                    };
                    ui.label(RichText::new(hint).size(16.0).color(stroke_color));
                    ui.add_space(8.0);

                    ui.horizontal(|ui| {
                        if ui.button("📁 Upload Folder").clicked() {
                            action = Some(UploadAction::PickFolder);
                        }
                        if ui.button("📄 Upload File").clicked() {
                            action = Some(UploadAction::PickFiles);
                        }
                    });
                });
            });

        for job in jobs {
            ui.add_space(4.0);
            ui.label(&job.label);
            ui.add(
                egui::ProgressBar::new(job.fraction)
                    .show_percentage()
                    .desired_height(6.0),
            )
            .on_hover_text(&job.detail);
        }

        action
    }
}

/// Extensions offered in the file picker filter
pub fn known_extensions() -> Vec<&'static str> {
    FileType::ALL
        .into_iter()
        .filter(|t| *t != FileType::Other)
        .map(|t| t.extension())
        .collect()
}

/// Native multi-file picker; empty when cancelled
pub fn pick_files() -> Vec<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Upload files")
        .add_filter("Documents", &known_extensions())
        .add_filter("All files", &["*"])
        .pick_files()
        .unwrap_or_default()
}

/// Native folder picker; empty when cancelled
pub fn pick_folder() -> Vec<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Upload folder")
        .pick_folder()
        .into_iter()
        .collect()
}
