//! Modal viewer window

use super::file_table::type_badge;
use crate::theme::Theme;
use app_core::{format_date, format_file_size, FileId, FileRecord, PreviewContent, ViewerState};
use egui::{Align2, Context, RichText, Ui};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerAction {
    Close,
    /// Hand the PDF scratch copy to the system viewer
    OpenExternal,
    Delete(FileId),
}

/// `TYPE • size • date` line under the file name
pub fn header_line(file: &FileRecord) -> String {
    format!(
        "{} • {} • {}",
        file.file_type().label(),
        format_file_size(file.size()),
        format_date(file.upload_date())
    )
}

/// Viewer modal component
pub struct ViewerModal;

impl ViewerModal {
    pub fn ui(ctx: &Context, state: &ViewerState, theme: &Theme) -> Option<ViewerAction> {
        let file = state.file()?;
        let mut action = None;
        let mut open = true;

        let screen = ctx.screen_rect();
        egui::Window::new("File Viewer")
            .id(egui::Id::new("viewer_modal"))
            .open(&mut open)
            .collapsible(false)
            .resizable(true)
            .default_size([screen.width() * 0.7, screen.height() * 0.7])
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    type_badge(ui, file.file_type());
                    ui.vertical(|ui| {
                        ui.strong(file.name());
                        ui.label(RichText::new(header_line(file)).color(theme.text_secondary).small());
                    });
                });
                ui.separator();

                egui::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .max_height((ui.available_height() - 40.0).max(80.0))
                    .show(ui, |ui| {
                        if let Some(a) = Self::body(ui, state, theme) {
                            action = Some(a);
                        }
                    });

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Close").clicked() {
                        action = Some(ViewerAction::Close);
                    }
                    let delete = ui.button(RichText::new("Delete").color(theme.error));
                    if delete.clicked() {
                        action = Some(ViewerAction::Delete(file.id().clone()));
                    }
                });
            });

        if !open {
            action = Some(ViewerAction::Close);
        }
        action
    }

    fn body(ui: &mut Ui, state: &ViewerState, theme: &Theme) -> Option<ViewerAction> {
        match state {
            ViewerState::Idle => None,
            ViewerState::Loading { .. } => {
                ui.vertical_centered(|ui| {
                    ui.add_space(24.0);
                    ui.spinner();
                    ui.label("Loading file...");
                });
                None
            }
            ViewerState::Errored { message, .. } => {
                ui.vertical_centered(|ui| {
                    ui.add_space(24.0);
                    ui.label(RichText::new(message).color(theme.error));
                });
                None
            }
            ViewerState::Displaying { content, .. } => Self::content(ui, content, theme),
        }
    }

    fn content(ui: &mut Ui, content: &PreviewContent, theme: &Theme) -> Option<ViewerAction> {
        match content {
            PreviewContent::Pdf(pdf) => {
                let mut action = None;
                ui.vertical_centered(|ui| {
                    ui.add_space(24.0);
                    ui.label(format!("PDF document ({})", format_file_size(pdf.len())));
                    ui.add_space(8.0);
                    if ui.button("Open in PDF viewer").clicked() {
                        action = Some(ViewerAction::OpenExternal);
                    }
                });
                action
            }
            PreviewContent::Text(text) | PreviewContent::Document(text) => {
                ui.add(egui::Label::new(RichText::new(&text.text).monospace()).wrap());
                if text.truncated {
                    ui.add_space(8.0);
                    ui.label(RichText::new("Preview truncated").italics().color(theme.warning));
                }
                None
            }
            PreviewContent::Unsupported { file_type, name, size } => {
                ui.vertical_centered(|ui| {
                    ui.add_space(24.0);
                    ui.heading(format!("{} file", file_type.label()));
                    ui.label(name);
                    ui.label(format_file_size(*size));
                    ui.add_space(8.0);
                    ui.label(
                        RichText::new("Preview is not available for this file type.")
                            .color(theme.text_secondary),
                    );
                });
                None
            }
            PreviewContent::MissingData => {
                ui.vertical_centered(|ui| {
                    ui.add_space(24.0);
                    ui.label(
                        RichText::new("The content of this file was not kept, so no preview can be shown.")
                            .color(theme.text_secondary),
                    );
                });
                None
            }
        }
    }
}
