//! Uploaded file table (one page of the catalog)

use crate::theme::{badge_color, Theme};
use app_core::{format_date, format_file_size, FileId, FileRecord, FileType};
use egui::{Color32, RichText, Ui};

pub const EMPTY_MESSAGE: &str = "No files uploaded yet. Use the upload buttons above to get started.";

/// Row action picked by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableAction {
    View(FileId),
    Delete(FileId),
}

/// File table component
pub struct FileTable;

impl FileTable {
    /// Render the rows of the current page
    pub fn ui(ui: &mut Ui, rows: &[FileRecord], theme: &Theme) -> Option<TableAction> {
        if rows.is_empty() {
            ui.add_space(32.0);
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(EMPTY_MESSAGE).color(theme.text_secondary));
            });
            ui.add_space(32.0);
            return None;
        }

        let mut action = None;

        egui::Grid::new("file_table")
            .num_columns(5)
            .striped(true)
            .spacing([16.0, 8.0])
            .show(ui, |ui| {
                ui.strong("Name");
                ui.strong("Type");
                ui.strong("Size");
                ui.strong("Uploaded");
                ui.strong("Actions");
                ui.end_row();

                for record in rows {
                    ui.add(
                        egui::Label::new(record.name())
                            .wrap_mode(egui::TextWrapMode::Truncate),
                    )
                    .on_hover_text(record.name());
                    type_badge(ui, record.file_type());
                    ui.label(format_file_size(record.size()));
                    ui.label(format_date(record.upload_date()));

                    ui.horizontal(|ui| {
                        if ui.button("View").clicked() {
                            action = Some(TableAction::View(record.id().clone()));
                        }
                        let delete = ui.button(RichText::new("Delete").color(theme.error));
                        if delete.clicked() {
                            action = Some(TableAction::Delete(record.id().clone()));
                        }
                    });
                    ui.end_row();
                }
            });

        action
    }
}

/// Colored pill with the type label
pub fn type_badge(ui: &mut Ui, file_type: FileType) {
    egui::Frame::none()
        .fill(badge_color(file_type))
        .rounding(8.0)
        .inner_margin(egui::Margin::symmetric(8.0, 2.0))
        .show(ui, |ui| {
            ui.label(RichText::new(file_type.label()).color(Color32::WHITE).small().strong());
        });
}
