//! Confirmation dialogs

use egui::{Align2, Context, RichText, Window};

/// Result of dialog interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogResult<T> {
    /// Still open, nothing decided
    None,
    Ok(T),
    Cancel,
}

/// Common dialog trait
pub trait Dialog {
    type Output;
    fn ui(&mut self, ctx: &Context) -> DialogResult<Self::Output>;
    fn is_open(&self) -> bool;
    fn close(&mut self);
}

/// Yes/no confirmation carrying the value it confirms
pub struct ConfirmDialog<T> {
    pub open: bool,
    pub title: String,
    pub message: String,
    pub confirm_text: String,
    pub cancel_text: String,
    /// Red confirm button
    pub dangerous: bool,
    pub payload: T,
}

impl<T: Clone> ConfirmDialog<T> {
    /// Ask before removing `file_name` from the shelf
    pub fn new_delete(file_name: &str, payload: T) -> Self {
        Self {
            open: true,
            title: "Delete file".to_string(),
            message: format!("Remove \"{}\" from the list?", file_name),
            confirm_text: "Delete".to_string(),
            cancel_text: "Cancel".to_string(),
            dangerous: true,
            payload,
        }
    }
}

impl<T: Clone + PartialEq> Dialog for ConfirmDialog<T> {
    type Output = T;

    fn ui(&mut self, ctx: &Context) -> DialogResult<T> {
        if !self.open {
            return DialogResult::None;
        }

        let mut result = DialogResult::None;

        Window::new(&self.title)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                ui.label(&self.message);
                ui.add_space(16.0);

                ui.horizontal(|ui| {
                    let confirm_btn = if self.dangerous {
                        ui.button(RichText::new(&self.confirm_text).color(egui::Color32::RED))
                    } else {
                        ui.button(&self.confirm_text)
                    };

                    if confirm_btn.clicked() {
                        result = DialogResult::Ok(self.payload.clone());
                    }

                    if ui.button(&self.cancel_text).clicked() {
                        result = DialogResult::Cancel;
                    }
                });
            });

        if result != DialogResult::None {
            self.open = false;
        }
        result
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_dialog_text() {
        let dialog = ConfirmDialog::new_delete("report.pdf", 7u32);
        assert!(dialog.is_open());
        assert_eq!(dialog.message, "Remove \"report.pdf\" from the list?");
        assert!(dialog.dangerous);
    }

    #[test]
    fn test_pending_until_answered() {
        let mut dialog = ConfirmDialog::new_delete("a.txt", 1u32);
        let ctx = egui::Context::default();
        let mut result = DialogResult::Cancel;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            result = dialog.ui(ctx);
        });
        assert_eq!(result, DialogResult::None);
        assert!(dialog.is_open());

        dialog.close();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            result = dialog.ui(ctx);
        });
        assert_eq!(result, DialogResult::None);
        assert!(!dialog.is_open());
    }
}
