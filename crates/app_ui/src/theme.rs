//! Application theming

use app_core::FileType;
use egui::{Color32, Visuals};

/// Application theme
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub surface: Color32,
    pub primary: Color32,
    pub text: Color32,
    pub text_secondary: Color32,
    pub accent: Color32,
    pub error: Color32,
    pub warning: Color32,
    pub success: Color32,
}

impl Theme {
    /// Dark theme (default), slate palette
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color32::from_rgb(15, 23, 42),
            surface: Color32::from_rgb(30, 41, 59),
            primary: Color32::from_rgb(51, 65, 85),
            text: Color32::from_rgb(241, 245, 249),
            text_secondary: Color32::from_rgb(148, 163, 184),
            accent: Color32::from_rgb(96, 165, 250),
            error: Color32::from_rgb(248, 113, 113),
            warning: Color32::from_rgb(251, 191, 36),
            success: Color32::from_rgb(74, 222, 128),
        }
    }

    /// Light theme, gray-50 page with white cards
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color32::from_rgb(249, 250, 251),
            surface: Color32::WHITE,
            primary: Color32::from_rgb(229, 231, 235),
            text: Color32::from_rgb(17, 24, 39),
            text_secondary: Color32::from_rgb(107, 114, 128),
            accent: Color32::from_rgb(37, 99, 235),
            error: Color32::from_rgb(220, 38, 38),
            warning: Color32::from_rgb(217, 119, 6),
            success: Color32::from_rgb(22, 163, 74),
        }
    }

    pub fn is_dark(&self) -> bool {
        self.name == "dark"
    }

    /// Apply theme to egui
    pub fn apply(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();
        let mut visuals = if self.is_dark() {
            Visuals::dark()
        } else {
            Visuals::light()
        };

        visuals.panel_fill = self.surface;
        visuals.window_fill = self.surface;
        visuals.extreme_bg_color = self.background;
        visuals.faint_bg_color = self.primary;

        visuals.widgets.noninteractive.bg_fill = self.surface;
        visuals.widgets.noninteractive.fg_stroke.color = self.text;

        visuals.widgets.inactive.bg_fill = self.primary;
        visuals.widgets.inactive.fg_stroke.color = self.text;

        visuals.widgets.hovered.bg_fill = self.accent.linear_multiply(0.3);
        visuals.widgets.hovered.fg_stroke.color = self.text;

        visuals.widgets.active.bg_fill = self.accent.linear_multiply(0.5);
        visuals.widgets.active.fg_stroke.color = self.text;

        visuals.selection.bg_fill = self.accent.linear_multiply(0.3);
        visuals.selection.stroke.color = self.accent;
        visuals.window_rounding = egui::Rounding::same(8.0);
        visuals.error_fg_color = self.error;
        visuals.warn_fg_color = self.warning;

        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.button_padding = egui::vec2(10.0, 4.0);

        style.visuals = visuals;
        ctx.set_style(style);
    }

    /// Get theme by name
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }
}

/// Fill color of the file type badge
pub fn badge_color(file_type: FileType) -> Color32 {
    match file_type {
        FileType::Pdf => Color32::from_rgb(239, 68, 68),
        FileType::Doc | FileType::Docx => Color32::from_rgb(59, 130, 246),
        FileType::Xls | FileType::Xlsx | FileType::Csv => Color32::from_rgb(34, 197, 94),
        FileType::Ppt | FileType::Pptx => Color32::from_rgb(249, 115, 22),
        FileType::Txt => Color32::from_rgb(107, 114, 128),
        FileType::Other => Color32::from_rgb(168, 85, 247),
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert_eq!(Theme::by_name("Light").name, "light");
        assert_eq!(Theme::by_name("solarized").name, "dark");
        assert!(Theme::default().is_dark());
    }

    #[test]
    fn test_apply_switches_visuals() {
        let ctx = egui::Context::default();
        Theme::light().apply(&ctx);
        assert!(!ctx.style().visuals.dark_mode);
        assert_eq!(ctx.style().visuals.panel_fill, Color32::WHITE);
        Theme::dark().apply(&ctx);
        assert!(ctx.style().visuals.dark_mode);
    }

    #[test]
    fn test_badge_colors_follow_families() {
        assert_eq!(badge_color(FileType::Doc), badge_color(FileType::Docx));
        assert_eq!(badge_color(FileType::Xlsx), badge_color(FileType::Csv));
        assert_eq!(badge_color(FileType::Ppt), badge_color(FileType::Pptx));
        assert_ne!(badge_color(FileType::Pdf), badge_color(FileType::Other));
        assert_eq!(badge_color(FileType::Pdf), Color32::from_rgb(239, 68, 68));
    }
}
