//! Pagination bar below the file table

use app_core::{AppState, ItemsPerPage, PageLink};
use egui::Ui;

/// Snapshot of the page state for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub items_per_page: ItemsPerPage,
    pub links: Vec<PageLink>,
    pub summary: String,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PaginationInfo {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            current_page: state.current_page(),
            total_pages: state.total_pages(),
            items_per_page: state.items_per_page(),
            links: state.page_links(),
            summary: state.summary().to_string(),
            has_prev: state.has_prev_page(),
            has_next: state.has_next_page(),
        }
    }

    /// Nothing to paginate
    pub fn is_hidden(&self) -> bool {
        self.total_pages == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    First,
    Prev,
    Next,
    Last,
    GoTo(usize),
    SetItemsPerPage(ItemsPerPage),
}

/// Pagination component
pub struct Pagination;

impl Pagination {
    pub fn ui(ui: &mut Ui, info: &PaginationInfo) -> Option<PageAction> {
        if info.is_hidden() {
            return None;
        }

        let mut action = None;

        ui.horizontal(|ui| {
            let mut selected = info.items_per_page;
            egui::ComboBox::from_label("per page")
                .selected_text(selected.to_string())
                .show_ui(ui, |ui| {
                    for option in ItemsPerPage::ALL {
                        ui.selectable_value(&mut selected, option, option.to_string());
                    }
                });
            if selected != info.items_per_page {
                action = Some(PageAction::SetItemsPerPage(selected));
            }

            ui.separator();
            ui.label(&info.summary);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                // Right to left: buttons are added last-first
                if ui.add_enabled(info.has_next, egui::Button::new("⏭")).on_hover_text("Last page").clicked() {
                    action = Some(PageAction::Last);
                }
                if ui.add_enabled(info.has_next, egui::Button::new("▶")).on_hover_text("Next page").clicked() {
                    action = Some(PageAction::Next);
                }

                for link in info.links.iter().rev() {
                    match *link {
                        PageLink::Page(n) => {
                            let current = n == info.current_page;
                            if ui.selectable_label(current, n.to_string()).clicked() && !current {
                                action = Some(PageAction::GoTo(n));
                            }
                        }
                        PageLink::Ellipsis => {
                            ui.label("…");
                        }
                    }
                }

                if ui.add_enabled(info.has_prev, egui::Button::new("◀")).on_hover_text("Previous page").clicked() {
                    action = Some(PageAction::Prev);
                }
                if ui.add_enabled(info.has_prev, egui::Button::new("⏮")).on_hover_text("First page").clicked() {
                    action = Some(PageAction::First);
                }
            });
        });

        action
    }
}

/// Apply a pagination action to the state
pub fn apply(state: &mut AppState, action: PageAction) {
    match action {
        PageAction::First => state.first_page(),
        PageAction::Prev => state.prev_page(),
        PageAction::Next => state.next_page(),
        PageAction::Last => state.last_page(),
        PageAction::GoTo(page) => state.go_to_page(page),
        PageAction::SetItemsPerPage(n) => state.set_items_per_page(n),
    }
}
