//! UI Components

pub mod dialogs;
pub mod file_table;
pub mod pagination;
pub mod status_bar;
pub mod upload_panel;
pub mod viewer_modal;

pub use dialogs::{ConfirmDialog, Dialog, DialogResult};
pub use file_table::{type_badge, FileTable, TableAction, EMPTY_MESSAGE};
pub use pagination::{PageAction, Pagination, PaginationInfo};
pub use status_bar::{StatusBar, StatusInfo};
pub use upload_panel::{pick_files, pick_folder, JobStatus, UploadAction, UploadPanel};
pub use viewer_modal::{header_line, ViewerAction, ViewerModal};
