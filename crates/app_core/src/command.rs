//! Command system for user actions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Command identifier, as used in the keybinding table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandId(pub String);

impl CommandId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Page commands
    pub const PAGE_NEXT: &'static str = "page.next";
    pub const PAGE_PREV: &'static str = "page.prev";
    pub const PAGE_FIRST: &'static str = "page.first";
    pub const PAGE_LAST: &'static str = "page.last";
    pub const PAGE_CYCLE_SIZE: &'static str = "page.cycle_size";

    // Upload commands
    pub const UPLOAD_FILES: &'static str = "upload.files";
    pub const UPLOAD_FOLDER: &'static str = "upload.folder";

    // Viewer commands
    pub const VIEWER_CLOSE: &'static str = "viewer.close";

    // App commands
    pub const APP_EXIT: &'static str = "app.exit";
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Action triggered from the keyboard or a button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    CyclePageSize,
    UploadFiles,
    UploadFolder,
    CloseViewer,
    Exit,
}

impl Command {
    pub const ALL: [Command; 9] = [
        Command::NextPage,
        Command::PrevPage,
        Command::FirstPage,
        Command::LastPage,
        Command::CyclePageSize,
        Command::UploadFiles,
        Command::UploadFolder,
        Command::CloseViewer,
        Command::Exit,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Command::NextPage => CommandId::PAGE_NEXT,
            Command::PrevPage => CommandId::PAGE_PREV,
            Command::FirstPage => CommandId::PAGE_FIRST,
            Command::LastPage => CommandId::PAGE_LAST,
            Command::CyclePageSize => CommandId::PAGE_CYCLE_SIZE,
            Command::UploadFiles => CommandId::UPLOAD_FILES,
            Command::UploadFolder => CommandId::UPLOAD_FOLDER,
            Command::CloseViewer => CommandId::VIEWER_CLOSE,
            Command::Exit => CommandId::APP_EXIT,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_ids_round_trip() {
        for cmd in Command::ALL {
            assert_eq!(Command::from_id(cmd.id()), Some(cmd));
        }
        assert_eq!(Command::from_id("nav.next_item"), None);
    }

    #[test]
    fn test_default_keybindings_are_known_commands() {
        let config = AppConfig::default();
        for id in config.keybindings.keys() {
            assert!(Command::from_id(id).is_some(), "unknown command {}", id);
        }
        assert_eq!(config.keybindings.len(), Command::ALL.len());
    }
}
