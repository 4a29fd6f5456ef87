//! Application configuration

use crate::pager::ItemsPerPage;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub catalog: CatalogConfig,
    pub viewer: ViewerConfig,
    pub intake: IntakeConfig,
    pub keybindings: HashMap<String, Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            catalog: CatalogConfig::default(),
            viewer: ViewerConfig::default(),
            intake: IntakeConfig::default(),
            keybindings: default_keybindings(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub theme: String,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            window_width: 1280,
            window_height: 800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Rows per page; one of 5, 10, 20, 50
    pub items_per_page: u32,
    pub confirm_delete: bool,
    /// Start with the two sample records of the demo
    pub seed_demo_files: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            items_per_page: ItemsPerPage::default().get() as u32,
            confirm_delete: true,
            seed_demo_files: true,
        }
    }
}

impl CatalogConfig {
    /// Configured page size, falling back to the default for values outside the fixed set
    pub fn items_per_page(&self) -> ItemsPerPage {
        ItemsPerPage::try_from(self.items_per_page).unwrap_or_else(|v| {
            tracing::warn!(
                "items_per_page = {} is not one of {:?}; using {}",
                v,
                ItemsPerPage::ALL.map(ItemsPerPage::get),
                ItemsPerPage::default().get()
            );
            ItemsPerPage::default()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Delay before a preview is shown
    pub simulated_latency_ms: u64,
    /// Text previews are cut after this many characters
    pub max_preview_chars: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            simulated_latency_ms: 250,
            max_preview_chars: 102_400,
        }
    }
}

impl ViewerConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Keep a handle to the content of previewable files
    pub retain_raw_data: bool,
    pub recursive_folders: bool,
    pub show_hidden: bool,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            retain_raw_data: true,
            recursive_folders: true,
            show_hidden: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a file, using defaults when it does not exist
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::info!("Configuration loaded from {:?}", config_path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a file
    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "FileShelf", "FileShelf")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }
}

fn default_keybindings() -> HashMap<String, Vec<String>> {
    let mut kb = HashMap::new();

    // Pages
    kb.insert("page.next".into(), vec!["Right".into(), "PageDown".into(), "l".into()]);
    kb.insert("page.prev".into(), vec!["Left".into(), "PageUp".into(), "h".into()]);
    kb.insert("page.first".into(), vec!["Home".into()]);
    kb.insert("page.last".into(), vec!["End".into()]);
    kb.insert("page.cycle_size".into(), vec!["s".into()]);

    // Uploads
    kb.insert("upload.files".into(), vec!["Ctrl+o".into()]);
    kb.insert("upload.folder".into(), vec!["Ctrl+Shift+o".into()]);

    // Viewer
    kb.insert("viewer.close".into(), vec!["Escape".into()]);

    // App
    kb.insert("app.exit".into(), vec!["Ctrl+q".into()]);

    kb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [catalog]
            items_per_page = 20

            [viewer]
            simulated_latency_ms = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.catalog.items_per_page().get(), 20);
        assert!(config.catalog.confirm_delete);
        assert_eq!(config.viewer.latency(), Duration::ZERO);
        assert_eq!(config.viewer.max_preview_chars, 102_400);
        assert_eq!(config.general.theme, "dark");
        assert!(config.keybindings.contains_key("page.next"));
    }

    #[test]
    fn test_invalid_page_size_falls_back() {
        let catalog = CatalogConfig {
            items_per_page: 7,
            ..Default::default()
        };
        assert_eq!(catalog.items_per_page(), ItemsPerPage::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.general.theme = "light".into();
        config.intake.retain_raw_data = false;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, AppConfig::default());
    }
}
