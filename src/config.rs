use crate::session::ViewKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// What a tab shows as its title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabTitle {
    /// Final path component
    #[default]
    Name,
    /// Full filename as the backend reports it
    Path,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Show status bar
    #[serde(default = "default_true")]
    pub show_status_bar: bool,
    #[serde(default)]
    pub tab_title: TabTitle,
    /// Input poll interval in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Directory the open dialog starts in (empty = current directory)
    #[serde(default)]
    pub start_dir: Option<PathBuf>,
    /// Show hidden files
    #[serde(default)]
    pub show_hidden: bool,
    /// File extensions the open dialog lists
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// View new tabs open in
    #[serde(default)]
    pub default_view: ViewKind,
}

// Default value helpers
fn default_true() -> bool {
    true
}
fn default_tick_ms() -> u64 {
    100
}
fn default_extensions() -> Vec<String> {
    vec!["json".to_string()]
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_status_bar: true,
            tab_title: TabTitle::Name,
            tick_ms: default_tick_ms(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            start_dir: None,
            show_hidden: false,
            extensions: default_extensions(),
        }
    }
}

impl BrowserConfig {
    /// Whether the open dialog lists `path`
    pub fn accepts(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

impl Config {
    /// Load configuration from `path`, or the default config file location.
    ///
    /// A missing or unreadable file yields the defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(Self::config_path) {
            Some(path) => path,
            None => return Self::default(),
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::read(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config {}: {:#}", path.display(), e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Get the path to the config file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dbcview").join("config.toml"))
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save configuration to `path`, or the default config file location.
    /// Returns where it was written.
    pub fn save(&self, path: Option<&Path>) -> anyhow::Result<PathBuf> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(Self::config_path)
            .ok_or_else(|| anyhow::anyhow!("no config directory on this platform"))?;
        self.save_to(&path)?;
        Ok(path)
    }
}
