//! Configuration structures and loading logic.

use crate::config::modes::{AudioQuality, SubtitleSelection, VideoQuality};
use crate::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub portal: PortalConfig,

    #[serde(default)]
    pub account: AccountConfig,

    #[serde(default)]
    pub browser: BrowserConfig,
}

/// Download options configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Preferred video resolution (low, mid, high).
    #[serde(default)]
    pub video_quality: VideoQuality,

    /// Audio container for audio-only recordings (m4a, mpeg, ogg).
    #[serde(default)]
    pub audio_quality: AudioQuality,

    /// Subtitle languages to fetch, `"none"` or `"all"`.
    #[serde(default)]
    pub subtitles: SubtitleSelection,

    /// Base directory for downloads.
    #[serde(default)]
    pub save_directory: Option<PathBuf>,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            video_quality: VideoQuality::default(),
            audio_quality: AudioQuality::default(),
            subtitles: SubtitleSelection::default(),
            save_directory: None,
        }
    }
}

/// Video portal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Portal root, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Browser user agent string, used for both the browser and direct requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Name of the institution as listed by the identity provider picker.
    #[serde(default = "default_identity_provider")]
    pub identity_provider: String,

    /// GraphQL document used for collection metadata (overrides the built-in one).
    #[serde(default)]
    pub metadata_query: Option<String>,

    /// Seconds to wait for a classification probe.
    #[serde(default = "default_timeout_secs")]
    pub classify_timeout_secs: u64,

    /// Seconds to wait for login forms and post-login indicators.
    #[serde(default = "default_timeout_secs")]
    pub login_timeout_secs: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            identity_provider: default_identity_provider(),
            metadata_query: None,
            classify_timeout_secs: default_timeout_secs(),
            login_timeout_secs: default_timeout_secs(),
        }
    }
}

impl PortalConfig {
    pub fn classify_timeout(&self) -> Duration {
        Duration::from_secs(self.classify_timeout_secs)
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }
}

/// Institution account configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Institution username. The password is never stored in the config.
    #[serde(default)]
    pub username: Option<String>,

    /// Read the institution password from piped stdin instead of prompting.
    #[serde(skip)]
    pub password_from_stdin: bool,
}

/// Browser launch configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Path to a Chrome/Chromium binary; auto-detected when unset.
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// Run without a visible window.
    #[serde(default)]
    pub headless: bool,
}

fn default_base_url() -> String {
    "https://video.ethz.ch".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36".to_string()
}

fn default_identity_provider() -> String {
    "ETH Zurich".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Per-user configuration directory (`~/.config/eth-videoz` on Linux).
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "eth-videoz").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Default location of the settings file.
pub fn default_config_path() -> PathBuf {
    config_dir()
        .map(|dir| dir.join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!("Configuration file not found: {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Get the effective save directory.
    pub fn save_directory(&self) -> PathBuf {
        self.options.save_directory.clone().unwrap_or_else(|| {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("lecture_recordings")
        })
    }

    /// Portal base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.portal.base_url.trim_end_matches('/')
    }
}
