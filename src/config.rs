use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default)]
    pub photos: PhotosConfig,

    #[serde(default)]
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotosConfig {
    #[serde(default = "default_photos_path")]
    pub path: PathBuf,

    /// JPEG re-encode quality (1-100).
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_photos_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join("meeplebox/photos")
}

fn default_jpeg_quality() -> u8 {
    70
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            path: default_photos_path(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Default answer when the permission question has not been asked yet.
    #[serde(default = "default_notifications_enabled")]
    pub enabled: bool,

    /// How often the daemon checks for due notifications (seconds).
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_notifications_enabled() -> bool {
    true
}

fn default_poll_interval_secs() -> u64 {
    60
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: default_notifications_enabled(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("meeplebox")
        .join("meeplebox.db")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            photos: PhotosConfig::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            // Create default config
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("meeplebox")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.photos.jpeg_quality, 70);
        assert!(config.notifications.enabled);
        assert_eq!(config.notifications.poll_interval_secs, 60);
        assert!(config.db_path.ends_with("meeplebox/meeplebox.db"));
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config: Config = toml::from_str(
            r#"
            db_path = "/tmp/test/box.db"

            [notifications]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/test/box.db"));
        assert!(!config.notifications.enabled);
        // Untouched sections keep their defaults.
        assert_eq!(config.notifications.poll_interval_secs, 60);
        assert_eq!(config.photos.jpeg_quality, 70);
    }

    #[test]
    fn test_load_from_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.db_path = dir.path().join("box.db");
        config.photos.jpeg_quality = 85;
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.db_path, config.db_path);
        assert_eq!(loaded.photos.jpeg_quality, 85);
    }

    #[test]
    fn test_load_from_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from(&dir.path().join("absent.toml")).is_err());
    }
}
