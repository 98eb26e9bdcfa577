//! Configuration file handling for ~/.slipee/config.ini.
//!
//! A missing file means defaults. Settings structs live in
//! [`super::settings`], parsing in [`super::parser`].

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use super::settings::*;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigFile {
    /// Load configuration from the default path (~/.slipee/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Parse configuration from INI text.
    pub fn from_ini_str(content: &str) -> Result<Self, ConfigFileError> {
        let ini = Ini::load_from_str(content).map_err(ini::Error::Parse)?;
        super::parser::parse_ini(&ini)
    }
}

/// Get the path to the config directory (~/.slipee).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".slipee")
}

/// Get the path to the config file (~/.slipee/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestLimits;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert_eq!(config.server.listen.port(), 8090);
        assert_eq!(config.provider.url, "osm");
        assert!(config.provider.user_agent.is_none());
        assert_eq!(config.queue.capacity, 64);
        assert_eq!(config.queue.delay_ms, 1000);
        assert!(config.overlay.marker_enabled);
        assert_eq!(config.limits.to_limits(), RequestLimits::default());
        assert!(config.cache.directory.ends_with(".slipee/cache"));
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(
            &config_path,
            "[queue]\ncapacity = 4\ndelay_ms = 250\n\n[cache]\ndirectory = /srv/maps\n",
        )
        .unwrap();

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config.queue.capacity, 4);
        assert_eq!(config.cache.directory, PathBuf::from("/srv/maps"));

        let service = config.service_config();
        assert_eq!(service.queue_capacity(), 4);
        assert_eq!(service.politeness_delay(), Duration::from_millis(250));
        assert_eq!(service.cache_root(), &PathBuf::from("/srv/maps"));
    }

    #[test]
    fn test_from_ini_str() {
        let config = ConfigFile::from_ini_str("[overlay]\nattribution = Tiles by me\n").unwrap();
        assert_eq!(config.overlay.attribution.as_deref(), Some("Tiles by me"));
        assert_eq!(config.queue, ConfigFile::default().queue);
    }

    #[test]
    fn test_preset_caps_max_zoom() {
        let usgs = ConfigFile::from_ini_str("[provider]\nurl = usgs\n").unwrap();
        assert_eq!(usgs.request_limits().max_zoom, 16);
        assert_eq!(usgs.service_config().limits().max_zoom, 16);

        let osm = ConfigFile::default();
        assert_eq!(osm.request_limits().max_zoom, 19);

        let low = ConfigFile::from_ini_str("[provider]\nurl = usgs\n[limits]\nmax_zoom = 12\n")
            .unwrap();
        assert_eq!(low.request_limits().max_zoom, 12);

        let custom = ConfigFile::from_ini_str(
            "[provider]\nurl = https://tiles.example.com/{z}/{x}/{y}.png\n",
        )
        .unwrap();
        assert_eq!(custom.request_limits(), RequestLimits::default());
    }

    #[test]
    fn test_load_invalid_value_fails() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, "[limits]\nmax_zoom = lots\n").unwrap();

        let err = ConfigFile::load_from(&config_path).unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidValue { ref key, .. } if key == "max_zoom"));
    }
}
