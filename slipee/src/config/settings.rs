//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use super::file::config_directory;
use crate::provider::{TilePreset, DEFAULT_TIMEOUT_SECS};
use crate::request::{RequestLimits, DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, DEFAULT_MAX_ZOOM};
use crate::service::{ServiceConfig, DEFAULT_POLITENESS_DELAY, DEFAULT_QUEUE_CAPACITY};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8090;

/// Default tile server, a preset name or URL template.
pub const DEFAULT_TILE_URL: &str = "osm";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "slipee.log";

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    pub cache: CacheSettings,
    pub queue: QueueSettings,
    pub overlay: OverlaySettings,
    pub limits: LimitsSettings,
    pub logging: LoggingSettings,
}

/// `[server]`
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub listen: SocketAddr,
}

/// `[provider]`
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    /// Preset name (`osm`, `arcgis`, `usgs`) or URL template
    pub url: String,
    /// Overrides the default User-Agent
    pub user_agent: Option<String>,
    /// Request timeout in seconds
    pub timeout: u64,
}

/// `[cache]`
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    pub directory: PathBuf,
}

/// `[queue]`
#[derive(Debug, Clone, PartialEq)]
pub struct QueueSettings {
    /// Requests the queue holds, at least 1
    pub capacity: usize,
    /// Pause between generations in milliseconds
    pub delay_ms: u64,
}

/// `[overlay]`
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySettings {
    /// Text appended to every label
    pub attribution: Option<String>,
    /// TrueType/OpenType font for label text; the bundled face when unset
    pub font: Option<PathBuf>,
    /// Image used instead of the built-in marker
    pub marker: Option<PathBuf>,
    pub marker_enabled: bool,
}

/// `[limits]`
#[derive(Debug, Clone, PartialEq)]
pub struct LimitsSettings {
    pub max_width: u32,
    pub max_height: u32,
    pub max_zoom: u8,
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            provider: ProviderSettings::default(),
            cache: CacheSettings::default(),
            queue: QueueSettings::default(),
            overlay: OverlaySettings::default(),
            limits: LimitsSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_TILE_URL.to_string(),
            user_agent: None,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            directory: config_directory().join("cache"),
        }
    }
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_QUEUE_CAPACITY,
            delay_ms: DEFAULT_POLITENESS_DELAY.as_millis() as u64,
        }
    }
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            attribution: None,
            font: None,
            marker: None,
            marker_enabled: true,
        }
    }
}

impl Default for LimitsSettings {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: config_directory().join("logs"),
            file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl LimitsSettings {
    pub fn to_limits(&self) -> RequestLimits {
        RequestLimits {
            max_width: self.max_width,
            max_height: self.max_height,
            max_zoom: self.max_zoom,
        }
    }
}

impl ConfigFile {
    /// Request limits from `[limits]`, with the zoom capped at what a preset
    /// tile server has tiles for.
    pub fn request_limits(&self) -> RequestLimits {
        let mut limits = self.limits.to_limits();
        if let Ok(preset) = self.provider.url.parse::<TilePreset>() {
            limits.max_zoom = limits.max_zoom.min(preset.max_zoom());
        }
        limits
    }

    /// Service settings derived from the `[cache]`, `[queue]`, `[limits]`
    /// and `[provider]` sections.
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig::new(self.cache.directory.clone())
            .with_queue_capacity(self.queue.capacity)
            .with_politeness_delay(Duration::from_millis(self.queue.delay_ms))
            .with_limits(self.request_limits())
    }
}
