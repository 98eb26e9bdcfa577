//! Configuration loaded from `~/.slipee/config.ini`.
//!
//! ```ini
//! [server]
//! listen = 0.0.0.0:8090
//!
//! [provider]
//! url = osm
//! timeout = 30
//!
//! [cache]
//! directory = ~/.slipee/cache
//!
//! [queue]
//! capacity = 64
//! delay_ms = 1000
//!
//! [overlay]
//! attribution = © OpenStreetMap contributors
//! marker_enabled = true
//!
//! [limits]
//! max_width = 2000
//! max_height = 2000
//! max_zoom = 23
//! ```

mod file;
mod parser;
mod settings;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    CacheSettings, ConfigFile, LimitsSettings, LoggingSettings, OverlaySettings,
    ProviderSettings, QueueSettings, ServerSettings, DEFAULT_LOG_FILE, DEFAULT_PORT,
    DEFAULT_TILE_URL,
};
