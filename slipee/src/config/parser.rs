//! INI parsing for [`ConfigFile`].
//!
//! Unknown sections and keys are ignored. Blank values keep the default.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::{ConfigFile, ConfigFileError};
use crate::provider::resolve_template;

/// Highest zoom whose pixel coordinates still fit the grid arithmetic.
const MAX_SUPPORTED_ZOOM: u8 = 30;

/// Parse a loaded INI document into configuration, starting from defaults.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [server] section
    if let Some(section) = ini.section(Some("server")) {
        if let Some(v) = non_empty(section.get("listen")) {
            config.server.listen = parse_value("server", "listen", v, "must be host:port")?;
        }
    }

    // [provider] section
    if let Some(section) = ini.section(Some("provider")) {
        if let Some(v) = non_empty(section.get("url")) {
            resolve_template(v).map_err(|e| ConfigFileError::InvalidValue {
                section: "provider".to_string(),
                key: "url".to_string(),
                value: v.to_string(),
                reason: e.to_string(),
            })?;
            config.provider.url = v.to_string();
        }
        if let Some(v) = non_empty(section.get("user_agent")) {
            config.provider.user_agent = Some(v.to_string());
        }
        if let Some(v) = non_empty(section.get("timeout")) {
            let timeout: u64 =
                parse_value("provider", "timeout", v, "must be a positive integer")?;
            if timeout == 0 {
                return Err(invalid("provider", "timeout", v, "must be at least 1 second"));
            }
            config.provider.timeout = timeout;
        }
    }

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = non_empty(section.get("directory")) {
            config.cache.directory = expand_tilde(v);
        }
    }

    // [queue] section
    if let Some(section) = ini.section(Some("queue")) {
        if let Some(v) = non_empty(section.get("capacity")) {
            let capacity: usize =
                parse_value("queue", "capacity", v, "must be a positive integer")?;
            if capacity == 0 {
                return Err(invalid("queue", "capacity", v, "must be at least 1"));
            }
            config.queue.capacity = capacity;
        }
        if let Some(v) = non_empty(section.get("delay_ms")) {
            config.queue.delay_ms =
                parse_value("queue", "delay_ms", v, "must be a non-negative integer")?;
        }
    }

    // [overlay] section
    if let Some(section) = ini.section(Some("overlay")) {
        if let Some(v) = non_empty(section.get("attribution")) {
            config.overlay.attribution = Some(v.to_string());
        }
        if let Some(v) = non_empty(section.get("font")) {
            config.overlay.font = Some(expand_tilde(v));
        }
        if let Some(v) = non_empty(section.get("marker")) {
            config.overlay.marker = Some(expand_tilde(v));
        }
        if let Some(v) = non_empty(section.get("marker_enabled")) {
            config.overlay.marker_enabled = parse_bool(v);
        }
    }

    // [limits] section
    if let Some(section) = ini.section(Some("limits")) {
        if let Some(v) = non_empty(section.get("max_width")) {
            config.limits.max_width =
                parse_value("limits", "max_width", v, "must be a positive integer")?;
        }
        if let Some(v) = non_empty(section.get("max_height")) {
            config.limits.max_height =
                parse_value("limits", "max_height", v, "must be a positive integer")?;
        }
        if let Some(v) = non_empty(section.get("max_zoom")) {
            let max_zoom: u8 =
                parse_value("limits", "max_zoom", v, "must be an integer from 0 to 30")?;
            if max_zoom > MAX_SUPPORTED_ZOOM {
                return Err(invalid("limits", "max_zoom", v, "must be an integer from 0 to 30"));
            }
            config.limits.max_zoom = max_zoom;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section.get("directory")) {
            config.logging.directory = expand_tilde(v);
        }
        if let Some(v) = non_empty(section.get("file")) {
            config.logging.file = v.to_string();
        }
    }

    Ok(config)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_value<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a boolean value from a config string.
///
/// `true`, `1`, `yes` and `on` are true; anything else is false.
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let ini = Ini::load_from_str(content).unwrap();
        parse_ini(&ini)
    }

    fn invalid_key(result: Result<ConfigFile, ConfigFileError>) -> String {
        match result {
            Err(ConfigFileError::InvalidValue { section, key, .. }) => format!("{section}.{key}"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_full_document() {
        let config = parse(
            "[server]\n\
             listen = 127.0.0.1:9000\n\
             [provider]\n\
             url = https://tiles.example.com/{z}/{x}/{y}.png\n\
             user_agent = test-agent/1.0\n\
             timeout = 5\n\
             [queue]\n\
             capacity = 2\n\
             delay_ms = 0\n\
             [overlay]\n\
             attribution = Example\n\
             marker_enabled = no\n\
             [limits]\n\
             max_width = 640\n\
             max_height = 480\n\
             max_zoom = 18\n\
             [logging]\n\
             file = maps.log\n",
        )
        .unwrap();

        assert_eq!(config.server.listen.port(), 9000);
        assert_eq!(
            config.provider.url,
            "https://tiles.example.com/{z}/{x}/{y}.png"
        );
        assert_eq!(config.provider.user_agent.as_deref(), Some("test-agent/1.0"));
        assert_eq!(config.provider.timeout, 5);
        assert_eq!(config.queue.capacity, 2);
        assert_eq!(config.queue.delay_ms, 0);
        assert_eq!(config.overlay.attribution.as_deref(), Some("Example"));
        assert!(!config.overlay.marker_enabled);
        assert_eq!(config.limits.max_width, 640);
        assert_eq!(config.limits.max_height, 480);
        assert_eq!(config.limits.max_zoom, 18);
        assert_eq!(config.logging.file, "maps.log");
    }

    #[test]
    fn test_preset_url_accepted() {
        let config = parse("[provider]\nurl = arcgis\n").unwrap();
        assert_eq!(config.provider.url, "arcgis");
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let config = parse("[provider]\nurl =\n[queue]\ncapacity =   \n").unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(invalid_key(parse("[server]\nlisten = nowhere\n")), "server.listen");
        assert_eq!(invalid_key(parse("[provider]\nurl = plain-text\n")), "provider.url");
        assert_eq!(invalid_key(parse("[provider]\ntimeout = 0\n")), "provider.timeout");
        assert_eq!(invalid_key(parse("[queue]\ncapacity = 0\n")), "queue.capacity");
        assert_eq!(invalid_key(parse("[queue]\ndelay_ms = -1\n")), "queue.delay_ms");
        assert_eq!(invalid_key(parse("[limits]\nmax_zoom = 300\n")), "limits.max_zoom");
        assert_eq!(invalid_key(parse("[limits]\nmax_zoom = 31\n")), "limits.max_zoom");
    }

    #[test]
    fn test_parse_bool_values() {
        for v in ["true", "TRUE", "1", "yes", "on", " on "] {
            assert!(parse_bool(v), "{v}");
        }
        for v in ["false", "0", "no", "off", "maybe"] {
            assert!(!parse_bool(v), "{v}");
        }
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_tilde("relative"), PathBuf::from("relative"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/maps"), home.join("maps"));
        }
    }
}
