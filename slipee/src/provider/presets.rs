//! Well-known tile servers.
//!
//! Lets configuration name a server (`osm`, `arcgis`, `usgs`) instead of
//! spelling out its URL template.
//!
//! | Preset   | Imagery                 | Max zoom | Coverage      |
//! |----------|-------------------------|----------|---------------|
//! | `osm`    | OpenStreetMap Carto     | 19       | Global        |
//! | `arcgis` | ArcGIS World Imagery    | 19       | Global        |
//! | `usgs`   | USGS Imagery Only       | 16       | United States |
//!
//! Each server has its own usage policy. OpenStreetMap in particular forbids
//! heavy use of its public tile servers, which is what the politeness delay
//! of the generation worker is for.

use std::fmt;
use std::str::FromStr;

use super::template::UrlTemplate;
use super::types::ProviderError;

/// Named tile server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TilePreset {
    OpenStreetMap,
    ArcGisImagery,
    UsgsImagery,
}

impl TilePreset {
    /// All presets, in display order.
    pub const ALL: [TilePreset; 3] = [
        TilePreset::OpenStreetMap,
        TilePreset::ArcGisImagery,
        TilePreset::UsgsImagery,
    ];

    /// Short name accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            TilePreset::OpenStreetMap => "osm",
            TilePreset::ArcGisImagery => "arcgis",
            TilePreset::UsgsImagery => "usgs",
        }
    }

    /// URL template of the server.
    pub fn template(&self) -> &'static str {
        match self {
            TilePreset::OpenStreetMap => "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
            // Row before column
            TilePreset::ArcGisImagery => {
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
            }
            TilePreset::UsgsImagery => {
                "https://basemap.nationalmap.gov/arcgis/rest/services/USGSImageryOnly/MapServer/tile/{z}/{y}/{x}"
            }
        }
    }

    /// Highest zoom level the server has tiles for.
    pub fn max_zoom(&self) -> u8 {
        match self {
            TilePreset::OpenStreetMap => 19,
            TilePreset::ArcGisImagery => 19,
            TilePreset::UsgsImagery => 16,
        }
    }

    /// Attribution text the server asks users to display.
    pub fn attribution(&self) -> &'static str {
        match self {
            TilePreset::OpenStreetMap => "© OpenStreetMap contributors",
            TilePreset::ArcGisImagery => "Esri, Maxar, Earthstar Geographics",
            TilePreset::UsgsImagery => "USGS The National Map",
        }
    }
}

impl fmt::Display for TilePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TilePreset {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "osm" | "openstreetmap" => Ok(TilePreset::OpenStreetMap),
            "arcgis" | "esri" => Ok(TilePreset::ArcGisImagery),
            "usgs" => Ok(TilePreset::UsgsImagery),
            other => Err(ProviderError::InvalidTemplate(format!(
                "unknown tile server preset '{}'",
                other
            ))),
        }
    }
}

/// Resolves either a preset name or a literal URL template.
pub fn resolve_template(value: &str) -> Result<UrlTemplate, ProviderError> {
    match value.parse::<TilePreset>() {
        Ok(preset) => UrlTemplate::parse(preset.template()),
        Err(_) => UrlTemplate::parse(value),
    }
}
