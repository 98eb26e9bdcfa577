//! Tile URL templates.
//!
//! Tile servers are commonly addressed with templates such as
//! `https://tile.openstreetmap.org/{z}/{x}/{y}.png`. Other tools write the
//! same placeholders as `${z}`, `${X}` and so on, so placeholders are matched
//! case-insensitively with an optional leading `$`.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::types::ProviderError;
use crate::coord::TileCoord;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$?\{([zZxXyY])\}").expect("placeholder regex is valid"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Zoom,
    X,
    Y,
}

/// A parsed tile URL template.
///
/// # Example
///
/// ```
/// use slipee::provider::UrlTemplate;
///
/// let template = UrlTemplate::parse("https://tiles.example/${z}/{X}/{y}.png").unwrap();
/// assert_eq!(template.render(9, 131, 190), "https://tiles.example/9/131/190.png");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    segments: Vec<Segment>,
}

impl UrlTemplate {
    /// Parses a template string.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InvalidTemplate` if the template is blank or
    /// contains no placeholder at all, since every tile would then map to
    /// the same URL.
    pub fn parse(template: &str) -> Result<Self, ProviderError> {
        if template.trim().is_empty() {
            return Err(ProviderError::InvalidTemplate(
                "template is empty".to_string(),
            ));
        }

        let mut segments = Vec::new();
        let mut last = 0;

        for caps in placeholder_regex().captures_iter(template) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(template[last..whole.start()].to_string()));
            }
            segments.push(match name.as_str() {
                "z" | "Z" => Segment::Zoom,
                "x" | "X" => Segment::X,
                _ => Segment::Y,
            });
            last = whole.end();
        }

        if last < template.len() {
            segments.push(Segment::Literal(template[last..].to_string()));
        }

        if segments.iter().all(|s| matches!(s, Segment::Literal(_))) {
            return Err(ProviderError::InvalidTemplate(format!(
                "'{}' has no {{z}}, {{x}} or {{y}} placeholder",
                template
            )));
        }

        Ok(Self { segments })
    }

    /// Substitutes zoom, x and y, in that argument order.
    pub fn render(&self, zoom: u8, x: i64, y: i64) -> String {
        let mut url = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => url.push_str(text),
                Segment::Zoom => url.push_str(&zoom.to_string()),
                Segment::X => url.push_str(&x.to_string()),
                Segment::Y => url.push_str(&y.to_string()),
            }
        }
        url
    }

    /// Renders the URL for a tile.
    pub fn url_for(&self, tile: TileCoord) -> String {
        self.render(tile.zoom, tile.x, tile.y)
    }
}

/// Writes the template back in normalized `{z}/{x}/{y}` form.
impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => f.write_str(text)?,
                Segment::Zoom => f.write_str("{z}")?,
                Segment::X => f.write_str("{x}")?,
                Segment::Y => f.write_str("{y}")?,
            }
        }
        Ok(())
    }
}
