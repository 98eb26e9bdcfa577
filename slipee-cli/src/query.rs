//! Query parameters of `/staticmap`.
//!
//! A missing parameter takes its default; a present one must parse. Range
//! checks happen later in [`MapRequest::validate`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use slipee::request::MapRequest;

pub const DEFAULT_WIDTH: u32 = 400;
pub const DEFAULT_HEIGHT: u32 = 300;
pub const DEFAULT_ZOOM: u8 = 12;

/// A query parameter that could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryError {
    key: &'static str,
    value: String,
    expected: &'static str,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: '{}' is not {}", self.key, self.value, self.expected)
    }
}

impl std::error::Error for QueryError {}

/// Parsed `/staticmap` query.
#[derive(Debug, Clone, PartialEq)]
pub struct MapQuery {
    pub request: MapRequest,
    /// Generate synchronously instead of queueing
    pub bypass: bool,
}

impl MapQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, QueryError> {
        let width = param(params, "width", DEFAULT_WIDTH, "a non-negative integer")?;
        let height = param(params, "height", DEFAULT_HEIGHT, "a non-negative integer")?;
        let zoom = param(params, "zoom", DEFAULT_ZOOM, "an integer from 0 to 255")?;
        let lat = param(params, "lat", 0.0, "a number")?;
        let long = param(params, "long", 0.0, "a number")?;
        let label = params.get("label").cloned().unwrap_or_default();

        Ok(Self {
            request: MapRequest::new(width, height, zoom, lat, long, label),
            bypass: params.contains_key("bypass"),
        })
    }
}

fn param<T: FromStr>(
    params: &HashMap<String, String>,
    key: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, QueryError> {
    match params.get(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| QueryError {
            key,
            value: value.clone(),
            expected,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let query = MapQuery::from_params(&HashMap::new()).unwrap();
        assert_eq!(query.request, MapRequest::new(400, 300, 12, 0.0, 0.0, ""));
        assert!(!query.bypass);
    }

    #[test]
    fn test_all_parameters() {
        let query = MapQuery::from_params(&params(&[
            ("width", "640"),
            ("height", "480"),
            ("zoom", "15"),
            ("lat", "41.85"),
            ("long", "-87.65"),
            ("label", "Chicago"),
        ]))
        .unwrap();

        assert_eq!(
            query.request,
            MapRequest::new(640, 480, 15, 41.85, -87.65, "Chicago")
        );
    }

    #[test]
    fn test_bypass_is_presence() {
        let query = MapQuery::from_params(&params(&[("bypass", "")])).unwrap();
        assert!(query.bypass);
    }

    #[test]
    fn test_malformed_values() {
        let err = MapQuery::from_params(&params(&[("zoom", "abc")])).unwrap_err();
        assert_eq!(err.to_string(), "zoom: 'abc' is not an integer from 0 to 255");

        assert!(MapQuery::from_params(&params(&[("width", "-5")])).is_err());
        assert!(MapQuery::from_params(&params(&[("lat", "")])).is_err());
        assert!(MapQuery::from_params(&params(&[("long", "east")])).is_err());
    }
}
