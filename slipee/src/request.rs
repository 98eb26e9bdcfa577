//! Static map request types.
//!
//! Provides the `MapRequest` value object that describes one rendered image
//! and the limits used to validate incoming requests before they reach the
//! stitcher.

use std::fmt;

use thiserror::Error;

use crate::coord::{LAT_LIMIT, MAX_LON, MIN_LON};

/// Default maximum canvas width in pixels.
pub const DEFAULT_MAX_WIDTH: u32 = 2000;

/// Default maximum canvas height in pixels.
pub const DEFAULT_MAX_HEIGHT: u32 = 2000;

/// Default maximum zoom level.
pub const DEFAULT_MAX_ZOOM: u8 = 23;

/// Errors raised when a request falls outside the accepted ranges.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Width is above the configured maximum.
    #[error("width {value} is higher than {max}")]
    Width { value: u32, max: u32 },

    /// Height is above the configured maximum.
    #[error("height {value} is higher than {max}")]
    Height { value: u32, max: u32 },

    /// Zoom is above the configured maximum.
    #[error("zoom {value} is higher than {max}")]
    Zoom { value: u8, max: u8 },

    /// Latitude is not finite or beyond the Web Mercator limit.
    #[error("latitude {0} is outside -85.051129..=85.051129")]
    Latitude(f64),

    /// Longitude is not finite or outside -180..=180.
    #[error("longitude {0} is outside -180..=180")]
    Longitude(f64),
}

/// Upper bounds applied to incoming requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    pub max_width: u32,
    pub max_height: u32,
    pub max_zoom: u8,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

/// Request to render a static map image.
///
/// Two requests are interchangeable iff all six fields are equal; the cache
/// fingerprint is derived from exactly these fields.
///
/// # Example
///
/// ```
/// use slipee::request::{MapRequest, RequestLimits};
///
/// let request = MapRequest::new(400, 300, 12, 59.91, 10.75, "Oslo");
/// assert!(request.validate(&RequestLimits::default()).is_ok());
/// assert_eq!(request.center(), (200, 150));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MapRequest {
    width: u32,
    height: u32,
    zoom: u8,
    latitude: f64,
    longitude: f64,
    label: String,
}

impl MapRequest {
    /// Create a new request without validating it.
    pub fn new(
        width: u32,
        height: u32,
        zoom: u8,
        latitude: f64,
        longitude: f64,
        label: impl Into<String>,
    ) -> Self {
        Self {
            width,
            height,
            zoom,
            latitude,
            longitude,
            label: label.into(),
        }
    }

    /// Checks the request against `limits`.
    ///
    /// Coordinates outside the projection are rejected, never clamped or
    /// wrapped.
    pub fn validate(&self, limits: &RequestLimits) -> Result<(), ValidationError> {
        if self.width > limits.max_width {
            return Err(ValidationError::Width {
                value: self.width,
                max: limits.max_width,
            });
        }
        if self.height > limits.max_height {
            return Err(ValidationError::Height {
                value: self.height,
                max: limits.max_height,
            });
        }
        if self.zoom > limits.max_zoom {
            return Err(ValidationError::Zoom {
                value: self.zoom,
                max: limits.max_zoom,
            });
        }
        if !self.latitude.is_finite() || !(-LAT_LIMIT..=LAT_LIMIT).contains(&self.latitude) {
            return Err(ValidationError::Latitude(self.latitude));
        }
        if !self.longitude.is_finite() || !(MIN_LON..=MAX_LON).contains(&self.longitude) {
            return Err(ValidationError::Longitude(self.longitude));
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Pixel position of the requested coordinate on the canvas.
    pub fn center(&self) -> (u32, u32) {
        (self.width / 2, self.height / 2)
    }
}

impl fmt::Display for MapRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} z{} @ {:.6},{:.6}",
            self.width, self.height, self.zoom, self.latitude, self.longitude
        )?;
        if !self.label.is_empty() {
            write!(f, " \"{}\"", self.label)?;
        }
        Ok(())
    }
}
