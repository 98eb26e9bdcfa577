//! Canvas overlays
//!
//! Overlays are drawn onto a finished canvas before it is encoded: the
//! label in the bottom-right corner and the marker on the requested point.

mod label;
mod marker;

pub use label::{bundled_font, LabelOverlay, BACKDROP_ALPHA, BACKDROP_HEIGHT, CHAR_WIDTH, PADDING};
pub use marker::{MarkerOverlay, MARKER_SIZE};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ab_glyph::FontArc;
use image::RgbaImage;
use thiserror::Error;
use tracing::info;

use crate::request::MapRequest;

/// Errors while loading overlay resources.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("invalid font {path}: {reason}")]
    Font { path: PathBuf, reason: String },

    #[error("failed to render overlay: {0}")]
    Render(String),
}

/// Something drawn onto a finished canvas.
pub trait Overlay: Send + Sync {
    fn apply(&self, canvas: &mut RgbaImage);
}

impl<T: Overlay + ?Sized> Overlay for Arc<T> {
    fn apply(&self, canvas: &mut RgbaImage) {
        (**self).apply(canvas)
    }
}

/// Overlays applied in insertion order.
#[derive(Default)]
pub struct OverlayStack {
    overlays: Vec<Box<dyn Overlay>>,
}

impl OverlayStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, overlay: impl Overlay + 'static) {
        self.overlays.push(Box::new(overlay));
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}

impl Overlay for OverlayStack {
    fn apply(&self, canvas: &mut RgbaImage) {
        for overlay in &self.overlays {
            overlay.apply(canvas);
        }
    }
}

/// Builds the overlay stack for each request from shared resources.
///
/// Fonts and marker images are loaded once; the label text changes per
/// request. Labels use [`bundled_font`] unless a font is set.
#[derive(Clone, Default)]
pub struct OverlayFactory {
    attribution: Option<String>,
    font: Option<FontArc>,
    marker: Option<Arc<MarkerOverlay>>,
}

impl OverlayFactory {
    /// Factory that draws nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Appends a fixed attribution to every label.
    pub fn with_attribution(mut self, attribution: impl Into<String>) -> Self {
        let attribution = attribution.into();
        self.attribution = (!attribution.is_empty()).then_some(attribution);
        self
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    /// Loads a TrueType/OpenType font for label text.
    pub fn with_font_file(self, path: &Path) -> Result<Self, OverlayError> {
        let data = std::fs::read(path).map_err(|source| OverlayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let font = FontArc::try_from_vec(data).map_err(|e| OverlayError::Font {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        info!(path = %path.display(), "Label font loaded");
        Ok(self.with_font(font))
    }

    pub fn with_marker(mut self, marker: MarkerOverlay) -> Self {
        self.marker = Some(Arc::new(marker));
        self
    }

    /// Label text for a request: its label, then the attribution.
    pub fn label_text(&self, request: &MapRequest) -> String {
        match (request.label(), self.attribution.as_deref()) {
            ("", None) => String::new(),
            ("", Some(attribution)) => attribution.to_string(),
            (label, None) => label.to_string(),
            (label, Some(attribution)) => format!("{} | {}", label, attribution),
        }
    }

    /// Builds the stack for one request: label first, marker on top.
    pub fn build(&self, request: &MapRequest) -> OverlayStack {
        let mut stack = OverlayStack::new();

        let text = self.label_text(request);
        if !text.is_empty() {
            let font = self.font.clone().or_else(bundled_font);
            stack.push(LabelOverlay::new(text, font));
        }
        if let Some(marker) = &self.marker {
            stack.push(Arc::clone(marker));
        }

        stack
    }
}
