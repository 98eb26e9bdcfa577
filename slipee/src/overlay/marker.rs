//! Center marker.

use std::path::Path;

use image::{imageops, Rgba, RgbaImage};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::{Overlay, OverlayError};

/// Edge length of the built-in marker.
pub const MARKER_SIZE: u32 = 24;

const FILL: (u8, u8, u8) = (214, 40, 40);
const OUTLINE_WIDTH: f32 = 3.0;

/// Marker image drawn centered on the canvas center.
#[derive(Debug, Clone)]
pub struct MarkerOverlay {
    image: RgbaImage,
}

impl MarkerOverlay {
    /// Renders the built-in marker: a red dot with a white outline.
    pub fn dot() -> Result<Self, OverlayError> {
        let mut pixmap = Pixmap::new(MARKER_SIZE, MARKER_SIZE)
            .ok_or_else(|| OverlayError::Render("cannot allocate marker pixmap".to_string()))?;

        let half = MARKER_SIZE as f32 / 2.0;
        let circle = PathBuilder::from_circle(half, half, half - OUTLINE_WIDTH)
            .ok_or_else(|| OverlayError::Render("invalid marker circle".to_string()))?;

        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.set_color_rgba8(FILL.0, FILL.1, FILL.2, 255);
        pixmap.fill_path(
            &circle,
            &paint,
            FillRule::Winding,
            Transform::identity(),
            None,
        );

        paint.set_color_rgba8(255, 255, 255, 255);
        let stroke = Stroke {
            width: OUTLINE_WIDTH,
            ..Stroke::default()
        };
        pixmap.stroke_path(&circle, &paint, &stroke, Transform::identity(), None);

        Ok(Self::from_image(pixmap_to_image(&pixmap)))
    }

    /// Loads a marker from an image file.
    pub fn from_file(path: &Path) -> Result<Self, OverlayError> {
        let image = image::open(path).map_err(|e| OverlayError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_image(image.to_rgba8()))
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

impl Overlay for MarkerOverlay {
    fn apply(&self, canvas: &mut RgbaImage) {
        let (width, height) = canvas.dimensions();
        let x = (width / 2) as i64 - (self.image.width() / 2) as i64;
        let y = (height / 2) as i64 - (self.image.height() / 2) as i64;
        imageops::overlay(canvas, &self.image, x, y);
    }
}

/// Converts tiny-skia's premultiplied pixels to straight RGBA.
fn pixmap_to_image(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (target, source) in image.pixels_mut().zip(pixmap.pixels()) {
        let color = source.demultiply();
        *target = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    image
}
