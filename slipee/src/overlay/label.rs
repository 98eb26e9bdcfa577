//! Bottom-right text label.

use std::sync::OnceLock;

use ab_glyph::{FontArc, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};

use super::Overlay;

/// Opacity of the white backdrop behind the text.
pub const BACKDROP_ALPHA: u8 = 196;

/// Height of the backdrop in pixels.
pub const BACKDROP_HEIGHT: u32 = 28;

/// Horizontal space reserved per character when no font measures the text.
pub const CHAR_WIDTH: u32 = 8;

/// Padding added to the text width.
pub const PADDING: u32 = 16;

const FONT_SCALE: f32 = 16.0;
const TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

static BUNDLED_FONT: OnceLock<Option<FontArc>> = OnceLock::new();

/// DejaVu Sans Mono, compiled into the library.
///
/// Used for labels unless `[overlay] font` names another face.
pub fn bundled_font() -> Option<FontArc> {
    BUNDLED_FONT
        .get_or_init(|| {
            FontArc::try_from_slice(include_bytes!("../../assets/DejaVuSansMono.ttf")).ok()
        })
        .clone()
}

/// Text drawn on a translucent white box in the bottom-right corner.
///
/// The box is always drawn for non-empty text. Without a font only the box
/// is drawn, sized by [`CHAR_WIDTH`].
pub struct LabelOverlay {
    text: String,
    font: Option<FontArc>,
}

impl LabelOverlay {
    pub fn new(text: impl Into<String>, font: Option<FontArc>) -> Self {
        Self {
            text: text.into(),
            font,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Width of the text in pixels.
    fn text_width(&self) -> u32 {
        match &self.font {
            Some(font) => text_size(PxScale::from(FONT_SCALE), font, &self.text).0,
            None => self.text.chars().count() as u32 * CHAR_WIDTH,
        }
    }
}

impl Overlay for LabelOverlay {
    fn apply(&self, canvas: &mut RgbaImage) {
        if self.text.is_empty() {
            return;
        }

        let (width, height) = canvas.dimensions();
        let text_width = self.text_width();
        let left = width.saturating_sub(text_width + PADDING);
        let top = height.saturating_sub(BACKDROP_HEIGHT);

        for y in top..height {
            for x in left..width {
                let pixel = canvas.get_pixel_mut(x, y);
                *pixel = blend_white(*pixel, BACKDROP_ALPHA);
            }
        }

        if let Some(font) = &self.font {
            let x = width as i32 - text_width as i32 - (PADDING / 2) as i32;
            let y = height as i32 - BACKDROP_HEIGHT as i32 + 6;
            draw_text_mut(
                canvas,
                TEXT_COLOR,
                x,
                y,
                PxScale::from(FONT_SCALE),
                font,
                &self.text,
            );
        }
    }
}

/// Composites white with the given alpha over `pixel`.
fn blend_white(pixel: Rgba<u8>, alpha: u8) -> Rgba<u8> {
    let a = alpha as u32;
    let inv = 255 - a;
    let [r, g, b, pa] = pixel.0;
    let channel = |c: u8| ((255 * a + c as u32 * inv + 127) / 255) as u8;

    Rgba([
        channel(r),
        channel(g),
        channel(b),
        (a + (pa as u32 * inv + 127) / 255) as u8,
    ])
}
