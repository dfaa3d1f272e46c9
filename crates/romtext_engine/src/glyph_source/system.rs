use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};

use super::{GlyphSource, GlyphSprite};
use crate::{Color, TextSettings};

/// Glyphs rendered from an outline font.
///
/// Measures in unscaled font pixels at `fontSize`, so the wrap budget is
/// `lineWrapWidth` as configured and only drawing applies `scale * zoom`.
pub struct SystemFontGlyphSource<'a> {
    font: &'a FontArc,
    text: &'a TextSettings,
}

impl<'a> SystemFontGlyphSource<'a> {
    pub fn new(font: &'a FontArc, text: &'a TextSettings) -> Self {
        Self { font, text }
    }

    fn draw_scale(&self) -> PxScale {
        PxScale {
            x: self.text.font_size * self.text.effective_scale_x(),
            y: self.text.font_size * self.text.effective_scale_y(),
        }
    }
}

impl GlyphSource for SystemFontGlyphSource<'_> {
    fn advance(&self, ch: char) -> Option<f32> {
        let scaled = self.font.as_scaled(PxScale::from(self.text.font_size));
        let glyph_id = scaled.glyph_id(ch);
        if glyph_id.0 == 0 {
            return None;
        }
        Some(scaled.h_advance(glyph_id))
    }

    fn spacing(&self) -> f32 {
        0.0
    }

    fn wrap_budget(&self, line_wrap_width: f32) -> f32 {
        line_wrap_width
    }

    fn to_canvas_x(&self, width: f32) -> f32 {
        width * self.text.effective_scale_x()
    }

    fn line_pitch(&self) -> f32 {
        self.text.font_size * self.text.effective_scale_y() * self.text.line_height
    }

    fn sprite(&self, ch: char) -> Option<GlyphSprite> {
        let scale = self.draw_scale();
        let scaled = self.font.as_scaled(scale);
        let glyph_id = scaled.glyph_id(ch);
        if glyph_id.0 == 0 {
            return None;
        }

        let glyph = glyph_id.with_scale_and_position(scale, ab_glyph::point(0.0, scaled.ascent()));
        let outlined = scaled.outline_glyph(glyph)?;
        let bounds = outlined.px_bounds();
        let (width, height) = (bounds.width() as u32, bounds.height() as u32);
        if width == 0 || height == 0 {
            return None;
        }

        // white coverage mask, colored by the tint
        let mut pixels = RgbaImage::new(width, height);
        outlined.draw(|px, py, coverage| {
            if px < width && py < height {
                let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                pixels.put_pixel(px, py, Rgba([255, 255, 255, alpha]));
            }
        });

        Some(GlyphSprite {
            pixels,
            dx: bounds.min.x,
            dy: bounds.min.y,
        })
    }

    fn tint(&self, tag_color: Option<Color>) -> Option<Color> {
        Some(tag_color.unwrap_or(self.text.system_font_color))
    }
}
