//! Glyph measurement and rasterization, independent of the font kind.
//!
//! Line wrapping, block layout and compositing only talk to [`GlyphSource`].
//! Bitmap tile sheets and outline fonts plug in underneath.

use image::RgbaImage;

use crate::{color_tags::visible_chars, Color};

mod system;
mod tile;

pub use system::SystemFontGlyphSource;
pub use tile::TileGlyphSource;

/// A glyph ready to be composited, already at its destination size.
#[derive(Debug, Clone)]
pub struct GlyphSprite {
    pub pixels: RgbaImage,
    /// Offset of the sprite's top left corner from the pen position (cursor x, line top), in canvas pixels.
    pub dx: f32,
    pub dy: f32,
}

/// Accumulated width of a run of glyphs.
///
/// Keeping advance sum and glyph count apart makes widths additive: the width
/// of `a + b` is `a.append(b).total(spacing)`, with the spacing between the
/// two runs accounted for exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineWidth {
    pub advance: f32,
    pub glyphs: usize,
}

impl LineWidth {
    pub fn push(&mut self, advance: f32) {
        self.advance += advance;
        self.glyphs += 1;
    }

    pub fn total(&self, spacing: f32) -> f32 {
        if self.glyphs == 0 {
            0.0
        } else {
            self.advance + spacing * (self.glyphs - 1) as f32
        }
    }
}

pub trait GlyphSource {
    /// Advance of `ch` in measurement units. `None` if the font has no glyph
    /// for it; such characters take no room at all.
    fn advance(&self, ch: char) -> Option<f32>;

    /// Extra gap between two adjacent glyphs, in measurement units.
    fn spacing(&self) -> f32;

    /// Wrap budget in measurement units for a configured `lineWrapWidth`.
    fn wrap_budget(&self, line_wrap_width: f32) -> f32;

    /// Converts a measured width to canvas pixels.
    fn to_canvas_x(&self, width: f32) -> f32;

    /// Distance between two line tops, in canvas pixels.
    fn line_pitch(&self) -> f32;

    /// Rasterizes `ch`. `None` when there is nothing to draw.
    fn sprite(&self, ch: char) -> Option<GlyphSprite>;

    /// Multiply color for a glyph given the innermost open tag color.
    /// `None` draws the sprite as is.
    fn tint(&self, tag_color: Option<Color>) -> Option<Color>;

    fn line_width(&self, line: &str) -> LineWidth {
        let mut width = LineWidth::default();
        for advance in visible_chars(line).filter_map(|ch| self.advance(ch)) {
            width.push(advance);
        }
        width
    }

    /// Visual width of a line in measurement units, tags excluded.
    fn measure(&self, line: &str) -> f32 {
        self.line_width(line).total(self.spacing())
    }
}

#[cfg(test)]
pub(crate) mod test_source {
    use super::*;
    use image::Rgba;

    /// Monospaced source: every ASCII letter and digit is `advance` wide, space
    /// is half that, `_` is a zero-width glyph and everything else is missing.
    /// Sprites are solid white blocks.
    pub struct FixedSource {
        pub advance: f32,
        pub spacing: f32,
        pub height: f32,
        pub scale: f32,
    }

    impl FixedSource {
        pub fn new(advance: f32, spacing: f32) -> Self {
            Self {
                advance,
                spacing,
                height: advance,
                scale: 1.0,
            }
        }
    }

    impl GlyphSource for FixedSource {
        fn advance(&self, ch: char) -> Option<f32> {
            if ch == ' ' {
                Some(self.advance / 2.0)
            } else if ch == '_' {
                Some(0.0)
            } else if ch.is_ascii_alphanumeric() {
                Some(self.advance)
            } else {
                None
            }
        }

        fn spacing(&self) -> f32 {
            self.spacing
        }

        fn wrap_budget(&self, line_wrap_width: f32) -> f32 {
            line_wrap_width
        }

        fn to_canvas_x(&self, width: f32) -> f32 {
            width * self.scale
        }

        fn line_pitch(&self) -> f32 {
            self.height * self.scale
        }

        fn sprite(&self, ch: char) -> Option<GlyphSprite> {
            if !ch.is_ascii_alphanumeric() {
                return None;
            }
            let w = (self.advance * self.scale).round() as u32;
            let h = (self.height * self.scale).round() as u32;
            Some(GlyphSprite {
                pixels: RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255])),
                dx: 0.0,
                dy: 0.0,
            })
        }

        fn tint(&self, tag_color: Option<Color>) -> Option<Color> {
            tag_color
        }
    }

    #[test]
    fn test_measure_counts_spacing_between_visible_glyphs() {
        let source = FixedSource::new(8.0, 1.0);
        assert_eq!(source.measure(""), 0.0);
        assert_eq!(source.measure("A"), 8.0);
        assert_eq!(source.measure("AB"), 17.0);
        assert_eq!(source.measure("A B"), 8.0 + 4.0 + 8.0 + 2.0);
        assert_eq!(source.measure("<C#F00>A</C>B"), 17.0);
        // '#' is missing and takes no room
        assert_eq!(source.measure("A#B"), 17.0);
        // '_' is zero width but still spaced
        assert_eq!(source.measure("A_B"), 18.0);
    }
}
