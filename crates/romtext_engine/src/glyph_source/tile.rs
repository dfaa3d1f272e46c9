use std::sync::Arc;

use image::imageops::{self, FilterType};

use super::{GlyphSource, GlyphSprite};
use crate::{
    glyph_metrics::{GlyphMetricsMap, TileLayout, TileRect},
    Color, FontSheet, FontSheetSettings, GlyphMetricsCache, TextSettings,
};

/// Glyphs cut from a bitmap font sheet.
///
/// Measures in scaled canvas pixels: advances, spacing and the wrap budget
/// are all multiplied by `scaleX * zoomFactor`.
pub struct TileGlyphSource<'a> {
    sheet: &'a FontSheet,
    font: &'a FontSheetSettings,
    text: &'a TextSettings,
    layout: TileLayout,
    /// Only scanned when pixel scanning is enabled.
    metrics: Option<Arc<GlyphMetricsMap>>,
}

/// Where a glyph comes from on the sheet and how far it advances, unscaled.
enum TileGlyph {
    Drawn { source: TileRect, advance: f32 },
    Blank { advance: f32 },
    OutOfBounds { tile: TileRect, advance: f32 },
}

impl TileGlyph {
    fn advance(&self) -> f32 {
        match self {
            TileGlyph::Drawn { advance, .. } | TileGlyph::Blank { advance } | TileGlyph::OutOfBounds { advance, .. } => *advance,
        }
    }
}

impl<'a> TileGlyphSource<'a> {
    pub fn new(sheet: &'a FontSheet, font: &'a FontSheetSettings, text: &'a TextSettings, cache: &GlyphMetricsCache) -> Self {
        Self {
            sheet,
            font,
            text,
            layout: TileLayout::new(font, sheet.width()),
            metrics: font.enable_pixel_scanning.then(|| cache.get_or_compute(sheet, font)),
        }
    }

    pub fn layout(&self) -> &TileLayout {
        &self.layout
    }

    fn half_tile(&self) -> f32 {
        self.font.tile_width as f32 / 2.0
    }

    /// Characters outside the sequence are zero width, except the space
    /// which falls back to half a tile.
    fn glyph(&self, ch: char) -> TileGlyph {
        let tile_width = self.font.tile_width as f32;
        let Some(index) = self.font.tile_index(ch) else {
            let advance = if ch == ' ' { self.half_tile() } else { 0.0 };
            return TileGlyph::Blank { advance };
        };

        let tile = self.layout.tile_rect(index);
        if !tile.is_inside(self.sheet.width(), self.sheet.height()) {
            return TileGlyph::OutOfBounds { tile, advance: tile_width };
        }

        let Some(metrics) = self.metrics.as_ref().and_then(|metrics| metrics.get(&ch)) else {
            return TileGlyph::Drawn { source: tile, advance: tile_width };
        };

        if metrics.scan_width > 0 {
            let source = TileRect {
                x: tile.x + metrics.scan_x,
                width: metrics.scan_width,
                ..tile
            };
            return TileGlyph::Drawn {
                source,
                advance: metrics.scan_width as f32,
            };
        }

        // blank tile
        TileGlyph::Blank {
            advance: if ch == ' ' { self.half_tile() } else { 0.0 },
        }
    }
}

impl GlyphSource for TileGlyphSource<'_> {
    fn advance(&self, ch: char) -> Option<f32> {
        Some(self.glyph(ch).advance() * self.text.effective_scale_x())
    }

    fn spacing(&self) -> f32 {
        self.font.character_spacing as f32 * self.text.effective_scale_x()
    }

    fn wrap_budget(&self, line_wrap_width: f32) -> f32 {
        line_wrap_width * self.text.effective_scale_x()
    }

    fn to_canvas_x(&self, width: f32) -> f32 {
        width
    }

    fn line_pitch(&self) -> f32 {
        self.font.tile_height as f32 * self.text.effective_scale_y() * self.text.line_height
    }

    fn sprite(&self, ch: char) -> Option<GlyphSprite> {
        let (source, advance) = match self.glyph(ch) {
            TileGlyph::Drawn { source, advance } => (source, advance),
            TileGlyph::Blank { .. } => return None,
            TileGlyph::OutOfBounds { tile, .. } => {
                log::warn!(
                    "glyph '{ch}' tile at {},{} ({}x{}) lies outside the {}x{} font sheet",
                    tile.x,
                    tile.y,
                    tile.width,
                    tile.height,
                    self.sheet.width(),
                    self.sheet.height()
                );
                return None;
            }
        };

        let width = (advance * self.text.effective_scale_x()).round();
        let height = (self.font.tile_height as f32 * self.text.effective_scale_y()).round();
        if width < 1.0 || height < 1.0 {
            return None;
        }

        let cut = imageops::crop_imm(self.sheet.image(), source.x as u32, source.y as u32, source.width as u32, source.height as u32).to_image();
        let pixels = if cut.dimensions() == (width as u32, height as u32) {
            cut
        } else {
            imageops::resize(&cut, width as u32, height as u32, FilterType::Nearest)
        };

        Some(GlyphSprite {
            pixels,
            dx: self.font.baseline_x as f32 * self.text.effective_scale_x(),
            dy: self.font.baseline_y as f32 * self.text.effective_scale_y(),
        })
    }

    fn tint(&self, tag_color: Option<Color>) -> Option<Color> {
        tag_color.or(self.text.enable_font_colorization.then_some(self.text.font_color))
    }
}
