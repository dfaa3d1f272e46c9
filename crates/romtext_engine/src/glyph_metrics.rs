//! Tile grid math and the per-sheet glyph metrics cache.

use std::{collections::HashMap, sync::Arc};

use image::RgbaImage;
use parking_lot::Mutex;

use crate::{FontSheet, FontSheetSettings};

/// Source rectangle on a font sheet, in sheet pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl TileRect {
    pub fn is_inside(&self, width: u32, height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.width > 0
            && self.height > 0
            && (self.x + self.width) as i64 <= width as i64
            && (self.y + self.height) as i64 <= height as i64
    }
}

/// Placement of the tile grid on a sheet of a given width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLayout {
    pub chars_per_row: usize,
    pub tile_width: i32,
    pub tile_height: i32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub separation_x: i32,
    pub separation_y: i32,
}

impl TileLayout {
    pub fn new(settings: &FontSheetSettings, sheet_width: u32) -> Self {
        let pitch_x = settings.tile_width + settings.separation_x;
        let chars_per_row = if pitch_x > 0 {
            ((sheet_width as i64 - settings.offset_x as i64 + settings.separation_x as i64) / pitch_x as i64).max(1) as usize
        } else {
            1
        };
        Self {
            chars_per_row,
            tile_width: settings.tile_width,
            tile_height: settings.tile_height,
            offset_x: settings.offset_x,
            offset_y: settings.offset_y,
            separation_x: settings.separation_x,
            separation_y: settings.separation_y,
        }
    }

    /// Grid cell (column, row) of tile `index`.
    pub fn tile_cell(&self, index: usize) -> (usize, usize) {
        (index % self.chars_per_row, index / self.chars_per_row)
    }

    pub fn tile_rect(&self, index: usize) -> TileRect {
        let (col, row) = self.tile_cell(index);
        TileRect {
            x: self.offset_x + col as i32 * (self.tile_width + self.separation_x),
            y: self.offset_y + row as i32 * (self.tile_height + self.separation_y),
            width: self.tile_width,
            height: self.tile_height,
        }
    }

    /// Number of whole tiles that fit on a sheet of the given size.
    pub fn tile_count(&self, sheet_width: u32, sheet_height: u32) -> usize {
        let pitch_y = self.tile_height + self.separation_y;
        if pitch_y <= 0 || self.tile_width <= 0 {
            return 0;
        }
        let rows = ((sheet_height as i64 - self.offset_y as i64 + self.separation_y as i64) / pitch_y as i64).max(0) as usize;
        (0..self.chars_per_row * rows)
            .filter(|i| self.tile_rect(*i).is_inside(sheet_width, sheet_height))
            .count()
    }
}

/// Pixel-scanned metrics of one glyph tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphMetrics {
    /// First column with visible pixels, relative to the tile.
    pub scan_x: i32,
    /// Visible column span; 0 for blank tiles.
    pub scan_width: i32,
    pub tile: TileRect,
    /// False if the tile rectangle leaves the sheet.
    pub in_bounds: bool,
}

impl GlyphMetrics {
    fn scan(sheet: &RgbaImage, tile: TileRect) -> Self {
        if !tile.is_inside(sheet.width(), sheet.height()) {
            return Self {
                scan_x: 0,
                scan_width: tile.width,
                tile,
                in_bounds: false,
            };
        }

        let column_visible = |cx: i32| (0..tile.height).any(|cy| sheet.get_pixel((tile.x + cx) as u32, (tile.y + cy) as u32)[3] > 0);
        let first = (0..tile.width).find(|cx| column_visible(*cx));
        let last = (0..tile.width).rev().find(|cx| column_visible(*cx));
        let (scan_x, scan_width) = match (first, last) {
            (Some(first), Some(last)) => (first, last - first + 1),
            _ => (0, 0),
        };
        Self {
            scan_x,
            scan_width,
            tile,
            in_bounds: true,
        }
    }
}

/// Cache bucket key: sheet identity, grid signature and character sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlyphMetricsKey {
    pub sheet_identity: u32,
    pub grid: String,
    pub sequence: String,
}

impl GlyphMetricsKey {
    pub fn new(sheet: &FontSheet, settings: &FontSheetSettings) -> Self {
        Self {
            sheet_identity: sheet.identity(),
            grid: settings.grid_signature(),
            sequence: settings.character_sequence.clone(),
        }
    }
}

pub type GlyphMetricsMap = HashMap<char, GlyphMetrics>;

/// Memoized glyph metrics, one bucket per (sheet, grid, sequence).
///
/// Buckets are computed once on first request and only dropped when the
/// sheet they were scanned from is replaced.
#[derive(Debug, Default)]
pub struct GlyphMetricsCache {
    buckets: Mutex<HashMap<GlyphMetricsKey, Arc<GlyphMetricsMap>>>,
}

impl GlyphMetricsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(&self, sheet: &FontSheet, settings: &FontSheetSettings) -> Arc<GlyphMetricsMap> {
        let key = GlyphMetricsKey::new(sheet, settings);
        let mut buckets = self.buckets.lock();
        if let Some(bucket) = buckets.get(&key) {
            return bucket.clone();
        }
        let bucket = Arc::new(compute_metrics(sheet.image(), settings));
        log::debug!(
            "scanned {} glyphs for sheet {:08x} grid {}",
            bucket.len(),
            key.sheet_identity,
            key.grid
        );
        buckets.insert(key, bucket.clone());
        bucket
    }

    /// Drops every bucket scanned from the sheet with `identity`.
    pub fn invalidate_sheet(&self, identity: u32) {
        self.buckets.lock().retain(|key, _| key.sheet_identity != identity);
    }

    pub fn len(&self) -> usize {
        self.buckets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scans every distinct character of the sequence. Duplicates keep the metrics of their first tile.
pub fn compute_metrics(sheet: &RgbaImage, settings: &FontSheetSettings) -> GlyphMetricsMap {
    let layout = TileLayout::new(settings, sheet.width());
    let mut result = HashMap::new();
    for (index, ch) in settings.character_sequence.chars().enumerate() {
        result.entry(ch).or_insert_with(|| GlyphMetrics::scan(sheet, layout.tile_rect(index)));
    }
    result
}
