//! Synthesized font sheets and modules shared by the integration tests.
#![allow(dead_code)]

use image::{Rgba, RgbaImage};
use romtext_engine::{FontSheet, FontSheetSettings, FontSlot, RenderSession, TextModule};

pub const SEQUENCE: &str = "ABCDEFGH";
pub const TILE: u32 = 8;
pub const SEPARATION: u32 = 1;
/// Four tiles per row: (35 + 1) / (8 + 1).
pub const SHEET_WIDTH: u32 = 4 * (TILE + SEPARATION) - SEPARATION;
pub const SHEET_HEIGHT: u32 = 2 * (TILE + SEPARATION) - SEPARATION;

pub const INK: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const KEY: Rgba<u8> = Rgba([255, 0, 255, 255]);
pub const FILL: Rgba<u8> = Rgba([0xE5, 0xE7, 0xEB, 255]);

/// Glyph `i` of `SEQUENCE` is inked in columns `0..=i` of its tile, over
/// `background`.
pub fn font_sheet_image(background: Rgba<u8>) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(SHEET_WIDTH, SHEET_HEIGHT, background);
    for i in 0..SEQUENCE.len() as u32 {
        let (col, row) = (i % 4, i / 4);
        let (x0, y0) = (col * (TILE + SEPARATION), row * (TILE + SEPARATION));
        for y in 0..TILE {
            for x in 0..=i {
                image.put_pixel(x0 + x, y0 + y, INK);
            }
        }
    }
    image
}

pub fn font_settings() -> FontSheetSettings {
    FontSheetSettings {
        character_sequence: SEQUENCE.to_string(),
        tile_width: TILE as i32,
        tile_height: TILE as i32,
        separation_x: SEPARATION as i32,
        separation_y: SEPARATION as i32,
        character_spacing: 1,
        ..Default::default()
    }
}

pub fn module(text: &str) -> TextModule {
    let mut module = TextModule::new(1);
    module.text = text.to_string();
    module.bitmap_font_settings = font_settings();
    module
}

pub fn session() -> RenderSession {
    let mut session = RenderSession::new();
    session.set_canvas_size(96, 48);
    session.set_font_sheet(FontSlot::Font1, Some(FontSheet::new(font_sheet_image(Rgba([0, 0, 0, 0])))));
    session
}
