//! Color keying of font sheets before they are used as glyph sources.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::{Color, FontSheet};

/// Per slot transparency settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransparencyConfig {
    pub color: Color,
    pub enabled: bool,
    pub soft: bool,
    pub soft_radius: f32,
}

impl Default for TransparencyConfig {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            enabled: false,
            soft: false,
            soft_radius: 75.0,
        }
    }
}

impl TransparencyConfig {
    /// Key of the processed result for a raw sheet.
    pub fn signature(&self, raw_identity: u32, force: bool) -> ProcessSignature {
        ProcessSignature {
            raw_identity,
            color: self.color,
            enabled: self.enabled,
            soft: self.soft,
            soft_radius: self.soft_radius.to_bits(),
            force,
        }
    }

    /// New alpha for a pixel, or `None` if the pixel stays untouched.
    fn keyed_alpha(&self, rgb: Color, alpha: u8) -> Option<u8> {
        if self.soft && self.soft_radius > 0.0 {
            let distance = rgb.distance(&self.color);
            if distance <= self.soft_radius {
                let falloff = (distance / self.soft_radius).powi(3);
                return Some((alpha as f32 * falloff).floor() as u8);
            }
            return None;
        }
        (rgb == self.color).then_some(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessSignature {
    raw_identity: u32,
    color: Color,
    enabled: bool,
    soft: bool,
    soft_radius: u32,
    force: bool,
}

/// Applies color keying to a copy of `raw`.
///
/// Hard keying clears pixels that exactly match the key color. Soft keying
/// scales the alpha of every pixel within `soft_radius` of the key by the cube
/// of its normalized distance; a radius of 0 behaves like hard keying.
pub fn key_transparency(raw: &RgbaImage, config: &TransparencyConfig) -> RgbaImage {
    let mut result = raw.clone();
    let mut keyed = 0usize;
    for pixel in result.pixels_mut() {
        let rgb = Color::new(pixel[0], pixel[1], pixel[2]);
        if let Some(alpha) = config.keyed_alpha(rgb, pixel[3]) {
            pixel[3] = alpha;
            keyed += 1;
        }
    }
    log::debug!("keyed {keyed} pixels to {} (soft: {})", config.color, config.soft);
    result
}

/// Produces the sheet modules actually draw from.
///
/// With transparency disabled the raw sheet is passed through, unless `force`
/// asks for an editable copy because some module on the slot colorizes,
/// uses tags, shadows or outlines.
pub fn process_sheet(raw: &FontSheet, config: &TransparencyConfig, force: bool) -> FontSheet {
    if config.enabled {
        return FontSheet::new(key_transparency(raw.image(), config));
    }
    if force {
        log::debug!("preparing editable copy of sheet {:08x}", raw.identity());
        return FontSheet::new(raw.image().clone());
    }
    raw.clone()
}
