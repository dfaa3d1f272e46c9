use std::fmt::Display;

use image::Rgba;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{EngineError, Result};

lazy_static::lazy_static! {
    static ref HEX6_REGEX: Regex = Regex::new(r"^#?([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})$").unwrap();
    static ref HEX3_REGEX: Regex = Regex::new(r"^#?([0-9a-fA-F])([0-9a-fA-F])([0-9a-fA-F])$").unwrap();
}

/// An opaque RGB color as used by font, tag, shadow and outline settings.
///
/// Serializes as `#RRGGBB`, which is also the form profiles store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Normalized upper-case `#RRGGBB` form.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }

    /// Parses `#RGB` or `#RRGGBB`, the leading `#` being optional.
    /// Three digit colors expand by duplicating each channel (`abc` -> `aabbcc`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidHexColor`] for anything else.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.trim();
        if let Some(cap) = HEX6_REGEX.captures(hex) {
            let (_, [r, g, b]) = cap.extract();
            return Ok(Color::new(parse_channel(r)?, parse_channel(g)?, parse_channel(b)?));
        }
        if let Some(cap) = HEX3_REGEX.captures(hex) {
            let (_, [r, g, b]) = cap.extract();
            return Ok(Color::new(parse_channel(r)? * 0x11, parse_channel(g)? * 0x11, parse_channel(b)? * 0x11));
        }
        Err(EngineError::InvalidHexColor { value: hex.to_string() })
    }

    /// Euclidean distance in RGB space.
    pub fn distance(&self, other: &Color) -> f32 {
        let dr = self.r as f32 - other.r as f32;
        let dg = self.g as f32 - other.g as f32;
        let db = self.b as f32 - other.b as f32;
        (dr * dr + dg * dg + db * db).sqrt()
    }

    pub fn with_alpha(&self, alpha: u8) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, alpha])
    }
}

fn parse_channel(digits: &str) -> Result<u8> {
    u8::from_str_radix(digits, 16).map_err(|_| EngineError::InvalidHexColor { value: digits.to_string() })
}

impl TryFrom<String> for Color {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(value: Color) -> String {
        value.to_hex()
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from(value: (u8, u8, u8)) -> Self {
        Color::new(value.0, value.1, value.2)
    }
}

impl From<[u8; 3]> for Color {
    fn from(value: [u8; 3]) -> Self {
        Color::new(value[0], value[1], value[2])
    }
}

impl From<Color> for [u8; 3] {
    fn from(value: Color) -> [u8; 3] {
        [value.r, value.g, value.b]
    }
}
