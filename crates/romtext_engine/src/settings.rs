//! Per-module text settings and per-module font sheet settings.
//!
//! Both structs are loaded from profile JSON with `from_json`, which takes
//! every field it can and falls back to the default for each field that is
//! missing, mistyped or out of range.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Color;

pub const DEFAULT_CHARACTER_SEQUENCE: &str = " !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalAlignment {
    #[default]
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Bitmap,
    System,
}

/// Which of the two global font sheet images a module draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSlot {
    #[default]
    Font1,
    Font2,
}

impl FontSlot {
    pub const ALL: [FontSlot; 2] = [FontSlot::Font1, FontSlot::Font2];

    pub fn index(self) -> usize {
        match self {
            FontSlot::Font1 => 0,
            FontSlot::Font2 => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSettings {
    pub line_height: f32,
    pub position_x: f32,
    pub position_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub zoom_factor: f32,
    pub horizontal_alignment: HorizontalAlignment,
    pub vertical_alignment: VerticalAlignment,
    /// 0 disables wrapping.
    pub line_wrap_width: f32,
    pub enable_font_colorization: bool,
    pub font_color: Color,

    pub enable_shadow: bool,
    pub shadow_color: Color,
    pub shadow_offset_x: f32,
    pub shadow_offset_y: f32,
    pub shadow_blur: f32,
    pub enable_outline: bool,
    pub outline_color: Color,
    pub outline_width: f32,

    pub render_mode: RenderMode,
    /// CSS style family list, e.g. `"Trebuchet MS", Helvetica, sans-serif`.
    pub font_family: String,
    pub font_size: f32,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub system_font_color: Color,
    pub custom_font_file_name: Option<String>,
    pub custom_font_family_name: Option<String>,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            line_height: 1.0,
            position_x: 0.0,
            position_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            zoom_factor: 1.0,
            horizontal_alignment: HorizontalAlignment::Left,
            vertical_alignment: VerticalAlignment::Top,
            line_wrap_width: 0.0,
            enable_font_colorization: false,
            font_color: Color::BLACK,

            enable_shadow: false,
            shadow_color: Color::BLACK,
            shadow_offset_x: 2.0,
            shadow_offset_y: 2.0,
            shadow_blur: 3.0,
            enable_outline: false,
            outline_color: Color::WHITE,
            outline_width: 1.0,

            render_mode: RenderMode::Bitmap,
            font_family: "Arial".to_string(),
            font_size: 16.0,
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            system_font_color: Color::BLACK,
            custom_font_file_name: None,
            custom_font_family_name: None,
        }
    }
}

impl TextSettings {
    pub fn effective_scale_x(&self) -> f32 {
        self.scale_x * self.zoom_factor
    }

    pub fn effective_scale_y(&self) -> f32 {
        self.scale_y * self.zoom_factor
    }

    /// Builds settings from persisted JSON, substituting defaults field by field.
    pub fn from_json(value: &Value) -> Self {
        let d = Self::default();
        let f = FieldReader::new(value, "textSettings");
        Self {
            line_height: f.number("lineHeight", d.line_height, |v| v >= 0.0),
            position_x: f.number("positionX", d.position_x, |_| true),
            position_y: f.number("positionY", d.position_y, |_| true),
            scale_x: f.number("scaleX", d.scale_x, |v| v > 0.0),
            scale_y: f.number("scaleY", d.scale_y, |v| v > 0.0),
            zoom_factor: f.number("zoomFactor", d.zoom_factor, |v| v > 0.0),
            horizontal_alignment: f.variant("horizontalAlignment", d.horizontal_alignment),
            vertical_alignment: f.variant("verticalAlignment", d.vertical_alignment),
            line_wrap_width: f.number("lineWrapWidth", d.line_wrap_width, |_| true),
            enable_font_colorization: f.boolean("enableFontColorization", d.enable_font_colorization),
            font_color: f.color("fontColor", d.font_color),

            enable_shadow: f.boolean("enableShadow", d.enable_shadow),
            shadow_color: f.color("shadowColor", d.shadow_color),
            shadow_offset_x: f.number("shadowOffsetX", d.shadow_offset_x, |_| true),
            shadow_offset_y: f.number("shadowOffsetY", d.shadow_offset_y, |_| true),
            shadow_blur: f.number("shadowBlur", d.shadow_blur, |v| v >= 0.0),
            enable_outline: f.boolean("enableOutline", d.enable_outline),
            outline_color: f.color("outlineColor", d.outline_color),
            outline_width: f.number("outlineWidth", d.outline_width, |v| v >= 0.0),

            render_mode: f.variant("renderMode", d.render_mode),
            font_family: f.string("fontFamily").unwrap_or(d.font_family),
            font_size: f.number("fontSize", d.font_size, |v| v > 0.0),
            font_weight: f.variant("fontWeight", d.font_weight),
            font_style: f.variant("fontStyle", d.font_style),
            system_font_color: f.color("systemFontColor", d.system_font_color),
            custom_font_file_name: f.string("customFontFileName"),
            custom_font_family_name: f.string("customFontFamilyName"),
        }
    }
}

/// Tile grid description of a font sheet plus per-module glyph placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSheetSettings {
    /// Character at position `i` is drawn from tile `i` in raster order.
    pub character_sequence: String,
    pub tile_width: i32,
    pub tile_height: i32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub separation_x: i32,
    pub separation_y: i32,
    pub baseline_x: i32,
    pub baseline_y: i32,
    pub character_spacing: i32,
    pub enable_pixel_scanning: bool,
    pub selected_font: FontSlot,
}

impl Default for FontSheetSettings {
    fn default() -> Self {
        Self {
            character_sequence: DEFAULT_CHARACTER_SEQUENCE.to_string(),
            tile_width: 8,
            tile_height: 8,
            offset_x: 0,
            offset_y: 0,
            separation_x: 1,
            separation_y: 1,
            baseline_x: 0,
            baseline_y: 0,
            character_spacing: 1,
            enable_pixel_scanning: false,
            selected_font: FontSlot::Font1,
        }
    }
}

impl FontSheetSettings {
    pub fn from_json(value: &Value) -> Self {
        let d = Self::default();
        let f = FieldReader::new(value, "bitmapFontSettings");
        Self {
            character_sequence: f.string("characterSequence").unwrap_or(d.character_sequence),
            tile_width: f.integer("tileWidth", d.tile_width, |v| v > 0),
            tile_height: f.integer("tileHeight", d.tile_height, |v| v > 0),
            offset_x: f.integer("offsetX", d.offset_x, |v| v >= 0),
            offset_y: f.integer("offsetY", d.offset_y, |v| v >= 0),
            separation_x: f.integer("separationX", d.separation_x, |v| v >= 0),
            separation_y: f.integer("separationY", d.separation_y, |v| v >= 0),
            baseline_x: f.integer("baselineX", d.baseline_x, |_| true),
            baseline_y: f.integer("baselineY", d.baseline_y, |_| true),
            character_spacing: f.integer("characterSpacing", d.character_spacing, |_| true),
            enable_pixel_scanning: f.boolean("enablePixelScanning", d.enable_pixel_scanning),
            selected_font: f.variant("selectedFont", d.selected_font),
        }
    }

    /// Signature of the tile grid, `WxH-ox,oy-sx,sy`.
    pub fn grid_signature(&self) -> String {
        format!(
            "{}x{}-{},{}-{},{}",
            self.tile_width, self.tile_height, self.offset_x, self.offset_y, self.separation_x, self.separation_y
        )
    }

    /// Tile index of `ch`. Duplicates in the sequence always resolve to the first occurrence.
    pub fn tile_index(&self, ch: char) -> Option<usize> {
        self.character_sequence.chars().position(|c| c == ch)
    }

    /// Assigns `ch` to the tile at `index`, padding the sequence with spaces if it is shorter.
    pub fn map_tile_char(&mut self, index: usize, ch: char) {
        let mut chars: Vec<char> = self.character_sequence.chars().collect();
        if chars.len() <= index {
            chars.resize(index + 1, ' ');
        }
        chars[index] = ch;
        self.character_sequence = chars.into_iter().collect();
    }
}

/// Reads typed fields out of a JSON object, logging every substitution.
pub(crate) struct FieldReader<'a> {
    map: Option<&'a Map<String, Value>>,
    context: &'static str,
}

impl<'a> FieldReader<'a> {
    pub fn new(value: &'a Value, context: &'static str) -> Self {
        Self {
            map: value.as_object(),
            context,
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.and_then(|m| m.get(key)).filter(|v| !v.is_null())
    }

    fn reject(&self, key: &str, value: &Value) {
        log::warn!("{}.{key}: ignoring invalid value {value}, using default", self.context);
    }

    pub fn number(&self, key: &str, default: f32, valid: impl Fn(f32) -> bool) -> f32 {
        let Some(value) = self.get(key) else {
            return default;
        };
        match value.as_f64().map(|v| v as f32) {
            Some(v) if v.is_finite() && valid(v) => v,
            _ => {
                self.reject(key, value);
                default
            }
        }
    }

    pub fn integer(&self, key: &str, default: i32, valid: impl Fn(i32) -> bool) -> i32 {
        let Some(value) = self.get(key) else {
            return default;
        };
        match value.as_f64().filter(|v| v.is_finite()).map(|v| v.round() as i32) {
            Some(v) if valid(v) => v,
            _ => {
                self.reject(key, value);
                default
            }
        }
    }

    pub fn boolean(&self, key: &str, default: bool) -> bool {
        let Some(value) = self.get(key) else {
            return default;
        };
        value.as_bool().unwrap_or_else(|| {
            self.reject(key, value);
            default
        })
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(Value::as_str).map(str::to_string)
    }

    pub fn color(&self, key: &str, default: Color) -> Color {
        let Some(value) = self.get(key) else {
            return default;
        };
        match value.as_str().map(Color::from_hex) {
            Some(Ok(color)) => color,
            _ => {
                self.reject(key, value);
                default
            }
        }
    }

    pub fn variant<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(value) = self.get(key) else {
            return default;
        };
        serde_json::from_value(value.clone()).unwrap_or_else(|_| {
            self.reject(key, value);
            default
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_text_settings_merge_keeps_valid_fields() {
        let settings = TextSettings::from_json(&json!({
            "positionX": 120,
            "scaleX": 2.5,
            "horizontalAlignment": "Center",
            "renderMode": "system",
            "fontColor": "#abc",
            "enableShadow": true
        }));
        assert_eq!(settings.position_x, 120.0);
        assert_eq!(settings.scale_x, 2.5);
        assert_eq!(settings.horizontal_alignment, HorizontalAlignment::Center);
        assert_eq!(settings.render_mode, RenderMode::System);
        assert_eq!(settings.font_color, Color::new(0xAA, 0xBB, 0xCC));
        assert!(settings.enable_shadow);
        assert_eq!(settings.font_size, 16.0);
    }

    #[test]
    fn test_text_settings_merge_substitutes_invalid_fields() {
        let settings = TextSettings::from_json(&json!({
            "positionX": "12",
            "scaleY": -1,
            "verticalAlignment": "Middle",
            "enableOutline": "yes",
            "outlineColor": "white",
            "renderMode": 3,
            "fontWeight": "heavy"
        }));
        let d = TextSettings::default();
        assert_eq!(settings, d);
    }

    #[test]
    fn test_text_settings_from_non_object() {
        assert_eq!(TextSettings::from_json(&Value::Null), TextSettings::default());
        assert_eq!(TextSettings::from_json(&json!([1, 2])), TextSettings::default());
    }

    #[test]
    fn test_font_sheet_settings_merge() {
        let settings = FontSheetSettings::from_json(&json!({
            "characterSequence": "ABC",
            "tileWidth": 16.0,
            "tileHeight": 0,
            "selectedFont": "font2",
            "enablePixelScanning": true
        }));
        assert_eq!(settings.character_sequence, "ABC");
        assert_eq!(settings.tile_width, 16);
        assert_eq!(settings.tile_height, 8);
        assert_eq!(settings.selected_font, FontSlot::Font2);
        assert!(settings.enable_pixel_scanning);
    }

    #[test]
    fn test_duplicate_characters_resolve_to_first_tile() {
        let settings = FontSheetSettings {
            character_sequence: "ABA".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.tile_index('A'), Some(0));
        assert_eq!(settings.tile_index('B'), Some(1));
        assert_eq!(settings.tile_index('Z'), None);
    }

    #[test]
    fn test_map_tile_char_pads_sequence() {
        let mut settings = FontSheetSettings {
            character_sequence: "AB".to_string(),
            ..Default::default()
        };
        settings.map_tile_char(4, 'E');
        assert_eq!(settings.character_sequence, "AB  E");
        settings.map_tile_char(0, 'a');
        assert_eq!(settings.character_sequence, "aB  E");
    }

    #[test]
    fn test_grid_signature() {
        assert_eq!(FontSheetSettings::default().grid_signature(), "8x8-0,0-1,1");
    }
}
