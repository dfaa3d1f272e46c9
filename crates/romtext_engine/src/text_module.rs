use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    color_tags::contains_color_tag,
    settings::FieldReader,
    FontSheetSettings, RenderMode, TextSettings,
};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LENGTH: usize = 13;

/// Random base-36 id.
pub fn generate_id() -> String {
    (0..ID_LENGTH).map(|_| ID_ALPHABET[fastrand::usize(..ID_ALPHABET.len())] as char).collect()
}

/// A positioned block of text with its own font and effect settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextModule {
    pub id: String,
    pub name: String,
    /// Raw text; a literal `\n` (backslash, n) separates paragraphs and, in
    /// batch mode, real newlines separate frames.
    pub text: String,
    pub text_settings: TextSettings,
    pub bitmap_font_settings: FontSheetSettings,
    pub is_batch_mode: bool,
    #[serde(skip)]
    pub current_batch_line_index: usize,
}

impl TextModule {
    /// A fresh module called `Module {number}` with default settings.
    pub fn new(number: usize) -> Self {
        Self {
            id: generate_id(),
            name: format!("Module {number}"),
            text: String::new(),
            text_settings: TextSettings::default(),
            bitmap_font_settings: FontSheetSettings::default(),
            is_batch_mode: false,
            current_batch_line_index: 0,
        }
    }

    /// Deep copy with a new id, named `<name> (Clone {number})`.
    pub fn clone_with_new_id(&self, number: usize) -> Self {
        Self {
            id: generate_id(),
            name: format!("{} (Clone {number})", self.name),
            ..self.clone()
        }
    }

    pub fn from_json(value: &Value) -> Self {
        let defaults = Self::new(1);
        let f = FieldReader::new(value, "textModule");
        let object = |key: &str| value.get(key).cloned().unwrap_or(Value::Null);
        Self {
            id: f.string("id").filter(|id| !id.is_empty()).unwrap_or(defaults.id),
            name: f.string("name").unwrap_or(defaults.name),
            text: f.string("text").unwrap_or_default(),
            text_settings: TextSettings::from_json(&object("textSettings")),
            bitmap_font_settings: FontSheetSettings::from_json(&object("bitmapFontSettings")),
            is_batch_mode: f.boolean("isBatchMode", false),
            current_batch_line_index: 0,
        }
    }

    pub fn is_bitmap(&self) -> bool {
        self.text_settings.render_mode == RenderMode::Bitmap
    }

    /// Frames of a batch module: its text split on real newlines.
    pub fn batch_lines(&self) -> Vec<&str> {
        self.text.split('\n').collect()
    }

    /// Text shown in the preview. Batch modules show their current line,
    /// falling back to the first line.
    pub fn preview_text(&self) -> &str {
        if !self.is_batch_mode {
            return &self.text;
        }
        let lines = self.batch_lines();
        lines
            .get(self.current_batch_line_index)
            .or(lines.first())
            .copied()
            .unwrap_or_default()
    }

    /// Whether the font sheet this module draws from must be run through the
    /// pixel pipeline even with transparency disabled.
    pub fn needs_editable_sheet(&self) -> bool {
        let settings = &self.text_settings;
        self.is_bitmap() && (settings.enable_font_colorization || settings.enable_shadow || settings.enable_outline || contains_color_tag(&self.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_generate_id() {
        let id = generate_id();
        assert_eq!(id.len(), 13);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_new_and_clone() {
        let mut module = TextModule::new(3);
        assert_eq!(module.name, "Module 3");
        module.text = "hello".to_string();
        module.text_settings.position_x = 42.0;

        let clone = module.clone_with_new_id(1);
        assert_eq!(clone.name, "Module 3 (Clone 1)");
        assert_ne!(clone.id, module.id);
        assert_eq!(clone.text, "hello");
        assert_eq!(clone.text_settings, module.text_settings);
    }

    #[test]
    fn test_preview_text() {
        let mut module = TextModule::new(1);
        module.text = "one\ntwo\nthree".to_string();
        assert_eq!(module.preview_text(), "one\ntwo\nthree");

        module.is_batch_mode = true;
        assert_eq!(module.preview_text(), "one");
        module.current_batch_line_index = 2;
        assert_eq!(module.preview_text(), "three");
        module.current_batch_line_index = 7;
        assert_eq!(module.preview_text(), "one");

        module.text.clear();
        assert_eq!(module.preview_text(), "");
    }

    #[test]
    fn test_from_json() {
        let module = TextModule::from_json(&json!({
            "id": "abc",
            "name": "Title",
            "text": "HELLO",
            "isBatchMode": "no",
            "currentBatchLineIndex": 4,
            "textSettings": { "positionX": 10 },
            "bitmapFontSettings": { "tileWidth": 16 }
        }));
        assert_eq!(module.id, "abc");
        assert_eq!(module.name, "Title");
        assert!(!module.is_batch_mode);
        assert_eq!(module.current_batch_line_index, 0);
        assert_eq!(module.text_settings.position_x, 10.0);
        assert_eq!(module.bitmap_font_settings.tile_width, 16);
    }

    #[test]
    fn test_serialization_skips_batch_index() {
        let mut module = TextModule::new(1);
        module.current_batch_line_index = 5;
        let value = serde_json::to_value(&module).unwrap();
        assert!(value.get("currentBatchLineIndex").is_none());
        assert_eq!(value["textSettings"]["renderMode"], "bitmap");
        assert_eq!(value["bitmapFontSettings"]["selectedFont"], "font1");
    }

    #[test]
    fn test_needs_editable_sheet() {
        let mut module = TextModule::new(1);
        assert!(!module.needs_editable_sheet());
        module.text = "<C#F00>x</C>".to_string();
        assert!(module.needs_editable_sheet());
        module.text_settings.render_mode = RenderMode::System;
        assert!(!module.needs_editable_sheet());
    }
}
