//! Profiles: the background, both font slots and the module list.
//!
//! The JSON layout is flat, with the second slot's fields suffixed by `2`
//! (`bitmapFontImage2`, `bitmapFontTransparentColor2`, ...).

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};
use image::RgbaImage;
use serde_json::{json, Map, Value};

use crate::{settings::FieldReader, EngineError, FontSlot, Result, TextModule, TransparencyConfig};

/// Where an image comes from: a file or an inline `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    DataUrl(String),
}

impl ImageSource {
    /// Relative paths are resolved against `base_dir`.
    pub fn parse(value: &str, base_dir: Option<&Path>) -> Self {
        if value.starts_with("data:") {
            return ImageSource::DataUrl(value.to_string());
        }
        let path = PathBuf::from(value);
        match base_dir {
            Some(dir) if path.is_relative() => ImageSource::Path(dir.join(path)),
            _ => ImageSource::Path(path),
        }
    }

    pub fn to_json_string(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::DataUrl(url) => url.clone(),
        }
    }

    pub fn load_bytes(&self) -> Result<Vec<u8>> {
        match self {
            ImageSource::Path(path) => std::fs::read(path).map_err(|e| EngineError::read_file(path, e.to_string())),
            ImageSource::DataUrl(url) => {
                let Some((header, payload)) = url.split_once(',') else {
                    return Err(EngineError::InvalidImageSource {
                        message: "data URL without payload".to_string(),
                    });
                };
                if !header.ends_with(";base64") {
                    return Err(EngineError::InvalidImageSource {
                        message: format!("unsupported data URL encoding '{header}'"),
                    });
                }
                Ok(STANDARD.decode(payload.trim())?)
            }
        }
    }

    pub fn load(&self) -> Result<RgbaImage> {
        Ok(image::load_from_memory(&self.load_bytes()?)?.to_rgba8())
    }

    /// Loads the image, logging and returning `None` on any failure.
    pub fn load_or_none(&self) -> Option<RgbaImage> {
        match self.load() {
            Ok(image) => Some(image),
            Err(err) => {
                log::warn!("could not load image {}: {err}", self.describe());
                None
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::DataUrl(url) => format!("data URL ({} bytes)", url.len()),
        }
    }
}

/// Which background the preview shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundView {
    Original,
    #[default]
    Editable,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FontSlotConfig {
    pub image: Option<ImageSource>,
    pub transparency: TransparencyConfig,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Profile {
    pub profile_id: Option<String>,
    pub profile_library_name: Option<String>,
    pub original_image: Option<ImageSource>,
    pub editable_image: Option<ImageSource>,
    pub font_slots: [FontSlotConfig; 2],
    pub text_modules: Vec<TextModule>,
}

fn slot_suffix(slot: FontSlot) -> &'static str {
    match slot {
        FontSlot::Font1 => "",
        FontSlot::Font2 => "2",
    }
}

impl Profile {
    /// Reads a profile, substituting defaults for every missing or mistyped field.
    ///
    /// # Errors
    ///
    /// Fails only if `value` is not a JSON object.
    pub fn from_json(value: &Value, base_dir: Option<&Path>) -> Result<Self> {
        if !value.is_object() {
            return Err(EngineError::invalid_profile("expected a JSON object"));
        }
        let f = FieldReader::new(value, "profile");
        let image = |key: &str| f.string(key).filter(|s| !s.is_empty()).map(|s| ImageSource::parse(&s, base_dir));

        let mut font_slots: [FontSlotConfig; 2] = Default::default();
        for slot in FontSlot::ALL {
            let suffix = slot_suffix(slot);
            let defaults = TransparencyConfig::default();
            font_slots[slot.index()] = FontSlotConfig {
                image: image(&format!("bitmapFontImage{suffix}")),
                transparency: TransparencyConfig {
                    color: f.color(&format!("bitmapFontTransparentColor{suffix}"), defaults.color),
                    enabled: f.boolean(&format!("bitmapFontEnableTransparency{suffix}"), defaults.enabled),
                    soft: f.boolean(&format!("bitmapFontSoftTransparency{suffix}"), defaults.soft),
                    soft_radius: f.number(&format!("bitmapFontSoftTransparencyRadius{suffix}"), defaults.soft_radius, |v| v >= 0.0),
                },
            };
        }

        let text_modules = match value.get("textModules") {
            Some(Value::Array(modules)) => modules.iter().map(TextModule::from_json).collect(),
            None | Some(Value::Null) => Vec::new(),
            Some(other) => {
                log::warn!("profile.textModules: expected an array, got {other}");
                Vec::new()
            }
        };

        Ok(Self {
            profile_id: f.string("profileId"),
            profile_library_name: f.string("profileLibraryName"),
            original_image: image("originalImage"),
            editable_image: image("editableImage"),
            font_slots,
            text_modules,
        })
    }

    pub fn from_json_str(json: &str, base_dir: Option<&Path>) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json(&value, base_dir)
    }

    /// Loads a profile file; relative image paths are taken relative to it.
    /// Without a stored library name the file name is used.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| EngineError::read_file(path, e.to_string()))?;
        let mut profile = Self::from_json_str(&json, path.parent())?;
        if profile.profile_library_name.is_none() {
            profile.profile_library_name = path.file_stem().map(|s| s.to_string_lossy().to_string());
        }
        Ok(profile)
    }

    /// Exports the profile. The transient batch line index is not written.
    pub fn to_json(&self) -> Value {
        let image = |source: &Option<ImageSource>| source.as_ref().map_or(Value::Null, |s| Value::String(s.to_json_string()));
        let mut map = Map::new();
        if let Some(id) = &self.profile_id {
            map.insert("profileId".into(), json!(id));
        }
        if let Some(name) = &self.profile_library_name {
            map.insert("profileLibraryName".into(), json!(name));
        }
        map.insert("originalImage".into(), image(&self.original_image));
        map.insert("editableImage".into(), image(&self.editable_image));
        for slot in FontSlot::ALL {
            let suffix = slot_suffix(slot);
            let config = &self.font_slots[slot.index()];
            map.insert(format!("bitmapFontImage{suffix}"), image(&config.image));
            map.insert(format!("bitmapFontTransparentColor{suffix}"), json!(config.transparency.color.to_hex()));
            map.insert(format!("bitmapFontEnableTransparency{suffix}"), json!(config.transparency.enabled));
            map.insert(format!("bitmapFontSoftTransparency{suffix}"), json!(config.transparency.soft));
            map.insert(format!("bitmapFontSoftTransparencyRadius{suffix}"), json!(config.transparency.soft_radius));
        }
        map.insert(
            "textModules".into(),
            Value::Array(self.text_modules.iter().map(|m| serde_json::to_value(m).unwrap_or(Value::Null)).collect()),
        );
        Value::Object(map)
    }

    pub fn slot(&self, slot: FontSlot) -> &FontSlotConfig {
        &self.font_slots[slot.index()]
    }

    pub fn background(&self, view: BackgroundView) -> Option<&ImageSource> {
        match view {
            BackgroundView::Original => self.original_image.as_ref(),
            BackgroundView::Editable => self.editable_image.as_ref(),
        }
    }

    pub fn module(&self, id: &str) -> Result<&TextModule> {
        self.text_modules
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| EngineError::UnknownModule { id: id.to_string() })
    }

    /// Appends a default module named after the next free number.
    pub fn add_module(&mut self) -> &TextModule {
        let module = TextModule::new(self.text_modules.len() + 1);
        self.text_modules.push(module);
        &self.text_modules[self.text_modules.len() - 1]
    }

    /// Inserts a clone of module `id` right after it.
    pub fn clone_module(&mut self, id: &str) -> Result<&TextModule> {
        let index = self
            .text_modules
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| EngineError::UnknownModule { id: id.to_string() })?;
        let clones = self.text_modules.iter().filter(|m| m.name.starts_with(&format!("{} (Clone", self.text_modules[index].name))).count();
        let clone = self.text_modules[index].clone_with_new_id(clones + 1);
        self.text_modules.insert(index + 1, clone);
        Ok(&self.text_modules[index + 1])
    }

    pub fn remove_module(&mut self, id: &str) -> Result<TextModule> {
        let index = self
            .text_modules
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| EngineError::UnknownModule { id: id.to_string() })?;
        Ok(self.text_modules.remove(index))
    }
}
