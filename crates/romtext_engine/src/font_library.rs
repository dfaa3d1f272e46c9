//! Registry of outline fonts used by system render mode.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use ab_glyph::FontArc;
use walkdir::WalkDir;

use crate::{EngineError, FontStyle, FontWeight, Result, TextSettings};

const FONT_EXTENSIONS: [&str; 3] = ["ttf", "otf", "ttc"];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FaceKey {
    pub family: String,
    pub weight: FontWeight,
    pub style: FontStyle,
}

impl FaceKey {
    pub fn new(family: &str, weight: FontWeight, style: FontStyle) -> Self {
        Self {
            family: normalize_family(family),
            weight,
            style,
        }
    }
}

/// Lower-cased, with everything but letters and digits removed, so that
/// `"Trebuchet MS"` and `TrebuchetMS` name the same family.
pub fn normalize_family(family: &str) -> String {
    family.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase).collect()
}

/// Splits a CSS `font-family` value into its families, quotes removed.
pub fn parse_family_list(css: &str) -> Vec<String> {
    css.split(',')
        .map(|family| family.trim().trim_matches(|c| c == '"' || c == '\'').trim().to_string())
        .filter(|family| !family.is_empty())
        .collect()
}

/// Guesses family, weight and style from a font file stem such as
/// `DejaVuSans-BoldOblique` or `Liberation Serif Italic`.
pub fn classify_face(stem: &str) -> FaceKey {
    let lower = stem.to_lowercase();
    let weight = if lower.contains("bold") { FontWeight::Bold } else { FontWeight::Normal };
    let style = if lower.contains("italic") || lower.contains("oblique") {
        FontStyle::Italic
    } else {
        FontStyle::Normal
    };

    let family = match stem.split_once('-') {
        Some((family, _)) => family.to_string(),
        None => stem
            .split_whitespace()
            .filter(|word| !matches!(word.to_lowercase().as_str(), "bold" | "italic" | "oblique" | "regular" | "bolditalic" | "boldoblique"))
            .collect::<Vec<_>>()
            .join(" "),
    };
    FaceKey::new(&family, weight, style)
}

#[derive(Default)]
pub struct FontLibrary {
    faces: HashMap<FaceKey, FontArc>,
    custom: HashMap<String, FontArc>,
    generic: HashMap<String, String>,
}

impl FontLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_bytes(&mut self, family: &str, weight: FontWeight, style: FontStyle, bytes: Vec<u8>) -> Result<()> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| EngineError::font_load(family, e))?;
        self.faces.insert(FaceKey::new(family, weight, style), font);
        Ok(())
    }

    /// Loads a font file, deriving its key from the file name.
    pub fn register_file(&mut self, path: &Path) -> Result<FaceKey> {
        let bytes = std::fs::read(path).map_err(|e| EngineError::read_file(path, e.to_string()))?;
        let stem = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        let key = classify_face(&stem);
        let font = FontArc::try_from_vec(bytes).map_err(|e| EngineError::font_load(path.display().to_string(), e))?;
        self.faces.insert(key.clone(), font);
        Ok(key)
    }

    /// Registers every font file below `dir`. Unreadable files are skipped.
    pub fn scan_directory(&mut self, dir: &Path) -> usize {
        let mut count = 0;
        let files: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| FONT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            })
            .collect();

        for path in files {
            match self.register_file(&path) {
                Ok(_) => count += 1,
                Err(err) => log::warn!("skipping font {}: {err}", path.display()),
            }
        }
        log::debug!("registered {count} fonts from {}", dir.display());
        count
    }

    /// Registers a user supplied font under its family name.
    pub fn register_custom(&mut self, name: &str, bytes: Vec<u8>) -> Result<()> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| EngineError::font_load(name, e))?;
        self.custom.insert(normalize_family(name), font);
        Ok(())
    }

    /// Maps a generic CSS family such as `sans-serif` to a registered family.
    pub fn set_generic_family(&mut self, generic: &str, family: &str) {
        self.generic.insert(normalize_family(generic), normalize_family(family));
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty() && self.custom.is_empty()
    }

    fn face(&self, family: &str, weight: FontWeight, style: FontStyle) -> Option<&FontArc> {
        let family = normalize_family(family);
        let family = self.generic.get(&family).cloned().unwrap_or(family);
        [(weight, style), (weight, FontStyle::Normal), (FontWeight::Normal, style), (FontWeight::Normal, FontStyle::Normal)]
            .into_iter()
            .find_map(|(weight, style)| {
                self.faces.get(&FaceKey {
                    family: family.clone(),
                    weight,
                    style,
                })
            })
    }

    /// Font for a module: its custom font if one is registered, otherwise the
    /// first family of its family list that the library knows.
    pub fn resolve(&self, settings: &TextSettings) -> Option<&FontArc> {
        let custom = [settings.custom_font_family_name.as_deref(), settings.custom_font_file_name.as_deref()];
        if let Some(font) = custom.into_iter().flatten().find_map(|name| self.custom.get(&normalize_family(name))) {
            return Some(font);
        }
        parse_family_list(&settings.font_family)
            .iter()
            .find_map(|family| self.face(family, settings.font_weight, settings.font_style))
    }
}
