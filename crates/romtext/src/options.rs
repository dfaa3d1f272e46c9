use std::{collections::BTreeMap, fs, path::PathBuf};

use romtext_engine::{clamp_zoom, Color, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, PREVIEW_FILL};
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "romtext";
const OPTIONS_FILE: &str = "romtext.toml";

/// Defaults for every command, read from `romtext.toml` in the config directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub fill_color: Color,
    pub preview_zoom: f32,
    /// Directories scanned for system fonts.
    pub font_dirs: Vec<PathBuf>,
    /// Generic CSS families mapped to installed ones, e.g. `sans-serif = "DejaVu Sans"`.
    pub generic_families: BTreeMap<String, String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            fill_color: PREVIEW_FILL,
            preview_zoom: 1.0,
            font_dirs: Vec::new(),
            generic_families: BTreeMap::new(),
        }
    }
}

impl Options {
    pub fn get_config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "GitHub", APP_NAME).map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
    }

    /// Reads the options file. A missing or broken file yields the defaults.
    pub fn load_options() -> Self {
        let Some(dir) = Self::get_config_dir() else {
            return Self::default();
        };
        let options_file = dir.join(OPTIONS_FILE);
        if !options_file.exists() {
            return Self::default();
        }
        match fs::read_to_string(&options_file) {
            Ok(txt) => match Self::from_toml(&txt) {
                Ok(options) => options,
                Err(err) => {
                    log::error!("Error parsing {}: {err}", options_file.display());
                    Self::default()
                }
            },
            Err(err) => {
                log::error!("Error reading options file: {err}");
                Self::default()
            }
        }
    }

    pub fn from_toml(txt: &str) -> anyhow::Result<Self> {
        let mut options: Options = toml::from_str(txt)?;
        options.preview_zoom = clamp_zoom(options.preview_zoom);
        Ok(options)
    }

    /// Command line values win over the file.
    pub fn apply_overrides(&mut self, overrides: &Overrides) -> anyhow::Result<()> {
        if let Some(width) = overrides.width {
            self.canvas_width = width;
        }
        if let Some(height) = overrides.height {
            self.canvas_height = height;
        }
        if let Some(fill) = &overrides.fill {
            self.fill_color = Color::from_hex(fill)?;
        }
        if let Some(zoom) = overrides.zoom {
            self.preview_zoom = clamp_zoom(zoom);
        }
        self.font_dirs.extend(overrides.fonts.iter().cloned());
        Ok(())
    }
}

/// Option values given on the command line.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct Overrides {
    /// Canvas width used when the profile has no background
    #[arg(long)]
    pub width: Option<u32>,

    /// Canvas height used when the profile has no background
    #[arg(long)]
    pub height: Option<u32>,

    /// Fill color behind the background, e.g. #E5E7EB
    #[arg(long, value_name = "COLOR")]
    pub fill: Option<String>,

    /// Preview zoom the shadow and outline sizes scale with
    #[arg(long)]
    pub zoom: Option<f32>,

    /// Extra directory to scan for system fonts (repeatable)
    #[arg(long, value_name = "DIR")]
    pub fonts: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let options = Options::from_toml("canvas_width = 256\nfill_color = \"#000\"\npreview_zoom = 9.0\n").unwrap();
        assert_eq!(options.canvas_width, 256);
        assert_eq!(options.canvas_height, DEFAULT_CANVAS_HEIGHT);
        assert_eq!(options.fill_color, Color::BLACK);
        assert_eq!(options.preview_zoom, 4.0);
    }

    #[test]
    fn test_generic_families_table() {
        let options = Options::from_toml("[generic_families]\nsans-serif = \"DejaVu Sans\"\nmonospace = \"DejaVu Sans Mono\"\n").unwrap();
        assert_eq!(options.generic_families.get("sans-serif").map(String::as_str), Some("DejaVu Sans"));
        assert_eq!(options.generic_families.len(), 2);
        assert!(Options::default().generic_families.is_empty());
    }

    #[test]
    fn test_bad_color_is_rejected() {
        assert!(Options::from_toml("fill_color = \"purple\"").is_err());
    }

    #[test]
    fn test_overrides() {
        let mut options = Options::default();
        options
            .apply_overrides(&Overrides {
                height: Some(100),
                fill: Some("ff0000".to_string()),
                zoom: Some(1.52),
                fonts: vec![PathBuf::from("fonts")],
                ..Default::default()
            })
            .unwrap();
        assert_eq!(options.canvas_width, DEFAULT_CANVAS_WIDTH);
        assert_eq!(options.canvas_height, 100);
        assert_eq!(options.fill_color, Color::new(255, 0, 0));
        assert!((options.preview_zoom - 1.5).abs() < 1e-6);
        assert_eq!(options.font_dirs, vec![PathBuf::from("fonts")]);
    }
}
