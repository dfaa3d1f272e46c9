use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use romtext_engine::{batch::encode_png, export_frames, screen_to_canvas, BackgroundView, DragState, Profile, RenderSession};

use crate::Options;

/// Loads a profile and a session prepared to render it.
pub fn open(profile_path: &Path, view: BackgroundView, options: &Options) -> anyhow::Result<(Profile, RenderSession)> {
    let profile = Profile::load(profile_path).with_context(|| format!("loading profile {}", profile_path.display()))?;

    let mut session = RenderSession::new();
    session.set_canvas_size(options.canvas_width, options.canvas_height);
    session.set_fill_color(options.fill_color);
    for dir in &options.font_dirs {
        let count = session.fonts_mut().scan_directory(dir);
        log::info!("{count} fonts found in {}", dir.display());
    }
    for (generic, family) in &options.generic_families {
        session.fonts_mut().set_generic_family(generic, family);
    }
    register_custom_fonts(&mut session, &profile, profile_path.parent(), &options.font_dirs);
    session.load_profile(&profile, view);

    log::info!(
        "loaded '{}' with {} modules",
        profile.profile_library_name.as_deref().unwrap_or_default(),
        profile.text_modules.len()
    );
    Ok((profile, session))
}

/// Uploaded fonts are stored in profiles by file name only; look for them
/// beside the profile and in the font directories.
fn register_custom_fonts(session: &mut RenderSession, profile: &Profile, profile_dir: Option<&Path>, font_dirs: &[PathBuf]) {
    let mut seen = HashSet::new();
    for module in profile.text_modules.iter().filter(|m| !m.is_bitmap()) {
        let Some(file_name) = module.text_settings.custom_font_file_name.as_deref() else {
            continue;
        };
        if !seen.insert(file_name.to_string()) {
            continue;
        }
        let Some(path) = profile_dir.into_iter().chain(font_dirs.iter().map(PathBuf::as_path)).map(|dir| dir.join(file_name)).find(|p| p.is_file())
        else {
            log::warn!("custom font '{file_name}' of module '{}' not found", module.name);
            continue;
        };
        let result = fs::read(&path).map_err(anyhow::Error::from).and_then(|bytes| Ok(session.fonts_mut().register_custom(file_name, bytes)?));
        if let Err(err) = result {
            log::warn!("custom font {}: {err}", path.display());
        }
    }
}

pub fn render(profile_path: &Path, output: &Path, original: bool, options: &Options) -> anyhow::Result<()> {
    let view = if original { BackgroundView::Original } else { BackgroundView::Editable };
    let (profile, session) = open(profile_path, view, options)?;
    let frame = session.render(&profile.text_modules, options.preview_zoom);
    fs::write(output, encode_png(&frame)?).with_context(|| format!("writing {}", output.display()))?;
    println!("{} ({}x{})", output.display(), frame.width(), frame.height());
    Ok(())
}

pub fn batch(profile_path: &Path, output_dir: &Path, options: &Options) -> anyhow::Result<()> {
    let (mut profile, session) = open(profile_path, BackgroundView::Editable, options)?;
    let export = export_frames(&session, &mut profile.text_modules, options.preview_zoom)?;
    let output = output_dir.join(export.file_name());
    fs::create_dir_all(output_dir)?;
    fs::write(&output, export.into_bytes()?).with_context(|| format!("writing {}", output.display()))?;
    println!("{}", output.display());
    Ok(())
}

pub fn hit(profile_path: &Path, point: (f32, f32), screen: bool, options: &Options) -> anyhow::Result<()> {
    let (profile, session) = open(profile_path, BackgroundView::Editable, options)?;
    let (x, y) = if screen {
        screen_to_canvas(point.0, point.1, options.preview_zoom)
    } else {
        point
    };
    match session.hit_test(&profile.text_modules, x, y) {
        Some(module) => println!("{}\t{}", module.id, module.name),
        None => println!("no module at {x},{y}"),
    }
    Ok(())
}

pub fn drag(profile_path: &Path, from: (f32, f32), to: (f32, f32), output: &Path, options: &Options) -> anyhow::Result<()> {
    let (mut profile, session) = open(profile_path, BackgroundView::Editable, options)?;
    let zoom = options.preview_zoom;
    let (x, y) = screen_to_canvas(from.0, from.1, zoom);
    let Some(module) = session.hit_test(&profile.text_modules, x, y) else {
        anyhow::bail!("no module at {x},{y}");
    };
    let drag = DragState::begin(module, from.0, from.1);
    drag.update(&mut profile.text_modules, to.0, to.1, zoom)?;

    let moved = profile.module(&drag.module_id)?;
    log::info!(
        "moved '{}' to {},{}",
        moved.name,
        moved.text_settings.position_x,
        moved.text_settings.position_y
    );
    let json = serde_json::to_string_pretty(&profile.to_json())?;
    fs::write(output, json).with_context(|| format!("writing {}", output.display()))?;
    Ok(())
}
