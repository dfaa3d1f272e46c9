//! The rendering session: owns the assets and caches and renders frames.

use std::{collections::HashMap, sync::Arc};

use image::{Rgba, RgbaImage};
use parking_lot::Mutex;

use crate::{
    compositor::{self, effects, Effects},
    line_wrapper::wrap_lines,
    transparency::{process_sheet, ProcessSignature},
    BackgroundView, Color, FontLibrary, FontSheet, FontSlot, GlyphMetricsCache, GlyphSource, Profile, Rect, RenderMode, SystemFontGlyphSource, TextBlock,
    TextModule, TileGlyphSource, TransparencyConfig,
};

pub const DEFAULT_CANVAS_WIDTH: u32 = 512;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 384;

/// Neutral fill behind the background image.
pub const PREVIEW_FILL: Color = Color::new(0xE5, 0xE7, 0xEB);

#[derive(Default)]
struct SlotState {
    raw: Option<FontSheet>,
    transparency: TransparencyConfig,
    processed: Mutex<HashMap<ProcessSignature, FontSheet>>,
}

impl SlotState {
    fn prepared(&self, force: bool) -> Option<FontSheet> {
        let raw = self.raw.as_ref()?;
        let signature = self.transparency.signature(raw.identity(), force);
        let mut processed = self.processed.lock();
        let sheet = processed
            .entry(signature)
            .or_insert_with(|| process_sheet(raw, &self.transparency, force))
            .clone();
        Some(sheet)
    }

    /// Identities of every sheet derived from the current raw sheet.
    fn identities(&self) -> Vec<u32> {
        let mut result: Vec<u32> = self.processed.lock().values().map(FontSheet::identity).collect();
        result.extend(self.raw.as_ref().map(FontSheet::identity));
        result
    }
}

pub struct RenderSession {
    slots: [SlotState; 2],
    background: Option<RgbaImage>,
    canvas_size: (u32, u32),
    fill_color: Color,
    metrics: Arc<GlyphMetricsCache>,
    fonts: FontLibrary,
}

impl Default for RenderSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSession {
    pub fn new() -> Self {
        Self::with_metrics_cache(Arc::new(GlyphMetricsCache::new()))
    }

    /// A session sharing an existing glyph metrics cache.
    pub fn with_metrics_cache(metrics: Arc<GlyphMetricsCache>) -> Self {
        Self {
            slots: Default::default(),
            background: None,
            canvas_size: (DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT),
            fill_color: PREVIEW_FILL,
            metrics,
            fonts: FontLibrary::new(),
        }
    }

    pub fn metrics_cache(&self) -> &Arc<GlyphMetricsCache> {
        &self.metrics
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontLibrary {
        &mut self.fonts
    }

    /// Replaces the sheet of a slot. Metrics scanned from the old sheet are dropped.
    pub fn set_font_sheet(&mut self, slot: FontSlot, sheet: Option<FontSheet>) {
        let state = &mut self.slots[slot.index()];
        if state.raw == sheet {
            return;
        }
        for identity in state.identities() {
            self.metrics.invalidate_sheet(identity);
        }
        state.processed.lock().clear();
        state.raw = sheet;
    }

    pub fn font_sheet(&self, slot: FontSlot) -> Option<&FontSheet> {
        self.slots[slot.index()].raw.as_ref()
    }

    pub fn set_transparency(&mut self, slot: FontSlot, config: TransparencyConfig) {
        let state = &mut self.slots[slot.index()];
        if state.transparency != config {
            state.transparency = config;
            state.processed.lock().clear();
        }
    }

    pub fn transparency(&self, slot: FontSlot) -> &TransparencyConfig {
        &self.slots[slot.index()].transparency
    }

    /// The sheet modules on `slot` draw from, keyed and memoized.
    pub fn prepared_sheet(&self, slot: FontSlot, force: bool) -> Option<FontSheet> {
        self.slots[slot.index()].prepared(force)
    }

    pub fn set_background(&mut self, background: Option<RgbaImage>) {
        self.background = background.filter(|image| image.width() > 0 && image.height() > 0);
    }

    pub fn background(&self) -> Option<&RgbaImage> {
        self.background.as_ref()
    }

    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.canvas_size = (width.max(1), height.max(1));
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
    }

    /// Loads every image a profile references. Images that fail to load leave
    /// their slot empty.
    pub fn load_profile(&mut self, profile: &Profile, view: BackgroundView) {
        for slot in FontSlot::ALL {
            let config = profile.slot(slot);
            let sheet = config.image.as_ref().and_then(|source| source.load_or_none()).map(FontSheet::new);
            self.set_font_sheet(slot, sheet);
            self.set_transparency(slot, config.transparency);
        }
        self.set_background(profile.background(view).and_then(|source| source.load_or_none()));
    }

    /// Size of rendered frames: the background's, or the canvas size without one.
    pub fn frame_size(&self) -> (u32, u32) {
        self.background.as_ref().map_or(self.canvas_size, RgbaImage::dimensions)
    }

    fn slot_needs_editable_sheet(modules: &[TextModule], slot: FontSlot) -> bool {
        modules
            .iter()
            .any(|m| m.bitmap_font_settings.selected_font == slot && m.needs_editable_sheet())
    }

    /// Runs `f` with the glyph source of `module`. Returns `None` when the
    /// module's font asset is not available.
    fn with_source<R>(&self, module: &TextModule, force: bool, f: impl FnOnce(&dyn GlyphSource) -> R) -> Option<R> {
        match module.text_settings.render_mode {
            RenderMode::Bitmap => {
                let slot = module.bitmap_font_settings.selected_font;
                let Some(sheet) = self.prepared_sheet(slot, force) else {
                    log::debug!("module '{}' skipped: no image in {slot:?}", module.name);
                    return None;
                };
                let source = TileGlyphSource::new(&sheet, &module.bitmap_font_settings, &module.text_settings, &self.metrics);
                Some(f(&source))
            }
            RenderMode::System => {
                let Some(font) = self.fonts.resolve(&module.text_settings) else {
                    log::warn!("module '{}' skipped: no font for '{}'", module.name, module.text_settings.font_family);
                    return None;
                };
                let source = SystemFontGlyphSource::new(font, &module.text_settings);
                Some(f(&source))
            }
        }
    }

    /// Wrapped and positioned text of a module, or `None` if it has no text
    /// or no usable font.
    pub fn layout_module(&self, module: &TextModule) -> Option<TextBlock> {
        let text = module.preview_text();
        if text.is_empty() {
            return None;
        }
        self.with_source(module, false, |source| {
            let lines = wrap_lines(text, source, module.text_settings.line_wrap_width);
            TextBlock::layout(lines, source, &module.text_settings)
        })
    }

    pub fn module_bounds(&self, module: &TextModule) -> Option<Rect> {
        self.layout_module(module).map(|block| block.bounds)
    }

    /// The topmost module whose bounds contain the canvas point `(x, y)`.
    /// Later modules are drawn on top, so they win.
    pub fn hit_test<'m>(&self, modules: &'m [TextModule], x: f32, y: f32) -> Option<&'m TextModule> {
        modules
            .iter()
            .rev()
            .find(|module| self.module_bounds(module).is_some_and(|bounds| bounds.contains(x, y)))
    }

    /// Renders one frame: fill, background, then every module in list order.
    ///
    /// `preview_zoom` only scales shadow and outline sizes; the frame is
    /// always produced at native resolution.
    pub fn render(&self, modules: &[TextModule], preview_zoom: f32) -> RgbaImage {
        let (width, height) = self.frame_size();
        let mut frame = RgbaImage::from_pixel(width, height, Rgba([self.fill_color.r, self.fill_color.g, self.fill_color.b, 255]));
        if let Some(background) = &self.background {
            effects::blend(&mut frame, background, 0, 0);
        }

        let force = [
            Self::slot_needs_editable_sheet(modules, FontSlot::Font1),
            Self::slot_needs_editable_sheet(modules, FontSlot::Font2),
        ];
        for module in modules {
            let text = module.preview_text();
            if text.is_empty() {
                continue;
            }
            let effects = Effects::from_settings(&module.text_settings, preview_zoom);
            let slot_force = force[module.bitmap_font_settings.selected_font.index()];
            self.with_source(module, slot_force, |source| {
                let lines = wrap_lines(text, source, module.text_settings.line_wrap_width);
                let block = TextBlock::layout(lines, source, &module.text_settings);
                compositor::draw_block(&mut frame, &block, source, &effects);
            });
        }
        frame
    }
}
