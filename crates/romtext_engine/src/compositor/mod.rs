//! Draws laid out text blocks into a frame.

use std::collections::HashMap;

use image::RgbaImage;

use crate::{
    color_tags::{tokenize, ColorScope, Segment},
    Color, GlyphSource, GlyphSprite, TextBlock, TextSettings,
};

pub mod effects;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowEffect {
    pub color: Color,
    pub offset_x: i64,
    pub offset_y: i64,
    pub sigma: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineEffect {
    pub color: Color,
    pub width: i64,
}

/// Glyph effects of a module, resolved for a preview zoom.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Effects {
    pub shadow: Option<ShadowEffect>,
    pub outline: Option<OutlineEffect>,
}

impl Effects {
    /// Shadow offset, shadow blur and outline width all scale with the preview zoom.
    pub fn from_settings(settings: &TextSettings, zoom: f32) -> Self {
        let shadow = settings.enable_shadow.then(|| ShadowEffect {
            color: settings.shadow_color,
            offset_x: (settings.shadow_offset_x * zoom).round() as i64,
            offset_y: (settings.shadow_offset_y * zoom).round() as i64,
            sigma: settings.shadow_blur * zoom / 2.0,
        });
        let outline_width = (settings.outline_width * zoom).round() as i64;
        let outline = (settings.enable_outline && settings.outline_width > 0.0 && outline_width > 0).then_some(OutlineEffect {
            color: settings.outline_color,
            width: outline_width,
        });
        Self { shadow, outline }
    }
}

/// Draws one glyph back to front: shadow, outline, then the glyph itself.
pub fn draw_glyph(canvas: &mut RgbaImage, sprite: &RgbaImage, x: i64, y: i64, tint: Option<Color>, effects: &Effects) {
    if let Some(shadow) = effects.shadow {
        let mask = effects::silhouette(sprite, shadow.color);
        let (blurred, pad) = effects::blur_silhouette(&mask, shadow.color, shadow.sigma);
        effects::blend(canvas, &blurred, x + shadow.offset_x - pad as i64, y + shadow.offset_y - pad as i64);
    }

    if let Some(outline) = effects.outline {
        let mask = effects::silhouette(sprite, outline.color);
        for (dx, dy) in effects::outline_offsets(outline.width) {
            effects::blend(canvas, &mask, x + dx, y + dy);
        }
    }

    match tint {
        Some(color) => {
            let mut tinted = sprite.clone();
            effects::multiply(&mut tinted, color);
            effects::blend(canvas, &tinted, x, y);
        }
        None => effects::blend(canvas, sprite, x, y),
    }
}

/// Draws every line of `block`.
///
/// Tag state starts fresh on each line. Characters the source has no glyph
/// for are skipped entirely; every other visible character advances the pen
/// by its width, plus the source's spacing before the next one.
pub fn draw_block(canvas: &mut RgbaImage, block: &TextBlock, source: &dyn GlyphSource, effects: &Effects) {
    let spacing = source.to_canvas_x(source.spacing());
    let mut sprites: HashMap<char, Option<GlyphSprite>> = HashMap::new();

    for (index, line) in block.lines.iter().enumerate() {
        let (mut cursor, top) = block.line_origin(index);
        let mut scope = ColorScope::new();
        let mut first = true;

        for segment in tokenize(line) {
            let Segment::Text(run) = segment else {
                scope.apply(&segment);
                continue;
            };
            for ch in run.chars() {
                let Some(advance) = source.advance(ch) else {
                    continue;
                };
                if !first {
                    cursor += spacing;
                }
                first = false;

                if let Some(sprite) = sprites.entry(ch).or_insert_with(|| source.sprite(ch)) {
                    let x = (cursor + sprite.dx).round() as i64;
                    let y = (top + sprite.dy).round() as i64;
                    draw_glyph(canvas, &sprite.pixels, x, y, source.tint(scope.active()), effects);
                }
                cursor += source.to_canvas_x(advance);
            }
        }
    }
}
