//! Outline font rendering against the DejaVu Sans Mono fixtures.

use ab_glyph::FontArc;
use image::RgbaImage;
use pretty_assertions::assert_eq;
use romtext_engine::{
    wrap_lines, Color, FontLibrary, FontStyle, FontWeight, GlyphSource, Rect, RenderMode, RenderSession, SystemFontGlyphSource, TextModule,
    TextSettings,
};

const REGULAR: &[u8] = include_bytes!("fonts/DejaVuSansMono.ttf");
const BOLD: &[u8] = include_bytes!("fonts/DejaVuSansMono-Bold.ttf");
const FAMILY: &str = "DejaVu Sans Mono";

fn regular() -> FontArc {
    FontArc::try_from_slice(REGULAR).unwrap()
}

fn settings() -> TextSettings {
    TextSettings {
        render_mode: RenderMode::System,
        font_family: format!("'{FAMILY}', monospace"),
        ..Default::default()
    }
}

fn system_module(text: &str) -> TextModule {
    let mut module = TextModule::new(1);
    module.text = text.to_string();
    module.text_settings = settings();
    module
}

fn session() -> RenderSession {
    let mut session = RenderSession::new();
    session.set_canvas_size(200, 80);
    session.set_fill_color(Color::WHITE);
    session.fonts_mut().register_bytes(FAMILY, FontWeight::Normal, FontStyle::Normal, REGULAR.to_vec()).unwrap();
    session
}

#[test]
fn test_notdef_takes_no_room() {
    let font = regular();
    let text = settings();
    let source = SystemFontGlyphSource::new(&font, &text);
    for ch in ['中', '\u{E000}'] {
        assert_eq!(source.advance(ch), None, "{ch:?}");
        assert!(source.sprite(ch).is_none(), "{ch:?}");
    }
    assert_eq!(source.measure("a中a"), source.measure("aa"));

    // a space has an advance but nothing to draw
    assert!(source.advance(' ').is_some_and(|advance| advance > 0.0));
    assert!(source.sprite(' ').is_none());
}

#[test]
fn test_measure_is_unscaled() {
    let font = regular();
    let plain = settings();
    let scaled = TextSettings {
        scale_x: 2.0,
        scale_y: 2.0,
        zoom_factor: 1.5,
        ..settings()
    };
    let plain_source = SystemFontGlyphSource::new(&font, &plain);
    let scaled_source = SystemFontGlyphSource::new(&font, &scaled);

    let advance = plain_source.advance('H').unwrap();
    assert_eq!(plain_source.advance('i'), plain_source.advance('m'));
    let width = plain_source.measure("Hello");
    assert!((width - 5.0 * advance).abs() < 1e-3);

    assert_eq!(scaled_source.measure("Hello"), width);
    assert_eq!(scaled_source.to_canvas_x(width), width * 3.0);
    assert_eq!(plain_source.to_canvas_x(width), width);
    assert_eq!(scaled_source.wrap_budget(100.0), 100.0);
    assert_eq!(plain_source.line_pitch(), 16.0);
    assert_eq!(scaled_source.line_pitch(), 48.0);
}

#[test]
fn test_sprite_sits_below_line_top() {
    let font = regular();
    let text = TextSettings { font_size: 32.0, ..settings() };
    let source = SystemFontGlyphSource::new(&font, &text);

    let cap = source.sprite('X').unwrap();
    let small = source.sprite('x').unwrap();
    let descender = source.sprite('g').unwrap();
    assert!(cap.dy > 0.0);
    assert!(small.dy > cap.dy);
    assert!(descender.dy + descender.pixels.height() as f32 > small.dy + small.pixels.height() as f32);
    assert!(cap.pixels.pixels().any(|pixel| pixel[3] == 255));

    let tall = TextSettings { scale_y: 2.0, ..text.clone() };
    let stretched = SystemFontGlyphSource::new(&font, &tall).sprite('X').unwrap();
    assert!((stretched.dy - 2.0 * cap.dy).abs() <= 2.0);
    assert_eq!(stretched.pixels.width(), cap.pixels.width());
}

fn glyph_pixels(font: &FontArc) -> RgbaImage {
    let text = TextSettings { font_size: 32.0, ..settings() };
    SystemFontGlyphSource::new(font, &text).sprite('a').unwrap().pixels
}

fn library(faces: &[(FontWeight, FontStyle, &[u8])]) -> FontLibrary {
    let mut library = FontLibrary::new();
    for (weight, style, bytes) in faces {
        library.register_bytes(FAMILY, *weight, *style, bytes.to_vec()).unwrap();
    }
    library
}

fn resolves_bold(library: &FontLibrary) -> bool {
    let text = TextSettings {
        font_weight: FontWeight::Bold,
        font_style: FontStyle::Italic,
        ..settings()
    };
    let font = library.resolve(&text).unwrap();
    glyph_pixels(font) == glyph_pixels(&FontArc::try_from_slice(BOLD).unwrap())
}

#[test]
fn test_face_fallback_order() {
    use FontStyle::{Italic, Normal as Upright};
    use FontWeight::{Bold, Normal};
    assert_ne!(glyph_pixels(&regular()), glyph_pixels(&FontArc::try_from_slice(BOLD).unwrap()));

    // each case puts the bold face where a bold italic request should find it first
    let cases: [&[(FontWeight, FontStyle, &[u8])]; 4] = [
        &[(Bold, Italic, BOLD), (Bold, Upright, REGULAR), (Normal, Italic, REGULAR), (Normal, Upright, REGULAR)],
        &[(Bold, Upright, BOLD), (Normal, Italic, REGULAR), (Normal, Upright, REGULAR)],
        &[(Normal, Italic, BOLD), (Normal, Upright, REGULAR)],
        &[(Normal, Upright, BOLD)],
    ];
    for (step, faces) in cases.iter().enumerate() {
        assert!(resolves_bold(&library(faces)), "fallback step {step}");
    }

    let text = TextSettings {
        font_family: "Missing, 'Also Missing'".to_string(),
        ..settings()
    };
    assert!(library(cases[0]).resolve(&text).is_none());
}

#[test]
fn test_wrap_budget_ignores_scale() {
    let font = regular();
    let plain = settings();
    let scaled = TextSettings { scale_x: 3.0, ..settings() };
    let plain_source = SystemFontGlyphSource::new(&font, &plain);
    let scaled_source = SystemFontGlyphSource::new(&font, &scaled);

    let budget = plain_source.measure("aa aa");
    for source in [&plain_source, &scaled_source] {
        assert_eq!(wrap_lines("aa aa aa", source, budget), vec!["aa aa", "aa"]);
        assert_eq!(wrap_lines("aa aa aa", source, budget - 0.5), vec!["aa", "aa", "aa"]);
    }
}

#[test]
fn test_bounds_of_system_module() {
    let session = session();
    let mut module = system_module("Hello");
    module.text_settings.font_size = 20.0;
    module.text_settings.position_x = 10.0;
    module.text_settings.position_y = 10.0;
    module.text_settings.scale_x = 2.0;

    let font = regular();
    let source = SystemFontGlyphSource::new(&font, &module.text_settings);
    let width = source.to_canvas_x(source.measure("Hello"));
    assert_eq!(session.module_bounds(&module), Some(Rect::new(10.0, 10.0, width, 20.0)));

    module.text = "Hello World".to_string();
    module.text_settings.line_wrap_width = source.measure("Hello");
    assert_eq!(session.module_bounds(&module), Some(Rect::new(10.0, 10.0, width, 40.0)));

    module.text_settings.font_family = "Nope".to_string();
    assert_eq!(session.module_bounds(&module), None);
}

fn is_red(pixel: &image::Rgba<u8>) -> bool {
    pixel[0] >= 250 && pixel[1] <= 5 && pixel[2] <= 5
}

fn is_black(pixel: &image::Rgba<u8>) -> bool {
    pixel[0] <= 5 && pixel[1] <= 5 && pixel[2] <= 5
}

#[test]
fn test_tagged_render() {
    let session = session();
    let mut module = system_module("<C#F00>I</C>I");
    module.text_settings.font_size = 48.0;
    module.text_settings.position_x = 10.0;
    module.text_settings.position_y = 10.0;

    let font = regular();
    let source = SystemFontGlyphSource::new(&font, &module.text_settings);
    let split = (10.0 + source.advance('I').unwrap()).round() as u32;

    let frame = session.render(&[module], 1.0);
    let count = |x_range: std::ops::Range<u32>, test: fn(&image::Rgba<u8>) -> bool| {
        x_range.flat_map(|x| (0..frame.height()).map(move |y| (x, y))).filter(|&(x, y)| test(frame.get_pixel(x, y))).count()
    };
    assert!(count(0..split, is_red) > 0);
    assert_eq!(count(0..split, is_black), 0);
    // untagged text uses the system font color
    assert!(count(split..frame.width(), is_black) > 0);
    assert_eq!(count(split..frame.width(), is_red), 0);
}
