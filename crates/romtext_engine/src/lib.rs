#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_lossless,
    clippy::cast_precision_loss,
    clippy::must_use_candidate,
    clippy::struct_excessive_bools,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]
//! Layout and compositing of bitmap font text overlays on raster images.
//!
//! A [`RenderSession`] holds the two font sheet slots, the background and the
//! caches; [`RenderSession::render`] draws a list of [`TextModule`]s into an
//! RGBA frame, and [`batch::export_frames`] renders one frame per batch line.

mod error;
pub use error::*;

mod color;
pub use color::*;

pub mod color_tags;

mod settings;
pub use settings::*;

mod text_module;
pub use text_module::*;

mod font_sheet;
pub use font_sheet::*;

pub mod transparency;
pub use transparency::TransparencyConfig;

pub mod glyph_metrics;
pub use glyph_metrics::{GlyphMetrics, GlyphMetricsCache, TileLayout, TileRect};

pub mod glyph_source;
pub use glyph_source::{GlyphSource, GlyphSprite, LineWidth, SystemFontGlyphSource, TileGlyphSource};

pub mod font_library;
pub use font_library::FontLibrary;

pub mod line_wrapper;
pub use line_wrapper::wrap_lines;

mod bounds;
pub use bounds::*;

pub mod compositor;

mod profile;
pub use profile::*;

mod session;
pub use session::*;

mod interaction;
pub use interaction::*;

pub mod batch;
pub use batch::{export_frames, BatchExport};
