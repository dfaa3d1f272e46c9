//! Batch export: one frame per text line of the batch modules.

use std::io::{Cursor, Seek, Write};

use image::{ImageFormat, RgbaImage};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::{EngineError, RenderSession, Result, TextModule};

pub const SINGLE_FILE_NAME: &str = "rom_graphic_preview.png";
pub const ARCHIVE_FILE_NAME: &str = "rom_graphic_batch_preview.zip";

/// Temporarily overrides module texts. Dropping the guard puts the
/// original texts and batch line indices back, whether or not the export
/// that used it succeeded.
pub struct BatchTextGuard<'a> {
    modules: &'a mut [TextModule],
    saved: Vec<(String, usize)>,
}

impl<'a> BatchTextGuard<'a> {
    pub fn new(modules: &'a mut [TextModule]) -> Self {
        let saved = modules.iter().map(|m| (m.text.clone(), m.current_batch_line_index)).collect();
        Self { modules, saved }
    }

    pub fn modules(&self) -> &[TextModule] {
        self.modules
    }

    /// Sets every batch module to the text of `frame`; other modules are left alone.
    pub fn show_frame(&mut self, frame: usize) {
        for (module, (original, _)) in self.modules.iter_mut().zip(&self.saved) {
            if module.is_batch_mode {
                module.text = frame_line(original, frame).to_string();
                module.current_batch_line_index = 0;
            }
        }
    }
}

impl Drop for BatchTextGuard<'_> {
    fn drop(&mut self) {
        for (module, (text, index)) in self.modules.iter_mut().zip(self.saved.drain(..)) {
            module.text = text;
            module.current_batch_line_index = index;
        }
    }
}

/// Line `frame` of a batch text, or its last line once the text runs out.
pub fn frame_line(text: &str, frame: usize) -> &str {
    let lines: Vec<&str> = text.split('\n').collect();
    lines.get(frame).or(lines.last()).copied().unwrap_or_default()
}

/// Number of frames the batch modules ask for: the most lines among batch
/// modules with non-blank text. `None` when no module is in batch mode.
pub fn batch_frame_count(modules: &[TextModule]) -> Option<usize> {
    let batch: Vec<&TextModule> = modules.iter().filter(|m| m.is_batch_mode).collect();
    if batch.is_empty() {
        return None;
    }
    let max_lines = batch
        .iter()
        .filter(|m| !m.text.trim().is_empty())
        .map(|m| m.text.split('\n').count())
        .max()
        .unwrap_or(0);
    Some(max_lines.max(1))
}

pub fn frame_file_name(frame: usize) -> String {
    format!("frame_{:03}.png", frame + 1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFrame {
    pub name: String,
    pub png: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchExport {
    /// No batch lines to iterate: the current state as one PNG.
    Single(Vec<u8>),
    Archive(Vec<BatchFrame>),
}

impl BatchExport {
    pub fn file_name(&self) -> &'static str {
        match self {
            BatchExport::Single(_) => SINGLE_FILE_NAME,
            BatchExport::Archive(_) => ARCHIVE_FILE_NAME,
        }
    }

    /// The PNG, or the zip archive holding all frames.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            BatchExport::Single(png) => Ok(png),
            BatchExport::Archive(frames) => Ok(write_archive(&frames, Cursor::new(Vec::new()))?.into_inner()),
        }
    }
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

/// Writes frames into a zip archive in order. PNGs are stored uncompressed.
pub fn write_archive<W: Write + Seek>(frames: &[BatchFrame], writer: W) -> Result<W> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for frame in frames {
        zip.start_file(frame.name.as_str(), options)?;
        zip.write_all(&frame.png)?;
    }
    Ok(zip.finish()?)
}

/// Renders the batch with `session` and encodes every frame as PNG.
pub fn export_frames(session: &RenderSession, modules: &mut [TextModule], zoom: f32) -> Result<BatchExport> {
    export_frames_with(modules, |modules| encode_png(&session.render(modules, zoom)))
}

/// Drives a batch export with a custom frame capture.
///
/// Captures run one after another, each seeing the module texts of its frame.
/// The first failing capture aborts the export. Module texts are restored
/// before this returns in every case.
pub fn export_frames_with(modules: &mut [TextModule], mut capture: impl FnMut(&[TextModule]) -> Result<Vec<u8>>) -> Result<BatchExport> {
    let Some(frame_count) = batch_frame_count(modules) else {
        return Ok(BatchExport::Single(capture(modules)?));
    };

    let mut guard = BatchTextGuard::new(modules);
    if frame_count == 1 {
        guard.show_frame(0);
        return Ok(BatchExport::Single(capture(guard.modules())?));
    }

    let mut frames = Vec::with_capacity(frame_count);
    for frame in 0..frame_count {
        guard.show_frame(frame);
        let png = capture(guard.modules()).map_err(|err| EngineError::BatchCapture {
            frame: frame + 1,
            message: err.to_string(),
        })?;
        log::info!("captured batch frame {}/{frame_count}", frame + 1);
        frames.push(BatchFrame {
            name: frame_file_name(frame),
            png,
        });
    }
    Ok(BatchExport::Archive(frames))
}
