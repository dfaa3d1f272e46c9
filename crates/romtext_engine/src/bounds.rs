//! Block layout: size, anchored origin and per-line offsets of wrapped text.

use crate::{GlyphSource, HorizontalAlignment, TextSettings, VerticalAlignment};

/// Axis aligned rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Edges are inclusive.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// Left edge of an extent anchored at `anchor`.
pub fn align_horizontal(anchor: f32, extent: f32, alignment: HorizontalAlignment) -> f32 {
    match alignment {
        HorizontalAlignment::Left => anchor,
        HorizontalAlignment::Center => anchor - extent / 2.0,
        HorizontalAlignment::Right => anchor - extent,
    }
}

/// Top edge of an extent anchored at `anchor`.
pub fn align_vertical(anchor: f32, extent: f32, alignment: VerticalAlignment) -> f32 {
    match alignment {
        VerticalAlignment::Top => anchor,
        VerticalAlignment::Center => anchor - extent / 2.0,
        VerticalAlignment::Bottom => anchor - extent,
    }
}

/// A laid out block of wrapped lines. All lengths are canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub line_widths: Vec<f32>,
    pub line_pitch: f32,
    pub bounds: Rect,
    pub alignment: HorizontalAlignment,
}

impl TextBlock {
    pub fn layout(lines: Vec<String>, source: &dyn GlyphSource, settings: &TextSettings) -> Self {
        let line_widths: Vec<f32> = lines.iter().map(|line| source.to_canvas_x(source.measure(line))).collect();
        let max_width = line_widths.iter().copied().fold(0.0, f32::max);
        let line_pitch = source.line_pitch();
        let height = lines.len() as f32 * line_pitch;

        let bounds = Rect::new(
            align_horizontal(settings.position_x, max_width, settings.horizontal_alignment),
            align_vertical(settings.position_y, height, settings.vertical_alignment),
            max_width,
            height,
        );
        Self {
            lines,
            line_widths,
            line_pitch,
            bounds,
            alignment: settings.horizontal_alignment,
        }
    }

    pub fn max_line_width(&self) -> f32 {
        self.bounds.width
    }

    /// Offset of line `index` from the block's left edge.
    pub fn line_offset(&self, index: usize) -> f32 {
        let slack = self.bounds.width - self.line_widths.get(index).copied().unwrap_or_default();
        match self.alignment {
            HorizontalAlignment::Left => 0.0,
            HorizontalAlignment::Center => slack / 2.0,
            HorizontalAlignment::Right => slack,
        }
    }

    /// Left edge and top edge of line `index`.
    pub fn line_origin(&self, index: usize) -> (f32, f32) {
        (self.bounds.x + self.line_offset(index), self.bounds.y + index as f32 * self.line_pitch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph_source::test_source::FixedSource;
    use pretty_assertions::assert_eq;

    fn settings(h: HorizontalAlignment, v: VerticalAlignment) -> TextSettings {
        TextSettings {
            position_x: 50.0,
            position_y: 40.0,
            horizontal_alignment: h,
            vertical_alignment: v,
            ..Default::default()
        }
    }

    fn block(h: HorizontalAlignment, v: VerticalAlignment) -> TextBlock {
        // 10 wide letters: "aaaaaaaaaa" is 100, "aaaaa" 50; 10 high lines
        let lines = vec!["aaaaaaaaaa".to_string(), "aaaaa".to_string()];
        TextBlock::layout(lines, &FixedSource::new(10.0, 0.0), &settings(h, v))
    }

    #[test]
    fn test_horizontal_anchor() {
        assert_eq!(align_horizontal(50.0, 100.0, HorizontalAlignment::Center), 0.0);
        assert_eq!(align_horizontal(50.0, 100.0, HorizontalAlignment::Right), -50.0);
        assert_eq!(align_horizontal(50.0, 100.0, HorizontalAlignment::Left), 50.0);
    }

    #[test]
    fn test_block_bounds() {
        let b = block(HorizontalAlignment::Center, VerticalAlignment::Bottom);
        assert_eq!(b.bounds, Rect::new(0.0, 20.0, 100.0, 20.0));
        let b = block(HorizontalAlignment::Left, VerticalAlignment::Center);
        assert_eq!(b.bounds, Rect::new(50.0, 30.0, 100.0, 20.0));
    }

    #[test]
    fn test_line_offsets() {
        let b = block(HorizontalAlignment::Left, VerticalAlignment::Top);
        assert_eq!((b.line_offset(0), b.line_offset(1)), (0.0, 0.0));
        let b = block(HorizontalAlignment::Center, VerticalAlignment::Top);
        assert_eq!((b.line_offset(0), b.line_offset(1)), (0.0, 25.0));
        let b = block(HorizontalAlignment::Right, VerticalAlignment::Top);
        assert_eq!(b.line_origin(1), (-50.0 + 50.0, 50.0));
    }

    #[test]
    fn test_line_pitch_follows_source() {
        let source = FixedSource {
            scale: 2.0,
            ..FixedSource::new(10.0, 0.0)
        };
        let b = TextBlock::layout(vec!["a".into(), "b".into(), "c".into()], &source, &TextSettings::default());
        assert_eq!(b.line_pitch, 20.0);
        assert_eq!(b.bounds.height, 60.0);
        assert_eq!(b.line_origin(2), (0.0, 40.0));
        assert_eq!(b.max_line_width(), 20.0);
    }

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect::new(0.0, 0.0, 10.0, 5.0);
        assert!(r.contains(0.0, 0.0));
        assert!(r.contains(10.0, 5.0));
        assert!(!r.contains(10.1, 2.0));
        assert!(!r.contains(-0.1, 2.0));
    }
}
