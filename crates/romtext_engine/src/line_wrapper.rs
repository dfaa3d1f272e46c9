//! Greedy word wrapping of tagged text.

use crate::GlyphSource;

/// Paragraph separator inside module text: the two characters `\` and `n`.
pub const PARAGRAPH_BREAK: &str = "\\n";

pub fn split_paragraphs(text: &str) -> Vec<&str> {
    text.split(PARAGRAPH_BREAK).collect()
}

/// Splits `text` into paragraphs and wraps each to the budget derived from
/// `line_wrap_width`. Lines keep their raw color tags.
///
/// Words are separated by single spaces. A word is appended to the current
/// line when the line plus a space plus the word still measures within the
/// budget; otherwise it starts a new line. A word that alone exceeds the
/// budget gets a line of its own. Paragraphs that are empty or only
/// whitespace are passed through untouched.
pub fn wrap_lines(text: &str, source: &dyn GlyphSource, line_wrap_width: f32) -> Vec<String> {
    let budget = if line_wrap_width > 0.0 { source.wrap_budget(line_wrap_width) } else { 0.0 };
    if budget <= 0.0 {
        return split_paragraphs(text).into_iter().map(str::to_string).collect();
    }

    let mut lines = Vec::new();
    for paragraph in split_paragraphs(text) {
        if paragraph.trim().is_empty() {
            lines.push(paragraph.to_string());
            continue;
        }
        wrap_paragraph(paragraph, source, budget, &mut lines);
    }
    lines
}

fn wrap_paragraph(paragraph: &str, source: &dyn GlyphSource, budget: f32, lines: &mut Vec<String>) {
    let mut current: Option<String> = None;

    for word in paragraph.split(' ') {
        let Some(line) = current.as_mut() else {
            current = Some(word.to_string());
            continue;
        };

        let candidate = format!("{line} {word}");
        if source.measure(&candidate) <= budget {
            *line = candidate;
            continue;
        }

        if let Some(line) = current.take() {
            lines.push(line);
        }
        // a run of spaces that overflows is dropped at the break
        if !word.is_empty() {
            current = Some(word.to_string());
        }
    }

    if let Some(line) = current {
        lines.push(line);
    }
}
