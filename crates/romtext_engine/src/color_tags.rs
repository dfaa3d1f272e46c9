//! Inline color tags.
//!
//! Module text may contain `<C#RGB>` / `<C#RRGGBB>` to open a color scope and
//! `</C>` to close it. Both are case-insensitive. Anything that does not form a
//! complete tag is plain text, so a malformed tag like `<C#12>` renders
//! literally.

use std::ops::Range;

use crate::Color;

/// One piece of tokenized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Open(Color),
    Close,
}

impl Segment<'_> {
    pub fn is_tag(&self) -> bool {
        !matches!(self, Segment::Text(_))
    }
}

#[derive(Clone, Copy, Debug)]
enum TagState {
    Start,
    Lt,
    OpenC,
    Hash(usize),
    Slash,
    CloseC,
}

/// Tries to read a complete tag at the start of `text`.
/// Returns the tag and its byte length.
fn match_tag(text: &str) -> Option<(Segment<'_>, usize)> {
    let bytes = text.as_bytes();
    let mut state = TagState::Start;
    for (i, &b) in bytes.iter().enumerate() {
        state = match state {
            TagState::Start => {
                if b != b'<' {
                    return None;
                }
                TagState::Lt
            }
            TagState::Lt => match b {
                b'c' | b'C' => TagState::OpenC,
                b'/' => TagState::Slash,
                _ => return None,
            },
            TagState::OpenC => {
                if b != b'#' {
                    return None;
                }
                TagState::Hash(0)
            }
            TagState::Hash(digits) => {
                if b == b'>' {
                    if digits != 3 && digits != 6 {
                        return None;
                    }
                    let color = Color::from_hex(&text[3..i]).ok()?;
                    return Some((Segment::Open(color), i + 1));
                }
                if !b.is_ascii_hexdigit() || digits == 6 {
                    return None;
                }
                TagState::Hash(digits + 1)
            }
            TagState::Slash => match b {
                b'c' | b'C' => TagState::CloseC,
                _ => return None,
            },
            TagState::CloseC => {
                if b != b'>' {
                    return None;
                }
                return Some((Segment::Close, i + 1));
            }
        };
    }
    None
}

/// Splits text into plain runs and tag directives, in order.
pub struct TagTokenizer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> TagTokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for TagTokenizer<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.pos..];
        if rest.is_empty() {
            return None;
        }
        if let Some((segment, len)) = match_tag(rest) {
            self.pos += len;
            return Some(segment);
        }

        // plain text runs until the next '<' that starts a real tag
        let mut end = rest.len();
        for (i, _) in rest.match_indices('<').filter(|(i, _)| *i > 0) {
            if match_tag(&rest[i..]).is_some() {
                end = i;
                break;
            }
        }
        self.pos += end;
        Some(Segment::Text(&rest[..end]))
    }
}

pub fn tokenize(text: &str) -> TagTokenizer<'_> {
    TagTokenizer::new(text)
}

/// Visible text with every well-formed tag removed, matched or not.
pub fn strip_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for segment in tokenize(text) {
        if let Segment::Text(run) = segment {
            result.push_str(run);
        }
    }
    result
}

/// Iterates the visible characters of `text`.
pub fn visible_chars(text: &str) -> impl Iterator<Item = char> + '_ {
    tokenize(text).flat_map(|segment| match segment {
        Segment::Text(run) => Some(run.chars()),
        _ => None,
    }
    .into_iter()
    .flatten())
}

/// True if `text` contains at least one opening color tag.
pub fn contains_color_tag(text: &str) -> bool {
    tokenize(text).any(|segment| matches!(segment, Segment::Open(_)))
}

/// Tracks the active tag color while walking a line.
///
/// A close tag ends the innermost open scope. Closes without a matching open
/// are ignored, and scopes still open at the end of the line simply end there.
#[derive(Debug, Default, Clone)]
pub struct ColorScope {
    stack: Vec<Color>,
}

impl ColorScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, segment: &Segment<'_>) {
        match segment {
            Segment::Open(color) => self.stack.push(*color),
            Segment::Close => {
                self.stack.pop();
            }
            Segment::Text(_) => {}
        }
    }

    pub fn active(&self) -> Option<Color> {
        self.stack.last().copied()
    }

    /// Active tag color, or `default` outside of any scope.
    pub fn resolve(&self, default: Color) -> Color {
        self.active().unwrap_or(default)
    }
}

/// Wraps the characters in `range` (char indices) with an open/close tag pair.
/// The range is clamped to the text.
pub fn wrap_with_color_tag(text: &str, range: Range<usize>, color: Color) -> String {
    let char_count = text.chars().count();
    let start = range.start.min(char_count);
    let end = range.end.clamp(start, char_count);

    let byte_at = |idx: usize| text.char_indices().nth(idx).map_or(text.len(), |(b, _)| b);
    let (start_byte, end_byte) = (byte_at(start), byte_at(end));

    format!(
        "{}<C{}>{}</C>{}",
        &text[..start_byte],
        color.to_hex(),
        &text[start_byte..end_byte],
        &text[end_byte..]
    )
}
