//! Lenient tag scanner used to locate balanced element spans in messy text.
//!
//! This is not an HTML tokenizer: it only understands enough syntax (quoted attribute values,
//! comments, declarations, raw-text elements) to pair opening and closing tags reliably.

use std::collections::HashMap;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagKind {
    Open,
    Close,
    SelfClosing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Tag {
    /// Byte range of the whole tag, `<` through `>`.
    pub range: Range<usize>,
    /// Lower-cased element name.
    pub name: String,
    pub kind: TagKind,
}

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

fn find_from(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from > bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
        .map(|i| from + i)
}

/// Parses the tag starting at `start` (which must point at `<`).
///
/// Returns `None` when the `<` does not begin an element tag; comments, doctypes and processing
/// instructions are reported as `Err(end)` so the caller can skip them.
fn parse_tag(bytes: &[u8], start: usize) -> Option<Result<Tag, usize>> {
    let mut i = start + 1;
    let first = *bytes.get(i)?;

    if first == b'!' {
        if bytes[i..].starts_with(b"!--") {
            let end = find_from(bytes, i + 3, b"-->").map_or(bytes.len(), |e| e + 3);
            return Some(Err(end));
        }
        let end = find_from(bytes, i, b">").map_or(bytes.len(), |e| e + 1);
        return Some(Err(end));
    }
    if first == b'?' {
        let end = find_from(bytes, i, b">").map_or(bytes.len(), |e| e + 1);
        return Some(Err(end));
    }

    let closing = first == b'/';
    if closing {
        i += 1;
    }
    if !bytes.get(i).is_some_and(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let name_start = i;
    while i < bytes.len() && is_name_byte(bytes[i]) {
        i += 1;
    }
    let name = String::from_utf8_lossy(&bytes[name_start..i]).to_ascii_lowercase();

    // The name must be followed by whitespace, `/` or `>`.
    match bytes.get(i) {
        Some(b) if b.is_ascii_whitespace() || *b == b'/' || *b == b'>' => {}
        _ => return None,
    }

    let mut quote: Option<u8> = None;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => {
                let kind = if closing {
                    TagKind::Close
                } else if bytes[..i].last() == Some(&b'/') {
                    TagKind::SelfClosing
                } else {
                    TagKind::Open
                };
                return Some(Ok(Tag {
                    range: start..i + 1,
                    name,
                    kind,
                }));
            }
            None if b == b'<' => return None,
            None => {}
        }
        i += 1;
    }
    None
}

/// Iterates over element tags in `text`, skipping comments, declarations and raw-text bodies.
pub(crate) struct Tags<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Tags<'a> {
    pub(crate) fn new(text: &'a str, from: usize) -> Self {
        Self { text, pos: from }
    }
}

impl Iterator for Tags<'_> {
    type Item = Tag;

    fn next(&mut self) -> Option<Tag> {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() {
            let Some(lt) = find_from(bytes, self.pos, b"<") else {
                self.pos = bytes.len();
                return None;
            };
            match parse_tag(bytes, lt) {
                None => self.pos = lt + 1,
                Some(Err(end)) => self.pos = end,
                Some(Ok(tag)) => {
                    self.pos = tag.range.end;
                    if tag.kind == TagKind::Open && RAW_TEXT_ELEMENTS.contains(&tag.name.as_str())
                    {
                        // Jump to the matching close tag so `<` inside scripts is ignored.
                        let needle = format!("</{}", tag.name);
                        if let Some(close) = find_from(bytes, self.pos, needle.as_bytes()) {
                            self.pos = close;
                        }
                    }
                    return Some(tag);
                }
            }
        }
        None
    }
}

/// An element whose opening tag found its closing tag, or closes itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Element {
    /// Lower-cased element name.
    pub name: String,
    /// Byte range of the opening tag.
    pub open: Range<usize>,
    /// Start of the closing tag; `open.end` for self-closing tags.
    pub close_start: usize,
    pub end: usize,
    pub self_closing: bool,
}

impl Element {
    pub(crate) fn span(&self) -> Range<usize> {
        self.open.start..self.end
    }

    pub(crate) fn inner(&self) -> Range<usize> {
        self.open.end..self.close_start
    }
}

/// Every balanced element of a text, paired in a single pass.
///
/// Closing tags pop the innermost unclosed opening tag of the same name, which is the same
/// pairing as counting nesting depth per name. Opening tags that never close are dropped.
#[derive(Debug, Clone, Default)]
pub(crate) struct Elements {
    /// In order of their opening tags.
    elements: Vec<Element>,
}

impl Elements {
    pub(crate) fn parse(text: &str) -> Self {
        let mut slots: Vec<Option<Element>> = Vec::new();
        let mut unclosed: HashMap<String, Vec<(usize, Range<usize>)>> = HashMap::new();

        for tag in Tags::new(text, 0) {
            match tag.kind {
                TagKind::Open => {
                    unclosed
                        .entry(tag.name)
                        .or_default()
                        .push((slots.len(), tag.range));
                    slots.push(None);
                }
                TagKind::SelfClosing => slots.push(Some(Element {
                    name: tag.name,
                    close_start: tag.range.end,
                    end: tag.range.end,
                    open: tag.range,
                    self_closing: true,
                })),
                TagKind::Close => {
                    let Some((slot, open)) = unclosed.get_mut(&tag.name).and_then(Vec::pop) else {
                        continue;
                    };
                    slots[slot] = Some(Element {
                        name: tag.name,
                        open,
                        close_start: tag.range.start,
                        end: tag.range.end,
                        self_closing: false,
                    });
                }
            }
        }

        Self {
            elements: slots.into_iter().flatten().collect(),
        }
    }

    /// First balanced `<name>` element (nesting-aware, self-closing included).
    pub(crate) fn first(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name == name)
    }

    pub(crate) fn span(&self, name: &str) -> Option<Range<usize>> {
        self.first(name).map(Element::span)
    }

    pub(crate) fn inner(&self, name: &str) -> Option<Range<usize>> {
        self.first(name).map(Element::inner)
    }

    /// First element anywhere whose opening tag has a matching closing tag.
    pub(crate) fn first_pair(&self) -> Option<Range<usize>> {
        self.elements
            .iter()
            .find(|e| !e.self_closing)
            .map(Element::span)
    }
}

/// Shortest span from the first `<name ...>` to its matching `</name>` (nesting-aware).
pub(crate) fn balanced_span(text: &str, name: &str) -> Option<Range<usize>> {
    Elements::parse(text).span(name)
}

/// Content between the first `<name ...>` and its matching `</name>`.
pub(crate) fn inner_span(text: &str, name: &str) -> Option<Range<usize>> {
    Elements::parse(text).inner(name)
}

/// First element anywhere in `text` whose opening tag has a matching close tag.
pub(crate) fn first_balanced_pair(text: &str) -> Option<Range<usize>> {
    Elements::parse(text).first_pair()
}

pub(crate) fn contains_any_tag(text: &str) -> bool {
    Tags::new(text, 0).next().is_some()
}

/// Returns `true` when the trimmed text starts with an element tag (or a doctype) and ends with
/// `>`, i.e. it already looks like a self-contained fragment.
pub(crate) fn is_fragment(text: &str) -> bool {
    let trimmed = text.trim();
    if !trimmed.starts_with('<') || !trimmed.ends_with('>') {
        return false;
    }
    let bytes = trimmed.as_bytes();
    if starts_with_ignore_case(trimmed, "<!doctype") {
        return true;
    }
    matches!(parse_tag(bytes, 0), Some(Ok(tag)) if tag.kind != TagKind::Close)
}

pub(crate) fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
