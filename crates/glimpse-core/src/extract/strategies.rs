//! Candidate strategies, in the order the default chain runs them.
//!
//! Every strategy is independent: it looks at the raw input and either proposes a candidate
//! fragment or declines. The runner applies the shared cleaning step to whatever wins.

use super::ExtractOptions;
use super::scan::{self, Elements};
use crate::entities::{contains_escaped_tag, decode_entities};
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use regex::Regex;
use std::sync::OnceLock;

fn doctype_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<!doctype\s+html\b[^>]*>").expect("valid regex"))
}

fn looks_like_markup(text: &str) -> bool {
    scan::contains_any_tag(text) || contains_escaped_tag(text)
}

/// 1. The input already is a document or a clean fragment.
pub fn already_a_document(text: &str, _options: &ExtractOptions) -> Option<String> {
    let trimmed = text.trim();
    let is_document = scan::starts_with_ignore_case(trimmed, "<svg")
        || scan::starts_with_ignore_case(trimmed, "<!doctype")
        || scan::starts_with_ignore_case(trimmed, "<html");
    if is_document || scan::is_fragment(trimmed) {
        return Some(trimmed.to_string());
    }
    None
}

/// 2. A fenced code block, an inline code span, or an entity-escaped tag sequence.
pub fn fenced_or_escaped(text: &str, _options: &ExtractOptions) -> Option<String> {
    if let Some(block) = code_payload(text) {
        return Some(block);
    }

    if contains_escaped_tag(text) {
        let decoded = decode_entities(text);
        if scan::contains_any_tag(&decoded) {
            return Some(narrow_decoded(&decoded));
        }
    }
    None
}

/// Body of the first fenced block (or, failing that, inline code span) that carries markup,
/// with entities decoded.
fn code_payload(text: &str) -> Option<String> {
    let mut in_fence = false;
    let mut fence_body = String::new();
    let mut first_inline: Option<String> = None;

    for event in Parser::new(text) {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(_))) => {
                in_fence = true;
                fence_body.clear();
            }
            Event::End(TagEnd::CodeBlock) if in_fence => {
                in_fence = false;
                if let Some(payload) = decoded_payload(&fence_body) {
                    return Some(payload);
                }
            }
            Event::Text(t) if in_fence => fence_body.push_str(&t),
            Event::Code(code) if first_inline.is_none() => {
                first_inline = decoded_payload(&code);
            }
            _ => {}
        }
    }

    // An unterminated fence runs to the end of the input.
    if in_fence {
        if let Some(payload) = decoded_payload(&fence_body) {
            return Some(payload);
        }
    }
    first_inline
}

fn decoded_payload(body: &str) -> Option<String> {
    if !looks_like_markup(body) {
        return None;
    }
    let decoded = decode_entities(body);
    if !scan::contains_any_tag(&decoded) {
        return None;
    }
    Some(decoded.trim().to_string())
}

/// Picks the interesting element out of freshly unescaped text that may still carry prose.
fn narrow_decoded(decoded: &str) -> String {
    let elements = Elements::parse(decoded);
    let span = elements
        .span("svg")
        .or_else(|| document_span(decoded, &elements))
        .or_else(|| elements.first_pair());
    match span {
        Some(r) => decoded[r].to_string(),
        None => decoded.to_string(),
    }
}

/// 3. Parse the input as an XML-compatible document and pick the vector root or the body.
pub fn structural_parse(text: &str, options: &ExtractOptions) -> Option<String> {
    let trimmed = text.trim();
    let parse_options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = roxmltree::Document::parse_with_options(trimmed, parse_options).ok()?;

    let element_named = |name: &str| {
        doc.descendants()
            .find(|n| n.is_element() && n.tag_name().name().eq_ignore_ascii_case(name))
    };

    let svg = element_named("svg").map(|n| trimmed[n.range()].to_string());
    let body = element_named("body")
        .filter(|n| {
            n.children()
                .any(|c| c.is_element() || c.text().is_some_and(|t| !t.trim().is_empty()))
        })
        .and_then(|n| {
            let outer = &trimmed[n.range()];
            scan::inner_span(outer, "body").map(|r| outer[r].to_string())
        });

    if options.prefer_vector {
        svg.or(body)
    } else {
        body.or(svg)
    }
}

/// `<!DOCTYPE html>` (optional) through the matching `</html>`.
fn document_span(text: &str, elements: &Elements) -> Option<std::ops::Range<usize>> {
    let html = elements.span("html")?;
    let start = doctype_regex()
        .find(&text[..html.start])
        .map_or(html.start, |m| m.start());
    Some(start..html.end)
}

/// 4. Pattern fallback: a balanced vector root, else a whole document, else a body.
pub fn pattern_fallback(text: &str, options: &ExtractOptions) -> Option<String> {
    let elements = Elements::parse(text);
    let svg = || elements.span("svg");
    let document = || document_span(text, &elements);
    let body = || elements.span("body");

    let span = if options.prefer_vector {
        svg().or_else(document).or_else(body)
    } else {
        document().or_else(body).or_else(svg)
    };
    span.map(|r| text[r].to_string())
}

/// 5. The first balanced open/close tag pair anywhere in the text.
pub fn generic_tag(text: &str, _options: &ExtractOptions) -> Option<String> {
    scan::first_balanced_pair(text).map(|r| text[r].to_string())
}
