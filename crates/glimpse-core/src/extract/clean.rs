use super::ExtractOptions;
use super::scan::{self, Elements};
use crate::entities::decode_entities;
use regex::Regex;
use std::sync::OnceLock;

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"))
}

fn crlf_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r\n?").expect("valid regex"))
}

fn blank_run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // A newline followed by three or more blank (whitespace-only) lines.
    RE.get_or_init(|| Regex::new(r"\n(?:[ \t]*\n){3,}").expect("valid regex"))
}

pub(crate) fn strip_comments(input: &str) -> String {
    comment_regex().replace_all(input, "").into_owned()
}

pub(crate) fn collapse_blank_lines(input: &str) -> String {
    blank_run_regex().replace_all(input, "\n\n").into_owned()
}

/// Narrows `text` to the element the caller is after.
///
/// With `prefer_vector`, the first balanced `<svg>` wins over a document body; otherwise the
/// body's inner content wins and a bare `<svg>` is left in its surrounding markup. Documents
/// without a body fall back to the `<html>` element's content minus its `<head>`.
fn focus(text: &str, options: &ExtractOptions) -> String {
    let elements = Elements::parse(text);
    if options.prefer_vector {
        if let Some(svg) = elements.span("svg") {
            return text[svg].to_string();
        }
    }
    if let Some(body) = elements.inner("body") {
        return text[body].to_string();
    }
    if let Some(html) = elements.inner("html") {
        let inner = &text[html];
        return match scan::balanced_span(inner, "head") {
            Some(head) => format!("{}{}", &inner[..head.start], &inner[head.end..]),
            None => inner.to_string(),
        };
    }
    text.to_string()
}

/// Shared cleaning step applied to every strategy candidate and to the give-up fallback.
pub(crate) fn clean(candidate: &str, options: &ExtractOptions) -> String {
    let normalized = crlf_regex().replace_all(candidate, "\n");
    let without_comments = strip_comments(&normalized);
    let focused = focus(&without_comments, options);
    let collapsed = collapse_blank_lines(&focused);
    decode_entities(collapsed.trim()).into_owned()
}
