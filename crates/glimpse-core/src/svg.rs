//! Small helpers for SVG text: intrinsic size, validation, minification and data URIs.

use crate::geom::{ContentSize, content_size};
use crate::{Error, Result};
use base64::Engine as _;
use regex::Regex;
use std::borrow::Cow;
use std::str::FromStr;
use std::sync::OnceLock;

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Size used when a graphic declares neither width/height nor a usable `viewBox`.
pub const FALLBACK_SIZE: ContentSize = ContentSize::new(100.0, 100.0);

fn svg_root_attrs_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<svg\b([^>]*)>").expect("valid regex"))
}

fn attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)([\w:-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
    })
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

fn inter_tag_whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r">\s+<").expect("valid regex"))
}

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"))
}

/// Attributes of the first `<svg>` start tag, in source order.
///
/// Uses a lenient scan rather than an XML parser so that sizing still works for markup that is
/// not well-formed (unescaped `&`, HTML-only entities, ...).
fn root_attributes(svg: &str) -> Vec<(String, String)> {
    let Some(caps) = svg_root_attrs_regex().captures(svg) else {
        return Vec::new();
    };
    let raw = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    attr_regex()
        .captures_iter(raw)
        .map(|c| {
            let name = c[1].to_string();
            let value = c
                .get(2)
                .or_else(|| c.get(3))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            (name, value)
        })
        .collect()
}

fn root_attribute<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Parses a `width`/`height` attribute value such as `300` or `300px`; the unit suffix is
/// ignored. Percentages and non-positive values are rejected.
fn parse_length(raw: &str) -> Option<f64> {
    let length = svgtypes::Length::from_str(raw.trim()).ok()?;
    if length.unit == svgtypes::LengthUnit::Percent {
        return None;
    }
    let n = length.number;
    (n.is_finite() && n > 0.0).then_some(n)
}

fn parse_view_box(raw: &str) -> Option<(f64, f64)> {
    let vb = svgtypes::ViewBox::from_str(raw.trim()).ok()?;
    (vb.w.is_finite() && vb.h.is_finite() && vb.w > 0.0 && vb.h > 0.0).then_some((vb.w, vb.h))
}

/// Intrinsic size of an SVG document in content units.
///
/// Explicit `width` and `height` win; otherwise the `viewBox` width/height are used; otherwise
/// `fallback`. When only one explicit dimension is present and there is no `viewBox`, the missing
/// one is taken from `fallback`.
pub fn intrinsic_size(svg: &str, fallback: ContentSize) -> ContentSize {
    let attrs = root_attributes(svg);
    let width = root_attribute(&attrs, "width").and_then(parse_length);
    let height = root_attribute(&attrs, "height").and_then(parse_length);

    if let (Some(w), Some(h)) = (width, height) {
        return content_size(w, h);
    }
    if let Some((w, h)) = root_attribute(&attrs, "viewBox").and_then(parse_view_box) {
        return content_size(w, h);
    }
    content_size(
        width.unwrap_or(fallback.width),
        height.unwrap_or(fallback.height),
    )
}

/// Returns `true` when `text` parses as XML and its root element is `<svg>`.
pub fn is_valid_svg(text: &str) -> bool {
    validate_svg(text).is_ok()
}

pub fn validate_svg(text: &str) -> Result<()> {
    let doc = roxmltree::Document::parse(text.trim()).map_err(|e| Error::InvalidSvg {
        message: e.to_string(),
    })?;
    let root = doc.root_element();
    if root.tag_name().name().eq_ignore_ascii_case("svg") {
        Ok(())
    } else {
        Err(Error::InvalidSvg {
            message: format!("root element is <{}>, expected <svg>", root.tag_name().name()),
        })
    }
}

/// Minifies SVG text: drops comments, collapses whitespace runs and removes whitespace between
/// tags.
pub fn optimize_svg(svg: &str) -> String {
    let without_comments = comment_regex().replace_all(svg, "");
    let collapsed = whitespace_regex().replace_all(&without_comments, " ");
    inter_tag_whitespace_regex()
        .replace_all(&collapsed, "><")
        .trim()
        .to_string()
}

/// Encodes SVG text as a `data:` URI usable as an image source.
pub fn svg_data_uri(svg: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(svg.trim().as_bytes());
    format!("data:image/svg+xml;base64,{encoded}")
}

/// The first balanced `<svg>` element inside `text`, if any.
pub fn embedded_svg(text: &str) -> Option<&str> {
    crate::extract::scan::balanced_span(text, "svg").map(|r| &text[r])
}

/// Declares the SVG namespace on the root when it is missing.
///
/// Inline SVG copied out of HTML pages usually omits `xmlns`, which XML-based renderers require.
pub fn ensure_namespace(svg: &str) -> Cow<'_, str> {
    let attrs = root_attributes(svg);
    if root_attribute(&attrs, "xmlns").is_some() {
        return Cow::Borrowed(svg);
    }
    let Some(m) = svg_root_attrs_regex().find(svg) else {
        return Cow::Borrowed(svg);
    };
    let insert_at = m.start() + "<svg".len();
    Cow::Owned(format!(
        "{} xmlns=\"{SVG_NAMESPACE}\"{}",
        &svg[..insert_at],
        &svg[insert_at..]
    ))
}

/// Adds `width="100%" height="100%"` to the root when it declares neither, so that the graphic
/// fills its container instead of collapsing to the user agent default.
pub fn ensure_intrinsic_size(svg: &str) -> String {
    let attrs = root_attributes(svg);
    if root_attribute(&attrs, "width").is_some() || root_attribute(&attrs, "height").is_some() {
        return svg.to_string();
    }
    let Some(m) = svg_root_attrs_regex().find(svg) else {
        return svg.to_string();
    };
    let insert_at = m.start() + "<svg".len();
    let mut out = String::with_capacity(svg.len() + 28);
    out.push_str(&svg[..insert_at]);
    out.push_str(r#" width="100%" height="100%""#);
    out.push_str(&svg[insert_at..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_size_wins_over_view_box() {
        let size = intrinsic_size(
            r#"<svg width="40px" height="20" viewBox="0 0 300 150"></svg>"#,
            FALLBACK_SIZE,
        );
        assert_eq!((size.width, size.height), (40.0, 20.0));
    }

    #[test]
    fn view_box_supplies_size_when_attributes_are_missing() {
        let size = intrinsic_size(r#"<svg viewBox="0 0 300 150"><g/></svg>"#, FALLBACK_SIZE);
        assert_eq!((size.width, size.height), (300.0, 150.0));

        let size = intrinsic_size(r#"<svg viewBox="-5,-5,12.5,8"/>"#, FALLBACK_SIZE);
        assert_eq!((size.width, size.height), (12.5, 8.0));
    }

    #[test]
    fn percentages_fall_through_to_view_box() {
        let size = intrinsic_size(
            r#"<svg width="100%" height="100%" viewBox="0 0 64 32"/>"#,
            FALLBACK_SIZE,
        );
        assert_eq!((size.width, size.height), (64.0, 32.0));
    }

    #[test]
    fn falls_back_to_default_size() {
        let size = intrinsic_size("<svg><rect/></svg>", FALLBACK_SIZE);
        assert_eq!((size.width, size.height), (100.0, 100.0));

        let size = intrinsic_size(r#"<svg width="30"></svg>"#, FALLBACK_SIZE);
        assert_eq!((size.width, size.height), (30.0, 100.0));
    }

    #[test]
    fn validates_svg_roots() {
        assert!(is_valid_svg(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#));
        assert!(!is_valid_svg("<div></div>"));
        assert!(!is_valid_svg("<svg><g></svg>"));
    }

    #[test]
    fn optimize_removes_comments_and_whitespace() {
        let svg = "<svg>\n  <!-- c -->\n  <rect  width=\"1\"/>\n</svg>\n";
        assert_eq!(optimize_svg(svg), "<svg><rect width=\"1\"/></svg>");
    }

    #[test]
    fn finds_embedded_svg() {
        assert_eq!(
            embedded_svg("<div><svg><g/></svg></div>"),
            Some("<svg><g/></svg>")
        );
        assert_eq!(embedded_svg("<div></div>"), None);
    }

    #[test]
    fn adds_missing_namespace_only() {
        assert_eq!(
            ensure_namespace("<svg width=\"1\"/>"),
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"1\"/>"
        );
        let with_ns = r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#;
        assert!(matches!(ensure_namespace(with_ns), Cow::Borrowed(_)));
    }

    #[test]
    fn data_uri_is_base64() {
        assert_eq!(svg_data_uri(" <svg/> "), "data:image/svg+xml;base64,PHN2Zy8+");
    }

    #[test]
    fn ensure_intrinsic_size_only_touches_unsized_roots() {
        assert_eq!(
            ensure_intrinsic_size("<svg viewBox=\"0 0 1 1\"/>"),
            "<svg width=\"100%\" height=\"100%\" viewBox=\"0 0 1 1\"/>"
        );
        let sized = "<svg width=\"5\"/>";
        assert_eq!(ensure_intrinsic_size(sized), sized);
    }
}
