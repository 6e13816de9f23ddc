use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How content handed to the viewport is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// The root element is itself a scalable graphic (`<svg>`).
    #[default]
    Vector,
    /// Generic markup laid out by the host's native renderer.
    Markup,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::Markup => "markup",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vector" | "svg" | "xml" => Ok(Self::Vector),
            "markup" | "html" => Ok(Self::Markup),
            other => Err(Error::UnsupportedContentKind {
                value: other.to_string(),
            }),
        }
    }
}

/// Best-effort classification of arbitrary text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedKind {
    Vector,
    Markup,
    Unknown,
}

impl DetectedKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::Markup => "markup",
            Self::Unknown => "unknown",
        }
    }

    /// Maps the detection result onto a render kind; unknown text is shown as markup.
    pub fn content_kind(self) -> ContentKind {
        match self {
            Self::Vector => ContentKind::Vector,
            Self::Markup | Self::Unknown => ContentKind::Markup,
        }
    }
}

impl std::fmt::Display for DetectedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies `text`: any `<svg` tag makes it vector content; a doctype, `<html` root or a
/// `<body`/`<head` section makes it markup; everything else is unknown.
pub fn detect_kind(text: &str) -> DetectedKind {
    let lower = text.trim().to_ascii_lowercase();
    if lower.is_empty() {
        return DetectedKind::Unknown;
    }

    if lower.contains("<svg") {
        return DetectedKind::Vector;
    }

    if lower.starts_with("<!doctype html")
        || lower.starts_with("<html")
        || lower.contains("<body")
        || lower.contains("<head")
    {
        return DetectedKind::Markup;
    }

    DetectedKind::Unknown
}
