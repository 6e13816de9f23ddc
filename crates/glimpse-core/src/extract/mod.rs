//! Content extraction: recover a clean SVG or markup fragment from pasted text.
//!
//! The pipeline is an ordered list of independent [`Strategy`] functions. The first strategy that
//! proposes a tag-bearing candidate wins; its candidate goes through the shared cleaning step.
//! When nothing matches, the cleaned input is returned as-is. Extraction never fails.

mod clean;
pub(crate) mod scan;
pub mod strategies;

use crate::detect::{DetectedKind, detect_kind};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// When a candidate holds both an `<svg>` root and a document body, keep the `<svg>`.
    pub prefer_vector: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            prefer_vector: true,
        }
    }
}

impl ExtractOptions {
    pub fn prefer_vector() -> Self {
        Self {
            prefer_vector: true,
        }
    }

    pub fn prefer_markup() -> Self {
        Self {
            prefer_vector: false,
        }
    }
}

/// Extracted text tagged with its detected kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    pub kind: DetectedKind,
}

pub type StrategyFn = fn(text: &str, options: &ExtractOptions) -> Option<String>;

#[derive(Debug, Clone)]
pub struct Strategy {
    pub id: &'static str,
    pub strategy: StrategyFn,
}

#[derive(Debug, Clone, Default)]
pub struct Extractor {
    strategies: Vec<Strategy>,
}

impl Extractor {
    /// An empty chain; every input falls through to the cleaned input text.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, strategy: Strategy) {
        self.strategies.push(strategy);
    }

    pub fn add_fn(&mut self, id: &'static str, strategy: StrategyFn) {
        self.add(Strategy { id, strategy });
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// The standard chain. Order is significant.
    pub fn default_chain() -> Self {
        let mut chain = Self::new();
        chain.add_fn("document", strategies::already_a_document);
        chain.add_fn("fenced", strategies::fenced_or_escaped);
        chain.add_fn("structural", strategies::structural_parse);
        chain.add_fn("pattern", strategies::pattern_fallback);
        chain.add_fn("generic-tag", strategies::generic_tag);
        chain
    }

    /// Runs the chain once: first tag-bearing, non-empty cleaned candidate wins.
    pub fn extract_once(&self, text: &str, options: &ExtractOptions) -> String {
        for s in &self.strategies {
            let Some(candidate) = (s.strategy)(text, options) else {
                continue;
            };
            if candidate.trim().is_empty() || !scan::contains_any_tag(&candidate) {
                continue;
            }
            let cleaned = clean::clean(&candidate, options);
            if !cleaned.is_empty() && scan::contains_any_tag(&cleaned) {
                tracing::trace!(strategy = s.id, len = cleaned.len(), "extraction candidate accepted");
                return cleaned;
            }
        }
        tracing::trace!("no extraction strategy matched; returning cleaned input");
        clean::clean(text, options)
    }

    /// Runs the chain until its output is stable, so `extract(extract(x)) == extract(x)`.
    ///
    /// A pass only ever takes substrings, removes text or decodes references, so any pass that
    /// changes the text also shortens it; the loop stops at the first pass that does not.
    pub fn extract(&self, text: &str, options: &ExtractOptions) -> String {
        let mut current = self.extract_once(text, options);
        loop {
            let next = self.extract_once(&current, options);
            if next.len() >= current.len() {
                break;
            }
            current = next;
        }
        current
    }

    pub fn extract_with_kind(&self, text: &str, options: &ExtractOptions) -> Extraction {
        let text = self.extract(text, options);
        let kind = detect_kind(&text);
        Extraction { text, kind }
    }
}

fn default_extractor() -> &'static Extractor {
    static EXTRACTOR: OnceLock<Extractor> = OnceLock::new();
    EXTRACTOR.get_or_init(Extractor::default_chain)
}

/// Extracts the smallest useful SVG or markup fragment from `text`.
///
/// Total: worst case the input comes back with comments removed, blank-line runs collapsed,
/// surrounding whitespace trimmed and entities decoded.
pub fn extract(text: &str, prefer_vector: bool) -> String {
    default_extractor().extract(text, &ExtractOptions { prefer_vector })
}

/// Like [`extract`], also reporting whether the result is vector, markup or unknown content.
pub fn extract_with_kind(text: &str, options: &ExtractOptions) -> Extraction {
    default_extractor().extract_with_kind(text, options)
}
