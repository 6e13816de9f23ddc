use glimpse_core::{ContentKind, DetectedKind, ExtractOptions, Extraction, extract_with_kind};
use glimpse_render::{Rasterizer, Surface, SvgRasterizer, ViewportEngine, ViewportOptions};

/// Extraction feeding a [`ViewportEngine`]: raw pasted text in, rendered preview out.
pub struct Previewer<S: Surface, R: Rasterizer = SvgRasterizer> {
    engine: ViewportEngine<S, R>,
    extract: ExtractOptions,
    detected: Option<DetectedKind>,
}

impl<S: Surface> Previewer<S> {
    pub fn new(surface: S, options: ViewportOptions) -> Self {
        Self::from_engine(ViewportEngine::new(surface, options))
    }
}

impl<S: Surface, R: Rasterizer> Previewer<S, R> {
    pub fn from_engine(engine: ViewportEngine<S, R>) -> Self {
        Self {
            engine,
            extract: ExtractOptions::default(),
            detected: None,
        }
    }

    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract = options;
        self
    }

    pub fn engine(&self) -> &ViewportEngine<S, R> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ViewportEngine<S, R> {
        &mut self.engine
    }

    pub fn into_engine(self) -> ViewportEngine<S, R> {
        self.engine
    }

    /// Kind detected for the last loaded text, if any.
    pub fn detected(&self) -> Option<DetectedKind> {
        self.detected
    }

    /// Extracts a fragment from `raw` and shows it. Unknown content is shown as markup.
    pub fn load(&mut self, raw: &str) -> ContentKind {
        let Extraction { text, kind } = extract_with_kind(raw, &self.extract);
        let content_kind = kind.content_kind();
        tracing::debug!(detected = kind.as_str(), len = text.len(), "preview loaded");
        self.detected = Some(kind);
        self.engine.set_content(text, content_kind);
        content_kind
    }

    /// Re-runs extraction over the current content. Returns `true` if it changed.
    ///
    /// Content that came out of [`Previewer::load`] is already clean and is left untouched.
    pub fn clean_current(&mut self) -> bool {
        let current = self.engine.content().to_string();
        let Extraction { text, kind } = extract_with_kind(&current, &self.extract);
        if text == current {
            return false;
        }
        self.detected = Some(kind);
        self.engine.set_content(text, kind.content_kind());
        true
    }
}
