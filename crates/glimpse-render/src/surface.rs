//! Host seams: the drawable region the engine presents into.

use crate::error::{RenderError, Result};
use glimpse_core::ContentKind;
use glimpse_core::Transform;
use glimpse_core::geom::{ScreenRect, ScreenVector};

/// Premultiplied RGBA8 image.
///
/// Interaction snapshots cover the surface's viewport: pixel `(0, 0)` is the surface's top-left
/// corner at the moment of capture. Exports cover the content's intrinsic size instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pixmap: tiny_skia::Pixmap,
}

impl Bitmap {
    /// A fully transparent bitmap; `None` when either dimension is zero or too large.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        tiny_skia::Pixmap::new(width, height).map(Self::from_pixmap)
    }

    pub fn from_pixmap(pixmap: tiny_skia::Pixmap) -> Self {
        Self { pixmap }
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    pub fn pixmap(&self) -> &tiny_skia::Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> tiny_skia::Pixmap {
        self.pixmap
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.pixmap.encode_png().map_err(|_| RenderError::PngEncode)
    }
}

/// Where to draw a snapshot inside the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterPlacement {
    /// Multiplier applied to the bitmap's pixel size (current scale / capture scale).
    pub bitmap_scale: f64,
    /// Surface-local position of the bitmap's top-left pixel (the capture-time screen offset,
    /// moved and scaled along with the content).
    pub offset: ScreenVector,
}

impl RasterPlacement {
    pub fn new(current: &Transform, captured: &Transform) -> Self {
        let (bitmap_scale, offset) = current.relative_to(captured);
        Self {
            bitmap_scale,
            offset,
        }
    }
}

/// A drawable region owned by the host.
///
/// The engine attaches on construction, presents through the two `present_*` paths and calls
/// [`Surface::detach`] exactly once when it is disposed.
pub trait Surface {
    /// The region's rectangle in screen coordinates. Anchors handed to
    /// [`crate::ViewportEngine::zoom`] are made relative to its origin.
    fn bounds(&self) -> ScreenRect;

    /// Live vector path: render `content` under `transform`.
    fn present_vector(&mut self, content: &str, kind: ContentKind, transform: &Transform);

    /// Raster path: draw a previously captured snapshot.
    fn present_raster(&mut self, bitmap: &Bitmap, placement: RasterPlacement);

    /// Releases whatever the host attached for this engine (event bindings, child nodes, ...).
    fn detach(&mut self) {}
}
