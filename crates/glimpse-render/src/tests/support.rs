use crate::*;
use glimpse_core::geom::{ScreenRect, screen_rect};
use glimpse_core::{ContentKind, Transform};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Vector {
        content: String,
        kind: ContentKind,
        transform: Transform,
    },
    Raster {
        width: u32,
        height: u32,
        placement: RasterPlacement,
    },
    Detach,
}

/// Shared view of everything a [`RecordingSurface`] was asked to do.
#[derive(Debug, Clone, Default)]
pub(crate) struct Log(Rc<RefCell<Vec<Call>>>);

impl Log {
    pub(crate) fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub(crate) fn last(&self) -> Option<Call> {
        self.0.borrow().last().cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub(crate) fn detach_count(&self) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Detach))
            .count()
    }

    fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }
}

pub(crate) struct RecordingSurface {
    bounds: ScreenRect,
    log: Log,
}

impl RecordingSurface {
    pub(crate) fn new(bounds: ScreenRect) -> (Self, Log) {
        let log = Log::default();
        (
            Self {
                bounds,
                log: log.clone(),
            },
            log,
        )
    }
}

impl Surface for RecordingSurface {
    fn bounds(&self) -> ScreenRect {
        self.bounds
    }

    fn present_vector(&mut self, content: &str, kind: ContentKind, transform: &Transform) {
        self.log.push(Call::Vector {
            content: content.to_string(),
            kind,
            transform: *transform,
        });
    }

    fn present_raster(&mut self, bitmap: &Bitmap, placement: RasterPlacement) {
        self.log.push(Call::Raster {
            width: bitmap.width(),
            height: bitmap.height(),
            placement,
        });
    }

    fn detach(&mut self) {
        self.log.push(Call::Detach);
    }
}

/// Produces a blank `100 * scale` square, or fails on demand.
#[derive(Debug, Default)]
pub(crate) struct FakeRasterizer {
    pub(crate) fail: bool,
    pub(crate) calls: Cell<usize>,
}

impl FakeRasterizer {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

impl Rasterizer for FakeRasterizer {
    fn rasterize(&self, request: &RasterRequest<'_>) -> Result<Bitmap> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(RenderError::InvalidMarkup {
                message: "unbalanced markup".to_string(),
            });
        }
        let side = (100.0 * request.transform.scale).ceil().max(1.0) as u32;
        Bitmap::new(side, side).ok_or(RenderError::PixmapAlloc)
    }
}

pub(crate) type TestEngine = ViewportEngine<RecordingSurface, FakeRasterizer>;

pub(crate) fn engine_at(bounds: ScreenRect, rasterizer: FakeRasterizer) -> (TestEngine, Log) {
    let (surface, log) = RecordingSurface::new(bounds);
    let engine = ViewportEngine::with_rasterizer(surface, rasterizer, ViewportOptions::default());
    (engine, log)
}

pub(crate) fn engine() -> (TestEngine, Log) {
    engine_at(screen_rect(0.0, 0.0, 800.0, 600.0), FakeRasterizer::default())
}

pub(crate) fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

/// Width and height from a PNG's IHDR chunk.
pub(crate) fn png_size(bytes: &[u8]) -> (u32, u32) {
    assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"), "not a PNG");
    assert_eq!(&bytes[12..16], b"IHDR");
    let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
    (width, height)
}
