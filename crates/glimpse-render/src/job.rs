use crate::error::Result;
use crate::raster::{RasterRequest, Rasterizer};
use crate::surface::Bitmap;
use glimpse_core::geom::ScreenSize;
use glimpse_core::{Background, ContentKind, Transform};
use std::sync::Arc;

/// A pending interaction snapshot, owned by the host until it is run.
///
/// The job carries everything it needs, so it can be run off the engine (for instance on a worker)
/// and its [`RasterOutcome`] handed back later through
/// [`crate::ViewportEngine::complete_rasterization`].
#[derive(Debug, Clone)]
pub struct RasterJob {
    pub generation: u64,
    pub content: Arc<str>,
    pub kind: ContentKind,
    pub transform: Transform,
    pub viewport: ScreenSize,
    pub background: Background,
}

impl RasterJob {
    pub fn request(&self) -> RasterRequest<'_> {
        RasterRequest {
            content: &self.content,
            kind: self.kind,
            transform: self.transform,
            viewport: self.viewport,
            background: self.background,
        }
    }

    pub fn run<R: Rasterizer + ?Sized>(self, rasterizer: &R) -> RasterOutcome {
        let result = rasterizer.rasterize(&self.request());
        RasterOutcome {
            generation: self.generation,
            transform: self.transform,
            result,
        }
    }

    /// [`RasterJob::run`] as a future, for hosts that collect outcomes in async code.
    ///
    /// Rasterization is CPU-bound and the future completes on its first poll without yielding;
    /// hosts that must keep an executor responsive should run the job on a blocking pool (for
    /// instance inside `spawn_blocking`) and await that instead.
    pub async fn run_async<R: Rasterizer + ?Sized>(self, rasterizer: &R) -> RasterOutcome {
        self.run(rasterizer)
    }
}

#[derive(Debug)]
pub struct RasterOutcome {
    pub generation: u64,
    /// Transform the snapshot was rendered under.
    pub transform: Transform,
    pub result: Result<Bitmap>,
}
