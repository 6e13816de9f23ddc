use crate::debounce::Debounce;
use crate::error::{RenderError, Result};
use crate::input::InputEvent;
use crate::job::{RasterJob, RasterOutcome};
use crate::options::{ExportOptions, ViewportOptions};
use crate::raster::{Rasterizer, SvgRasterizer};
use crate::state::{Mode, ModeKind, RenderState, Snapshot};
use crate::surface::{RasterPlacement, Surface};
use glimpse_core::geom::{ScreenPoint, ScreenVector};
use glimpse_core::svg::ensure_intrinsic_size;
use glimpse_core::{Background, ContentKind, Transform, ZoomLimits};
use std::sync::Arc;
use std::time::Instant;

/// Pan/zoom viewport over a host [`Surface`].
///
/// Idle content is always shown through the live vector path. While the user drags or scrolls
/// over `Markup` content, the engine queues a [`RasterJob`]; once its bitmap comes back through
/// [`ViewportEngine::complete_rasterization`] the engine moves that bitmap around instead of
/// re-rendering, and returns to the vector path when the interaction ends.
///
/// All methods are synchronous. Snapshots are the one deferred step: run them with
/// [`ViewportEngine::drive_rasterization`], or take them with
/// [`ViewportEngine::take_raster_jobs`] and run them wherever suits the host.
pub struct ViewportEngine<S: Surface, R: Rasterizer = SvgRasterizer> {
    surface: Option<S>,
    rasterizer: R,
    exporter: SvgRasterizer,
    options: ViewportOptions,
    limits: ZoomLimits,
    state: RenderState,
    /// Content as handed to the vector path.
    presented: Arc<str>,
    jobs: Vec<RasterJob>,
    wheel: Debounce,
    drag: Option<ScreenPoint>,
}

impl<S: Surface> ViewportEngine<S> {
    pub fn new(surface: S, options: ViewportOptions) -> Self {
        let rasterizer = SvgRasterizer::from_options(&options);
        Self::with_rasterizer(surface, rasterizer, options)
    }
}

impl<S: Surface, R: Rasterizer> ViewportEngine<S, R> {
    pub fn with_rasterizer(surface: S, rasterizer: R, options: ViewportOptions) -> Self {
        tracing::debug!(?options, "viewport attached");
        Self {
            surface: Some(surface),
            rasterizer,
            exporter: SvgRasterizer::from_options(&options),
            limits: options.zoom_limits(),
            wheel: Debounce::new(options.wheel_debounce()),
            options,
            state: RenderState::default(),
            presented: Arc::from(""),
            jobs: Vec::new(),
            drag: None,
        }
    }

    pub fn options(&self) -> &ViewportOptions {
        &self.options
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn transform(&self) -> Transform {
        self.state.transform()
    }

    pub fn mode(&self) -> &Mode {
        self.state.mode()
    }

    pub fn mode_kind(&self) -> ModeKind {
        self.state.mode().kind()
    }

    pub fn is_interacting(&self) -> bool {
        self.state.interacting()
    }

    pub fn generation(&self) -> u64 {
        self.state.generation()
    }

    pub fn content(&self) -> &str {
        self.state.content()
    }

    pub fn kind(&self) -> ContentKind {
        self.state.kind()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub fn is_disposed(&self) -> bool {
        self.surface.is_none()
    }

    fn transition(&mut self, f: impl FnOnce(RenderState) -> RenderState) {
        let state = std::mem::take(&mut self.state);
        self.state = f(state);
    }

    fn present(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let transform = self.state.transform();
        match self.state.mode() {
            Mode::Vector => surface.present_vector(&self.presented, self.state.kind(), &transform),
            Mode::Raster(snapshot) => surface.present_raster(
                &snapshot.bitmap,
                RasterPlacement::new(&transform, &snapshot.captured),
            ),
        }
    }

    fn apply_transform(&mut self, next: Transform) {
        if next == self.state.transform() {
            return;
        }
        self.transition(|s| s.with_transform(next));
        self.present();
    }

    /// Replaces the content, resets the transform and returns to the vector path.
    ///
    /// Snapshots requested for the previous content are invalidated.
    pub fn set_content(&mut self, content: impl Into<Arc<str>>, kind: ContentKind) {
        if self.is_disposed() {
            return;
        }
        let content: Arc<str> = content.into();
        self.presented = match kind {
            ContentKind::Vector => Arc::from(ensure_intrinsic_size(&content)),
            ContentKind::Markup => Arc::clone(&content),
        };
        self.jobs.clear();
        self.transition(|s| s.with_content(content, kind));
        tracing::debug!(generation = self.state.generation(), %kind, "content replaced");
        self.present();
    }

    /// Zooms by `factor` keeping the content under `anchor` (screen coordinates) in place.
    pub fn zoom(&mut self, factor: f64, anchor: ScreenPoint) {
        let Some(surface) = self.surface.as_ref() else {
            return;
        };
        let anchor = (anchor - surface.bounds().origin).to_point();
        let next = self.state.transform().zoom_within(factor, anchor, self.limits);
        self.apply_transform(next);
    }

    pub fn pan(&mut self, delta: ScreenVector) {
        if self.is_disposed() {
            return;
        }
        let next = self.state.transform().pan(delta);
        self.apply_transform(next);
    }

    pub fn reset(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.apply_transform(Transform::reset());
    }

    /// Marks the start of a drag or wheel gesture. Repeated calls are ignored until
    /// [`ViewportEngine::end_interaction`].
    pub fn start_interaction(&mut self) {
        let Some(surface) = self.surface.as_ref() else {
            return;
        };
        if self.state.interacting() {
            return;
        }
        let viewport = surface.bounds().size;
        self.transition(RenderState::begin_interaction);
        if !self.state.wants_snapshot() {
            return;
        }
        let job = RasterJob {
            generation: self.state.generation(),
            content: Arc::clone(self.state.content()),
            kind: self.state.kind(),
            transform: self.state.transform(),
            viewport,
            background: self.options.background,
        };
        tracing::debug!(generation = job.generation, "interaction snapshot requested");
        self.jobs.push(job);
    }

    /// Ends the current gesture; a raster stand-in is replaced by the vector path at the
    /// current transform.
    pub fn end_interaction(&mut self) {
        if self.is_disposed() || !self.state.interacting() {
            return;
        }
        self.jobs.clear();
        self.wheel.cancel();
        let was_raster = self.mode_kind() == ModeKind::Raster;
        self.transition(RenderState::end_interaction);
        if was_raster {
            tracing::debug!(generation = self.state.generation(), "raster -> vector");
            self.present();
        }
    }

    pub fn pending_jobs(&self) -> &[RasterJob] {
        &self.jobs
    }

    /// Hands queued snapshot jobs to the caller; their outcomes go back through
    /// [`ViewportEngine::complete_rasterization`].
    pub fn take_raster_jobs(&mut self) -> Vec<RasterJob> {
        std::mem::take(&mut self.jobs)
    }

    /// Applies a finished snapshot. Returns `true` when the engine switched to raster mode.
    ///
    /// Outcomes from an older generation, from a finished interaction or from a disposed engine
    /// are dropped along with their bitmap. A failed snapshot is logged and the engine stays on
    /// the vector path.
    pub fn complete_rasterization(&mut self, outcome: RasterOutcome) -> bool {
        let RasterOutcome {
            generation,
            transform,
            result,
        } = outcome;
        if self.is_disposed() || !self.state.accepts_snapshot(generation) {
            tracing::debug!(
                generation,
                current = self.state.generation(),
                "discarding stale snapshot"
            );
            return false;
        }
        match result {
            Ok(bitmap) => {
                tracing::debug!(
                    generation,
                    width = bitmap.width(),
                    height = bitmap.height(),
                    "vector -> raster"
                );
                self.transition(|s| {
                    s.enter_raster(Snapshot {
                        bitmap,
                        captured: transform,
                    })
                });
                self.present();
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "interaction snapshot failed; staying on the vector path");
                false
            }
        }
    }

    /// Runs every queued job with the engine's own rasterizer. Returns how many were applied.
    pub fn drive_rasterization(&mut self) -> usize {
        let jobs = self.take_raster_jobs();
        let mut applied = 0;
        for job in jobs {
            let outcome = job.run(&self.rasterizer);
            if self.complete_rasterization(outcome) {
                applied += 1;
            }
        }
        applied
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        if self.is_disposed() {
            return;
        }
        match event {
            InputEvent::PointerDown { position } => {
                self.drag = Some(position);
                self.start_interaction();
            }
            InputEvent::PointerMove { position } => {
                let Some(last) = self.drag else {
                    return;
                };
                self.drag = Some(position);
                self.pan(position - last);
            }
            InputEvent::PointerUp { .. } => {
                if self.drag.take().is_some() {
                    self.end_interaction();
                }
            }
            InputEvent::Wheel {
                delta_y,
                position,
                at,
            } => {
                if !delta_y.is_finite() {
                    return;
                }
                self.start_interaction();
                let factor = if delta_y > 0.0 {
                    self.options.wheel_zoom_out
                } else {
                    self.options.wheel_zoom_in
                };
                self.zoom(factor, position);
                self.wheel.schedule(at);
            }
        }
    }

    /// When the host should call [`ViewportEngine::tick`] next, if a wheel gesture is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.wheel.deadline()
    }

    /// Advances the wheel debounce. Returns `true` when this ended the interaction.
    ///
    /// An active drag keeps the interaction alive; its pointer-up ends it.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.wheel.fire(now) || self.drag.is_some() || !self.state.interacting() {
            return false;
        }
        self.end_interaction();
        true
    }

    /// Encodes the current vector content as PNG at `scale` device pixels per content unit.
    pub fn raster_export(&self, scale: f32, background: Background) -> Result<Vec<u8>> {
        self.export(&ExportOptions {
            scale,
            background,
            ..Default::default()
        })
    }

    pub fn export(&self, options: &ExportOptions) -> Result<Vec<u8>> {
        if self.is_disposed() {
            return Err(RenderError::Disposed);
        }
        let kind = self.state.kind();
        if kind != ContentKind::Vector {
            return Err(RenderError::UnsupportedExport { kind });
        }
        self.exporter.export(self.state.content(), options)
    }

    /// Detaches from the surface and cancels pending work. Later calls do nothing.
    pub fn dispose(&mut self) {
        let Some(mut surface) = self.surface.take() else {
            return;
        };
        self.jobs.clear();
        self.wheel.cancel();
        self.drag = None;
        self.transition(RenderState::invalidate);
        surface.detach();
        tracing::debug!(generation = self.state.generation(), "viewport disposed");
    }
}

impl<S: Surface, R: Rasterizer> Drop for ViewportEngine<S, R> {
    fn drop(&mut self) {
        self.dispose();
    }
}
