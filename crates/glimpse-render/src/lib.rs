#![forbid(unsafe_code)]

//! Viewport engine for glimpse previews.
//!
//! [`ViewportEngine`] composes the pan/zoom [`glimpse_core::Transform`] with two presentation
//! paths on a host [`Surface`]: the live vector path, and a bitmap stand-in used while the user
//! interacts with generic markup. It also exports vector content to PNG/JPG.

pub mod debounce;
pub mod engine;
pub mod error;
pub mod input;
pub mod job;
pub mod options;
pub mod raster;
pub mod state;
pub mod surface;

pub use engine::ViewportEngine;
pub use error::{RenderError, Result};
pub use input::InputEvent;
pub use job::{RasterJob, RasterOutcome};
pub use options::{ExportFormat, ExportOptions, ViewportOptions};
pub use raster::{RasterRequest, Rasterizer, SvgRasterizer, svg_to_jpeg, svg_to_png};
pub use state::{Mode, ModeKind, RenderState, Snapshot};
pub use surface::{Bitmap, RasterPlacement, Surface};

#[cfg(test)]
mod tests;
