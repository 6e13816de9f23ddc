#![forbid(unsafe_code)]

//! Headless core of the glimpse previewer.
//!
//! - [`transform`]: pan/zoom math with anchor-preserving zoom and scale clamping
//! - [`extract`]: a total, idempotent pipeline that recovers SVG/markup from pasted text
//! - [`svg`]: sizing, validation and encoding helpers for SVG text
//!
//! Nothing in this crate renders or performs I/O.

pub mod background;
pub mod detect;
pub mod entities;
pub mod error;
pub mod extract;
pub mod geom;
pub mod svg;
pub mod transform;
pub mod utils;

pub use background::Background;
pub use detect::{ContentKind, DetectedKind, detect_kind};
pub use error::{Error, Result};
pub use extract::{ExtractOptions, Extraction, Extractor, extract, extract_with_kind};
pub use transform::{Transform, ZoomLimits};
