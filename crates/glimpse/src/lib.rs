#![forbid(unsafe_code)]

//! `glimpse` previews pasted SVG or HTML: it recovers the fragment from messy text and shows it
//! in a pan/zoom viewport.
//!
//! # Features
//!
//! - `viewport` (default): the viewport engine and raster export (`glimpse::viewport`)

pub use glimpse_core::*;

#[cfg(feature = "viewport")]
pub mod viewport;
