//! The engine's two-state presentation machine.
//!
//! [`RenderState`] is a plain record; every transition consumes it and returns the next one.
//! Snapshot data lives only inside [`Mode::Raster`], so leaving raster mode drops the bitmap.

use crate::surface::Bitmap;
use glimpse_core::{ContentKind, Transform};
use std::sync::Arc;

/// A bitmap captured for the duration of one interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub bitmap: Bitmap,
    /// Transform the bitmap was rendered under.
    pub captured: Transform,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Mode {
    /// Live vector path at the current transform.
    #[default]
    Vector,
    /// Bitmap stand-in while a markup interaction is in progress.
    Raster(Snapshot),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Vector,
    Raster,
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Self::Vector => ModeKind::Vector,
            Self::Raster(_) => ModeKind::Raster,
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            Self::Vector => None,
            Self::Raster(snapshot) => Some(snapshot),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderState {
    transform: Transform,
    content: Arc<str>,
    kind: ContentKind,
    mode: Mode,
    interacting: bool,
    generation: u64,
}

impl RenderState {
    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn content(&self) -> &Arc<str> {
        &self.content
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn interacting(&self) -> bool {
        self.interacting
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// New content: identity transform, vector mode, next generation.
    pub fn with_content(self, content: Arc<str>, kind: ContentKind) -> Self {
        Self {
            transform: Transform::reset(),
            content,
            kind,
            mode: Mode::Vector,
            interacting: self.interacting,
            generation: self.generation.wrapping_add(1),
        }
    }

    pub fn with_transform(self, transform: Transform) -> Self {
        Self { transform, ..self }
    }

    /// Starts an interaction under a fresh generation, so snapshots requested for an earlier
    /// interaction on the same content are never shown.
    pub fn begin_interaction(self) -> Self {
        Self {
            interacting: true,
            generation: self.generation.wrapping_add(1),
            ..self
        }
    }

    /// Leaves the interaction; raster mode falls back to the vector path.
    pub fn end_interaction(self) -> Self {
        Self {
            interacting: false,
            mode: Mode::Vector,
            ..self
        }
    }

    pub fn enter_raster(self, snapshot: Snapshot) -> Self {
        Self {
            mode: Mode::Raster(snapshot),
            ..self
        }
    }

    /// Drops any snapshot and moves past every generation handed out so far.
    pub fn invalidate(self) -> Self {
        Self {
            mode: Mode::Vector,
            interacting: false,
            generation: self.generation.wrapping_add(1),
            ..self
        }
    }

    /// Only non-empty markup switches to a snapshot, and only from the vector path.
    pub fn wants_snapshot(&self) -> bool {
        self.interacting
            && self.kind == ContentKind::Markup
            && self.mode == Mode::Vector
            && !self.content.trim().is_empty()
    }

    /// Whether a snapshot rendered for `generation` may still be shown.
    pub fn accepts_snapshot(&self, generation: u64) -> bool {
        generation == self.generation && self.wants_snapshot()
    }
}
