#![forbid(unsafe_code)]

//! Pan/zoom transform model.
//!
//! A [`Transform`] maps content space into the surface's local screen space (origin at the
//! surface's top-left corner):
//!
//! ```text
//! screen = (content + translate) * scale
//! ```
//!
//! Translation is stored in content units, so the screen-space offset of the content origin is
//! `translate * scale`. All operations are pure and return a new value.

use crate::geom::{
    ContentPoint, ContentSpace, ContentVector, ScreenPoint, ScreenSpace, ScreenVector,
};
use serde::{Deserialize, Serialize};

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 10.0;

/// Inclusive scale range enforced by [`Transform::zoom_within`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: MIN_SCALE,
            max: MAX_SCALE,
        }
    }
}

impl ZoomLimits {
    /// Builds limits from an arbitrary pair, swapping the bounds when they are reversed.
    ///
    /// Non-finite or non-positive bounds fall back to the defaults.
    pub fn new(min: f64, max: f64) -> Self {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(min) || !valid(max) {
            return Self::default();
        }
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    /// Pan offset in content units (pre-scale).
    pub translate: ContentVector,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        translate: ContentVector::new(0.0, 0.0),
    };

    pub fn new(scale: f64, translate_x: f64, translate_y: f64) -> Self {
        Self {
            scale,
            translate: euclid::vec2(translate_x, translate_y),
        }
    }

    /// Returns the identity transform, whatever the previous state was.
    pub fn reset() -> Self {
        Self::IDENTITY
    }

    pub fn translate_x(&self) -> f64 {
        self.translate.x
    }

    pub fn translate_y(&self) -> f64 {
        self.translate.y
    }

    /// Screen-space offset of the content origin (`translate * scale`).
    pub fn screen_offset(&self) -> ScreenVector {
        euclid::vec2(self.translate.x * self.scale, self.translate.y * self.scale)
    }

    pub fn is_finite(&self) -> bool {
        self.scale.is_finite() && self.translate.x.is_finite() && self.translate.y.is_finite()
    }

    /// Zooms by `factor` around `anchor`, using the default `[0.1, 10]` limits.
    ///
    /// `anchor` is relative to the surface's top-left corner.
    pub fn zoom(self, factor: f64, anchor: ScreenPoint) -> Self {
        self.zoom_within(factor, anchor, ZoomLimits::default())
    }

    /// Zooms by `factor` around `anchor`, keeping the content point under the anchor fixed.
    ///
    /// Non-finite or non-positive factors are ignored. When the clamped scale equals the current
    /// one (already at a bound), the transform is returned unchanged.
    pub fn zoom_within(self, factor: f64, anchor: ScreenPoint, limits: ZoomLimits) -> Self {
        if !factor.is_finite() || factor <= 0.0 || !anchor.x.is_finite() || !anchor.y.is_finite()
        {
            return self;
        }
        let new_scale = limits.clamp(self.scale * factor);
        if !new_scale.is_finite() || new_scale == self.scale {
            return self;
        }

        // Anchor-preserving update, expressed on the screen-space offset:
        // offset' = anchor - (anchor - offset) * (scale' / scale)
        let ratio = new_scale / self.scale;
        let offset = self.screen_offset();
        let new_offset_x = anchor.x - (anchor.x - offset.x) * ratio;
        let new_offset_y = anchor.y - (anchor.y - offset.y) * ratio;

        let next = Self::new(new_scale, new_offset_x / new_scale, new_offset_y / new_scale);
        if next.is_finite() { next } else { self }
    }

    /// Pans by a screen-space delta, converted to content units by dividing by the scale.
    pub fn pan(self, delta: ScreenVector) -> Self {
        if !delta.x.is_finite() || !delta.y.is_finite() {
            return self;
        }
        let next = Self {
            scale: self.scale,
            translate: self.translate + euclid::vec2(delta.x / self.scale, delta.y / self.scale),
        };
        if next.is_finite() { next } else { self }
    }

    /// Typed content-to-screen matrix for hosts that want to hand it to a renderer.
    pub fn to_matrix(&self) -> euclid::Transform2D<f64, ContentSpace, ScreenSpace> {
        euclid::Transform2D::translation(self.translate.x, self.translate.y)
            .then_scale(self.scale, self.scale)
    }

    /// Maps a content point to the surface-local screen point it is drawn at.
    pub fn screen_point_of(&self, content: ContentPoint) -> ScreenPoint {
        self.to_matrix().transform_point(content)
    }

    /// Content point currently drawn under the surface-local screen point `screen`.
    pub fn content_point_under(&self, screen: ScreenPoint) -> ContentPoint {
        euclid::point2(
            screen.x / self.scale - self.translate.x,
            screen.y / self.scale - self.translate.y,
        )
    }

    /// Placement of a bitmap snapshot captured under `captured` within the current view.
    ///
    /// Snapshots are viewport-sized captures of the surface as it looked under `captured`, so
    /// bitmap pixel `p` shows the surface-local point `p` of that moment. The returned pair is
    /// `(bitmap_scale, offset)`: scale the bitmap by `bitmap_scale`, then draw its top-left pixel
    /// at `offset` (surface-local pixels).
    pub fn relative_to(&self, captured: &Transform) -> (f64, ScreenVector) {
        let ratio = self.scale / captured.scale;
        (ratio, self.screen_offset() - captured.screen_offset() * ratio)
    }
}
