#![forbid(unsafe_code)]

/// Screen (device) coordinates, in pixels, as reported by pointer and wheel events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenSpace {}

/// Content coordinates: the rendered fragment's own units, independent of pan/zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSpace {}

pub type ScreenPoint = euclid::Point2D<f64, ScreenSpace>;
pub type ScreenVector = euclid::Vector2D<f64, ScreenSpace>;
pub type ScreenSize = euclid::Size2D<f64, ScreenSpace>;
pub type ScreenRect = euclid::Rect<f64, ScreenSpace>;

pub type ContentPoint = euclid::Point2D<f64, ContentSpace>;
pub type ContentVector = euclid::Vector2D<f64, ContentSpace>;
pub type ContentSize = euclid::Size2D<f64, ContentSpace>;

pub fn screen_point(x: f64, y: f64) -> ScreenPoint {
    euclid::point2(x, y)
}

pub fn screen_vector(x: f64, y: f64) -> ScreenVector {
    euclid::vec2(x, y)
}

pub fn screen_size(width: f64, height: f64) -> ScreenSize {
    euclid::size2(width, height)
}

pub fn screen_rect(x: f64, y: f64, width: f64, height: f64) -> ScreenRect {
    euclid::rect(x, y, width, height)
}

pub fn content_size(width: f64, height: f64) -> ContentSize {
    euclid::size2(width, height)
}
