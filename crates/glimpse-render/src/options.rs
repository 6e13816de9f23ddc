use glimpse_core::geom::{ContentSize, content_size};
use glimpse_core::{Background, ZoomLimits};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Tunables for [`crate::ViewportEngine`].
///
/// Deserializes from camelCase JSON; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportOptions {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Factor applied per wheel tick with `delta_y <= 0`.
    pub wheel_zoom_in: f64,
    /// Factor applied per wheel tick with `delta_y > 0`.
    pub wheel_zoom_out: f64,
    /// Quiet period after the last wheel tick before the interaction ends.
    pub wheel_debounce_ms: u64,
    /// Fill behind interaction snapshots.
    pub background: Background,
    pub fallback_width: f64,
    pub fallback_height: f64,
    pub font_family: String,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            min_scale: glimpse_core::transform::MIN_SCALE,
            max_scale: glimpse_core::transform::MAX_SCALE,
            wheel_zoom_in: 1.1,
            wheel_zoom_out: 0.9,
            wheel_debounce_ms: 150,
            background: Background::Transparent,
            fallback_width: 100.0,
            fallback_height: 100.0,
            font_family: "Arial".to_string(),
        }
    }
}

impl ViewportOptions {
    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits::new(self.min_scale, self.max_scale)
    }

    pub fn wheel_debounce(&self) -> Duration {
        Duration::from_millis(self.wheel_debounce_ms)
    }

    /// Size assumed for graphics that declare neither width/height nor a `viewBox`.
    pub fn fallback_size(&self) -> ContentSize {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(self.fallback_width) && valid(self.fallback_height) {
            content_size(self.fallback_width, self.fallback_height)
        } else {
            glimpse_core::svg::FALLBACK_SIZE
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub scale: f32,
    pub background: Background,
    pub format: ExportFormat,
    pub jpeg_quality: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: Background::White,
            format: ExportFormat::Png,
            jpeg_quality: 90,
        }
    }
}
