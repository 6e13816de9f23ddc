use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Fill painted behind rasterized content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    #[default]
    Transparent,
    White,
    Black,
}

impl Background {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transparent => "transparent",
            Self::White => "white",
            Self::Black => "black",
        }
    }

    /// Straight (non-premultiplied) RGBA8 color of the fill.
    pub fn rgba8(self) -> [u8; 4] {
        match self {
            Self::Transparent => [0, 0, 0, 0],
            Self::White => [255, 255, 255, 255],
            Self::Black => [0, 0, 0, 255],
        }
    }

    pub fn is_opaque(self) -> bool {
        self.rgba8()[3] == 255
    }
}

impl std::fmt::Display for Background {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Background {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transparent" | "none" => Ok(Self::Transparent),
            "white" | "#fff" | "#ffffff" => Ok(Self::White),
            "black" | "#000" | "#000000" => Ok(Self::Black),
            other => Err(Error::UnsupportedBackground {
                value: other.to_string(),
            }),
        }
    }
}
