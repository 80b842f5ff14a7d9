//! Hardware choices and the numeric profiles derived from them.
//!
//! Selector input never fails: anything unrecognised resolves to the
//! documented default (`standard` display, `portrait` orientation).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayDimensions {
    pub width: u32,
    pub height: u32,
    pub album_cover_px: u32,
}

/// Supported e-ink panel sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayProfile {
    /// 4.0" panel.
    Compact,
    /// 5.7" panel.
    #[default]
    Standard,
    /// 7.3" panel.
    Large,
}

impl DisplayProfile {
    pub const ALL: [DisplayProfile; 3] = [
        DisplayProfile::Compact,
        DisplayProfile::Standard,
        DisplayProfile::Large,
    ];

    /// Resolve operator input, falling back to `Standard`.
    pub fn from_selector(input: &str) -> Self {
        Self::parse_selector(input).unwrap_or_default()
    }

    pub fn parse_selector(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "1" | "compact" => Some(DisplayProfile::Compact),
            "2" | "standard" => Some(DisplayProfile::Standard),
            "3" | "large" => Some(DisplayProfile::Large),
            _ => None,
        }
    }

    pub fn selector(self) -> &'static str {
        match self {
            DisplayProfile::Compact => "1",
            DisplayProfile::Standard => "2",
            DisplayProfile::Large => "3",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DisplayProfile::Compact => "4.0\" compact (640x400)",
            DisplayProfile::Standard => "5.7\" standard (600x448)",
            DisplayProfile::Large => "7.3\" large (800x480)",
        }
    }

    pub fn dimensions(self) -> DisplayDimensions {
        match self {
            DisplayProfile::Compact => DisplayDimensions {
                width: 640,
                height: 400,
                album_cover_px: 200,
            },
            DisplayProfile::Standard => DisplayDimensions {
                width: 600,
                height: 448,
                album_cover_px: 250,
            },
            DisplayProfile::Large => DisplayDimensions {
                width: 800,
                height: 480,
                album_cover_px: 300,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrientationProfile {
    #[default]
    Portrait,
    Landscape,
}

impl OrientationProfile {
    pub const ALL: [OrientationProfile; 2] =
        [OrientationProfile::Portrait, OrientationProfile::Landscape];

    /// Resolve operator input, falling back to `Portrait`.
    pub fn from_selector(input: &str) -> Self {
        Self::parse_selector(input).unwrap_or_default()
    }

    pub fn parse_selector(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "1" | "portrait" => Some(OrientationProfile::Portrait),
            "2" | "landscape" => Some(OrientationProfile::Landscape),
            _ => None,
        }
    }

    pub fn selector(self) -> &'static str {
        match self {
            OrientationProfile::Portrait => "1",
            OrientationProfile::Landscape => "2",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrientationProfile::Portrait => "portrait",
            OrientationProfile::Landscape => "landscape",
        }
    }
}

impl fmt::Display for OrientationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latitude/longitude pair, stored as `"lat,lon"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GeoCoordinates {
    pub lat: f64,
    pub lon: f64,
}

impl FromStr for GeoCoordinates {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| anyhow::anyhow!("Expected coordinates as \"lat,lon\", got {s:?}"))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid latitude: {:?}", lat.trim()))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid longitude: {:?}", lon.trim()))?;
        if !lat.is_finite() || !lon.is_finite() {
            anyhow::bail!("Coordinates must be finite numbers: {s:?}");
        }
        Ok(Self { lat, lon })
    }
}

impl TryFrom<String> for GeoCoordinates {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GeoCoordinates> for String {
    fn from(value: GeoCoordinates) -> Self {
        value.to_string()
    }
}

impl fmt::Display for GeoCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}
