//! Application configuration document.
//!
//! Key names are a contract with the application, which reads
//! `config/config.yaml` at startup. Values are not interpreted here beyond
//! the display/orientation profile mapping.

mod generator;
mod profile;
mod prompt;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub use generator::{ConfigAnswers, ConfigGenerator, GeneratedConfig};
pub use profile::{DisplayDimensions, DisplayProfile, GeoCoordinates, OrientationProfile};
pub use prompt::{ChoiceOption, Prompter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationDocument {
    pub display: DisplaySection,
    pub weather: WeatherSection,
    pub spotify: SpotifySection,
    pub orchestrator: OrchestratorSection,
    pub openai: OpenAiSection,
    pub image: ImageSection,
    pub lighting: LightingSection,
    pub audio: AudioSection,
    pub log: LogSection,
}

impl ConfigurationDocument {
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration document")
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse configuration document")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySection {
    pub width: u32,
    pub height: u32,
    pub orientation: OrientationProfile,
    pub small_album_cover_px: u32,
    pub font_path: PathBuf,
    pub font_size_title: u32,
    pub font_size_subtitle: u32,
    pub text_alignment_portrait: TextAlignment,
    pub text_alignment_landscape: TextAlignment,
    pub text_wrap_break_long_words: bool,
    pub text_wrap_hyphenate: bool,
    pub text_line_spacing_px: i32,
    pub backdrop_blur_radius: u32,
    pub backdrop_darken_alpha: u8,
    pub backdrop_use_gradient: bool,
    pub weather_background_image: PathBuf,
    pub screensaver_image: PathBuf,
    /// `{text,album}_offset_<edge>_px_<orientation>` keys, kept flat.
    #[serde(flatten)]
    pub offsets: BTreeMap<String, i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSection {
    pub openweathermap_api_key: String,
    pub geo_coordinates: GeoCoordinates,
    pub background_refresh_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifySection {
    pub client_id: String,
    pub client_secret: String,
    pub playlist_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorSection {
    pub debounce_seconds: u64,
    pub cache_ttl_seconds: u64,
    pub cache_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_file_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAiSection {
    pub api_key: String,
    pub prompt_style: String,
    pub model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitStrategy {
    /// Crop to fill the panel.
    Fit,
    /// Letterbox inside the panel.
    Pad,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSection {
    pub fit_strategy: FitStrategy,
    pub fallback_image_path: PathBuf,
    pub fallback_image_path_day: PathBuf,
    pub fallback_image_path_night: PathBuf,
}

/// Free-text lighting instructions per time of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightingSection {
    pub night: String,
    pub twilight: String,
    pub day: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSection {
    pub recording_duration_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSection {
    pub log_file_path: PathBuf,
}
