//! Interactive generation of the configuration document.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use tracing::{info, warn};

use super::profile::{DisplayProfile, GeoCoordinates, OrientationProfile};
use super::prompt::{ChoiceOption, Prompter};
use super::{
    AudioSection, ConfigurationDocument, DisplaySection, FitStrategy, ImageSection,
    LightingSection, LogSection, OpenAiSection, OrchestratorSection, SpotifySection,
    TextAlignment, WeatherSection,
};
use crate::settings::InstallLayout;

const FONT_PATH: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";
const HEADER: &str = "# Generated by `nowplay install`. Re-running install overwrites this file.\n";

const OFFSET_EDGES_TEXT: [&str; 5] = ["left", "right", "top", "bottom", "text_shadow"];
const OFFSET_EDGES_ALBUM: [&str; 4] = ["left", "top", "right", "bottom"];

const NIGHT_LIGHTING: &str = "Render with low-light exposure: markedly darker scene, \
high contrast, cooler ambient tones, visible artificial lighting (street lamps, \
train interiors/headlights, illuminated windows), specular highlights on wet surfaces, \
reduced sky luminance.";
const TWILIGHT_LIGHTING: &str = "Use twilight lighting: soft low-angle light, gentle shadows, \
sky gradient, moderate contrast, selective artificial lights beginning to appear.";
const DAY_LIGHTING: &str = "Use daytime lighting: natural brightness, appropriate color \
temperature for the time, balanced contrast, and realistic shadows.";

/// Operator answers, in prompt order.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigAnswers {
    pub openweathermap_api_key: String,
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_playlist_id: String,
    pub openai_api_key: String,
    pub coordinates: GeoCoordinates,
    pub display: DisplayProfile,
    pub orientation: OrientationProfile,
}

#[derive(Debug, Clone)]
pub struct GeneratedConfig {
    pub document: ConfigurationDocument,
    pub path: PathBuf,
    /// blake3 digest of the written file.
    pub digest: String,
}

#[derive(Debug, Clone)]
pub struct ConfigGenerator {
    layout: InstallLayout,
}

impl ConfigGenerator {
    pub fn new(layout: InstallLayout) -> Self {
        Self { layout }
    }

    /// Prompt, build, and write. Any existing document is replaced.
    pub fn generate(&self, prompter: &dyn Prompter) -> anyhow::Result<GeneratedConfig> {
        let answers = self.collect(prompter)?;
        let document = self.build(&answers);
        self.write(document)
    }

    pub fn collect(&self, prompter: &dyn Prompter) -> anyhow::Result<ConfigAnswers> {
        let openweathermap_api_key = prompter.secret("OpenWeatherMap API key")?;
        let spotify_client_id = prompter.text("Spotify client ID", None)?;
        let spotify_client_secret = prompter.secret("Spotify client secret")?;
        let spotify_playlist_id = prompter.text("Spotify playlist ID (optional)", Some(""))?;
        let openai_api_key = prompter.secret("OpenAI API key")?;
        let coordinates = prompt_coordinates(prompter)?;

        let display_options: Vec<ChoiceOption<'_>> = DisplayProfile::ALL
            .iter()
            .map(|p| ChoiceOption {
                selector: p.selector(),
                label: p.label(),
            })
            .collect();
        let display_input = prompter.choice(
            "Display size",
            &display_options,
            DisplayProfile::default().selector(),
        )?;
        let display = resolve_display(&display_input);

        let orientation_options: Vec<ChoiceOption<'_>> = OrientationProfile::ALL
            .iter()
            .map(|o| ChoiceOption {
                selector: o.selector(),
                label: o.as_str(),
            })
            .collect();
        let orientation_input = prompter.choice(
            "Display orientation",
            &orientation_options,
            OrientationProfile::default().selector(),
        )?;
        let orientation = resolve_orientation(&orientation_input);

        Ok(ConfigAnswers {
            openweathermap_api_key,
            spotify_client_id,
            spotify_client_secret,
            spotify_playlist_id,
            openai_api_key,
            coordinates,
            display,
            orientation,
        })
    }

    pub fn build(&self, answers: &ConfigAnswers) -> ConfigurationDocument {
        let dimensions = answers.display.dimensions();
        let layout = &self.layout;

        ConfigurationDocument {
            display: DisplaySection {
                width: dimensions.width,
                height: dimensions.height,
                orientation: answers.orientation,
                small_album_cover_px: dimensions.album_cover_px,
                font_path: PathBuf::from(FONT_PATH),
                font_size_title: 48,
                font_size_subtitle: 32,
                text_alignment_portrait: TextAlignment::Left,
                text_alignment_landscape: TextAlignment::Left,
                text_wrap_break_long_words: true,
                text_wrap_hyphenate: false,
                text_line_spacing_px: 0,
                backdrop_blur_radius: 12,
                backdrop_darken_alpha: 120,
                backdrop_use_gradient: false,
                weather_background_image: layout.resource("weather_background.png"),
                screensaver_image: layout.resource("screensaver.png"),
                offsets: zero_offsets(),
            },
            weather: WeatherSection {
                openweathermap_api_key: answers.openweathermap_api_key.clone(),
                geo_coordinates: answers.coordinates,
                background_refresh_seconds: 6 * 3600,
            },
            spotify: SpotifySection {
                client_id: answers.spotify_client_id.clone(),
                client_secret: answers.spotify_client_secret.clone(),
                playlist_id: answers.spotify_playlist_id.clone(),
            },
            orchestrator: OrchestratorSection {
                debounce_seconds: 30,
                cache_ttl_seconds: 86_400,
                cache_size: 512,
                cache_file_path: Some(layout.cache_file()),
            },
            openai: OpenAiSection {
                api_key: answers.openai_api_key.clone(),
                prompt_style: "80s anime style".to_string(),
                model: "gpt-image-1".to_string(),
            },
            image: ImageSection {
                fit_strategy: FitStrategy::Fit,
                fallback_image_path: layout.resource("fallback.png"),
                fallback_image_path_day: layout.resource("fallback_day.png"),
                fallback_image_path_night: layout.resource("fallback_night.png"),
            },
            lighting: LightingSection {
                night: NIGHT_LIGHTING.to_string(),
                twilight: TWILIGHT_LIGHTING.to_string(),
                day: DAY_LIGHTING.to_string(),
            },
            audio: AudioSection {
                recording_duration_seconds: 6,
            },
            log: LogSection {
                log_file_path: layout.log_file(),
            },
        }
    }

    /// Ensure the layout directories exist and overwrite the document.
    pub fn write(&self, document: ConfigurationDocument) -> anyhow::Result<GeneratedConfig> {
        self.layout.ensure_dirs()?;

        let mut content = String::from(HEADER);
        content.push_str(&document.to_yaml()?);

        let path = self.layout.config_file();
        std::fs::write(&path, &content)
            .with_context(|| format!("Failed to write configuration: {}", path.display()))?;
        info!(path = %path.display(), "wrote configuration document");

        Ok(GeneratedConfig {
            document,
            path,
            digest: crate::fs::content_digest(content.as_bytes()),
        })
    }
}

fn prompt_coordinates(prompter: &dyn Prompter) -> anyhow::Result<GeoCoordinates> {
    loop {
        let raw = prompter.text("Coordinates (lat,lon)", None)?;
        match raw.parse::<GeoCoordinates>() {
            Ok(coordinates) => return Ok(coordinates),
            Err(err) => warn!("{err}; try again"),
        }
    }
}

fn resolve_display(input: &str) -> DisplayProfile {
    DisplayProfile::parse_selector(input).unwrap_or_else(|| {
        let fallback = DisplayProfile::default();
        warn!(input, profile = ?fallback, "unrecognised display size, using default");
        fallback
    })
}

fn resolve_orientation(input: &str) -> OrientationProfile {
    OrientationProfile::parse_selector(input).unwrap_or_else(|| {
        let fallback = OrientationProfile::default();
        warn!(input, profile = %fallback, "unrecognised orientation, using default");
        fallback
    })
}

fn zero_offsets() -> BTreeMap<String, i32> {
    let mut offsets = BTreeMap::new();
    for orientation in OrientationProfile::ALL {
        for edge in OFFSET_EDGES_TEXT {
            offsets.insert(format!("text_offset_{edge}_px_{orientation}"), 0);
        }
        for edge in OFFSET_EDGES_ALBUM {
            offsets.insert(format!("album_offset_{edge}_px_{orientation}"), 0);
        }
    }
    offsets
}
