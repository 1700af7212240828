// src/config/file.rs
// File-based configuration from ~/.museo/config.toml

use super::env::{ApiKeys, ConfigValidation, EnvOverrides};
use crate::speech::Voice;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const YOUTUBE_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Upper bound on hits per video lookup
pub const MAX_VIDEO_RESULTS: u32 = 3;

/// The Franklin Institute's official channel
pub const DEFAULT_CHANNEL_ID: &str = "UCpAQimPOzeu_VRWRs_S4cPw";

/// Top-level config structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MuseoConfig {
    #[serde(default)]
    pub completion: CompletionSettings,
    #[serde(default)]
    pub speech: SpeechSettings,
    #[serde(default)]
    pub video: VideoSettings,
    #[serde(default)]
    pub venue: Venue,
    #[serde(default)]
    pub server: ServerSettings,
}

/// Completion service section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_string(),
            model: "gpt-3.5-turbo".to_string(),
            timeout_secs: 120,
        }
    }
}

impl CompletionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Speech synthesis section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub base_url: String,
    pub model: String,
    pub voice: Voice,
    /// Free-text style directions sent alongside every synthesis request
    pub instructions: String,
    pub timeout_secs: u64,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_string(),
            model: "gpt-4o-mini-tts".to_string(),
            voice: Voice::default(),
            instructions: "Speak in a warm, cheerful and clear tone, like a friendly museum guide \
                           talking to a family with young children."
                .to_string(),
            timeout_secs: 180,
        }
    }
}

impl SpeechSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Video search section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    pub base_url: String,
    pub channel_id: String,
    pub max_results: u32,
    pub timeout_secs: u64,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            base_url: YOUTUBE_BASE_URL.to_string(),
            channel_id: DEFAULT_CHANNEL_ID.to_string(),
            max_results: MAX_VIDEO_RESULTS,
            timeout_secs: 15,
        }
    }
}

impl VideoSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Persona policy: who the assistant speaks for and where
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Venue {
    /// Product name the assistant introduces itself with
    pub platform: String,
    /// Museum name used in every prompt
    pub name: String,
    /// Public channel page the exit ticket restricts recommendations to
    pub channel_url: String,
}

impl Default for Venue {
    fn default() -> Self {
        Self {
            platform: "MuseoGo".to_string(),
            name: "The Franklin Institute".to_string(),
            channel_url: "https://www.youtube.com/@TheFranklinInstitutePHL/videos".to_string(),
        }
    }
}

/// HTTP API section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// How long narrated audio waits for its download before it is deleted
    pub audio_ttl_secs: u64,
    /// Most narrated files held at once; the oldest go first
    pub audio_capacity: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7860,
            audio_ttl_secs: 600,
            audio_capacity: 32,
        }
    }
}

impl ServerSettings {
    pub fn audio_ttl(&self) -> Duration {
        Duration::from_secs(self.audio_ttl_secs)
    }
}

impl MuseoConfig {
    /// Load config from ~/.museo/config.toml, then apply MUSEO_* overrides
    pub fn load() -> Self {
        let mut config = Self::load_from(&Self::config_path());
        config.apply_overrides(&EnvOverrides::from_env());
        config
    }

    /// Load config from an explicit path; missing or broken files yield defaults
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded config from file");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config file");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    pub fn apply_overrides(&mut self, overrides: &EnvOverrides) {
        if let Some(ref model) = overrides.completion_model {
            self.completion.model = model.clone();
        }
        if let Some(ref voice) = overrides.speech_voice {
            match voice.parse::<Voice>() {
                Ok(v) => self.speech.voice = v,
                Err(e) => warn!(value = %voice, error = %e, "Ignoring MUSEO_SPEECH_VOICE"),
            }
        }
        if let Some(ref url) = overrides.openai_base_url {
            self.completion.base_url = url.clone();
            self.speech.base_url = url.clone();
        }
    }

    /// Check settings and keys before serving requests
    pub fn validate(&self, keys: &ApiKeys) -> ConfigValidation {
        let mut validation = ConfigValidation::new();

        if !keys.has_completion() {
            validation.add_warning("OPENAI_API_KEY is not set; every generation request will fail.");
        }
        if !keys.has_video_search() {
            validation.add_warning("YOUTUBE_API_KEY is not set; exit tickets will have no videos.");
        }
        if self.completion.model.trim().is_empty() {
            validation.add_error("[completion] model must not be empty");
        }
        if self.speech.model.trim().is_empty() {
            validation.add_error("[speech] model must not be empty");
        }
        if self.video.channel_id.trim().is_empty() {
            validation.add_error("[video] channel_id must not be empty");
        }
        if !(1..=MAX_VIDEO_RESULTS).contains(&self.video.max_results) {
            validation.add_error(format!(
                "[video] max_results must be between 1 and {MAX_VIDEO_RESULTS}, got {}",
                self.video.max_results
            ));
        }
        if self.server.audio_capacity == 0 {
            validation.add_error("[server] audio_capacity must be positive");
        }
        for (section, secs) in [
            ("completion", self.completion.timeout_secs),
            ("speech", self.speech.timeout_secs),
            ("video", self.video.timeout_secs),
        ] {
            if secs == 0 {
                validation.add_error(format!("[{section}] timeout_secs must be positive"));
            }
        }

        validation
    }
}

/// ~/.museo, home of config.toml and .env
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".museo")
}
