// src/config/env.rs
// Environment-based configuration - single source of truth for secrets and overrides

use tracing::{debug, info, warn};

/// API keys loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// OpenAI API key (OPENAI_API_KEY), used for completion and speech
    pub openai: Option<String>,
    /// YouTube Data API key (YOUTUBE_API_KEY), used for video enrichment
    pub youtube: Option<String>,
}

impl ApiKeys {
    /// Load API keys from environment variables
    pub fn from_env() -> Self {
        let keys = Self {
            openai: Self::read_key("OPENAI_API_KEY"),
            youtube: Self::read_key("YOUTUBE_API_KEY"),
        };
        keys.log_status();
        keys
    }

    /// Read a single API key from environment, filtering empty values
    fn read_key(name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|k| !k.trim().is_empty())
    }

    /// Log which API keys are available (without exposing values)
    fn log_status(&self) {
        let summary = self.summary();
        if self.openai.is_none() {
            warn!("OPENAI_API_KEY not set - itinerary, questions and exit tickets will fail");
        }
        if self.youtube.is_none() {
            info!("YOUTUBE_API_KEY not set - exit tickets will have no video recommendations");
        }
        debug!(keys = %summary, "API keys loaded");
    }

    pub fn has_completion(&self) -> bool {
        self.openai.is_some()
    }

    pub fn has_video_search(&self) -> bool {
        self.youtube.is_some()
    }

    /// Get a summary of available services
    pub fn summary(&self) -> String {
        let mut services = Vec::new();
        if self.openai.is_some() {
            services.push("OpenAI");
        }
        if self.youtube.is_some() {
            services.push("YouTube");
        }
        if services.is_empty() {
            "None".to_string()
        } else {
            services.join(", ")
        }
    }
}

/// Non-secret overrides read from the environment (MUSEO_*)
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    /// Completion model id (MUSEO_COMPLETION_MODEL)
    pub completion_model: Option<String>,
    /// Speech voice name (MUSEO_SPEECH_VOICE)
    pub speech_voice: Option<String>,
    /// Base URL for completion and speech (MUSEO_OPENAI_BASE_URL)
    pub openai_base_url: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            completion_model: read_var("MUSEO_COMPLETION_MODEL"),
            speech_voice: read_var("MUSEO_SPEECH_VOICE"),
            openai_base_url: read_var("MUSEO_OPENAI_BASE_URL"),
        }
    }
}

fn read_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

/// Configuration validation result
#[derive(Debug)]
pub struct ConfigValidation {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl Default for ConfigValidation {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidation {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Format as a human-readable report
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        if !self.errors.is_empty() {
            lines.push("Errors:".to_string());
            for err in &self.errors {
                lines.push(format!("  - {}", err));
            }
        }

        if !self.warnings.is_empty() {
            lines.push("Warnings:".to_string());
            for warn in &self.warnings {
                lines.push(format!("  - {}", warn));
            }
        }

        if lines.is_empty() {
            "Configuration OK".to_string()
        } else {
            lines.join("\n")
        }
    }
}
