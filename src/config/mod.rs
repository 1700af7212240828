// src/config/mod.rs
// Configuration: environment secrets plus ~/.museo/config.toml

pub mod env;
pub mod file;

pub use env::{ApiKeys, ConfigValidation, EnvOverrides};
pub use file::{
    CompletionSettings, MuseoConfig, ServerSettings, SpeechSettings, Venue, VideoSettings,
    config_dir,
};
