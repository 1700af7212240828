// src/lib.rs
// Museo - museum visit assistant: itineraries, kid Q&A, and exit tickets

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod composer;
pub mod config;
pub mod error;
pub mod http;
pub mod llm;
pub mod profile;
pub mod speech;
pub mod video;
pub mod web;

pub use composer::Assistant;
pub use error::{MuseoError, Result};
