// src/profile.rs
// Visitor inputs: validated profiles built from raw form fields

use crate::error::{MuseoError, Result};
use serde::Deserialize;

pub const DEFAULT_LANGUAGE: &str = "English";
pub const DEFAULT_ARRIVAL_TIME: &str = "12:00";

/// A visiting child's profile, built fresh for every submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorProfile {
    pub age: u32,
    pub interests: Vec<String>,
    pub learning_goals: String,
    pub arrival_time: String,
    pub stay_duration: String,
    pub language: String,
    pub accessibility_notes: Option<String>,
}

impl VisitorProfile {
    /// Profile with the required fields; everything else takes form defaults
    pub fn new(age: u32, interests: Vec<String>, stay_duration: impl Into<String>) -> Self {
        Self {
            age,
            interests,
            learning_goals: String::new(),
            arrival_time: DEFAULT_ARRIVAL_TIME.to_string(),
            stay_duration: stay_duration.into(),
            language: DEFAULT_LANGUAGE.to_string(),
            accessibility_notes: None,
        }
    }

    pub fn with_learning_goals(mut self, goals: impl Into<String>) -> Self {
        self.learning_goals = goals.into();
        self
    }

    pub fn with_arrival_time(mut self, arrival: impl Into<String>) -> Self {
        self.arrival_time = arrival.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_accessibility_notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        self.accessibility_notes = (!notes.trim().is_empty()).then_some(notes);
        self
    }

    pub fn interests_joined(&self) -> String {
        self.interests.join(", ")
    }
}

/// Age as submitted: the form may send a number or free text
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AgeInput {
    Number(i64),
    Text(String),
}

impl AgeInput {
    pub fn parse(&self) -> Result<u32> {
        match self {
            AgeInput::Number(n) => positive_age(*n),
            AgeInput::Text(s) => parse_age(s),
        }
    }
}

/// Exhibits as submitted: a checkbox list or a comma-separated string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExhibitsInput {
    List(Vec<String>),
    Text(String),
}

impl ExhibitsInput {
    pub fn into_list(self) -> Vec<String> {
        match self {
            ExhibitsInput::List(items) => clean_list(items),
            ExhibitsInput::Text(s) => parse_exhibits(&s),
        }
    }
}

/// Raw itinerary form, as posted by the UI
#[derive(Debug, Clone, Deserialize)]
pub struct VisitorForm {
    pub age: AgeInput,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub learning_goals: Option<String>,
    #[serde(default)]
    pub arrival_time: Option<String>,
    pub stay_duration: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub accessibility_notes: Option<String>,
}

impl VisitorForm {
    /// Validate raw fields into a profile. Nothing here touches the network.
    pub fn validate(self) -> Result<VisitorProfile> {
        let age = self.age.parse()?;

        let interests = clean_list(self.interests);
        if interests.is_empty() {
            return Err(MuseoError::Validation(
                "select at least one interest".to_string(),
            ));
        }

        let stay_duration = self.stay_duration.trim().to_string();
        if stay_duration.is_empty() {
            return Err(MuseoError::Validation(
                "stay duration is required".to_string(),
            ));
        }

        let mut profile = VisitorProfile::new(age, interests, stay_duration);
        if let Some(goals) = self.learning_goals {
            profile = profile.with_learning_goals(goals.trim());
        }
        if let Some(arrival) = non_blank(self.arrival_time) {
            profile = profile.with_arrival_time(arrival);
        }
        if let Some(language) = non_blank(self.language) {
            profile = profile.with_language(language);
        }
        if let Some(notes) = self.accessibility_notes {
            profile = profile.with_accessibility_notes(notes.trim());
        }
        Ok(profile)
    }
}

/// Inputs for the exit-ticket flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitTicketRequest {
    pub age: u32,
    pub exhibits: Vec<String>,
    pub favorite_part: String,
}

impl ExitTicketRequest {
    pub fn new(age: u32, exhibits: Vec<String>, favorite_part: impl Into<String>) -> Self {
        Self {
            age,
            exhibits: clean_list(exhibits),
            favorite_part: favorite_part.into(),
        }
    }

    pub fn exhibits_joined(&self) -> String {
        self.exhibits.join(", ")
    }
}

/// Parse a non-numeric or non-positive age into a validation error
pub fn parse_age(raw: &str) -> Result<u32> {
    let trimmed = raw.trim();
    let n: i64 = trimmed
        .parse()
        .map_err(|_| MuseoError::Validation(format!("age must be a whole number, got '{trimmed}'")))?;
    positive_age(n)
}

fn positive_age(n: i64) -> Result<u32> {
    if n <= 0 {
        return Err(MuseoError::Validation(format!("age must be positive, got {n}")));
    }
    u32::try_from(n).map_err(|_| MuseoError::Validation(format!("age out of range: {n}")))
}

/// Split a comma-separated exhibit list, trimming entries and dropping blanks
pub fn parse_exhibits(raw: &str) -> Vec<String> {
    clean_list(raw.split(',').map(str::to_string).collect())
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
