// src/composer/itinerary.rs
// Itinerary flow: profile -> plan text -> (optional) narrated audio

use super::FlowTrace;
use crate::config::SpeechSettings;
use crate::error::Result;
use crate::llm::{Completer, PromptBuilder};
use crate::profile::VisitorProfile;
use crate::speech::{AudioFile, SpeechRequest, Synthesizer, Voice};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ItineraryState {
    Idle,
    Generating,
    TextReady,
    SynthesizingAudio,
    AudioReady,
    Failed,
}

/// Voice and style used when reading an itinerary aloud
#[derive(Debug, Clone)]
pub struct Narration {
    pub voice: Voice,
    pub instructions: String,
}

impl Narration {
    pub fn from_settings(settings: &SpeechSettings) -> Self {
        Self {
            voice: settings.voice,
            instructions: settings.instructions.clone(),
        }
    }
}

/// Audio control update for the presentation layer
#[derive(Debug)]
pub struct AudioUpdate {
    pub visible: bool,
    pub audio: Option<AudioFile>,
}

impl AudioUpdate {
    pub fn hidden() -> Self {
        Self {
            visible: false,
            audio: None,
        }
    }

    pub fn ready(audio: AudioFile) -> Self {
        Self {
            visible: true,
            audio: Some(audio),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.audio.as_ref().map(AudioFile::path)
    }
}

/// Composite result of the narrated itinerary variant
#[derive(Debug)]
pub struct ItineraryReply {
    pub text: String,
    pub audio: AudioUpdate,
    /// States visited, in order
    pub trace: Vec<ItineraryState>,
}

impl ItineraryReply {
    pub fn state(&self) -> ItineraryState {
        self.trace
            .last()
            .copied()
            .unwrap_or(ItineraryState::Idle)
    }
}

pub struct ItineraryComposer {
    prompts: PromptBuilder,
    completer: Arc<dyn Completer>,
    synthesizer: Arc<dyn Synthesizer>,
    model: String,
    narration: Narration,
}

impl ItineraryComposer {
    pub fn new(
        prompts: PromptBuilder,
        completer: Arc<dyn Completer>,
        synthesizer: Arc<dyn Synthesizer>,
        model: String,
        narration: Narration,
    ) -> Self {
        Self {
            prompts,
            completer,
            synthesizer,
            model,
            narration,
        }
    }

    /// Plain variant: returns the itinerary text, or the completion error verbatim
    pub async fn generate(&self, profile: &VisitorProfile) -> Result<String> {
        let mut trace = FlowTrace::start("itinerary", ItineraryState::Idle);
        let agenda = self.agenda(profile, &mut trace).await?;
        Ok(compose_text(profile, &agenda))
    }

    /// Narrated variant: text first, then synthesis chained automatically.
    /// Audio failure keeps the text and hides the audio control.
    pub async fn generate_narrated(&self, profile: &VisitorProfile) -> Result<ItineraryReply> {
        let mut trace = FlowTrace::start("itinerary", ItineraryState::Idle);
        let agenda = self.agenda(profile, &mut trace).await?;
        let audio = self.synthesize(&agenda, &mut trace).await;

        Ok(ItineraryReply {
            text: compose_text(profile, &agenda),
            audio,
            trace: trace.into_history(),
        })
    }

    /// Secondary action: read back text the UI already holds
    pub async fn narrate(&self, text: &str) -> AudioUpdate {
        let mut trace = FlowTrace::start("itinerary", ItineraryState::TextReady);
        self.synthesize(text, &mut trace).await
    }

    async fn agenda(
        &self,
        profile: &VisitorProfile,
        trace: &mut FlowTrace<ItineraryState>,
    ) -> Result<String> {
        let request = self.prompts.itinerary(profile)?.into_request(&self.model);
        trace.advance(ItineraryState::Generating);

        match self.completer.complete(&request).await {
            Ok(result) => {
                trace.advance(ItineraryState::TextReady);
                Ok(result.text)
            }
            Err(e) => {
                trace.advance(ItineraryState::Failed);
                Err(e)
            }
        }
    }

    async fn synthesize(&self, text: &str, trace: &mut FlowTrace<ItineraryState>) -> AudioUpdate {
        if text.trim().is_empty() {
            return AudioUpdate::hidden();
        }
        trace.advance(ItineraryState::SynthesizingAudio);

        let request = SpeechRequest::new(text, &self.narration.instructions, self.narration.voice);
        match self.synthesizer.synthesize(&request).await {
            Ok(audio) => {
                trace.advance(ItineraryState::AudioReady);
                info!(bytes = audio.size(), "itinerary narration ready");
                AudioUpdate::ready(audio)
            }
            Err(e) => {
                trace.advance(ItineraryState::TextReady);
                warn!(error = %e, "narration failed, keeping text only");
                AudioUpdate::hidden()
            }
        }
    }
}

/// Local header listing what the visitor told us
pub fn render_visit_summary(profile: &VisitorProfile) -> String {
    let expectations = profile
        .accessibility_notes
        .as_deref()
        .unwrap_or("None");
    format!(
        "Museum Itinerary for {age}-year-old:\n\n\
         ### Kid Information\n\
         - **Age:** {age}\n\
         - **Interests:** {interests}\n\n\
         ### Visit Information\n\
         - **Arrival Time:** {arrival}\n\
         - **Duration:** {duration}\n\
         - **Language Preference:** {language}\n\
         - **Other Expectations:** {expectations}\n\n",
        age = profile.age,
        interests = profile.interests_joined(),
        arrival = profile.arrival_time,
        duration = profile.stay_duration,
        language = profile.language,
    )
}

fn compose_text(profile: &VisitorProfile, agenda: &str) -> String {
    format!("{}### Agenda\n{}", render_visit_summary(profile), agenda)
}
