// src/composer/mod.rs
// Response composition: one flow per use case, wired from config

mod exit_ticket;
mod itinerary;
mod question;

pub use exit_ticket::{
    ExhibitVideos, ExitTicketBundle, ExitTicketComposer, ExitTicketState, INLINE_EXHIBITS,
    INLINE_VIDEOS_PER_EXHIBIT, MAX_EXHIBITS, VIDEO_SLOTS,
};
pub use itinerary::{
    AudioUpdate, ItineraryComposer, ItineraryReply, ItineraryState, Narration,
    render_visit_summary,
};
pub use question::{QuestionComposer, QuestionState};

use crate::config::{ApiKeys, MuseoConfig};
use crate::llm::{Completer, CompletionClient, PromptBuilder};
use crate::speech::{SpeechSynthesizer, Synthesizer};
use crate::video::{VideoFinder, VideoSearch};
use std::fmt::Debug;
use std::sync::Arc;

/// Per-run state tracker; logs each transition and keeps the path taken
#[derive(Debug)]
pub(crate) struct FlowTrace<S> {
    flow: &'static str,
    history: Vec<S>,
}

impl<S: Copy + Debug + PartialEq> FlowTrace<S> {
    pub(crate) fn start(flow: &'static str, initial: S) -> Self {
        Self {
            flow,
            history: vec![initial],
        }
    }

    pub(crate) fn advance(&mut self, next: S) {
        let current = self.current();
        crate::llm::logging::log_transition(self.flow, current, next);
        self.history.push(next);
    }

    pub(crate) fn current(&self) -> S {
        // history is never empty: start() seeds it
        self.history[self.history.len() - 1]
    }

    pub(crate) fn into_history(self) -> Vec<S> {
        self.history
    }
}

/// The three flows sharing one set of service clients
pub struct Assistant {
    pub itinerary: ItineraryComposer,
    pub questions: QuestionComposer,
    pub exit_tickets: ExitTicketComposer,
}

impl Assistant {
    /// Build real HTTP clients from config and environment keys
    pub fn from_config(config: &MuseoConfig, keys: &ApiKeys) -> Self {
        let http = crate::http::create_shared_client();
        let completer: Arc<dyn Completer> = Arc::new(CompletionClient::new(
            http.clone(),
            &config.completion,
            keys.openai.clone(),
        ));
        let synthesizer: Arc<dyn Synthesizer> = Arc::new(SpeechSynthesizer::new(
            http.clone(),
            &config.speech,
            keys.openai.clone(),
        ));
        let videos: Arc<dyn VideoSearch> = Arc::new(VideoFinder::new(
            http,
            &config.video,
            keys.youtube.clone(),
        ));
        Self::with_services(config, completer, synthesizer, videos)
    }

    /// Wire the flows around arbitrary service implementations
    pub fn with_services(
        config: &MuseoConfig,
        completer: Arc<dyn Completer>,
        synthesizer: Arc<dyn Synthesizer>,
        videos: Arc<dyn VideoSearch>,
    ) -> Self {
        let prompts = PromptBuilder::new(config.venue.clone());
        let model = config.completion.model.clone();

        Self {
            itinerary: ItineraryComposer::new(
                prompts.clone(),
                completer.clone(),
                synthesizer,
                model.clone(),
                Narration::from_settings(&config.speech),
            ),
            questions: QuestionComposer::new(prompts.clone(), completer.clone(), model.clone()),
            exit_tickets: ExitTicketComposer::new(
                prompts,
                completer,
                videos,
                model,
                config.video.channel_id.clone(),
                config.video.max_results,
            ),
        }
    }
}
