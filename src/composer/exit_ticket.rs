// src/composer/exit_ticket.rs
// Exit-ticket flow: summary text, then best-effort video enrichment per exhibit

use super::FlowTrace;
use crate::error::Result;
use crate::llm::{Completer, PromptBuilder};
use crate::profile::ExitTicketRequest;
use crate::video::{VideoHit, VideoQuery, VideoSearch};
use futures::future::join_all;
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::debug;

/// Exhibits looked up for videos; the rest are ignored
pub const MAX_EXHIBITS: usize = 3;
/// Exhibits that get inline links in the ticket text
pub const INLINE_EXHIBITS: usize = 2;
pub const INLINE_VIDEOS_PER_EXHIBIT: usize = 2;
/// Standalone player slots
pub const VIDEO_SLOTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitTicketState {
    Idle,
    SummaryGenerating,
    SummaryReady,
    EnrichingVideos,
    Complete,
}

/// Inline video links for one exhibit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExhibitVideos {
    pub exhibit: String,
    pub videos: Vec<VideoHit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExitTicketBundle {
    /// Ticket text plus the recommended-videos markdown
    pub summary_text: String,
    /// Inline sections, one per enriched exhibit in visit order
    pub inline: Vec<ExhibitVideos>,
    /// One representative hit per exhibit with results, at most VIDEO_SLOTS
    pub video_hits: Vec<VideoHit>,
}

impl ExitTicketBundle {
    /// Player slots in order; trailing slots stay empty
    pub fn slots(&self) -> [Option<&str>; VIDEO_SLOTS] {
        let mut slots = [None; VIDEO_SLOTS];
        for (slot, hit) in slots.iter_mut().zip(&self.video_hits) {
            *slot = Some(hit.video_id.as_str());
        }
        slots
    }
}

pub struct ExitTicketComposer {
    prompts: PromptBuilder,
    completer: Arc<dyn Completer>,
    videos: Arc<dyn VideoSearch>,
    model: String,
    channel_id: String,
    max_results: u32,
}

impl ExitTicketComposer {
    pub fn new(
        prompts: PromptBuilder,
        completer: Arc<dyn Completer>,
        videos: Arc<dyn VideoSearch>,
        model: String,
        channel_id: String,
        max_results: u32,
    ) -> Self {
        Self {
            prompts,
            completer,
            videos,
            model,
            channel_id,
            max_results,
        }
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub async fn compose(&self, request: &ExitTicketRequest) -> Result<ExitTicketBundle> {
        let mut trace = FlowTrace::start("exit_ticket", ExitTicketState::Idle);

        let prompt = self.prompts.exit_ticket(request)?.into_request(&self.model);
        trace.advance(ExitTicketState::SummaryGenerating);
        let ticket = self.completer.complete(&prompt).await?.text;
        trace.advance(ExitTicketState::SummaryReady);

        trace.advance(ExitTicketState::EnrichingVideos);
        let lookups = request
            .exhibits
            .iter()
            .take(MAX_EXHIBITS)
            .map(|exhibit| async move {
                let query = VideoQuery::new(exhibit.as_str(), self.channel_id.as_str());
                let hits = self.videos.search(&query, self.max_results).await;
                (exhibit.clone(), hits)
            });
        // join_all yields results in input order, so exhibit order is preserved
        let results = join_all(lookups).await;

        let mut inline = Vec::new();
        let mut video_hits = Vec::new();
        for (index, (exhibit, hits)) in results.into_iter().enumerate() {
            let Some(first) = hits.first() else {
                debug!(exhibit = %exhibit, "no videos for exhibit");
                continue;
            };
            video_hits.push(first.clone());
            if index < INLINE_EXHIBITS {
                inline.push(ExhibitVideos {
                    exhibit,
                    videos: hits.into_iter().take(INLINE_VIDEOS_PER_EXHIBIT).collect(),
                });
            }
        }
        video_hits.truncate(VIDEO_SLOTS);

        let mut summary_text = ticket;
        summary_text.push_str(&render_video_section(self.prompts.venue().name.as_str(), &inline));
        trace.advance(ExitTicketState::Complete);

        Ok(ExitTicketBundle {
            summary_text,
            inline,
            video_hits,
        })
    }
}

fn render_video_section(venue: &str, inline: &[ExhibitVideos]) -> String {
    if inline.is_empty() {
        return String::new();
    }
    let mut out = format!("\n\n## Recommended Videos from {venue}\n");
    for section in inline {
        let _ = write!(out, "\n### About {}:\n", section.exhibit);
        for (n, hit) in section.videos.iter().enumerate() {
            let _ = writeln!(out, "{}. [{}]({})", n + 1, hit.title, hit.watch_url());
        }
    }
    out
}
