// src/video.rs
// Channel-scoped video search; failures degrade to "no results"

use crate::config::VideoSettings;
use crate::error::{MuseoError, Result, Service};
use crate::http::endpoint;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// One search result, in the service's relevance order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoHit {
    pub title: String,
    pub video_id: String,
}

impl VideoHit {
    pub fn new(title: impl Into<String>, video_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            video_id: video_id.into(),
        }
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

/// Keyword search restricted to a single channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoQuery {
    pub keyword: String,
    pub channel_id: String,
}

impl VideoQuery {
    pub fn new(keyword: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            channel_id: channel_id.into(),
        }
    }
}

/// Best-effort video lookup. Implementations never fail: errors become an empty list.
#[async_trait]
pub trait VideoSearch: Send + Sync {
    async fn search(&self, query: &VideoQuery, max_results: u32) -> Vec<VideoHit>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    id: ItemId,
    #[serde(default)]
    snippet: Option<Snippet>,
}

#[derive(Debug, Default, Deserialize)]
struct ItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
}

/// Client for GET {base_url}/search
pub struct VideoFinder {
    http: Client,
    url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl VideoFinder {
    pub fn new(http: Client, settings: &VideoSettings, api_key: Option<String>) -> Self {
        Self {
            http,
            url: endpoint(&settings.base_url, "search"),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout: settings.timeout(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The fallible lookup behind [`VideoSearch::search`]
    pub async fn try_search(&self, query: &VideoQuery, max_results: u32) -> Result<Vec<VideoHit>> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            MuseoError::Configuration("YOUTUBE_API_KEY is not set".to_string())
        })?;

        let max = max_results.to_string();
        let response = self
            .http
            .get(&self.url)
            .timeout(self.timeout)
            .query(&[
                ("key", api_key),
                ("channelId", query.channel_id.as_str()),
                ("part", "snippet"),
                ("q", query.keyword.as_str()),
                ("maxResults", max.as_str()),
                ("order", "relevance"),
                ("type", "video"),
            ])
            .send()
            .await
            .map_err(|e| MuseoError::remote(Service::VideoSearch, None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MuseoError::remote(
                Service::VideoSearch,
                Some(status.as_u16()),
                body,
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MuseoError::remote(Service::VideoSearch, Some(status.as_u16()), e.to_string()))?;
        Self::parse_hits(&body, max_results)
    }

    fn parse_hits(body: &str, max_results: u32) -> Result<Vec<VideoHit>> {
        let parsed: SearchResponse = serde_json::from_str(body).map_err(|e| {
            MuseoError::remote(Service::VideoSearch, None, format!("unparseable response: {e}"))
        })?;
        Ok(parsed
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                let title = item.snippet.map(|s| s.title).unwrap_or_default();
                Some(VideoHit { title, video_id })
            })
            .take(max_results as usize)
            .collect())
    }
}

#[async_trait]
impl VideoSearch for VideoFinder {
    async fn search(&self, query: &VideoQuery, max_results: u32) -> Vec<VideoHit> {
        match self.try_search(query, max_results).await {
            Ok(hits) => {
                debug!(keyword = %query.keyword, hits = hits.len(), "video search complete");
                hits
            }
            Err(e) => {
                warn!(keyword = %query.keyword, error = %e, "video search failed, continuing without videos");
                Vec::new()
            }
        }
    }
}
