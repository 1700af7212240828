// src/web/state.rs
// Web server state management

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::composer::Assistant;
use crate::config::ServerSettings;
use crate::speech::AudioFile;

struct Parked {
    audio: AudioFile,
    parked_at: Instant,
}

/// Narrated audio waiting for its one download.
///
/// Entries expire after `ttl` and the store never holds more than
/// `capacity` files; evicted handles drop, which deletes their files.
#[derive(Clone)]
pub struct AudioStore {
    files: Arc<Mutex<HashMap<Uuid, Parked>>>,
    ttl: Duration,
    capacity: usize,
}

impl Default for AudioStore {
    fn default() -> Self {
        Self::from_settings(&ServerSettings::default())
    }
}

impl AudioStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn from_settings(settings: &ServerSettings) -> Self {
        Self::new(settings.audio_ttl(), settings.audio_capacity)
    }

    /// Park a file and hand back the id the client fetches it by
    pub async fn insert(&self, audio: AudioFile) -> Uuid {
        let now = Instant::now();
        let mut files = self.files.lock().await;

        let before = files.len();
        files.retain(|_, parked| now.duration_since(parked.parked_at) < self.ttl);

        while files.len() >= self.capacity {
            let oldest = files
                .iter()
                .min_by_key(|(_, parked)| parked.parked_at)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    files.remove(&id);
                }
                None => break,
            }
        }
        let evicted = before - files.len();
        if evicted > 0 {
            debug!(evicted, "dropped unclaimed narration audio");
        }

        let id = Uuid::new_v4();
        files.insert(
            id,
            Parked {
                audio,
                parked_at: now,
            },
        );
        id
    }

    /// Remove the file from the store; it is deleted when the handle drops.
    /// Expired entries are treated as gone.
    pub async fn take(&self, id: &Uuid) -> Option<AudioFile> {
        let parked = self.files.lock().await.remove(id)?;
        (parked.parked_at.elapsed() < self.ttl).then_some(parked.audio)
    }

    pub async fn len(&self) -> usize {
        self.files.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.lock().await.is_empty()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
    pub audio: AudioStore,
    /// Whether completion credentials were present at startup
    pub completion_ready: bool,
    pub video_search_ready: bool,
}

impl AppState {
    pub fn new(assistant: Arc<Assistant>, completion_ready: bool, video_search_ready: bool) -> Self {
        Self {
            assistant,
            audio: AudioStore::default(),
            completion_ready,
            video_search_ready,
        }
    }

    pub fn with_audio_store(mut self, audio: AudioStore) -> Self {
        self.audio = audio;
        self
    }
}
