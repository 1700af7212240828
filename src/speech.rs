// src/speech.rs
// Text-to-speech client: streams synthesized audio into a scoped temp file

use crate::config::SpeechSettings;
use crate::error::{MuseoError, Result, Service};
use crate::http::endpoint;
use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tempfile::TempPath;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::io::StreamReader;
use tracing::{debug, info, instrument, warn};

/// Read size when draining the audio stream
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Output container; the service is always asked for WAV
pub const OUTPUT_FORMAT: &str = "wav";

/// Voices offered by the speech service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Alloy,
    Ash,
    Ballad,
    #[default]
    Coral,
    Echo,
    Fable,
    Nova,
    Onyx,
    Sage,
    Shimmer,
}

impl Voice {
    pub const ALL: [Voice; 10] = [
        Voice::Alloy,
        Voice::Ash,
        Voice::Ballad,
        Voice::Coral,
        Voice::Echo,
        Voice::Fable,
        Voice::Nova,
        Voice::Onyx,
        Voice::Sage,
        Voice::Shimmer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Ash => "ash",
            Voice::Ballad => "ballad",
            Voice::Coral => "coral",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Nova => "nova",
            Voice::Onyx => "onyx",
            Voice::Sage => "sage",
            Voice::Shimmer => "shimmer",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Voice {
    type Err = MuseoError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Voice::ALL
            .into_iter()
            .find(|v| v.as_str() == wanted)
            .ok_or_else(|| MuseoError::Validation(format!("unknown voice '{s}'")))
    }
}

/// One synthesis call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: Voice,
    pub style_instructions: String,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>, style_instructions: impl Into<String>, voice: Voice) -> Self {
        Self {
            text: text.into(),
            voice,
            style_instructions: style_instructions.into(),
        }
    }

    pub fn output_format(&self) -> &'static str {
        OUTPUT_FORMAT
    }
}

#[derive(Debug, Serialize)]
struct SpeechBody<'a> {
    model: &'a str,
    input: &'a str,
    voice: Voice,
    instructions: &'a str,
    response_format: &'static str,
}

/// A finished audio file on disk.
///
/// The file lives in the system temp dir and is deleted when this handle is
/// dropped. Call [`AudioFile::persist`] to move it somewhere permanent first.
#[derive(Debug)]
pub struct AudioFile {
    path: TempPath,
    size: u64,
}

impl AudioFile {
    /// Write already-buffered audio to a fresh temp file
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut named = scratch_file()?;
        std::io::Write::write_all(&mut named, bytes)?;
        Ok(Self {
            path: named.into_temp_path(),
            size: bytes.len() as u64,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes written from the stream
    pub fn size(&self) -> u64 {
        self.size
    }

    pub async fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }

    /// Move the audio to `dest`; the caller owns its lifetime from then on
    pub fn persist(self, dest: impl AsRef<Path>) -> Result<PathBuf> {
        let dest = dest.as_ref().to_path_buf();
        match self.path.persist(&dest) {
            Ok(()) => Ok(dest),
            Err(e) if e.error.kind() == std::io::ErrorKind::CrossesDevices => {
                // rename(2) cannot cross filesystems; copy, then let the temp file drop
                std::fs::copy(&e.path, &dest)?;
                Ok(dest)
            }
            Err(e) => Err(MuseoError::Io(e.error)),
        }
    }
}

fn scratch_file() -> std::io::Result<tempfile::NamedTempFile> {
    tempfile::Builder::new()
        .prefix("museo-speech-")
        .suffix(&format!(".{OUTPUT_FORMAT}"))
        .tempfile()
}

/// Anything that can turn text into an audio file
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<AudioFile>;
}

/// Client for POST {base_url}/audio/speech
pub struct SpeechSynthesizer {
    http: Client,
    url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl SpeechSynthesizer {
    pub fn new(http: Client, settings: &SpeechSettings, api_key: Option<String>) -> Self {
        Self {
            http,
            url: endpoint(&settings.base_url, "audio/speech"),
            model: settings.model.clone(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout: settings.timeout(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Synchronous entry point.
    ///
    /// Spins up a private current-thread runtime, drives the synthesis to
    /// completion and tears the runtime down before returning. Must not be
    /// called from inside an async task; use `spawn_blocking` there.
    pub fn synthesize_blocking(&self, request: &SpeechRequest) -> Result<AudioFile> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let result = runtime.block_on(self.synthesize(request));
        drop(runtime);
        result
    }

    async fn stream_to_file(response: reqwest::Response) -> Result<AudioFile> {
        let (file, path) = scratch_file()?.into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let reader = StreamReader::new(stream);
        tokio::pin!(reader);
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut size = 0u64;

        loop {
            let n = reader
                .read(&mut buf)
                .await
                .map_err(|e| MuseoError::remote(Service::Speech, None, e.to_string()))?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n]).await?;
            size += n as u64;
        }
        file.flush().await?;
        file.sync_all().await?;

        Ok(AudioFile { path, size })
    }
}

#[async_trait]
impl Synthesizer for SpeechSynthesizer {
    #[instrument(skip(self, request), fields(request_id, voice = %request.voice, text_len = request.text.len()))]
    async fn synthesize(&self, request: &SpeechRequest) -> Result<AudioFile> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            MuseoError::Configuration("OPENAI_API_KEY is not set".to_string())
        })?;

        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let body = SpeechBody {
            model: &self.model,
            input: &request.text,
            voice: request.voice,
            instructions: &request.style_instructions,
            response_format: request.output_format(),
        };

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| MuseoError::remote(Service::Speech, None, e.to_string()))?;

        // Reject before any file exists, so a failed call never leaves audio behind
        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(request_id = %request_id, status = %status, "speech request rejected");
            return Err(MuseoError::remote(
                Service::Speech,
                Some(status.as_u16()),
                error_body,
            ));
        }

        debug!(request_id = %request_id, "streaming speech body");
        let audio = Self::stream_to_file(response).await?;

        info!(
            request_id = %request_id,
            bytes = audio.size(),
            path = %audio.path().display(),
            "speech synthesized"
        );
        Ok(audio)
    }
}
