// tests/common/mod.rs
// Shared test fixtures: a raw-socket HTTP stub and in-memory service stubs

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use museo::error::{MuseoError, Result, Service};
use museo::llm::{Completer, CompletionRequest, CompletionResult};
use museo::speech::{AudioFile, SpeechRequest, Synthesizer};
use museo::video::{VideoHit, VideoQuery, VideoSearch};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

// ============================================================================
// HTTP stub
// ============================================================================

/// One canned reply
#[derive(Debug, Clone)]
pub struct Canned {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    /// Advertised Content-Length when it should differ from the body
    pub declared_len: Option<usize>,
}

impl Canned {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string().into_bytes(),
            declared_len: None,
        }
    }

    pub fn bytes(status: u16, content_type: &'static str, body: &[u8]) -> Self {
        Self {
            status,
            content_type,
            body: body.to_vec(),
            declared_len: None,
        }
    }

    /// Promises `declared_len` bytes but closes after `body`
    pub fn truncated(status: u16, content_type: &'static str, body: &[u8], declared_len: usize) -> Self {
        Self {
            declared_len: Some(declared_len),
            ..Self::bytes(status, content_type, body)
        }
    }
}

/// A request as seen on the wire
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Decoded query parameter from the request target
    pub fn query(&self, name: &str) -> Option<String> {
        let url = reqwest::Url::parse(&format!("http://stub{}", self.target)).unwrap();
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

/// Serves canned replies in order (the last one repeats) and records requests
pub struct MockServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn start(replies: Vec<Canned>) -> Self {
        assert!(!replies.is_empty());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        let handle = tokio::spawn(async move {
            let mut served = 0usize;
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let Some(request) = read_request(&mut stream).await else {
                    continue;
                };
                recorded.lock().unwrap().push(request);

                let reply = &replies[served.min(replies.len() - 1)];
                served += 1;
                write_reply(&mut stream, reply).await;
            }
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            requests,
            handle,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<Recorded> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(Recorded {
        method,
        target,
        headers,
        body,
    })
}

async fn write_reply(stream: &mut TcpStream, reply: &Canned) {
    let head = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        reply.status,
        reply.content_type,
        reply.declared_len.unwrap_or(reply.body.len())
    );
    let _ = stream.write_all(head.as_bytes()).await;
    let _ = stream.write_all(&reply.body).await;
    let _ = stream.shutdown().await;
}

/// Completion API reply with a single choice
pub fn chat_reply(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 3, "total_tokens": 13}
    })
}

/// Video search reply listing (title, id) pairs in order
pub fn search_reply(items: &[(&str, &str)]) -> serde_json::Value {
    let items: Vec<_> = items
        .iter()
        .map(|(title, id)| {
            serde_json::json!({
                "kind": "youtube#searchResult",
                "id": {"kind": "youtube#video", "videoId": id},
                "snippet": {"title": title, "channelTitle": "The Franklin Institute"}
            })
        })
        .collect();
    serde_json::json!({ "kind": "youtube#searchListResponse", "items": items })
}

// ============================================================================
// Service stubs
// ============================================================================

/// Returns a fixed text (or error) and records every request
pub struct StubCompleter {
    reply: std::result::Result<String, String>,
    pub seen: Mutex<Vec<CompletionRequest>>,
}

impl StubCompleter {
    pub fn ok(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl Completer for StubCompleter {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult> {
        self.seen.lock().unwrap().push(request.clone());
        match &self.reply {
            Ok(text) => Ok(CompletionResult { text: text.clone() }),
            Err(msg) => Err(MuseoError::remote(Service::Completion, Some(500), msg.clone())),
        }
    }
}

/// Writes fixed bytes to a temp file, or fails
pub struct StubSynthesizer {
    fail: bool,
    pub texts: Mutex<Vec<String>>,
}

impl StubSynthesizer {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            texts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            texts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Synthesizer for StubSynthesizer {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<AudioFile> {
        self.texts.lock().unwrap().push(request.text.clone());
        if self.fail {
            return Err(MuseoError::remote(Service::Speech, Some(500), "boom"));
        }
        AudioFile::from_bytes(b"RIFF\x24\x00\x00\x00WAVEfmt ")
    }
}

/// Returns `per_query` hits named after the keyword; counts calls
pub struct StubVideos {
    per_query: usize,
    empty_for: Vec<String>,
    pub queries: Mutex<Vec<VideoQuery>>,
    calls: AtomicUsize,
}

impl StubVideos {
    pub fn new(per_query: usize) -> Arc<Self> {
        Self::with_empty(per_query, &[])
    }

    /// Same as `new`, but the listed keywords have no results
    pub fn with_empty(per_query: usize, empty_for: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            per_query,
            empty_for: empty_for.iter().map(|s| s.to_string()).collect(),
            queries: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn keywords(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|q| q.keyword.clone())
            .collect()
    }
}

#[async_trait]
impl VideoSearch for StubVideos {
    async fn search(&self, query: &VideoQuery, max_results: u32) -> Vec<VideoHit> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());
        if self.empty_for.contains(&query.keyword) {
            return Vec::new();
        }
        (1..=self.per_query.min(max_results as usize))
            .map(|n| VideoHit::new(format!("{} #{n}", query.keyword), format!("{}{n}", query.keyword)))
            .collect()
    }
}
