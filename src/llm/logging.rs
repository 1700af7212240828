// src/llm/logging.rs
// Shared logging helpers for remote calls and composer flows

use super::types::Usage;
use tracing::{debug, info};

/// Log usage statistics for a completion call.
pub fn log_usage(request_id: &str, usage: &Usage) {
    info!(
        request_id = %request_id,
        prompt_tokens = usage.prompt_tokens,
        completion_tokens = usage.completion_tokens,
        total_tokens = usage.total_tokens,
        "completion usage stats"
    );
}

/// Log completion summary for a remote call.
pub fn log_completion(request_id: &str, model: &str, duration_ms: u64, content_len: usize) {
    info!(
        request_id = %request_id,
        model = %model,
        duration_ms = duration_ms,
        content_len = content_len,
        "completion finished"
    );
}

/// Log a composer state change.
pub fn log_transition(flow: &str, from: impl std::fmt::Debug, to: impl std::fmt::Debug) {
    debug!(flow = flow, from = ?from, to = ?to, "state transition");
}
