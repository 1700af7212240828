// src/llm/mod.rs
// Text generation: prompt construction and the completion client

mod completion;
pub mod logging;
mod prompt;
mod types;

pub use completion::{Completer, CompletionClient};
pub use prompt::{ITINERARY_FORMAT, PromptBuilder, PromptPair};
pub use types::{CompletionRequest, CompletionResult, Message, Role, Usage};
