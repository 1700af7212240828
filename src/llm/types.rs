// src/llm/types.rs
// Wire types for the chat completion service

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A role-tagged chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// One remote completion call: system block, user block, model id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    system_instruction: String,
    user_instruction: String,
    model: String,
}

impl CompletionRequest {
    pub fn new(
        system_instruction: impl Into<String>,
        user_instruction: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            user_instruction: user_instruction.into(),
            model: model.into(),
        }
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn user_instruction(&self) -> &str {
        &self.user_instruction
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The two-message structure sent on the wire
    pub fn messages(&self) -> Vec<Message> {
        vec![
            Message::system(&self.system_instruction),
            Message::user(&self.user_instruction),
        ]
    }
}

/// Successful completion: the first choice's text, untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    pub text: String,
}

/// Request body for POST /chat/completions
#[derive(Debug, Serialize)]
pub(crate) struct ChatBody<'a> {
    pub model: &'a str,
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}
