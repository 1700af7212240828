// src/composer/question.rs
// Knowledge companion: one question in, one answer out, no history

use super::FlowTrace;
use crate::error::Result;
use crate::llm::{Completer, PromptBuilder};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionState {
    Idle,
    Answered,
}

pub struct QuestionComposer {
    prompts: PromptBuilder,
    completer: Arc<dyn Completer>,
    model: String,
}

impl QuestionComposer {
    pub fn new(prompts: PromptBuilder, completer: Arc<dyn Completer>, model: String) -> Self {
        Self {
            prompts,
            completer,
            model,
        }
    }

    /// Every call rebuilds the prompt from just this question and age
    pub async fn answer(&self, age: u32, question: &str) -> Result<String> {
        let mut trace = FlowTrace::start("question", QuestionState::Idle);
        let request = self.prompts.question(age, question)?.into_request(&self.model);
        let result = self.completer.complete(&request).await?;
        trace.advance(QuestionState::Answered);
        Ok(result.text)
    }
}
