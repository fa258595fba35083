use super::LLMClient;
use crate::domain::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Deterministic client for tests: replays scripted replies in order and
/// records every prompt it receives. Runs dry with an `LLMError`.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always_failing(count: usize) -> Self {
        Self::new(
            (0..count)
                .map(|_| Err(AppError::LLMError("quota exceeded".to_string())))
                .collect(),
        )
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMClient for ScriptedClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::LLMError("no scripted reply".to_string())))
    }
}
