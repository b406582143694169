//! Test doubles for the generation service.

use crate::gemini_service::GenerationClient;
use crate::models::ContentPart;
use anyhow::Result;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays canned replies in order and records every request.
/// Once the script runs out every call fails.
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    calls: Mutex<Vec<Vec<ContentPart>>>,
}

impl ScriptedClient {
    pub fn replying(replies: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<ContentPart>> {
        self.calls.lock().unwrap().clone()
    }
}

impl GenerationClient for ScriptedClient {
    async fn generate(&self, parts: &[ContentPart]) -> Result<String> {
        self.calls.lock().unwrap().push(parts.to_vec());
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Err(anyhow::anyhow!("no scripted reply left")),
        }
    }
}

/// A well-formed quiz reply with `count` questions. Question `i` has
/// `i % 4` as its correct answer.
pub fn sample_quiz_json(count: usize) -> String {
    let questions: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            serde_json::json!({
                "question": format!("Question {} about Paris?", i + 1),
                "options": ["Paris", "Rome", "Berlin", "Madrid"],
                "correct_answer": i % 4,
            })
        })
        .collect();
    serde_json::Value::Array(questions).to_string()
}
