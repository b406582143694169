use crate::document_extractor::DocumentExtractor;
use crate::error::{ChatbotError, Result};
use crate::gemini_service::GenerationClient;
use crate::models::*;
use crate::quiz_generator::{QuizGenerator, QuizOutcome};
use serde::Serialize;
use std::sync::Arc;

pub const SUMMARY_INSTRUCTIONS: &str = r#"You are an expert at reading documents and images.
You will receive an uploaded file: either a photo or scan, or the text extracted from a PDF.
Summarize its content clearly and accurately in a few paragraphs, keeping the key facts, names, figures and dates.
If the user adds a question or request after the file, answer it using only the file's content."#;

pub const QUIZ_SKIPPED: &str = "No quiz was generated because the summary could not be produced.";

#[derive(Debug, Clone, Serialize)]
pub struct SummaryAndQuiz {
    pub summary: Summary,
    pub quiz: QuizOutcome,
    pub processing_time_ms: u128,
}

/// Runs extract → summarize → quiz for one user action.
pub struct ChatService<G> {
    client: Arc<G>,
    quiz_generator: QuizGenerator<G>,
}

impl<G: GenerationClient> ChatService<G> {
    pub fn new(client: Arc<G>) -> Self {
        Self {
            quiz_generator: QuizGenerator::new(client.clone()),
            client,
        }
    }

    /// Extraction runs on the blocking pool; PDF parsing is CPU-bound.
    pub async fn extract(&self, file: Option<UploadedFile>) -> Result<ContentPayload> {
        tokio::task::spawn_blocking(move || DocumentExtractor::new().extract(file.as_ref()))
            .await
            .map_err(|e| ChatbotError::PdfExtraction(e.to_string()))?
    }

    /// Service failures are folded into `Summary::Failed`.
    pub async fn summarize(&self, payload: ContentPayload, prompt: &str) -> Summary {
        let mut parts = vec![ContentPart::from(SUMMARY_INSTRUCTIONS), ContentPart::from(payload)];
        if !prompt.trim().is_empty() {
            parts.push(ContentPart::Text(prompt.trim().to_string()));
        }

        match self.client.generate(&parts).await {
            Ok(text) => Summary::Generated(text),
            Err(e) => {
                log::warn!("Summarization failed: {}", e);
                Summary::Failed(format!("Error occurred: {}", e))
            }
        }
    }

    /// Upload problems are returned as errors before any generation call;
    /// everything after that is reported inside the result.
    pub async fn summarize_and_quiz(&self, file: Option<UploadedFile>, prompt: &str) -> Result<SummaryAndQuiz> {
        let start_time = std::time::Instant::now();

        let payload = self.extract(file).await?;
        let summary = self.summarize(payload, prompt).await;

        let quiz = match &summary {
            Summary::Generated(text) => self.quiz_generator.generate_quiz(text).await,
            Summary::Failed(_) => QuizOutcome {
                questions: Vec::new(),
                error: Some(QUIZ_SKIPPED.to_string()),
            },
        };

        let processing_time = start_time.elapsed().as_millis();
        log::info!(
            "Summarize-and-quiz finished in {} ms ({} questions)",
            processing_time,
            quiz.questions.len()
        );

        Ok(SummaryAndQuiz {
            summary,
            quiz,
            processing_time_ms: processing_time,
        })
    }
}
