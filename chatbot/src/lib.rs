pub mod chat_service;
pub mod config;
pub mod document_extractor;
pub mod error;
pub mod gemini_service;
pub mod literal;
pub mod models;
pub mod quiz_generator;
pub mod quiz_session;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use chat_service::{ChatService, SummaryAndQuiz};
pub use config::ServiceConfig;
pub use document_extractor::DocumentExtractor;
pub use error::ChatbotError;
pub use gemini_service::{GeminiService, GenerationClient};
pub use models::*;
pub use quiz_generator::{QuizGenerator, QuizOutcome};
pub use quiz_session::{GradeReport, QuestionResult, QuizSession};
