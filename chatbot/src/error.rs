//! Error types for the chatbot pipeline
//!
//! Every variant is recoverable: callers report it and leave the session in a
//! safe state.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatbotError {
    /// An action needed an upload and none was given
    #[error("No file uploaded")]
    NoFileProvided,

    /// Extension outside jpg, jpeg, png, pdf
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// The PDF could not be opened or read
    #[error("PDF extraction failed: {0}")]
    PdfExtraction(String),

    /// Transport, authentication or service-side failure
    #[error("Generation service error: {0}")]
    Generation(String),

    /// Model reply held no recognizable structured data
    #[error("Could not parse quiz from model reply: {0}")]
    QuizParse(String),

    /// Parsed quiz did not have the required shape
    #[error("Invalid quiz: {0}")]
    QuizValidation(String),

    #[error("No quiz is in progress")]
    NoActiveQuiz,

    #[error("Invalid answer: {0}")]
    InvalidAnswer(String),

    #[error("Quiz has not been submitted")]
    NotSubmitted,
}

pub type Result<T> = std::result::Result<T, ChatbotError>;
