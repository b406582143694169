use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chatbot::{ChatbotError, ErrorResponse};
use uuid::Uuid;

#[derive(Debug)]
pub enum ApiError {
    SessionNotFound(Uuid),
    BadRequest(String),
    Chatbot(ChatbotError),
}

impl From<ChatbotError> for ApiError {
    fn from(err: ChatbotError) -> Self {
        ApiError::Chatbot(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Chatbot(err) => match err {
                ChatbotError::NoFileProvided => StatusCode::BAD_REQUEST,
                ChatbotError::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ChatbotError::PdfExtraction(_) | ChatbotError::InvalidAnswer(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ChatbotError::NoActiveQuiz | ChatbotError::NotSubmitted => StatusCode::CONFLICT,
                ChatbotError::Generation(_)
                | ChatbotError::QuizParse(_)
                | ChatbotError::QuizValidation(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::SessionNotFound(id) => format!("Session not found: {}", id),
            ApiError::BadRequest(msg) => format!("Bad request: {}", msg),
            ApiError::Chatbot(err) => err.to_string(),
        };

        log::warn!("Request failed ({}): {}", status, message);

        let body = Json(ErrorResponse {
            status: "error".to_string(),
            error: message,
        });

        (status, body).into_response()
    }
}
