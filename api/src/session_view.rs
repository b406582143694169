use chatbot::{GradeReport, QuizQuestion, QuizSession, Summary};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize)]
pub struct CreatedSession {
    pub session_id: Uuid,
}

#[derive(Deserialize)]
pub struct AnswerPayload {
    pub option: usize,
}

/// A question as shown before grading; the correct answer stays server-side.
#[derive(Serialize)]
pub struct QuestionView {
    pub question: String,
    pub options: Vec<String>,
}

impl From<&QuizQuestion> for QuestionView {
    fn from(q: &QuizQuestion) -> Self {
        Self {
            question: q.question.clone(),
            options: q.options.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub summary: Option<Summary>,
    pub quiz: Vec<QuestionView>,
    pub answers: Vec<Option<usize>>,
    pub submitted: bool,
    pub grade: Option<GradeReport>,
}

impl SessionView {
    pub fn new(session_id: Uuid, session: &QuizSession) -> Self {
        Self {
            session_id,
            summary: session.summary().cloned(),
            quiz: session
                .quiz()
                .unwrap_or_default()
                .iter()
                .map(QuestionView::from)
                .collect(),
            answers: session.answers().to_vec(),
            submitted: session.is_submitted(),
            grade: session.grade().ok(),
        }
    }
}

#[derive(Serialize)]
pub struct SummarizeResponse {
    #[serde(flatten)]
    pub session: SessionView,
    pub quiz_error: Option<String>,
    pub processing_time_ms: u128,
}
