use crate::api_error::ApiError;
use crate::session_view::*;
use crate::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chatbot::{GenerationClient, GradeReport, UploadedFile};
use serde_json::{json, Value};
use uuid::Uuid;

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn create_session<G: GenerationClient + 'static>(
    State(state): State<AppState<G>>,
) -> (StatusCode, Json<CreatedSession>) {
    let session_id = state.sessions.create().await;
    (StatusCode::CREATED, Json(CreatedSession { session_id }))
}

pub async fn get_session<G: GenerationClient + 'static>(
    State(state): State<AppState<G>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    state
        .sessions
        .read(id, |session| SessionView::new(id, session))
        .await
        .map(Json)
        .ok_or(ApiError::SessionNotFound(id))
}

pub async fn delete_session<G: GenerationClient + 'static>(
    State(state): State<AppState<G>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::SessionNotFound(id))
    }
}

/// Multipart fields: `file` (the upload) and `prompt` (optional text).
pub async fn summarize<G: GenerationClient + 'static>(
    State(state): State<AppState<G>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<SummarizeResponse>, ApiError> {
    if !state.sessions.contains(id).await {
        return Err(ApiError::SessionNotFound(id));
    }

    let mut file = None;
    let mut prompt = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let mime_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

                // Browsers send an empty part when nothing was chosen
                if !file_name.is_empty() || !data.is_empty() {
                    log::info!("Received upload {} ({} bytes)", file_name, data.len());
                    file = Some(UploadedFile::new(file_name, mime_type, data.to_vec()));
                }
            }
            "prompt" => {
                prompt = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            }
            other => log::debug!("Ignoring multipart field {}", other),
        }
    }

    let result = state.chat_service.summarize_and_quiz(file, &prompt).await?;

    let session = state
        .sessions
        .update(id, |session| {
            session.start_new_quiz(result.summary.clone(), result.quiz.questions.clone());
            SessionView::new(id, session)
        })
        .await
        .ok_or(ApiError::SessionNotFound(id))?;

    Ok(Json(SummarizeResponse {
        session,
        quiz_error: result.quiz.error,
        processing_time_ms: result.processing_time_ms,
    }))
}

pub async fn record_answer<G: GenerationClient + 'static>(
    State(state): State<AppState<G>>,
    Path((id, question)): Path<(Uuid, usize)>,
    Json(payload): Json<AnswerPayload>,
) -> Result<Json<SessionView>, ApiError> {
    let view = state
        .sessions
        .update(id, |session| {
            session
                .record_answer(question, payload.option)
                .map(|()| SessionView::new(id, session))
        })
        .await
        .ok_or(ApiError::SessionNotFound(id))??;

    Ok(Json(view))
}

pub async fn submit<G: GenerationClient + 'static>(
    State(state): State<AppState<G>>,
    Path(id): Path<Uuid>,
) -> Result<Json<GradeReport>, ApiError> {
    let report = state
        .sessions
        .update(id, |session| {
            session.submit()?;
            session.grade()
        })
        .await
        .ok_or(ApiError::SessionNotFound(id))??;

    log::info!("Session {} scored {}/{}", id, report.score, report.total);
    Ok(Json(report))
}
