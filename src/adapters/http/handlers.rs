//! Route handlers.

use axum::body::Body;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Json, Response};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::error::ApiError;
use super::server::AppState;
use crate::domain::errors::GenerationError;
use crate::domain::models::{
    CallerCredential, CycleAnchors, GenerationRequest, PersonaTemplate, PersonaVariant,
    PracticeQuestion,
};
use crate::services::{notation_formatter, CalendarSnapshot, TieredOutput};

/// Request body for `/v1/format`.
#[derive(Debug, Deserialize)]
pub struct FormatRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FormatResponse {
    pub formatted: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionsResponse {
    pub questions: Vec<PracticeQuestion>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Query parameters for `/v1/countdown`.
#[derive(Debug, Default, Deserialize)]
pub struct CountdownQuery {
    pub exam: Option<String>,
    /// Overrides the server's local date.
    pub today: Option<NaiveDate>,
    pub cycle_start: Option<NaiveDate>,
    pub first_session: Option<NaiveDate>,
    pub account_created: Option<NaiveDate>,
}

/// Decode a JSON body, mapping rejections to the error envelope.
fn generation_request(
    payload: Result<Json<GenerationRequest>, JsonRejection>,
    headers: &HeaderMap,
) -> Result<GenerationRequest, ApiError> {
    let Json(mut request) = payload.map_err(|rejection| {
        ApiError::from(GenerationError::MalformedRequest(rejection.body_text()))
    })?;
    request.caller_credential = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(CallerCredential::from_authorization);
    Ok(request)
}

/// `POST /v1/generate/stream`: upstream bytes relayed as they arrive.
#[instrument(skip_all)]
pub async fn generate_stream(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = generation_request(payload, &headers)?;
    let stream = state.proxy.generate(&request).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

/// `POST /v1/generate/text`: full text from the two-tier generator.
#[instrument(skip_all)]
pub async fn generate_text(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<TieredOutput>, ApiError> {
    let request = generation_request(payload, &headers)?;
    let output = state.generator.generate_text(&request).await?;
    debug!(source = ?output.source, chars = output.content.len(), "text generated");
    Ok(Json(output))
}

/// `POST /v1/generate/questions`: decoded practice questions.
#[instrument(skip_all)]
pub async fn generate_questions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<QuestionsResponse>, ApiError> {
    let mut request = generation_request(payload, &headers)?;
    request.variant = PersonaVariant::Questions;

    let mut questions: Vec<PracticeQuestion> =
        state.proxy.complete_structured(&request).await?;
    validate_questions(&questions)?;

    if request.format_notation {
        for question in &mut questions {
            format_question(question);
        }
    }
    Ok(Json(QuestionsResponse { questions }))
}

/// Every question needs options and an in-range answer index.
fn validate_questions(questions: &[PracticeQuestion]) -> Result<(), GenerationError> {
    if questions.is_empty() {
        return Err(GenerationError::ResponseUnparseable(
            "no questions in response".to_string(),
        ));
    }
    for (index, question) in questions.iter().enumerate() {
        if question.question.trim().is_empty() || question.options.len() < 2 {
            return Err(GenerationError::ResponseUnparseable(format!(
                "question {index} is incomplete"
            )));
        }
        if question.correct_answer >= question.options.len() {
            return Err(GenerationError::ResponseUnparseable(format!(
                "question {index} answer index {} out of range",
                question.correct_answer
            )));
        }
    }
    Ok(())
}

fn format_question(question: &mut PracticeQuestion) {
    question.question = notation_formatter::format(&question.question);
    for option in &mut question.options {
        *option = notation_formatter::format(option);
    }
    question.explanation = notation_formatter::format(&question.explanation);
}

/// `POST /v1/format`
pub async fn format_text(
    payload: Result<Json<FormatRequest>, JsonRejection>,
) -> Result<Json<FormatResponse>, ApiError> {
    let Json(body) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    Ok(Json(FormatResponse {
        formatted: notation_formatter::format(&body.text),
    }))
}

/// `GET /v1/personas`
pub async fn list_personas(State(state): State<Arc<AppState>>) -> Json<Vec<PersonaTemplate>> {
    Json(state.proxy.personas().iter().cloned().collect())
}

/// `GET /v1/countdown`
pub async fn countdown(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CountdownQuery>, QueryRejection>,
) -> Result<Json<CalendarSnapshot>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    let anchors = CycleAnchors {
        cycle_start_override: query.cycle_start,
        first_session: query.first_session,
        account_created: query.account_created,
    };
    let snapshot = state
        .calendar
        .snapshot(query.exam.as_deref(), &anchors, today)?;
    Ok(Json(snapshot))
}

/// `GET /health`
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
