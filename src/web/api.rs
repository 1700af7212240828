// src/web/api.rs
// REST handlers for the three visit flows

use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State, rejection::{JsonRejection, QueryRejection}},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::composer::AudioUpdate;
use crate::error::MuseoError;
use crate::profile::{AgeInput, ExhibitsInput, ExitTicketRequest, VisitorForm};
use crate::speech::AudioFile;
use crate::web::state::AppState;

// ═══════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════

/// Error body returned by every handler: `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError(pub MuseoError);

impl From<MuseoError> for ApiError {
    fn from(err: MuseoError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self.0, "request failed");
        }
        (status, Json(json!({ "error": self.0.to_user_string() }))).into_response()
    }
}

/// Undecodable bodies surface as validation errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(MuseoError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(MuseoError::Validation(rejection.body_text()))
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// JSON body whose rejection is reported through [`ApiError`]
type JsonBody<T> = std::result::Result<Json<T>, JsonRejection>;

// ═══════════════════════════════════════
// STATUS
// ═══════════════════════════════════════

pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "completion": state.completion_ready,
        "video_search": state.video_search_ready,
    }))
}

// ═══════════════════════════════════════
// ITINERARY
// ═══════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
pub struct ItineraryParams {
    #[serde(default)]
    pub narrate: bool,
}

/// Audio control state as the UI sees it
#[derive(Debug, Serialize)]
pub struct AudioView {
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

impl AudioView {
    fn hidden() -> Self {
        Self {
            visible: false,
            id: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItineraryResponse {
    pub text: String,
    pub audio: AudioView,
}

pub async fn itinerary(
    State(state): State<AppState>,
    params: std::result::Result<Query<ItineraryParams>, QueryRejection>,
    payload: JsonBody<VisitorForm>,
) -> ApiResult<Json<ItineraryResponse>> {
    let Query(params) = params?;
    let Json(form) = payload?;
    let profile = form.validate()?;
    let composer = &state.assistant.itinerary;

    if !params.narrate {
        let text = composer.generate(&profile).await?;
        return Ok(Json(ItineraryResponse {
            text,
            audio: AudioView::hidden(),
        }));
    }

    let reply = composer.generate_narrated(&profile).await?;
    let audio = park_audio(&state, reply.audio).await;
    info!(state = ?reply.trace.last(), audio = audio.visible, "itinerary served");
    Ok(Json(ItineraryResponse {
        text: reply.text,
        audio,
    }))
}

async fn park_audio(state: &AppState, update: AudioUpdate) -> AudioView {
    match update.audio {
        Some(file) if update.visible => AudioView {
            visible: true,
            id: Some(state.audio.insert(file).await),
        },
        _ => AudioView::hidden(),
    }
}

/// One-shot download; the temp file is removed once the bytes are read
pub async fn audio(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let Some(file) = state.audio.take(&id).await else {
        return Ok((StatusCode::NOT_FOUND, Json(json!({ "error": "audio not found" }))).into_response());
    };
    wav_response(file).await
}

// ═══════════════════════════════════════
// SPEECH (secondary action)
// ═══════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct SpeechBody {
    pub text: String,
}

pub async fn speech(
    State(state): State<AppState>,
    payload: JsonBody<SpeechBody>,
) -> ApiResult<Response> {
    let Json(body) = payload?;
    let update = state.assistant.itinerary.narrate(&body.text).await;
    match update.audio {
        Some(file) if update.visible => wav_response(file).await,
        _ => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

async fn wav_response(file: AudioFile) -> ApiResult<Response> {
    let bytes = file.read_bytes().await?;
    drop(file);
    Ok(([(header::CONTENT_TYPE, "audio/wav")], Body::from(bytes)).into_response())
}

// ═══════════════════════════════════════
// QUESTION
// ═══════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct QuestionBody {
    pub age: AgeInput,
    pub question: String,
}

pub async fn question(
    State(state): State<AppState>,
    payload: JsonBody<QuestionBody>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = payload?;
    let age = body.age.parse()?;
    let answer = state.assistant.questions.answer(age, &body.question).await?;
    Ok(Json(json!({ "answer": answer })))
}

// ═══════════════════════════════════════
// EXIT TICKET
// ═══════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct ExitTicketBody {
    pub age: AgeInput,
    pub exhibits: ExhibitsInput,
    #[serde(default)]
    pub favorite_part: String,
}

#[derive(Debug, Serialize)]
pub struct ExitTicketResponse {
    pub markup: String,
    /// Player slots, always three; unused slots are null
    pub videos: Vec<Option<String>>,
}

pub async fn exit_ticket(
    State(state): State<AppState>,
    payload: JsonBody<ExitTicketBody>,
) -> ApiResult<Json<ExitTicketResponse>> {
    let Json(body) = payload?;
    let age = body.age.parse()?;
    let request = ExitTicketRequest::new(age, body.exhibits.into_list(), body.favorite_part);
    let bundle = state.assistant.exit_tickets.compose(&request).await?;

    let videos = bundle
        .slots()
        .iter()
        .map(|slot| slot.map(str::to_string))
        .collect();
    Ok(Json(ExitTicketResponse {
        markup: bundle.summary_text,
        videos,
    }))
}
