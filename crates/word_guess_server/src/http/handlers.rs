//! Request handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, instrument};
use word_guess::{GuessOutcome, LetterFeedback};

use crate::http::AppState;
use crate::http::error::ApiError;
use crate::identity::Principal;
use crate::session::GameId;

/// Runs a blocking storage call off the async executor.
pub(crate) async fn blocking<T, E, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await?.map_err(Into::into)
}

/// Credentials for register and login.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Guess submission.
#[derive(Debug, Deserialize)]
pub struct GuessRequest {
    game_id: Option<GameId>,
    #[serde(default)]
    word: String,
}

/// New vocabulary entry.
#[derive(Debug, Deserialize)]
pub struct AddWordRequest {
    #[serde(default)]
    word: String,
}

/// `?date=YYYY-MM-DD`, defaulting to today (UTC).
#[derive(Debug, Deserialize)]
pub struct DailyReportQuery {
    date: Option<String>,
}

/// `?username=...`.
#[derive(Debug, Deserialize)]
pub struct UserReportQuery {
    #[serde(default)]
    username: String,
}

/// Response to an accepted guess.
#[derive(Debug, Serialize)]
pub struct GuessResponse {
    guess: String,
    feedback: Vec<LetterFeedback>,
    won: bool,
    completed: bool,
    guesses_remaining: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_word: Option<String>,
}

impl From<GuessOutcome> for GuessResponse {
    fn from(outcome: GuessOutcome) -> Self {
        Self {
            guess: outcome.word().to_string(),
            feedback: outcome.feedback().clone(),
            won: *outcome.won(),
            completed: *outcome.completed(),
            guesses_remaining: *outcome.guesses_remaining(),
            target_word: outcome.revealed_target().as_ref().map(|w| w.to_string()),
        }
    }
}

/// Trims and uppercases user-typed words before strict validation.
fn normalize_word(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub(crate) async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "Word Guess Game API is running"
    }))
}

pub(crate) async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Endpoint not found")
}

#[instrument(skip_all)]
pub(crate) async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = payload?;
    let username = req.username.trim().to_string();
    let auth = state.auth.clone();
    let principal = blocking(move || auth.register(&username, &req.password)).await?;

    info!(username = %principal.username(), "User registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "username": principal.username(),
            "is_admin": principal.is_admin(),
        })),
    ))
}

#[instrument(skip_all)]
pub(crate) async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload?;
    let username = req.username.trim().to_string();
    let auth = state.auth.clone();
    let issued = blocking(move || auth.login(&username, &req.password)).await?;

    Ok(Json(json!({
        "token": issued.token(),
        "username": issued.principal().username(),
        "is_admin": issued.principal().is_admin(),
        "expires_at": issued.expires_at(),
    })))
}

#[instrument(skip_all, fields(username = %principal.username()))]
pub(crate) async fn start_game(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let sessions = state.sessions.clone();
    let started = blocking(move || sessions.start_session(&principal)).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "game_id": started.game_id(),
            "message": "Game started successfully",
            "guesses_remaining": started.guesses_remaining(),
        })),
    ))
}

#[instrument(skip_all, fields(username = %principal.username()))]
pub(crate) async fn submit_guess(
    State(state): State<AppState>,
    principal: Principal,
    payload: Result<Json<GuessRequest>, JsonRejection>,
) -> Result<Json<GuessResponse>, ApiError> {
    let Json(req) = payload?;
    let word = normalize_word(&req.word);
    let Some(game_id) = req.game_id.filter(|_| !word.is_empty()) else {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Game ID and word are required",
        ));
    };
    let sessions = state.sessions.clone();
    let outcome = blocking(move || sessions.submit_guess(&principal, game_id, &word)).await?;
    Ok(Json(GuessResponse::from(outcome)))
}

#[instrument(skip_all, fields(username = %principal.username()))]
pub(crate) async fn game_status(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Value>, ApiError> {
    let sessions = state.sessions.clone();
    let status = blocking(move || sessions.get_status(&principal)).await?;
    Ok(Json(json!(status)))
}

#[instrument(skip_all, fields(username = %principal.username()))]
pub(crate) async fn daily_report(
    State(state): State<AppState>,
    principal: Principal,
    query: Result<Query<DailyReportQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let admin = state.admin.clone();
    let report =
        blocking(move || admin.daily_report(&principal, query.date.as_deref())).await?;
    Ok(Json(json!(report)))
}

#[instrument(skip_all, fields(username = %principal.username()))]
pub(crate) async fn user_report(
    State(state): State<AppState>,
    principal: Principal,
    query: Result<Query<UserReportQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let admin = state.admin.clone();
    let report = blocking(move || admin.user_report(&principal, query.username.trim())).await?;
    Ok(Json(json!(report)))
}

#[instrument(skip_all, fields(username = %principal.username()))]
pub(crate) async fn add_word(
    State(state): State<AppState>,
    principal: Principal,
    payload: Result<Json<AddWordRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = payload?;
    let word = normalize_word(&req.word);
    let admin = state.admin.clone();
    let added = blocking(move || admin.add_word(&principal, &word)).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": format!("Word \"{}\" added successfully", added) })),
    ))
}

#[instrument(skip_all, fields(username = %principal.username()))]
pub(crate) async fn list_words(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Value>, ApiError> {
    let admin = state.admin.clone();
    let words = blocking(move || admin.list_words(&principal)).await?;
    Ok(Json(json!({ "count": words.len(), "words": words })))
}
