//! HTTP request handlers for the webhook and the record management pages.

use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use super::form::{FormError, RecordForm};
use super::{twiml, AppState};
use crate::storage::StoreError;

const INDEX_TEXT: &str = "This is a WhatsApp chatbot powered by a stored FAQ with a language model fallback. \
Use the /chatgpt endpoint to interact with the bot.";

const WEBHOOK_USAGE_TEXT: &str = "This endpoint is for POST requests from Twilio.";

/// Build the axum router with all routes
pub(super) fn router(state: Arc<AppState>) -> axum::Router {
    use axum::routing::{get, post};
    use tower_http::services::ServeDir;
    use tower_http::trace::TraceLayer;

    let uploads = ServeDir::new(state.blobs.root());

    axum::Router::new()
        .route("/", get(index))
        .route("/chatgpt", get(webhook_usage).post(webhook))
        .route("/add", get(add_form).post(add_record))
        .route("/view", get(view_records).post(view_records))
        .route("/edit/{id}", get(edit_form).post(edit_record))
        .route("/delete/{id}", post(delete_record))
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Failures that surface as an HTTP error status
#[derive(Debug)]
pub(super) enum AppError {
    NotFound(i64),
    Validation(String),
    Internal(anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Internal(other.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(id) => {
                tracing::info!("Record not found: {id}");
                (StatusCode::NOT_FOUND, format!("Record not found: {id}")).into_response()
            }
            Self::Validation(message) => {
                tracing::warn!("Rejected form: {message}");
                (StatusCode::BAD_REQUEST, message).into_response()
            }
            Self::Internal(err) => {
                tracing::error!("Internal error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Plain-text error page returned with 200 when saving a form fails
fn save_failed(err: &dyn std::fmt::Display) -> Response {
    tracing::error!("Failed to save record: {err}");
    format!("An error occurred: {err}").into_response()
}

fn form_failed(err: FormError) -> Result<Response, AppError> {
    match err {
        FormError::Invalid(message) => Err(AppError::Validation(message)),
        FormError::Upload(e) => Ok(save_failed(&format!("{e:#}"))),
    }
}

// -- / --

async fn index() -> &'static str {
    INDEX_TEXT
}

// -- /chatgpt --

/// Inbound Twilio message (subset of fields we care about)
#[derive(Deserialize)]
struct WebhookMessage {
    #[serde(rename = "Body")]
    body: Option<String>,
}

async fn webhook_usage() -> &'static str {
    WEBHOOK_USAGE_TEXT
}

/// `Body` is read from the query string first, then from a urlencoded form
/// body. A request carrying neither is answered as an empty message.
async fn webhook(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WebhookMessage>,
    form: Result<Form<WebhookMessage>, FormRejection>,
) -> Result<Response, AppError> {
    let body = query
        .body
        .or_else(|| form.ok().and_then(|Form(message)| message.body))
        .unwrap_or_default();

    tracing::info!("Question: {}", body.to_lowercase());

    let answer = state.responder.respond(&body).await?;

    tracing::info!("BOT Answer: {}", answer);

    Ok((
        [(header::CONTENT_TYPE, "application/xml")],
        twiml::message(&answer),
    )
        .into_response())
}

// -- /add --

async fn add_form(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    Ok(Html(state.pages.add().map_err(AppError::Internal)?))
}

async fn add_record(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = match RecordForm::read(multipart).await {
        Ok(form) => form,
        Err(e) => return form_failed(e),
    };
    let new = match form.to_new_record(&state.blobs) {
        Ok(new) => new,
        Err(e) => return form_failed(e),
    };

    match state.store.insert(&new) {
        Ok(record) => {
            tracing::info!("Added record {}: {:?}", record.id, record.question);
            Ok(Redirect::to("/add").into_response())
        }
        Err(e) => Ok(save_failed(&e)),
    }
}

// -- /view --

#[derive(Deserialize)]
struct ViewParams {
    query: Option<String>,
}

async fn view_records(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ViewParams>,
) -> Result<Html<String>, AppError> {
    let query = params.query.filter(|q| !q.is_empty());

    let records = match &query {
        Some(q) => state.store.search(q)?,
        None => state.store.all()?,
    };

    let html = state
        .pages
        .view(query.as_deref(), &records)
        .map_err(AppError::Internal)?;
    Ok(Html(html))
}

// -- /edit/{id} --

async fn edit_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let record = state.store.get(id)?;
    Ok(Html(state.pages.edit(&record).map_err(AppError::Internal)?))
}

async fn edit_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    match state.store.get(id) {
        Ok(_) => {}
        Err(StoreError::NotFound(id)) => return Err(AppError::NotFound(id)),
        Err(e) => return Ok(save_failed(&e)),
    }

    let form = match RecordForm::read(multipart).await {
        Ok(form) => form,
        Err(e) => return form_failed(e),
    };
    let update = match form.to_update(&state.blobs) {
        Ok(update) => update,
        Err(e) => return form_failed(e),
    };

    match state.store.update(id, &update) {
        Ok(_) => {
            tracing::info!("Updated record {id}");
            Ok(Redirect::to("/view").into_response())
        }
        Err(StoreError::NotFound(id)) => Err(AppError::NotFound(id)),
        Err(e) => Ok(save_failed(&e)),
    }
}

// -- /delete/{id} --

async fn delete_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    state.store.delete(id)?;
    tracing::info!("Deleted record {id}");
    Ok(Redirect::to("/view"))
}
