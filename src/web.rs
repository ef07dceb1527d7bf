//! HTTP API for member cards.
//!
//! | Route | Method | Form fields |
//! |---|---|---|
//! | `/api/health` | GET | |
//! | `/api/cards/encode` | POST | `image`, `record` (JSON) |
//! | `/api/cards/decode` | POST | `image` |
//! | `/api/cards/login` | POST | `image`, `pin` |
//!
//! The login route reads the client address from `ConnectInfo<SocketAddr>`,
//! so the router has to be served with
//! `into_make_service_with_connect_info::<SocketAddr>()`.

use axum::{
    extract::{multipart::Multipart, ConnectInfo, DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use log::{error, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::card::{card_filename, DEFAULT_CARD_FILENAME};
use crate::common::config::ThrottleConfig;
use crate::common::record::CardSummary;
use crate::login::{AccountRegistry, AttemptThrottle, LoginOutcome, MemberCardVerifier};
use crate::processing::steganography;
use crate::{CodecError, EmbeddedRecord, LoginError};

/// Returned for every upload that does not decode to a member card.
pub const INVALID_CARD: &str = "Invalid or corrupted member card";

#[derive(Serialize)]
struct EncodeResponse {
    success: bool,
    message: String,
    filename: String,
    card_image_base64: String,
}

#[derive(Serialize)]
struct DecodeResponse {
    success: bool,
    card: CardSummary,
}

#[derive(Serialize)]
struct LoginResponse {
    success: bool,
    account: LoginOutcome,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: None,
        }),
    )
}

/// Shared state behind every handler.
pub struct AppState {
    verifier: MemberCardVerifier,
    throttle: Mutex<AttemptThrottle>,
}

impl AppState {
    pub fn new(registry: Arc<dyn AccountRegistry>, throttle: &ThrottleConfig) -> Self {
        Self {
            verifier: MemberCardVerifier::new(registry),
            throttle: Mutex::new(AttemptThrottle::new(throttle)),
        }
    }
}

/// Build the API router. Uploads larger than `max_upload_bytes` are rejected
/// before any handler runs.
pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/cards/encode", post(encode_card_handler))
        .route("/api/cards/decode", post(decode_card_handler))
        .route("/api/cards/login", post(login_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "member-card-api",
    }))
}

/// Collect every multipart field into memory, keyed by field name.
async fn read_form(mut multipart: Multipart) -> Result<HashMap<String, Vec<u8>>, ApiError> {
    let mut fields = HashMap::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        let name = field.name().unwrap_or("").to_string();
        let data = field.bytes().await.map_err(|e| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("Failed to read field '{}': {}", name, e),
            )
        })?;
        fields.insert(name, data.to_vec());
    }

    Ok(fields)
}

fn take_field(fields: &mut HashMap<String, Vec<u8>>, name: &str) -> Result<Vec<u8>, ApiError> {
    fields
        .remove(name)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, format!("No {} provided", name)))
}

/// Run a codec call on the blocking pool; bit scanning is CPU-bound.
async fn run_codec<T, F>(task: F) -> Result<Result<T, CodecError>, ApiError>
where
    F: FnOnce() -> Result<T, CodecError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|e| {
        error!("Codec task panicked: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    })
}

/// Decode a card for the decode and login endpoints. Every failure that means
/// "not a usable card" collapses into the same response.
async fn decode_card(image: Vec<u8>) -> Result<EmbeddedRecord, ApiError> {
    match run_codec(move || steganography::decode_record_png(&image)).await? {
        Ok(record) => Ok(record),
        Err(e) => {
            if e.is_not_a_card() {
                info!("Rejected upload: {}", e);
            } else {
                warn!("Unreadable card upload: {}", e);
            }
            Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, INVALID_CARD))
        }
    }
}

async fn encode_card_handler(multipart: Multipart) -> Result<impl IntoResponse, ApiError> {
    let mut fields = read_form(multipart).await?;
    let image = take_field(&mut fields, "image")?;
    let record: EmbeddedRecord = serde_json::from_slice(&take_field(&mut fields, "record")?)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Invalid record: {}", e)))?;

    info!(
        "Received carrier image for {} ({} bytes)",
        record.email,
        image.len()
    );

    let filename = card_filename(&record.name, DEFAULT_CARD_FILENAME);
    let email = record.email.clone();

    match run_codec(move || steganography::encode_png(&image, &record)).await? {
        Ok(card) => {
            info!("Member card encoded for {} ({} bytes)", email, card.len());
            Ok((
                StatusCode::OK,
                Json(EncodeResponse {
                    success: true,
                    message: format!("Member card created for {}", email),
                    filename,
                    card_image_base64: general_purpose::STANDARD.encode(&card),
                }),
            ))
        }
        Err(e @ CodecError::CapacityExceeded { .. }) => {
            Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
        }
        Err(CodecError::ImageDecode(e)) => {
            warn!("Unreadable carrier image: {}", e);
            Err(api_error(StatusCode::BAD_REQUEST, "Unreadable image"))
        }
        Err(e) => {
            error!("Encoding failed: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode member card: {}", e),
            ))
        }
    }
}

async fn decode_card_handler(multipart: Multipart) -> Result<impl IntoResponse, ApiError> {
    let mut fields = read_form(multipart).await?;
    let record = decode_card(take_field(&mut fields, "image")?).await?;

    Ok(Json(DecodeResponse {
        success: true,
        card: record.summary(),
    }))
}

async fn login_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let client = addr.ip().to_string();
    state
        .throttle
        .lock()
        .await
        .check(&client, Instant::now())
        .map_err(login_error)?;

    let mut fields = read_form(multipart).await?;
    let pin = String::from_utf8(take_field(&mut fields, "pin")?)
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "PIN must be text"))?;
    let record = decode_card(take_field(&mut fields, "image")?).await?;

    let outcome = state.verifier.verify(&record, pin.trim()).map_err(login_error)?;
    state.throttle.lock().await.reset(&client);

    Ok(Json(LoginResponse {
        success: true,
        account: outcome,
    }))
}

fn login_error(e: LoginError) -> ApiError {
    let status = match e {
        LoginError::IncorrectPin | LoginError::CardVerificationFailed(_) => StatusCode::UNAUTHORIZED,
        LoginError::AccountNotFound { .. } => StatusCode::NOT_FOUND,
        LoginError::TooManyAttempts { .. } => StatusCode::TOO_MANY_REQUESTS,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
            code: Some(e.code()),
        }),
    )
}
