//! Email-preparation endpoint
//!
//! `POST /api/prepare-email`: validate the calculator submission, render the
//! prompt, ask the generation upstream for an email body, return it as JSON.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use thiserror::Error;

use crate::calculator::{render_prompt, CalculatorSubmission, ValidationErrors};
use crate::config::AppState;
use crate::generation::{GenerationError, GenerationRequest};
use crate::http;
use crate::logger;

pub const PREPARE_EMAIL_PATH: &str = "/api/prepare-email";

const GENERATION_FALLBACK_MESSAGE: &str = "Failed to generate email content.";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrepareEmailResponse {
    email_body: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
}

#[derive(Error, Debug)]
pub enum PrepareEmailError {
    #[error("API key not configured for the worker.")]
    MissingCredential,

    #[error("Request body exceeds {max} bytes")]
    PayloadTooLarge { max: u64 },

    #[error("Failed to read request body: {0}")]
    UnreadableBody(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid request payload")]
    InvalidPayload(#[from] ValidationErrors),

    #[error("{0}")]
    Generation(#[from] GenerationError),
}

impl PrepareEmailError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnreadableBody(_) | Self::InvalidJson(_) | Self::InvalidPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Generation(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn to_body(&self) -> ErrorResponse {
        let error = match self {
            Self::Generation(e) => {
                let message = e.to_string();
                if message.trim().is_empty() {
                    GENERATION_FALLBACK_MESSAGE.to_string()
                } else {
                    message
                }
            }
            other => other.to_string(),
        };
        let details = match self {
            Self::InvalidPayload(errors) => errors.messages(),
            _ => Vec::new(),
        };
        ErrorResponse { error, details }
    }
}

/// Handle `POST /api/prepare-email`
pub async fn prepare_email<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body + Send,
    B::Data: Send,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    match try_prepare_email(req, state).await {
        Ok(email_body) => {
            http::json_response(StatusCode::OK, &PrepareEmailResponse { email_body })
        }
        Err(e) => {
            let status = e.status();
            if status.is_server_error() {
                logger::log_error(&format!("Error in {PREPARE_EMAIL_PATH}: {e:?}"));
            } else {
                logger::log_warning(&format!("Rejected {PREPARE_EMAIL_PATH} request: {e}"));
            }
            http::json_response(status, &e.to_body())
        }
    }
}

async fn try_prepare_email<B>(req: Request<B>, state: &AppState) -> Result<String, PrepareEmailError>
where
    B: Body + Send,
    B::Data: Send,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let generation = &state.config.generation;
    let api_key = generation
        .credential()
        .ok_or(PrepareEmailError::MissingCredential)?;

    let max = state.config.http.max_body_size;
    if declared_length(&req).is_some_and(|len| len > max) {
        return Err(PrepareEmailError::PayloadTooLarge { max });
    }

    let limit = usize::try_from(max).unwrap_or(usize::MAX);
    let body = Limited::new(req.into_body(), limit)
        .collect()
        .await
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                PrepareEmailError::PayloadTooLarge { max }
            } else {
                PrepareEmailError::UnreadableBody(e.to_string())
            }
        })?
        .to_bytes();

    let value: serde_json::Value = serde_json::from_slice(&body)?;
    let submission = CalculatorSubmission::from_json(&value)?;

    let prompt = render_prompt(&submission, &generation.recipient);
    let email_body = state
        .generator
        .generate(GenerationRequest {
            api_key,
            model: &generation.model,
            prompt: &prompt,
        })
        .await?;

    logger::log_info(&format!(
        "Email content prepared for {} regarding {}",
        generation.recipient, submission.user_email
    ));

    Ok(email_body)
}

fn declared_length<B>(req: &Request<B>) -> Option<u64> {
    req.headers()
        .get(hyper::header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
