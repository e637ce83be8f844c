//! Proxy error types.
//!
//! Every failure a handler can hit is rendered to the client as
//!
//! ```json
//! {"error": {"message": "...", "type": "proxy_error"}}
//! ```
//!
//! Backend (Ollama) failures keep the backend's status code and use the
//! `ollama_error` type tag instead.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

pub const PROXY_ERROR: &str = "proxy_error";
pub const OLLAMA_ERROR: &str = "ollama_error";

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid request body: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    #[error("ollama returned {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("ollama request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ProxyError {
    /// Type tag reported in the error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Backend { .. } => OLLAMA_ERROR,
            _ => PROXY_ERROR,
        }
    }

    /// Message reported in the error envelope. Backend bodies pass through verbatim.
    pub fn message(&self) -> String {
        match self {
            Self::Backend { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResponseError for ProxyError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Backend { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorEnvelope {
            error: ErrorDetail {
                message: self.message(),
                kind: self.kind().to_string(),
            },
        })
    }
}
