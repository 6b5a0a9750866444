//! Error taxonomy of the bridge and its HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::models::submission::FieldErrors;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// One or more fields failed validation; the map carries one localized
    /// message per field. Never reaches the network.
    #[error("submission failed validation")]
    Validation(FieldErrors),

    /// The mapper's own guard: a user-form ticket cannot be built without
    /// cpf and phone, whatever the caller did upstream.
    #[error("missing required identity field `{field}` for the user form")]
    MissingRequiredIdentity { field: &'static str },

    /// The inbound multipart body was unusable.
    #[error("invalid upload: {0}")]
    InvalidUpload(&'static str),

    /// Zendesk answered outside the 2xx range, or with a 2xx body that does
    /// not parse. The body text is preserved for operators.
    #[error("zendesk returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    /// The request never completed (DNS, TCP, TLS, timeout).
    #[error("error reaching zendesk: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<FieldErrors> for BridgeError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        match self {
            BridgeError::Validation(errors) => {
                tracing::debug!(fields = errors.len(), "submission rejected by validation");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "errors": errors })),
                )
                    .into_response()
            }
            BridgeError::MissingRequiredIdentity { .. } | BridgeError::InvalidUpload(_) => {
                let message = self.to_string();
                tracing::warn!("{message}");
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            BridgeError::Upstream { status, body } => {
                tracing::error!(%status, "zendesk rejected the request: {body}");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "error": format!("zendesk returned {status}: {body}") })),
                )
                    .into_response()
            }
            BridgeError::Transport(source) => {
                tracing::error!("error reaching zendesk: {source}");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "error": format!("error reaching zendesk: {source}") })),
                )
                    .into_response()
            }
        }
    }
}
