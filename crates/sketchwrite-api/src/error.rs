use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use sketchwrite_store::StoreError;
use sketchwrite_types::api::ErrorBody;

/// Everything a handler can fail with, mapped onto the wire as
/// `{message, status, errors?}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad input shape, type, or enum value. Always raised before any
    /// store call.
    #[error("{message}")]
    Validation {
        message: String,
        errors: Option<BTreeMap<String, Vec<String>>>,
    },
    /// The referenced entity does not exist (or its id is malformed —
    /// callers cannot tell the two apart, by design).
    #[error("{0} not found")]
    NotFound(String),
    /// Store failure. Logged here; the caller only ever sees a generic
    /// message so internals do not leak.
    #[error("internal server error")]
    Storage(#[source] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            errors: None,
        }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), vec![message.clone()]);
        Self::Validation {
            message,
            errors: Some(errors),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound("Resource".to_string()),
            // Unique-constraint races are absorbed by the store layer; one
            // reaching this far means a bug, not a client error.
            StoreError::Conflict => Self::Storage(anyhow::anyhow!("unexpected conflict")),
            StoreError::Storage(e) => Self::Storage(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Storage(cause) = &self {
            error!("storage failure: {cause:#}");
        }
        let status = self.status();
        let message = self.to_string();
        let errors = match self {
            Self::Validation { errors, .. } => errors,
            _ => None,
        };
        let body = ErrorBody {
            message,
            status: status.as_u16(),
            errors,
        };
        (status, Json(body)).into_response()
    }
}

/// Re-labels a store `NotFound` with the entity name the route was
/// looking up ("Prompt not found" rather than "Resource not found").
pub(crate) fn or_not_found(err: StoreError, what: &str) -> ApiError {
    match err {
        StoreError::NotFound => ApiError::not_found(what),
        other => other.into(),
    }
}

/// Path ids are UUIDs; a malformed one can never name a row, so it maps
/// to the same 404 as a missing row.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found(what))
}

/// Runs a blocking store closure on the blocking pool, the same way every
/// handler does it.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("blocking task join error: {e}");
        ApiError::Storage(anyhow::Error::from(e))
    })?
}
