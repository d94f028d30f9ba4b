use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crease_engine::{EngineError, ErrorKind};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("authentication failed: {0}")]
    Unauthenticated(String),

    #[error("not permitted: {action}")]
    Forbidden { action: String },

    #[error("invalid request body: {reason}")]
    Payload {
        status: StatusCode,
        field: Option<String>,
        reason: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Engine(err) => match err.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::InvalidState => StatusCode::CONFLICT,
                ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::InvariantViolation => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Payload { status, .. } => *status,
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let (kind, field) = match self {
            Self::Engine(err) => (err.kind().to_string(), err.field().map(str::to_string)),
            Self::Payload { field, .. } => (ErrorKind::Validation.to_string(), field.clone()),
            Self::Unauthenticated(_) => ("unauthenticated".into(), None),
            Self::Forbidden { .. } => ("forbidden".into(), None),
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => ("internal".into(), None),
        };
        ErrorBody {
            kind,
            field,
            message: self.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_status() {
        let cases = [
            (EngineError::not_found("innings", "x"), StatusCode::NOT_FOUND),
            (EngineError::invalid_state("done"), StatusCode::CONFLICT),
            (
                EngineError::validation("runs", "too many"),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                EngineError::invariant("drift"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ServerError::from(err).status(), status);
        }
        assert_eq!(
            ServerError::Unauthenticated("bad token".into()).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn body_carries_kind_and_field() {
        let body = ServerError::from(EngineError::validation("fielderId", "required")).body();
        assert_eq!(body.kind, "validation");
        assert_eq!(body.field.as_deref(), Some("fielderId"));
        assert_eq!(body.message, "validation failed on fielderId: required");

        let json = serde_json::to_value(ServerError::Forbidden { action: "score".into() }.body())
            .unwrap();
        assert_eq!(json["kind"], "forbidden");
        assert!(json.get("field").is_none());
    }

    #[test]
    fn payload_errors_keep_rejection_status() {
        let err = ServerError::Payload {
            status: StatusCode::BAD_REQUEST,
            field: None,
            reason: "expected value at line 1 column 1".into(),
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let body = err.body();
        assert_eq!(body.kind, "validation");
        assert_eq!(body.field, None);
        assert_eq!(body.message, "invalid request body: expected value at line 1 column 1");
    }
}
