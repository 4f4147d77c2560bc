//! Error taxonomy for planning, pool maintenance and the HTTP surface.
//!
//! Pool exhaustion is deliberately absent: a short allocation is a valid result.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use thiserror::Error;

use crate::domain::{ItemId, ItemKind, TopicId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    #[error("Unknown difficulty profile: {0}")]
    UnknownProfile(String),

    #[error("Invalid total amount: {0} (must be between 0 and {})", u32::MAX)]
    InvalidTotalAmount(i64),

    #[error("Invalid difficulty profile '{code}': {reason}")]
    InvalidProfile { code: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoolError {
    #[error("Unknown topic: {0}")]
    UnknownTopic(TopicId),

    #[error("Unknown item {item} in topic {topic}")]
    UnknownItem { topic: TopicId, item: ItemId },

    #[error("Topic {topic} holds {expected:?}, cannot add {got:?}")]
    KindMismatch { topic: TopicId, expected: ItemKind, got: ItemKind },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("Unknown training template: {0}")]
    UnknownTemplate(String),

    #[error("Unknown training session: {0}")]
    UnknownSession(String),

    /// Malformed path, query string or body, as reported by the extractor.
    #[error("Invalid request: {message}")]
    Rejected { status: StatusCode, message: String },
}

pub type Result<T> = std::result::Result<T, AppError>;

impl From<std::convert::Infallible> for AppError {
    fn from(e: std::convert::Infallible) -> Self { match e {} }
}

impl From<JsonRejection> for AppError {
    fn from(r: JsonRejection) -> Self { AppError::Rejected { status: r.status(), message: r.body_text() } }
}

impl From<QueryRejection> for AppError {
    fn from(r: QueryRejection) -> Self { AppError::Rejected { status: r.status(), message: r.body_text() } }
}

impl From<PathRejection> for AppError {
    fn from(r: PathRejection) -> Self { AppError::Rejected { status: r.status(), message: r.body_text() } }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Allocation(_) => StatusCode::BAD_REQUEST,
            AppError::Pool(PoolError::KindMismatch { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Pool(_) | AppError::UnknownTemplate(_) | AppError::UnknownSession(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::Rejected { status, .. } => *status,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        tracing::warn!(target: "quiz_allocator", %status, error = %self, "Request rejected");
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let e: AppError = AllocationError::UnknownProfile("nope".into()).into();
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);

        let e: AppError = PoolError::UnknownTopic(7).into();
        assert_eq!(e.status(), StatusCode::NOT_FOUND);

        let e: AppError = PoolError::KindMismatch {
            topic: 1,
            expected: ItemKind::Questions,
            got: ItemKind::ProgrammingExercises,
        }
        .into();
        assert_eq!(e.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_messages_name_the_offender() {
        assert_eq!(
            AllocationError::UnknownProfile("extreme".into()).to_string(),
            "Unknown difficulty profile: extreme"
        );
        assert_eq!(
            AllocationError::InvalidTotalAmount(-3).to_string(),
            "Invalid total amount: -3 (must be between 0 and 4294967295)"
        );
    }
}
