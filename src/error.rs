use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use time::Date;
use tracing::error;

/// Failures of member operations. Notification failures are not in here:
/// they are reported inline as a failed delivery and never abort an operation.
#[derive(Debug, thiserror::Error)]
pub enum MemberError {
    #[error("member with this name or phone already exists")]
    Duplicate,
    #[error("expiry date {expiry} is before today ({today})")]
    InvalidDate { expiry: Date, today: Date },
    #[error("only the owner may {action}")]
    NotAuthorized { action: &'static str },
    #[error("{0}")]
    Validation(String),
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl MemberError {
    pub fn status(&self) -> StatusCode {
        match self {
            MemberError::Duplicate => StatusCode::CONFLICT,
            MemberError::InvalidDate { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            MemberError::NotAuthorized { .. } => StatusCode::FORBIDDEN,
            MemberError::Validation(_) => StatusCode::BAD_REQUEST,
            MemberError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MemberError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            MemberError::Storage(e) => {
                error!(error = %e, "storage failure");
                "internal storage error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn maps_each_kind_to_a_status() {
        assert_eq!(MemberError::Duplicate.status(), StatusCode::CONFLICT);
        assert_eq!(
            MemberError::InvalidDate {
                expiry: date!(2026-10-01),
                today: date!(2026-10-15),
            }
            .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            MemberError::NotAuthorized { action: "delete members" }.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            MemberError::Validation("name is required".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            MemberError::Storage(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_details_are_not_leaked() {
        let res = MemberError::Storage(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
