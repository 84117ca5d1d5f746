use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::users::dto::Message;
use crate::users::repo::StoreError;

/// Everything a handler can fail with. Client-facing variants carry their
/// message; server-side variants keep the detail in the log and send a
/// generic body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Hashing(ref detail) => {
                tracing::error!(error = %detail, "password hashing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Password failure".to_string(),
                )
            }
            ApiError::Store(ref e) => {
                tracing::error!(error = %e, "store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "something failed".to_string(),
                )
            }
        };

        (status, Json(Message { msg })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_message_status() {
        let res = ApiError::BadRequest("Missing params".into()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = ApiError::NotFound("User not found".into()).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn server_errors_map_to_500() {
        let res = ApiError::Hashing("entropy fault".into()).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let res = ApiError::Store(StoreError::Timeout).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
