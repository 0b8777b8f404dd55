//! The single error type handlers return, and its JSON rendering.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Request, State,
    },
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::state::AppState;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    // raised by `CurrentUser::restrict_to` for role-gated routes
    #[cfg_attr(not(test), allow(dead_code))]
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// `{status, message}` body shared by every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Full error chain of an internal failure, carried on the response so
/// `attach_error_detail` can expose it outside production.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let label = if status.is_server_error() { "error" } else { "fail" };

        let (message, detail) = match self {
            AppError::Internal(err) => {
                error!(error = ?err, "internal error");
                (
                    "Something went wrong".to_string(),
                    Some(ErrorDetail(format!("{:?}", err))),
                )
            }
            other => (other.to_string(), None),
        };

        let body = ErrorBody {
            status: label,
            message,
            stack: None,
        };
        let mut res = (status, Json(body)).into_response();
        if let Some(detail) = detail {
            res.extensions_mut().insert(detail);
        }
        res
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Validation(err.body_text())
    }
}

/// Rewrites internal error bodies to include the error chain unless running
/// in production.
pub async fn attach_error_detail(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let res = next.run(req).await;
    if state.config.environment.is_production() {
        return res;
    }
    match res.extensions().get::<ErrorDetail>().cloned() {
        Some(ErrorDetail(stack)) => {
            let status = res.status();
            let body = ErrorBody {
                status: "error",
                message: "Something went wrong".into(),
                stack: Some(stack),
            };
            (status, Json(body)).into_response()
        }
        None => res,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn client_errors_render_as_fail() {
        let res = AppError::not_found("Image not found").into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let json = body_json(res).await;
        assert_eq!(json["status"], "fail");
        assert_eq!(json["message"], "Image not found");
        assert!(json.get("stack").is_none());
    }

    #[tokio::test]
    async fn internal_errors_hide_cause_but_carry_detail() {
        let err = AppError::from(anyhow::anyhow!("db exploded"));
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = res.extensions().get::<ErrorDetail>().cloned().unwrap();
        assert!(detail.0.contains("db exploded"));
        let json = body_json(res).await;
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Something went wrong");
    }

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(AppError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::unauthorized("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn non_multipart_upload_renders_as_json_fail() {
        use axum::{
            body::Body,
            extract::{FromRequest, Multipart},
            http::header,
        };

        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/api/image/upload")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"image":"x"}"#))
            .unwrap();
        let rejection = Multipart::from_request(req, &()).await.err().unwrap();

        let res = AppError::from(rejection).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
        let json = body_json(res).await;
        assert_eq!(json["status"], "fail");
        assert!(json["message"].as_str().unwrap().contains("multipart"));
    }
}
