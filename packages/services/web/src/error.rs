//! Web 에러 타입
//!
//! JSON 프록시 라우트의 실패 응답을 정의합니다.
//! 페이지 라우트는 대부분의 실패를 flash 메시지 + 리다이렉트로 처리합니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::client::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("client error: {0}")]
    Client(#[from] ClientError),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// 에러 응답 JSON
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl WebError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        WebError::BadRequest {
            message: message.into(),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            WebError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            // API가 돌려준 상태와 본문을 그대로 전달
            WebError::Client(ClientError::Api { status, body }) => {
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                return (status, Json(body)).into_response();
            }
            WebError::Client(e) => {
                tracing::warn!("upstream call failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.user_message())
            }
            WebError::Session(e) => {
                tracing::error!("Session error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error de sesión".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: message,
            request_id: crate::middleware::current_request_id(),
        };
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;
