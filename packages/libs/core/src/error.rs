//! 공통 에러 타입
//!
//! 인증/인가 경계에서 발생하는 모든 실패를 하나의 타입으로 표현합니다.
//! 각 서비스는 이 타입을 자신의 HTTP 에러로 변환합니다.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// svaia 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Auth Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token: {reason}")]
    InvalidToken { reason: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Access / Resource Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("{reason}")]
    Forbidden { reason: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    BadRequest { message: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Infrastructure Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("{message}")]
    Internal { message: String },

    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Error::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Error::Conflict {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::BadRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    pub fn invalid_token(reason: impl Into<String>) -> Self {
        Error::InvalidToken {
            reason: reason.into(),
        }
    }

    /// HTTP 상태 코드로 변환
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Error::BadRequest { .. } | Error::Json(_) => 400,

            // 401 Unauthorized
            Error::InvalidCredentials | Error::TokenExpired | Error::InvalidToken { .. } => 401,

            // 403 Forbidden
            Error::Forbidden { .. } => 403,

            // 404 Not Found
            Error::NotFound { .. } => 404,

            // 409 Conflict
            Error::Conflict { .. } => 409,

            // 503 Service Unavailable
            Error::ServiceUnavailable { .. } => 503,

            // 500 Internal Server Error
            Error::Internal { .. } => 500,
        }
    }

    /// 에러 코드 (클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidCredentials => "INVALID_CREDENTIALS",
            Error::TokenExpired => "TOKEN_EXPIRED",
            Error::InvalidToken { .. } => "INVALID_TOKEN",
            Error::Forbidden { .. } => "FORBIDDEN",
            Error::NotFound { .. } => "NOT_FOUND",
            Error::Conflict { .. } => "CONFLICT",
            Error::BadRequest { .. } => "BAD_REQUEST",
            Error::Internal { .. } => "INTERNAL_ERROR",
            Error::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            Error::Json(_) => "JSON_ERROR",
        }
    }
}
