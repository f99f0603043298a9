//! Web 설정

use std::env;

/// Web 설정
#[derive(Clone)]
pub struct Config {
    /// 서버 포트
    pub port: u16,

    /// API 서비스 URL
    pub api_url: String,

    /// Chat 서비스 URL
    pub chat_url: String,

    /// Chat 서비스에 보낼 API 키
    pub chat_api_key: String,

    /// 연결 타임아웃 (초)
    pub http_connect_timeout_secs: u64,

    /// 요청 전체 타임아웃 (초)
    pub http_timeout_secs: u64,

    /// 세션 비활성 만료 (초)
    pub session_ttl_secs: i64,

    /// Secure 쿠키 여부
    pub session_secure: bool,

    /// 세션 저장소 (SQLite URL)
    pub session_db_url: String,

    /// 만료 세션 정리 주기 (초)
    pub session_cleanup_secs: u64,
}

impl Config {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            port: env::var("SVAIA_WEB_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()?,

            api_url: env::var("SVAIA_API_URL")
                .unwrap_or_else(|_| "http://localhost:5001".to_string()),

            chat_url: env::var("SVAIA_CHAT_URL")
                .unwrap_or_else(|_| "http://localhost:5002".to_string()),

            chat_api_key: env::var("SVAIA_CHAT_API_KEY")
                .unwrap_or_else(|_| "your-api-key".to_string()),

            http_connect_timeout_secs: env::var("SVAIA_HTTP_CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),

            http_timeout_secs: env::var("SVAIA_HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap_or(15),

            session_ttl_secs: env::var("SVAIA_SESSION_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),

            session_secure: env::var("SVAIA_SESSION_SECURE")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),

            session_db_url: env::var("SVAIA_SESSION_DB_URL")
                .unwrap_or_else(|_| "sqlite::memory:".to_string()),

            session_cleanup_secs: env::var("SVAIA_SESSION_CLEANUP_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
        })
    }
}
