//! Chat 설정

use std::env;

/// Chat 설정
#[derive(Clone)]
pub struct Config {
    /// 서버 포트
    pub port: u16,

    /// 허용할 API 키
    pub api_key: String,

    /// 디버그 모드 (키 없는 요청 허용)
    pub debug: bool,
}

impl Config {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            port: env::var("SVAIA_CHAT_PORT")
                .unwrap_or_else(|_| "5002".to_string())
                .parse()?,

            api_key: env::var("SVAIA_CHAT_API_KEY").unwrap_or_else(|_| "your-api-key".to_string()),

            debug: env::var("SVAIA_CHAT_DEBUG")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        })
    }
}
