//! API 설정

use std::env;

/// 개발용 기본 비밀키 (32바이트)
const DEV_SECRET_KEY: &str = "svaia-dev-secret-key-change-me!!";

/// API 설정
#[derive(Clone)]
pub struct Config {
    /// 서버 포트
    pub port: u16,

    /// SQLite URL
    pub db_url: String,

    /// 토큰 비밀키 (32바이트 키 재료)
    pub secret_key: String,

    /// Access Token TTL (초)
    pub access_ttl_secs: i64,

    /// Refresh 마감 TTL (초)
    pub refresh_ttl_secs: i64,

    /// 기본 사용자(admin/user) 생성 여부
    pub seed_default_users: bool,
}

impl Config {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> anyhow::Result<Self> {
        let secret_key = env::var("SVAIA_SECRET_KEY").unwrap_or_else(|_| {
            tracing::warn!("SVAIA_SECRET_KEY not set, using development key");
            DEV_SECRET_KEY.to_string()
        });

        Ok(Self {
            port: env::var("SVAIA_API_PORT")
                .unwrap_or_else(|_| "5001".to_string())
                .parse()?,

            db_url: env::var("SVAIA_API_DB_URL")
                .unwrap_or_else(|_| "sqlite://data/svaia.db".to_string()),

            secret_key,

            access_ttl_secs: env::var("SVAIA_ACCESS_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),

            refresh_ttl_secs: env::var("SVAIA_REFRESH_TTL_SECS")
                .unwrap_or_else(|_| "604800".to_string())
                .parse()
                .unwrap_or(604_800),

            seed_default_users: env::var("SVAIA_SEED_DEFAULT_USERS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        })
    }

    /// 테스트용 설정
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            port: 0,
            db_url: "sqlite::memory:".to_string(),
            secret_key: DEV_SECRET_KEY.to_string(),
            access_ttl_secs: 3600,
            refresh_ttl_secs: 604_800,
            seed_default_users: true,
        }
    }
}
