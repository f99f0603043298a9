//! API 앱 상태

use chrono::Duration;
use svaia_core::auth::TokenService;

use crate::config::Config;
use crate::db::ApiDb;

/// 앱 상태
///
/// 모든 핸들러에서 공유하는 상태입니다.
pub struct AppState {
    /// 사용자/프로젝트 저장소
    pub db: ApiDb,

    /// 토큰 발급/검증
    pub tokens: TokenService,
}

impl AppState {
    /// 새 상태 생성
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db = ApiDb::connect(&config.db_url).await?;
        Self::with_db(config, db).await
    }

    /// 이미 열린 저장소로 상태 생성
    pub async fn with_db(config: &Config, db: ApiDb) -> anyhow::Result<Self> {
        if config.seed_default_users {
            db.seed_default_users().await?;
        }

        let tokens = TokenService::new(
            &config.secret_key,
            Duration::seconds(config.access_ttl_secs),
            Duration::seconds(config.refresh_ttl_secs),
        )?;

        Ok(Self { db, tokens })
    }
}
