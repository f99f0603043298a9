//! 세션 상태
//!
//! 쿠키 세션에는 access token, 사용자 id, flash 메시지만 저장합니다.
//! 현재 사용자는 요청마다 API에서 다시 읽습니다.
//! 세션 레코드는 SQLite에 두고, 만료된 레코드는 백그라운드 작업이 지웁니다.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use svaia_core::model::User;
use tokio::task::JoinHandle;
use tower_sessions::cookie::{time::Duration, SameSite};
use tower_sessions::{ExpiredDeletion, Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::client::ApiClient;
use crate::config::Config;
use crate::error::Result;
use crate::state::AppState;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const USER_ID_KEY: &str = "user_id";
pub const FLASHES_KEY: &str = "_flashes";

pub const LOGIN_MESSAGE: &str = "Por favor inicie sesión para acceder a esta página.";

/// 세션 DB 연결
///
/// `sqlite::memory:`는 연결마다 다른 DB가 되므로 연결 하나를 계속 유지합니다.
pub async fn session_pool(db_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);
    let pool_options = if db_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(4)
    };
    Ok(pool_options.connect_with(options).await?)
}

/// 세션 저장소 생성 (테이블 마이그레이션 포함)
pub async fn session_store(pool: SqlitePool) -> anyhow::Result<SqliteStore> {
    let store = SqliteStore::new(pool);
    store.migrate().await?;
    Ok(store)
}

/// 만료된 세션을 주기적으로 삭제
pub fn spawn_expired_cleanup(store: SqliteStore, period_secs: u64) -> JoinHandle<()> {
    let period = std::time::Duration::from_secs(period_secs.max(1));
    tokio::spawn(async move {
        if let Err(e) = store.continuously_delete_expired(period).await {
            tracing::error!("expired session cleanup stopped: {}", e);
        }
    })
}

/// 세션 레이어 (비활성 만료)
pub fn session_layer(store: SqliteStore, config: &Config) -> SessionManagerLayer<SqliteStore> {
    SessionManagerLayer::new(store)
        .with_secure(config.session_secure)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            config.session_ttl_secs,
        )))
}

/// 다음 페이지 렌더링 때 한 번 보여줄 메시지
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: String,
    pub message: String,
}

pub async fn flash(session: &Session, category: &str, message: impl Into<String>) -> Result<()> {
    let mut flashes: Vec<Flash> = session.get(FLASHES_KEY).await?.unwrap_or_default();
    flashes.push(Flash {
        category: category.to_string(),
        message: message.into(),
    });
    session.insert(FLASHES_KEY, flashes).await?;
    Ok(())
}

pub async fn take_flashes(session: &Session) -> Result<Vec<Flash>> {
    Ok(session
        .remove::<Vec<Flash>>(FLASHES_KEY)
        .await?
        .unwrap_or_default())
}

/// 로그인 성공 후 세션 id를 교체하고 토큰을 저장
pub async fn sign_in(session: &Session, token: &str, user_id: i64) -> Result<()> {
    session.cycle_id().await?;
    session.insert(ACCESS_TOKEN_KEY, token).await?;
    session.insert(USER_ID_KEY, user_id).await?;
    Ok(())
}

/// 인증 정보만 제거 (flash는 유지)
pub async fn clear_auth(session: &Session) -> Result<()> {
    session.remove::<String>(ACCESS_TOKEN_KEY).await?;
    session.remove::<i64>(USER_ID_KEY).await?;
    Ok(())
}

pub async fn sign_out(session: &Session) -> Result<()> {
    session.flush().await?;
    Ok(())
}

/// 로그인된 사용자
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

/// 세션의 토큰으로 현재 사용자 조회
///
/// 조회가 어떤 이유로든 실패하면 세션의 인증 정보를 지우고 익명으로 취급합니다.
pub async fn load_user(api: &dyn ApiClient, session: &Session) -> Result<Option<CurrentUser>> {
    let token: Option<String> = session.get(ACCESS_TOKEN_KEY).await?;
    let user_id: Option<i64> = session.get(USER_ID_KEY).await?;
    let (Some(token), Some(user_id)) = (token, user_id) else {
        return Ok(None);
    };

    match api.get_user(&token, user_id).await {
        Ok(user) => Ok(Some(CurrentUser { user, token })),
        Err(e) => {
            tracing::info!(user_id, "session user could not be loaded: {}", e);
            clear_auth(session).await?;
            Ok(None)
        }
    }
}

/// 같은 사이트 안의 경로만 허용
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

/// 로그인 필요 라우트
///
/// 익명 요청은 flash와 함께 `/login?next=<원래 경로>`로 보냅니다.
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match load_user(state.api.as_ref(), &session).await {
            Ok(Some(current)) => Ok(current),
            Ok(None) => {
                let target = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/");
                if let Err(e) = flash(&session, "info", LOGIN_MESSAGE).await {
                    return Err(e.into_response());
                }
                let location = format!("/login?next={}", urlencoding::encode(target));
                Err(Redirect::to(&location).into_response())
            }
            Err(e) => Err(e.into_response()),
        }
    }
}
