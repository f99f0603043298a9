//! svaia Web
//!
//! 쿠키 세션 기반 프론트엔드. 로그인 시 받은 API 토큰을 세션에 보관하고,
//! 모든 데이터 요청을 API/Chat 서비스로 전달합니다.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware::from_fn,
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod client;
mod config;
mod error;
mod handlers;
mod middleware;
mod session;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "svaia_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 설정 로드
    let config = Config::from_env()?;
    tracing::info!(
        api_url = %config.api_url,
        chat_url = %config.chat_url,
        session_secure = config.session_secure,
        "Starting Web"
    );

    let state = Arc::new(AppState::new(&config)?);

    // 세션 저장소
    let pool = session::session_pool(&config.session_db_url).await?;
    let store = session::session_store(pool).await?;
    let cleanup = session::spawn_expired_cleanup(store.clone(), config.session_cleanup_secs);
    let app = create_router(state, session::session_layer(store, &config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Web listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    cleanup.abort();
    Ok(())
}

/// 라우터 생성
fn create_router(state: Arc<AppState>, sessions: SessionManagerLayer<SqliteStore>) -> Router {
    use handlers::{messages, pages, proxy};

    Router::new()
        // Pages
        .route("/", get(pages::index))
        .route("/login", get(pages::login_page).post(pages::login_submit))
        .route("/logout", get(pages::logout))
        .route("/usuarios", get(pages::usuarios))
        .route("/usuario/nuevo", post(pages::usuario_nuevo))
        .route("/chat", get(pages::chat))
        .route("/proyecto/nuevo", post(pages::proyecto_nuevo))
        // Chat
        .route("/send-message", post(messages::send_message))
        .route(
            "/api/proyecto/{project_id}/mensajes",
            get(messages::project_messages),
        )
        .route("/api/mensaje", post(messages::save_message))
        // JSON proxy
        .route("/api/usuario/{user_id}", get(proxy::get_user))
        .route("/api/usuario/editar/{user_id}", put(proxy::edit_user))
        .route("/api/usuario/eliminar/{user_id}", delete(proxy::delete_user))
        .route("/api/proyecto/{project_id}", get(proxy::get_project))
        .route("/api/proyecto/editar/{project_id}", put(proxy::edit_project))
        .route(
            "/api/proyecto/eliminar/{project_id}",
            delete(proxy::delete_project),
        )
        // Health check
        .route("/health", get(handlers::health_check))
        // Middleware
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(middleware::request_id))
        // State
        .with_state(state)
}
