//! svaia Chat
//!
//! 메시지를 받아 미리 정의된 답변 중 하나를 돌려주는 마이크로서비스.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod middleware;
mod responses;

use config::Config;
use error::ChatError;

pub struct AppState {
    pub config: Config,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "svaia_chat=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    if config.debug {
        tracing::warn!("debug mode: requests without an api key are accepted");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = create_router(Arc::new(AppState { config }));

    tracing::info!("Chat listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/chat",
            post(chat).route_layer(from_fn_with_state(
                state.clone(),
                middleware::require_api_key,
            )),
        )
        .route("/api/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(from_fn(middleware::request_id))
        .with_state(state)
}

/// POST /api/chat
async fn chat(Json(request): Json<ChatRequest>) -> Result<Json<ChatResponse>, ChatError> {
    let message = request.message.unwrap_or_default();
    if message.is_empty() {
        return Err(ChatError::BadRequest {
            message: "No se proporcionó ningún mensaje".to_string(),
        });
    }

    Ok(Json(ChatResponse {
        message: responses::pick(),
    }))
}

/// GET /api/health
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "chat-microservice",
    })
}
