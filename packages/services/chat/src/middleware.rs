//! Chat 미들웨어
//!
//! API 키 검사는 `X-API-Key` 헤더를 우선 보고, 없으면 `api_key` 쿼리 파라미터를 봅니다.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::ChatError;
use crate::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// 모든 응답에 `x-request-id` 부여
pub async fn request_id(req: Request, next: Next) -> Response {
    let id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("request", request_id = %id);
    let mut resp = next.run(req).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        resp.headers_mut().insert("x-request-id", value);
    }
    resp
}

pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, ChatError> {
    let presented = presented_key(&req);

    if admits(&state.config.api_key, state.config.debug, presented.as_deref()) {
        Ok(next.run(req).await)
    } else {
        tracing::warn!(path = %req.uri().path(), "rejected chat request without valid api key");
        Err(ChatError::Unauthorized)
    }
}

fn presented_key(req: &Request) -> Option<String> {
    let header = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    header.or_else(|| {
        Query::<HashMap<String, String>>::try_from_uri(req.uri())
            .ok()
            .and_then(|Query(mut params)| params.remove("api_key"))
            .filter(|v| !v.is_empty())
    })
}

/// 디버그 모드에서는 키가 없는 요청을 통과시킵니다. 틀린 키는 항상 거부합니다.
fn admits(expected: &str, debug: bool, presented: Option<&str>) -> bool {
    match presented {
        None => debug,
        Some(key) => key == expected,
    }
}
