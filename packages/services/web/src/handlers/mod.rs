//! Web 핸들러
//!
//! HTML 렌더링 대신 페이지 라우트는 `{page, flashes, ...}` JSON 뷰 모델을 반환합니다.

pub mod messages;
pub mod pages;
pub mod proxy;

use axum::Json;
use serde::Serialize;
use tower_sessions::Session;

use crate::error::Result;
use crate::session::{take_flashes, Flash};

/// 페이지 뷰 모델
#[derive(Debug, Serialize)]
pub struct PageView<T: Serialize> {
    pub page: &'static str,
    pub flashes: Vec<Flash>,
    #[serde(flatten)]
    pub data: T,
}

/// 쌓인 flash를 꺼내 뷰 모델 생성
pub(crate) async fn render<T: Serialize>(
    session: &Session,
    page: &'static str,
    data: T,
) -> Result<Json<PageView<T>>> {
    let flashes = take_flashes(session).await?;
    Ok(Json(PageView {
        page,
        flashes,
        data,
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "web",
    })
}

#[cfg(test)]
pub(crate) mod test_support;
