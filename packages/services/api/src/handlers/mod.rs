//! API 핸들러

pub mod auth;
pub mod health;
pub mod projects;
pub mod users;

use serde::{Deserialize, Deserializer, Serialize};

/// 메시지만 담은 응답
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// 빈 문자열은 값이 없는 것으로 취급
pub(crate) fn provided(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// 필수 필드 누락 에러
pub(crate) fn missing_fields(fields: &[&str]) -> svaia_core::Error {
    svaia_core::Error::bad_request(format!("Faltan campos requeridos: {}", fields.join(", ")))
}

/// 키가 존재하면 `Some` (값이 null이어도)
///
/// `#[serde(default, deserialize_with = "present")]`와 함께 사용합니다.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::db::tests::memory_db;
    use crate::state::AppState;

    pub(crate) async fn test_app() -> (Router, Arc<AppState>) {
        let db = memory_db().await;
        let state = Arc::new(AppState::with_db(&Config::for_tests(), db).await.unwrap());
        (crate::create_router(state.clone()), state)
    }

    pub(crate) async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub(crate) async fn login(app: &Router, username: &str, password: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/auth/login",
            None,
            Some(serde_json::json!({ "username": username, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }
}
