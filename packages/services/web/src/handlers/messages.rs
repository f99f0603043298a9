//! 채팅 메시지 라우트

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::ClientError;
use crate::session::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SaveMessageResponse {
    pub success: bool,
    pub message: &'static str,
}

/// POST /send-message
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    _current: CurrentUser,
    Json(request): Json<SendMessageRequest>,
) -> Response {
    match state.chat.send_message(&request.message).await {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => {
            tracing::warn!("chat service call failed: {}", e);
            let message = match e {
                ClientError::Api { .. } => "Error al enviar mensaje al servicio de chat",
                _ => "Error de conexión al servicio de chat",
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(MessageBody { message })).into_response()
        }
    }
}

/// GET /api/proyecto/{project_id}/mensajes
///
/// 메시지 저장소가 없어 항상 빈 목록입니다.
pub async fn project_messages(
    _current: CurrentUser,
    Path(_project_id): Path<i64>,
) -> Json<Vec<Value>> {
    Json(Vec::new())
}

/// POST /api/mensaje
pub async fn save_message(
    _current: CurrentUser,
    Json(_body): Json<Value>,
) -> Json<SaveMessageResponse> {
    Json(SaveMessageResponse {
        success: true,
        message: "Mensaje guardado correctamente",
    })
}
