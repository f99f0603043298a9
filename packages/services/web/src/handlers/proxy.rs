//! 브라우저 스크립트용 JSON 프록시
//!
//! API의 실패 응답은 상태 코드와 본문을 그대로 전달합니다.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use svaia_core::model::Project;

use crate::client::{ProjectMutation, ProjectUpdatePayload, UserMutation, UserUpdatePayload};
use crate::error::{Result, WebError};
use crate::session::CurrentUser;
use crate::state::AppState;

/// 프론트엔드용 사용자 표현 (`username` → `user`)
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i64,
    pub nombre: String,
    pub apellidos: String,
    pub correo: String,
    pub user: String,
    pub is_admin: bool,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ProjectEditRequest {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub descripcion: Option<String>,
}

const USER_EDIT_REQUIRED: [&str; 4] = ["nombre", "apellidos", "correo", "user"];

/// GET /api/usuario/{user_id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(user_id): Path<i64>,
) -> Result<Json<UserView>> {
    let user = state.api.get_user(&current.token, user_id).await?;
    Ok(Json(UserView {
        id: user.id,
        nombre: user.first_name,
        apellidos: user.last_name,
        correo: user.email,
        user: user.username,
        is_admin: user.is_admin,
    }))
}

/// PUT /api/usuario/editar/{user_id}
///
/// 필수 키는 존재 여부만 확인합니다. `contrasena`는 비어 있지 않을 때만 전달합니다.
pub async fn edit_user(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(user_id): Path<i64>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<UserMutation>> {
    let missing: Vec<&str> = USER_EDIT_REQUIRED
        .into_iter()
        .filter(|field| !body.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(WebError::bad_request(format!(
            "Faltan campos requeridos: {}",
            missing.join(", ")
        )));
    }

    let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);
    let changes = UserUpdatePayload {
        nombre: text("nombre"),
        apellidos: text("apellidos"),
        correo: text("correo"),
        username: text("user"),
        password: text("contrasena").filter(|p| !p.is_empty()),
    };

    let updated = state
        .api
        .update_user(&current.token, user_id, &changes)
        .await?;
    Ok(Json(updated))
}

/// DELETE /api/usuario/eliminar/{user_id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(user_id): Path<i64>,
) -> Result<Json<SuccessResponse>> {
    state.api.delete_user(&current.token, user_id).await?;
    Ok(Json(SuccessResponse {
        success: "Usuario eliminado correctamente",
    }))
}

/// GET /api/proyecto/{project_id}
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(project_id): Path<i64>,
) -> Result<Json<Project>> {
    let project = state.api.get_project(&current.token, project_id).await?;
    Ok(Json(project))
}

/// PUT /api/proyecto/editar/{project_id}
pub async fn edit_project(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(project_id): Path<i64>,
    Json(request): Json<ProjectEditRequest>,
) -> Result<Json<ProjectMutation>> {
    let nombre = request.nombre.filter(|v| !v.is_empty());
    let descripcion = request.descripcion.filter(|v| !v.is_empty());
    let (Some(nombre), Some(descripcion)) = (nombre, descripcion) else {
        return Err(WebError::bad_request("Nombre y descripción son obligatorios"));
    };

    let updated = state
        .api
        .update_project(
            &current.token,
            project_id,
            &ProjectUpdatePayload {
                nombre,
                descripcion,
            },
        )
        .await?;
    Ok(Json(updated))
}

/// DELETE /api/proyecto/eliminar/{project_id}
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(project_id): Path<i64>,
) -> Result<Json<SuccessResponse>> {
    state.api.delete_project(&current.token, project_id).await?;
    Ok(Json(SuccessResponse {
        success: "Proyecto eliminado correctamente",
    }))
}
