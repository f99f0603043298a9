//! /projects 핸들러
//!
//! 일반 사용자는 자신이 소유한 프로젝트만 보고 수정할 수 있습니다.
//! 존재 여부(404)를 권한(403)보다 먼저 확인합니다.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use svaia_core::model::Project;
use svaia_core::permissions::{authorize, project_scope, Action};
use svaia_core::Error;

use super::{missing_fields, provided, MessageResponse};
use crate::db::{NewProject, ProjectChanges, ProjectRow};
use crate::error::Result;
use crate::middleware::{ApiJson, ApiPath, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub descripcion: Option<String>,
    /// 생략 또는 null이면 호출자
    #[serde(default)]
    pub usuario_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub descripcion: Option<String>,
    /// 0은 "변경 없음"
    #[serde(default)]
    pub usuario_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<Project>,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub project: Project,
}

#[derive(Debug, Serialize)]
pub struct ProjectMutationResponse {
    pub message: &'static str,
    pub project: Project,
}

/// GET /projects
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<Json<ProjectListResponse>> {
    authorize(&identity, &Action::ListProjects)?;
    let projects = state.db.list_projects(project_scope(&identity)).await?;
    Ok(Json(ProjectListResponse {
        projects: projects.into_iter().map(ProjectRow::into_project).collect(),
    }))
}

/// POST /projects
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    ApiJson(request): ApiJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectMutationResponse>)> {
    let owner = request.usuario_id.unwrap_or(identity.user_id);

    if !state.db.user_exists(owner).await? {
        return Err(Error::not_found("Usuario no encontrado").into());
    }
    authorize(&identity, &Action::CreateProject { owner })?;

    let Some(nombre) = provided(request.nombre) else {
        return Err(missing_fields(&["nombre"]).into());
    };

    let new_project = NewProject {
        nombre,
        descripcion: request.descripcion,
        usuario_id: owner,
    };
    let created = state
        .db
        .insert_project(&new_project)
        .await
        .map_err(|e| Error::internal(format!("Error al crear proyecto: {e}")))?;

    tracing::info!(project_id = created.id, owner, "project created");
    Ok((
        StatusCode::CREATED,
        Json(ProjectMutationResponse {
            message: "Proyecto creado exitosamente",
            project: created.into_project(),
        }),
    ))
}

/// GET /projects/{project_id}
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    ApiPath(project_id): ApiPath<i64>,
) -> Result<Json<ProjectResponse>> {
    let project = find_project(&state, project_id).await?;
    authorize(
        &identity,
        &Action::ReadProject {
            owner: project.usuario_id,
        },
    )?;

    Ok(Json(ProjectResponse {
        project: project.into_project(),
    }))
}

/// PUT /projects/{project_id}
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    ApiPath(project_id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateProjectRequest>,
) -> Result<Json<ProjectMutationResponse>> {
    let project = find_project(&state, project_id).await?;
    authorize(
        &identity,
        &Action::UpdateProject {
            owner: project.usuario_id,
        },
    )?;

    let new_owner = request.usuario_id.filter(|id| *id != 0);
    if let Some(owner) = new_owner {
        authorize(&identity, &Action::ReassignProject)?;
        if !state.db.user_exists(owner).await? {
            return Err(Error::not_found("Usuario no encontrado").into());
        }
    }

    let changes = ProjectChanges {
        nombre: provided(request.nombre),
        descripcion: provided(request.descripcion),
        usuario_id: new_owner,
    };
    let updated = state
        .db
        .update_project(project_id, &changes)
        .await
        .map_err(|e| Error::internal(format!("Error al actualizar proyecto: {e}")))?;

    tracing::info!(project_id, by = identity.user_id, "project updated");
    Ok(Json(ProjectMutationResponse {
        message: "Proyecto actualizado exitosamente",
        project: updated.into_project(),
    }))
}

/// DELETE /projects/{project_id}
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    ApiPath(project_id): ApiPath<i64>,
) -> Result<Json<MessageResponse>> {
    let project = find_project(&state, project_id).await?;
    authorize(
        &identity,
        &Action::DeleteProject {
            owner: project.usuario_id,
        },
    )?;

    state
        .db
        .delete_project(project_id)
        .await
        .map_err(|e| Error::internal(format!("Error al eliminar proyecto: {e}")))?;

    tracing::info!(project_id, by = identity.user_id, "project deleted");
    Ok(Json(MessageResponse {
        message: "Proyecto eliminado exitosamente",
    }))
}

async fn find_project(state: &AppState, project_id: i64) -> Result<ProjectRow> {
    let project = state
        .db
        .get_project(project_id)
        .await?
        .ok_or_else(|| Error::not_found("Proyecto no encontrado"))?;
    Ok(project)
}
