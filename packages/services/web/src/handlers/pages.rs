//! 페이지 라우트 (폼 제출 포함)

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use svaia_core::model::{Project, User};
use tower_sessions::Session;

use super::{render, PageView};
use crate::client::{ClientError, NewProjectPayload, NewUserPayload};
use crate::error::Result;
use crate::session::{flash, load_user, safe_next, sign_in, sign_out, CurrentUser};
use crate::state::AppState;

const DANGER: &str = "danger";
const SUCCESS: &str = "success";

#[derive(Debug, Serialize)]
pub struct IndexData {
    pub user: Option<User>,
}

#[derive(Debug, Serialize)]
pub struct LoginData {}

#[derive(Debug, Serialize)]
pub struct UsersData {
    pub user: User,
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct ChatData {
    pub user: User,
    pub proyectos: Vec<Project>,
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct NewUserForm {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub apellidos: String,
    #[serde(default)]
    pub correo: String,
    #[serde(default)]
    pub contrasena: String,
}

#[derive(Debug, Deserialize)]
pub struct NewProjectForm {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub project_description: String,
}

async fn flash_redirect(
    session: &Session,
    category: &str,
    message: String,
    to: &str,
) -> Result<Response> {
    flash(session, category, message).await?;
    Ok(Redirect::to(to).into_response())
}

/// GET /
pub async fn index(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<PageView<IndexData>>> {
    let current = load_user(state.api.as_ref(), &session).await?;
    render(
        &session,
        "index",
        IndexData {
            user: current.map(|c| c.user),
        },
    )
    .await
}

/// GET /login
pub async fn login_page(State(state): State<Arc<AppState>>, session: Session) -> Result<Response> {
    if load_user(state.api.as_ref(), &session).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(render(&session, "login", LoginData {}).await?.into_response())
}

/// POST /login
pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    if load_user(state.api.as_ref(), &session).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    match state.api.login(&form.username, &form.password).await {
        Ok(result) => {
            sign_in(&session, &result.access_token, result.user.id).await?;
            tracing::info!(user_id = result.user.id, "web login");
            Ok(Redirect::to(safe_next(query.next.as_deref())).into_response())
        }
        Err(ClientError::Api { .. }) => {
            flash(&session, DANGER, "Nombre de usuario o contraseña incorrectos").await?;
            Ok(render(&session, "login", LoginData {}).await?.into_response())
        }
        Err(e) => {
            flash(&session, DANGER, e.user_message()).await?;
            Ok(render(&session, "login", LoginData {}).await?.into_response())
        }
    }
}

/// GET /logout
pub async fn logout(current: CurrentUser, session: Session) -> Result<Response> {
    sign_out(&session).await?;
    tracing::info!(user_id = current.user.id, "web logout");
    Ok(Redirect::to("/login").into_response())
}

/// GET /usuarios
pub async fn usuarios(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    session: Session,
) -> Result<Response> {
    match state.api.list_users(&current.token).await {
        Ok(users) => {
            let data = UsersData {
                user: current.user,
                users,
            };
            Ok(render(&session, "usuarios", data).await?.into_response())
        }
        Err(e) if e.is_status(403) => {
            flash_redirect(
                &session,
                DANGER,
                "No tienes permisos para ver la lista de usuarios".to_string(),
                "/",
            )
            .await
        }
        Err(ClientError::Api { .. }) => {
            flash_redirect(&session, DANGER, "Error al obtener usuarios".to_string(), "/").await
        }
        Err(e) => flash_redirect(&session, DANGER, e.user_message(), "/").await,
    }
}

/// POST /usuario/nuevo
///
/// 새 사용자는 항상 일반 사용자로 생성됩니다.
pub async fn usuario_nuevo(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    session: Session,
    Form(form): Form<NewUserForm>,
) -> Result<Response> {
    let fields = [
        &form.user,
        &form.nombre,
        &form.apellidos,
        &form.correo,
        &form.contrasena,
    ];
    if fields.iter().any(|f| f.is_empty()) {
        return flash_redirect(
            &session,
            DANGER,
            "Por favor complete todos los campos".to_string(),
            "/usuarios",
        )
        .await;
    }

    let payload = NewUserPayload {
        username: form.user,
        nombre: form.nombre,
        apellidos: form.apellidos,
        correo: form.correo,
        password: form.contrasena,
        is_admin: false,
    };

    let (category, message) = match state.api.create_user(&current.token, &payload).await {
        Ok(_) => (SUCCESS, "Usuario creado exitosamente".to_string()),
        Err(e @ ClientError::Api { .. }) => {
            (DANGER, format!("Error al crear usuario: {}", e.user_message()))
        }
        Err(e) => (DANGER, e.user_message()),
    };
    flash_redirect(&session, category, message, "/usuarios").await
}

/// GET /chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    session: Session,
) -> Result<Response> {
    match state.api.list_projects(&current.token).await {
        Ok(proyectos) => {
            let data = ChatData {
                user: current.user,
                proyectos,
            };
            Ok(render(&session, "chat", data).await?.into_response())
        }
        Err(ClientError::Api { .. }) => {
            flash_redirect(&session, DANGER, "Error al obtener proyectos".to_string(), "/").await
        }
        Err(e) => flash_redirect(&session, DANGER, e.user_message(), "/").await,
    }
}

/// POST /proyecto/nuevo
///
/// 소유자는 항상 현재 사용자입니다.
pub async fn proyecto_nuevo(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    session: Session,
    Form(form): Form<NewProjectForm>,
) -> Result<Response> {
    if form.project_name.is_empty() || form.project_description.is_empty() {
        return flash_redirect(
            &session,
            DANGER,
            "Por favor complete todos los campos".to_string(),
            "/chat",
        )
        .await;
    }

    let payload = NewProjectPayload {
        nombre: form.project_name,
        descripcion: form.project_description,
        usuario_id: current.user.id,
    };

    let (category, message) = match state.api.create_project(&current.token, &payload).await {
        Ok(_) => (SUCCESS, "Proyecto creado exitosamente".to_string()),
        Err(e @ ClientError::Api { .. }) => {
            (DANGER, format!("Error al crear proyecto: {}", e.user_message()))
        }
        Err(e) => (DANGER, e.user_message()),
    };
    flash_redirect(&session, category, message, "/chat").await
}
