//! /users 핸들러

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use svaia_core::auth::hash_password;
use svaia_core::model::User;
use svaia_core::permissions::{authorize, Action};
use svaia_core::Error;

use super::{missing_fields, present, provided, MessageResponse};
use crate::db::{NewUser, UserChanges, UserRow};
use crate::error::Result;
use crate::middleware::{ApiJson, ApiPath, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub apellidos: Option<String>,
    #[serde(default)]
    pub correo: Option<String>,
    #[serde(default)]
    pub is_admin: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub apellidos: Option<String>,
    #[serde(default)]
    pub correo: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// 키가 있으면 (null 포함) admin 권한 검사 대상
    #[serde(default, deserialize_with = "present")]
    pub is_admin: Option<Option<bool>>,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UserMutationResponse {
    pub message: &'static str,
    pub user: User,
}

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<Json<UserListResponse>> {
    authorize(&identity, &Action::ListUsers)?;

    let users = state.db.list_users().await?;
    Ok(Json(UserListResponse {
        users: users.into_iter().map(UserRow::into_user).collect(),
    }))
}

/// POST /users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserMutationResponse>)> {
    authorize(&identity, &Action::CreateUser)?;

    let missing: Vec<&str> = [
        ("username", &request.username),
        ("password", &request.password),
        ("nombre", &request.nombre),
        ("apellidos", &request.apellidos),
        ("correo", &request.correo),
    ]
    .into_iter()
    .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
    .map(|(field, _)| field)
    .collect();
    if !missing.is_empty() {
        return Err(missing_fields(&missing).into());
    }

    let (Some(username), Some(password), Some(nombre), Some(apellidos), Some(correo)) = (
        request.username,
        request.password,
        request.nombre,
        request.apellidos,
        request.correo,
    ) else {
        let required = ["username", "password", "nombre", "apellidos", "correo"];
        return Err(missing_fields(&required).into());
    };

    if state.db.get_user_by_username(&username).await?.is_some() {
        return Err(Error::conflict("Usuario con ese nombre de usuario ya existe").into());
    }
    if state.db.get_user_by_email(&correo).await?.is_some() {
        return Err(Error::conflict("Usuario con ese correo ya existe").into());
    }

    let new_user = NewUser {
        nombre,
        apellidos,
        correo,
        username,
        password_hash: hash_password(&password)?,
        is_admin: request.is_admin.unwrap_or(false),
    };

    let created = state
        .db
        .insert_user(&new_user)
        .await
        .map_err(|e| Error::internal(format!("Error al crear usuario: {e}")))?;

    tracing::info!(user_id = created.id, by = identity.user_id, "user created");
    Ok((
        StatusCode::CREATED,
        Json(UserMutationResponse {
            message: "Usuario creado exitosamente",
            user: created.into_user(),
        }),
    ))
}

/// GET /users/{user_id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<UserResponse>> {
    authorize(&identity, &Action::ReadUser { target: user_id })?;

    let user = state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| Error::not_found("Usuario no encontrado"))?;

    Ok(Json(UserResponse {
        user: user.into_user(),
    }))
}

/// PUT /users/{user_id}
///
/// 빈 문자열과 null은 "변경 없음"으로 취급합니다.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    ApiPath(user_id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserMutationResponse>> {
    authorize(&identity, &Action::UpdateUser { target: user_id })?;

    let current = state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| Error::not_found("Usuario no encontrado"))?;

    let username = provided(request.username);
    if let Some(username) = &username {
        if *username != current.username
            && state.db.get_user_by_username(username).await?.is_some()
        {
            return Err(Error::conflict("Nombre de usuario ya está en uso").into());
        }
    }

    let correo = provided(request.correo);
    if let Some(correo) = &correo {
        if *correo != current.correo && state.db.get_user_by_email(correo).await?.is_some() {
            return Err(Error::conflict("Correo ya está en uso").into());
        }
    }

    if request.is_admin.is_some() {
        authorize(&identity, &Action::ChangeAdminFlag)?;
    }

    let password_hash = match provided(request.password) {
        Some(password) => Some(hash_password(&password)?),
        None => None,
    };

    let changes = UserChanges {
        nombre: provided(request.nombre),
        apellidos: provided(request.apellidos),
        correo,
        username,
        password_hash,
        is_admin: request.is_admin.flatten(),
    };

    let updated = state
        .db
        .update_user(user_id, &changes)
        .await
        .map_err(|e| Error::internal(format!("Error al actualizar usuario: {e}")))?;

    tracing::info!(user_id, by = identity.user_id, "user updated");
    Ok(Json(UserMutationResponse {
        message: "Usuario actualizado exitosamente",
        user: updated.into_user(),
    }))
}

/// DELETE /users/{user_id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<MessageResponse>> {
    authorize(&identity, &Action::DeleteUser { target: user_id })?;

    if !state.db.user_exists(user_id).await? {
        return Err(Error::not_found("Usuario no encontrado").into());
    }

    state
        .db
        .delete_user(user_id)
        .await
        .map_err(|e| Error::internal(format!("Error al eliminar usuario: {e}")))?;

    tracing::info!(user_id, by = identity.user_id, "user deleted");
    Ok(Json(MessageResponse {
        message: "Usuario eliminado exitosamente",
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::handlers::test_support::{login, send, test_app};

    fn new_user_body(username: &str) -> serde_json::Value {
        json!({
            "username": username,
            "password": "Secret123!",
            "nombre": "Nuevo",
            "apellidos": "Usuario",
            "correo": format!("{username}@example.com"),
        })
    }

    #[tokio::test]
    async fn test_list_users_admin_only() {
        let (app, _) = test_app().await;
        let admin = login(&app, "admin", "Admin123!").await;
        let user = login(&app, "user", "User123!").await;

        let (status, body) = send(&app, Method::GET, "/users", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["users"].as_array().unwrap().len(), 2);

        let (status, body) = send(&app, Method::GET, "/users", Some(&user), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Se requiere el rol de administrador");
    }

    #[tokio::test]
    async fn test_create_user_and_conflicts() {
        let (app, _) = test_app().await;
        let admin = login(&app, "admin", "Admin123!").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/users",
            Some(&admin),
            Some(new_user_body("maria")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Usuario creado exitosamente");
        assert_eq!(body["user"]["username"], "maria");
        assert_eq!(body["user"]["is_admin"], false);

        let (status, body) = send(
            &app,
            Method::POST,
            "/users",
            Some(&admin),
            Some(new_user_body("maria")),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "Usuario con ese nombre de usuario ya existe");

        let mut same_email = new_user_body("other");
        same_email["correo"] = json!("maria@example.com");
        let (status, body) =
            send(&app, Method::POST, "/users", Some(&admin), Some(same_email)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "Usuario con ese correo ya existe");

        // 새 사용자로 로그인 가능
        login(&app, "maria", "Secret123!").await;
    }

    #[tokio::test]
    async fn test_create_user_missing_fields() {
        let (app, _) = test_app().await;
        let admin = login(&app, "admin", "Admin123!").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/users",
            Some(&admin),
            Some(json!({"username": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Faltan campos requeridos: password, nombre, apellidos, correo"
        );
    }

    #[tokio::test]
    async fn test_create_user_requires_admin() {
        let (app, _) = test_app().await;
        let user = login(&app, "user", "User123!").await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/users",
            Some(&user),
            Some(new_user_body("x")),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_read_self_or_admin() {
        let (app, state) = test_app().await;
        let user = login(&app, "user", "User123!").await;
        let admin_id = state.db.get_user_by_username("admin").await.unwrap().unwrap().id;
        let user_id = state.db.get_user_by_username("user").await.unwrap().unwrap().id;

        let (status, body) =
            send(&app, Method::GET, &format!("/users/{user_id}"), Some(&user), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["id"], user_id);

        let (status, body) =
            send(&app, Method::GET, &format!("/users/{admin_id}"), Some(&user), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Acceso denegado");

        let admin = login(&app, "admin", "Admin123!").await;
        let (status, _) = send(&app, Method::GET, "/users/9999", Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_self_update_cannot_touch_admin_flag() {
        let (app, state) = test_app().await;
        let user = login(&app, "user", "User123!").await;
        let user_id = state.db.get_user_by_username("user").await.unwrap().unwrap().id;
        let uri = format!("/users/{user_id}");

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&user),
            Some(json!({"nombre": "Nuevo", "is_admin": true})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body["message"],
            "No tienes permiso para cambiar el estado de administrador"
        );

        // null도 키가 있으면 검사 대상
        let (status, _) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&user),
            Some(json!({"is_admin": null})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let unchanged = state.db.get_user(user_id).await.unwrap().unwrap();
        assert_eq!(unchanged.nombre, "Usuario");
        assert!(!unchanged.is_admin);

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&user),
            Some(json!({"nombre": "Nuevo", "apellidos": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Usuario actualizado exitosamente");
        assert_eq!(body["user"]["nombre"], "Nuevo");
        assert_eq!(body["user"]["apellidos"], "Normal");
    }

    #[tokio::test]
    async fn test_user_cannot_update_someone_else() {
        let (app, state) = test_app().await;
        let user = login(&app, "user", "User123!").await;
        let admin_id = state.db.get_user_by_username("admin").await.unwrap().unwrap().id;
        let before = state.db.get_user(admin_id).await.unwrap().unwrap();

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/users/{admin_id}"),
            Some(&user),
            Some(json!({"nombre": "Hackeado", "password": "Otra123!"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Acceso denegado");
        assert_eq!(body["code"], "FORBIDDEN");

        let after = state.db.get_user(admin_id).await.unwrap().unwrap();
        assert_eq!(after.nombre, before.nombre);
        assert_eq!(after.password, before.password);
        assert_eq!(after.fecha_modificacion, before.fecha_modificacion);
    }

    #[tokio::test]
    async fn test_admin_promotion_lags_until_new_token() {
        let (app, state) = test_app().await;
        let admin = login(&app, "admin", "Admin123!").await;
        let user = login(&app, "user", "User123!").await;
        let user_id = state.db.get_user_by_username("user").await.unwrap().unwrap().id;

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/users/{user_id}"),
            Some(&admin),
            Some(json!({"is_admin": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["is_admin"], true);

        // 기존 토큰은 발급 시점의 roles 유지
        let (status, _) = send(&app, Method::GET, "/users", Some(&user), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let promoted = login(&app, "user", "User123!").await;
        let (status, _) = send(&app, Method::GET, "/users", Some(&promoted), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_update_username_conflict() {
        let (app, state) = test_app().await;
        let user = login(&app, "user", "User123!").await;
        let user_id = state.db.get_user_by_username("user").await.unwrap().unwrap().id;

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/users/{user_id}"),
            Some(&user),
            Some(json!({"username": "admin"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "Nombre de usuario ya está en uso");
    }

    #[tokio::test]
    async fn test_password_update_rehashes() {
        let (app, state) = test_app().await;
        let user = login(&app, "user", "User123!").await;
        let user_id = state.db.get_user_by_username("user").await.unwrap().unwrap().id;

        let (status, _) = send(
            &app,
            Method::PUT,
            &format!("/users/{user_id}"),
            Some(&user),
            Some(json!({"password": "Changed123!"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"username": "user", "password": "User123!"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        login(&app, "user", "Changed123!").await;
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let (app, state) = test_app().await;
        let admin = login(&app, "admin", "Admin123!").await;
        let user = login(&app, "user", "User123!").await;
        let admin_id = state.db.get_user_by_username("admin").await.unwrap().unwrap().id;
        let user_id = state.db.get_user_by_username("user").await.unwrap().unwrap().id;

        let (status, body) =
            send(&app, Method::DELETE, &format!("/users/{admin_id}"), Some(&admin), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "No puedes eliminar tu propia cuenta");

        let (status, body) =
            send(&app, Method::DELETE, &format!("/users/{user_id}"), Some(&user), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Se requiere el rol de administrador");

        let (status, _) = send(&app, Method::DELETE, "/users/9999", Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) =
            send(&app, Method::DELETE, &format!("/users/{user_id}"), Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Usuario eliminado exitosamente");
        assert!(!state.db.user_exists(user_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_owner_of_projects_fails() {
        let (app, state) = test_app().await;
        let admin = login(&app, "admin", "Admin123!").await;
        let user_id = state.db.get_user_by_username("user").await.unwrap().unwrap().id;

        let (status, _) = send(
            &app,
            Method::POST,
            "/projects",
            Some(&admin),
            Some(json!({"nombre": "Owned", "usuario_id": user_id})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) =
            send(&app, Method::DELETE, &format!("/users/{user_id}"), Some(&admin), None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Error al eliminar usuario"));
        assert!(state.db.user_exists(user_id).await.unwrap());
    }
}
