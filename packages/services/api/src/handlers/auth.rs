//! /auth 핸들러
//!
//! 로그인(토큰 발급), 토큰 갱신, 토큰 확인.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use svaia_core::model::User;
use svaia_core::Error;

use super::provided;
use crate::error::Result;
use crate::middleware::{ApiJson, AuthUser, BearerToken};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthTestResponse {
    pub message: &'static str,
    pub user: User,
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (Some(username), Some(password)) = (provided(request.username), provided(request.password))
    else {
        return Err(Error::bad_request("Se requiere nombre de usuario y contraseña").into());
    };

    let issued = state
        .tokens
        .issue(&state.db, &username, &password)
        .await
        .inspect_err(|e| {
            if matches!(e, Error::InvalidCredentials) {
                tracing::info!(username = %username, "login rejected");
            }
        })?;

    let user = state
        .db
        .get_user(issued.claims.sub)
        .await?
        .ok_or_else(|| Error::not_found("Usuario no encontrado"))?;

    tracing::info!(user_id = user.id, "login succeeded");
    Ok(Json(LoginResponse {
        message: "Login exitoso",
        access_token: issued.token,
        user: user.into_user(),
    }))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
) -> Result<Json<RefreshResponse>> {
    let issued = state.tokens.refresh(&token)?;
    Ok(Json(RefreshResponse {
        access_token: issued.token,
    }))
}

/// GET /auth/test
pub async fn auth_test(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<Json<AuthTestResponse>> {
    let user = state
        .db
        .get_user(identity.user_id)
        .await?
        .ok_or_else(|| Error::not_found("Usuario no encontrado"))?;

    Ok(Json(AuthTestResponse {
        message: "Autenticado correctamente",
        user: user.into_user(),
    }))
}
