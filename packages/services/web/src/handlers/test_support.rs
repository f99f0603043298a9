//! 핸들러 테스트용 가짜 클라이언트와 쿠키를 유지하는 요청 헬퍼

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use svaia_core::model::{Project, User};
use svaia_core::permissions::Role;
use tower::ServiceExt;
use tower_sessions_sqlx_store::SqliteStore;

use crate::client::{
    ApiClient, ChatClient, ChatReply, ClientError, ClientResult, LoginResult, NewProjectPayload,
    NewUserPayload, ProjectMutation, ProjectUpdatePayload, UserMutation, UserUpdatePayload,
};
use crate::config::Config;
use crate::session::{session_layer, session_pool, session_store};
use crate::state::AppState;

fn api_error(status: u16, message: &str) -> ClientError {
    ClientError::Api {
        status,
        body: json!({ "message": message }),
    }
}

fn unavailable() -> ClientError {
    ClientError::Unavailable {
        message: "connection refused".to_string(),
    }
}

fn make_user(id: i64, username: &str, is_admin: bool) -> User {
    User {
        id,
        first_name: username.to_string(),
        last_name: "Normal".to_string(),
        email: format!("{username}@example.com"),
        username: username.to_string(),
        is_admin,
        roles: Role::set_for(is_admin),
        created_at: None,
        updated_at: None,
    }
}

/// 토큰 형식은 `token-<user id>`
#[derive(Default)]
pub(crate) struct FakeApi {
    users: Mutex<Vec<User>>,
    passwords: Mutex<Vec<(String, String)>>,
    projects: Mutex<Vec<Project>>,
    password_changes: Mutex<Vec<String>>,
    down: AtomicBool,
    projects_down: AtomicBool,
}

impl FakeApi {
    pub(crate) fn seeded() -> Self {
        let api = Self::default();
        api.add_user(make_user(1, "admin", true), "Admin123!");
        api.add_user(make_user(2, "user", false), "User123!");
        api
    }

    fn add_user(&self, user: User, password: &str) {
        self.passwords
            .lock()
            .unwrap()
            .push((user.username.clone(), password.to_string()));
        self.users.lock().unwrap().push(user);
    }

    pub(crate) fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub(crate) fn fail_projects(&self, down: bool) {
        self.projects_down.store(down, Ordering::SeqCst);
    }

    pub(crate) fn user_by_name(&self, username: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }

    pub(crate) fn last_password_change(&self) -> Option<String> {
        self.password_changes.lock().unwrap().last().cloned()
    }

    fn check_up(&self) -> ClientResult<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    fn check_projects_up(&self) -> ClientResult<()> {
        self.check_up()?;
        if self.projects_down.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    fn caller(&self, token: &str) -> ClientResult<User> {
        let id: i64 = token
            .strip_prefix("token-")
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| api_error(401, "invalid token"))?;
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| api_error(401, "invalid token"))
    }

    fn owned_project(&self, token: &str, project_id: i64, denial: &str) -> ClientResult<Project> {
        let caller = self.caller(token)?;
        let project = self
            .projects
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == project_id)
            .cloned()
            .ok_or_else(|| api_error(404, "Proyecto no encontrado"))?;
        if !caller.is_admin && caller.id != project.owner_id {
            return Err(api_error(403, denial));
        }
        Ok(project)
    }
}

#[async_trait]
impl ApiClient for FakeApi {
    async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResult> {
        self.check_up()?;
        let matches = self
            .passwords
            .lock()
            .unwrap()
            .iter()
            .any(|(u, p)| u == username && p == password);
        if !matches {
            return Err(api_error(401, "Credenciales inválidas"));
        }
        let user = self
            .user_by_name(username)
            .ok_or_else(|| api_error(401, "Credenciales inválidas"))?;
        Ok(LoginResult {
            access_token: format!("token-{}", user.id),
            user,
        })
    }

    async fn get_user(&self, token: &str, user_id: i64) -> ClientResult<User> {
        self.check_up()?;
        let caller = self.caller(token)?;
        if !caller.is_admin && caller.id != user_id {
            return Err(api_error(403, "Acceso denegado"));
        }
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| api_error(404, "Usuario no encontrado"))
    }

    async fn list_users(&self, token: &str) -> ClientResult<Vec<User>> {
        self.check_up()?;
        if !self.caller(token)?.is_admin {
            return Err(api_error(403, "Se requiere el rol de administrador"));
        }
        Ok(self.users.lock().unwrap().clone())
    }

    async fn create_user(&self, token: &str, user: &NewUserPayload) -> ClientResult<User> {
        self.check_up()?;
        if !self.caller(token)?.is_admin {
            return Err(api_error(403, "Se requiere el rol de administrador"));
        }
        if self.user_by_name(&user.username).is_some() {
            return Err(api_error(409, "Usuario con ese nombre de usuario ya existe"));
        }
        let id = self.users.lock().unwrap().len() as i64 + 1;
        let created = make_user(id, &user.username, user.is_admin);
        self.add_user(created.clone(), &user.password);
        Ok(created)
    }

    async fn update_user(
        &self,
        token: &str,
        user_id: i64,
        changes: &UserUpdatePayload,
    ) -> ClientResult<UserMutation> {
        let mut user = self.get_user(token, user_id).await?;
        if let Some(nombre) = changes.nombre.clone().filter(|v| !v.is_empty()) {
            user.first_name = nombre;
        }
        if let Some(password) = &changes.password {
            self.password_changes.lock().unwrap().push(password.clone());
        }
        let mut users = self.users.lock().unwrap();
        if let Some(stored) = users.iter_mut().find(|u| u.id == user_id) {
            *stored = user.clone();
        }
        Ok(UserMutation {
            message: "Usuario actualizado exitosamente".to_string(),
            user,
        })
    }

    async fn delete_user(&self, token: &str, user_id: i64) -> ClientResult<()> {
        self.check_up()?;
        let caller = self.caller(token)?;
        if !caller.is_admin {
            return Err(api_error(403, "Se requiere el rol de administrador"));
        }
        if caller.id == user_id {
            return Err(api_error(403, "No puedes eliminar tu propia cuenta"));
        }
        self.users.lock().unwrap().retain(|u| u.id != user_id);
        Ok(())
    }

    async fn list_projects(&self, token: &str) -> ClientResult<Vec<Project>> {
        self.check_projects_up()?;
        let caller = self.caller(token)?;
        Ok(self
            .projects
            .lock()
            .unwrap()
            .iter()
            .filter(|p| caller.is_admin || p.owner_id == caller.id)
            .cloned()
            .collect())
    }

    async fn create_project(
        &self,
        token: &str,
        project: &NewProjectPayload,
    ) -> ClientResult<Project> {
        self.check_projects_up()?;
        let caller = self.caller(token)?;
        if !caller.is_admin && caller.id != project.usuario_id {
            return Err(api_error(
                403,
                "No tienes permiso para crear proyectos para otros usuarios",
            ));
        }
        let mut projects = self.projects.lock().unwrap();
        let created = Project {
            id: projects.len() as i64 + 1,
            name: project.nombre.clone(),
            description: Some(project.descripcion.clone()),
            created_at: None,
            updated_at: None,
            owner_id: project.usuario_id,
        };
        projects.push(created.clone());
        Ok(created)
    }

    async fn get_project(&self, token: &str, project_id: i64) -> ClientResult<Project> {
        self.check_projects_up()?;
        self.owned_project(token, project_id, "No tienes acceso a este proyecto")
    }

    async fn update_project(
        &self,
        token: &str,
        project_id: i64,
        changes: &ProjectUpdatePayload,
    ) -> ClientResult<ProjectMutation> {
        self.check_projects_up()?;
        let mut project =
            self.owned_project(token, project_id, "No tienes permiso para editar este proyecto")?;
        project.name = changes.nombre.clone();
        project.description = Some(changes.descripcion.clone());
        let mut projects = self.projects.lock().unwrap();
        if let Some(stored) = projects.iter_mut().find(|p| p.id == project_id) {
            *stored = project.clone();
        }
        Ok(ProjectMutation {
            message: "Proyecto actualizado exitosamente".to_string(),
            project,
        })
    }

    async fn delete_project(&self, token: &str, project_id: i64) -> ClientResult<()> {
        self.check_projects_up()?;
        self.owned_project(token, project_id, "No tienes permiso para eliminar este proyecto")?;
        self.projects.lock().unwrap().retain(|p| p.id != project_id);
        Ok(())
    }
}

pub(crate) struct FakeChat {
    down: bool,
}

impl FakeChat {
    pub(crate) const REPLY: &'static str = "¡Hola! ¿En qué puedo ayudarte hoy?";

    pub(crate) fn up() -> Self {
        Self { down: false }
    }

    pub(crate) fn down() -> Self {
        Self { down: true }
    }
}

#[async_trait]
impl ChatClient for FakeChat {
    async fn send_message(&self, _message: &str) -> ClientResult<ChatReply> {
        if self.down {
            return Err(unavailable());
        }
        Ok(ChatReply {
            message: Self::REPLY.to_string(),
        })
    }
}

fn test_config() -> Config {
    Config {
        port: 0,
        api_url: "http://api.invalid".to_string(),
        chat_url: "http://chat.invalid".to_string(),
        chat_api_key: "test-key".to_string(),
        http_connect_timeout_secs: 1,
        http_timeout_secs: 1,
        session_ttl_secs: 3600,
        session_secure: false,
        session_db_url: "sqlite::memory:".to_string(),
        session_cleanup_secs: 60,
    }
}

/// 세션 쿠키를 유지하며 요청을 보내는 클라이언트
pub(crate) struct TestClient {
    pub(crate) api: Arc<FakeApi>,
    pub(crate) sessions: SqliteStore,
    pub(crate) session_pool: SqlitePool,
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    pub(crate) async fn new(api: FakeApi) -> Self {
        Self::with_chat(api, FakeChat::up()).await
    }

    pub(crate) async fn with_chat(api: FakeApi, chat: FakeChat) -> Self {
        let config = test_config();
        let session_pool = session_pool(&config.session_db_url).await.unwrap();
        let sessions = session_store(session_pool.clone()).await.unwrap();

        let api = Arc::new(api);
        let state = Arc::new(AppState {
            api: api.clone(),
            chat: Arc::new(chat),
        });
        let app = crate::create_router(state, session_layer(sessions.clone(), &config));
        Self {
            api,
            sessions,
            session_pool,
            app,
            cookie: None,
        }
    }

    pub(crate) fn clear_cookie(&mut self) {
        self.cookie = None;
    }

    async fn send(&mut self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();

        if let Some(set_cookie) = headers.get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .to_string();
            self.cookie = Some(pair);
        }

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, body)
    }

    fn builder(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    pub(crate) async fn get(&mut self, uri: &str) -> (StatusCode, HeaderMap, Value) {
        let request = self.builder("GET", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub(crate) async fn post_form(
        &mut self,
        uri: &str,
        form: &str,
    ) -> (StatusCode, HeaderMap, Value) {
        let request = self
            .builder("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub(crate) async fn send_json(
        &mut self,
        method: &str,
        uri: &str,
        body: Value,
    ) -> (StatusCode, HeaderMap, Value) {
        let request = self
            .builder(method, uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub(crate) async fn login(&mut self, username: &str, password: &str) {
        let form = format!(
            "username={}&password={}",
            urlencoding::encode(username),
            urlencoding::encode(password)
        );
        let (status, _, _) = self.post_form("/login", &form).await;
        assert_eq!(status, StatusCode::SEE_OTHER, "login failed for {username}");
    }
}
