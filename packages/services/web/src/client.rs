//! 서비스 클라이언트
//!
//! Web은 데이터를 직접 갖지 않고 API/Chat 서비스를 호출합니다.
//! 트레이트 뒤에 두어 핸들러 테스트에서 가짜 구현으로 바꿔 끼울 수 있습니다.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use svaia_core::model::{Project, User};

/// 클라이언트 에러
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// 서비스가 2xx가 아닌 응답을 반환
    #[error("service returned {status}")]
    Api { status: u16, body: Value },

    /// 연결 실패, 타임아웃 등 전송 계층 실패
    #[error("{message}")]
    Unavailable { message: String },

    /// 성공 응답의 본문을 해석할 수 없음
    #[error("unexpected response: {message}")]
    Unexpected { message: String },
}

impl ClientError {
    /// 서비스가 돌려준 `message` 필드
    pub fn service_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { body, .. } => body.get("message").and_then(Value::as_str),
            _ => None,
        }
    }

    /// 사용자에게 보여줄 문구
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { .. } => self
                .service_message()
                .unwrap_or("Error desconocido")
                .to_string(),
            ClientError::Unavailable { message } => {
                format!("Error al conectar con el servicio: {message}")
            }
            ClientError::Unexpected { message } => {
                format!("Error al conectar con el servicio: {message}")
            }
        }
    }

    pub fn is_status(&self, code: u16) -> bool {
        matches!(self, ClientError::Api { status, .. } if *status == code)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Unavailable {
            message: e.to_string(),
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

// ─────────────────────────────────────────────────────────────────────────────
// Payloads
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResult {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUserPayload {
    pub username: String,
    pub nombre: String,
    pub apellidos: String,
    pub correo: String,
    pub password: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdatePayload {
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub correo: Option<String>,
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProjectPayload {
    pub nombre: String,
    pub descripcion: String,
    pub usuario_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectUpdatePayload {
    pub nombre: String,
    pub descripcion: String,
}

/// 변경 응답 `{message, user}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMutation {
    pub message: String,
    pub user: User,
}

/// 변경 응답 `{message, project}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMutation {
    pub message: String,
    pub project: Project,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: User,
}

#[derive(Deserialize)]
struct UsersEnvelope {
    users: Vec<User>,
}

#[derive(Deserialize)]
struct ProjectEnvelope {
    project: Project,
}

#[derive(Deserialize)]
struct ProjectsEnvelope {
    projects: Vec<Project>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Traits
// ─────────────────────────────────────────────────────────────────────────────

/// API 서비스 호출
///
/// `token`은 세션에 저장된 access token입니다.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResult>;

    async fn get_user(&self, token: &str, user_id: i64) -> ClientResult<User>;

    async fn list_users(&self, token: &str) -> ClientResult<Vec<User>>;

    async fn create_user(&self, token: &str, user: &NewUserPayload) -> ClientResult<User>;

    async fn update_user(
        &self,
        token: &str,
        user_id: i64,
        changes: &UserUpdatePayload,
    ) -> ClientResult<UserMutation>;

    async fn delete_user(&self, token: &str, user_id: i64) -> ClientResult<()>;

    async fn list_projects(&self, token: &str) -> ClientResult<Vec<Project>>;

    async fn create_project(&self, token: &str, project: &NewProjectPayload)
        -> ClientResult<Project>;

    async fn get_project(&self, token: &str, project_id: i64) -> ClientResult<Project>;

    async fn update_project(
        &self,
        token: &str,
        project_id: i64,
        changes: &ProjectUpdatePayload,
    ) -> ClientResult<ProjectMutation>;

    async fn delete_project(&self, token: &str, project_id: i64) -> ClientResult<()>;
}

/// Chat 서비스 호출
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send_message(&self, message: &str) -> ClientResult<ChatReply>;
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP implementations
// ─────────────────────────────────────────────────────────────────────────────

fn build_http(connect_timeout: Duration, timeout: Duration) -> ClientResult<Client> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(timeout)
        .build()
        .map_err(ClientError::from)
}

/// 요청을 보내고 2xx 본문을 `T`로 해석
async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> ClientResult<T> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        return Err(ClientError::Api {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::Unexpected {
            message: e.to_string(),
        })
}

/// reqwest 기반 API 클라이언트
pub struct HttpApiClient {
    http: Client,
    base_url: String,
}

impl HttpApiClient {
    pub fn new(base_url: &str, connect_timeout: Duration, timeout: Duration) -> ClientResult<Self> {
        Ok(Self {
            http: build_http(connect_timeout, timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResult> {
        #[derive(Serialize)]
        struct LoginRequest<'a> {
            username: &'a str,
            password: &'a str,
        }

        send_json(
            self.http
                .post(self.url("/auth/login"))
                .json(&LoginRequest { username, password }),
        )
        .await
    }

    async fn get_user(&self, token: &str, user_id: i64) -> ClientResult<User> {
        let envelope: UserEnvelope = send_json(
            self.http
                .get(self.url(&format!("/users/{user_id}")))
                .bearer_auth(token),
        )
        .await?;
        Ok(envelope.user)
    }

    async fn list_users(&self, token: &str) -> ClientResult<Vec<User>> {
        let envelope: UsersEnvelope =
            send_json(self.http.get(self.url("/users")).bearer_auth(token)).await?;
        Ok(envelope.users)
    }

    async fn create_user(&self, token: &str, user: &NewUserPayload) -> ClientResult<User> {
        let envelope: UserEnvelope = send_json(
            self.http
                .post(self.url("/users"))
                .bearer_auth(token)
                .json(user),
        )
        .await?;
        Ok(envelope.user)
    }

    async fn update_user(
        &self,
        token: &str,
        user_id: i64,
        changes: &UserUpdatePayload,
    ) -> ClientResult<UserMutation> {
        send_json(
            self.http
                .put(self.url(&format!("/users/{user_id}")))
                .bearer_auth(token)
                .json(changes),
        )
        .await
    }

    async fn delete_user(&self, token: &str, user_id: i64) -> ClientResult<()> {
        let _: Value = send_json(
            self.http
                .delete(self.url(&format!("/users/{user_id}")))
                .bearer_auth(token),
        )
        .await?;
        Ok(())
    }

    async fn list_projects(&self, token: &str) -> ClientResult<Vec<Project>> {
        let envelope: ProjectsEnvelope =
            send_json(self.http.get(self.url("/projects")).bearer_auth(token)).await?;
        Ok(envelope.projects)
    }

    async fn create_project(
        &self,
        token: &str,
        project: &NewProjectPayload,
    ) -> ClientResult<Project> {
        let envelope: ProjectEnvelope = send_json(
            self.http
                .post(self.url("/projects"))
                .bearer_auth(token)
                .json(project),
        )
        .await?;
        Ok(envelope.project)
    }

    async fn get_project(&self, token: &str, project_id: i64) -> ClientResult<Project> {
        let envelope: ProjectEnvelope = send_json(
            self.http
                .get(self.url(&format!("/projects/{project_id}")))
                .bearer_auth(token),
        )
        .await?;
        Ok(envelope.project)
    }

    async fn update_project(
        &self,
        token: &str,
        project_id: i64,
        changes: &ProjectUpdatePayload,
    ) -> ClientResult<ProjectMutation> {
        send_json(
            self.http
                .put(self.url(&format!("/projects/{project_id}")))
                .bearer_auth(token)
                .json(changes),
        )
        .await
    }

    async fn delete_project(&self, token: &str, project_id: i64) -> ClientResult<()> {
        let _: Value = send_json(
            self.http
                .delete(self.url(&format!("/projects/{project_id}")))
                .bearer_auth(token),
        )
        .await?;
        Ok(())
    }
}

/// reqwest 기반 Chat 클라이언트
pub struct HttpChatClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl HttpChatClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        connect_timeout: Duration,
        timeout: Duration,
    ) -> ClientResult<Self> {
        Ok(Self {
            http: build_http(connect_timeout, timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn send_message(&self, message: &str) -> ClientResult<ChatReply> {
        #[derive(Serialize)]
        struct ChatRequest<'a> {
            message: &'a str,
        }

        send_json(
            self.http
                .post(format!("{}/api/chat", self.base_url))
                .header("X-API-Key", &self.api_key)
                .json(&ChatRequest { message }),
        )
        .await
    }
}
