//! API 리소스 표현
//!
//! API가 응답하고 Web이 역직렬화하는 User / Project의 JSON 형태입니다.
//! 필드 이름은 기존 클라이언트와의 호환을 위해 스페인어 키를 유지합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::permissions::Role;

/// 사용자
///
/// 비밀번호 해시는 포함하지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    #[serde(rename = "nombre")]
    pub first_name: String,

    #[serde(rename = "apellidos")]
    pub last_name: String,

    #[serde(rename = "correo")]
    pub email: String,

    pub username: String,

    #[serde(default)]
    pub is_admin: bool,

    /// admin 플래그에서 유도된 Role 목록
    #[serde(default)]
    pub roles: Vec<Role>,

    #[serde(rename = "fecha_creacion", default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(rename = "fecha_modificacion", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// 프로젝트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,

    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,

    #[serde(rename = "fecha_creacion", default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(rename = "fecha_modificacion", default)]
    pub updated_at: Option<DateTime<Utc>>,

    /// 소유자 (User.id)
    #[serde(rename = "usuario_id")]
    pub owner_id: i64,
}
