//! 호출자 컨텍스트
//!
//! 토큰에서 복원된 호출자 정보입니다. 저장소를 다시 조회하지 않으므로
//! 발급 이후의 admin 플래그 변경은 재발급 전까지 반영되지 않습니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 사용자 Role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// 문자열로 변환
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// 문자열에서 파싱
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    /// admin 플래그에서 Role 집합 유도
    ///
    /// admin이면 `["admin", "user"]`, 아니면 `["user"]`.
    pub fn set_for(is_admin: bool) -> Vec<Role> {
        if is_admin {
            vec![Role::Admin, Role::User]
        } else {
            vec![Role::User]
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 인증된 호출자
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// 사용자 ID (토큰 subject)
    pub user_id: i64,

    /// Role 목록
    pub roles: Vec<Role>,
}

impl Identity {
    pub fn new(user_id: i64, roles: Vec<Role>) -> Self {
        Self { user_id, roles }
    }

    #[cfg(test)]
    pub(crate) fn from_flag(user_id: i64, is_admin: bool) -> Self {
        Self::new(user_id, Role::set_for(is_admin))
    }

    /// 특정 role 보유 확인
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// 자기 자신인지 확인
    pub fn is(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}
