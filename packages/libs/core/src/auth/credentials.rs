//! 자격 증명 저장소
//!
//! 토큰 발급 시 사용자 조회에 쓰는 최소 인터페이스입니다.
//! API 서비스의 DB가 구현하며, 테스트는 메모리 구현을 주입합니다.

use async_trait::async_trait;

use super::password::verify_password;
use crate::error::{Error, Result};

/// 로그인 검증에 필요한 사용자 정보
#[derive(Debug, Clone)]
pub struct Credential {
    pub user_id: i64,
    pub password_hash: String,
    pub is_admin: bool,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// username으로 자격 증명 조회
    async fn find_credential(&self, username: &str) -> Result<Option<Credential>>;
}

/// username/비밀번호 검증
///
/// 사용자가 없거나 해시가 맞지 않으면 구분 없이 `InvalidCredentials`.
pub async fn authenticate<S>(store: &S, username: &str, password: &str) -> Result<Credential>
where
    S: CredentialStore + ?Sized,
{
    let credential = store
        .find_credential(username)
        .await?
        .ok_or(Error::InvalidCredentials)?;

    if !verify_password(&credential.password_hash, password) {
        tracing::debug!(username, "password mismatch");
        return Err(Error::InvalidCredentials);
    }

    Ok(credential)
}
