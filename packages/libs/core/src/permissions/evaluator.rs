//! 권한 평가기
//!
//! 호출자 Identity를 작업 요구사항에 대조합니다.

use super::context::Identity;
use super::policy::{Action, Requirement, ADMIN_REQUIRED, SELF_DELETE};
use crate::error::{Error, Result};

/// 프로젝트 조회 범위
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectScope {
    /// 전체 프로젝트 (admin)
    All,

    /// 해당 사용자가 소유한 프로젝트만
    OwnedBy(i64),
}

/// 작업 허용 여부 평가
///
/// 거부 시 작업별 메시지를 담은 `Error::Forbidden`을 반환합니다.
pub fn authorize(identity: &Identity, action: &Action) -> Result<()> {
    let allowed = match action.requirement() {
        Requirement::Authenticated => Ok(()),
        Requirement::Admin => require(identity.is_admin(), action.denial_message()),
        Requirement::SelfOrAdmin(target) => require(
            identity.is_admin() || identity.is(target),
            action.denial_message(),
        ),
        Requirement::AdminNotSelf(target) => require(identity.is_admin(), ADMIN_REQUIRED)
            .and_then(|_| require(!identity.is(target), SELF_DELETE)),
        Requirement::OwnerOrAdmin(owner) => require(
            identity.is_admin() || identity.is(owner),
            action.denial_message(),
        ),
    };

    if let Err(err) = &allowed {
        tracing::warn!(
            user_id = identity.user_id,
            action = action.as_str(),
            "access denied: {}",
            err
        );
    }
    allowed
}

/// 프로젝트 목록 조회 범위 결정
///
/// 비-admin은 거부되지 않고 자신의 프로젝트로 필터링됩니다.
pub fn project_scope(identity: &Identity) -> ProjectScope {
    if identity.is_admin() {
        ProjectScope::All
    } else {
        ProjectScope::OwnedBy(identity.user_id)
    }
}

fn require(condition: bool, message: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::forbidden(message))
    }
}
