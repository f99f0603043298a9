//! 토큰 Claims
//!
//! Access Token의 페이로드 구조입니다.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Access Token Claims (PASETO v4.local 페이로드)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (User.id)
    pub sub: i64,

    /// Role 목록 (문자열, 검증 시 `Role`로 파싱)
    pub roles: Vec<String>,

    /// 발급 시각
    pub iat: DateTime<Utc>,

    /// Access 만료 시각
    pub exp: DateTime<Utc>,

    /// Refresh 가능 마감 시각 (갱신해도 연장되지 않음)
    pub rf_exp: DateTime<Utc>,

    /// Token ID
    pub jti: String,
}

impl AccessTokenClaims {
    /// 새 claims 생성
    pub fn new(sub: i64, roles: Vec<String>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub,
            roles,
            iat: now,
            exp: now + access_ttl,
            rf_exp: now + refresh_ttl,
            jti: ulid::Ulid::new().to_string(),
        }
    }

    /// 갱신된 claims
    ///
    /// subject/roles/refresh 마감은 그대로, access 만료만 새로 계산합니다.
    /// 새 만료 시각은 refresh 마감을 넘지 않습니다.
    pub fn renewed(&self, access_ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: self.sub,
            roles: self.roles.clone(),
            iat: now,
            exp: (now + access_ttl).min(self.rf_exp),
            rf_exp: self.rf_exp,
            jti: ulid::Ulid::new().to_string(),
        }
    }

    /// 만료 여부 확인
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.exp
    }

    /// refresh 마감 경과 여부
    pub fn is_refresh_expired(&self) -> bool {
        Utc::now() > self.rf_exp
    }
}
