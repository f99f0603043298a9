//! 토큰 발급, 검증, 갱신
//!
//! API 서비스가 로그인 시 토큰을 발급하고, 모든 보호된 요청에서 검증합니다.

use base64::{engine::general_purpose, Engine as _};
use chrono::Duration;
use rand::RngCore;
use rusty_paseto::prelude::*;

use super::claims::AccessTokenClaims;
use super::credentials::{authenticate, CredentialStore};
use crate::error::{Error, Result};
use crate::permissions::{Identity, Role};

/// 발급된 토큰
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// 직렬화된 PASETO 토큰
    pub token: String,

    /// 토큰에 담긴 claims
    pub claims: AccessTokenClaims,
}

/// 토큰 서비스
///
/// 프로세스 단위 비밀키와 TTL을 생성 시 주입받습니다.
pub struct TokenService {
    key: [u8; 32],
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// 새 서비스 생성
    ///
    /// `secret`은 32바이트 키 재료여야 합니다 (hex 64자, base64/base64url, 또는 32바이트 문자열).
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Result<Self> {
        let key = parse_key_material(secret).ok_or_else(|| {
            Error::internal("secret key must be 32 bytes (hex, base64 or raw)")
        })?;

        Ok(Self {
            key,
            access_ttl,
            refresh_ttl,
        })
    }

    /// username/비밀번호로 토큰 발급
    pub async fn issue<S>(&self, store: &S, username: &str, password: &str) -> Result<IssuedToken>
    where
        S: CredentialStore + ?Sized,
    {
        let credential = authenticate(store, username, password).await?;
        self.mint(credential.user_id, credential.is_admin)
    }

    /// 검증이 끝난 사용자에 대해 토큰 생성
    pub fn mint(&self, user_id: i64, is_admin: bool) -> Result<IssuedToken> {
        let roles = Role::set_for(is_admin)
            .iter()
            .map(|r| r.as_str().to_string())
            .collect();
        let claims = AccessTokenClaims::new(user_id, roles, self.access_ttl, self.refresh_ttl);
        let token = self.encode(&claims)?;
        Ok(IssuedToken { token, claims })
    }

    /// 토큰 검증
    ///
    /// 토큰에 담긴 subject/roles를 그대로 반환합니다 (저장소 재조회 없음).
    pub fn validate(&self, token: &str) -> Result<Identity> {
        let claims = self.decode(token)?;
        if claims.is_expired() {
            return Err(Error::TokenExpired);
        }
        identity_from(&claims)
    }

    /// 토큰 갱신
    ///
    /// 제시된 토큰이 `validate`를 통과해야 합니다. subject/roles/refresh 마감은 유지됩니다.
    pub fn refresh(&self, token: &str) -> Result<IssuedToken> {
        let claims = self.decode(token)?;
        if claims.is_expired() || claims.is_refresh_expired() {
            return Err(Error::TokenExpired);
        }
        identity_from(&claims)?;

        let renewed = claims.renewed(self.access_ttl);
        let token = self.encode(&renewed)?;
        Ok(IssuedToken {
            token,
            claims: renewed,
        })
    }

    fn symmetric_key(&self) -> PasetoSymmetricKey<V4, Local> {
        PasetoSymmetricKey::<V4, Local>::from(Key::from(self.key))
    }

    fn encode(&self, claims: &AccessTokenClaims) -> Result<String> {
        let payload = serde_json::to_string(claims)?;

        let mut nonce_bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce_key = Key::<32>::from(nonce_bytes);
        let nonce = PasetoNonce::<V4, Local>::from(&nonce_key);

        Paseto::<V4, Local>::builder()
            .set_payload(Payload::from(payload.as_str()))
            .try_encrypt(&self.symmetric_key(), &nonce)
            .map_err(|e| Error::internal(format!("token encryption failed: {}", e)))
    }

    /// 복호화 + 파싱 (만료 검사 없음)
    fn decode(&self, token: &str) -> Result<AccessTokenClaims> {
        let token = token.trim();
        let json = Paseto::<V4, Local>::try_decrypt(
            token,
            &self.symmetric_key(),
            None::<Footer>,
            None::<ImplicitAssertion>,
        )
        .map_err(|_| Error::invalid_token("paseto validation failed"))?;

        serde_json::from_str(&json).map_err(|_| Error::invalid_token("malformed claims"))
    }
}

fn identity_from(claims: &AccessTokenClaims) -> Result<Identity> {
    let roles = claims
        .roles
        .iter()
        .map(|r| {
            Role::parse(r).ok_or_else(|| Error::invalid_token(format!("unknown role '{}'", r)))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Identity::new(claims.sub, roles))
}

/// `Authorization` 헤더 값에서 Bearer 토큰 추출
pub fn bearer_token(auth_header: Option<&str>) -> Result<&str> {
    auth_header
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::invalid_token("missing bearer token"))
}

/// 키 재료 파싱 (hex 64자 → base64url → base64 → 원시 32바이트)
pub fn parse_key_material(raw: &str) -> Option<[u8; 32]> {
    let trimmed = raw.trim();

    if trimmed.len() == 64 && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        let bytes = decode_hex(trimmed)?;
        return bytes.as_slice().try_into().ok();
    }

    if let Ok(bytes) = general_purpose::URL_SAFE_NO_PAD.decode(trimmed) {
        if bytes.len() == 32 {
            return bytes.as_slice().try_into().ok();
        }
    }

    if let Ok(bytes) = general_purpose::STANDARD.decode(trimmed) {
        if bytes.len() == 32 {
            return bytes.as_slice().try_into().ok();
        }
    }

    let raw_bytes = trimmed.as_bytes();
    if raw_bytes.len() == 32 {
        return raw_bytes.try_into().ok();
    }

    None
}

fn decode_hex(input: &str) -> Option<Vec<u8>> {
    if input.len() % 2 != 0 {
        return None;
    }

    let mut bytes = Vec::with_capacity(input.len() / 2);
    let mut chars = input.chars();
    while let (Some(h), Some(l)) = (chars.next(), chars.next()) {
        let hi = h.to_digit(16)?;
        let lo = l.to_digit(16)?;
        bytes.push(((hi << 4) | lo) as u8);
    }
    Some(bytes)
}
