//! 인증 관련 타입 및 로직
//!
//! # 개요
//!
//! - **Access Token**: PASETO v4.local (서비스 비밀키로 암호화+인증)
//! - 토큰은 서버에 저장하지 않으며, 유효성은 서명과 만료 시각만으로 결정됩니다.
//! - 로그아웃은 클라이언트 측 세션 폐기일 뿐, 토큰 자체를 폐기하지 않습니다.

mod claims;
mod credentials;
mod password;
mod token;

pub use claims::AccessTokenClaims;
pub use credentials::{authenticate, Credential, CredentialStore};
pub use password::{hash_password, verify_password};
pub use token::{bearer_token, parse_key_material, IssuedToken, TokenService};
