//! svaia-core: 서비스 공통 핵심 라이브러리
//!
//! 이 크레이트는 API, Web, Chat 서비스가 공유하는 핵심 타입과 로직을 제공합니다.
//!
//! # 모듈 구조
//!
//! - `auth`: 토큰 발급/검증/갱신, 비밀번호 해시, 자격 증명 저장소 trait
//! - `permissions`: Role, 호출자 Identity, 리소스별 권한 규칙 및 평가
//! - `model`: API가 주고받는 User / Project 표현
//! - `error`: 공통 에러 타입

pub mod auth;
pub mod error;
pub mod model;
pub mod permissions;

pub use error::{Error, Result};
