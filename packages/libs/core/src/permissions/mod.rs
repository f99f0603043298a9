//! 권한 모델 및 평가
//!
//! # 개요
//!
//! 사용자의 admin 플래그에서 Role 집합을 유도하고,
//! 보호된 작업마다 어떤 조건을 만족해야 하는지 선언적 규칙 표로 정의합니다.
//!
//! # 모듈 구조
//!
//! - `context`: Role, 호출자 Identity
//! - `policy`: 작업(Action) 목록과 작업별 요구사항 표
//! - `evaluator`: 요구사항 평가 및 프로젝트 조회 범위 결정

mod context;
mod evaluator;
mod policy;

pub use context::{Identity, Role};
pub use evaluator::{authorize, project_scope, ProjectScope};
pub use policy::{Action, Requirement};
