//! 권한 정책 정의
//!
//! 보호된 작업마다 하나의 요구사항이 대응됩니다.
//! `Action::requirement`의 match가 곧 규칙 표이며, 새 작업을 추가하면
//! 컴파일러가 규칙 누락을 잡아냅니다.

/// 보호된 작업
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────
    ListUsers,
    CreateUser,
    ReadUser { target: i64 },
    UpdateUser { target: i64 },
    /// admin 플래그 변경 (자기 자신 수정 시에도 검사)
    ChangeAdminFlag,
    DeleteUser { target: i64 },

    // ─────────────────────────────────────────────────────────────────────────
    // Projects
    // ─────────────────────────────────────────────────────────────────────────
    /// 거부 대상이 아니라 조회 범위 필터 (`project_scope`)
    ListProjects,
    /// `owner`는 생략 시 호출자로 해석된 값
    CreateProject { owner: i64 },
    ReadProject { owner: i64 },
    UpdateProject { owner: i64 },
    DeleteProject { owner: i64 },
    ReassignProject,
}

/// 작업 요구사항
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// 유효한 토큰만 있으면 허용
    Authenticated,

    /// admin role 필요
    Admin,

    /// 대상이 호출자 자신이거나 admin
    SelfOrAdmin(i64),

    /// admin이면서 대상이 자기 자신이 아님
    AdminNotSelf(i64),

    /// 리소스 소유자가 호출자이거나 admin
    OwnerOrAdmin(i64),
}

impl Action {
    /// 규칙 표
    pub fn requirement(&self) -> Requirement {
        match *self {
            Action::ListUsers => Requirement::Admin,
            Action::CreateUser => Requirement::Admin,
            Action::ReadUser { target } => Requirement::SelfOrAdmin(target),
            Action::UpdateUser { target } => Requirement::SelfOrAdmin(target),
            Action::ChangeAdminFlag => Requirement::Admin,
            Action::DeleteUser { target } => Requirement::AdminNotSelf(target),

            Action::ListProjects => Requirement::Authenticated,
            Action::CreateProject { owner } => Requirement::OwnerOrAdmin(owner),
            Action::ReadProject { owner } => Requirement::OwnerOrAdmin(owner),
            Action::UpdateProject { owner } => Requirement::OwnerOrAdmin(owner),
            Action::DeleteProject { owner } => Requirement::OwnerOrAdmin(owner),
            Action::ReassignProject => Requirement::Admin,
        }
    }

    /// 거부 시 사용자에게 보여줄 메시지
    pub fn denial_message(&self) -> &'static str {
        match self {
            Action::ListUsers | Action::CreateUser | Action::DeleteUser { .. } => ADMIN_REQUIRED,
            Action::ReadUser { .. } | Action::UpdateUser { .. } => "Acceso denegado",
            Action::ChangeAdminFlag => "No tienes permiso para cambiar el estado de administrador",
            Action::ListProjects => "Acceso denegado",
            Action::CreateProject { .. } => {
                "No tienes permiso para crear proyectos para otros usuarios"
            }
            Action::ReadProject { .. } => "No tienes acceso a este proyecto",
            Action::UpdateProject { .. } => "No tienes permiso para editar este proyecto",
            Action::DeleteProject { .. } => "No tienes permiso para eliminar este proyecto",
            Action::ReassignProject => "No tienes permiso para cambiar el propietario del proyecto",
        }
    }

    /// 로그용 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ListUsers => "users.list",
            Action::CreateUser => "users.create",
            Action::ReadUser { .. } => "users.read",
            Action::UpdateUser { .. } => "users.update",
            Action::ChangeAdminFlag => "users.change_admin",
            Action::DeleteUser { .. } => "users.delete",
            Action::ListProjects => "projects.list",
            Action::CreateProject { .. } => "projects.create",
            Action::ReadProject { .. } => "projects.read",
            Action::UpdateProject { .. } => "projects.update",
            Action::DeleteProject { .. } => "projects.delete",
            Action::ReassignProject => "projects.reassign",
        }
    }
}

pub(crate) const ADMIN_REQUIRED: &str = "Se requiere el rol de administrador";
pub(crate) const SELF_DELETE: &str = "No puedes eliminar tu propia cuenta";
