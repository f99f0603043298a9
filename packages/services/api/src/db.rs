//! API 저장소 (SQLite)
//!
//! 사용자/프로젝트 테이블과 자격 증명 조회를 담당합니다.
//! 변경 작업은 모두 트랜잭션 안에서 수행되며, 실패 시 롤백됩니다.

use std::path::Path as FsPath;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use svaia_core::auth::{hash_password, Credential, CredentialStore};
use svaia_core::model::{Project, User};
use svaia_core::permissions::{ProjectScope, Role};

const USER_COLUMNS: &str =
    "id, nombre, apellidos, correo, username, password, is_admin, fecha_creacion, fecha_modificacion";

const PROJECT_COLUMNS: &str =
    "id, nombre, descripcion, fecha_creacion, fecha_modificacion, usuario_id";

#[derive(Clone)]
pub struct ApiDb {
    pool: SqlitePool,
}

/// users 테이블 행
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub nombre: String,
    pub apellidos: String,
    pub correo: String,
    pub username: String,
    pub password: String,
    pub is_admin: bool,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_modificacion: DateTime<Utc>,
}

impl UserRow {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            first_name: self.nombre,
            last_name: self.apellidos,
            email: self.correo,
            username: self.username,
            is_admin: self.is_admin,
            roles: Role::set_for(self.is_admin),
            created_at: Some(self.fecha_creacion),
            updated_at: Some(self.fecha_modificacion),
        }
    }
}

/// projects 테이블 행
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_modificacion: DateTime<Utc>,
    pub usuario_id: i64,
}

impl ProjectRow {
    pub fn into_project(self) -> Project {
        Project {
            id: self.id,
            name: self.nombre,
            description: self.descripcion,
            created_at: Some(self.fecha_creacion),
            updated_at: Some(self.fecha_modificacion),
            owner_id: self.usuario_id,
        }
    }
}

/// 새 사용자 (비밀번호는 해시된 상태)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub nombre: String,
    pub apellidos: String,
    pub correo: String,
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// 사용자 변경 사항 (`None`은 유지)
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub correo: Option<String>,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub is_admin: Option<bool>,
}

/// 새 프로젝트
#[derive(Debug, Clone)]
pub struct NewProject {
    pub nombre: String,
    pub descripcion: Option<String>,
    pub usuario_id: i64,
}

/// 프로젝트 변경 사항 (`None`은 유지)
#[derive(Debug, Clone, Default)]
pub struct ProjectChanges {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub usuario_id: Option<i64>,
}

impl ApiDb {
    /// URL로 연결 후 테이블 생성
    ///
    /// `sqlite://` 상대 경로는 상위 디렉터리를 만들어 둡니다.
    pub async fn connect(db_url: &str) -> anyhow::Result<Self> {
        let options = if let Some(path) = db_url.strip_prefix("sqlite:///") {
            let abs_path = FsPath::new("/").join(path);
            if let Some(parent) = abs_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            SqliteConnectOptions::new()
                .filename(abs_path)
                .create_if_missing(true)
        } else if let Some(path) = db_url.strip_prefix("sqlite://") {
            if let Some(parent) = FsPath::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
        } else {
            SqliteConnectOptions::from_str(db_url)?.create_if_missing(true)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options.foreign_keys(true))
            .await?;

        Self::from_pool(pool).await
    }

    /// 기존 pool 사용 (테스트는 `sqlite::memory:` 단일 연결)
    pub async fn from_pool(pool: SqlitePool) -> anyhow::Result<Self> {
        let db = Self { pool };
        db.init().await?;
        Ok(db)
    }

    async fn init(&self) -> anyhow::Result<()> {
        let queries = [
            "PRAGMA foreign_keys = ON",
            r#"CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nombre TEXT NOT NULL,
                apellidos TEXT NOT NULL,
                correo TEXT NOT NULL UNIQUE,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                is_admin BOOLEAN NOT NULL DEFAULT 0,
                fecha_creacion TEXT NOT NULL,
                fecha_modificacion TEXT NOT NULL
            );"#,
            r#"CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nombre TEXT NOT NULL,
                descripcion TEXT,
                fecha_creacion TEXT NOT NULL,
                fecha_modificacion TEXT NOT NULL,
                usuario_id INTEGER NOT NULL REFERENCES users(id)
            );"#,
        ];

        for q in queries {
            sqlx::query(q).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// 기본 사용자(admin, user) 생성
    ///
    /// 이미 있는 username은 건너뜁니다.
    pub async fn seed_default_users(&self) -> anyhow::Result<()> {
        let defaults = [
            ("Administrador", "Sistema", "admin@example.com", "admin", "Admin123!", true),
            ("Usuario", "Normal", "user@example.com", "user", "User123!", false),
        ];

        for (nombre, apellidos, correo, username, password, is_admin) in defaults {
            if self.get_user_by_username(username).await?.is_some() {
                continue;
            }
            let user = NewUser {
                nombre: nombre.to_string(),
                apellidos: apellidos.to_string(),
                correo: correo.to_string(),
                username: username.to_string(),
                password_hash: hash_password(password)?,
                is_admin,
            };
            self.insert_user(&user).await?;
            tracing::info!("Seeded default user '{}'", username);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn list_users(&self) -> anyhow::Result<Vec<UserRow>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_user(&self, id: i64) -> anyhow::Result<Option<UserRow>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_user_by_username(&self, username: &str) -> anyhow::Result<Option<UserRow>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_user_by_email(&self, correo: &str) -> anyhow::Result<Option<UserRow>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE correo = ?1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(correo)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn user_exists(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.get_user(id).await?.is_some())
    }

    pub async fn insert_user(&self, user: &NewUser) -> anyhow::Result<UserRow> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO users (nombre, apellidos, correo, username, password, is_admin, fecha_creacion, fecha_modificacion) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) RETURNING {USER_COLUMNS}"
        );

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.nombre)
            .bind(&user.apellidos)
            .bind(&user.correo)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.is_admin)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(row)
    }

    pub async fn update_user(&self, id: i64, changes: &UserChanges) -> anyhow::Result<UserRow> {
        let sql = format!(
            "UPDATE users SET \
                nombre = COALESCE(?1, nombre), \
                apellidos = COALESCE(?2, apellidos), \
                correo = COALESCE(?3, correo), \
                username = COALESCE(?4, username), \
                password = COALESCE(?5, password), \
                is_admin = COALESCE(?6, is_admin), \
                fecha_modificacion = ?7 \
             WHERE id = ?8 RETURNING {USER_COLUMNS}"
        );

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&changes.nombre)
            .bind(&changes.apellidos)
            .bind(&changes.correo)
            .bind(&changes.username)
            .bind(&changes.password_hash)
            .bind(changes.is_admin)
            .bind(Utc::now())
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(row)
    }

    /// 사용자 삭제
    ///
    /// 소유한 프로젝트가 남아 있으면 외래 키 위반으로 실패하고 아무것도 지워지지 않습니다.
    pub async fn delete_user(&self, id: i64) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Projects
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn list_projects(&self, scope: ProjectScope) -> anyhow::Result<Vec<ProjectRow>> {
        let rows = match scope {
            ProjectScope::All => {
                let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id");
                sqlx::query_as::<_, ProjectRow>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
            ProjectScope::OwnedBy(owner) => {
                let sql = format!(
                    "SELECT {PROJECT_COLUMNS} FROM projects WHERE usuario_id = ?1 ORDER BY id"
                );
                sqlx::query_as::<_, ProjectRow>(&sql)
                    .bind(owner)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    pub async fn get_project(&self, id: i64) -> anyhow::Result<Option<ProjectRow>> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1");
        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn insert_project(&self, project: &NewProject) -> anyhow::Result<ProjectRow> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO projects (nombre, descripcion, fecha_creacion, fecha_modificacion, usuario_id) \
             VALUES (?1, ?2, ?3, ?3, ?4) RETURNING {PROJECT_COLUMNS}"
        );

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(&project.nombre)
            .bind(&project.descripcion)
            .bind(now)
            .bind(project.usuario_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(row)
    }

    pub async fn update_project(
        &self,
        id: i64,
        changes: &ProjectChanges,
    ) -> anyhow::Result<ProjectRow> {
        let sql = format!(
            "UPDATE projects SET \
                nombre = COALESCE(?1, nombre), \
                descripcion = COALESCE(?2, descripcion), \
                usuario_id = COALESCE(?3, usuario_id), \
                fecha_modificacion = ?4 \
             WHERE id = ?5 RETURNING {PROJECT_COLUMNS}"
        );

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(&changes.nombre)
            .bind(&changes.descripcion)
            .bind(changes.usuario_id)
            .bind(Utc::now())
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(row)
    }

    pub async fn delete_project(&self, id: i64) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM projects WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for ApiDb {
    async fn find_credential(&self, username: &str) -> svaia_core::Result<Option<Credential>> {
        let row = self
            .get_user_by_username(username)
            .await
            .map_err(|e| svaia_core::Error::internal(format!("credential lookup failed: {e}")))?;

        Ok(row.map(|r| Credential {
            user_id: r.id,
            password_hash: r.password,
            is_admin: r.is_admin,
        }))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 단일 연결 in-memory DB
    pub(crate) async fn memory_db() -> ApiDb {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        ApiDb::from_pool(pool).await.unwrap()
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = memory_db().await;
        db.seed_default_users().await.unwrap();
        db.seed_default_users().await.unwrap();

        let users = db.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert!(users[0].is_admin);
        assert_eq!(users[1].username, "user");
        assert!(!users[1].is_admin);
    }

    #[tokio::test]
    async fn test_credential_lookup() {
        let db = memory_db().await;
        db.seed_default_users().await.unwrap();

        let credential = db.find_credential("admin").await.unwrap().unwrap();
        assert!(credential.is_admin);
        assert!(svaia_core::auth::verify_password(
            &credential.password_hash,
            "Admin123!"
        ));
        assert!(db.find_credential("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_keeps_unset_fields() {
        let db = memory_db().await;
        db.seed_default_users().await.unwrap();
        let before = db.get_user_by_username("user").await.unwrap().unwrap();

        let changes = UserChanges {
            nombre: Some("Renamed".to_string()),
            ..Default::default()
        };
        let after = db.update_user(before.id, &changes).await.unwrap();

        assert_eq!(after.nombre, "Renamed");
        assert_eq!(after.correo, before.correo);
        assert_eq!(after.password, before.password);
        assert_eq!(after.fecha_creacion, before.fecha_creacion);
        assert!(after.fecha_modificacion >= before.fecha_modificacion);
    }

    #[tokio::test]
    async fn test_delete_owner_with_projects_rolls_back() {
        let db = memory_db().await;
        db.seed_default_users().await.unwrap();
        let owner = db.get_user_by_username("user").await.unwrap().unwrap();

        db.insert_project(&NewProject {
            nombre: "P".to_string(),
            descripcion: None,
            usuario_id: owner.id,
        })
        .await
        .unwrap();

        assert!(db.delete_user(owner.id).await.is_err());
        assert!(db.user_exists(owner.id).await.unwrap());
        assert_eq!(db.list_projects(ProjectScope::All).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_project_scope_filters_by_owner() {
        let db = memory_db().await;
        db.seed_default_users().await.unwrap();
        let admin = db.get_user_by_username("admin").await.unwrap().unwrap();
        let user = db.get_user_by_username("user").await.unwrap().unwrap();

        for (name, owner) in [("A", admin.id), ("B", user.id), ("C", user.id)] {
            db.insert_project(&NewProject {
                nombre: name.to_string(),
                descripcion: Some("d".to_string()),
                usuario_id: owner,
            })
            .await
            .unwrap();
        }

        let owned = db.list_projects(ProjectScope::OwnedBy(user.id)).await.unwrap();
        assert_eq!(owned.len(), 2);
        assert!(owned.iter().all(|p| p.usuario_id == user.id));
        assert_eq!(db.list_projects(ProjectScope::All).await.unwrap().len(), 3);
    }
}
