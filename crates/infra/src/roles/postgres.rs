//! Postgres-backed role repository.
//!
//! Both lookups filter `deleted_at IS NULL` on every joined table, so
//! soft-deleted users, roles and memberships never reach the resolver. The
//! expected schema lives in `migrations/0001_role_directory.sql`.
//!
//! ## Error Mapping
//!
//! | SQLx Error | RepositoryError |
//! |------------|-----------------|
//! | PoolTimedOut, PoolClosed, Io, Tls | `Unavailable` |
//! | ColumnDecode, Decode, ColumnNotFound, TypeNotFound | `Decode` |
//! | Database, anything else | `Query` |

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use backoffice_auth::{MainRole, RepositoryError, RoleRepository, TenantRole};
use backoffice_core::{RoleId, TenantId, UserId};

use super::permissions_json::decode_permissions;

#[derive(Debug, Clone)]
pub struct PostgresRoleRepository {
    pool: Arc<PgPool>,
}

impl PostgresRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect lazily; the first query opens the connection.
    pub fn connect_lazy(database_url: &str) -> Result<Self, RepositoryError> {
        let pool = PgPool::connect_lazy(database_url)
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    #[instrument(skip(self), fields(operation = "main_roles_for_user"))]
    async fn main_roles_for_user(&self, user_id: UserId) -> Result<Vec<MainRole>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.name, r.permissions, r.is_system
            FROM users u
            JOIN roles r ON r.id = u.main_role_id
            WHERE u.id = $1
              AND u.deleted_at IS NULL
              AND r.deleted_at IS NULL
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("main_roles_for_user", e))?;

        rows.iter().map(main_role_from_row).collect()
    }

    #[instrument(skip(self), fields(operation = "tenant_roles_for_user"))]
    async fn tenant_roles_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<TenantRole>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT tr.id, tr.tenant_id, tr.name, tr.permissions, tr.is_default, tr.is_system
            FROM tenant_users tu
            JOIN tenant_roles tr
              ON tr.id = tu.tenant_role_id
             AND tr.tenant_id = tu.tenant_id
            WHERE tu.user_id = $1
              AND tu.deleted_at IS NULL
              AND tr.deleted_at IS NULL
            ORDER BY tr.tenant_id, tr.id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("tenant_roles_for_user", e))?;

        rows.iter().map(tenant_role_from_row).collect()
    }
}

fn main_role_from_row(row: &PgRow) -> Result<MainRole, RepositoryError> {
    let id: uuid::Uuid = column(row, "id")?;
    let name: String = column(row, "name")?;
    let permissions: serde_json::Value = column(row, "permissions")?;

    let mut role = MainRole::new(
        RoleId::from_uuid(id),
        name.clone(),
        decode_permissions(&name, &permissions)?,
    );
    role.is_system = column(row, "is_system")?;
    Ok(role)
}

fn tenant_role_from_row(row: &PgRow) -> Result<TenantRole, RepositoryError> {
    let id: uuid::Uuid = column(row, "id")?;
    let tenant_id: String = column(row, "tenant_id")?;
    let name: String = column(row, "name")?;
    let permissions: serde_json::Value = column(row, "permissions")?;

    let mut role = TenantRole::new(
        RoleId::from_uuid(id),
        TenantId::new(tenant_id),
        name.clone(),
        decode_permissions(&name, &permissions)?,
    );
    role.is_default = column(row, "is_default")?;
    role.is_system = column(row, "is_system")?;
    Ok(role)
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name).map_err(|e| map_sqlx_error(name, e))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::PoolTimedOut => {
            RepositoryError::Unavailable(format!("connection pool timed out in {operation}"))
        }
        sqlx::Error::PoolClosed => {
            RepositoryError::Unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::Io(e) => RepositoryError::Unavailable(format!("io error in {operation}: {e}")),
        sqlx::Error::Tls(e) => {
            RepositoryError::Unavailable(format!("tls error in {operation}: {e}"))
        }
        sqlx::Error::ColumnDecode { index, source } => {
            RepositoryError::Decode(format!("column {index} in {operation}: {source}"))
        }
        sqlx::Error::Decode(e) => RepositoryError::Decode(format!("{operation}: {e}")),
        sqlx::Error::ColumnNotFound(column) => {
            RepositoryError::Decode(format!("missing column {column} in {operation}"))
        }
        sqlx::Error::TypeNotFound { type_name } => {
            RepositoryError::Decode(format!("unknown type {type_name} in {operation}"))
        }
        sqlx::Error::Database(db_err) => RepositoryError::Query(format!(
            "database error in {operation}: {}",
            db_err.message()
        )),
        other => RepositoryError::Query(format!("{operation}: {other}")),
    }
}
