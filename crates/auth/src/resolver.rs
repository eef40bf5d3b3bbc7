use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use backoffice_core::UserId;

use crate::{AuthError, MainRole, TenantRole};

/// Storage-layer failure surfaced by a [`RoleRepository`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("malformed row: {0}")]
    Decode(String),
}

/// Read port for the two role lookups the pipeline needs.
///
/// Implementations must exclude soft-deleted roles in the query itself, and
/// own any retry policy; the resolver never retries.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Main role(s) referenced by the user record. Normally exactly one.
    async fn main_roles_for_user(&self, user_id: UserId) -> Result<Vec<MainRole>, RepositoryError>;

    /// Every tenant role reachable through the user's tenant memberships.
    async fn tenant_roles_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<TenantRole>, RepositoryError>;
}

#[async_trait]
impl<S> RoleRepository for Arc<S>
where
    S: RoleRepository + ?Sized,
{
    async fn main_roles_for_user(&self, user_id: UserId) -> Result<Vec<MainRole>, RepositoryError> {
        (**self).main_roles_for_user(user_id).await
    }

    async fn tenant_roles_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<TenantRole>, RepositoryError> {
        (**self).tenant_roles_for_user(user_id).await
    }
}

/// Both role scopes for one principal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ResolvedRoles {
    pub main_roles: Vec<MainRole>,
    pub tenant_roles: Vec<TenantRole>,
}

impl ResolvedRoles {
    pub fn is_elevated(&self) -> bool {
        self.main_roles.iter().any(MainRole::is_elevated)
    }
}

/// Loads a principal's roles from a [`RoleRepository`].
#[derive(Clone)]
pub struct RoleResolver {
    repository: Arc<dyn RoleRepository>,
}

impl RoleResolver {
    pub fn new(repository: Arc<dyn RoleRepository>) -> Self {
        Self { repository }
    }

    /// Run both lookups concurrently and wait for both.
    ///
    /// The first failure wins and the other lookup is dropped. Dropping the
    /// returned future (request cancelled, timeout) drops both lookups.
    pub async fn resolve(&self, user_id: UserId) -> Result<ResolvedRoles, AuthError> {
        let (main_roles, tenant_roles) = tokio::try_join!(
            self.repository.main_roles_for_user(user_id),
            self.repository.tenant_roles_for_user(user_id),
        )
        .map_err(|e| {
            tracing::error!(%user_id, error = %e, "role lookup failed");
            AuthError::from(e)
        })?;

        tracing::debug!(
            %user_id,
            main_roles = main_roles.len(),
            tenant_roles = tenant_roles.len(),
            "roles resolved"
        );

        Ok(ResolvedRoles {
            main_roles,
            tenant_roles,
        })
    }
}
