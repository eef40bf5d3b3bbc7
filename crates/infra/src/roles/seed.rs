//! JSON seed documents for the in-memory repository.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use backoffice_core::{RoleId, TenantId, UserId};

use backoffice_auth::PermissionMap;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid seed document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("seed references unknown role {0}")]
    UnknownRole(RoleId),
}

/// Directory contents to load at startup.
///
/// ```json
/// {
///   "main_roles": [{ "id": "…", "name": "support", "permissions": { "users": ["read"] } }],
///   "tenant_roles": [{ "id": "…", "tenant_id": "t1", "name": "editor", "permissions": {} }],
///   "users": [{
///     "id": "…",
///     "main_role_id": "…",
///     "memberships": [{ "tenant_id": "t1", "tenant_role_id": "…" }]
///   }]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoleSeed {
    pub main_roles: Vec<MainRoleSeed>,
    pub tenant_roles: Vec<TenantRoleSeed>,
    pub users: Vec<UserSeed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainRoleSeed {
    pub id: RoleId,
    pub name: String,
    #[serde(default)]
    pub permissions: PermissionMap,
    #[serde(default)]
    pub is_system: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TenantRoleSeed {
    pub id: RoleId,
    pub tenant_id: TenantId,
    pub name: String,
    #[serde(default)]
    pub permissions: PermissionMap,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_system: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserSeed {
    pub id: UserId,
    pub main_role_id: Option<RoleId>,
    #[serde(default)]
    pub memberships: Vec<MembershipSeed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MembershipSeed {
    pub tenant_id: TenantId,
    pub tenant_role_id: Option<RoleId>,
}

impl RoleSeed {
    pub fn from_json(document: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(document)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&document)
    }
}
