use serde::{Deserialize, Serialize};

use backoffice_core::{RoleId, TenantId};

use crate::PermissionMap;

/// Closed classification of a main role.
///
/// Role names are mapped onto a tier exactly once, where roles are loaded from
/// storage; authorization decisions only ever match on the tier. Variants are
/// declared from most to least privileged, so `min()` picks the strongest.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoleTier {
    SuperAdmin,
    Admin,
    #[default]
    Standard,
}

impl RoleTier {
    /// Classify a stored role name. Anything other than the two administrative
    /// names is a standard role.
    pub fn from_role_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "super_admin" => RoleTier::SuperAdmin,
            "admin" => RoleTier::Admin,
            _ => RoleTier::Standard,
        }
    }

    /// Elevated tiers bypass explicit permission checks entirely.
    pub fn is_elevated(self) -> bool {
        match self {
            RoleTier::SuperAdmin | RoleTier::Admin => true,
            RoleTier::Standard => false,
        }
    }
}

/// Platform-wide role held by a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainRole {
    pub id: RoleId,
    pub name: String,
    pub tier: RoleTier,
    pub permissions: PermissionMap,
    pub is_system: bool,
}

impl MainRole {
    pub fn new(id: RoleId, name: impl Into<String>, permissions: PermissionMap) -> Self {
        let name = name.into();
        Self {
            id,
            tier: RoleTier::from_role_name(&name),
            name,
            permissions,
            is_system: false,
        }
    }

    pub fn is_elevated(&self) -> bool {
        self.tier.is_elevated()
    }
}

/// Role scoped to exactly one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRole {
    pub id: RoleId,
    pub tenant_id: TenantId,
    pub name: String,
    pub permissions: PermissionMap,
    pub is_default: bool,
    pub is_system: bool,
}

impl TenantRole {
    pub fn new(
        id: RoleId,
        tenant_id: TenantId,
        name: impl Into<String>,
        permissions: PermissionMap,
    ) -> Self {
        Self {
            id,
            tenant_id,
            name: name.into(),
            permissions,
            is_default: false,
            is_system: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_names_are_elevated() {
        assert_eq!(RoleTier::from_role_name("super_admin"), RoleTier::SuperAdmin);
        assert_eq!(RoleTier::from_role_name(" Admin "), RoleTier::Admin);
        assert_eq!(RoleTier::from_role_name("administrator"), RoleTier::Standard);
        assert!(RoleTier::SuperAdmin.is_elevated());
        assert!(RoleTier::Admin.is_elevated());
        assert!(!RoleTier::Standard.is_elevated());
    }

    #[test]
    fn main_role_tier_follows_name() {
        let role = MainRole::new(RoleId::new(), "admin", PermissionMap::empty());
        assert!(role.is_elevated());
        let role = MainRole::new(RoleId::new(), "support", PermissionMap::empty());
        assert!(!role.is_elevated());
    }
}
