//! Response bodies.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use backoffice_auth::{Check, GrantSource, PermissionMap, RoleTier};
use backoffice_core::{TenantId, UserId};

use crate::context::Caller;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: UserId,
    pub email: Option<String>,
    pub role: Option<String>,
    pub tier: RoleTier,
    pub is_elevated: bool,
    pub tenant_id: Option<TenantId>,
    pub tenant_ids: BTreeSet<TenantId>,
    pub expires_at: DateTime<Utc>,
}

impl From<&Caller> for MeResponse {
    fn from(caller: &Caller) -> Self {
        let principal = caller.principal();
        Self {
            user_id: principal.user_id,
            email: principal.email.clone(),
            role: principal.raw_role.clone(),
            tier: caller.access.tier(),
            is_elevated: caller.access.is_elevated(),
            tenant_id: caller.access.tenant_context().tenant_id().cloned(),
            tenant_ids: caller.access.tenant_ids(),
            expires_at: principal.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PermissionsResponse {
    pub tier: RoleTier,
    pub is_elevated: bool,
    pub main: PermissionMap,
    pub tenants: BTreeMap<TenantId, PermissionMap>,
}

impl From<&Caller> for PermissionsResponse {
    fn from(caller: &Caller) -> Self {
        Self {
            tier: caller.access.tier(),
            is_elevated: caller.access.is_elevated(),
            main: caller.access.main_permissions().clone(),
            tenants: caller.access.tenant_permissions().clone(),
        }
    }
}

/// Outcome of a guarded action, with what granted it.
#[derive(Debug, Serialize)]
pub struct AccessDecision {
    pub action: String,
    pub granted_by: Option<GrantSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl AccessDecision {
    pub fn new(caller: &Caller, check: Check) -> Self {
        let tenant_id = caller.requested_tenant.clone();
        Self {
            action: check.to_string(),
            granted_by: caller
                .access
                .grant_source(check.resource, check.verb, tenant_id.as_ref()),
            tenant_id,
            user_id: None,
        }
    }

    pub fn on_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}
