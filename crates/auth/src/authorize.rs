use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use backoffice_core::{TenantId, UserId};

use crate::aggregate::{aggregate, AggregatedPermissions};
use crate::{
    AuthError, PermissionMap, PermissionVerb, ResolvedRoles, Resource, RoleTier, TenantContext,
};

/// Per-request decision object handed to downstream handlers.
///
/// Built once the roles are resolved and aggregated. Handlers consult it
/// rather than re-deriving roles.
///
/// - No IO
/// - No panics
/// - No shared state: one value per request, dropped with the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessContext {
    user_id: UserId,
    tier: RoleTier,
    permissions: AggregatedPermissions,
    tenant_context: TenantContext,
}

/// Why a check was granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GrantSource {
    /// Elevated main role; no permission entry consulted.
    ElevatedRole { tier: RoleTier },
    /// Main-scope permission map.
    MainRole,
    /// Tenant-scoped role of this tenant.
    TenantRole { tenant_id: TenantId },
}

impl AccessContext {
    pub fn new(user_id: UserId, roles: &ResolvedRoles, tenant_context: TenantContext) -> Self {
        let tier = roles
            .main_roles
            .iter()
            .map(|r| r.tier)
            .min()
            .unwrap_or_default();

        Self {
            user_id,
            tier,
            permissions: aggregate(roles),
            tenant_context,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn tier(&self) -> RoleTier {
        self.tier
    }

    pub fn is_elevated(&self) -> bool {
        self.tier.is_elevated()
    }

    pub fn permissions(&self) -> &AggregatedPermissions {
        &self.permissions
    }

    pub fn main_permissions(&self) -> &PermissionMap {
        self.permissions.main()
    }

    pub fn tenant_permissions(&self) -> &BTreeMap<TenantId, PermissionMap> {
        self.permissions.tenants()
    }

    pub fn tenant_ids(&self) -> BTreeSet<TenantId> {
        self.permissions.tenant_ids()
    }

    pub fn tenant_context(&self) -> &TenantContext {
        &self.tenant_context
    }

    /// Resolve which scope, if any, grants `verb` on `resource`.
    ///
    /// Elevated roles win outright; then the main map; then either the named
    /// tenant only, or (without a tenant id) any tenant the principal belongs to.
    pub fn grant_source(
        &self,
        resource: Resource,
        verb: PermissionVerb,
        tenant_id: Option<&TenantId>,
    ) -> Option<GrantSource> {
        if self.is_elevated() {
            return Some(GrantSource::ElevatedRole { tier: self.tier });
        }
        if self.permissions.allows_main(resource, verb) {
            return Some(GrantSource::MainRole);
        }

        match tenant_id {
            Some(tenant_id) => self
                .permissions
                .allows_in_tenant(tenant_id, resource, verb)
                .then(|| GrantSource::TenantRole {
                    tenant_id: tenant_id.clone(),
                }),
            None => self
                .permissions
                .tenants()
                .iter()
                .find(|(_, map)| map.allows(resource, verb))
                .map(|(tenant_id, _)| GrantSource::TenantRole {
                    tenant_id: tenant_id.clone(),
                }),
        }
    }

    pub fn check_permission(
        &self,
        resource: Resource,
        verb: PermissionVerb,
        tenant_id: Option<&TenantId>,
    ) -> bool {
        self.grant_source(resource, verb, tenant_id).is_some()
    }

    pub fn require_permission(
        &self,
        resource: Resource,
        verb: PermissionVerb,
        tenant_id: Option<&TenantId>,
    ) -> Result<(), AuthError> {
        if self.check_permission(resource, verb, tenant_id) {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions(format!("{resource}:{verb}")))
        }
    }

    /// Tenant isolation: the requested tenant must be exactly the tenant the
    /// request claims via its tenant-context header. Elevated roles bypass.
    pub fn check_tenant_access(&self, tenant_id: Option<&TenantId>) -> Result<(), AuthError> {
        if self.has_tenant_access(tenant_id) {
            Ok(())
        } else {
            Err(AuthError::UnauthorizedTenant(tenant_id.cloned()))
        }
    }

    fn has_tenant_access(&self, tenant_id: Option<&TenantId>) -> bool {
        if self.is_elevated() {
            return true;
        }
        matches!(
            (tenant_id, self.tenant_context.tenant_id()),
            (Some(requested), Some(claimed)) if requested == claimed
        )
    }

    fn passes(&self, check: &Check, tenant_id: Option<&TenantId>) -> bool {
        (!check.tenant_scoped || self.has_tenant_access(tenant_id))
            && self.check_permission(check.resource, check.verb, tenant_id)
    }
}

/// One (resource, verb) requirement.
///
/// `tenant_scoped` checks additionally require tenant isolation
/// ([`AccessContext::check_tenant_access`]).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Check {
    pub resource: Resource,
    pub verb: PermissionVerb,
    pub tenant_scoped: bool,
}

impl Check {
    pub const fn new(resource: Resource, verb: PermissionVerb) -> Self {
        Self {
            resource,
            verb,
            tenant_scoped: false,
        }
    }

    pub const fn tenant_scoped(resource: Resource, verb: PermissionVerb) -> Self {
        Self {
            resource,
            verb,
            tenant_scoped: true,
        }
    }
}

impl core::fmt::Display for Check {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.resource, self.verb)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationMode {
    /// Every check must pass; stops at the first failure.
    All,
    /// At least one check must pass.
    Any,
}

/// A list of checks evaluated by a single combinator.
///
/// An empty guard always allows; it exists to get an [`AccessContext`] built
/// and injected without gating the route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    checks: Vec<Check>,
    mode: CombinationMode,
}

impl Guard {
    pub fn new(checks: impl IntoIterator<Item = Check>, mode: CombinationMode) -> Self {
        Self {
            checks: checks.into_iter().collect(),
            mode,
        }
    }

    pub fn all(checks: impl IntoIterator<Item = Check>) -> Self {
        Self::new(checks, CombinationMode::All)
    }

    pub fn any(checks: impl IntoIterator<Item = Check>) -> Self {
        Self::new(checks, CombinationMode::Any)
    }

    /// Guard that checks nothing.
    pub fn open() -> Self {
        Self::new(Vec::new(), CombinationMode::All)
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub fn mode(&self) -> CombinationMode {
        self.mode
    }

    /// Decide the request. `tenant_id` is the tenant the request targets;
    /// it scopes every check, not only the tenant-scoped ones.
    pub fn evaluate(
        &self,
        ctx: &AccessContext,
        tenant_id: Option<&TenantId>,
    ) -> Result<(), AuthError> {
        if self.checks.is_empty() {
            return Ok(());
        }

        match self.mode {
            CombinationMode::All => {
                for check in &self.checks {
                    if check.tenant_scoped {
                        ctx.check_tenant_access(tenant_id)?;
                    }
                    ctx.require_permission(check.resource, check.verb, tenant_id)?;
                }
                Ok(())
            }
            CombinationMode::Any => {
                // Non-throwing form for every check; one combined error.
                if self.checks.iter().any(|check| ctx.passes(check, tenant_id)) {
                    return Ok(());
                }
                let wanted: Vec<String> = self.checks.iter().map(Check::to_string).collect();
                Err(AuthError::InsufficientPermissions(format!(
                    "any of {}",
                    wanted.join(", ")
                )))
            }
        }
    }
}

/// Per-request progress of the authorization pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Unauthenticated,
    TokenVerified,
    RolesResolved,
    PermissionsAggregated,
    Allowed,
    Rejected { reason: &'static str },
}

impl PipelineState {
    pub fn rejected(error: &AuthError) -> Self {
        PipelineState::Rejected {
            reason: error.code(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Allowed | PipelineState::Rejected { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Unauthenticated => "unauthenticated",
            PipelineState::TokenVerified => "token_verified",
            PipelineState::RolesResolved => "roles_resolved",
            PipelineState::PermissionsAggregated => "permissions_aggregated",
            PipelineState::Allowed => "allowed",
            PipelineState::Rejected { reason } => *reason,
        }
    }
}
