use backoffice_core::TenantId;

/// Header naming the tenant the caller acts within.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Tenant the request claims to act within, if any.
///
/// This is a claim, not a verified fact: existence and membership are decided
/// later by the access guard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TenantContext {
    tenant_id: Option<TenantId>,
}

impl TenantContext {
    pub fn new(tenant_id: Option<TenantId>) -> Self {
        Self { tenant_id }
    }

    /// Resolve from the raw header value. Blank values count as absent.
    pub fn from_header(value: Option<&str>) -> Self {
        Self {
            tenant_id: value.and_then(|v| v.parse::<TenantId>().ok()),
        }
    }

    pub fn tenant_id(&self) -> Option<&TenantId> {
        self.tenant_id.as_ref()
    }
}
