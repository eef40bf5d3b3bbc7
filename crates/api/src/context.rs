use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use backoffice_auth::{AccessContext, AuthenticatedPrincipal, Locale, Principal};
use backoffice_core::TenantId;

use crate::app::errors::ApiError;

/// Tenant the guarded route acted on, as the guard saw it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestedTenant(pub Option<TenantId>);

/// Everything the authorization layers attached to a request.
///
/// Extracting `Caller` in a handler outside the authentication layer is a
/// wiring bug and answers 500.
#[derive(Debug, Clone)]
pub struct Caller {
    pub principal: AuthenticatedPrincipal,
    pub access: AccessContext,
    pub locale: Locale,
    pub requested_tenant: Option<TenantId>,
}

impl Caller {
    pub fn principal(&self) -> &Principal {
        &self.principal.principal
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let extensions = &parts.extensions;
        let principal = extensions
            .get::<AuthenticatedPrincipal>()
            .cloned()
            .ok_or(ApiError::MissingAccessContext)?;
        let access = extensions
            .get::<AccessContext>()
            .cloned()
            .ok_or(ApiError::MissingAccessContext)?;

        Ok(Self {
            principal,
            access,
            locale: extensions.get::<Locale>().copied().unwrap_or_default(),
            requested_tenant: extensions
                .get::<RequestedTenant>()
                .and_then(|t| t.0.clone()),
        })
    }
}
