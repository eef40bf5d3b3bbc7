use thiserror::Error;

use backoffice_core::TenantId;

use crate::resolver::RepositoryError;

/// Terminal failures of the authorization pipeline.
///
/// None of these are retried. Variant payloads are diagnostic only (logged
/// server-side); clients receive the localized message for [`AuthError::code`].
/// No variant ever carries the raw credential.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("authorization token required")]
    TokenRequired,

    #[error("authorization token has expired")]
    TokenExpired,

    #[error("authorization token is invalid: {0}")]
    TokenInvalid(String),

    #[error("token verification secret is not configured")]
    ConfigurationError,

    #[error("anonymous sessions are not allowed")]
    AnonymousNotAllowed,

    #[error("insufficient permissions: {0}")]
    InsufficientPermissions(String),

    #[error("not authorized for tenant {}", .0.as_ref().map(TenantId::as_str).unwrap_or("<none>"))]
    UnauthorizedTenant(Option<TenantId>),

    #[error("role lookup failed: {0}")]
    Persistence(#[from] RepositoryError),
}

impl AuthError {
    pub fn token_invalid(detail: impl Into<String>) -> Self {
        Self::TokenInvalid(detail.into())
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::TokenRequired => "token_required",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenInvalid(_) => "token_invalid",
            AuthError::ConfigurationError => "configuration_error",
            AuthError::AnonymousNotAllowed => "anonymous_not_allowed",
            AuthError::InsufficientPermissions(_) => "insufficient_permissions",
            AuthError::UnauthorizedTenant(_) => "unauthorized_tenant",
            AuthError::Persistence(_) => "persistence_error",
        }
    }

    /// HTTP status the boundary should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            AuthError::TokenRequired
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_)
            | AuthError::AnonymousNotAllowed => 401,
            AuthError::InsufficientPermissions(_) | AuthError::UnauthorizedTenant(_) => 403,
            AuthError::ConfigurationError | AuthError::Persistence(_) => 500,
        }
    }

    /// Server-side faults, as opposed to rejections of the caller.
    pub fn is_server_fault(&self) -> bool {
        self.http_status() >= 500
    }
}
