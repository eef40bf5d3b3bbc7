use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use backoffice_core::{RoleId, TenantId, UserId};

use crate::{AuthError, TokenClaims};

/// Authenticated identity for one request, built from verified claims.
///
/// Immutable once constructed; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub email: Option<String>,
    pub raw_role: Option<String>,
    pub user_metadata: Map<String, Value>,
    pub app_metadata: Map<String, Value>,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub is_anonymous: bool,
}

impl Principal {
    pub fn from_claims(claims: TokenClaims) -> Result<Self, AuthError> {
        let user_id = claims
            .sub
            .parse::<UserId>()
            .map_err(|e| AuthError::token_invalid(format!("sub claim: {e}")))?;
        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AuthError::token_invalid("exp claim out of range"))?;
        let issued_at = claims.iat.and_then(|iat| DateTime::<Utc>::from_timestamp(iat, 0));

        Ok(Self {
            is_anonymous: claims.is_anonymous_session(),
            user_id,
            email: claims.email,
            raw_role: claims.role,
            user_metadata: claims.user_metadata,
            app_metadata: claims.app_metadata,
            issued_at,
            expires_at,
        })
    }
}

/// Raw bearer credential, retained for pass-through to outbound calls.
///
/// `Debug` is redacted so the credential cannot leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Explicit access for forwarding; never log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Output of token verification: the principal plus its credential.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal {
    pub principal: Principal,
    pub credential: Credential,
}

/// A user's membership in a tenant, optionally carrying one tenant role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantMembership {
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub tenant_role_id: Option<RoleId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_debug_is_redacted() {
        let credential = Credential::new("eyJhbGciOiJIUzI1NiJ9.secret.sig");
        let rendered = format!("{credential:?}");
        assert!(!rendered.contains("secret"));
        assert_eq!(credential.expose(), "eyJhbGciOiJIUzI1NiJ9.secret.sig");
    }

    #[test]
    fn non_uuid_subject_is_invalid() {
        let claims = TokenClaims {
            sub: "alice".to_string(),
            email: None,
            role: None,
            user_metadata: Map::new(),
            app_metadata: Map::new(),
            iat: None,
            exp: 4_102_444_800,
            is_anonymous: false,
        };
        assert!(matches!(Principal::from_claims(claims), Err(AuthError::TokenInvalid(_))));
    }
}
