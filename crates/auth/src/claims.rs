use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::AuthError;

/// Raw role label the identity provider stamps on unauthenticated sessions.
pub const ANONYMOUS_ROLE_LABEL: &str = "anon";

/// Claims carried by identity-provider tokens.
///
/// Only `sub` and `exp` are mandatory; the rest default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject / user identifier.
    pub sub: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Raw role label assigned by the identity provider (not a main role).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default)]
    pub user_metadata: Map<String, Value>,

    #[serde(default)]
    pub app_metadata: Map<String, Value>,

    /// Issued-at (unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiry (unix seconds).
    pub exp: i64,

    #[serde(default)]
    pub is_anonymous: bool,
}

impl TokenClaims {
    pub fn is_anonymous_session(&self) -> bool {
        self.is_anonymous || self.role.as_deref() == Some(ANONYMOUS_ROLE_LABEL)
    }
}

/// Deterministically validate decoded claims against `now`.
///
/// Signature verification happens before this in [`crate::TokenVerifier`];
/// this only checks the time window and the anonymous flag.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), AuthError> {
    if now.timestamp() >= claims.exp {
        return Err(AuthError::TokenExpired);
    }
    // Only reached for unexpired tokens.
    if claims.iat.is_some_and(|iat| claims.exp <= iat) {
        return Err(AuthError::token_invalid("expiry precedes issued-at"));
    }
    if claims.is_anonymous_session() {
        return Err(AuthError::AnonymousNotAllowed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(now: DateTime<Utc>) -> TokenClaims {
        TokenClaims {
            sub: "00000000-0000-0000-0000-000000000001".to_string(),
            email: Some("alice@example.com".to_string()),
            role: Some("authenticated".to_string()),
            user_metadata: Map::new(),
            app_metadata: Map::new(),
            iat: Some(now.timestamp()),
            exp: (now + Duration::minutes(10)).timestamp(),
            is_anonymous: false,
        }
    }

    #[test]
    fn fresh_claims_are_accepted() {
        let now = Utc::now();
        assert_eq!(validate_claims(&claims(now), now), Ok(()));
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let mut c = claims(now);
        c.exp = now.timestamp();
        assert_eq!(validate_claims(&c, now), Err(AuthError::TokenExpired));
    }

    #[test]
    fn expired_wins_over_anonymous() {
        let now = Utc::now();
        let mut c = claims(now);
        c.iat = None;
        c.exp = now.timestamp() - 60;
        c.is_anonymous = true;
        assert_eq!(validate_claims(&c, now), Err(AuthError::TokenExpired));
    }

    #[test]
    fn anonymous_flag_or_label_is_rejected() {
        let now = Utc::now();
        let mut c = claims(now);
        c.is_anonymous = true;
        assert_eq!(validate_claims(&c, now), Err(AuthError::AnonymousNotAllowed));

        let mut c = claims(now);
        c.role = Some(ANONYMOUS_ROLE_LABEL.to_string());
        assert_eq!(validate_claims(&c, now), Err(AuthError::AnonymousNotAllowed));
    }

    #[test]
    fn elapsed_expiry_wins_over_inverted_window() {
        let now = Utc::now();
        let mut c = claims(now);
        c.iat = Some(now.timestamp() - 3600);
        c.exp = now.timestamp() - 3600;
        assert_eq!(validate_claims(&c, now), Err(AuthError::TokenExpired));

        c.iat = Some(now.timestamp());
        c.exp = now.timestamp() - 300;
        assert_eq!(validate_claims(&c, now), Err(AuthError::TokenExpired));
    }

    #[test]
    fn inverted_time_window_is_invalid() {
        let now = Utc::now();
        let mut c = claims(now);
        c.iat = Some(c.exp + 1);
        assert!(matches!(validate_claims(&c, now), Err(AuthError::TokenInvalid(_))));
    }
}
