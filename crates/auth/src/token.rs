use std::collections::HashSet;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};

use crate::claims::validate_claims;
use crate::{AuthError, AuthenticatedPrincipal, Credential, Principal, TokenClaims};

/// HS256 verifier for identity-provider tokens.
///
/// A verifier built without a secret is valid to hold but fails every
/// verification with [`AuthError::ConfigurationError`]; a missing secret is an
/// operational fault, reported per request rather than at startup.
#[derive(Clone)]
pub struct TokenVerifier {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl TokenVerifier {
    /// Build a verifier from the shared secret. `None` or an empty secret
    /// yields an unconfigured verifier.
    pub fn hs256(secret: Option<&[u8]>) -> Self {
        let key = secret
            .filter(|s| !s.is_empty())
            .map(DecodingKey::from_secret);

        // Expiry is checked by `validate_claims` against an injected clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims =
            HashSet::from(["exp".to_string(), "sub".to_string()]);

        Self { key, validation }
    }

    pub fn unconfigured() -> Self {
        Self::hs256(None)
    }

    pub fn is_configured(&self) -> bool {
        self.key.is_some()
    }

    /// Verify the `Authorization` header value and build the principal.
    ///
    /// Order of checks: credential present, secret configured, signature,
    /// expiry, anonymous session.
    pub fn verify(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedPrincipal, AuthError> {
        let token = extract_bearer(authorization)?;
        let claims = self.decode(token)?;
        validate_claims(&claims, now)?;
        let principal = Principal::from_claims(claims)?;

        Ok(AuthenticatedPrincipal {
            principal,
            credential: Credential::new(token),
        })
    }

    /// Check the signature and decode claims, without time-window checks.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let key = self.key.as_ref().ok_or(AuthError::ConfigurationError)?;

        decode::<TokenClaims>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::token_invalid("signature mismatch"),
                ErrorKind::InvalidAlgorithm => AuthError::token_invalid("unexpected algorithm"),
                ErrorKind::MissingRequiredClaim(claim) => {
                    AuthError::token_invalid(format!("missing claim '{claim}'"))
                }
                _ => AuthError::token_invalid("malformed token"),
            })
    }
}

impl core::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("configured", &self.is_configured())
            .finish()
    }
}

/// Extract the credential from an `Authorization` header value.
///
/// Accepts both `Bearer <token>` (scheme case-insensitive) and a bare token.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.map(str::trim).unwrap_or_default();

    let token = match header.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("bearer ") => header[7..].trim(),
        _ => header,
    };

    if token.is_empty() || token.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::TokenRequired);
    }

    Ok(token)
}
