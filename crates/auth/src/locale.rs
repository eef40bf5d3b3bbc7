//! Response locale negotiation and localized rejection messages.

use serde::Serialize;

use crate::AuthError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
    Fr,
    De,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
            Locale::Fr => "fr",
            Locale::De => "de",
        }
    }

    fn from_primary_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', '_']).next()?.trim();
        match primary.to_ascii_lowercase().as_str() {
            "en" => Some(Locale::En),
            "es" => Some(Locale::Es),
            "fr" => Some(Locale::Fr),
            "de" => Some(Locale::De),
            _ => None,
        }
    }

    /// Pick the best supported locale from an `Accept-Language` value.
    ///
    /// Best effort: malformed entries are skipped, `q=0` and non-finite
    /// q-values are ignored, ties keep header order, and anything unmatched
    /// falls back to English.
    pub fn negotiate(accept_language: Option<&str>) -> Self {
        let Some(header) = accept_language else {
            return Locale::default();
        };

        let mut best: Option<(f32, Locale)> = None;
        for entry in header.split(',') {
            let mut parts = entry.split(';');
            let tag = parts.next().unwrap_or_default().trim();
            let quality = parts
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);

            if !quality.is_finite() || quality <= 0.0 {
                continue;
            }
            let Some(locale) = Locale::from_primary_tag(tag) else {
                continue;
            };
            if best.is_none_or(|(q, _)| quality > q) {
                best = Some((quality, locale));
            }
        }

        best.map(|(_, locale)| locale).unwrap_or_default()
    }

    /// Client-facing message for a pipeline failure.
    pub fn message(&self, error: &AuthError) -> &'static str {
        match (self, error) {
            (Locale::En, AuthError::TokenRequired) => "Authorization token is required",
            (Locale::En, AuthError::TokenExpired) => "Authorization token has expired",
            (Locale::En, AuthError::TokenInvalid(_)) => "Authorization token is invalid",
            (Locale::En, AuthError::ConfigurationError) => "Authentication is not configured",
            (Locale::En, AuthError::AnonymousNotAllowed) => "Anonymous sessions are not allowed",
            (Locale::En, AuthError::InsufficientPermissions(_)) => "Insufficient permissions",
            (Locale::En, AuthError::UnauthorizedTenant(_)) => "Not authorized for this tenant",
            (Locale::En, AuthError::Persistence(_)) => "Unable to load roles",

            (Locale::Es, AuthError::TokenRequired) => "Se requiere un token de autorización",
            (Locale::Es, AuthError::TokenExpired) => "El token de autorización ha expirado",
            (Locale::Es, AuthError::TokenInvalid(_)) => "El token de autorización no es válido",
            (Locale::Es, AuthError::ConfigurationError) => "La autenticación no está configurada",
            (Locale::Es, AuthError::AnonymousNotAllowed) => "No se permiten sesiones anónimas",
            (Locale::Es, AuthError::InsufficientPermissions(_)) => "Permisos insuficientes",
            (Locale::Es, AuthError::UnauthorizedTenant(_)) => "No autorizado para este inquilino",
            (Locale::Es, AuthError::Persistence(_)) => "No se pudieron cargar los roles",

            (Locale::Fr, AuthError::TokenRequired) => "Un jeton d'autorisation est requis",
            (Locale::Fr, AuthError::TokenExpired) => "Le jeton d'autorisation a expiré",
            (Locale::Fr, AuthError::TokenInvalid(_)) => "Le jeton d'autorisation est invalide",
            (Locale::Fr, AuthError::ConfigurationError) => {
                "L'authentification n'est pas configurée"
            }
            (Locale::Fr, AuthError::AnonymousNotAllowed) => {
                "Les sessions anonymes ne sont pas autorisées"
            }
            (Locale::Fr, AuthError::InsufficientPermissions(_)) => "Permissions insuffisantes",
            (Locale::Fr, AuthError::UnauthorizedTenant(_)) => "Non autorisé pour ce locataire",
            (Locale::Fr, AuthError::Persistence(_)) => "Impossible de charger les rôles",

            (Locale::De, AuthError::TokenRequired) => "Autorisierungstoken erforderlich",
            (Locale::De, AuthError::TokenExpired) => "Autorisierungstoken ist abgelaufen",
            (Locale::De, AuthError::TokenInvalid(_)) => "Autorisierungstoken ist ungültig",
            (Locale::De, AuthError::ConfigurationError) => {
                "Authentifizierung ist nicht konfiguriert"
            }
            (Locale::De, AuthError::AnonymousNotAllowed) => "Anonyme Sitzungen sind nicht erlaubt",
            (Locale::De, AuthError::InsufficientPermissions(_)) => "Unzureichende Berechtigungen",
            (Locale::De, AuthError::UnauthorizedTenant(_)) => {
                "Keine Berechtigung für diesen Mandanten"
            }
            (Locale::De, AuthError::Persistence(_)) => "Rollen konnten nicht geladen werden",
        }
    }
}
