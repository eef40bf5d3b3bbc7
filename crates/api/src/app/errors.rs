use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use backoffice_auth::{AuthError, Locale};

/// Failure surfaced by the HTTP layer.
#[derive(Debug)]
pub enum ApiError {
    /// Pipeline rejection, localized for the caller.
    Auth { error: AuthError, locale: Locale },
    /// Handler reached without the authorization layers in front of it.
    MissingAccessContext,
}

impl ApiError {
    pub fn auth(error: AuthError, locale: Locale) -> Self {
        Self::Auth { error, locale }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth { error, locale } => {
                let status = StatusCode::from_u16(error.http_status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                json_error(status, error.code(), locale.message(&error))
            }
            ApiError::MissingAccessContext => json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal server error",
            ),
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_keep_their_status() {
        let response = ApiError::auth(AuthError::TokenRequired, Locale::En).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = ApiError::auth(
            AuthError::InsufficientPermissions("users:delete".into()),
            Locale::Fr,
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = ApiError::auth(AuthError::ConfigurationError, Locale::En).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
