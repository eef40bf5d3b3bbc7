//! Authentication layer: token, tenant context, roles, permissions.
//!
//! Runs ahead of every protected route. On success the request carries an
//! [`AuthenticatedPrincipal`], an [`AccessContext`] and the negotiated
//! [`Locale`] as extensions; on failure the handler never runs.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::Span;

use backoffice_auth::{
    AccessContext, AuthError, AuthenticatedPrincipal, Locale, PipelineState, RepositoryError,
    RoleRepository, RoleResolver, TENANT_HEADER, TenantContext, TokenVerifier,
};

use crate::app::errors::ApiError;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<TokenVerifier>,
    pub resolver: RoleResolver,
    /// Bound on role resolution; in-flight lookups are dropped on expiry.
    pub timeout: Duration,
}

impl AuthState {
    pub fn new(
        verifier: TokenVerifier,
        repository: Arc<dyn RoleRepository>,
        timeout: Duration,
    ) -> Self {
        Self {
            verifier: Arc::new(verifier),
            resolver: RoleResolver::new(repository),
            timeout,
        }
    }
}

#[tracing::instrument(
    name = "authorize",
    skip_all,
    fields(pipeline = PipelineState::Unauthenticated.as_str(), user_id = tracing::field::Empty)
)]
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let locale = Locale::negotiate(header_str(req.headers(), header::ACCEPT_LANGUAGE));

    match authenticate(&state, req.headers()).await {
        Ok((principal, access)) => {
            let extensions = req.extensions_mut();
            extensions.insert(locale);
            extensions.insert(principal);
            extensions.insert(access);
            next.run(req).await
        }
        Err(error) => {
            record(PipelineState::rejected(&error));
            if error.is_server_fault() {
                tracing::error!(code = error.code(), error = %error, "request rejected");
            } else {
                tracing::warn!(code = error.code(), error = %error, "request rejected");
            }
            ApiError::auth(error, locale).into_response()
        }
    }
}

async fn authenticate(
    state: &AuthState,
    headers: &HeaderMap,
) -> Result<(AuthenticatedPrincipal, AccessContext), AuthError> {
    let authorization = match headers.get(header::AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| AuthError::token_invalid("authorization header is not ascii"))?,
        ),
        None => None,
    };

    let authenticated = state.verifier.verify(authorization, Utc::now())?;
    let user_id = authenticated.principal.user_id;
    Span::current().record("user_id", tracing::field::display(user_id));
    record(PipelineState::TokenVerified);

    let tenant_context = TenantContext::from_header(header_str(headers, TENANT_HEADER));

    let roles = tokio::time::timeout(state.timeout, state.resolver.resolve(user_id))
        .await
        .map_err(|_| {
            AuthError::Persistence(RepositoryError::Unavailable(format!(
                "role lookup exceeded {:?}",
                state.timeout
            )))
        })??;
    record(PipelineState::RolesResolved);

    let access = AccessContext::new(user_id, &roles, tenant_context);
    record(PipelineState::PermissionsAggregated);

    Ok((authenticated, access))
}

pub(crate) fn record(state: PipelineState) {
    Span::current().record("pipeline", state.as_str());
    if state.is_terminal() {
        tracing::debug!(pipeline = state.as_str(), "authorization decided");
    }
}

pub(crate) fn header_str<K: header::AsHeaderName>(headers: &HeaderMap, name: K) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
