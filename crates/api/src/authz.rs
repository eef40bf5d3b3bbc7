//! Route-level access guard.
//!
//! Each protected route carries its own [`Guard`] as layer state. The layer
//! runs after authentication and before the handler, so a rejection never
//! produces handler side effects.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
    RequestPartsExt,
};

use backoffice_auth::{AccessContext, Guard, Locale, PipelineState};
use backoffice_core::TenantId;

use crate::app::errors::ApiError;
use crate::context::RequestedTenant;
use crate::middleware::record;

/// Path parameter naming the tenant a route acts on.
pub const TENANT_PATH_PARAM: &str = "tenant_id";

/// Attach `guard` to a route.
pub fn guarded(route: MethodRouter, guard: Guard) -> MethodRouter {
    route.route_layer(middleware::from_fn_with_state(Arc::new(guard), guard_middleware))
}

pub async fn guard_middleware(
    State(guard): State<Arc<Guard>>,
    req: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = req.into_parts();
    let locale = parts.extensions.get::<Locale>().copied().unwrap_or_default();

    let path_tenant = parts
        .extract::<Path<HashMap<String, String>>>()
        .await
        .ok()
        .and_then(|Path(mut params)| params.remove(TENANT_PATH_PARAM));

    let Some(access) = parts.extensions.get::<AccessContext>() else {
        tracing::error!("guarded route reached without an access context");
        return ApiError::MissingAccessContext.into_response();
    };
    let tenant = requested_tenant(path_tenant.as_deref(), access);

    if let Err(error) = guard.evaluate(access, tenant.as_ref()) {
        record(PipelineState::rejected(&error));
        tracing::warn!(
            code = error.code(),
            user_id = %access.user_id(),
            tenant_id = tenant.as_ref().map(TenantId::as_str),
            error = %error,
            "request rejected"
        );
        return ApiError::auth(error, locale).into_response();
    }

    record(PipelineState::Allowed);
    parts.extensions.insert(RequestedTenant(tenant));
    next.run(Request::from_parts(parts, body)).await
}

/// The tenant a route acts on: the path segment when the route has one,
/// otherwise the tenant-context header.
pub fn requested_tenant(path_tenant: Option<&str>, access: &AccessContext) -> Option<TenantId> {
    path_tenant
        .and_then(|raw| raw.parse::<TenantId>().ok())
        .or_else(|| access.tenant_context().tenant_id().cloned())
}
