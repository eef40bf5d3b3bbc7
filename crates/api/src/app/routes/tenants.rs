//! Tenant-scoped routes. The tenant in the path must match the caller's
//! tenant-context header unless the caller holds an elevated role.

use axum::{extract::Path, Json};

use backoffice_core::UserId;

use super::{TENANT_USERS_READ, TENANT_USERS_UPDATE};
use crate::app::dto::AccessDecision;
use crate::context::Caller;

/// GET /tenants/:tenant_id/users
pub async fn list_users(caller: Caller) -> Json<AccessDecision> {
    Json(AccessDecision::new(&caller, TENANT_USERS_READ))
}

/// PUT /tenants/:tenant_id/users/:user_id
pub async fn update_user(
    caller: Caller,
    Path((_tenant_id, user_id)): Path<(String, UserId)>,
) -> Json<AccessDecision> {
    Json(AccessDecision::new(&caller, TENANT_USERS_UPDATE).on_user(user_id))
}
