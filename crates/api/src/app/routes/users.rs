use axum::{extract::Path, Json};

use backoffice_core::UserId;

use super::{USERS_DELETE, USERS_READ};
use crate::app::dto::AccessDecision;
use crate::context::Caller;

/// GET /users
pub async fn list(caller: Caller) -> Json<AccessDecision> {
    Json(AccessDecision::new(&caller, USERS_READ))
}

/// DELETE /users/:user_id
pub async fn remove(caller: Caller, Path(user_id): Path<UserId>) -> Json<AccessDecision> {
    tracing::info!(actor = %caller.access.user_id(), target = %user_id, "user deletion authorized");
    Json(AccessDecision::new(&caller, USERS_DELETE).on_user(user_id))
}
