use axum::Json;

use super::{NOTIFICATIONS_READ, NOTIFICATION_LOGS_READ};
use crate::app::dto::AccessDecision;
use crate::context::Caller;

/// GET /notifications
///
/// Readable with either notification permission; the decision reports the
/// first one the caller holds.
pub async fn list(caller: Caller) -> Json<AccessDecision> {
    let check = [NOTIFICATIONS_READ, NOTIFICATION_LOGS_READ]
        .into_iter()
        .find(|check| {
            caller
                .access
                .check_permission(check.resource, check.verb, caller.requested_tenant.as_ref())
        })
        .unwrap_or(NOTIFICATIONS_READ);
    Json(AccessDecision::new(&caller, check))
}
