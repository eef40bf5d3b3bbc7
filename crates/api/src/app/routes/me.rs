//! Caller introspection. Guarded by an empty check list: any verified
//! principal passes, and the decision object is still attached.

use axum::Json;

use crate::app::dto::{MeResponse, PermissionsResponse};
use crate::context::Caller;

/// GET /me
pub async fn me(caller: Caller) -> Json<MeResponse> {
    Json(MeResponse::from(&caller))
}

/// GET /me/permissions
pub async fn permissions(caller: Caller) -> Json<PermissionsResponse> {
    Json(PermissionsResponse::from(&caller))
}
