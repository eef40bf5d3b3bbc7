use axum::{
    routing::{delete, get, put},
    Router,
};

use backoffice_auth::{Check, Guard, PermissionVerb, Resource};

use crate::authz::guarded;

pub mod me;
pub mod notifications;
pub mod system;
pub mod tenants;
pub mod users;

pub const USERS_READ: Check = Check::new(Resource::Users, PermissionVerb::Read);
pub const USERS_DELETE: Check = Check::new(Resource::Users, PermissionVerb::Delete);
pub const TENANT_USERS_READ: Check =
    Check::tenant_scoped(Resource::TenantUsers, PermissionVerb::Read);
pub const TENANT_USERS_UPDATE: Check =
    Check::tenant_scoped(Resource::TenantUsers, PermissionVerb::Update);
pub const NOTIFICATIONS_READ: Check = Check::new(Resource::Notifications, PermissionVerb::Read);
pub const NOTIFICATION_LOGS_READ: Check =
    Check::new(Resource::NotificationLogs, PermissionVerb::Read);

/// Router for all authenticated endpoints. Each route carries its own guard.
pub fn router() -> Router {
    Router::new()
        .route("/me", guarded(get(me::me), Guard::open()))
        .route("/me/permissions", guarded(get(me::permissions), Guard::open()))
        .route("/users", guarded(get(users::list), Guard::all([USERS_READ])))
        .route(
            "/users/:user_id",
            guarded(delete(users::remove), Guard::all([USERS_DELETE])),
        )
        .route(
            "/tenants/:tenant_id/users",
            guarded(get(tenants::list_users), Guard::all([TENANT_USERS_READ])),
        )
        .route(
            "/tenants/:tenant_id/users/:user_id",
            guarded(put(tenants::update_user), Guard::all([TENANT_USERS_UPDATE])),
        )
        .route(
            "/notifications",
            guarded(
                get(notifications::list),
                Guard::any([NOTIFICATIONS_READ, NOTIFICATION_LOGS_READ]),
            ),
        )
}
