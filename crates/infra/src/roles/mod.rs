//! Role repository adapters (`backoffice_auth::RoleRepository`).

pub mod in_memory;
pub mod permissions_json;
pub mod postgres;
pub mod seed;

pub use in_memory::InMemoryRoleRepository;
pub use permissions_json::decode_permissions;
pub use postgres::PostgresRoleRepository;
pub use seed::{RoleSeed, SeedError};
