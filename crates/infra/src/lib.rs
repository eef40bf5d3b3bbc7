//! Infrastructure layer: storage adapters behind the auth crate's ports.

pub mod roles;

pub use roles::{
    InMemoryRoleRepository, PostgresRoleRepository, RoleSeed, SeedError, decode_permissions,
};
