//! `backoffice-auth` — the authorization pipeline as pure building blocks.
//!
//! Token verification, tenant context, role resolution, permission aggregation
//! and the access guard. Decoupled from HTTP; storage is reached only through
//! the [`RoleRepository`] port.

pub mod aggregate;
pub mod authorize;
pub mod claims;
pub mod error;
pub mod locale;
pub mod permissions;
pub mod principal;
pub mod resolver;
pub mod roles;
pub mod tenant_context;
pub mod token;

pub use aggregate::{aggregate, AggregatedPermissions};
pub use authorize::{AccessContext, Check, CombinationMode, GrantSource, Guard, PipelineState};
pub use claims::{validate_claims, TokenClaims};
pub use error::AuthError;
pub use locale::Locale;
pub use permissions::{PermissionMap, PermissionVerb, Resource};
pub use principal::{AuthenticatedPrincipal, Credential, Principal, TenantMembership};
pub use resolver::{RepositoryError, ResolvedRoles, RoleRepository, RoleResolver};
pub use roles::{MainRole, RoleTier, TenantRole};
pub use tenant_context::{TenantContext, TENANT_HEADER};
pub use token::{extract_bearer, TokenVerifier};
