use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use backoffice_auth::{MainRole, RepositoryError, RoleRepository, TenantMembership, TenantRole};
use backoffice_core::{RoleId, TenantId, UserId};

use super::seed::{RoleSeed, SeedError};

#[derive(Debug, Clone)]
struct Stored<R> {
    role: R,
    deleted_at: Option<DateTime<Utc>>,
}

impl<R> Stored<R> {
    fn live(&self) -> Option<&R> {
        self.deleted_at.is_none().then_some(&self.role)
    }
}

#[derive(Debug, Default)]
struct Directory {
    users: HashMap<UserId, Option<RoleId>>,
    main_roles: HashMap<RoleId, Stored<MainRole>>,
    tenant_roles: HashMap<RoleId, Stored<TenantRole>>,
    memberships: HashMap<(UserId, TenantId), Option<RoleId>>,
}

/// In-memory role directory for tests/dev.
///
/// Soft-deleted roles stay in the map and are filtered by every lookup, like
/// the `deleted_at IS NULL` clauses of the Postgres adapter.
#[derive(Debug, Default)]
pub struct InMemoryRoleRepository {
    inner: RwLock<Directory>,
}

impl InMemoryRoleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from a seed document. Every referenced role must exist.
    pub fn from_seed(seed: RoleSeed) -> Result<Self, SeedError> {
        let mut dir = Directory::default();

        for role in seed.main_roles {
            let mut main = MainRole::new(role.id, role.name, role.permissions);
            main.is_system = role.is_system;
            dir.main_roles.insert(main.id, Stored { role: main, deleted_at: None });
        }

        for role in seed.tenant_roles {
            let mut tenant = TenantRole::new(role.id, role.tenant_id, role.name, role.permissions);
            tenant.is_default = role.is_default;
            tenant.is_system = role.is_system;
            dir.tenant_roles.insert(tenant.id, Stored { role: tenant, deleted_at: None });
        }

        for user in seed.users {
            if let Some(role_id) = user.main_role_id {
                if !dir.main_roles.contains_key(&role_id) {
                    return Err(SeedError::UnknownRole(role_id));
                }
            }
            dir.users.insert(user.id, user.main_role_id);

            for membership in user.memberships {
                if let Some(role_id) = membership.tenant_role_id {
                    if !dir.tenant_roles.contains_key(&role_id) {
                        return Err(SeedError::UnknownRole(role_id));
                    }
                }
                dir.memberships
                    .insert((user.id, membership.tenant_id), membership.tenant_role_id);
            }
        }

        Ok(Self {
            inner: RwLock::new(dir),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Directory>, RepositoryError> {
        self.inner
            .read()
            .map_err(|_| RepositoryError::Unavailable("role directory lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Directory>, RepositoryError> {
        self.inner
            .write()
            .map_err(|_| RepositoryError::Unavailable("role directory lock poisoned".to_string()))
    }

    pub fn upsert_main_role(&self, role: MainRole) -> Result<(), RepositoryError> {
        let mut dir = self.write()?;
        dir.main_roles.insert(role.id, Stored { role, deleted_at: None });
        Ok(())
    }

    pub fn upsert_tenant_role(&self, role: TenantRole) -> Result<(), RepositoryError> {
        let mut dir = self.write()?;
        dir.tenant_roles.insert(role.id, Stored { role, deleted_at: None });
        Ok(())
    }

    /// Point a user's record at a main role, creating the user if needed.
    pub fn assign_main_role(
        &self,
        user_id: UserId,
        role_id: Option<RoleId>,
    ) -> Result<(), RepositoryError> {
        let mut dir = self.write()?;
        dir.users.insert(user_id, role_id);
        Ok(())
    }

    /// At most one membership per tenant: re-adding replaces the role.
    pub fn add_membership(&self, membership: TenantMembership) -> Result<(), RepositoryError> {
        let mut dir = self.write()?;
        dir.memberships.insert(
            (membership.user_id, membership.tenant_id),
            membership.tenant_role_id,
        );
        Ok(())
    }

    pub fn remove_membership(
        &self,
        user_id: UserId,
        tenant_id: &TenantId,
    ) -> Result<bool, RepositoryError> {
        let mut dir = self.write()?;
        Ok(dir.memberships.remove(&(user_id, tenant_id.clone())).is_some())
    }

    /// Mark a main or tenant role deleted. Returns false for unknown ids.
    pub fn soft_delete_role(
        &self,
        role_id: RoleId,
        at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut dir = self.write()?;
        if let Some(stored) = dir.main_roles.get_mut(&role_id) {
            stored.deleted_at.get_or_insert(at);
            return Ok(true);
        }
        if let Some(stored) = dir.tenant_roles.get_mut(&role_id) {
            stored.deleted_at.get_or_insert(at);
            return Ok(true);
        }
        Ok(false)
    }

    /// Memberships of one user, ordered by tenant id.
    pub fn memberships_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<TenantMembership>, RepositoryError> {
        let dir = self.read()?;
        let mut memberships: Vec<_> = dir
            .memberships
            .iter()
            .filter(|((user, _), _)| *user == user_id)
            .map(|((user, tenant), role)| TenantMembership {
                user_id: *user,
                tenant_id: tenant.clone(),
                tenant_role_id: *role,
            })
            .collect();
        memberships.sort_by(|a, b| a.tenant_id.cmp(&b.tenant_id));
        Ok(memberships)
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn main_roles_for_user(&self, user_id: UserId) -> Result<Vec<MainRole>, RepositoryError> {
        let dir = self.read()?;
        let role = dir
            .users
            .get(&user_id)
            .copied()
            .flatten()
            .and_then(|role_id| dir.main_roles.get(&role_id))
            .and_then(Stored::live)
            .cloned();
        Ok(role.into_iter().collect())
    }

    async fn tenant_roles_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<TenantRole>, RepositoryError> {
        let dir = self.read()?;
        let mut roles: Vec<TenantRole> = dir
            .memberships
            .iter()
            .filter(|((user, _), _)| *user == user_id)
            .filter_map(|((_, tenant), role_id)| {
                let role = dir.tenant_roles.get(role_id.as_ref()?)?.live()?;
                // A role only applies inside the tenant that owns it.
                (&role.tenant_id == tenant).then(|| role.clone())
            })
            .collect();
        roles.sort_by(|a, b| a.tenant_id.cmp(&b.tenant_id).then(a.id.cmp(&b.id)));
        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backoffice_auth::{PermissionMap, PermissionVerb, Resource};

    fn reader() -> MainRole {
        MainRole::new(
            RoleId::new(),
            "support",
            PermissionMap::from_grants([(Resource::Users, [PermissionVerb::Read])]),
        )
    }

    fn editor(tenant: &str) -> TenantRole {
        TenantRole::new(
            RoleId::new(),
            TenantId::from(tenant),
            "editor",
            PermissionMap::from_grants([(Resource::TenantUsers, [PermissionVerb::Update])]),
        )
    }

    #[tokio::test]
    async fn resolves_main_role_through_user_record() {
        let repo = InMemoryRoleRepository::new();
        let user = UserId::new();
        let role = reader();
        repo.upsert_main_role(role.clone()).unwrap();
        repo.assign_main_role(user, Some(role.id)).unwrap();

        assert_eq!(repo.main_roles_for_user(user).await.unwrap(), vec![role]);
        assert!(repo.main_roles_for_user(UserId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn soft_deleted_roles_are_not_returned() {
        let repo = InMemoryRoleRepository::new();
        let user = UserId::new();
        let main = reader();
        let tenant = editor("t1");
        repo.upsert_main_role(main.clone()).unwrap();
        repo.upsert_tenant_role(tenant.clone()).unwrap();
        repo.assign_main_role(user, Some(main.id)).unwrap();
        repo.add_membership(TenantMembership {
            user_id: user,
            tenant_id: TenantId::from("t1"),
            tenant_role_id: Some(tenant.id),
        })
        .unwrap();

        assert!(repo.soft_delete_role(main.id, Utc::now()).unwrap());
        assert!(repo.soft_delete_role(tenant.id, Utc::now()).unwrap());
        assert!(!repo.soft_delete_role(RoleId::new(), Utc::now()).unwrap());

        assert!(repo.main_roles_for_user(user).await.unwrap().is_empty());
        assert!(repo.tenant_roles_for_user(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn tenant_roles_follow_memberships() {
        let repo = InMemoryRoleRepository::new();
        let user = UserId::new();
        let t1 = editor("t1");
        let t2 = editor("t2");
        repo.upsert_tenant_role(t1.clone()).unwrap();
        repo.upsert_tenant_role(t2.clone()).unwrap();

        for (tenant, role) in [("t1", Some(t1.id)), ("t2", Some(t2.id)), ("t3", None)] {
            repo.add_membership(TenantMembership {
                user_id: user,
                tenant_id: TenantId::from(tenant),
                tenant_role_id: role,
            })
            .unwrap();
        }

        assert_eq!(repo.tenant_roles_for_user(user).await.unwrap(), vec![t1, t2]);
        assert_eq!(repo.memberships_for_user(user).unwrap().len(), 3);

        assert!(repo.remove_membership(user, &TenantId::from("t2")).unwrap());
        let roles = repo.tenant_roles_for_user(user).await.unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].tenant_id, TenantId::from("t1"));
    }

    #[tokio::test]
    async fn membership_pointing_at_another_tenants_role_is_ignored() {
        let repo = InMemoryRoleRepository::new();
        let user = UserId::new();
        let foreign = editor("t1");
        repo.upsert_tenant_role(foreign.clone()).unwrap();
        repo.add_membership(TenantMembership {
            user_id: user,
            tenant_id: TenantId::from("t2"),
            tenant_role_id: Some(foreign.id),
        })
        .unwrap();

        assert!(repo.tenant_roles_for_user(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn loads_seed_document() {
        let admin = RoleId::new();
        let member = RoleId::new();
        let user = UserId::new();
        let document = format!(
            r#"{{
                "main_roles": [{{ "id": "{admin}", "name": "admin", "is_system": true }}],
                "tenant_roles": [{{
                    "id": "{member}", "tenant_id": "t1", "name": "member",
                    "permissions": {{ "tenant_users": ["read"] }}
                }}],
                "users": [{{
                    "id": "{user}", "main_role_id": "{admin}",
                    "memberships": [{{ "tenant_id": "t1", "tenant_role_id": "{member}" }}]
                }}]
            }}"#
        );

        let seed = RoleSeed::from_json(&document).unwrap();
        let repo = InMemoryRoleRepository::from_seed(seed).unwrap();
        let main = repo.main_roles_for_user(user).await.unwrap();
        assert_eq!(main.len(), 1);
        assert!(main[0].is_elevated());
        assert!(main[0].is_system);

        let tenant = repo.tenant_roles_for_user(user).await.unwrap();
        assert!(tenant[0].permissions.allows(Resource::TenantUsers, PermissionVerb::Read));
    }

    #[test]
    fn seed_with_dangling_role_is_rejected() {
        let missing = RoleId::new();
        let document = format!(
            r#"{{ "users": [{{ "id": "{}", "main_role_id": "{missing}" }}] }}"#,
            UserId::new()
        );
        let seed = RoleSeed::from_json(&document).unwrap();
        let err = InMemoryRoleRepository::from_seed(seed).unwrap_err();
        assert!(matches!(err, SeedError::UnknownRole(id) if id == missing));
    }
}
