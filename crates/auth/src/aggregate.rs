//! Permission aggregation across main and tenant role scopes.
//!
//! A pure fold: same roles in, same maps out, regardless of input order.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use backoffice_core::TenantId;

use crate::{PermissionMap, PermissionVerb, ResolvedRoles, Resource};

/// Request-scoped permission view of one principal.
///
/// Every map is closed-world (all resources present). Never cached across
/// requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedPermissions {
    main: PermissionMap,
    tenants: BTreeMap<TenantId, PermissionMap>,
}

impl AggregatedPermissions {
    pub fn main(&self) -> &PermissionMap {
        &self.main
    }

    pub fn tenants(&self) -> &BTreeMap<TenantId, PermissionMap> {
        &self.tenants
    }

    pub fn tenant(&self, tenant_id: &TenantId) -> Option<&PermissionMap> {
        self.tenants.get(tenant_id)
    }

    pub fn tenant_ids(&self) -> BTreeSet<TenantId> {
        self.tenants.keys().cloned().collect()
    }

    pub fn allows_main(&self, resource: Resource, verb: PermissionVerb) -> bool {
        self.main.allows(resource, verb)
    }

    /// Only the named tenant's roles are consulted.
    pub fn allows_in_tenant(
        &self,
        tenant_id: &TenantId,
        resource: Resource,
        verb: PermissionVerb,
    ) -> bool {
        self.tenant(tenant_id)
            .is_some_and(|map| map.allows(resource, verb))
    }

    /// Union across every tenant the principal belongs to.
    pub fn allows_in_any_tenant(&self, resource: Resource, verb: PermissionVerb) -> bool {
        self.tenants.values().any(|map| map.allows(resource, verb))
    }
}

/// Merge both role scopes into closed-world permission maps.
pub fn aggregate(roles: &ResolvedRoles) -> AggregatedPermissions {
    let main = roles
        .main_roles
        .iter()
        .fold(PermissionMap::empty(), |acc, role| acc.union(&role.permissions));

    let tenants = roles
        .tenant_roles
        .iter()
        .fold(BTreeMap::new(), |mut acc: BTreeMap<TenantId, PermissionMap>, role| {
            let slot = acc.entry(role.tenant_id.clone()).or_default();
            *slot = std::mem::take(slot).union(&role.permissions);
            acc
        });

    AggregatedPermissions { main, tenants }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MainRole, TenantRole};
    use backoffice_core::RoleId;
    use proptest::prelude::*;

    fn main_role(name: &str, permissions: PermissionMap) -> MainRole {
        MainRole::new(RoleId::new(), name, permissions)
    }

    fn tenant_role(tenant: &str, permissions: PermissionMap) -> TenantRole {
        TenantRole::new(RoleId::new(), TenantId::from(tenant), "member", permissions)
    }

    #[test]
    fn no_roles_yields_closed_empty_main_map() {
        let aggregated = aggregate(&ResolvedRoles::default());
        assert_eq!(aggregated.main(), &PermissionMap::empty());
        assert!(aggregated.tenants().is_empty());
    }

    #[test]
    fn main_roles_are_unioned() {
        let roles = ResolvedRoles {
            main_roles: vec![
                main_role(
                    "reader",
                    PermissionMap::from_grants([(Resource::Users, [PermissionVerb::Read])]),
                ),
                main_role(
                    "writer",
                    PermissionMap::from_grants([(
                        Resource::Users,
                        [PermissionVerb::Read, PermissionVerb::Update],
                    )]),
                ),
            ],
            tenant_roles: vec![],
        };

        let aggregated = aggregate(&roles);
        let verbs: Vec<_> = aggregated.main().verbs(Resource::Users).collect();
        assert_eq!(verbs, vec![PermissionVerb::Read, PermissionVerb::Update]);
    }

    #[test]
    fn tenant_roles_stay_in_their_tenant() {
        let roles = ResolvedRoles {
            main_roles: vec![],
            tenant_roles: vec![
                tenant_role(
                    "t1",
                    PermissionMap::from_grants([(Resource::TenantUsers, [PermissionVerb::Update])]),
                ),
                tenant_role(
                    "t2",
                    PermissionMap::from_grants([(Resource::Activities, [PermissionVerb::Read])]),
                ),
            ],
        };

        let aggregated = aggregate(&roles);
        let t1 = TenantId::from("t1");
        let t2 = TenantId::from("t2");

        assert!(aggregated.allows_in_tenant(&t1, Resource::TenantUsers, PermissionVerb::Update));
        assert!(!aggregated.allows_in_tenant(&t2, Resource::TenantUsers, PermissionVerb::Update));
        assert!(aggregated.allows_in_any_tenant(Resource::Activities, PermissionVerb::Read));
        assert!(!aggregated.allows_main(Resource::TenantUsers, PermissionVerb::Update));
        assert_eq!(aggregated.tenant_ids(), BTreeSet::from([t1, t2]));
    }

    fn arb_verb() -> impl Strategy<Value = PermissionVerb> {
        prop::sample::select(PermissionVerb::ALL.to_vec())
    }

    fn arb_resource() -> impl Strategy<Value = Resource> {
        prop::sample::select(Resource::ALL.to_vec())
    }

    fn arb_map() -> impl Strategy<Value = PermissionMap> {
        prop::collection::vec((arb_resource(), prop::collection::vec(arb_verb(), 0..6)), 0..8)
            .prop_map(|grants| PermissionMap::from_grants(grants))
    }

    fn arb_roles() -> impl Strategy<Value = ResolvedRoles> {
        (
            prop::collection::vec(arb_map(), 0..4),
            prop::collection::vec((prop::sample::select(vec!["a", "b", "c"]), arb_map()), 0..8),
        )
            .prop_map(|(mains, tenants)| ResolvedRoles {
                main_roles: mains.into_iter().map(|m| main_role("member", m)).collect(),
                tenant_roles: tenants
                    .into_iter()
                    .map(|(t, m)| tenant_role(t, m))
                    .collect(),
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: every map carries every resource key, with unique verbs.
        #[test]
        fn every_resource_key_is_present(roles in arb_roles()) {
            let aggregated = aggregate(&roles);
            let maps = std::iter::once(aggregated.main()).chain(aggregated.tenants().values());
            for map in maps {
                let keys: Vec<Resource> = map.iter().map(|(r, _)| r).collect();
                prop_assert_eq!(keys, Resource::ALL.to_vec());
                for resource in Resource::ALL {
                    let verbs: Vec<_> = map.verbs(resource).collect();
                    let unique: BTreeSet<_> = verbs.iter().copied().collect();
                    prop_assert_eq!(verbs.len(), unique.len());
                }
            }
        }

        /// Property: permuting role lists never changes the result.
        #[test]
        fn aggregation_is_order_independent(
            (roles, shuffled) in arb_roles().prop_flat_map(|roles| {
                let mains = Just(roles.main_roles.clone()).prop_shuffle();
                let tenants = Just(roles.tenant_roles.clone()).prop_shuffle();
                (Just(roles), (mains, tenants).prop_map(|(main_roles, tenant_roles)| {
                    ResolvedRoles { main_roles, tenant_roles }
                }))
            })
        ) {
            prop_assert_eq!(aggregate(&roles), aggregate(&shuffled));
            prop_assert_eq!(aggregate(&roles), aggregate(&roles));
        }

        /// Property: a tenant's map is exactly the union of that tenant's roles.
        #[test]
        fn tenant_maps_only_see_their_own_roles(roles in arb_roles()) {
            let aggregated = aggregate(&roles);
            for (tenant_id, map) in aggregated.tenants() {
                let expected = roles
                    .tenant_roles
                    .iter()
                    .filter(|r| &r.tenant_id == tenant_id)
                    .fold(PermissionMap::empty(), |acc, r| acc.union(&r.permissions));
                prop_assert_eq!(map, &expected);
            }
        }
    }
}
