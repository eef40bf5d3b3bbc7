use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Protected entity categories.
///
/// The set is closed: every permission map carries exactly these keys.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Users,
    Tenants,
    Roles,
    TenantRoles,
    TenantUsers,
    Notifications,
    NotificationPreferences,
    NotificationLogs,
    Activities,
}

impl Resource {
    pub const ALL: [Resource; 9] = [
        Resource::Users,
        Resource::Tenants,
        Resource::Roles,
        Resource::TenantRoles,
        Resource::TenantUsers,
        Resource::Notifications,
        Resource::NotificationPreferences,
        Resource::NotificationLogs,
        Resource::Activities,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Tenants => "tenants",
            Resource::Roles => "roles",
            Resource::TenantRoles => "tenant_roles",
            Resource::TenantUsers => "tenant_users",
            Resource::Notifications => "notifications",
            Resource::NotificationPreferences => "notification_preferences",
            Resource::NotificationLogs => "notification_logs",
            Resource::Activities => "activities",
        }
    }
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = UnknownPermissionName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownPermissionName(s.to_string()))
    }
}

/// CRUD verb granted on a [`Resource`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionVerb {
    Create,
    Read,
    Update,
    Delete,
}

impl PermissionVerb {
    pub const ALL: [PermissionVerb; 4] = [
        PermissionVerb::Create,
        PermissionVerb::Read,
        PermissionVerb::Update,
        PermissionVerb::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionVerb::Create => "create",
            PermissionVerb::Read => "read",
            PermissionVerb::Update => "update",
            PermissionVerb::Delete => "delete",
        }
    }
}

impl core::fmt::Display for PermissionVerb {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionVerb {
    type Err = UnknownPermissionName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PermissionVerb::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownPermissionName(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission name '{0}'")]
pub struct UnknownPermissionName(pub String);

/// Closed-world permission map: resource → set of verbs.
///
/// Every [`Resource`] key is always present (possibly with an empty set), so
/// lookups never need an existence check. Verb sets are ordered sets, which
/// makes deduplication structural.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Resource, BTreeSet<PermissionVerb>>")]
pub struct PermissionMap(BTreeMap<Resource, BTreeSet<PermissionVerb>>);

impl PermissionMap {
    /// A map with every resource present and no verbs granted.
    pub fn empty() -> Self {
        Self(
            Resource::ALL
                .into_iter()
                .map(|r| (r, BTreeSet::new()))
                .collect(),
        )
    }

    /// Build a map from explicit grants; unspecified resources stay empty.
    pub fn from_grants<I, V>(grants: I) -> Self
    where
        I: IntoIterator<Item = (Resource, V)>,
        V: IntoIterator<Item = PermissionVerb>,
    {
        grants
            .into_iter()
            .fold(Self::empty(), |map, (resource, verbs)| map.with(resource, verbs))
    }

    /// Returns a copy of this map with `verbs` added to `resource`.
    pub fn with<V>(mut self, resource: Resource, verbs: V) -> Self
    where
        V: IntoIterator<Item = PermissionVerb>,
    {
        self.0.entry(resource).or_default().extend(verbs);
        self
    }

    /// Set-union of two maps.
    pub fn union(mut self, other: &PermissionMap) -> Self {
        for (resource, verbs) in &other.0 {
            self.0.entry(*resource).or_default().extend(verbs.iter().copied());
        }
        self
    }

    pub fn allows(&self, resource: Resource, verb: PermissionVerb) -> bool {
        self.0.get(&resource).is_some_and(|verbs| verbs.contains(&verb))
    }

    pub fn verbs(&self, resource: Resource) -> impl Iterator<Item = PermissionVerb> + '_ {
        self.0.get(&resource).into_iter().flatten().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Resource, &BTreeSet<PermissionVerb>)> {
        self.0.iter().map(|(r, v)| (*r, v))
    }

    /// True when no verb is granted on any resource.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeSet::is_empty)
    }
}

impl Default for PermissionMap {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<BTreeMap<Resource, BTreeSet<PermissionVerb>>> for PermissionMap {
    fn from(value: BTreeMap<Resource, BTreeSet<PermissionVerb>>) -> Self {
        Self::from_grants(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_map_has_every_resource_key() {
        let map = PermissionMap::empty();
        let keys: Vec<Resource> = map.iter().map(|(r, _)| r).collect();
        assert_eq!(keys, Resource::ALL.to_vec());
        assert!(map.is_empty());
    }

    #[test]
    fn grants_are_deduplicated() {
        let map = PermissionMap::from_grants([
            (Resource::Users, vec![PermissionVerb::Read, PermissionVerb::Read]),
            (Resource::Users, vec![PermissionVerb::Update, PermissionVerb::Read]),
        ]);
        let verbs: Vec<_> = map.verbs(Resource::Users).collect();
        assert_eq!(verbs, vec![PermissionVerb::Read, PermissionVerb::Update]);
    }

    #[test]
    fn deserializing_partial_json_fills_missing_resources() {
        let map: PermissionMap =
            serde_json::from_str(r#"{"users":["read","read"],"roles":[]}"#).unwrap();
        assert!(map.allows(Resource::Users, PermissionVerb::Read));
        assert_eq!(map.iter().count(), Resource::ALL.len());
        assert_eq!(map.verbs(Resource::Users).count(), 1);
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for resource in Resource::ALL {
            assert_eq!(resource.as_str().parse::<Resource>().unwrap(), resource);
        }
        assert!("widgets".parse::<Resource>().is_err());
        assert_eq!("delete".parse::<PermissionVerb>().unwrap(), PermissionVerb::Delete);
    }
}
