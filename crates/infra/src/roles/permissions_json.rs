//! Decoding of stored `permissions` documents.
//!
//! Rows store a JSON object of resource name to verb list, e.g.
//! `{"users": ["read", "update"]}`. Names this build does not know are skipped
//! with a warning, so a newer schema never locks every user out.

use serde_json::Value;

use backoffice_auth::{PermissionMap, PermissionVerb, RepositoryError, Resource};

/// Decode a permissions document into a closed-world [`PermissionMap`].
///
/// `null` means no grants. Any shape other than an object of string arrays is a
/// [`RepositoryError::Decode`].
pub fn decode_permissions(role: &str, value: &Value) -> Result<PermissionMap, RepositoryError> {
    let object = match value {
        Value::Null => return Ok(PermissionMap::empty()),
        Value::Object(object) => object,
        other => {
            return Err(RepositoryError::Decode(format!(
                "permissions of role {role} must be an object, got {}",
                kind(other)
            )));
        }
    };

    let mut grants = Vec::with_capacity(object.len());
    for (resource_name, verbs) in object {
        let Value::Array(verbs) = verbs else {
            return Err(RepositoryError::Decode(format!(
                "permissions of role {role}: {resource_name} must list verbs"
            )));
        };

        let Ok(resource) = resource_name.parse::<Resource>() else {
            tracing::warn!(role, resource = %resource_name, "ignoring unknown resource");
            continue;
        };

        let mut parsed = Vec::with_capacity(verbs.len());
        for verb in verbs {
            let Some(name) = verb.as_str() else {
                return Err(RepositoryError::Decode(format!(
                    "permissions of role {role}: {resource_name} verbs must be strings"
                )));
            };
            match name.parse::<PermissionVerb>() {
                Ok(verb) => parsed.push(verb),
                Err(_) => {
                    tracing::warn!(role, resource = %resource, verb = name, "ignoring unknown verb")
                }
            }
        }
        grants.push((resource, parsed));
    }

    Ok(PermissionMap::from_grants(grants))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_names_are_decoded_and_deduplicated() {
        let map = decode_permissions(
            "editor",
            &json!({ "users": ["read", "read", "update"], "tenant_users": ["delete"] }),
        )
        .unwrap();

        let users: Vec<_> = map.verbs(Resource::Users).collect();
        assert_eq!(users, vec![PermissionVerb::Read, PermissionVerb::Update]);
        assert!(map.allows(Resource::TenantUsers, PermissionVerb::Delete));
        assert!(!map.allows(Resource::Roles, PermissionVerb::Read));
    }

    #[test]
    fn unknown_names_are_skipped() {
        let map = decode_permissions(
            "legacy",
            &json!({ "billing": ["read"], "users": ["read", "approve"] }),
        )
        .unwrap();

        let users: Vec<_> = map.verbs(Resource::Users).collect();
        assert_eq!(users, vec![PermissionVerb::Read]);
    }

    #[test]
    fn null_is_no_grants() {
        assert_eq!(
            decode_permissions("empty", &Value::Null).unwrap(),
            PermissionMap::empty()
        );
    }

    #[test]
    fn malformed_documents_are_decode_errors() {
        let err = decode_permissions("broken", &json!(["users"])).unwrap_err();
        assert!(matches!(err, RepositoryError::Decode(_)));

        let err = decode_permissions("broken", &json!({ "users": "read" })).unwrap_err();
        assert!(matches!(err, RepositoryError::Decode(_)));

        let err = decode_permissions("broken", &json!({ "users": [1] })).unwrap_err();
        assert!(matches!(err, RepositoryError::Decode(_)));
    }
}
