//! Request and response bodies of the Enclave API.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::CliError;

/// A user as returned by the users API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct UserRecord {
    /// User ID.
    #[tabled(rename = "ID")]
    pub id: String,
    /// Login name.
    #[tabled(rename = "Username")]
    pub name: String,
    /// Display name.
    #[tabled(rename = "Display Name")]
    #[serde(default)]
    pub display_name: String,
}

/// One RBAC policy: `role` may use `permission` on `resource_group`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct Policy {
    /// Role name.
    #[tabled(rename = "ROLE")]
    pub role: String,
    /// Resource group, or the wildcard.
    #[tabled(rename = "RESOURCE GROUP")]
    pub resource_group: String,
    /// HTTP method the policy grants.
    #[tabled(rename = "PERMISSION")]
    pub permission: String,
}

impl Policy {
    /// Creates a policy.
    pub fn new(role: &str, resource_group: &str, permission: &str) -> Self {
        Self {
            role: role.to_string(),
            resource_group: resource_group.to_string(),
            permission: permission.to_string(),
        }
    }
}

/// Body naming a role.
#[derive(Debug, Serialize)]
pub struct RoleBody<'a> {
    /// Role name.
    pub role: &'a str,
}

/// Body naming a resource group.
#[derive(Debug, Serialize)]
pub struct ResourceGroupBody<'a> {
    /// Resource group name.
    pub resource_group: &'a str,
}

/// Body for assigning or removing a role.
#[derive(Debug, Serialize)]
pub struct UserRoleBody<'a> {
    /// User ID.
    pub user_id: &'a str,
    /// Role name.
    pub role: &'a str,
}

/// Body for assigning or removing an endpoint.
#[derive(Debug, Serialize)]
pub struct EndpointBody<'a> {
    /// Endpoint path.
    pub endpoint: &'a str,
    /// Resource group name.
    pub resource_group: &'a str,
}

/// Create user request.
#[derive(Debug, Serialize)]
pub struct CreateUserRequest<'a> {
    /// Login name.
    pub name: &'a str,
    /// Display name.
    pub display_name: &'a str,
    /// Initial password.
    pub password: &'a str,
}

/// Delete user request.
#[derive(Debug, Serialize)]
pub struct DeleteUserRequest<'a> {
    /// User ID.
    pub id: &'a str,
}

/// Partial user update. Absent fields are left unchanged.
#[derive(Debug, Default, Serialize)]
pub struct UserPatch {
    /// User ID; omitted when updating the current user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// New login name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_display_name: Option<String>,
    /// New password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

impl UserPatch {
    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.new_name.is_none() && self.new_display_name.is_none() && self.new_password.is_none()
    }
}

/// Fully qualified artifact name: `<source>/<author>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fqn {
    /// Where the artifact comes from.
    pub source: String,
    /// Author namespace.
    pub author: String,
    /// Artifact name.
    pub name: String,
}

impl Fqn {
    /// Parses `<source>/<author>/<name>:<identifier>`.
    ///
    /// The identifier is everything after the first `:` of the name, so
    /// `hash:<version-hash>` survives intact.
    pub fn parse_with_identifier(value: &str) -> Result<(Self, String), CliError> {
        let invalid = || CliError::Validation(format!("provided FQN with identifier invalid: {value}"));
        let (source, author, rest) = split_fqn(value).ok_or_else(invalid)?;
        let (name, identifier) = rest.split_once(':').ok_or_else(invalid)?;
        Ok((Self::new(source, author, name), identifier.to_string()))
    }

    fn new(source: &str, author: &str, name: &str) -> Self {
        Self {
            source: source.to_string(),
            author: author.to_string(),
            name: name.to_string(),
        }
    }
}

impl FromStr for Fqn {
    type Err = CliError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (source, author, name) = split_fqn(value)
            .ok_or_else(|| CliError::Validation(format!("provided FQN invalid: {value}")))?;
        Ok(Self::new(source, author, name))
    }
}

impl fmt::Display for Fqn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.source, self.author, self.name)
    }
}

fn split_fqn(value: &str) -> Option<(&str, &str, &str)> {
    let mut parts = value.split('/');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(source), Some(author), Some(name), None) => Some((source, author, name)),
        _ => None,
    }
}

/// An artifact version as returned by the artifact API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Fully qualified name.
    pub fqn: Fqn,
    /// Content hash of this version.
    pub version_hash: String,
    /// Tags pointing at this version.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Upload time.
    pub created_at: DateTime<Utc>,
    /// Download count.
    #[serde(default)]
    pub pulls: u64,
}

/// Table row for an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct ArtifactRow {
    /// Fully qualified name.
    #[tabled(rename = "FQN")]
    pub fqn: String,
    /// Version hash.
    #[tabled(rename = "HASH")]
    pub hash: String,
    /// Tags, one per line.
    #[tabled(rename = "TAGS")]
    pub tags: String,
    /// Upload time.
    #[tabled(rename = "CREATED")]
    pub created: String,
    /// Download count.
    #[tabled(rename = "PULLS")]
    pub pulls: u64,
}

impl From<&Artifact> for ArtifactRow {
    fn from(artifact: &Artifact) -> Self {
        Self {
            fqn: artifact.fqn.to_string(),
            hash: artifact.version_hash.clone(),
            tags: artifact.tags.join("\n"),
            created: artifact.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            pulls: artifact.pulls,
        }
    }
}

/// Delete artifact request.
#[derive(Debug, Serialize)]
pub struct DeleteArtifactRequest<'a> {
    /// Artifact name.
    pub fqn: &'a Fqn,
    /// Tag or `hash:<version-hash>`.
    pub identifier: &'a str,
}

/// Add tag request.
#[derive(Debug, Serialize)]
pub struct AddTagRequest<'a> {
    /// Artifact name.
    pub fqn: &'a Fqn,
    /// Version the tag points at.
    pub version_hash: &'a str,
    /// Tag to add.
    pub new_tag: &'a str,
}

/// Remove tag request.
#[derive(Debug, Serialize)]
pub struct RemoveTagRequest<'a> {
    /// Artifact name.
    pub fqn: &'a Fqn,
    /// Version the tag points at.
    pub version_hash: &'a str,
    /// Tag to remove.
    pub tag: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_without_display_name_deserializes() {
        let user: UserRecord = serde_json::from_str(r#"{"id":"u1","name":"alice"}"#).unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.display_name, "");
    }

    #[test]
    fn patch_skips_unset_fields() {
        let patch = UserPatch {
            id: Some("u1".to_string()),
            new_display_name: Some("Alice".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"id": "u1", "new_display_name": "Alice"}));
    }

    #[test]
    fn empty_patch_is_detected() {
        let patch = UserPatch {
            id: Some("u1".to_string()),
            ..Default::default()
        };
        assert!(patch.is_empty());
    }

    #[test]
    fn fqn_has_exactly_three_parts() {
        let fqn: Fqn = "github/acme/auth".parse().unwrap();
        assert_eq!(fqn.source, "github");
        assert_eq!(fqn.author, "acme");
        assert_eq!(fqn.name, "auth");
        assert_eq!(fqn.to_string(), "github/acme/auth");

        assert!(matches!("acme/auth".parse::<Fqn>(), Err(CliError::Validation(_))));
        assert!("a/b/c/d".parse::<Fqn>().is_err());
    }

    #[test]
    fn identifier_keeps_hash_prefix() {
        let (fqn, identifier) = Fqn::parse_with_identifier("github/acme/auth:hash:9f2c").unwrap();
        assert_eq!(fqn.name, "auth");
        assert_eq!(identifier, "hash:9f2c");

        let (_, identifier) = Fqn::parse_with_identifier("github/acme/auth:latest").unwrap();
        assert_eq!(identifier, "latest");
    }

    #[test]
    fn identifier_is_required() {
        assert!(matches!(
            Fqn::parse_with_identifier("github/acme/auth"),
            Err(CliError::Validation(_))
        ));
        assert!(Fqn::parse_with_identifier("acme/auth:latest").is_err());
    }

    #[test]
    fn artifact_row_formats_fields() {
        let artifact: Artifact = serde_json::from_value(serde_json::json!({
            "fqn": {"source": "github", "author": "acme", "name": "auth"},
            "version_hash": "9f2c",
            "tags": ["latest", "stable"],
            "created_at": "2024-05-01T12:30:00Z",
            "pulls": 7
        }))
        .unwrap();

        let row = ArtifactRow::from(&artifact);
        assert_eq!(row.fqn, "github/acme/auth");
        assert_eq!(row.tags, "latest\nstable");
        assert_eq!(row.created, "2024-05-01 12:30:00");
        assert_eq!(row.pulls, 7);
    }

    #[test]
    fn tag_request_serializes_nested_fqn() {
        let fqn: Fqn = "github/acme/auth".parse().unwrap();
        let json = serde_json::to_value(AddTagRequest {
            fqn: &fqn,
            version_hash: "9f2c",
            new_tag: "stable",
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "fqn": {"source": "github", "author": "acme", "name": "auth"},
                "version_hash": "9f2c",
                "new_tag": "stable"
            })
        );
    }
}
