//! Remote data sources the enricher draws from.

use async_trait::async_trait;

use crate::client::ApiClient;
use crate::model::{Policy, UserRecord};
use crate::{CliError, CliResult};

/// A remote service that answers one bulk listing and one call per key.
///
/// Implementations must be safe to call concurrently for distinct keys and
/// must not mutate shared state.
#[async_trait]
pub trait RemoteDataSource: Send + Sync {
    /// One fact of the bulk listing.
    type Record: Send + Sync;

    /// Per-key result. `Default` is the value a failed key degrades to.
    type Value: Default + Send;

    /// Fetches the bulk dataset. Sources without a bulk phase keep the
    /// default, which issues no request.
    async fn fetch_bulk(&self) -> CliResult<Vec<Self::Record>> {
        Ok(Vec::new())
    }

    /// Fetches the value for one key.
    async fn fetch_per_key(&self, key: &str) -> CliResult<Self::Value>;

    /// Field of a bulk record compared against keys.
    fn discriminator(record: &Self::Record) -> &str;

    /// Checks a key before any request is made.
    fn validate_key(&self, key: &str) -> CliResult<()> {
        validate_identifier("key", key)
    }
}

/// Rejects identifiers that can never name a remote object.
pub fn validate_identifier(kind: &str, value: &str) -> CliResult<()> {
    if value.is_empty() {
        return Err(CliError::Validation(format!("{kind} must not be empty")));
    }
    if value.trim() != value {
        return Err(CliError::Validation(format!(
            "{kind} '{value}' has leading or trailing whitespace"
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(CliError::Validation(format!(
            "{kind} {value:?} contains control characters"
        )));
    }
    Ok(())
}

/// Fetches every policy.
pub async fn fetch_policies(client: &ApiClient) -> CliResult<Vec<Policy>> {
    client.get("/rbac/policy").await
}

/// Fetches a user by ID.
pub async fn fetch_user_by_id(client: &ApiClient, id: &str) -> CliResult<UserRecord> {
    client
        .get(&format!("/users/user?user_id={}", urlencoding::encode(id)))
        .await
        .map_err(|e| e.for_resource("User", id))
}

/// Fetches a user by login name.
pub async fn fetch_user_by_name(client: &ApiClient, name: &str) -> CliResult<UserRecord> {
    client
        .get(&format!("/users/user?name={}", urlencoding::encode(name)))
        .await
        .map_err(|e| e.for_resource("User", name))
}

/// Roles, enriched with their policies and member IDs.
pub struct RoleSource<'a> {
    client: &'a ApiClient,
}

impl<'a> RoleSource<'a> {
    /// Creates the source.
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<'a> RemoteDataSource for RoleSource<'a> {
    type Record = Policy;
    type Value = Vec<String>;

    async fn fetch_bulk(&self) -> CliResult<Vec<Policy>> {
        fetch_policies(self.client).await
    }

    async fn fetch_per_key(&self, role: &str) -> CliResult<Vec<String>> {
        self.client
            .get(&format!("/rbac/role?role={}", urlencoding::encode(role)))
            .await
            .map_err(|e| e.for_resource("Role", role))
    }

    fn discriminator(policy: &Policy) -> &str {
        &policy.role
    }

    fn validate_key(&self, key: &str) -> CliResult<()> {
        validate_identifier("role", key)
    }
}

/// Resource groups, enriched with their policies and endpoints.
pub struct ResourceGroupSource<'a> {
    client: &'a ApiClient,
}

impl<'a> ResourceGroupSource<'a> {
    /// Creates the source.
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<'a> RemoteDataSource for ResourceGroupSource<'a> {
    type Record = Policy;
    type Value = Vec<String>;

    async fn fetch_bulk(&self) -> CliResult<Vec<Policy>> {
        fetch_policies(self.client).await
    }

    async fn fetch_per_key(&self, group: &str) -> CliResult<Vec<String>> {
        self.client
            .get(&format!(
                "/rbac/resource_group?resource_group={}",
                urlencoding::encode(group)
            ))
            .await
            .map_err(|e| e.for_resource("Resource group", group))
    }

    fn discriminator(policy: &Policy) -> &str {
        &policy.resource_group
    }

    fn validate_key(&self, key: &str) -> CliResult<()> {
        validate_identifier("resource group", key)
    }
}

/// Users looked up by ID.
pub struct UserByIdSource<'a> {
    client: &'a ApiClient,
}

impl<'a> UserByIdSource<'a> {
    /// Creates the source.
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<'a> RemoteDataSource for UserByIdSource<'a> {
    type Record = ();
    type Value = UserRecord;

    async fn fetch_per_key(&self, id: &str) -> CliResult<UserRecord> {
        fetch_user_by_id(self.client, id).await
    }

    fn discriminator(_: &()) -> &str {
        ""
    }

    fn validate_key(&self, key: &str) -> CliResult<()> {
        validate_identifier("user id", key)
    }
}

/// Users looked up by login name.
pub struct UserByNameSource<'a> {
    client: &'a ApiClient,
}

impl<'a> UserByNameSource<'a> {
    /// Creates the source.
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<'a> RemoteDataSource for UserByNameSource<'a> {
    type Record = ();
    type Value = UserRecord;

    async fn fetch_per_key(&self, name: &str) -> CliResult<UserRecord> {
        fetch_user_by_name(self.client, name).await
    }

    fn discriminator(_: &()) -> &str {
        ""
    }

    fn validate_key(&self, key: &str) -> CliResult<()> {
        validate_identifier("username", key)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::BasicAuth;

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::with_auth(
            &server.uri(),
            Arc::new(BasicAuth::new("admin", "secret")),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn accepts_plain_identifiers() {
        assert!(validate_identifier("role", "admin").is_ok());
        assert!(validate_identifier("role", "team lead").is_ok());
        assert!(validate_identifier("user id", "0b5e-41").is_ok());
    }

    #[test]
    fn rejects_empty_identifier() {
        assert!(matches!(
            validate_identifier("role", ""),
            Err(CliError::Validation(_))
        ));
    }

    #[test]
    fn rejects_padded_identifier() {
        assert!(matches!(
            validate_identifier("role", " admin"),
            Err(CliError::Validation(_))
        ));
    }

    #[test]
    fn rejects_control_characters() {
        assert!(matches!(
            validate_identifier("username", "ali\nce"),
            Err(CliError::Validation(_))
        ));
    }

    #[test]
    fn discriminators_pick_the_right_field() {
        let policy = Policy::new("admin", "rg1", "GET");
        assert_eq!(RoleSource::discriminator(&policy), "admin");
        assert_eq!(ResourceGroupSource::discriminator(&policy), "rg1");
    }

    #[tokio::test]
    async fn role_source_queries_members_by_role() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rbac/role"))
            .and(query_param("role", "team lead"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(["u1", "u2"])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rbac/policy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"role": "team lead", "resource_group": "rg1", "permission": "GET"}
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let source = RoleSource::new(&client);
        assert_eq!(source.fetch_per_key("team lead").await.unwrap(), vec!["u1", "u2"]);
        assert_eq!(
            source.fetch_bulk().await.unwrap(),
            vec![Policy::new("team lead", "rg1", "GET")]
        );
    }

    #[tokio::test]
    async fn missing_role_is_named_in_the_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rbac/role"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = RoleSource::new(&client).fetch_per_key("ghost").await.unwrap_err();
        assert_eq!(err.to_string(), "Role not found: ghost");
    }

    #[tokio::test]
    async fn resource_group_source_queries_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rbac/resource_group"))
            .and(query_param("resource_group", "billing&co"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(["/api/invoices"])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let endpoints = ResourceGroupSource::new(&client)
            .fetch_per_key("billing&co")
            .await
            .unwrap();
        assert_eq!(endpoints, vec!["/api/invoices"]);
    }

    #[tokio::test]
    async fn user_sources_look_up_by_id_and_name() {
        let server = MockServer::start().await;
        let alice = serde_json::json!({"id": "u1", "name": "alice", "display_name": "Alice"});
        Mock::given(method("GET"))
            .and(path("/users/user"))
            .and(query_param("user_id", "u1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(alice.clone()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/user"))
            .and(query_param("name", "alice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(alice))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let by_id = UserByIdSource::new(&client).fetch_per_key("u1").await.unwrap();
        let by_name = UserByNameSource::new(&client).fetch_per_key("alice").await.unwrap();
        assert_eq!(by_id, by_name);
        assert_eq!(by_id.display_name, "Alice");
    }
}
