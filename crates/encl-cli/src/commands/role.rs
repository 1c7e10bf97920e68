//! Role management commands.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::RoleCommand;
use crate::client::ApiClient;
use crate::enrich::source::{RoleSource, UserByIdSource};
use crate::enrich::EnrichedRecord;
use crate::model::{RoleBody, UserRecord};
use crate::output::{highlight, output, success};

use super::Context;

/// Role with its policy and member counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct RoleInfo {
    /// Role name.
    #[tabled(rename = "ROLE")]
    pub role: String,
    /// Number of policies granted to the role.
    #[tabled(rename = "POLICIES")]
    pub policies: usize,
    /// Number of users holding the role.
    #[tabled(rename = "USERS")]
    pub users: usize,
}

impl From<EnrichedRecord<Vec<String>>> for RoleInfo {
    fn from(record: EnrichedRecord<Vec<String>>) -> Self {
        Self {
            role: record.key,
            policies: record.bulk_count,
            users: record.value.len(),
        }
    }
}

/// Runs a role command.
pub async fn run_role(cmd: RoleCommand, ctx: &Context<'_>) -> crate::CliResult<()> {
    let client = ctx.client()?;

    match cmd {
        RoleCommand::Create { role } => {
            client.post("/rbac/role", &RoleBody { role: &role }).await?;
            success(&format!("Role '{}' created", highlight(&role)));
            Ok(())
        }
        RoleCommand::Delete { role } => {
            client
                .delete("/rbac/role", &RoleBody { role: &role })
                .await
                .map_err(|e| e.for_resource("Role", &role))?;
            success(&format!("Role '{}' deleted", highlight(&role)));
            Ok(())
        }
        RoleCommand::List => {
            let roles: Vec<String> = client.get("/rbac/list_roles").await?;
            show_roles(ctx, &client, &roles).await
        }
        RoleCommand::Get { role } => role_members(ctx, &client, &role).await,
    }
}

/// Prints roles with their policy and member counts.
pub async fn show_roles(ctx: &Context<'_>, client: &ApiClient, roles: &[String]) -> crate::CliResult<()> {
    let enrichment = ctx.enricher(RoleSource::new(client)).enrich(roles).await?;
    let rows: Vec<RoleInfo> = enrichment.records.into_iter().map(RoleInfo::from).collect();

    output(&rows, ctx.format)?;
    ctx.finish(enrichment.errors)
}

/// Prints the users holding a role.
async fn role_members(ctx: &Context<'_>, client: &ApiClient, role: &str) -> crate::CliResult<()> {
    let user_ids: Vec<String> = client
        .get(&format!("/rbac/role?role={}", urlencoding::encode(role)))
        .await
        .map_err(|e| e.for_resource("Role", role))?;

    let enrichment = ctx.enricher(UserByIdSource::new(client)).enrich(&user_ids).await?;
    let users = resolved_users(enrichment.records, &enrichment.errors);

    output(&users, ctx.format)?;
    ctx.finish(enrichment.errors)
}

/// Drops the placeholder rows of users that could not be fetched.
pub fn resolved_users(
    records: Vec<EnrichedRecord<UserRecord>>,
    errors: &crate::enrich::ErrorReport,
) -> Vec<UserRecord> {
    records
        .into_iter()
        .enumerate()
        .filter(|(index, _)| !errors.is_failed(*index))
        .map(|(_, record)| record.value)
        .collect()
}
