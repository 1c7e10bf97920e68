//! Resource group management commands.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::ResourceGroupCommand;
use crate::client::ApiClient;
use crate::enrich::source::ResourceGroupSource;
use crate::enrich::EnrichedRecord;
use crate::model::ResourceGroupBody;
use crate::output::{highlight, output, output_strings, success};

use super::Context;

/// Resource group with its policy and endpoint counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct ResourceGroupInfo {
    /// Resource group name.
    #[tabled(rename = "RESOURCE GROUP")]
    pub resource_group: String,
    /// Policies that apply to the group, wildcard policies included.
    #[tabled(rename = "POLICIES")]
    pub policies: usize,
    /// Endpoints assigned to the group.
    #[tabled(rename = "ENDPOINTS")]
    pub endpoints: usize,
}

impl From<EnrichedRecord<Vec<String>>> for ResourceGroupInfo {
    fn from(record: EnrichedRecord<Vec<String>>) -> Self {
        Self {
            resource_group: record.key,
            policies: record.bulk_count,
            endpoints: record.value.len(),
        }
    }
}

/// Runs a resource group command.
pub async fn run_resource_group(
    cmd: ResourceGroupCommand,
    ctx: &Context<'_>,
) -> crate::CliResult<()> {
    let client = ctx.client()?;

    match cmd {
        ResourceGroupCommand::Create { resource_group } => {
            let body = ResourceGroupBody {
                resource_group: &resource_group,
            };
            client.post("/rbac/resource_group", &body).await?;
            success(&format!("Resource group {} created", highlight(&resource_group)));
            Ok(())
        }
        ResourceGroupCommand::Delete { resource_group } => {
            let body = ResourceGroupBody {
                resource_group: &resource_group,
            };
            client
                .delete("/rbac/resource_group", &body)
                .await
                .map_err(|e| e.for_resource("Resource group", &resource_group))?;
            success(&format!("Resource group {} deleted", highlight(&resource_group)));
            Ok(())
        }
        ResourceGroupCommand::List => {
            let groups: Vec<String> = client.get("/rbac/list_resource_groups").await?;
            show_resource_groups(ctx, &client, &groups).await
        }
        ResourceGroupCommand::Get { resource_group } => {
            let endpoints: Vec<String> = client
                .get(&format!(
                    "/rbac/resource_group?resource_group={}",
                    urlencoding::encode(&resource_group)
                ))
                .await
                .map_err(|e| e.for_resource("Resource group", &resource_group))?;
            output_strings(&endpoints, "ENDPOINT", ctx.format)
        }
    }
}

/// Prints resource groups with their policy and endpoint counts.
pub async fn show_resource_groups(
    ctx: &Context<'_>,
    client: &ApiClient,
    groups: &[String],
) -> crate::CliResult<()> {
    let enrichment = ctx
        .enricher(ResourceGroupSource::new(client))
        .enrich(groups)
        .await?;
    let rows: Vec<ResourceGroupInfo> = enrichment
        .records
        .into_iter()
        .map(ResourceGroupInfo::from)
        .collect();

    output(&rows, ctx.format)?;
    ctx.finish(enrichment.errors)
}
