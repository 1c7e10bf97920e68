//! Endpoint assignment commands.

use crate::cli::EndpointCommand;
use crate::model::EndpointBody;
use crate::output::{highlight, success};

use super::resource_group::show_resource_groups;
use super::Context;

/// Runs an endpoint command.
pub async fn run_endpoint(cmd: EndpointCommand, ctx: &Context<'_>) -> crate::CliResult<()> {
    let client = ctx.client()?;

    match cmd {
        EndpointCommand::Assign {
            endpoint,
            resource_group,
        } => {
            let body = EndpointBody {
                endpoint: &endpoint,
                resource_group: &resource_group,
            };
            client.post("/rbac/endpoint", &body).await?;
            success(&format!(
                "Endpoint {} assigned to resource group {}",
                highlight(&endpoint),
                highlight(&resource_group)
            ));
            Ok(())
        }
        EndpointCommand::Remove {
            endpoint,
            resource_group,
        } => {
            let body = EndpointBody {
                endpoint: &endpoint,
                resource_group: &resource_group,
            };
            client.delete("/rbac/endpoint", &body).await?;
            success(&format!(
                "Endpoint {} removed from resource group {}",
                highlight(&endpoint),
                highlight(&resource_group)
            ));
            Ok(())
        }
        EndpointCommand::Get { endpoint } => {
            let groups: Vec<String> = client
                .get(&format!(
                    "/rbac/endpoint?endpoint={}",
                    urlencoding::encode(&endpoint)
                ))
                .await
                .map_err(|e| e.for_resource("Endpoint", &endpoint))?;
            show_resource_groups(ctx, &client, &groups).await
        }
    }
}
