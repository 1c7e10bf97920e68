//! User role assignment commands.

use crate::cli::RbacUserCommand;
use crate::enrich::source::fetch_user_by_name;
use crate::model::UserRoleBody;
use crate::output::{highlight, success};

use super::role::show_roles;
use super::Context;

/// Runs a user role assignment command.
pub async fn run_assignment(cmd: RbacUserCommand, ctx: &Context<'_>) -> crate::CliResult<()> {
    let client = ctx.client()?;

    match cmd {
        RbacUserCommand::Assign { username, role } => {
            let user = fetch_user_by_name(&client, &username).await?;
            let body = UserRoleBody {
                user_id: &user.id,
                role: &role,
            };
            client.post("/rbac/user", &body).await?;
            success(&format!(
                "{} ({}) has role {} now",
                highlight(&user.display_name),
                highlight(&user.id),
                highlight(&role)
            ));
            Ok(())
        }
        RbacUserCommand::Remove { username, role } => {
            let user = fetch_user_by_name(&client, &username).await?;
            let body = UserRoleBody {
                user_id: &user.id,
                role: &role,
            };
            client.delete("/rbac/user", &body).await?;
            success(&format!(
                "Role {} removed from {} ({})",
                highlight(&role),
                highlight(&user.display_name),
                highlight(&user.id)
            ));
            Ok(())
        }
        RbacUserCommand::Get { username } => {
            let user = fetch_user_by_name(&client, &username).await?;
            let roles: Vec<String> = client
                .get(&format!(
                    "/rbac/user?user_id={}",
                    urlencoding::encode(&user.id)
                ))
                .await
                .map_err(|e| e.for_resource("User", &username))?;
            show_roles(ctx, &client, &roles).await
        }
    }
}
