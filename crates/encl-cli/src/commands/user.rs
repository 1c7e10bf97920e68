//! User management commands.

use crate::cli::{MeCommand, UserCommand, UserUpdateArgs};
use crate::client::ApiClient;
use crate::enrich::source::{UserByIdSource, UserByNameSource};
use crate::model::{CreateUserRequest, DeleteUserRequest, UserPatch, UserRecord};
use crate::output::{highlight, output, output_single, prompt_password, success};
use crate::CliError;

use super::role::resolved_users;
use super::Context;

/// Runs a user command.
pub async fn run_user(cmd: UserCommand, ctx: &Context<'_>) -> crate::CliResult<()> {
    let client = ctx.client()?;

    match cmd {
        UserCommand::Create {
            name,
            display_name,
            password,
        } => create_user(&client, &name, &display_name, password).await,
        UserCommand::Delete { user_id } => {
            client
                .delete("/users/user", &DeleteUserRequest { id: &user_id })
                .await
                .map_err(|e| e.for_resource("User", &user_id))?;
            success(&format!("User {} deleted successfully", highlight(&user_id)));
            Ok(())
        }
        UserCommand::Update { user_id, changes } => {
            let patch = build_patch(Some(user_id.clone()), changes)?;
            client
                .patch("/users/user", &patch)
                .await
                .map_err(|e| e.for_resource("User", &user_id))?;
            success(&format!("User {} updated successfully", highlight(&user_id)));
            Ok(())
        }
        UserCommand::Get { users, by_name } => get_users(ctx, &client, &users, by_name).await,
        UserCommand::List => {
            let users: Vec<UserRecord> = client.get("/users/list").await?;
            output(&users, ctx.format)
        }
        UserCommand::Me(MeCommand::Get) => {
            let user: UserRecord = client.get("/users/me").await?;
            output_single(&user, ctx.format)
        }
        UserCommand::Me(MeCommand::Update { changes }) => {
            let patch = build_patch(None, changes)?;
            client.patch("/users/me", &patch).await?;
            success("Current user updated successfully");
            Ok(())
        }
    }
}

/// Creates a user, prompting for the password when none was given.
async fn create_user(
    client: &ApiClient,
    name: &str,
    display_name: &str,
    password: Option<String>,
) -> crate::CliResult<()> {
    let password = match password {
        Some(p) => p,
        None => read_new_password().await?,
    };

    let request = CreateUserRequest {
        name,
        display_name,
        password: &password,
    };
    client.post("/users/user", &request).await?;
    success(&format!("User {} created successfully", highlight(name)));
    Ok(())
}

/// Prompts twice for a new password.
///
/// The terminal read blocks, so it runs off the runtime thread and the
/// command stays cancellable while waiting for input.
async fn read_new_password() -> crate::CliResult<String> {
    tokio::task::spawn_blocking(|| {
        let p = prompt_password("Enter password: ")?;
        let confirm_pwd = prompt_password("Confirm password: ")?;
        if p != confirm_pwd {
            return Err(CliError::Validation("Passwords do not match".to_string()));
        }
        Ok(p)
    })
    .await
    .map_err(|e| CliError::Io(std::io::Error::other(e)))?
}

/// Resolves users concurrently, by ID or by name.
async fn get_users(
    ctx: &Context<'_>,
    client: &ApiClient,
    keys: &[String],
    by_name: bool,
) -> crate::CliResult<()> {
    let enrichment = if by_name {
        ctx.enricher(UserByNameSource::new(client)).enrich(keys).await?
    } else {
        ctx.enricher(UserByIdSource::new(client)).enrich(keys).await?
    };
    let users = resolved_users(enrichment.records, &enrichment.errors);

    output(&users, ctx.format)?;
    ctx.finish(enrichment.errors)
}

/// Builds a partial update from the update flags.
fn build_patch(id: Option<String>, changes: UserUpdateArgs) -> crate::CliResult<UserPatch> {
    let patch = UserPatch {
        id,
        new_name: changes.new_name.filter(|v| !v.is_empty()),
        new_display_name: changes.new_display_name.filter(|v| !v.is_empty()),
        new_password: changes.new_password.filter(|v| !v.is_empty()),
    };
    if patch.is_empty() {
        return Err(CliError::InvalidArgument(
            "at least one of --new-name, --new-display-name, or --new-password must be provided"
                .to_string(),
        ));
    }
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes(name: Option<&str>, display: Option<&str>, password: Option<&str>) -> UserUpdateArgs {
        UserUpdateArgs {
            new_name: name.map(str::to_string),
            new_display_name: display.map(str::to_string),
            new_password: password.map(str::to_string),
        }
    }

    #[test]
    fn patch_keeps_given_fields() {
        let patch = build_patch(Some("u1".to_string()), changes(Some("bob"), None, Some("pw"))).unwrap();
        assert_eq!(patch.id.as_deref(), Some("u1"));
        assert_eq!(patch.new_name.as_deref(), Some("bob"));
        assert!(patch.new_display_name.is_none());
        assert_eq!(patch.new_password.as_deref(), Some("pw"));
    }

    #[test]
    fn empty_values_do_not_count_as_changes() {
        let result = build_patch(None, changes(Some(""), Some(""), None));
        assert!(matches!(result, Err(CliError::InvalidArgument(_))));
    }
}
