//! RBAC command routing.

use crate::cli::RbacCommand;

use super::assignment::run_assignment;
use super::endpoint::run_endpoint;
use super::policy::run_policy;
use super::resource_group::run_resource_group;
use super::role::run_role;
use super::Context;

/// Runs an RBAC command.
pub async fn run_rbac(cmd: RbacCommand, ctx: &Context<'_>) -> crate::CliResult<()> {
    match cmd {
        RbacCommand::Role(cmd) => run_role(cmd, ctx).await,
        RbacCommand::User(cmd) => run_assignment(cmd, ctx).await,
        RbacCommand::ResourceGroup(cmd) => run_resource_group(cmd, ctx).await,
        RbacCommand::Endpoint(cmd) => run_endpoint(cmd, ctx).await,
        RbacCommand::Policy(cmd) => run_policy(cmd, ctx).await,
    }
}
