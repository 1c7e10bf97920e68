//! Policy management commands.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::PolicyCommand;
use crate::enrich::source::{fetch_policies, RemoteDataSource, RoleSource};
use crate::enrich::ResultAssembler;
use crate::model::Policy;
use crate::output::{highlight, output, success};

use super::Context;

/// Number of policies granted to one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct PolicySummary {
    /// Role name.
    #[tabled(rename = "ROLE")]
    pub role: String,
    /// Number of policies.
    #[tabled(rename = "POLICIES")]
    pub policies: usize,
}

/// Runs a policy command.
pub async fn run_policy(cmd: PolicyCommand, ctx: &Context<'_>) -> crate::CliResult<()> {
    let client = ctx.client()?;

    match cmd {
        PolicyCommand::Create {
            role,
            resource_group,
            permission,
        } => {
            let policy = Policy::new(&role, &resource_group, &permission);
            client.post("/rbac/policy", &policy).await?;
            success(&format!(
                "Policy created: role {} has {} permission on resource group {}",
                highlight(&role),
                highlight(&permission),
                highlight(&resource_group)
            ));
            Ok(())
        }
        PolicyCommand::Delete {
            role,
            resource_group,
            permission,
        } => {
            let policy = Policy::new(&role, &resource_group, &permission);
            client.delete("/rbac/policy", &policy).await?;
            success(&format!(
                "Policy deleted: role {} no longer has {} permission on resource group {}",
                highlight(&role),
                highlight(&permission),
                highlight(&resource_group)
            ));
            Ok(())
        }
        PolicyCommand::List { summary: false } => {
            let policies = fetch_policies(&client).await?;
            output(&policies, ctx.format)
        }
        PolicyCommand::List { summary: true } => {
            let (roles, policies) = tokio::try_join!(
                client.get::<Vec<String>>("/rbac/list_roles"),
                fetch_policies(&client),
            )?;
            let summary = summarize(&roles, &policies, Some(ctx.config.wildcard.as_str()));
            output(&summary, ctx.format)
        }
    }
}

/// Counts policies per role from the policy listing alone. Policies whose
/// role is `wildcard` count for every role, as in `rbac role list`.
pub fn summarize(
    roles: &[String],
    policies: &[Policy],
    wildcard: Option<&str>,
) -> Vec<PolicySummary> {
    ResultAssembler::new(policies, RoleSource::discriminator, wildcard)
        .count_all(roles)
        .into_iter()
        .map(|(role, policies)| PolicySummary {
            role: role.to_string(),
            policies,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_per_role_in_role_order() {
        let roles = vec!["viewer".to_string(), "admin".to_string()];
        let policies = vec![
            Policy::new("admin", "*", "GET"),
            Policy::new("admin", "*", "POST"),
            Policy::new("editor", "rg1", "GET"),
        ];

        let summary = summarize(&roles, &policies, Some("*"));
        assert_eq!(
            summary,
            vec![
                PolicySummary {
                    role: "viewer".to_string(),
                    policies: 0,
                },
                PolicySummary {
                    role: "admin".to_string(),
                    policies: 2,
                },
            ]
        );
    }

    #[test]
    fn wildcard_role_counts_for_every_role() {
        let roles = vec!["admin".to_string(), "viewer".to_string()];
        let policies = vec![
            Policy::new("*", "rg1", "GET"),
            Policy::new("admin", "rg1", "GET"),
        ];

        let summary = summarize(&roles, &policies, Some("*"));
        assert_eq!(summary[0].policies, 2);
        assert_eq!(summary[1].policies, 1);

        // Same count the enriched role listing derives from the policies.
        let assembler = ResultAssembler::new(&policies, RoleSource::discriminator, Some("*"));
        assert_eq!(assembler.count("admin"), summary[0].policies);
    }

    #[test]
    fn summary_without_wildcard_counts_exact_matches() {
        let roles = vec!["admin".to_string()];
        let policies = vec![Policy::new("*", "rg1", "GET"), Policy::new("admin", "rg1", "GET")];
        assert_eq!(summarize(&roles, &policies, None)[0].policies, 1);
    }

    #[test]
    fn policy_serializes_with_api_field_names() {
        let json = serde_json::to_value(Policy::new("admin", "rg1", "GET")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"role": "admin", "resource_group": "rg1", "permission": "GET"})
        );
    }
}
