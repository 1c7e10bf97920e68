//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{OutputFormat, Overrides};

/// Enclave CLI - manage your enclave platform from your terminal.
#[derive(Debug, Parser)]
#[command(name = "encl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default searches ./encl.toml, $HOME/.enclave/encl.toml,
    /// /etc/enclave/encl.toml).
    #[arg(long, global = true, env = "ENCLAVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// API server URL (overrides config).
    #[arg(long, global = true, env = "ENCLAVE_API_SERVER_URL")]
    pub api_url: Option<String>,

    /// Authentication username (overrides config).
    #[arg(long, global = true, env = "ENCLAVE_AUTH_USERNAME")]
    pub auth_username: Option<String>,

    /// Authentication password (overrides config).
    #[arg(long, global = true, env = "ENCLAVE_AUTH_PASSWORD", hide_env_values = true)]
    pub auth_password: Option<String>,

    /// Output format (overrides config).
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Fail when any item of a listing could not be fetched.
    #[arg(long, global = true)]
    pub strict: bool,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Values from flags and environment, for layering over the config file.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            api_server_url: self.api_url.clone(),
            username: self.auth_username.clone(),
            password: self.auth_password.clone(),
            output_format: self.output,
        }
    }
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// User management commands.
    #[command(subcommand)]
    User(UserCommand),

    /// RBAC (role-based access control) commands.
    #[command(subcommand)]
    Rbac(RbacCommand),

    /// Upload, download and manage artifacts.
    #[command(subcommand)]
    Artifact(ArtifactCommand),

    /// Configuration commands.
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Fields of a user update.
#[derive(Debug, Args)]
#[group(required = true, multiple = true)]
pub struct UserUpdateArgs {
    /// New user name.
    #[arg(long)]
    pub new_name: Option<String>,

    /// New display name.
    #[arg(long)]
    pub new_display_name: Option<String>,

    /// New password.
    #[arg(long)]
    pub new_password: Option<String>,
}

/// User commands.
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create a new user.
    Create {
        /// Login name.
        name: String,

        /// Display name.
        display_name: String,

        /// Password (will prompt if not provided).
        password: Option<String>,
    },

    /// Delete a user by ID.
    Delete {
        /// User ID.
        user_id: String,
    },

    /// Update a user's name, display name, or password.
    Update {
        /// User ID.
        user_id: String,

        /// Fields to change.
        #[command(flatten)]
        changes: UserUpdateArgs,
    },

    /// Get one or more users.
    Get {
        /// User IDs (or names with --by-name).
        #[arg(required = true)]
        users: Vec<String>,

        /// Look users up by name instead of ID.
        #[arg(long)]
        by_name: bool,
    },

    /// List all users.
    List,

    /// Manage the currently authenticated user.
    #[command(subcommand)]
    Me(MeCommand),
}

/// Current-user commands.
#[derive(Debug, Subcommand)]
pub enum MeCommand {
    /// Get current user information.
    Get,

    /// Update the current user.
    Update {
        /// Fields to change.
        #[command(flatten)]
        changes: UserUpdateArgs,
    },
}

/// RBAC commands.
#[derive(Debug, Subcommand)]
pub enum RbacCommand {
    /// Manage roles.
    #[command(subcommand)]
    Role(RoleCommand),

    /// Manage user role assignments.
    #[command(subcommand)]
    User(RbacUserCommand),

    /// Manage resource groups.
    #[command(subcommand)]
    ResourceGroup(ResourceGroupCommand),

    /// Manage endpoint assignments.
    #[command(subcommand)]
    Endpoint(EndpointCommand),

    /// Manage RBAC policies.
    #[command(subcommand)]
    Policy(PolicyCommand),
}

/// Role commands.
#[derive(Debug, Subcommand)]
pub enum RoleCommand {
    /// Create a new role.
    Create {
        /// Role name.
        role: String,
    },

    /// Delete a role.
    Delete {
        /// Role name.
        role: String,
    },

    /// List all roles with their policy and member counts.
    List,

    /// Get users assigned to a role.
    Get {
        /// Role name.
        role: String,
    },
}

/// User role assignment commands.
#[derive(Debug, Subcommand)]
pub enum RbacUserCommand {
    /// Assign a role to a user.
    Assign {
        /// Username.
        username: String,
        /// Role name.
        role: String,
    },

    /// Remove a role from a user.
    Remove {
        /// Username.
        username: String,
        /// Role name.
        role: String,
    },

    /// Get roles assigned to a user.
    Get {
        /// Username.
        username: String,
    },
}

/// Resource group commands.
#[derive(Debug, Subcommand)]
pub enum ResourceGroupCommand {
    /// Create a new resource group.
    Create {
        /// Resource group name.
        resource_group: String,
    },

    /// Delete a resource group.
    Delete {
        /// Resource group name.
        resource_group: String,
    },

    /// List all resource groups with their policy and endpoint counts.
    List,

    /// Get endpoints in a resource group.
    Get {
        /// Resource group name.
        resource_group: String,
    },
}

/// Endpoint commands.
#[derive(Debug, Subcommand)]
pub enum EndpointCommand {
    /// Assign an endpoint to a resource group.
    Assign {
        /// Endpoint path.
        endpoint: String,
        /// Resource group name.
        resource_group: String,
    },

    /// Remove an endpoint from a resource group.
    Remove {
        /// Endpoint path.
        endpoint: String,
        /// Resource group name.
        resource_group: String,
    },

    /// Get resource groups for an endpoint.
    Get {
        /// Endpoint path.
        endpoint: String,
    },
}

/// Policy commands.
#[derive(Debug, Subcommand)]
pub enum PolicyCommand {
    /// Create a new RBAC policy.
    Create {
        /// Role name.
        role: String,
        /// Resource group name.
        resource_group: String,
        /// Permission (HTTP method).
        permission: String,
    },

    /// Delete an RBAC policy.
    Delete {
        /// Role name.
        role: String,
        /// Resource group name.
        resource_group: String,
        /// Permission (HTTP method).
        permission: String,
    },

    /// List all RBAC policies.
    List {
        /// Show the number of policies per role instead.
        #[arg(long)]
        summary: bool,
    },
}

/// Artifact commands.
///
/// Artifacts are named by a fully qualified name `<source>/<author>/<name>`;
/// commands that address one version append `:<identifier>` (a tag or
/// `hash:<version-hash>`).
#[derive(Debug, Subcommand)]
pub enum ArtifactCommand {
    /// List artifacts, optionally filtered.
    #[command(alias = "query")]
    List {
        /// Only list matching source.
        #[arg(short, long)]
        source: Option<String>,

        /// Only list matching author.
        #[arg(short, long)]
        author: Option<String>,

        /// Only list matching name.
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Upload a new artifact.
    #[command(visible_aliases = ["create", "push"])]
    Upload {
        /// Fully qualified name (source/author/name).
        fqn: String,

        /// Compiled WASM file.
        file: PathBuf,

        /// Space separated tags to add to the upload.
        #[arg(short, long)]
        tags: Option<String>,
    },

    /// Download an artifact.
    #[command(visible_alias = "pull")]
    Download {
        /// Fully qualified name with identifier (source/author/name:identifier).
        fqn: String,

        /// Output file.
        output: PathBuf,
    },

    /// Show artifact metadata.
    #[command(visible_aliases = ["meta", "info"])]
    Metadata {
        /// Fully qualified name with identifier.
        fqn: String,
    },

    /// Delete an artifact.
    #[command(visible_alias = "remove")]
    Delete {
        /// Fully qualified name with identifier.
        fqn: String,
    },

    /// Manage artifact tags.
    #[command(subcommand)]
    Tag(ArtifactTagCommand),
}

/// Artifact tag commands. The artifact must be identified by hash.
#[derive(Debug, Subcommand)]
pub enum ArtifactTagCommand {
    /// Add a tag to an artifact.
    #[command(visible_alias = "create")]
    Add {
        /// Fully qualified name with `hash:` identifier.
        fqn: String,
        /// Tag to add.
        tag: String,
    },

    /// Remove a tag from an artifact.
    #[command(visible_alias = "delete")]
    Remove {
        /// Fully qualified name with `hash:` identifier.
        fqn: String,
        /// Tag to remove.
        tag: String,
    },
}

/// Config commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the resolved configuration.
    Show,

    /// Print the config file in use.
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_rbac_command() {
        let cli = Cli::try_parse_from(["encl", "rbac", "user", "assign", "alice", "admin"]).unwrap();
        match cli.command {
            Command::Rbac(RbacCommand::User(RbacUserCommand::Assign { username, role })) => {
                assert_eq!(username, "alice");
                assert_eq!(role, "admin");
            }
            other => panic!("Unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "encl",
            "rbac",
            "role",
            "list",
            "--api-url",
            "https://flag.example",
            "-o",
            "json",
            "--strict",
        ])
        .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.api_server_url.as_deref(), Some("https://flag.example"));
        assert_eq!(overrides.output_format, Some(OutputFormat::Json));
        assert!(cli.strict);
    }

    #[test]
    fn update_requires_a_change() {
        let result = Cli::try_parse_from(["encl", "user", "update", "u1"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from(["encl", "user", "update", "u1", "--new-name", "bob"]).unwrap();
        match cli.command {
            Command::User(UserCommand::Update { user_id, changes }) => {
                assert_eq!(user_id, "u1");
                assert_eq!(changes.new_name.as_deref(), Some("bob"));
                assert!(changes.new_password.is_none());
            }
            other => panic!("Unexpected command: {other:?}"),
        }
    }

    #[test]
    fn policy_requires_three_arguments() {
        assert!(Cli::try_parse_from(["encl", "rbac", "policy", "create", "admin", "rg1"]).is_err());
        assert!(
            Cli::try_parse_from(["encl", "rbac", "policy", "create", "admin", "rg1", "GET"]).is_ok()
        );
    }

    #[test]
    fn artifact_list_accepts_query_alias_and_filters() {
        let cli = Cli::try_parse_from(["encl", "artifact", "query", "-s", "github", "--name", "auth"])
            .unwrap();
        match cli.command {
            Command::Artifact(ArtifactCommand::List {
                source,
                author,
                name,
            }) => {
                assert_eq!(source.as_deref(), Some("github"));
                assert!(author.is_none());
                assert_eq!(name.as_deref(), Some("auth"));
            }
            other => panic!("Unexpected command: {other:?}"),
        }
    }

    #[test]
    fn artifact_tag_add_parses() {
        let cli = Cli::try_parse_from([
            "encl",
            "artifact",
            "tag",
            "add",
            "github/acme/auth:hash:abc",
            "stable",
        ])
        .unwrap();
        match cli.command {
            Command::Artifact(ArtifactCommand::Tag(ArtifactTagCommand::Add { fqn, tag })) => {
                assert_eq!(fqn, "github/acme/auth:hash:abc");
                assert_eq!(tag, "stable");
            }
            other => panic!("Unexpected command: {other:?}"),
        }
    }
}
