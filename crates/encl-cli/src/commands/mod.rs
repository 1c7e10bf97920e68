//! Command implementations.

pub mod artifact;
pub mod assignment;
pub mod config;
pub mod endpoint;
pub mod policy;
pub mod rbac;
pub mod resource_group;
pub mod role;
pub mod user;

pub use artifact::run_artifact;
pub use config::run_config;
pub use rbac::run_rbac;
pub use user::run_user;

use tokio_util::sync::CancellationToken;

use crate::cli::Command;
use crate::client::ApiClient;
use crate::config::OutputFormat;
use crate::enrich::{BatchEnricher, ErrorReport, RemoteDataSource};
use crate::output::warning;
use crate::{CliConfig, CliError, CliResult};

/// Runs a command until it completes or the context's token is cancelled.
///
/// Cancelling drops the command future, and with it any request in flight.
pub async fn run(command: Command, ctx: &Context<'_>) -> CliResult<()> {
    let dispatch = async {
        match command {
            Command::User(cmd) => run_user(cmd, ctx).await,
            Command::Rbac(cmd) => run_rbac(cmd, ctx).await,
            Command::Artifact(cmd) => run_artifact(cmd, ctx).await,
            Command::Config(cmd) => run_config(cmd, ctx.config, ctx.format),
        }
    };

    tokio::select! {
        biased;
        () = ctx.cancel.cancelled() => {
            tracing::debug!("Command cancelled");
            Err(CliError::Cancelled)
        }
        result = dispatch => result,
    }
}

/// Everything a command handler needs besides its own arguments.
pub struct Context<'a> {
    /// Resolved configuration.
    pub config: &'a CliConfig,
    /// Output format.
    pub format: OutputFormat,
    /// Fail listings whose error report is not empty.
    pub strict: bool,
    /// Cancelled on Ctrl-C.
    pub cancel: CancellationToken,
}

impl<'a> Context<'a> {
    /// Creates a context from the resolved configuration.
    pub fn new(config: &'a CliConfig, strict: bool, cancel: CancellationToken) -> Self {
        Self {
            config,
            format: config.output_format,
            strict,
            cancel,
        }
    }

    /// Creates an authenticated API client.
    pub fn client(&self) -> CliResult<ApiClient> {
        ApiClient::new(self.config)
    }

    /// Creates an enricher wired to the configured wildcard and the
    /// cancellation token.
    pub fn enricher<S: RemoteDataSource>(&self, source: S) -> BatchEnricher<S> {
        BatchEnricher::new(source)
            .with_wildcard(self.config.wildcard.as_str())
            .with_cancellation(self.cancel.clone())
    }

    /// Surfaces the failures of a batch: a warning by default, an error in
    /// strict mode.
    pub fn finish(&self, errors: ErrorReport) -> CliResult<()> {
        if errors.is_empty() {
            return Ok(());
        }
        if self.strict {
            return errors.into_strict();
        }
        warning(&errors.report());
        Ok(())
    }
}
