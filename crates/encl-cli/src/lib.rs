//! # encl-cli
//!
//! Command-line client for the Enclave platform.
//!
//! This crate provides:
//! - User management (create, list, update, delete, current user)
//! - RBAC management (roles, role assignments, resource groups, endpoints,
//!   policies)
//! - Artifact management (list, upload, download, metadata, delete, tags)
//! - Concurrent, order-preserving enrichment of listings with per-item
//!   details (see [`enrich`])

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::uninlined_format_args)]

pub mod auth;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod enrich;
pub mod error;
pub mod model;
pub mod output;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
