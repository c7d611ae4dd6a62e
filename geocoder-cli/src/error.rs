//! Error types emitted by the postcode CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use geocoder_core::ServiceError;
use geocoder_data::{DirectoryError, ProvisionError};
use thiserror::Error;

/// Errors emitted by the postcode CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The database directory could not be prepared.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    /// Provisioning the store failed.
    #[error("provisioning failed: {0}")]
    Provision(#[from] ProvisionError),
    /// A lookup, insert or sampling operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// A single looked-up postcode is not stored.
    #[error("postcode {postcode:?} not found")]
    NotFound { postcode: String },
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
