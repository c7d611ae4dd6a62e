//! Command-line interface for provisioning and querying the postcode store.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use geocoder_core::DEFAULT_DATABASE_FILENAME;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

mod error;
mod provision;
mod query;

pub use error::CliError;

use provision::ProvisionArgs;
use query::{AddArgs, LookupArgs};

const ARG_DATABASE_DIR: &str = "database-dir";
const ARG_DATABASE_FILE: &str = "database-file";
const ARG_BATCH_SIZE: &str = "batch-size";
const ARG_SOURCE: &str = "source";
const ENV_SOURCE: &str = "POSTCODES_CMDS_PROVISION_SOURCE";
const STORE_SECTION: &str = "store";

/// Run the postcode CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    execute(cli.command, &mut stdout)
}

fn execute(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Provision(args) => provision::run_provision(args, writer),
        Command::Lookup(args) => query::run_lookup(args, writer),
        Command::Add(args) => query::run_add(args, writer),
        Command::Random(args) => query::run_random(args, writer),
        Command::Count(args) => query::run_count(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "postcodes",
    about = "Provision and query a postcode to coordinate store",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import a postcode dataset into the store.
    Provision(ProvisionArgs),
    /// Print the coordinates of one or more postcodes.
    Lookup(LookupArgs),
    /// Validate and insert a single postcode.
    Add(AddArgs),
    /// Print one stored postcode chosen at random.
    Random(StoreArgs),
    /// Print the number of stored postcodes.
    Count(StoreArgs),
}

/// Location of an existing postcode store.
///
/// Shared by every query command, so configuration is layered under one
/// `store` section rather than per subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = STORE_SECTION)]
#[ortho_config(prefix = "POSTCODES")]
pub(crate) struct StoreArgs {
    /// Directory holding the store (defaults to the working directory).
    #[arg(long = ARG_DATABASE_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) database_dir: Option<Utf8PathBuf>,
    /// Store file name inside the directory.
    #[arg(long = ARG_DATABASE_FILE, value_name = "name")]
    #[serde(default)]
    pub(crate) database_file: Option<String>,
}

impl StoreArgs {
    pub(crate) fn into_location(self) -> Result<StoreLocation, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(StoreLocation::from(merged))
    }
}

/// Resolved store directory and file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoreLocation {
    pub(crate) directory: Utf8PathBuf,
    pub(crate) filename: String,
}

impl From<StoreArgs> for StoreLocation {
    fn from(args: StoreArgs) -> Self {
        Self {
            directory: args.database_dir.unwrap_or_else(|| Utf8PathBuf::from(".")),
            filename: args
                .database_file
                .unwrap_or_else(|| DEFAULT_DATABASE_FILENAME.to_owned()),
        }
    }
}

pub(crate) fn write_line(writer: &mut dyn Write, line: &str) -> Result<(), CliError> {
    writer
        .write_all(line.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)
}

pub(crate) fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    write_line(writer, &payload)
}

#[cfg(test)]
mod tests;
