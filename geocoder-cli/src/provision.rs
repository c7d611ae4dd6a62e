//! `provision` command: build the store from a postcode dataset.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use geocoder_core::DEFAULT_DATABASE_FILENAME;
use geocoder_data::{DEFAULT_PER_PAGE, LogProgress, ProvisionReport, Provisioner};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_BATCH_SIZE, ARG_DATABASE_DIR, ARG_DATABASE_FILE, ARG_SOURCE, CliError, ENV_SOURCE,
    write_line,
};

/// CLI arguments for the `provision` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "provision",
    long_about = "Import every row of an ONS Postcode Directory style CSV \
                 into the SQLite store, creating the database directory and \
                 file when missing. Options can come from CLI flags, \
                 configuration files, or environment variables.",
    about = "Import a postcode dataset into the store"
)]
#[ortho_config(prefix = "POSTCODES")]
pub(crate) struct ProvisionArgs {
    /// Path to the CSV dataset.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) source: Option<Utf8PathBuf>,
    /// Directory that will hold the store (created when missing).
    #[arg(long = ARG_DATABASE_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) database_dir: Option<Utf8PathBuf>,
    /// Store file name inside the directory.
    #[arg(long = ARG_DATABASE_FILE, value_name = "name")]
    #[serde(default)]
    pub(crate) database_file: Option<String>,
    /// Rows read and inserted per batch.
    #[arg(long = ARG_BATCH_SIZE, value_name = "rows")]
    #[serde(default)]
    pub(crate) batch_size: Option<usize>,
}

impl ProvisionArgs {
    pub(crate) fn into_config(self) -> Result<ProvisionConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ProvisionConfig::try_from(merged)
    }
}

/// Resolved `provision` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProvisionConfig {
    pub(crate) source: Utf8PathBuf,
    pub(crate) database_dir: Utf8PathBuf,
    pub(crate) database_file: String,
    pub(crate) batch_size: usize,
}

impl ProvisionConfig {
    fn provisioner(&self) -> Result<Provisioner, CliError> {
        Ok(Provisioner::new(&self.database_dir, &self.source)?
            .with_database_filename(self.database_file.clone())
            .with_per_page(self.batch_size))
    }
}

impl TryFrom<ProvisionArgs> for ProvisionConfig {
    type Error = CliError;

    fn try_from(args: ProvisionArgs) -> Result<Self, Self::Error> {
        let source = args.source.ok_or(CliError::MissingArgument {
            field: ARG_SOURCE,
            env: ENV_SOURCE,
        })?;
        Ok(Self {
            source,
            database_dir: args.database_dir.unwrap_or_else(|| Utf8PathBuf::from(".")),
            database_file: args
                .database_file
                .unwrap_or_else(|| DEFAULT_DATABASE_FILENAME.to_owned()),
            batch_size: args.batch_size.unwrap_or(DEFAULT_PER_PAGE),
        })
    }
}

pub(crate) fn run_provision(args: ProvisionArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let report = config.provisioner()?.with_progress(LogProgress).run()?;
    write_report(writer, &report)
}

fn write_report(writer: &mut dyn Write, report: &ProvisionReport) -> Result<(), CliError> {
    write_line(
        writer,
        &format!(
            "{}: {} postcodes inserted, {} skipped",
            report.database_path, report.inserted, report.skipped
        ),
    )
}
