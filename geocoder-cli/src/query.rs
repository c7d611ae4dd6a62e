//! Read and insert commands against an existing store.

use std::collections::BTreeMap;
use std::io::Write;

use clap::Args;
use geocoder_core::{Coordinate, Postcode, PostcodeService, SqlitePostcodeStore};

use crate::{CliError, StoreArgs, write_json, write_line};

/// CLI arguments for the `lookup` subcommand.
#[derive(Debug, Clone, Args)]
pub(crate) struct LookupArgs {
    #[command(flatten)]
    pub(crate) store: StoreArgs,
    /// Postcodes to look up, matched exactly as stored (e.g. "SW1A 2AA").
    #[arg(value_name = "postcode", required = true)]
    pub(crate) postcodes: Vec<String>,
}

/// CLI arguments for the `add` subcommand.
#[derive(Debug, Clone, Args)]
pub(crate) struct AddArgs {
    #[command(flatten)]
    pub(crate) store: StoreArgs,
    /// Postcode to insert; it is validated and formatted first.
    #[arg(value_name = "postcode")]
    pub(crate) postcode: String,
    /// Latitude in decimal degrees.
    #[arg(value_name = "latitude", allow_negative_numbers = true)]
    pub(crate) latitude: f64,
    /// Longitude in decimal degrees.
    #[arg(value_name = "longitude", allow_negative_numbers = true)]
    pub(crate) longitude: f64,
}

fn open_service(store: StoreArgs) -> Result<PostcodeService<SqlitePostcodeStore>, CliError> {
    let location = store.into_location()?;
    Ok(PostcodeService::open(&location.directory, &location.filename)?)
}

pub(crate) fn run_lookup(args: LookupArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let service = open_service(args.store)?;
    if let [postcode] = args.postcodes.as_slice() {
        let coordinate = service.get(postcode)?.ok_or_else(|| CliError::NotFound {
            postcode: postcode.clone(),
        })?;
        return write_json(writer, &coordinate);
    }
    let found: BTreeMap<String, Coordinate> =
        service.get_multiple(&args.postcodes)?.into_iter().collect();
    write_json(writer, &found)
}

pub(crate) fn run_add(args: AddArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let mut service = open_service(args.store)?;
    service.add(&args.postcode, Coordinate::new(args.latitude, args.longitude))?;
    let stored = Postcode::new(&args.postcode).formatted();
    write_line(writer, &format!("added {stored}"))
}

pub(crate) fn run_random(args: StoreArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let service = open_service(args)?;
    write_line(writer, &service.random()?)
}

pub(crate) fn run_count(args: StoreArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let service = open_service(args)?;
    write_line(writer, &service.total_records()?.to_string())
}
