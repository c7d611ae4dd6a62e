//! Focused unit tests covering CLI parsing and configuration resolution.

use super::*;
use crate::provision::ProvisionConfig;
use clap::CommandFactory;
use rstest::rstest;

#[rstest]
fn converting_provision_without_source_errors() {
    let args = ProvisionArgs::default();
    let err = ProvisionConfig::try_from(args).expect_err("missing source should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_SOURCE);
            assert_eq!(env, ENV_SOURCE);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn provision_config_applies_defaults() {
    let args = ProvisionArgs {
        source: Some(Utf8PathBuf::from("ONSPD_AUG_2018_UK.csv")),
        ..ProvisionArgs::default()
    };
    let config = ProvisionConfig::try_from(args).expect("config should build");
    assert_eq!(config.database_dir, Utf8PathBuf::from("."));
    assert_eq!(config.database_file, DEFAULT_DATABASE_FILENAME);
    assert_eq!(config.batch_size, geocoder_data::DEFAULT_PER_PAGE);
}

#[rstest]
#[case(None, None, ".", DEFAULT_DATABASE_FILENAME)]
#[case(Some("/srv/postcodes"), None, "/srv/postcodes", DEFAULT_DATABASE_FILENAME)]
#[case(Some("data"), Some("onspd.sqlite"), "data", "onspd.sqlite")]
fn store_location_resolves_defaults(
    #[case] dir: Option<&str>,
    #[case] file: Option<&str>,
    #[case] expected_dir: &str,
    #[case] expected_file: &str,
) {
    let location = StoreLocation::from(StoreArgs {
        database_dir: dir.map(Utf8PathBuf::from),
        database_file: file.map(str::to_owned),
    });
    assert_eq!(location.directory, Utf8PathBuf::from(expected_dir));
    assert_eq!(location.filename, expected_file);
}

#[rstest]
fn parses_negative_coordinates_for_add() {
    let cli = Cli::try_parse_from([
        "postcodes",
        "add",
        "sw1a2aa",
        "51.50354",
        "-0.127695",
        "--database-dir",
        "/srv/postcodes",
    ])
    .expect("arguments should parse");
    match cli.command {
        Command::Add(args) => {
            assert_eq!(args.postcode, "sw1a2aa");
            assert!((args.longitude - -0.127695).abs() < f64::EPSILON);
            assert_eq!(
                args.store.database_dir,
                Some(Utf8PathBuf::from("/srv/postcodes"))
            );
        }
        other => panic!("expected add command, found {other:?}"),
    }
}

#[rstest]
fn lookup_requires_a_postcode() {
    let err = Cli::try_parse_from(["postcodes", "lookup"]).expect_err("lookup needs input");
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}

#[rstest]
fn parses_provision_options() {
    let cli = Cli::try_parse_from([
        "postcodes",
        "provision",
        "onspd.csv",
        "--batch-size",
        "500",
        "--database-file",
        "onspd.sqlite",
    ])
    .expect("arguments should parse");
    match cli.command {
        Command::Provision(args) => {
            assert_eq!(args.source, Some(Utf8PathBuf::from("onspd.csv")));
            assert_eq!(args.batch_size, Some(500));
            assert_eq!(args.database_file.as_deref(), Some("onspd.sqlite"));
            assert_eq!(args.database_dir, None);
        }
        other => panic!("expected provision command, found {other:?}"),
    }
}

#[rstest]
#[case(StoreArgs::command().get_name().to_owned(), STORE_SECTION)]
#[case(ProvisionArgs::command().get_name().to_owned(), "provision")]
fn configuration_sections_have_stable_names(#[case] name: String, #[case] expected: &str) {
    assert_eq!(name, expected);
}
