//! Entry point for the `postcodes` command-line interface.
#![forbid(unsafe_code)]

use geocoder_cli::CliError;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match geocoder_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("postcodes: {err}");
            std::process::exit(1);
        }
    }
}
