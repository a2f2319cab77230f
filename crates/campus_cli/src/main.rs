//! CLI entry point.
//!
//! # Responsibility
//! - Verify core wiring: config, logging, storage bootstrap.
//! - Run one API operation per invocation: `campus <operation> [json-body]`.
//!
//! Without arguments it prints version and schema information and exits.

use campus_api::CampusApi;
use campus_core::db::migrations::{latest_version, schema_version};
use campus_core::{core_version, init_from_config, CampusConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match CampusConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("campus: invalid configuration: {err}");
            return ExitCode::from(2);
        }
    };
    if let Err(err) = init_from_config(&config) {
        eprintln!("campus: logging disabled: {err}");
    }

    let api = match CampusApi::open(&config) {
        Ok(api) => api,
        Err(err) => {
            eprintln!(
                "campus: failed to open {}: {err}",
                config.db_path.display()
            );
            return ExitCode::FAILURE;
        }
    };

    let mut args = std::env::args().skip(1);
    match args.next() {
        Some(operation) => {
            let body = args.next().unwrap_or_default();
            println!("{}", api.handle(&operation, &body));
        }
        None => {
            println!("campus_core version={}", core_version());
            match api.store().with_connection(|conn| schema_version(conn)) {
                Ok(version) => println!("schema version={version} latest={}", latest_version()),
                Err(err) => eprintln!("campus: failed to read schema version: {err}"),
            }
            println!("db path={}", config.db_path.display());
            println!(
                "term={} ay={}",
                config.term.term(),
                config.term.academic_year()
            );
        }
    }

    api.close();
    ExitCode::SUCCESS
}
