//! swag-gen - Command-line tool for generating OpenAPI documentation from Go sources.
//!
//! This binary scans a Go project for swag-style annotations (`@Router`, `@Summary`,
//! `@Param`, ...) in doc comments and generates an OpenAPI 3.0 document from them.
//!
//! # Usage
//!
//! ```bash
//! swag-gen [OPTIONS] [PROJECT_PATH]
//! ```
//!
//! # Examples
//!
//! Print JSON documentation to stdout:
//! ```bash
//! swag-gen ./api
//! ```
//!
//! Write `docs/swagger.yaml` and `docs/swag-gen.yaml`:
//! ```bash
//! swag-gen ./api -o docs -f yaml -t "User Service"
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! swag-gen ./api -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use swag_gen::cli;

fn main() -> Result<()> {
    // Parse once to read the verbose flag before the logger exists
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("swag-gen starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
