//! OpenAPI to API Gateway - command-line tool.
//!
//! # Usage
//!
//! ```bash
//! openapi-to-apigateway --file <FILE> --backend_url <URL_OR_ARN> --cors_origins <ORIGINS> [OPTIONS]
//! ```
//!
//! # Examples
//!
//! Proxy every operation to an HTTP backend:
//! ```bash
//! openapi-to-apigateway -f petstore.yaml -u https://api.example.com -c '*' -p
//! ```
//!
//! Invoke a specific Lambda version:
//! ```bash
//! openapi-to-apigateway -f petstore.json \
//!     -u arn:aws:lambda::123456789012:function:petstore:3 -r eu-west-1 \
//!     -c https://app.example.com
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_to_apigateway::cli;

fn main() -> Result<()> {
    // Parse first so the verbose flag can configure the logger
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI to API Gateway generator starting...");

    let args = cli::parse_args_from_parsed(args)?;

    cli::run(args)?;

    info!("API Gateway document generation completed successfully");

    Ok(())
}
