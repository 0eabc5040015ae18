use crate::backend::is_lambda_target;
use crate::error::GeneratorError;
use crate::generator::{Generator, GeneratorConfig};
use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;

/// Generate AWS ApiGateway CloudFormation from OpenAPI specification
#[derive(Parser, Debug)]
#[command(name = "openapi-to-apigateway")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the OpenAPI specification file
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: PathBuf,

    /// Backend URL to forward the requests to (use ARN for lambda backend)
    #[arg(short = 'u', long = "backend_url", value_name = "URL_OR_ARN")]
    pub backend_url: String,

    /// Comma separated list of whitelisted origins to return in Access-Control-Allow-Origin (use * to allow any)
    #[arg(short = 'c', long = "cors_origins", value_name = "ORIGINS")]
    pub cors_origins: String,

    /// Region where ApiGateway will be deployed. Only needed for lambda integration
    #[arg(short = 'r', long = "apigateway_region")]
    pub apigateway_region: Option<String>,

    /// Proxy all requests to the backend
    #[arg(short = 'p', long = "proxy")]
    pub proxy: bool,

    /// If backend is an VPC link, provide the link ID
    #[arg(short = 'v', long = "vpc_link_id")]
    pub vpc_link_id: Option<String>,

    /// Directory the generated files are written to (emptied first)
    #[arg(short = 'o', long = "output_dir", default_value = "out")]
    pub output_dir: PathBuf,

    /// Stage name of the deployed API
    #[arg(short = 's', long = "stage_name", default_value = "default")]
    pub stage_name: String,

    /// Enable verbose output
    #[arg(long = "verbose")]
    pub verbose: bool,
}

impl From<CliArgs> for GeneratorConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            spec_path: args.file,
            backend_url: args.backend_url,
            proxy: args.proxy,
            vpc_link_id: args.vpc_link_id.filter(|id| !id.is_empty()),
            apigateway_region: args.apigateway_region,
            cors_origins: args.cors_origins,
            output_dir: args.output_dir,
            stage_name: args.stage_name,
        }
    }
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.file.exists() {
        anyhow::bail!("Spec file does not exist: {}", args.file.display());
    }

    if !args.file.is_file() {
        anyhow::bail!("Spec path is not a file: {}", args.file.display());
    }

    if is_lambda_target(&args.backend_url) && args.apigateway_region.is_none() {
        return Err(GeneratorError::MissingRegion.into());
    }

    info!("Spec file: {}", args.file.display());
    info!("Backend: {}", args.backend_url);
    info!("Proxy: {}", args.proxy);
    match args.vpc_link_id.as_deref() {
        Some(id) if !id.is_empty() => info!("Connection: VPC link {}", id),
        _ => info!("Connection: internet"),
    }
    info!("CORS origins: {}", args.cors_origins);
    info!("Output directory: {}", args.output_dir.display());

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting API Gateway document generation...");

    let generator = Generator::new(args.into());
    let generated = generator.generate()?;

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Dialect: {:?}", generated.dialect);
    info!("  - Operations: {}", count_operations(&generated.spec));
    info!("  - Spec: {}", generated.spec_path.display());
    info!("  - Template: {}", generated.template_path.display());

    Ok(())
}

fn count_operations(spec: &serde_yaml::Value) -> usize {
    spec.get("paths")
        .and_then(serde_yaml::Value::as_mapping)
        .map(|paths| {
            paths
                .values()
                .filter_map(serde_yaml::Value::as_mapping)
                .flat_map(|item| item.keys())
                .filter_map(serde_yaml::Value::as_str)
                .filter(|key| crate::operation::is_http_verb(key))
                .count()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_required_and_default_flags() {
        let args = CliArgs::try_parse_from([
            "openapi-to-apigateway",
            "-f",
            "api.yaml",
            "-u",
            "http://api.example.com",
            "-c",
            "*",
        ])
        .unwrap();

        assert_eq!(args.file, PathBuf::from("api.yaml"));
        assert_eq!(args.backend_url, "http://api.example.com");
        assert_eq!(args.cors_origins, "*");
        assert_eq!(args.output_dir, PathBuf::from("out"));
        assert_eq!(args.stage_name, "default");
        assert!(!args.proxy);
        assert!(args.vpc_link_id.is_none());
    }

    #[test]
    fn test_parse_long_flags() {
        let args = CliArgs::try_parse_from([
            "openapi-to-apigateway",
            "--file",
            "api.json",
            "--backend_url",
            "arn:aws:lambda::1:function:f",
            "--apigateway_region",
            "eu-west-1",
            "--proxy",
            "--vpc_link_id",
            "abc",
            "--cors_origins",
            "https://a.example.com",
        ])
        .unwrap();

        assert!(args.proxy);
        assert_eq!(args.apigateway_region.as_deref(), Some("eu-west-1"));
        assert_eq!(args.vpc_link_id.as_deref(), Some("abc"));
        assert_eq!(args.cors_origins, "https://a.example.com");
    }

    #[test]
    fn test_missing_backend_url_rejected() {
        let result = CliArgs::try_parse_from(["openapi-to-apigateway", "-f", "api.yaml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_cors_origins_rejected() {
        let result = CliArgs::try_parse_from([
            "openapi-to-apigateway",
            "-f",
            "api.yaml",
            "-u",
            "http://api.example.com",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_requires_existing_file() {
        let args = CliArgs::try_parse_from([
            "openapi-to-apigateway",
            "-f",
            "/definitely/not/here.yaml",
            "-u",
            "http://api.example.com",
            "-c",
            "*",
        ])
        .unwrap();

        let err = parse_args_from_parsed(args).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_validation_requires_region_for_lambda() {
        let temp_dir = TempDir::new().unwrap();
        let spec = temp_dir.path().join("api.yaml");
        fs::write(&spec, "swagger: '2.0'\npaths: {}\n").unwrap();

        let args = CliArgs::try_parse_from([
            "openapi-to-apigateway",
            "-f",
            spec.to_str().unwrap(),
            "-u",
            "arn:aws:lambda::1:function:f",
            "-c",
            "*",
        ])
        .unwrap();

        let err = parse_args_from_parsed(args).unwrap_err();
        assert_eq!(
            err.downcast_ref::<GeneratorError>(),
            Some(&GeneratorError::MissingRegion)
        );
    }

    #[test]
    fn test_empty_vpc_link_means_internet() {
        let args = CliArgs::try_parse_from([
            "openapi-to-apigateway",
            "-f",
            "api.yaml",
            "-u",
            "http://api.example.com",
            "-c",
            "*",
            "-v",
            "",
        ])
        .unwrap();

        let config = GeneratorConfig::from(args);
        assert!(config.vpc_link_id.is_none());
    }
}
