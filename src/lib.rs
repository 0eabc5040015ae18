//! OpenAPI to API Gateway - turns an OpenAPI/Swagger document into an AWS API Gateway definition.
//!
//! The generator takes an existing Swagger 2.0 or OpenAPI 3.0 document plus a backend
//! target (an HTTP(S) URL or a Lambda function ARN) and produces two files:
//!
//! - `swagger.yaml` / `openapi.yaml`: the input document with an
//!   `x-amazon-apigateway-integration` block on every operation, a mock CORS
//!   `options` operation on every path, and unsupported model keys removed
//! - `apigateway.yaml`: a SAM template deploying that document as an
//!   `AWS::Serverless::Api` with the stage variables the integrations reference
//!
//! # Architecture
//!
//! 1. [`loader`] - Reads a JSON or YAML spec into a generic document tree
//! 2. [`dialect`] - Classifies the tree as Swagger 2.0 or OpenAPI 3.0
//! 3. [`backend`] - Derives the integration type, URI template and stage variables
//! 4. [`operation`] - Rewrites single operations with their integration block
//! 5. [`cors`] - Adds CORS preflight operations
//! 6. [`sanitizer`] - Strips model properties API Gateway rejects
//! 7. [`template`] - SAM template model
//! 8. [`generator`] - Runs the stages in order
//! 9. [`serializer`] - Writes the results as YAML
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_to_apigateway::generator::{Generator, GeneratorConfig};
//! use std::path::PathBuf;
//!
//! let generator = Generator::new(GeneratorConfig {
//!     spec_path: PathBuf::from("petstore.yaml"),
//!     backend_url: "https://api.example.com".to_string(),
//!     proxy: true,
//!     vpc_link_id: None,
//!     apigateway_region: None,
//!     cors_origins: "*".to_string(),
//!     output_dir: PathBuf::from("out"),
//!     stage_name: "default".to_string(),
//! });
//! let generated = generator.generate().unwrap();
//! println!("Wrote {}", generated.spec_path.display());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod backend;
pub mod cli;
pub mod cors;
pub mod dialect;
pub mod error;
pub mod generator;
pub mod loader;
pub mod operation;
pub mod sanitizer;
pub mod serializer;
pub mod template;
