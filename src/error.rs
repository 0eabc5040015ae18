use thiserror::Error;

/// Result type alias for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Domain errors raised while transforming a spec document.
///
/// All of them are fatal: the run aborts before any output file is written.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeneratorError {
    /// Neither `swagger: 2.0.x` nor `openapi: 3.0.x` was found at the document root
    #[error("Unsupported docs type. Supported: Swagger 2.0, OpenAPI 3.0")]
    UnsupportedDialect,

    /// Backend target starts with `arn:` but is not a Lambda function ARN
    #[error("Invalid lambda ARN: {0}")]
    InvalidLambdaArn(String),

    /// Backend target could not be parsed as a URL with a host
    #[error("Invalid backend URL {url}: {reason}")]
    InvalidBackendUrl { url: String, reason: String },

    /// Lambda integrations need the API Gateway region to build the invocation URI
    #[error("--apigateway_region is required for lambda integrations")]
    MissingRegion,

    /// The document has no `paths` mapping to rewrite
    #[error("Document has no 'paths' section")]
    MissingPaths,

    /// Resetting the output directory would delete the input or the working directory
    #[error("Refusing to use output directory {dir}: it contains {contains}")]
    UnsafeOutputDir { dir: String, contains: String },
}
