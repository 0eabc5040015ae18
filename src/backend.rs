//! Backend resolution: integration type, invocation URI template and stage variables.

use crate::error::{GeneratorError, Result};
use log::{debug, info};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;
use url::Url;

/// Lambda ARN with a trailing version or alias.
static QUALIFIED_LAMBDA_ARN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(arn:aws:lambda:[a-z0-9-]*:\d+:function:[\w-]+:)([\w-]+)$")
        .expect("qualified lambda ARN pattern is valid")
});

/// Lambda ARN without a version.
static UNQUALIFIED_LAMBDA_ARN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(arn:aws:lambda:[a-z0-9-]*:\d+:function:)([\w-]+)$")
        .expect("unqualified lambda ARN pattern is valid")
});

/// Stage variable holding the raw backend target.
pub const BACKEND_URL_VAR: &str = "backendUrl";
/// Stage variable holding the HTTP backend host.
pub const HTTP_HOST_VAR: &str = "httpHost";
/// Stage variable holding the Lambda function name (unqualified ARN).
pub const LAMBDA_NAME_VAR: &str = "lambdaName";
/// Stage variable holding the Lambda version or alias (qualified ARN).
pub const LAMBDA_VERSION_VAR: &str = "lambdaVersion";

/// Stage variables, keyed by name. Keys are unique by construction.
pub type StageVariables = BTreeMap<String, String>;

/// API Gateway integration type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Http,
    HttpProxy,
    Aws,
    AwsProxy,
}

impl BackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::Http => "http",
            BackendType::HttpProxy => "http_proxy",
            BackendType::Aws => "aws",
            BackendType::AwsProxy => "aws_proxy",
        }
    }

    /// Whether this is a Lambda (`aws`/`aws_proxy`) integration.
    pub fn is_lambda(&self) -> bool {
        matches!(self, BackendType::Aws | BackendType::AwsProxy)
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything derived from the backend target that the operation rewriter needs.
///
/// Built once per run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendDescriptor {
    pub backend_type: BackendType,
    /// URI template; HTTP integrations append the operation path to it
    pub uri_prefix: String,
    pub stage_variables: StageVariables,
    /// VPC link id, empty for internet-facing integrations
    pub vpc_link_id: String,
}

impl BackendDescriptor {
    /// Resolves the full descriptor for a backend target.
    ///
    /// `region` is only consulted for Lambda targets, where it is mandatory.
    pub fn resolve(
        target: &str,
        proxy_enabled: bool,
        region: Option<&str>,
        vpc_link_id: Option<&str>,
    ) -> Result<Self> {
        let backend_type = resolve_backend_type(target, proxy_enabled);
        let region = match region {
            Some(region) => region,
            None if backend_type.is_lambda() => return Err(GeneratorError::MissingRegion),
            None => "",
        };
        let (uri_prefix, stage_variables) =
            resolve_uri_and_stage_vars(target, region, backend_type.is_lambda())?;

        Ok(Self {
            backend_type,
            uri_prefix,
            stage_variables,
            vpc_link_id: vpc_link_id.unwrap_or_default().to_string(),
        })
    }

    pub fn is_lambda(&self) -> bool {
        self.backend_type.is_lambda()
    }
}

/// Returns `true` when the target addresses a Lambda function.
pub fn is_lambda_target(target: &str) -> bool {
    target.starts_with("arn:")
}

/// `aws` for ARN targets, `http` otherwise, with `_proxy` appended in proxy mode.
pub fn resolve_backend_type(target: &str, proxy_enabled: bool) -> BackendType {
    let backend_type = match (is_lambda_target(target), proxy_enabled) {
        (true, false) => BackendType::Aws,
        (true, true) => BackendType::AwsProxy,
        (false, false) => BackendType::Http,
        (false, true) => BackendType::HttpProxy,
    };
    debug!("Determined backend type as: [{}]", backend_type);
    backend_type
}

/// Computes the invocation URI prefix and the stage variables it references.
///
/// # Lambda targets
///
/// A qualified ARN (`...:function:<name>:<version>`) moves the version into the
/// `lambdaVersion` stage variable; an unqualified one moves the function name
/// into `lambdaName`. The prefix is the API Gateway Lambda invocation path for
/// `region` with the variable substituted in.
///
/// # HTTP targets
///
/// The URL host goes into `httpHost` and the prefix becomes
/// `http://${stageVariables.httpHost}`.
///
/// `backendUrl` is always set to the raw target.
///
/// # Errors
///
/// - [`GeneratorError::InvalidLambdaArn`] if a Lambda target matches neither ARN form
/// - [`GeneratorError::InvalidBackendUrl`] if an HTTP target has no parseable host
pub fn resolve_uri_and_stage_vars(
    target: &str,
    region: &str,
    is_lambda: bool,
) -> Result<(String, StageVariables)> {
    let mut stage_vars = StageVariables::new();
    stage_vars.insert(BACKEND_URL_VAR.to_string(), target.to_string());

    let uri_prefix = if is_lambda {
        let functions_path =
            format!("arn:aws:apigateway:{region}:lambda:path/2015-03-31/functions/");

        let (arn_start, var_name, var_value) =
            if let Some(caps) = QUALIFIED_LAMBDA_ARN.captures(target) {
                (caps[1].to_string(), LAMBDA_VERSION_VAR, caps[2].to_string())
            } else if let Some(caps) = UNQUALIFIED_LAMBDA_ARN.captures(target) {
                (caps[1].to_string(), LAMBDA_NAME_VAR, caps[2].to_string())
            } else {
                return Err(GeneratorError::InvalidLambdaArn(target.to_string()));
            };

        info!("Setting '{}' stageVariable to: [{}]", var_name, var_value);
        stage_vars.insert(var_name.to_string(), var_value);
        format!("{functions_path}{arn_start}${{stageVariables.{var_name}}}/invocations")
    } else {
        let host = http_host(target)?;
        info!("Setting '{}' stageVariable to [{}]", HTTP_HOST_VAR, host);
        stage_vars.insert(HTTP_HOST_VAR.to_string(), host);
        format!("http://${{stageVariables.{HTTP_HOST_VAR}}}")
    };

    Ok((uri_prefix, stage_vars))
}

fn http_host(target: &str) -> Result<String> {
    let invalid = |reason: String| GeneratorError::InvalidBackendUrl {
        url: target.to_string(),
        reason,
    };

    let url = Url::parse(target).map_err(|e| invalid(e.to_string()))?;
    url.host_str()
        .map(str::to_string)
        .ok_or_else(|| invalid("URL has no host".to_string()))
}
