//! Per-operation rewriting: builds the `x-amazon-apigateway-integration` block
//! and declares the CORS origin header on every response.

use crate::backend::{BackendDescriptor, BackendType};
use log::{debug, info, warn};
use serde_yaml::{Mapping, Value};

/// Vendor extension key holding the integration block.
pub const INTEGRATION_KEY: &str = "x-amazon-apigateway-integration";

/// Response header used for CORS.
pub const ALLOW_ORIGIN_HEADER: &str = "Access-Control-Allow-Origin";

/// Path-item keys that hold operations.
pub const HTTP_VERBS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Returns `true` if the path-item key names an operation.
pub fn is_http_verb(key: &str) -> bool {
    HTTP_VERBS.contains(&key)
}

/// Description attached to the generated CORS header declarations.
pub const CORS_HEADER_DESCRIPTION: &str = "CORS origin header added by openapi-to-apigateway";

/// How API Gateway reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connection {
    Internet,
    VpcLink(String),
}

/// The integration block of a single operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Integration {
    pub integration_type: BackendType,
    pub connection: Connection,
    pub http_method: String,
    pub uri: String,
    /// `integration.request.*` -> `method.request.*`, in parameter order
    pub request_parameters: Mapping,
    /// Status code -> integration response, in response order
    pub responses: Mapping,
}

impl From<Integration> for Value {
    fn from(integration: Integration) -> Self {
        let mut block = Mapping::new();
        block.insert("type".into(), integration.integration_type.as_str().into());
        match integration.connection {
            Connection::Internet => {
                block.insert("connectionType".into(), "INTERNET".into());
            }
            Connection::VpcLink(id) => {
                block.insert("connectionId".into(), id.into());
                block.insert("connectionType".into(), "VPC_LINK".into());
            }
        }
        block.insert("httpMethod".into(), integration.http_method.into());
        block.insert("uri".into(), integration.uri.into());
        block.insert(
            "requestParameters".into(),
            Value::Mapping(integration.request_parameters),
        );
        block.insert("responses".into(), Value::Mapping(integration.responses));
        Value::Mapping(block)
    }
}

/// Creates the integration with its type, connection, method and URI.
///
/// Lambda integrations are always invoked with `POST` on the prefix as-is,
/// since the stage-variable-qualified ARN already names the function. Other
/// integrations forward the operation's own verb to `uri_prefix + path`.
pub fn init_integration(
    backend_type: BackendType,
    vpc_link_id: &str,
    is_lambda: bool,
    verb: &str,
    path: &str,
    uri_prefix: &str,
) -> Integration {
    let connection = if vpc_link_id.is_empty() {
        Connection::Internet
    } else {
        debug!("Adding connectionId: [{}] to integrations", vpc_link_id);
        Connection::VpcLink(vpc_link_id.to_string())
    };

    let (http_method, uri) = if is_lambda {
        ("POST".to_string(), uri_prefix.to_string())
    } else {
        (verb.to_uppercase(), format!("{uri_prefix}{path}"))
    };

    Integration {
        integration_type: backend_type,
        connection,
        http_method,
        uri,
        request_parameters: Mapping::new(),
        responses: Mapping::new(),
    }
}

/// Maps `query`, `path` and `header` parameters onto integration request parameters.
///
/// `body`, `cookie` and `$ref` parameters have no request-parameter mapping
/// and are skipped.
pub fn add_request_parameter_mappings(integration: &mut Integration, parameters: Option<&Value>) {
    let Some(parameters) = parameters.and_then(Value::as_sequence) else {
        return;
    };

    for parameter in parameters {
        let location = parameter.get("in").and_then(Value::as_str);
        let name = parameter.get("name").and_then(Value::as_str);

        let (location, name) = match (location, name) {
            (Some(location @ ("query" | "path" | "header")), Some(name)) => (location, name),
            (location, _) => {
                debug!("Skipping verb parameter with integration name: [{:?}]", location);
                continue;
            }
        };

        let integration_location = if location == "query" {
            "querystring"
        } else {
            location
        };

        let mapping_name = format!("integration.request.{integration_location}.{name}");
        let mapping_value = format!("method.request.{location}.{name}");
        info!(
            "Mapping: [{}] to [{}] in requestParameters",
            mapping_name, mapping_value
        );
        integration
            .request_parameters
            .insert(mapping_name.into(), mapping_value.into());
    }
}

/// Adds one integration response per declared status code, each passing
/// through a wildcard CORS origin.
pub fn add_response_mappings(integration: &mut Integration, responses: Option<&Value>) {
    let Some(responses) = responses.and_then(Value::as_mapping) else {
        return;
    };
    debug!("Adding responses for verb");

    for code in responses.keys().filter_map(status_code) {
        let mut response_parameters = Mapping::new();
        response_parameters.insert(
            format!("method.response.header.{ALLOW_ORIGIN_HEADER}").into(),
            "'*'".into(),
        );

        let mut response = Mapping::new();
        response.insert("statusCode".into(), code.clone().into());
        response.insert(
            "responseParameters".into(),
            Value::Mapping(response_parameters),
        );

        integration
            .responses
            .insert(code.into(), Value::Mapping(response));
    }
}

/// Declares the `Access-Control-Allow-Origin` header on every response of the operation.
pub fn attach_cors_response_headers(operation: &mut Value) {
    let Some(responses) = operation
        .get_mut("responses")
        .and_then(Value::as_mapping_mut)
    else {
        return;
    };

    for (code, response) in responses.iter_mut() {
        if response.is_null() {
            *response = Value::Mapping(Mapping::new());
        }
        let Some(response) = response.as_mapping_mut() else {
            warn!("Response {:?} is not a mapping, skipping CORS header", code);
            continue;
        };

        if !response.get("headers").is_some_and(Value::is_mapping) {
            response.insert("headers".into(), Value::Mapping(Mapping::new()));
        }
        if let Some(headers) = response.get_mut("headers").and_then(Value::as_mapping_mut) {
            headers.insert(ALLOW_ORIGIN_HEADER.into(), cors_header_declaration());
        }
    }
}

fn cors_header_declaration() -> Value {
    let mut header = Mapping::new();
    header.insert("type".into(), "string".into());
    header.insert("description".into(), CORS_HEADER_DESCRIPTION.into());
    Value::Mapping(header)
}

/// Status code keys load as strings or, from unquoted YAML, as integers.
fn status_code(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Applies the integration rules of one backend to individual operations.
pub struct OperationRewriter<'a> {
    backend: &'a BackendDescriptor,
}

impl<'a> OperationRewriter<'a> {
    pub fn new(backend: &'a BackendDescriptor) -> Self {
        Self { backend }
    }

    /// Returns a rewritten copy of `operation`; the input is left untouched.
    pub fn rewrite(&self, verb: &str, path: &str, operation: &Value) -> Value {
        debug!("Extending verb for route [{} {}]", verb, path);

        let mut integration = init_integration(
            self.backend.backend_type,
            &self.backend.vpc_link_id,
            self.backend.is_lambda(),
            verb,
            path,
            &self.backend.uri_prefix,
        );
        add_request_parameter_mappings(&mut integration, operation.get("parameters"));
        add_response_mappings(&mut integration, operation.get("responses"));

        let mut rewritten = operation.clone();
        if rewritten.is_null() {
            rewritten = Value::Mapping(Mapping::new());
        }
        attach_cors_response_headers(&mut rewritten);
        if let Some(body) = rewritten.as_mapping_mut() {
            body.insert(INTEGRATION_KEY.into(), integration.into());
        } else {
            warn!("Operation [{} {}] is not a mapping, left unchanged", verb, path);
        }
        rewritten
    }
}
