//! CORS preflight support: a mock `options` operation on every path.

use crate::operation::{is_http_verb, ALLOW_ORIGIN_HEADER, INTEGRATION_KEY};
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// Stage variable holding the comma separated origin allow-list.
pub const CORS_ORIGINS_VAR: &str = "CORS_ORIGINS";

const ALLOW_HEADERS_HEADER: &str = "Access-Control-Allow-Headers";
const ALLOW_METHODS_HEADER: &str = "Access-Control-Allow-Methods";
const ALLOWED_REQUEST_HEADERS: &str =
    "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token";
const JSON_MEDIA_TYPE: &str = "application/json";

/// Echoes the request `Origin` back when it is present in the `CORS_ORIGINS`
/// stage variable. Otherwise the static `'*'` mapping applies.
const ORIGIN_OVERRIDE_TEMPLATE: &str = r#"#set($origin = $input.params("Origin"))
#if($origin == "")
#set($origin = $input.params("origin"))
#end
#set($allowed = "$stageVariables.CORS_ORIGINS")
#if($origin != "" && $allowed != "" && $allowed.split(",").contains($origin))
#set($context.responseOverride.header.Access-Control-Allow-Origin = $origin)
#end
"#;

#[derive(Debug, Serialize)]
struct OptionsOperation {
    consumes: Vec<&'static str>,
    produces: Vec<&'static str>,
    tags: Vec<&'static str>,
    summary: &'static str,
    responses: BTreeMap<&'static str, OptionsResponse>,
    #[serde(rename = "x-amazon-apigateway-integration")]
    integration: MockIntegration,
}

#[derive(Debug, Serialize)]
struct OptionsResponse {
    description: &'static str,
    headers: BTreeMap<&'static str, HeaderSchema>,
}

#[derive(Debug, Serialize)]
struct HeaderSchema {
    #[serde(rename = "type")]
    schema_type: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MockIntegration {
    #[serde(rename = "type")]
    integration_type: &'static str,
    request_templates: BTreeMap<&'static str, &'static str>,
    passthrough_behavior: &'static str,
    responses: BTreeMap<&'static str, MockResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MockResponse {
    status_code: &'static str,
    response_parameters: BTreeMap<String, String>,
    response_templates: BTreeMap<&'static str, &'static str>,
}

impl OptionsOperation {
    fn new(allowed_methods: &str) -> Self {
        let headers = [ALLOW_HEADERS_HEADER, ALLOW_METHODS_HEADER, ALLOW_ORIGIN_HEADER]
            .into_iter()
            .map(|name| (name, HeaderSchema { schema_type: "string" }))
            .collect();

        let response_parameters = [
            (ALLOW_HEADERS_HEADER, ALLOWED_REQUEST_HEADERS),
            (ALLOW_METHODS_HEADER, allowed_methods),
            (ALLOW_ORIGIN_HEADER, "*"),
        ]
        .into_iter()
        .map(|(name, value)| (format!("method.response.header.{name}"), format!("'{value}'")))
        .collect();

        Self {
            consumes: vec![JSON_MEDIA_TYPE],
            produces: vec![JSON_MEDIA_TYPE],
            tags: vec!["CORS"],
            summary: "CORS support",
            responses: BTreeMap::from([(
                "200",
                OptionsResponse {
                    description: "Default response for CORS method",
                    headers,
                },
            )]),
            integration: MockIntegration {
                integration_type: "mock",
                request_templates: BTreeMap::from([(JSON_MEDIA_TYPE, "{\"statusCode\": 200}")]),
                passthrough_behavior: "when_no_match",
                responses: BTreeMap::from([(
                    "default",
                    MockResponse {
                        status_code: "200",
                        response_parameters,
                        response_templates: BTreeMap::from([(
                            JSON_MEDIA_TYPE,
                            ORIGIN_OVERRIDE_TEMPLATE,
                        )]),
                    },
                )]),
            },
        }
    }
}

/// Comma separated, upper-cased verbs of a path item, followed by `OPTIONS`.
fn allowed_methods(path_item: &Value) -> String {
    let mut methods: Vec<String> = path_item
        .as_mapping()
        .into_iter()
        .flat_map(Mapping::keys)
        .filter_map(Value::as_str)
        .filter(|key| is_http_verb(key) && *key != "options")
        .map(str::to_uppercase)
        .collect();
    methods.push("OPTIONS".to_string());
    methods.join(",")
}

/// Returns a copy of `doc` with a mock CORS `options` operation on every path.
///
/// An existing `options` operation is replaced.
///
/// # Errors
///
/// Returns an error if the generated operation cannot be converted to a document node.
pub fn inject_cors_options(doc: &Value) -> Result<Value> {
    let mut injected = doc.clone();
    if let Some(paths) = injected.get_mut("paths").and_then(Value::as_mapping_mut) {
        for (path, path_item) in paths.iter_mut() {
            let path = path.as_str().unwrap_or_default();
            if !path_item.is_mapping() {
                *path_item = Value::Mapping(Mapping::new());
            }

            let operation = OptionsOperation::new(&allowed_methods(path_item));
            let operation = serde_yaml::to_value(&operation)
                .with_context(|| format!("Failed to build CORS options operation for {path}"))?;

            if let Some(item) = path_item.as_mapping_mut() {
                if item.contains_key("options") {
                    warn!("Replacing existing options operation on [{}] with CORS mock", path);
                }
                debug!("Adding CORS options method to [{}]", path);
                item.insert("options".into(), operation);
            }
        }
    }

    Ok(injected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn is_cors_options(operation: &Value) -> bool {
        operation
            .get(INTEGRATION_KEY)
            .and_then(|integration| integration.get("type"))
            .and_then(Value::as_str)
            == Some("mock")
    }

    #[test]
    fn test_options_added_to_every_path() {
        let doc = yaml(
            r#"
            swagger: '2.0'
            paths:
              /pets:
                get: {}
                post: {}
              /pets/{id}:
                delete: {}
            "#,
        );

        let injected = inject_cors_options(&doc).unwrap();

        for path in ["/pets", "/pets/{id}"] {
            let options = &injected["paths"][path]["options"];
            assert!(is_cors_options(options), "missing CORS options on {path}");
            assert_eq!(options["tags"], yaml("[CORS]"));
            assert_eq!(options["consumes"], yaml("[application/json]"));
            assert_eq!(options["produces"], yaml("[application/json]"));
        }
        assert!(doc["paths"]["/pets"].get("options").is_none());
    }

    #[test]
    fn test_allowed_methods_follow_path_verbs() {
        let doc = yaml(
            r#"
            paths:
              /pets:
                parameters: []
                get: {}
                post: {}
            "#,
        );

        let injected = inject_cors_options(&doc).unwrap();

        let parameters = &injected["paths"]["/pets"]["options"][INTEGRATION_KEY]["responses"]
            ["default"]["responseParameters"];
        assert_eq!(
            parameters["method.response.header.Access-Control-Allow-Methods"].as_str(),
            Some("'GET,POST,OPTIONS'")
        );
        assert_eq!(
            parameters["method.response.header.Access-Control-Allow-Origin"].as_str(),
            Some("'*'")
        );
    }

    #[test]
    fn test_declared_response_headers() {
        let doc = yaml("paths:\n  /a:\n    get: {}\n");

        let injected = inject_cors_options(&doc).unwrap();

        assert_eq!(
            injected["paths"]["/a"]["options"]["responses"]["200"]["headers"],
            yaml(
                r#"
                Access-Control-Allow-Headers:
                  type: string
                Access-Control-Allow-Methods:
                  type: string
                Access-Control-Allow-Origin:
                  type: string
                "#
            )
        );
    }

    #[test]
    fn test_template_checks_origin_against_stage_variable() {
        let doc = yaml("paths:\n  /a:\n    get: {}\n");

        let injected = inject_cors_options(&doc).unwrap();

        let template = injected["paths"]["/a"]["options"][INTEGRATION_KEY]["responses"]["default"]
            ["responseTemplates"]["application/json"]
            .as_str()
            .unwrap();
        assert!(template.contains(CORS_ORIGINS_VAR));
        assert!(template.contains("split(\",\").contains($origin)"));
        assert!(template.contains("$origin != \"\""));
    }

    #[test]
    fn test_existing_options_replaced() {
        let doc = yaml("paths:\n  /a:\n    options:\n      summary: custom\n");

        let injected = inject_cors_options(&doc).unwrap();

        assert!(is_cors_options(&injected["paths"]["/a"]["options"]));
        assert_eq!(
            injected["paths"]["/a"]["options"]["summary"].as_str(),
            Some("CORS support")
        );
    }

    #[test]
    fn test_document_without_paths_is_unchanged() {
        let doc = yaml("swagger: '2.0'");
        assert_eq!(inject_cors_options(&doc).unwrap(), doc);
    }
}
