use crate::backend::StageVariables;
use serde::{Deserialize, Serialize};

/// SAM template deploying the generated API definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SamTemplate {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub aws_template_format_version: String,
    pub transform: String,
    pub description: String,
    pub resources: Resources,
}

/// Template resources; the generator only emits the API itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resources {
    pub api: ApiResource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiResource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    pub properties: ApiProperties,
}

/// `AWS::Serverless::Api` properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiProperties {
    pub stage_name: String,
    /// Path of the rewritten spec document
    pub definition_uri: String,
    /// Stage variables referenced by the integration URIs and the CORS template
    pub variables: StageVariables,
}

impl SamTemplate {
    /// Builds the template for a written spec file and its stage variables.
    pub fn new(stage_name: &str, definition_uri: &str, variables: StageVariables) -> Self {
        Self {
            aws_template_format_version: "2010-09-09".to_string(),
            transform: "AWS::Serverless-2016-10-31".to_string(),
            description: "ApiGateway stack auto generated by openapi-to-apigateway".to_string(),
            resources: Resources {
                api: ApiResource {
                    resource_type: "AWS::Serverless::Api".to_string(),
                    properties: ApiProperties {
                        stage_name: stage_name.to_string(),
                        definition_uri: definition_uri.to_string(),
                        variables,
                    },
                },
            },
        }
    }
}
