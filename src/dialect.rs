use crate::error::{GeneratorError, Result};
use log::debug;
use serde_yaml::Value;

/// Spec dialect of a loaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Swagger 2.0 (`swagger: "2.0"`)
    Swagger,
    /// OpenAPI 3.0.x (`openapi: "3.0.x"`)
    OpenApi,
}

impl Dialect {
    /// File name the rewritten document is written to.
    pub fn output_file_name(&self) -> &'static str {
        match self {
            Dialect::Swagger => "swagger.yaml",
            Dialect::OpenApi => "openapi.yaml",
        }
    }

    /// Key path of the model definitions section.
    pub fn schemas_path(&self) -> &'static [&'static str] {
        match self {
            Dialect::Swagger => &["definitions"],
            Dialect::OpenApi => &["components", "schemas"],
        }
    }
}

/// Classifies the dialect from the root version marker.
///
/// `swagger` must start with `2.0`, `openapi` with `3.0`. Unquoted YAML
/// versions (`swagger: 2.0`) load as numbers and are compared by their
/// textual form.
pub fn classify_dialect(doc: &Value) -> Result<Dialect> {
    let dialect = if version_marker(doc, "swagger").is_some_and(|v| v.starts_with("2.0")) {
        Dialect::Swagger
    } else if version_marker(doc, "openapi").is_some_and(|v| v.starts_with("3.0")) {
        Dialect::OpenApi
    } else {
        return Err(GeneratorError::UnsupportedDialect);
    };

    debug!("Classified document as {:?}", dialect);
    Ok(dialect)
}

fn version_marker(doc: &Value, key: &str) -> Option<String> {
    match doc.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_swagger_2() {
        assert_eq!(classify_dialect(&doc("swagger: '2.0'")), Ok(Dialect::Swagger));
    }

    #[test]
    fn test_openapi_3_0() {
        assert_eq!(classify_dialect(&doc("openapi: 3.0.1")), Ok(Dialect::OpenApi));
        assert_eq!(classify_dialect(&doc("openapi: '3.0'")), Ok(Dialect::OpenApi));
    }

    #[test]
    fn test_unsupported_documents() {
        assert_eq!(
            classify_dialect(&doc("foo: bar")),
            Err(GeneratorError::UnsupportedDialect)
        );
        assert_eq!(
            classify_dialect(&doc("openapi: 3.1.0")),
            Err(GeneratorError::UnsupportedDialect)
        );
        assert_eq!(
            classify_dialect(&doc("swagger: '1.2'")),
            Err(GeneratorError::UnsupportedDialect)
        );
    }

    #[test]
    fn test_output_file_names() {
        assert_eq!(Dialect::Swagger.output_file_name(), "swagger.yaml");
        assert_eq!(Dialect::OpenApi.output_file_name(), "openapi.yaml");
    }
}
