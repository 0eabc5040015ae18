use crate::dialect::Dialect;
use log::{debug, info};
use serde_yaml::{Mapping, Value};

/// Model keys API Gateway rejects.
const UNSUPPORTED_MODEL_KEYS: [&str; 1] = ["xml"];
/// Property keys API Gateway rejects.
const UNSUPPORTED_PROPERTY_KEYS: [&str; 2] = ["xml", "example"];

/// Returns a copy of `doc` without the model properties API Gateway does not support.
///
/// Every model under `definitions` (Swagger) or `components.schemas` (OpenAPI)
/// loses its `xml` key, and each of its declared properties loses `xml` and
/// `example`. Documents without a schema section are returned unchanged.
pub fn strip_unsupported_properties(doc: &Value, dialect: Dialect) -> Value {
    let mut sanitized = doc.clone();

    let schemas = dialect
        .schemas_path()
        .iter()
        .try_fold(&mut sanitized, |node, key| node.get_mut(*key))
        .and_then(Value::as_mapping_mut);

    match schemas {
        Some(schemas) => strip_models(schemas),
        None => debug!("No model definitions to sanitize"),
    }

    sanitized
}

fn strip_models(schemas: &mut Mapping) {
    for (name, model) in schemas.iter_mut() {
        let name = name.as_str().unwrap_or_default();
        let Some(model) = model.as_mapping_mut() else {
            continue;
        };

        for key in UNSUPPORTED_MODEL_KEYS {
            if model.shift_remove(key).is_some() {
                info!("Removed unsupported '{}' from model [{}]", key, name);
            }
        }

        let Some(properties) = model
            .get_mut("properties")
            .and_then(Value::as_mapping_mut)
        else {
            continue;
        };
        for (property_name, property) in properties.iter_mut() {
            let Some(property) = property.as_mapping_mut() else {
                continue;
            };
            for key in UNSUPPORTED_PROPERTY_KEYS {
                if property.shift_remove(key).is_some() {
                    info!(
                        "Removed unsupported '{}' from property [{}.{}]",
                        key,
                        name,
                        property_name.as_str().unwrap_or_default()
                    );
                }
            }
        }
    }
}
