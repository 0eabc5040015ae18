//! End-to-end generation: load, rewrite, and write the spec and SAM template.
//!
//! Every stage takes the previous stage's tree by reference and returns a new
//! one, so a failing stage never leaves a half-rewritten document behind.

use crate::backend::{BackendDescriptor, StageVariables};
use crate::cors::{inject_cors_options, CORS_ORIGINS_VAR};
use crate::dialect::{classify_dialect, Dialect};
use crate::error::GeneratorError;
use crate::loader::load_document;
use crate::operation::{is_http_verb, OperationRewriter};
use crate::sanitizer::strip_unsupported_properties;
use crate::serializer::{reset_output_dir, serialize_yaml, write_to_file};
use crate::template::SamTemplate;
use anyhow::{Context, Result};
use log::{debug, info};
use serde_yaml::Value;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the generated SAM template.
pub const TEMPLATE_FILE_NAME: &str = "apigateway.yaml";

/// Inputs of a single generator run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// OpenAPI/Swagger document to transform
    pub spec_path: PathBuf,
    /// HTTP(S) URL or Lambda ARN requests are forwarded to
    pub backend_url: String,
    pub proxy: bool,
    pub vpc_link_id: Option<String>,
    /// Only needed for Lambda backends
    pub apigateway_region: Option<String>,
    /// Comma separated origin allow-list
    pub cors_origins: String,
    /// Recreated empty on every run
    pub output_dir: PathBuf,
    pub stage_name: String,
}

/// The two documents produced by a run, not yet written.
#[derive(Debug, Clone)]
pub struct GeneratedDocuments {
    pub dialect: Dialect,
    /// Rewritten spec with the API Gateway extensions
    pub spec: Value,
    pub spec_path: PathBuf,
    pub template: SamTemplate,
    pub template_path: PathBuf,
}

/// Converts one spec document into API Gateway artifacts.
///
/// Constructed fresh for every run; it holds no state besides its configuration.
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Runs the whole pipeline and writes both output files.
    ///
    /// The output directory is only emptied once every transformation stage
    /// succeeded, right before the two files are written.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be loaded, any transformation
    /// stage fails, the output directory holds the input document or the
    /// working directory, or the outputs cannot be written.
    pub fn generate(&self) -> Result<GeneratedDocuments> {
        let doc = load_document(&self.config.spec_path)?;
        let generated = self.build(&doc)?;

        let spec_yaml = serialize_yaml(&generated.spec)?;
        let template_yaml = serialize_yaml(&generated.template)?;

        check_output_dir(&self.config.output_dir, &self.config.spec_path)?;
        reset_output_dir(&self.config.output_dir)?;

        write_to_file(&spec_yaml, &generated.spec_path)?;
        info!(
            "Saved OpenAPI template with amazon extensions to: [{}]",
            generated.spec_path.display()
        );
        write_to_file(&template_yaml, &generated.template_path)?;
        info!("Saved SAM template file to: [{}]", generated.template_path.display());

        Ok(generated)
    }

    /// Transforms an already loaded document without touching the file system.
    ///
    /// # Errors
    ///
    /// - [`GeneratorError::UnsupportedDialect`] for anything but Swagger 2.0 / OpenAPI 3.0
    /// - [`GeneratorError::MissingRegion`], [`GeneratorError::InvalidLambdaArn`] or
    ///   [`GeneratorError::InvalidBackendUrl`] for a bad backend target
    /// - [`GeneratorError::MissingPaths`] if the document has no `paths`
    pub fn build(&self, doc: &Value) -> Result<GeneratedDocuments> {
        let dialect = classify_dialect(doc)?;
        let backend = BackendDescriptor::resolve(
            &self.config.backend_url,
            self.config.proxy,
            self.config.apigateway_region.as_deref(),
            self.config.vpc_link_id.as_deref(),
        )?;

        let rewritten = rewrite_operations(doc, &backend)?;
        let with_cors = inject_cors_options(&rewritten)?;
        let spec = strip_unsupported_properties(&with_cors, dialect);

        let output_dir = std::path::absolute(&self.config.output_dir).with_context(|| {
            format!(
                "Failed to resolve output directory: {}",
                self.config.output_dir.display()
            )
        })?;
        let spec_path = output_dir.join(dialect.output_file_name());
        let template_path = output_dir.join(TEMPLATE_FILE_NAME);

        let template = SamTemplate::new(
            &self.config.stage_name,
            &spec_path.to_string_lossy(),
            self.stage_variables(&backend),
        );

        Ok(GeneratedDocuments {
            dialect,
            spec,
            spec_path,
            template,
            template_path,
        })
    }

    fn stage_variables(&self, backend: &BackendDescriptor) -> StageVariables {
        let mut variables = backend.stage_variables.clone();
        variables.insert(
            CORS_ORIGINS_VAR.to_string(),
            normalize_origins(&self.config.cors_origins),
        );
        variables
    }
}

/// Returns a copy of `doc` with every operation carrying its integration block.
///
/// # Errors
///
/// Returns [`GeneratorError::MissingPaths`] if `doc` has no `paths` mapping.
pub fn rewrite_operations(
    doc: &Value,
    backend: &BackendDescriptor,
) -> std::result::Result<Value, GeneratorError> {
    let rewriter = OperationRewriter::new(backend);
    let mut rewritten = doc.clone();
    let paths = rewritten
        .get_mut("paths")
        .and_then(Value::as_mapping_mut)
        .ok_or(GeneratorError::MissingPaths)?;

    for (path, path_item) in paths.iter_mut() {
        let path = path.as_str().unwrap_or_default();
        let Some(path_item) = path_item.as_mapping_mut() else {
            debug!("Path [{}] has no operations", path);
            continue;
        };

        for (verb, operation) in path_item.iter_mut() {
            match verb.as_str() {
                Some(verb) if is_http_verb(verb) => {
                    let extended = rewriter.rewrite(verb, path, operation);
                    *operation = extended;
                }
                _ => debug!("Keeping path-item key {:?} on [{}] as is", verb, path),
            }
        }
    }

    Ok(rewritten)
}

/// Fails if emptying `output_dir` would delete the input document or the
/// current working directory.
fn check_output_dir(output_dir: &Path, spec_path: &Path) -> Result<()> {
    let output_dir = resolve_path(output_dir)?;
    let spec_path = resolve_path(spec_path)?;
    let working_dir = env::current_dir().context("Failed to read current directory")?;
    let working_dir = resolve_path(&working_dir)?;

    for protected in [&spec_path, &working_dir] {
        if protected.starts_with(&output_dir) {
            return Err(GeneratorError::UnsafeOutputDir {
                dir: output_dir.display().to_string(),
                contains: protected.display().to_string(),
            }
            .into());
        }
    }
    Ok(())
}

/// Canonical form of an existing path, absolute form of a missing one.
fn resolve_path(path: &Path) -> Result<PathBuf> {
    let resolved = if path.exists() {
        fs::canonicalize(path)
    } else {
        std::path::absolute(path)
    };
    resolved.with_context(|| format!("Failed to resolve path: {}", path.display()))
}

/// Trims whitespace around each origin and drops empty entries.
fn normalize_origins(origins: &str) -> String {
    origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}
