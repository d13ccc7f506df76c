//! Template Rewriter
//!
//! Edits a CloudFormation JSON document (a local file or a deployed
//! stack's template) so one function resource references the agent layer
//! and routes through the wrapped handler, stashing the original handler
//! in the resource's environment block. Everything outside the matched
//! resource is left untouched; key order survives the round trip.
//!
//! The layer ARN comes from the vendor's layer registry (bearer token),
//! never from the cloud provider.

use crate::backend::LayerRegistry;
use crate::error::ApiError;
use crate::layers;
use crate::provider::StackApi;
use crate::runtimes;
use crate::types::{LayerReference, ORIGINAL_HANDLER_VAR};
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Resource types recognized as deployable functions.
const FUNCTION_TYPES: &[&str] = &["AWS::Lambda::Function", "AWS::Serverless::Function"];

/// Output destination sentinel for standard output.
pub const STDOUT_SENTINEL: &str = "-";

/// Locate the single function resource matching `function` by logical id
/// or by its `Properties.FunctionName`. Zero or multiple matches fail;
/// the first match is never silently picked.
pub fn locate_function(template: &Value, function: &str) -> Result<String, ApiError> {
    let resources = template
        .get("Resources")
        .and_then(Value::as_object)
        .ok_or_else(|| ApiError::TemplateError("Template has no Resources object".to_string()))?;

    let matches: Vec<String> = resources
        .iter()
        .filter(|(logical_id, resource)| {
            let is_function = resource
                .get("Type")
                .and_then(Value::as_str)
                .map(|t| FUNCTION_TYPES.contains(&t))
                .unwrap_or(false);
            if !is_function {
                return false;
            }
            if logical_id.as_str() == function {
                return true;
            }
            resource
                .pointer("/Properties/FunctionName")
                .and_then(Value::as_str)
                .map(|n| n == function)
                .unwrap_or(false)
        })
        .map(|(logical_id, _)| logical_id.clone())
        .collect();

    match matches.len() {
        0 => Err(ApiError::ResourceNotFound(function.to_string())),
        1 => Ok(matches.into_iter().next().unwrap()),
        _ => Err(ApiError::AmbiguousResource {
            name: function.to_string(),
            matches,
        }),
    }
}

/// The runtime declared on a resource's properties.
pub fn resource_runtime(template: &Value, logical_id: &str) -> Result<String, ApiError> {
    template
        .pointer(&format!("/Resources/{}/Properties/Runtime", logical_id))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            ApiError::TemplateError(format!("Resource {} declares no Runtime", logical_id))
        })
}

/// Rewrite one located resource in place: handler, layer list, and the
/// original-handler stash.
pub fn rewrite_resource(
    template: &mut Value,
    logical_id: &str,
    layer: &LayerReference,
) -> Result<(), ApiError> {
    let runtime = resource_runtime(template, logical_id)?;
    let wrapped = runtimes::wrapped_handler(&runtime)
        .ok_or_else(|| ApiError::UnsupportedRuntime(runtime.clone()))?;

    let properties = template
        .pointer_mut(&format!("/Resources/{}/Properties", logical_id))
        .and_then(Value::as_object_mut)
        .ok_or_else(|| {
            ApiError::TemplateError(format!("Resource {} has no Properties object", logical_id))
        })?;

    let original = properties
        .get("Handler")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            ApiError::TemplateError(format!("Resource {} declares no Handler", logical_id))
        })?;

    // An already-wrapped handler keeps its existing stash; overwriting it
    // would lose the only way back to the user's entry point.
    if original != wrapped {
        let variables = properties
            .entry("Environment")
            .or_insert_with(|| json!({}))
            .as_object_mut()
            .ok_or_else(|| {
                ApiError::TemplateError(format!(
                    "Resource {} has a non-object Environment",
                    logical_id
                ))
            })?
            .entry("Variables")
            .or_insert_with(|| json!({}))
            .as_object_mut()
            .ok_or_else(|| {
                ApiError::TemplateError(format!(
                    "Resource {} has a non-object Environment.Variables",
                    logical_id
                ))
            })?;
        variables.insert(ORIGINAL_HANDLER_VAR.to_string(), Value::String(original));
        properties.insert("Handler".to_string(), Value::String(wrapped.to_string()));
    }

    let layer_list = properties
        .entry("Layers")
        .or_insert_with(|| json!([]))
        .as_array_mut()
        .ok_or_else(|| {
            ApiError::TemplateError(format!("Resource {} has a non-array Layers", logical_id))
        })?;
    layer_list.retain(|entry| {
        entry
            .as_str()
            .map(|arn| !layers::is_agent_layer(arn))
            .unwrap_or(true)
    });
    layer_list.push(Value::String(layer.arn.clone()));

    Ok(())
}

/// Rewrites templates against the vendor layer registry.
pub struct TemplateRewriter<'a> {
    registry: &'a dyn LayerRegistry,
    region: String,
}

impl<'a> TemplateRewriter<'a> {
    pub fn new(registry: &'a dyn LayerRegistry, region: &str) -> Self {
        Self {
            registry,
            region: region.to_string(),
        }
    }

    /// Rewrite a raw template document and return the rendered result.
    pub async fn rewrite_document(&self, raw: &str, function: &str) -> Result<String, ApiError> {
        let mut template: Value = serde_json::from_str(raw)?;
        let logical_id = locate_function(&template, function)?;
        let runtime = resource_runtime(&template, &logical_id)?;
        let published = self.registry.published_layers(&self.region, &runtime).await?;
        let layer = layers::resolve_for_install(&runtime, None, &published)?;
        rewrite_resource(&mut template, &logical_id, &layer)?;
        let mut rendered = serde_json::to_string_pretty(&template)?;
        rendered.push('\n');
        info!(function, layer = %layer.arn, "template rewritten");
        Ok(rendered)
    }

    /// Rewrite a local template file, emitting to a path or stdout.
    ///
    /// The destination is only written after the whole rewrite succeeds.
    pub async fn rewrite_file(
        &self,
        input: &Path,
        function: &str,
        output: &str,
    ) -> Result<String, ApiError> {
        let raw = std::fs::read_to_string(input)?;
        let rendered = self.rewrite_document(&raw, function).await?;
        emit(output, &rendered)?;
        if output == STDOUT_SENTINEL {
            Ok(String::new())
        } else {
            Ok(format!("Wrote modified template to {}", output))
        }
    }

    /// Rewrite a deployed stack's template in place.
    pub async fn rewrite_stack(
        &self,
        stack_api: &dyn StackApi,
        stack_id: &str,
        function: &str,
    ) -> Result<String, ApiError> {
        let body = stack_api.get_template(stack_id).await?;
        let rendered = self.rewrite_document(&body, function).await?;
        stack_api.update_stack(stack_id, rendered).await?;
        Ok(format!("Submitted template update for stack {}", stack_id))
    }
}

/// Write rendered output to a file path or stdout (`-`).
fn emit(destination: &str, contents: &str) -> Result<(), ApiError> {
    if destination == STDOUT_SENTINEL {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(contents.as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }
    std::fs::write(destination, contents)?;
    Ok(())
}
