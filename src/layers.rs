//! Layer Resolver
//!
//! Selects the agent layer version to attach or remove. An explicit ARN
//! is always taken verbatim; auto-detection must land on exactly one
//! candidate or fail with a distinguished condition rather than guess
//! among several.

use crate::error::ApiError;
use crate::runtimes::{self, AGENT_LAYER_PREFIX};
use crate::types::{layer_name_from_arn, LayerReference};

/// Whether a layer version ARN names one of the agent's published layers.
pub fn is_agent_layer(arn: &str) -> bool {
    layer_name_from_arn(arn)
        .map(|name| name.starts_with(AGENT_LAYER_PREFIX))
        .unwrap_or(false)
}

/// Accept an explicit ARN verbatim. The version field is best-effort; an
/// unparseable trailing segment does not reject the caller's choice.
fn explicit_reference(arn: &str) -> LayerReference {
    LayerReference::parse(arn).unwrap_or_else(|| LayerReference {
        arn: arn.to_string(),
        version: 0,
    })
}

fn exactly_one(candidates: Vec<LayerReference>, runtime: &str) -> Result<LayerReference, ApiError> {
    match candidates.len() {
        0 => Err(ApiError::LayerNotFound {
            runtime: runtime.to_string(),
        }),
        1 => Ok(candidates.into_iter().next().unwrap()),
        _ => Err(ApiError::AmbiguousLayer {
            candidates: candidates.into_iter().map(|c| c.arn).collect(),
        }),
    }
}

/// Resolve the layer to attach from the currently published agent layers
/// compatible with `runtime`.
pub fn resolve_for_install(
    runtime: &str,
    explicit: Option<&str>,
    published: &[LayerReference],
) -> Result<LayerReference, ApiError> {
    if let Some(arn) = explicit {
        return Ok(explicit_reference(arn));
    }
    let entry = runtimes::lookup(runtime)
        .ok_or_else(|| ApiError::UnsupportedRuntime(runtime.to_string()))?;
    let candidates: Vec<LayerReference> = published
        .iter()
        .filter(|layer| {
            layer
                .layer_name()
                .map(|name| name.starts_with(entry.layer_prefix))
                .unwrap_or(false)
        })
        .cloned()
        .collect();
    exactly_one(candidates, runtime)
}

/// Resolve the layer to remove from the layers attached to one function.
///
/// An explicit ARN must actually be attached; a silent no-op removal
/// would leave the caller believing the agent was detached.
pub fn resolve_attached(
    runtime: &str,
    explicit: Option<&str>,
    attached: &[String],
) -> Result<LayerReference, ApiError> {
    if let Some(arn) = explicit {
        if attached.iter().any(|a| a == arn) {
            return Ok(explicit_reference(arn));
        }
        return Err(ApiError::LayerNotFound {
            runtime: runtime.to_string(),
        });
    }
    let candidates: Vec<LayerReference> = attached
        .iter()
        .filter(|arn| is_agent_layer(arn))
        .map(|arn| explicit_reference(arn))
        .collect();
    exactly_one(candidates, runtime)
}
