//! Install/Uninstall Reconciler
//!
//! Rewrites one function's configuration to attach the agent layer and
//! route invocations through the wrapped handler, or to undo exactly
//! that. The original handler survives in an environment entry so
//! uninstall can restore it; without that entry, uninstall refuses to
//! touch the function.
//!
//! Planning is pure; each command reads the live descriptor, plans, and
//! pushes at most one configuration update. There is no rollback: an
//! interrupt between read and push leaves the function untouched, an
//! interrupt after the push has already completed the whole change.

use crate::error::ApiError;
use crate::layers;
use crate::provider::FunctionApi;
use crate::runtimes;
use crate::types::{
    FunctionDescriptor, FunctionUpdate, LayerReference, AGENT_TOKEN_VAR, ORIGINAL_HANDLER_VAR,
};
use tracing::info;

/// Result of an install run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The handler already routes through the agent; nothing was pushed.
    AlreadyInstalled,
    /// The layer was attached and the handler rewritten.
    Installed { layer: LayerReference },
}

/// Result of an uninstall run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallOutcome {
    pub removed: LayerReference,
    pub restored_handler: String,
}

/// Plan the install update for a function, given the resolved layer.
///
/// Returns `None` when the function's handler already equals the wrapped
/// handler for its runtime; in that case nothing may be pushed, so a
/// repeated install can never duplicate the layer reference or clobber
/// the saved original handler.
pub fn plan_install(
    descriptor: &FunctionDescriptor,
    layer: &LayerReference,
    token: &str,
) -> Result<Option<FunctionUpdate>, ApiError> {
    let wrapped = runtimes::wrapped_handler(&descriptor.runtime)
        .ok_or_else(|| ApiError::UnsupportedRuntime(descriptor.runtime.clone()))?;
    if descriptor.handler == wrapped {
        return Ok(None);
    }

    // Keep unrelated layers, drop any prior agent layer version, and
    // append the resolved one.
    let mut new_layers: Vec<String> = descriptor
        .layers
        .iter()
        .filter(|arn| !layers::is_agent_layer(arn))
        .cloned()
        .collect();
    new_layers.push(layer.arn.clone());

    let mut environment = descriptor.environment.clone();
    environment.insert(ORIGINAL_HANDLER_VAR.to_string(), descriptor.handler.clone());
    environment.insert(AGENT_TOKEN_VAR.to_string(), token.to_string());

    Ok(Some(FunctionUpdate {
        handler: Some(wrapped.to_string()),
        layers: Some(new_layers),
        environment: Some(environment),
    }))
}

/// Plan the uninstall update for a function.
///
/// Fails before any mutation when the layer cannot be resolved among the
/// attached layers or when no saved original handler exists.
pub fn plan_uninstall(
    descriptor: &FunctionDescriptor,
    explicit_layer: Option<&str>,
) -> Result<(FunctionUpdate, UninstallOutcome), ApiError> {
    let layer = layers::resolve_attached(&descriptor.runtime, explicit_layer, &descriptor.layers)?;

    let mut environment = descriptor.environment.clone();
    let original = environment
        .remove(ORIGINAL_HANDLER_VAR)
        .ok_or_else(|| ApiError::NoSavedHandler {
            function: descriptor.name.clone(),
        })?;
    environment.remove(AGENT_TOKEN_VAR);

    let new_layers: Vec<String> = descriptor
        .layers
        .iter()
        .filter(|arn| **arn != layer.arn)
        .cloned()
        .collect();

    let update = FunctionUpdate {
        handler: Some(original.clone()),
        layers: Some(new_layers),
        environment: Some(environment),
    };
    Ok((
        update,
        UninstallOutcome {
            removed: layer,
            restored_handler: original,
        },
    ))
}

/// Drives install/uninstall against the provider.
pub struct Reconciler<'a> {
    api: &'a dyn FunctionApi,
}

impl<'a> Reconciler<'a> {
    pub fn new(api: &'a dyn FunctionApi) -> Self {
        Self { api }
    }

    /// Attach the agent layer to a live function.
    pub async fn install(
        &self,
        function: &str,
        explicit_layer: Option<&str>,
        token: &str,
    ) -> Result<InstallOutcome, ApiError> {
        let descriptor = self.api.get_function(function).await?;
        if runtimes::install_state(&descriptor.handler, &descriptor.runtime) {
            info!(function, "agent already installed");
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        // Auto-detection needs the published layer listing; skip the
        // round trip when the caller chose a layer explicitly.
        let published = if explicit_layer.is_none() {
            self.api.list_layers(&descriptor.runtime).await?
        } else {
            Vec::new()
        };
        let layer = layers::resolve_for_install(&descriptor.runtime, explicit_layer, &published)?;

        match plan_install(&descriptor, &layer, token)? {
            Some(update) => {
                self.api.update_function(function, update).await?;
                info!(function, layer = %layer.arn, "agent installed");
                Ok(InstallOutcome::Installed { layer })
            }
            None => Ok(InstallOutcome::AlreadyInstalled),
        }
    }

    /// Detach the agent layer and restore the saved handler.
    pub async fn uninstall(
        &self,
        function: &str,
        explicit_layer: Option<&str>,
    ) -> Result<UninstallOutcome, ApiError> {
        let descriptor = self.api.get_function(function).await?;
        let (update, outcome) = plan_uninstall(&descriptor, explicit_layer)?;
        self.api.update_function(function, update).await?;
        info!(
            function,
            layer = %outcome.removed.arn,
            handler = %outcome.restored_handler,
            "agent uninstalled"
        );
        Ok(outcome)
    }
}
