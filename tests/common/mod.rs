//! Shared in-memory fakes for the provider and registry seams.

#![allow(dead_code)]

use async_trait::async_trait;
use lamina::backend::LayerRegistry;
use lamina::error::ApiError;
use lamina::provider::{FunctionApi, StackApi};
use lamina::types::{FunctionDescriptor, FunctionPage, FunctionUpdate, LayerReference};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// In-memory stand-in for the provider's function-management API.
pub struct FakeFunctionApi {
    functions: Mutex<Vec<FunctionDescriptor>>,
    published: Vec<LayerReference>,
    update_count: Mutex<usize>,
}

impl FakeFunctionApi {
    pub fn new(functions: Vec<FunctionDescriptor>) -> Self {
        Self {
            functions: Mutex::new(functions),
            published: Vec::new(),
            update_count: Mutex::new(0),
        }
    }

    pub fn with_published(mut self, published: Vec<LayerReference>) -> Self {
        self.published = published;
        self
    }

    /// Current stored state of one function.
    pub fn descriptor(&self, name: &str) -> FunctionDescriptor {
        self.functions
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.name == name)
            .cloned()
            .expect("function should exist")
    }

    /// How many configuration updates were pushed.
    pub fn updates_pushed(&self) -> usize {
        *self.update_count.lock().unwrap()
    }
}

#[async_trait]
impl FunctionApi for FakeFunctionApi {
    async fn get_function(&self, name: &str) -> Result<FunctionDescriptor, ApiError> {
        self.functions
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.name == name)
            .cloned()
            .ok_or_else(|| ApiError::ProviderError(format!("Function not found: {}", name)))
    }

    async fn list_functions(
        &self,
        marker: Option<String>,
        max_items: i32,
    ) -> Result<FunctionPage, ApiError> {
        let functions = self.functions.lock().unwrap();
        let start: usize = marker
            .map(|m| {
                m.parse()
                    .map_err(|_| ApiError::ProviderError(format!("Invalid marker: {}", m)))
            })
            .transpose()?
            .unwrap_or(0);
        let end = (start + max_items.max(1) as usize).min(functions.len());
        let next_marker = if end < functions.len() {
            Some(end.to_string())
        } else {
            None
        };
        Ok(FunctionPage {
            functions: functions[start..end].to_vec(),
            next_marker,
        })
    }

    async fn update_function(&self, name: &str, update: FunctionUpdate) -> Result<(), ApiError> {
        let mut functions = self.functions.lock().unwrap();
        let descriptor = functions
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| ApiError::ProviderError(format!("Function not found: {}", name)))?;
        apply_update(descriptor, update);
        *self.update_count.lock().unwrap() += 1;
        Ok(())
    }

    async fn list_layers(&self, _compatible_runtime: &str) -> Result<Vec<LayerReference>, ApiError> {
        Ok(self.published.clone())
    }
}

/// Apply a configuration delta the way the provider would.
pub fn apply_update(descriptor: &mut FunctionDescriptor, update: FunctionUpdate) {
    if let Some(handler) = update.handler {
        descriptor.handler = handler;
    }
    if let Some(layers) = update.layers {
        descriptor.layers = layers;
    }
    if let Some(environment) = update.environment {
        descriptor.environment = environment;
    }
}

/// In-memory stand-in for the vendor layer registry.
pub struct FakeLayerRegistry {
    pub layers: Vec<LayerReference>,
}

#[async_trait]
impl LayerRegistry for FakeLayerRegistry {
    async fn published_layers(
        &self,
        _region: &str,
        _runtime: &str,
    ) -> Result<Vec<LayerReference>, ApiError> {
        Ok(self.layers.clone())
    }
}

/// In-memory stand-in for the deployed-stack template service.
pub struct FakeStackApi {
    pub template: String,
    pub pushed: Mutex<Option<String>>,
}

impl FakeStackApi {
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
            pushed: Mutex::new(None),
        }
    }

    pub fn pushed_template(&self) -> Option<String> {
        self.pushed.lock().unwrap().clone()
    }
}

#[async_trait]
impl StackApi for FakeStackApi {
    async fn get_template(&self, _stack_id: &str) -> Result<String, ApiError> {
        Ok(self.template.clone())
    }

    async fn update_stack(&self, _stack_id: &str, template_body: String) -> Result<(), ApiError> {
        *self.pushed.lock().unwrap() = Some(template_body);
        Ok(())
    }
}

/// A plain application function on a registered runtime.
pub fn function(name: &str, runtime: &str, handler: &str) -> FunctionDescriptor {
    FunctionDescriptor {
        name: name.to_string(),
        runtime: runtime.to_string(),
        handler: handler.to_string(),
        layers: Vec::new(),
        environment: BTreeMap::new(),
    }
}

pub fn layer(name: &str, version: i64) -> LayerReference {
    LayerReference {
        arn: format!("arn:aws:lambda:us-east-1:123456789012:layer:{name}:{version}"),
        version,
    }
}
