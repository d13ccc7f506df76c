//! AWS SDK adapters for the provider contracts.
//!
//! Region and credential resolution happen once, at adapter
//! construction, so the distinguished `RegionMissing` /
//! `CredentialsMissing` conditions surface before any operation runs.
//! Service errors are propagated with the SDK's own message, no retries.

use crate::error::ApiError;
use crate::provider::contract::{FunctionApi, StackApi};
use crate::types::{FunctionDescriptor, FunctionPage, FunctionUpdate, LayerReference};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_lambda::config::ProvideCredentials;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::types::{Environment, FunctionConfiguration, Runtime};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Load the ambient SDK configuration, verifying region and credentials.
pub async fn load_sdk_config() -> Result<SdkConfig, ApiError> {
    let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
    if config.region().is_none() {
        return Err(ApiError::RegionMissing);
    }
    match config.credentials_provider() {
        Some(provider) => {
            provider
                .provide_credentials()
                .await
                .map_err(|_| ApiError::CredentialsMissing)?;
        }
        None => return Err(ApiError::CredentialsMissing),
    }
    Ok(config)
}

fn provider_error<E: std::error::Error>(err: E) -> ApiError {
    ApiError::ProviderError(format!("{}", DisplayErrorContext(&err)))
}

/// Function-management adapter over `aws-sdk-lambda`.
pub struct AwsFunctionApi {
    client: aws_sdk_lambda::Client,
}

impl AwsFunctionApi {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_lambda::Client::new(config),
        }
    }
}

fn descriptor_from_configuration(conf: &FunctionConfiguration) -> FunctionDescriptor {
    FunctionDescriptor {
        name: conf.function_name().unwrap_or_default().to_string(),
        runtime: conf
            .runtime()
            .map(|r| r.as_str().to_string())
            .unwrap_or_default(),
        handler: conf.handler().unwrap_or_default().to_string(),
        layers: conf
            .layers()
            .iter()
            .filter_map(|l| l.arn().map(str::to_string))
            .collect(),
        environment: conf
            .environment()
            .and_then(|e| e.variables())
            .map(|vars| {
                vars.iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<BTreeMap<_, _>>()
            })
            .unwrap_or_default(),
    }
}

#[async_trait]
impl FunctionApi for AwsFunctionApi {
    async fn get_function(&self, name: &str) -> Result<FunctionDescriptor, ApiError> {
        let out = self
            .client
            .get_function_configuration()
            .function_name(name)
            .send()
            .await
            .map_err(provider_error)?;
        Ok(FunctionDescriptor {
            name: out.function_name().unwrap_or(name).to_string(),
            runtime: out
                .runtime()
                .map(|r| r.as_str().to_string())
                .unwrap_or_default(),
            handler: out.handler().unwrap_or_default().to_string(),
            layers: out
                .layers()
                .iter()
                .filter_map(|l| l.arn().map(str::to_string))
                .collect(),
            environment: out
                .environment()
                .and_then(|e| e.variables())
                .map(|vars| {
                    vars.iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect::<BTreeMap<_, _>>()
                })
                .unwrap_or_default(),
        })
    }

    async fn list_functions(
        &self,
        marker: Option<String>,
        max_items: i32,
    ) -> Result<FunctionPage, ApiError> {
        let out = self
            .client
            .list_functions()
            .set_marker(marker)
            .max_items(max_items)
            .send()
            .await
            .map_err(provider_error)?;
        Ok(FunctionPage {
            functions: out
                .functions()
                .iter()
                .map(descriptor_from_configuration)
                .collect(),
            next_marker: out.next_marker().map(str::to_string),
        })
    }

    async fn update_function(&self, name: &str, update: FunctionUpdate) -> Result<(), ApiError> {
        debug!(function = name, "pushing function configuration update");
        let mut req = self
            .client
            .update_function_configuration()
            .function_name(name);
        if let Some(handler) = update.handler {
            req = req.handler(handler);
        }
        if let Some(layers) = update.layers {
            req = req.set_layers(Some(layers));
        }
        if let Some(environment) = update.environment {
            let vars: HashMap<String, String> = environment.into_iter().collect();
            req = req.environment(Environment::builder().set_variables(Some(vars)).build());
        }
        req.send().await.map_err(provider_error)?;
        Ok(())
    }

    async fn list_layers(&self, compatible_runtime: &str) -> Result<Vec<LayerReference>, ApiError> {
        let runtime = Runtime::from(compatible_runtime);
        let mut layers = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let out = self
                .client
                .list_layers()
                .compatible_runtime(runtime.clone())
                .set_marker(marker)
                .send()
                .await
                .map_err(provider_error)?;
            for item in out.layers() {
                if let Some(version) = item.latest_matching_version() {
                    if let Some(arn) = version.layer_version_arn() {
                        layers.push(LayerReference {
                            arn: arn.to_string(),
                            version: version.version(),
                        });
                    }
                }
            }
            marker = out.next_marker().map(str::to_string);
            if marker.is_none() {
                break;
            }
        }
        Ok(layers)
    }
}

/// Template-service adapter over `aws-sdk-cloudformation`.
pub struct AwsStackApi {
    client: aws_sdk_cloudformation::Client,
}

impl AwsStackApi {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_cloudformation::Client::new(config),
        }
    }
}

#[async_trait]
impl StackApi for AwsStackApi {
    async fn get_template(&self, stack_id: &str) -> Result<String, ApiError> {
        let out = self
            .client
            .get_template()
            .stack_name(stack_id)
            .send()
            .await
            .map_err(provider_error)?;
        out.template_body()
            .map(str::to_string)
            .ok_or_else(|| ApiError::ProviderError(format!("Stack {} has no template body", stack_id)))
    }

    async fn update_stack(&self, stack_id: &str, template_body: String) -> Result<(), ApiError> {
        debug!(stack = stack_id, "pushing stack template update");
        self.client
            .update_stack()
            .stack_name(stack_id)
            .template_body(template_body)
            .send()
            .await
            .map_err(provider_error)?;
        Ok(())
    }
}
