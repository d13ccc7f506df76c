//! Provider API contracts.
//!
//! Each trait is the minimal surface one component needs: the inventory
//! reader pages functions, the reconciler reads and writes one function
//! and enumerates published layers, the stack rewriter fetches and
//! replaces a deployed template. Every call is one blocking round trip
//! from the caller's point of view.

use crate::error::ApiError;
use crate::types::{FunctionDescriptor, FunctionPage, FunctionUpdate, LayerReference};
use async_trait::async_trait;

/// Function-management API of the cloud provider.
#[async_trait]
pub trait FunctionApi: Send + Sync {
    /// Read one function's live configuration.
    async fn get_function(&self, name: &str) -> Result<FunctionDescriptor, ApiError>;

    /// Fetch one page of the account's function inventory.
    async fn list_functions(
        &self,
        marker: Option<String>,
        max_items: i32,
    ) -> Result<FunctionPage, ApiError>;

    /// Push a configuration delta for one function.
    async fn update_function(&self, name: &str, update: FunctionUpdate) -> Result<(), ApiError>;

    /// Enumerate the latest published layer versions compatible with a
    /// runtime, across all listing pages.
    async fn list_layers(&self, compatible_runtime: &str) -> Result<Vec<LayerReference>, ApiError>;
}

/// Template service for deployed stacks.
#[async_trait]
pub trait StackApi: Send + Sync {
    /// Fetch the current template body of a deployed stack.
    async fn get_template(&self, stack_id: &str) -> Result<String, ApiError>;

    /// Replace a deployed stack's template.
    async fn update_stack(&self, stack_id: &str, template_body: String) -> Result<(), ApiError>;
}
