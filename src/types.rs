//! Core types shared across the inventory, reconcile, and template paths.

use std::collections::BTreeMap;

/// Environment variable that preserves a function's pre-install handler.
pub const ORIGINAL_HANDLER_VAR: &str = "LAMINA_ORIGINAL_HANDLER";

/// Environment variable the agent layer reads its token from at runtime.
pub const AGENT_TOKEN_VAR: &str = "LAMINA_TOKEN";

/// A function's live configuration as read from the provider.
///
/// Never cached beyond a single command invocation; the provider copy is
/// authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub name: String,
    pub runtime: String,
    pub handler: String,
    /// Attached layer version ARNs, in provider order.
    pub layers: Vec<String>,
    pub environment: BTreeMap<String, String>,
}

/// One page of a paginated function listing.
#[derive(Debug, Clone, Default)]
pub struct FunctionPage {
    pub functions: Vec<FunctionDescriptor>,
    /// Opaque continuation marker; `None` means the listing is exhausted.
    pub next_marker: Option<String>,
}

/// One published version of the agent layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerReference {
    pub arn: String,
    pub version: i64,
}

impl LayerReference {
    /// Parse a layer version ARN of the form
    /// `arn:aws:lambda:REGION:ACCOUNT:layer:NAME:VERSION`.
    pub fn parse(arn: &str) -> Option<Self> {
        let version = arn.rsplit(':').next()?.parse().ok()?;
        Some(Self {
            arn: arn.to_string(),
            version,
        })
    }

    /// The layer name segment of the ARN, when present.
    pub fn layer_name(&self) -> Option<&str> {
        layer_name_from_arn(&self.arn)
    }
}

/// Extract the layer name from a layer version ARN.
pub fn layer_name_from_arn(arn: &str) -> Option<&str> {
    // arn:aws:lambda:region:account:layer:NAME:version
    let name = arn.split(':').nth(6)?;
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// The delta pushed back to the provider after reconciliation.
///
/// `None` fields are left untouched on the provider side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionUpdate {
    pub handler: Option<String>,
    pub layers: Option<Vec<String>>,
    pub environment: Option<BTreeMap<String, String>>,
}

impl FunctionUpdate {
    pub fn is_empty(&self) -> bool {
        self.handler.is_none() && self.layers.is_none() && self.environment.is_none()
    }
}
