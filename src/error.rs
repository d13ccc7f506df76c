//! Error taxonomy for the Lamina CLI.
//!
//! One error type crosses every component boundary. Ambiguity and
//! not-found conditions are distinct variants so callers can react to
//! them without string matching.

use thiserror::Error;

/// Errors surfaced by Lamina components.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Configuration error (missing token, disabled feature, bad settings)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// No AWS region resolved from the environment
    #[error("You must specify a region. Have you run `aws configure`?")]
    RegionMissing,

    /// No AWS credentials resolved from the environment
    #[error("No AWS credentials configured. Have you run `aws configure`?")]
    CredentialsMissing,

    /// More than one agent layer matched during auto-detection
    #[error("Multiple agent layers found ({}). Pass --layer-arn to specify one.", candidates.join(", "))]
    AmbiguousLayer { candidates: Vec<String> },

    /// No agent layer matched during auto-detection
    #[error("No agent layer found for runtime {runtime}")]
    LayerNotFound { runtime: String },

    /// Runtime has no entry in the runtime registry
    #[error("Unsupported runtime: {0}")]
    UnsupportedRuntime(String),

    /// Uninstall found no saved original handler to restore
    #[error("Function {function} has no saved original handler; refusing to uninstall")]
    NoSavedHandler { function: String },

    /// Template contains no resource for the requested function
    #[error("No function resource matching '{0}' found in template")]
    ResourceNotFound(String),

    /// Template contains more than one resource for the requested function
    #[error("Multiple function resources match '{name}' ({}). Disambiguate the logical name.", matches.join(", "))]
    AmbiguousResource { name: String, matches: Vec<String> },

    /// Template is malformed or cannot be edited
    #[error("Template error: {0}")]
    TemplateError(String),

    /// Cloud provider API failure, message propagated as-is
    #[error("{0}")]
    ProviderError(String),

    /// Layer registry backend failure
    #[error("Layer registry error: {0}")]
    BackendError(String),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::TemplateError(e.to_string())
    }
}
