//! Lamina: Serverless Observability Layer Installer
//!
//! Attaches the Lamina agent layer to AWS Lambda functions, routes their
//! invocations through the agent's wrapped handler, and rewrites
//! CloudFormation templates to do the same declaratively. Install state
//! is always derived from the live handler string; nothing is persisted
//! between invocations.

pub mod backend;
pub mod config;
pub mod error;
pub mod format;
pub mod inventory;
pub mod layers;
pub mod logging;
pub mod provider;
pub mod reconcile;
pub mod runtimes;
pub mod template;
pub mod tooling;
pub mod types;
