//! Cloud Provider Seam
//!
//! Narrow interfaces over the provider's function-management and stack
//! APIs, with AWS SDK adapters behind them. Components depend on the
//! traits so tests can substitute in-memory fakes.

pub mod aws;
pub mod contract;

pub use aws::{load_sdk_config, AwsFunctionApi, AwsStackApi};
pub use contract::{FunctionApi, StackApi};
