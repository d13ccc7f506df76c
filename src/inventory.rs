//! Function Inventory Reader
//!
//! Pages through the account's function inventory using the provider's
//! opaque continuation marker, annotating each record with its install
//! state and filtering afterwards. Annotation and filtering are separate
//! pure steps over immutable rows; provider records are never mutated.
//! Rows are streamed to the caller's sink, so the full inventory is
//! never held in memory.

use crate::error::ApiError;
use crate::provider::FunctionApi;
use crate::runtimes;
use crate::types::FunctionDescriptor;
use serde::Serialize;
use tracing::debug;

/// Row filter for the inventory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InventoryFilter {
    #[default]
    All,
    Installed,
    NotInstalled,
}

impl InventoryFilter {
    /// Parse the `--filter` value; unset means all.
    pub fn parse(value: Option<&str>) -> Result<Self, ApiError> {
        match value {
            None | Some("all") => Ok(Self::All),
            Some("installed") => Ok(Self::Installed),
            Some("not-installed") => Ok(Self::NotInstalled),
            Some(other) => Err(ApiError::ConfigError(format!(
                "Invalid filter: {} (must be all, installed, or not-installed)",
                other
            ))),
        }
    }

    /// Whether an annotated row passes this filter.
    pub fn admits(self, row: &FunctionRow) -> bool {
        match self {
            Self::All => true,
            Self::Installed => row.installed,
            Self::NotInstalled => !row.installed,
        }
    }
}

/// One display row of the inventory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionRow {
    pub function_name: String,
    pub runtime: String,
    pub installed: bool,
}

/// Annotate a provider record with its derived install state.
pub fn annotate(descriptor: &FunctionDescriptor) -> FunctionRow {
    FunctionRow {
        function_name: descriptor.name.clone(),
        runtime: descriptor.runtime.clone(),
        installed: runtimes::install_state(&descriptor.handler, &descriptor.runtime),
    }
}

/// Streams annotated, filtered inventory rows from the provider.
pub struct InventoryReader<'a> {
    api: &'a dyn FunctionApi,
    page_size: i32,
}

impl<'a> InventoryReader<'a> {
    pub fn new(api: &'a dyn FunctionApi, page_size: i32) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
        }
    }

    /// Walk every page, emitting rows that pass the filter. Returns the
    /// number of rows emitted.
    pub async fn scan<F>(&self, filter: InventoryFilter, mut emit: F) -> Result<usize, ApiError>
    where
        F: FnMut(FunctionRow) -> Result<(), ApiError>,
    {
        let mut marker: Option<String> = None;
        let mut emitted = 0usize;
        let mut pages = 0usize;
        loop {
            let page = self
                .api
                .list_functions(marker.take(), self.page_size)
                .await?;
            pages += 1;
            for descriptor in &page.functions {
                let row = annotate(descriptor);
                if filter.admits(&row) {
                    emit(row)?;
                    emitted += 1;
                }
            }
            marker = page.next_marker;
            if marker.is_none() {
                break;
            }
        }
        debug!(pages, emitted, "inventory scan complete");
        Ok(emitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn descriptor(name: &str, runtime: &str, handler: &str) -> FunctionDescriptor {
        FunctionDescriptor {
            name: name.to_string(),
            runtime: runtime.to_string(),
            handler: handler.to_string(),
            layers: Vec::new(),
            environment: BTreeMap::new(),
        }
    }

    #[test]
    fn annotate_marks_wrapped_handler_installed() {
        let row = annotate(&descriptor("a", "python3.12", "lamina_wrapper.handler"));
        assert!(row.installed);
        let row = annotate(&descriptor("b", "python3.12", "app.handler"));
        assert!(!row.installed);
    }

    #[test]
    fn annotate_does_not_trust_handler_across_runtimes() {
        // A nodejs wrapped handler on a python runtime is not installed.
        let row = annotate(&descriptor("c", "python3.12", "lamina-wrapper.handler"));
        assert!(!row.installed);
    }

    #[test]
    fn filter_parse_accepts_known_values() {
        assert_eq!(InventoryFilter::parse(None).unwrap(), InventoryFilter::All);
        assert_eq!(
            InventoryFilter::parse(Some("all")).unwrap(),
            InventoryFilter::All
        );
        assert_eq!(
            InventoryFilter::parse(Some("installed")).unwrap(),
            InventoryFilter::Installed
        );
        assert_eq!(
            InventoryFilter::parse(Some("not-installed")).unwrap(),
            InventoryFilter::NotInstalled
        );
        assert!(InventoryFilter::parse(Some("enabled")).is_err());
    }

    #[test]
    fn filters_partition_rows() {
        let installed = annotate(&descriptor("a", "python3.12", "lamina_wrapper.handler"));
        let bare = annotate(&descriptor("b", "python3.12", "app.handler"));
        assert!(InventoryFilter::All.admits(&installed));
        assert!(InventoryFilter::All.admits(&bare));
        assert!(InventoryFilter::Installed.admits(&installed));
        assert!(!InventoryFilter::Installed.admits(&bare));
        assert!(!InventoryFilter::NotInstalled.admits(&installed));
        assert!(InventoryFilter::NotInstalled.admits(&bare));
    }
}
