//! Runtime Registry
//!
//! Static mapping from a Lambda runtime identifier to the wrapped handler
//! string used by the agent's invocation path, and to the layer name
//! prefix the agent publishes for that runtime family. Install state is
//! never stored; it is recomputed from the live handler string against
//! this table.

/// One registered runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeEntry {
    pub runtime_id: &'static str,
    /// Entry point that routes through the agent before the user handler.
    pub wrapped_handler: &'static str,
    /// Published layer name prefix for this runtime family.
    pub layer_prefix: &'static str,
}

/// Name prefix shared by every agent layer, regardless of runtime family.
pub const AGENT_LAYER_PREFIX: &str = "lamina-";

const PYTHON_HANDLER: &str = "lamina_wrapper.handler";
const NODE_HANDLER: &str = "lamina-wrapper.handler";
const JAVA_HANDLER: &str = "dev.lamina.lambda.Wrapper::handleRequest";

static RUNTIMES: &[RuntimeEntry] = &[
    RuntimeEntry {
        runtime_id: "python3.8",
        wrapped_handler: PYTHON_HANDLER,
        layer_prefix: "lamina-python",
    },
    RuntimeEntry {
        runtime_id: "python3.9",
        wrapped_handler: PYTHON_HANDLER,
        layer_prefix: "lamina-python",
    },
    RuntimeEntry {
        runtime_id: "python3.10",
        wrapped_handler: PYTHON_HANDLER,
        layer_prefix: "lamina-python",
    },
    RuntimeEntry {
        runtime_id: "python3.11",
        wrapped_handler: PYTHON_HANDLER,
        layer_prefix: "lamina-python",
    },
    RuntimeEntry {
        runtime_id: "python3.12",
        wrapped_handler: PYTHON_HANDLER,
        layer_prefix: "lamina-python",
    },
    RuntimeEntry {
        runtime_id: "nodejs16.x",
        wrapped_handler: NODE_HANDLER,
        layer_prefix: "lamina-nodejs",
    },
    RuntimeEntry {
        runtime_id: "nodejs18.x",
        wrapped_handler: NODE_HANDLER,
        layer_prefix: "lamina-nodejs",
    },
    RuntimeEntry {
        runtime_id: "nodejs20.x",
        wrapped_handler: NODE_HANDLER,
        layer_prefix: "lamina-nodejs",
    },
    RuntimeEntry {
        runtime_id: "nodejs22.x",
        wrapped_handler: NODE_HANDLER,
        layer_prefix: "lamina-nodejs",
    },
    RuntimeEntry {
        runtime_id: "java11",
        wrapped_handler: JAVA_HANDLER,
        layer_prefix: "lamina-java",
    },
    RuntimeEntry {
        runtime_id: "java17",
        wrapped_handler: JAVA_HANDLER,
        layer_prefix: "lamina-java",
    },
    RuntimeEntry {
        runtime_id: "java21",
        wrapped_handler: JAVA_HANDLER,
        layer_prefix: "lamina-java",
    },
];

/// Look up the registry entry for a runtime identifier.
pub fn lookup(runtime: &str) -> Option<&'static RuntimeEntry> {
    RUNTIMES.iter().find(|e| e.runtime_id == runtime)
}

/// The wrapped handler for a runtime, when the runtime is registered.
pub fn wrapped_handler(runtime: &str) -> Option<&'static str> {
    lookup(runtime).map(|e| e.wrapped_handler)
}

/// Whether a function with this handler/runtime pair has the agent
/// installed.
///
/// Pure over its inputs: a handler equal to the runtime's wrapped handler
/// means installed, anything else (including unregistered runtimes) means
/// not installed. A user-set colliding handler will read as installed;
/// there is no authoritative stored flag to consult instead.
pub fn install_state(handler: &str, runtime: &str) -> bool {
    wrapped_handler(runtime) == Some(handler)
}

/// All registered runtime identifiers.
pub fn registered_runtimes() -> impl Iterator<Item = &'static str> {
    RUNTIMES.iter().map(|e| e.runtime_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_registered_runtime_reports_installed_for_its_wrapped_handler() {
        for entry in RUNTIMES {
            assert!(
                install_state(entry.wrapped_handler, entry.runtime_id),
                "{} should read as installed",
                entry.runtime_id
            );
        }
    }

    #[test]
    fn foreign_handler_is_not_installed() {
        assert!(!install_state("app.handler", "python3.12"));
        assert!(!install_state("index.handler", "nodejs20.x"));
    }

    #[test]
    fn unregistered_runtime_is_never_installed() {
        assert_eq!(wrapped_handler("dotnet8"), None);
        assert!(!install_state("lamina_wrapper.handler", "dotnet8"));
    }

    #[test]
    fn wrapped_handler_differs_across_families() {
        assert_ne!(
            wrapped_handler("python3.12").unwrap(),
            wrapped_handler("nodejs20.x").unwrap()
        );
    }

    #[test]
    fn layer_prefixes_share_the_agent_prefix() {
        for entry in RUNTIMES {
            assert!(entry.layer_prefix.starts_with(AGENT_LAYER_PREFIX));
        }
    }
}
