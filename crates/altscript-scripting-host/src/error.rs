use altscript_events::EventType;
use thiserror::Error;

use crate::resource::ResourceState;

/// Failure reported by the interpreter
#[derive(Debug, Clone, Error)]
#[error("{operation} failed: {message}")]
pub struct EngineError {
    pub operation: &'static str,
    pub message: String,
}

impl EngineError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("event type {0} is already registered")]
    Duplicate(EventType),
}

/// Errors raised by host functions called from scripts
#[derive(Debug, Clone, Error)]
pub enum NativeError {
    #[error("no resource is bound to the active context")]
    NoActiveResource,
    #[error("argument {index} is missing or not a {expected}")]
    BadArgument {
        index: usize,
        expected: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to read {path}: {reason}")]
    ReadSource { path: String, reason: String },

    #[error("{stage} failed for resource {resource}: {source}")]
    Compilation {
        resource: String,
        stage: &'static str,
        #[source]
        source: EngineError,
    },

    #[error("the main entrypoint was not found in resource {resource}")]
    EntrypointNotFound { resource: String },

    #[error("failed to run the entrypoint of resource {resource}: {source}")]
    Prepare {
        resource: String,
        #[source]
        source: EngineError,
    },

    #[error("resource {resource} cannot be started from state {state:?}")]
    InvalidState {
        resource: String,
        state: ResourceState,
    },
}
