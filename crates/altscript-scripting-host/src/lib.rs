//! Event dispatch and resource lifecycle for embedded scripts
//!
//! This crate bridges host events to a script interpreter: it exposes the
//! event categories scripts can subscribe to, marshals event payloads into
//! call arguments, runs script timers and drives each resource from compile
//! to stop. The interpreter itself is consumed through the traits in
//! [`engine`].

pub mod arrays;
pub mod bindings;
pub mod builtin_events;
pub mod config;
pub mod custom_events;
pub mod docs;
pub mod engine;
pub mod error;
pub mod handle;
pub mod host;
pub mod host_imports;
pub mod logging;
pub mod marshal;
pub mod registry;
pub mod resource;
pub mod runtime;
pub mod timer;

#[cfg(test)]
mod test_support;

pub use altscript_events::{Entity, EntityKind, EventType, HostEvent, Value, Vector3};
pub use bindings::ResourceBindings;
pub use config::{ConfigLoadError, ScriptingConfig};
pub use custom_events::Locality;
pub use docs::{generate_docs, DeclarationRecorder, DocsGenerator};
pub use error::{EngineError, NativeError, RegistryError, ResourceError};
pub use handle::{Pinned, RefCounted};
pub use host::{DirPackage, Package, PackageFile, ResourceInfo};
pub use registry::{registry, EventDescriptor, EventRegistry};
pub use resource::{ResourceImpl, ResourceState, ScriptResource};
pub use runtime::ScriptRuntime;
pub use timer::{Clock, ManualClock, MonotonicClock, TimerId, TimerManager};
