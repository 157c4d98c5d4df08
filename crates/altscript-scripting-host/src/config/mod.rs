pub mod paths;
pub mod scripting_config;

pub use paths::ProjectPaths;
pub use scripting_config::{ConfigLoadError, ScriptingConfig};
