use std::collections::HashMap;
use std::rc::Rc;

use crate::engine::ScriptFunction;
use crate::handle::Pinned;

/// Callback signature for events emitted on this side
pub const LOCAL_EVENT_CALLBACK: &str = "void LocalEventCallback(array<any>@ args)";
/// Callback signature for events sent by a remote player
pub const REMOTE_EVENT_CALLBACK: &str =
    "void RemoteEventCallback(IPlayer@ player, array<any>@ args)";

/// Where a custom event originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locality {
    Local,
    Remote,
}

/// Script handlers for user-defined events, keyed by event name
///
/// Handlers registered under the same name keep their insertion order, which
/// is the order they are invoked in.
#[derive(Debug, Default)]
pub struct CustomEventHandlers {
    local: HashMap<String, Vec<Pinned<dyn ScriptFunction>>>,
    remote: HashMap<String, Vec<Pinned<dyn ScriptFunction>>>,
}

impl CustomEventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, locality: Locality) -> &HashMap<String, Vec<Pinned<dyn ScriptFunction>>> {
        match locality {
            Locality::Local => &self.local,
            Locality::Remote => &self.remote,
        }
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        callback: Pinned<dyn ScriptFunction>,
        locality: Locality,
    ) {
        let map = match locality {
            Locality::Local => &mut self.local,
            Locality::Remote => &mut self.remote,
        };
        map.entry(name.into()).or_default().push(callback);
    }

    /// Handlers for `name`, in registration order
    pub fn handlers(&self, name: &str, locality: Locality) -> Vec<Rc<dyn ScriptFunction>> {
        self.map(locality)
            .get(name)
            .map(|handlers| handlers.iter().map(|h| Rc::clone(h.handle())).collect())
            .unwrap_or_default()
    }

    /// Total number of registered handlers
    pub fn len(&self) -> usize {
        self.local.values().chain(self.remote.values()).map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release every handler
    pub fn clear(&mut self) {
        self.local.clear();
        self.remote.clear();
    }
}
