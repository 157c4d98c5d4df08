use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

use altscript_events::{EventType, Value};
use tracing::debug;

use crate::arrays::ArrayTypes;
use crate::custom_events::{CustomEventHandlers, Locality};
use crate::engine::{ScriptFunction, ScriptModule};
use crate::handle::Pinned;
use crate::marshal::{ArrayKind, ObjectRef};
use crate::timer::{Clock, TimerId, TimerManager, TimerPoll};

/// Everything scripts of one resource have registered with the host
///
/// Shared between the resource and its context (as user data) so host
/// functions called from a script can register handlers while an event is
/// being dispatched. Borrows are kept short and never held across a script
/// call.
pub struct ResourceBindings {
    resource_name: String,
    event_handlers: RefCell<Vec<(EventType, Pinned<dyn ScriptFunction>)>>,
    custom: RefCell<CustomEventHandlers>,
    timers: RefCell<TimerManager>,
    arrays: RefCell<ArrayTypes>,
    clock: Rc<dyn Clock>,
}

impl ResourceBindings {
    pub fn new(resource_name: impl Into<String>, clock: Rc<dyn Clock>) -> Self {
        Self {
            resource_name: resource_name.into(),
            event_handlers: RefCell::new(Vec::new()),
            custom: RefCell::new(CustomEventHandlers::new()),
            timers: RefCell::new(TimerManager::new()),
            arrays: RefCell::new(ArrayTypes::default()),
            clock,
        }
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn register_event_handler(
        &self,
        event_type: EventType,
        callback: Pinned<dyn ScriptFunction>,
    ) {
        debug!(
            target: "scripting",
            "Resource {} subscribed to {} with {}",
            self.resource_name,
            event_type,
            callback.declaration()
        );
        self.event_handlers.borrow_mut().push((event_type, callback));
    }

    /// Handlers bound to `event_type`, in registration order
    pub fn event_handlers(&self, event_type: EventType) -> Vec<Rc<dyn ScriptFunction>> {
        self.event_handlers
            .borrow()
            .iter()
            .filter(|(ty, _)| *ty == event_type)
            .map(|(_, callback)| Rc::clone(callback.handle()))
            .collect()
    }

    pub fn handler_count(&self) -> usize {
        self.event_handlers.borrow().len()
    }

    pub fn register_custom_handler(
        &self,
        name: &str,
        callback: Pinned<dyn ScriptFunction>,
        locality: Locality,
    ) {
        debug!(
            target: "scripting",
            "Resource {} subscribed to {:?} event {}",
            self.resource_name,
            locality,
            name
        );
        self.custom.borrow_mut().register(name, callback, locality);
    }

    pub fn custom_handlers(&self, name: &str, locality: Locality) -> Vec<Rc<dyn ScriptFunction>> {
        self.custom.borrow().handlers(name, locality)
    }

    pub fn custom_handler_count(&self) -> usize {
        self.custom.borrow().len()
    }

    pub fn create_timer(
        &self,
        timeout_ms: u32,
        callback: Pinned<dyn ScriptFunction>,
        once: bool,
    ) -> TimerId {
        let now = self.clock.now();
        self.timers.borrow_mut().create_timer(
            Duration::from_millis(u64::from(timeout_ms)),
            callback,
            once,
            now,
        )
    }

    pub fn remove_timer(&self, id: TimerId) {
        self.timers.borrow_mut().remove_timer(id);
    }

    pub fn timer_count(&self) -> usize {
        self.timers.borrow().active_count()
    }

    /// Drop timers queued for removal
    pub fn flush_invalid_timers(&self) {
        let released = self.timers.borrow_mut().flush_invalid();
        drop(released);
    }

    pub fn timer_ids(&self) -> Vec<TimerId> {
        self.timers.borrow().timer_ids()
    }

    pub fn poll_timer(&self, id: TimerId) -> TimerPoll {
        let now = self.clock.now();
        self.timers.borrow_mut().poll(id, now)
    }

    pub fn pin_array_types(&self, module: &dyn ScriptModule) {
        let resolved = ArrayTypes::resolve(module);
        *self.arrays.borrow_mut() = resolved;
    }

    pub fn arrays(&self) -> Ref<'_, ArrayTypes> {
        self.arrays.borrow()
    }

    pub fn create_array(&self, kind: ArrayKind, items: Vec<Value>) -> ObjectRef {
        self.arrays.borrow().create(kind, items)
    }

    /// Give back every handle held for scripts
    ///
    /// Callbacks go first, the array type descriptors last.
    pub fn release_all(&self) {
        let handlers = std::mem::take(&mut *self.event_handlers.borrow_mut());
        drop(handlers);

        let custom = std::mem::take(&mut *self.custom.borrow_mut());
        drop(custom);

        let timers = self.timers.borrow_mut().clear();
        drop(timers);

        let arrays = std::mem::take(&mut *self.arrays.borrow_mut());
        drop(arrays);
    }
}
