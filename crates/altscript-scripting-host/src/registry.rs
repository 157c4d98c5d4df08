//! Registry of host event categories scripts can subscribe to.
//!
//! Each category is described once by an [`EventDescriptor`]: the callback
//! signature scripts implement, how a payload becomes call arguments, and how
//! the subscription function is exposed to the interpreter.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::OnceLock;

use altscript_events::{EventType, HostEvent};
use tracing::debug;

use crate::arrays::ArrayTypes;
use crate::bindings::ResourceBindings;
use crate::docs::DocsGenerator;
use crate::engine::{NativeCall, NativeFn, NativeReturn, Registrar};
use crate::error::{EngineError, NativeError, RegistryError};
use crate::handle::Pinned;
use crate::marshal::{param_list, Arg, ParamDecl, ReturnType};

/// Turns an event payload into call arguments, one per declared parameter
pub type MarshalFn = fn(&HostEvent, &ArrayTypes) -> Vec<Arg>;

/// Exposes a descriptor's callback type and subscription function
pub type RegisterFn =
    fn(&EventDescriptor, &mut dyn Registrar, &mut DocsGenerator) -> Result<(), EngineError>;

#[derive(Clone)]
pub struct EventDescriptor {
    pub event_type: EventType,
    pub params: Vec<ParamDecl>,
    pub return_type: Option<ReturnType>,
    marshal: MarshalFn,
    register: RegisterFn,
}

impl EventDescriptor {
    pub fn new(event_type: EventType, params: &[ParamDecl], marshal: MarshalFn) -> Self {
        Self {
            event_type,
            params: params.to_vec(),
            return_type: None,
            marshal,
            register: register_subscription,
        }
    }

    pub fn returning(mut self, return_type: ReturnType) -> Self {
        self.return_type = Some(return_type);
        self
    }

    pub fn with_register(mut self, register: RegisterFn) -> Self {
        self.register = register;
        self
    }

    /// e.g. `PlayerConnectCallback`
    pub fn callback_name(&self) -> String {
        format!("{}Callback", self.event_type.name())
    }

    /// e.g. `void PlayerConnectCallback(IPlayer@ player)`
    pub fn funcdef_decl(&self) -> String {
        let ret = self.return_type.map_or("void", |ty| ty.declaration());
        format!(
            "{} {}({})",
            ret,
            self.callback_name(),
            param_list(&self.params)
        )
    }

    /// e.g. `void onPlayerConnect(PlayerConnectCallback@ callback)`
    pub fn subscribe_decl(&self) -> String {
        format!(
            "void on{}({}@ callback)",
            self.event_type.name(),
            self.callback_name()
        )
    }

    /// Marshal `event` into call arguments
    ///
    /// # Panics
    ///
    /// If the marshaled arguments do not match the declared parameters.
    pub fn marshal(&self, event: &HostEvent, arrays: &ArrayTypes) -> Vec<Arg> {
        let args = (self.marshal)(event, arrays);
        assert_eq!(
            args.len(),
            self.params.len(),
            "{} marshaled {} arguments for {} parameters",
            self.event_type,
            args.len(),
            self.params.len()
        );
        for (arg, param) in args.iter().zip(&self.params) {
            assert!(
                arg.fits(&param.ty),
                "{} marshaled {:?} for parameter `{}`",
                self.event_type,
                arg,
                param
            );
        }
        args
    }

    pub fn register(
        &self,
        registrar: &mut dyn Registrar,
        docs: &mut DocsGenerator,
    ) -> Result<(), EngineError> {
        (self.register)(self, registrar, docs)
    }
}

impl std::fmt::Debug for EventDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDescriptor")
            .field("event_type", &self.event_type)
            .field("params", &self.params)
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}

/// Default registration: a callback funcdef plus an `on<Name>` function that
/// binds the callback to the calling resource
pub fn register_subscription(
    descriptor: &EventDescriptor,
    registrar: &mut dyn Registrar,
    docs: &mut DocsGenerator,
) -> Result<(), EngineError> {
    let funcdef = descriptor.funcdef_decl();
    registrar.register_funcdef(&funcdef)?;
    docs.push_funcdef(funcdef);

    let event_type = descriptor.event_type;
    let subscribe: NativeFn = Rc::new(move |call: &mut NativeCall| {
        let callback = Pinned::adopt(call.function(0)?);
        let bindings = call
            .user_data::<ResourceBindings>()
            .ok_or(NativeError::NoActiveResource)?;
        bindings.register_event_handler(event_type, callback);
        Ok(NativeReturn::Void)
    });

    let decl = descriptor.subscribe_decl();
    registrar.register_global_function(&decl, subscribe)?;
    docs.push_event_declaration(decl);
    Ok(())
}

/// Lookup table of every event category scripts can subscribe to
#[derive(Debug, Default)]
pub struct EventRegistry {
    descriptors: HashMap<EventType, EventDescriptor>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: EventDescriptor) -> Result<(), RegistryError> {
        let event_type = descriptor.event_type;
        if self.descriptors.contains_key(&event_type) {
            return Err(RegistryError::Duplicate(event_type));
        }
        self.descriptors.insert(event_type, descriptor);
        Ok(())
    }

    pub fn lookup(&self, event_type: EventType) -> Option<&EventDescriptor> {
        self.descriptors.get(&event_type)
    }

    /// All descriptors, ordered by category
    pub fn descriptors(&self) -> Vec<&EventDescriptor> {
        let mut descriptors: Vec<_> = self.descriptors.values().collect();
        descriptors.sort_by_key(|d| d.event_type.to_discriminant());
        descriptors
    }

    /// Expose every category to the interpreter and record it in `docs`
    pub fn expose_all(
        &self,
        registrar: &mut dyn Registrar,
        docs: &mut DocsGenerator,
    ) -> Result<(), EngineError> {
        for descriptor in self.descriptors() {
            debug!(target: "scripting", "Exposing event {}", descriptor.event_type);
            descriptor.register(registrar, docs)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

static REGISTRY: OnceLock<EventRegistry> = OnceLock::new();

/// The process-wide registry of builtin event categories
pub fn registry() -> &'static EventRegistry {
    REGISTRY.get_or_init(crate::builtin_events::build_registry)
}
