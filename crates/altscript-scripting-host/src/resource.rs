use std::any::Any;
use std::rc::Rc;

use altscript_events::{Entity, HostEvent, Value};
use tracing::{debug, error, info, warn};

use crate::bindings::ResourceBindings;
use crate::custom_events::Locality;
use crate::engine::{
    ExceptionInfo, ExecutionState, ScriptContext, ScriptEngine, ScriptFunction, ScriptModule,
};
use crate::error::{EngineError, ResourceError};
use crate::host::{read_file_to_string, resolve_include, Package, ResourceInfo};
use crate::marshal::{Arg, ArrayKind, ObjectRef};
use crate::registry::{registry, EventRegistry};
use crate::timer::{Clock, MonotonicClock, TimerPoll};

pub const START_FUNCTION_DECL: &str = "void Start()";
pub const STOP_FUNCTION_DECL: &str = "void Stop()";

/// Lifecycle of a script resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    Uninitialized,
    Compiling,
    Running,
    /// Terminal; also reached when `start` fails
    Stopped,
}

/// What the host drives a resource through
pub trait ResourceImpl {
    fn start(&mut self) -> bool;
    fn stop(&mut self) -> bool;
    /// Returns false if a script cancelled the event
    fn on_event(&mut self, event: &HostEvent) -> bool;
    fn on_tick(&mut self);
}

/// Prepare `function` on `context`, bind `args` and run it
fn call(
    context: &mut dyn ScriptContext,
    function: &dyn ScriptFunction,
    args: &[Arg],
) -> Result<ExecutionState, EngineError> {
    context.prepare(function)?;
    for (index, arg) in args.iter().enumerate() {
        match arg {
            Arg::Primitive(value) => context.set_arg_address(index, value)?,
            Arg::Object(object) => context.set_arg_object(index, object)?,
        }
    }
    context.execute()
}

fn report_exception(resource: &str, debug: bool, during: &str, info: &ExceptionInfo) {
    let report = info.report(debug);
    error!(
        target: "scripting",
        "Script exception in resource {} during {}: {}",
        resource,
        during,
        report
    );
}

/// One host resource backed by a compiled script module
///
/// The module and its execution context are created together by `start` and
/// torn down together by `stop`. Everything scripts register lives in the
/// shared [`ResourceBindings`], which is also the context's user data.
pub struct ScriptResource {
    info: ResourceInfo,
    package: Rc<dyn Package>,
    engine: Rc<dyn ScriptEngine>,
    registry: &'static EventRegistry,
    debug: bool,
    state: ResourceState,
    module: Option<Box<dyn ScriptModule>>,
    context: Option<Box<dyn ScriptContext>>,
    bindings: Rc<ResourceBindings>,
}

impl ScriptResource {
    pub fn new(info: ResourceInfo, package: Rc<dyn Package>, engine: Rc<dyn ScriptEngine>) -> Self {
        let bindings = Rc::new(ResourceBindings::new(
            info.name.clone(),
            Rc::new(MonotonicClock),
        ));
        Self {
            info,
            package,
            engine,
            registry: registry(),
            debug: false,
            state: ResourceState::Uninitialized,
            module: None,
            context: None,
            bindings,
        }
    }

    pub fn with_registry(mut self, registry: &'static EventRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the time source; only meaningful before `start`
    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.bindings = Rc::new(ResourceBindings::new(self.info.name.clone(), clock));
        self
    }

    /// Include call stacks in exception reports
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn info(&self) -> &ResourceInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ResourceState::Running
    }

    pub fn bindings(&self) -> &Rc<ResourceBindings> {
        &self.bindings
    }

    pub fn has_module(&self) -> bool {
        self.module.is_some()
    }

    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    /// Compile and run the resource, reporting why it failed to start
    pub fn try_start(&mut self) -> Result<(), ResourceError> {
        if self.state != ResourceState::Uninitialized {
            return Err(ResourceError::InvalidState {
                resource: self.info.name.clone(),
                state: self.state,
            });
        }

        info!(target: "scripting", "Starting resource {}", self.info.name);
        self.state = ResourceState::Compiling;

        match self.start_module() {
            Ok(()) => {
                self.state = ResourceState::Running;
                info!(target: "scripting", "Started resource {}", self.info.name);
                Ok(())
            }
            Err(e) => {
                self.teardown();
                self.state = ResourceState::Stopped;
                Err(e)
            }
        }
    }

    fn start_module(&mut self) -> Result<(), ResourceError> {
        let source = read_file_to_string(self.package.as_ref(), &self.info.main)?;
        let module = self.compile(&source)?;

        let mut context = self.engine.create_context();
        let user_data: Rc<dyn Any> = self.bindings.clone();
        context.set_user_data(user_data);

        let entrypoint = module
            .metadata_entrypoint()
            .or_else(|| module.function_by_decl(START_FUNCTION_DECL));
        self.module = Some(module);
        self.context = Some(context);

        let Some(entrypoint) = entrypoint else {
            error!(
                target: "scripting",
                "The main entrypoint was not found in resource {}",
                self.info.name
            );
            return Err(ResourceError::EntrypointNotFound {
                resource: self.info.name.clone(),
            });
        };

        if let Some(context) = self.context.as_deref_mut() {
            let state = call(context, entrypoint.as_ref(), &[]).map_err(|source| {
                ResourceError::Prepare {
                    resource: self.info.name.clone(),
                    source,
                }
            })?;
            match state {
                ExecutionState::Finished => {}
                ExecutionState::Exception(exception) => {
                    report_exception(&self.info.name, self.debug, "start", &exception)
                }
                other => warn!(
                    target: "scripting",
                    "Entrypoint of resource {} did not finish: {:?}",
                    self.info.name,
                    other
                ),
            }
        }

        if let Some(module) = self.module.as_deref() {
            self.bindings.pin_array_types(module);
        }
        Ok(())
    }

    fn compile(&self, source: &str) -> Result<Box<dyn ScriptModule>, ResourceError> {
        let compilation = |stage: &'static str| {
            move |source: EngineError| ResourceError::Compilation {
                resource: self.info.name.clone(),
                stage,
                source,
            }
        };

        let mut builder = self.engine.module_builder();
        let package = Rc::clone(&self.package);
        builder.set_include_resolver(Box::new(move |include: &str, from: &str| {
            resolve_include(package.as_ref(), include, from)
        }));

        builder
            .start_new_module(&self.info.name)
            .map_err(compilation("Builder start"))?;
        builder
            .add_section(&self.info.main, source)
            .map_err(compilation("Adding section"))?;
        let module = builder.build().map_err(compilation("Compilation"))?;

        debug!(target: "scripting", "Compiled resource {}", self.info.name);
        Ok(module)
    }

    /// Discard the module, release the context and every script handle
    fn teardown(&mut self) {
        if let Some(module) = self.module.take() {
            module.discard();
        }
        drop(self.context.take());
        self.bindings.release_all();
    }

    /// Run every handler subscribed to the custom event `name`
    ///
    /// Handlers get the event arguments as an `array<any>`; remote handlers
    /// also get the sending player.
    pub fn dispatch_custom_event(
        &mut self,
        name: &str,
        locality: Locality,
        player: Option<Entity>,
        args: &[Value],
    ) {
        if !self.is_running() {
            return;
        }
        let handlers = self.bindings.custom_handlers(name, locality);
        if handlers.is_empty() {
            debug!(target: "scripting", "No handlers for {:?} event {}", locality, name);
            return;
        }

        let array: Arg = self
            .bindings
            .create_array(ArrayKind::Any, args.to_vec())
            .into();
        let call_args = match locality {
            Locality::Local => vec![array],
            Locality::Remote => vec![ObjectRef::entity_or_null(player).into(), array],
        };

        let Some(context) = self.context.as_deref_mut() else {
            return;
        };
        for handler in handlers {
            match call(context, handler.as_ref(), &call_args) {
                Ok(ExecutionState::Exception(exception)) => {
                    report_exception(&self.info.name, self.debug, name, &exception)
                }
                Ok(_) => {}
                Err(e) => error!(
                    target: "scripting",
                    "Failed to call handler {} for event {} in resource {}: {}",
                    handler.declaration(),
                    name,
                    self.info.name,
                    e
                ),
            }
        }
    }
}

impl ResourceImpl for ScriptResource {
    fn start(&mut self) -> bool {
        match self.try_start() {
            Ok(()) => true,
            Err(e) => {
                error!(target: "scripting", "Failed to start resource {}: {}", self.info.name, e);
                false
            }
        }
    }

    fn stop(&mut self) -> bool {
        if let (Some(module), Some(context)) =
            (self.module.as_deref(), self.context.as_deref_mut())
        {
            info!(target: "scripting", "Stopping resource {}", self.info.name);
            if let Some(stop) = module.function_by_decl(STOP_FUNCTION_DECL) {
                match call(context, stop.as_ref(), &[]) {
                    Ok(ExecutionState::Exception(exception)) => {
                        report_exception(&self.info.name, self.debug, "stop", &exception)
                    }
                    Ok(_) => {}
                    Err(e) => error!(
                        target: "scripting",
                        "Failed to call Stop in resource {}: {}",
                        self.info.name,
                        e
                    ),
                }
            }
        }

        self.teardown();
        self.state = ResourceState::Stopped;
        true
    }

    fn on_event(&mut self, event: &HostEvent) -> bool {
        if !self.is_running() {
            return true;
        }

        match event {
            HostEvent::LocalScriptEvent { name, args } => {
                self.dispatch_custom_event(name, Locality::Local, None, args);
                return true;
            }
            HostEvent::RemoteScriptEvent { name, player, args } => {
                self.dispatch_custom_event(name, Locality::Remote, Some(*player), args);
                return true;
            }
            _ => {}
        }

        let event_type = event.event_type();
        let Some(descriptor) = self.registry.lookup(event_type) else {
            debug!(target: "scripting", "Unhandled event {}", event_type);
            return true;
        };

        let handlers = self.bindings.event_handlers(event_type);
        if handlers.is_empty() {
            return true;
        }
        let args = descriptor.marshal(event, &self.bindings.arrays());

        let Some(context) = self.context.as_deref_mut() else {
            return true;
        };
        for handler in handlers {
            let state = match call(context, handler.as_ref(), &args) {
                Ok(state) => state,
                Err(e) => {
                    error!(
                        target: "scripting",
                        "Failed to call handler {} for {} in resource {}: {}",
                        handler.declaration(),
                        event_type,
                        self.info.name,
                        e
                    );
                    return true;
                }
            };

            match state {
                ExecutionState::Finished => {
                    if descriptor.return_type.is_some() {
                        return context.return_byte() == 1;
                    }
                }
                ExecutionState::Exception(exception) => {
                    report_exception(&self.info.name, self.debug, event_type.name(), &exception)
                }
                other => warn!(
                    target: "scripting",
                    "Handler {} for {} did not finish: {:?}",
                    handler.declaration(),
                    event_type,
                    other
                ),
            }
        }
        true
    }

    fn on_tick(&mut self) {
        if !self.is_running() {
            return;
        }
        self.bindings.flush_invalid_timers();

        for id in self.bindings.timer_ids() {
            let TimerPoll::Fire {
                callback,
                exhausted,
            } = self.bindings.poll_timer(id)
            else {
                continue;
            };

            if let Some(context) = self.context.as_deref_mut() {
                match call(context, callback.as_ref(), &[]) {
                    Ok(ExecutionState::Exception(exception)) => {
                        report_exception(&self.info.name, self.debug, "timer", &exception)
                    }
                    Ok(_) => {}
                    Err(e) => error!(
                        target: "scripting",
                        "Failed to run timer {} in resource {}: {}",
                        id.0,
                        self.info.name,
                        e
                    ),
                }
            }

            if exhausted {
                self.bindings.remove_timer(id);
            }
        }
    }
}

impl Drop for ScriptResource {
    fn drop(&mut self) {
        if self.module.is_some() || self.context.is_some() {
            self.stop();
        }
    }
}
