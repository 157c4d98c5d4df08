//! Host functions every script can call: timers, custom event subscriptions,
//! array construction and logging.

use std::rc::Rc;

use altscript_events::Value;
use tracing::info;

use crate::bindings::ResourceBindings;
use crate::custom_events::{Locality, LOCAL_EVENT_CALLBACK, REMOTE_EVENT_CALLBACK};
use crate::docs::DocsGenerator;
use crate::engine::{NativeCall, NativeFn, NativeReturn, Registrar};
use crate::error::{EngineError, NativeError};
use crate::handle::Pinned;
use crate::marshal::{ArrayKind, Primitive};
use crate::timer::TimerId;

const TIMER_CALLBACK: &str = "void TimerCallback()";

fn bindings(call: &NativeCall) -> Result<Rc<ResourceBindings>, NativeError> {
    call.user_data::<ResourceBindings>()
        .ok_or(NativeError::NoActiveResource)
}

fn register_funcdef(
    registrar: &mut dyn Registrar,
    docs: &mut DocsGenerator,
    decl: &str,
) -> Result<(), EngineError> {
    registrar.register_funcdef(decl)?;
    docs.push_funcdef(decl);
    Ok(())
}

fn register_function(
    registrar: &mut dyn Registrar,
    docs: &mut DocsGenerator,
    decl: &str,
    native: NativeFn,
) -> Result<(), EngineError> {
    registrar.register_global_function(decl, native)?;
    docs.push_declaration(decl);
    Ok(())
}

fn timer_native(timeout_arg: Option<usize>, once: bool) -> NativeFn {
    Rc::new(move |call: &mut NativeCall| {
        let callback = Pinned::adopt(call.function(0)?);
        let timeout = match timeout_arg {
            Some(index) => call.uint(index)?,
            None => 0,
        };
        let id = bindings(call)?.create_timer(timeout, callback, once);
        Ok(NativeReturn::Primitive(Primitive::UInt32(id.0)))
    })
}

fn clear_timer_native() -> NativeFn {
    Rc::new(|call: &mut NativeCall| {
        let id = TimerId(call.uint(0)?);
        bindings(call)?.remove_timer(id);
        Ok(NativeReturn::Void)
    })
}

fn subscribe_native(locality: Locality) -> NativeFn {
    Rc::new(move |call: &mut NativeCall| {
        let callback = Pinned::adopt(call.function(1)?);
        let name = call.string(0)?.to_string();
        bindings(call)?.register_custom_handler(&name, callback, locality);
        Ok(NativeReturn::Void)
    })
}

fn create_array_native(kind: ArrayKind) -> NativeFn {
    Rc::new(move |call: &mut NativeCall| {
        let length = call.uint(0)? as usize;
        let fill = match kind {
            ArrayKind::String => Value::String(String::new()),
            ArrayKind::Int => Value::Int(0),
            ArrayKind::UInt => Value::UInt(0),
            ArrayKind::Any => Value::None,
        };
        let array = bindings(call)?.create_array(kind, vec![fill; length]);
        Ok(NativeReturn::Object(array))
    })
}

fn log_native() -> NativeFn {
    Rc::new(|call: &mut NativeCall| {
        let message = call.string(0)?;
        match bindings(call) {
            Ok(bindings) => info!(target: "script", "[{}] {}", bindings.resource_name(), message),
            Err(_) => info!(target: "script", "{}", message),
        }
        Ok(NativeReturn::Void)
    })
}

/// Register the host functions with the interpreter and record them in `docs`
pub fn add_host_imports(
    registrar: &mut dyn Registrar,
    docs: &mut DocsGenerator,
) -> Result<(), EngineError> {
    register_funcdef(registrar, docs, TIMER_CALLBACK)?;
    register_function(
        registrar,
        docs,
        "uint setTimeout(TimerCallback@ callback, uint timeout)",
        timer_native(Some(1), true),
    )?;
    register_function(
        registrar,
        docs,
        "uint setInterval(TimerCallback@ callback, uint timeout)",
        timer_native(Some(1), false),
    )?;
    register_function(
        registrar,
        docs,
        "uint nextTick(TimerCallback@ callback)",
        timer_native(None, true),
    )?;
    for decl in [
        "void clearTimer(uint id)",
        "void clearTimeout(uint id)",
        "void clearInterval(uint id)",
    ] {
        register_function(registrar, docs, decl, clear_timer_native())?;
    }

    register_funcdef(registrar, docs, LOCAL_EVENT_CALLBACK)?;
    register_funcdef(registrar, docs, REMOTE_EVENT_CALLBACK)?;
    register_function(
        registrar,
        docs,
        "void on(const string &in name, LocalEventCallback@ callback)",
        subscribe_native(Locality::Local),
    )?;
    register_function(
        registrar,
        docs,
        "void onClient(const string &in name, RemoteEventCallback@ callback)",
        subscribe_native(Locality::Remote),
    )?;

    for (decl, kind) in [
        ("array<string>@ createStringArray(uint length)", ArrayKind::String),
        ("array<int>@ createIntArray(uint length)", ArrayKind::Int),
        ("array<uint>@ createUIntArray(uint length)", ArrayKind::UInt),
        ("array<any>@ createAnyArray(uint length)", ArrayKind::Any),
    ] {
        register_function(registrar, docs, decl, create_array_native(kind))?;
    }

    register_function(
        registrar,
        docs,
        "void log(const string &in message)",
        log_native(),
    )?;
    Ok(())
}
