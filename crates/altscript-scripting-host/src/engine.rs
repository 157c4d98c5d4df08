//! Interface to the script interpreter.
//!
//! The interpreter itself (compiler, bytecode VM, garbage collector) lives
//! outside this crate. These traits are the narrow surface the dispatch and
//! lifecycle core consumes from it.

use altscript_events::Value;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::error::{EngineError, NativeError};
use crate::handle::RefCounted;
use crate::marshal::{ObjectRef, Primitive};

/// Reference-counted handle to a compiled script function
pub trait ScriptFunction: RefCounted {
    fn declaration(&self) -> String;

    /// Allow the interpreter to recover its concrete function type
    fn as_any(&self) -> &dyn Any;
}

/// Reference-counted handle to a script type (e.g. `array<string>`)
pub trait TypeInfo: RefCounted {
    fn declaration(&self) -> String;

    /// Create an instance of this array type holding `items`
    fn create_array(&self, items: Vec<Value>) -> Result<ObjectRef, EngineError>;
}

/// Where a script exception was raised
#[derive(Debug, Clone, Default)]
pub struct ExceptionInfo {
    pub message: String,
    pub function: String,
    pub section: String,
    pub line: u32,
    pub column: u32,
    /// Call stack, innermost first
    pub stack: Vec<String>,
}

impl ExceptionInfo {
    /// Human-readable description, with the call stack when `include_stack` is set
    pub fn report(&self, include_stack: bool) -> String {
        let mut report = format!(
            "{} (in {} at {}:{},{})",
            self.message, self.function, self.section, self.line, self.column
        );
        if include_stack && !self.stack.is_empty() {
            report.push_str("\nStack trace:");
            for frame in &self.stack {
                report.push_str("\n    ");
                report.push_str(frame);
            }
        }
        report
    }
}

/// Outcome of executing a prepared context
#[derive(Debug, Clone)]
pub enum ExecutionState {
    Finished,
    Suspended,
    Aborted,
    Exception(ExceptionInfo),
}

/// Reusable, sequential execution context for one resource
pub trait ScriptContext {
    fn set_user_data(&mut self, data: Rc<dyn Any>);
    fn user_data(&self) -> Option<Rc<dyn Any>>;

    fn prepare(&mut self, function: &dyn ScriptFunction) -> Result<(), EngineError>;
    fn set_arg_address(&mut self, index: usize, value: &Primitive) -> Result<(), EngineError>;
    fn set_arg_object(&mut self, index: usize, value: &ObjectRef) -> Result<(), EngineError>;
    fn execute(&mut self) -> Result<ExecutionState, EngineError>;

    /// Return value of the last finished execution, for `bool`/`uint8` returns
    fn return_byte(&self) -> u8;
}

/// A compiled module
pub trait ScriptModule {
    fn name(&self) -> &str;

    fn function_by_decl(&self, decl: &str) -> Option<Rc<dyn ScriptFunction>>;
    fn type_info_by_decl(&self, decl: &str) -> Option<Rc<dyn TypeInfo>>;

    /// Entry point chosen from script metadata, if the interpreter supports it
    fn metadata_entrypoint(&self) -> Option<Rc<dyn ScriptFunction>> {
        None
    }

    fn discard(self: Box<Self>);
}

/// Resolves `#include` directives: (included path, including section) -> source
pub type IncludeResolver = Box<dyn FnMut(&str, &str) -> Result<String, EngineError>>;

pub trait ModuleBuilder {
    fn set_include_resolver(&mut self, resolver: IncludeResolver);
    fn start_new_module(&mut self, name: &str) -> Result<(), EngineError>;
    fn add_section(&mut self, name: &str, source: &str) -> Result<(), EngineError>;
    fn build(self: Box<Self>) -> Result<Box<dyn ScriptModule>, EngineError>;
}

/// Registration half of the engine: declarations scripts compile against
pub trait Registrar {
    fn register_funcdef(&mut self, decl: &str) -> Result<(), EngineError>;
    fn register_global_function(&mut self, decl: &str, native: NativeFn)
        -> Result<(), EngineError>;
}

pub trait ScriptEngine: Registrar {
    fn module_builder(&self) -> Box<dyn ModuleBuilder + '_>;
    fn create_context(&self) -> Box<dyn ScriptContext>;
}

/// Argument passed from a script to a host function
#[derive(Clone)]
pub enum NativeArg {
    /// The callee owns one reference to the handle
    Function(Rc<dyn ScriptFunction>),
    Primitive(Primitive),
    Object(ObjectRef),
}

impl fmt::Debug for NativeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeArg::Function(function) => {
                f.debug_tuple("Function").field(&function.declaration()).finish()
            }
            NativeArg::Primitive(value) => f.debug_tuple("Primitive").field(value).finish(),
            NativeArg::Object(value) => f.debug_tuple("Object").field(value).finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum NativeReturn {
    Void,
    Primitive(Primitive),
    Object(ObjectRef),
}

/// A call from a script into a host function
pub struct NativeCall {
    user_data: Option<Rc<dyn Any>>,
    args: Vec<NativeArg>,
}

impl NativeCall {
    /// `user_data` is the user data of the context the script runs in
    pub fn new(user_data: Option<Rc<dyn Any>>, args: Vec<NativeArg>) -> Self {
        Self { user_data, args }
    }

    pub fn user_data<T: Any>(&self) -> Option<Rc<T>> {
        self.user_data.clone()?.downcast::<T>().ok()
    }

    pub fn function(&self, index: usize) -> Result<Rc<dyn ScriptFunction>, NativeError> {
        match self.args.get(index) {
            Some(NativeArg::Function(function)) => Ok(Rc::clone(function)),
            _ => Err(NativeError::BadArgument {
                index,
                expected: "function handle",
            }),
        }
    }

    pub fn string(&self, index: usize) -> Result<&str, NativeError> {
        match self.args.get(index) {
            Some(NativeArg::Object(ObjectRef::String(value))) => Ok(value),
            _ => Err(NativeError::BadArgument {
                index,
                expected: "string",
            }),
        }
    }

    pub fn uint(&self, index: usize) -> Result<u32, NativeError> {
        match self.args.get(index) {
            Some(NativeArg::Primitive(Primitive::UInt32(value))) => Ok(*value),
            _ => Err(NativeError::BadArgument {
                index,
                expected: "uint",
            }),
        }
    }
}

pub type NativeFn = Rc<dyn Fn(&mut NativeCall) -> Result<NativeReturn, NativeError>>;
