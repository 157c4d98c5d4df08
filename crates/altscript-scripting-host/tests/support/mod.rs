//! In-memory interpreter for driving resources in tests.
//!
//! Script sources are tiny directive files: `program <key>` pulls in the
//! functions defined under `key`, `#include "<path>"` goes through the
//! include resolver, `entry <name>` selects an entry point via metadata,
//! `no arrays` hides the array types and `syntax error` fails the build.
//! Function bodies are Rust closures.

#![allow(dead_code)]

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use altscript_scripting_host::engine::{
    ExceptionInfo, ExecutionState, IncludeResolver, ModuleBuilder, NativeArg, NativeCall,
    NativeFn, NativeReturn, Registrar, ScriptContext, ScriptEngine, ScriptFunction, ScriptModule,
    TypeInfo,
};
use altscript_scripting_host::host::include_path;
use altscript_scripting_host::marshal::{ArrayKind, ObjectRef, Primitive, ScriptObject};
use altscript_scripting_host::{
    Clock, DirPackage, EngineError, Entity, ManualClock, NativeError, RefCounted, ResourceInfo,
    ScriptResource, ScriptRuntime, ScriptingConfig, Value,
};
use tempfile::TempDir;

pub type Body = Rc<dyn Fn(&mut Invocation) -> Outcome>;

pub fn body(f: impl Fn(&mut Invocation) -> Outcome + 'static) -> Body {
    Rc::new(f)
}

/// How a fake function finishes
pub enum Outcome {
    Finished,
    Returned(bool),
    Exception(&'static str),
    Suspended,
}

fn function_name(decl: &str) -> &str {
    let head = decl.split('(').next().unwrap_or(decl);
    head.rsplit(' ').next().unwrap_or(head)
}

pub struct FakeFunction {
    decl: String,
    program: String,
    body: Body,
    refs: Cell<i32>,
}

impl FakeFunction {
    pub fn name(&self) -> &str {
        function_name(&self.decl)
    }

    pub fn refs(&self) -> i32 {
        self.refs.get()
    }
}

impl RefCounted for FakeFunction {
    fn add_ref(&self) {
        self.refs.set(self.refs.get() + 1);
    }

    fn release(&self) {
        self.refs.set(self.refs.get() - 1);
        assert!(self.refs.get() >= 0, "{} released too often", self.decl);
    }
}

impl ScriptFunction for FakeFunction {
    fn declaration(&self) -> String {
        self.decl.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Array instance created by a [`FakeTypeInfo`]
#[derive(Debug)]
pub struct FakeArray {
    pub decl: String,
    pub items: Vec<Value>,
}

pub struct FakeTypeInfo {
    decl: String,
    refs: Cell<i32>,
}

impl FakeTypeInfo {
    pub fn refs(&self) -> i32 {
        self.refs.get()
    }
}

impl RefCounted for FakeTypeInfo {
    fn add_ref(&self) {
        self.refs.set(self.refs.get() + 1);
    }

    fn release(&self) {
        self.refs.set(self.refs.get() - 1);
        assert!(self.refs.get() >= 0, "{} released too often", self.decl);
    }
}

impl TypeInfo for FakeTypeInfo {
    fn declaration(&self) -> String {
        self.decl.clone()
    }

    fn create_array(&self, items: Vec<Value>) -> Result<ObjectRef, EngineError> {
        Ok(ObjectRef::Script(ScriptObject::new(FakeArray {
            decl: self.decl.clone(),
            items,
        })))
    }
}

/// Everything the fake interpreter knows, shared with the test
pub struct EngineState {
    pub natives: RefCell<HashMap<String, NativeFn>>,
    pub funcdefs: RefCell<Vec<String>>,
    pub declarations: RefCell<Vec<String>>,
    programs: RefCell<HashMap<String, Vec<Rc<FakeFunction>>>>,
    array_types: Vec<Rc<FakeTypeInfo>>,
    pub contexts_created: Cell<usize>,
    pub contexts_released: Cell<usize>,
    pub modules_discarded: Cell<usize>,
    pub sections: RefCell<Vec<String>>,
    pub fail_prepare: Cell<bool>,
    trace: RefCell<Vec<String>>,
}

impl EngineState {
    fn new() -> Self {
        let array_types = ArrayKind::ALL
            .iter()
            .map(|kind| {
                Rc::new(FakeTypeInfo {
                    decl: kind.declaration().to_string(),
                    refs: Cell::new(0),
                })
            })
            .collect();

        Self {
            natives: RefCell::new(HashMap::new()),
            funcdefs: RefCell::new(Vec::new()),
            declarations: RefCell::new(Vec::new()),
            programs: RefCell::new(HashMap::new()),
            array_types,
            contexts_created: Cell::new(0),
            contexts_released: Cell::new(0),
            modules_discarded: Cell::new(0),
            sections: RefCell::new(Vec::new()),
            fail_prepare: Cell::new(false),
            trace: RefCell::new(Vec::new()),
        }
    }

    /// Define the functions a `program <key>` line brings into a module
    pub fn define(&self, key: &str, functions: Vec<(&str, Body)>) {
        let functions = functions
            .into_iter()
            .map(|(decl, body)| {
                Rc::new(FakeFunction {
                    decl: decl.to_string(),
                    program: key.to_string(),
                    body,
                    refs: Cell::new(0),
                })
            })
            .collect();
        self.programs.borrow_mut().insert(key.to_string(), functions);
    }

    pub fn function(&self, program: &str, name: &str) -> Option<Rc<FakeFunction>> {
        self.programs
            .borrow()
            .get(program)?
            .iter()
            .find(|f| f.name() == name)
            .cloned()
    }

    /// Sum of references the host holds on functions of `program`
    pub fn function_refs(&self, program: &str) -> i32 {
        self.programs
            .borrow()
            .get(program)
            .map(|functions| functions.iter().map(|f| f.refs()).sum())
            .unwrap_or(0)
    }

    pub fn type_info(&self, kind: ArrayKind) -> Rc<FakeTypeInfo> {
        let index = ArrayKind::ALL
            .iter()
            .position(|k| *k == kind)
            .unwrap_or_default();
        Rc::clone(&self.array_types[index])
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.trace.borrow_mut().push(entry.into());
    }

    pub fn trace(&self) -> Vec<String> {
        self.trace.borrow().clone()
    }

    pub fn clear_trace(&self) {
        self.trace.borrow_mut().clear();
    }

    pub fn has_native(&self, name: &str) -> bool {
        self.natives.borrow().contains_key(name)
    }
}

pub struct FakeEngine {
    state: Rc<EngineState>,
}

impl FakeEngine {
    pub fn new() -> (Self, Rc<EngineState>) {
        let state = Rc::new(EngineState::new());
        (
            Self {
                state: Rc::clone(&state),
            },
            state,
        )
    }
}

impl Registrar for FakeEngine {
    fn register_funcdef(&mut self, decl: &str) -> Result<(), EngineError> {
        self.state.funcdefs.borrow_mut().push(decl.to_string());
        Ok(())
    }

    fn register_global_function(
        &mut self,
        decl: &str,
        native: NativeFn,
    ) -> Result<(), EngineError> {
        let name = function_name(decl).to_string();
        if self.state.natives.borrow().contains_key(&name) {
            return Err(EngineError::new("RegisterGlobalFunction", decl));
        }
        self.state.declarations.borrow_mut().push(decl.to_string());
        self.state.natives.borrow_mut().insert(name, native);
        Ok(())
    }
}

impl ScriptEngine for FakeEngine {
    fn module_builder(&self) -> Box<dyn ModuleBuilder + '_> {
        Box::new(FakeBuilder {
            state: Rc::clone(&self.state),
            resolver: None,
            name: String::new(),
            sections: Vec::new(),
        })
    }

    fn create_context(&self) -> Box<dyn ScriptContext> {
        self.state
            .contexts_created
            .set(self.state.contexts_created.get() + 1);
        Box::new(FakeContext {
            state: Rc::clone(&self.state),
            user_data: None,
            prepared: None,
            args: Vec::new(),
            return_byte: 0,
        })
    }
}

struct FakeBuilder {
    state: Rc<EngineState>,
    resolver: Option<IncludeResolver>,
    name: String,
    sections: Vec<(String, String)>,
}

#[derive(Default)]
struct Parsed {
    functions: Vec<Rc<FakeFunction>>,
    entry: Option<String>,
    no_arrays: bool,
}

impl FakeBuilder {
    fn parse(&mut self, section: &str, source: &str, parsed: &mut Parsed) -> Result<(), EngineError> {
        self.state.sections.borrow_mut().push(section.to_string());

        for line in source.lines().map(str::trim) {
            if line == "syntax error" {
                return Err(EngineError::new("Build", format!("syntax error in {section}")));
            } else if line == "no arrays" {
                parsed.no_arrays = true;
            } else if let Some(name) = line.strip_prefix("entry ") {
                parsed.entry = Some(name.to_string());
            } else if let Some(key) = line.strip_prefix("program ") {
                let programs = self.state.programs.borrow();
                let functions = programs
                    .get(key)
                    .ok_or_else(|| EngineError::new("Build", format!("unknown program {key}")))?;
                parsed.functions.extend(functions.iter().cloned());
            } else if let Some(include) = line.strip_prefix("#include ") {
                let include = include.trim_matches('"');
                let resolver = self
                    .resolver
                    .as_mut()
                    .ok_or_else(|| EngineError::new("Build", "no include resolver"))?;
                let included = resolver(include, section)?;
                self.parse(&include_path(include, section), &included, parsed)?;
            }
        }
        Ok(())
    }
}

impl ModuleBuilder for FakeBuilder {
    fn set_include_resolver(&mut self, resolver: IncludeResolver) {
        self.resolver = Some(resolver);
    }

    fn start_new_module(&mut self, name: &str) -> Result<(), EngineError> {
        if name.is_empty() {
            return Err(EngineError::new("StartNewModule", "empty module name"));
        }
        self.name = name.to_string();
        Ok(())
    }

    fn add_section(&mut self, name: &str, source: &str) -> Result<(), EngineError> {
        if source.trim().is_empty() {
            return Err(EngineError::new("AddScriptSection", format!("{name} is empty")));
        }
        self.sections.push((name.to_string(), source.to_string()));
        Ok(())
    }

    fn build(mut self: Box<Self>) -> Result<Box<dyn ScriptModule>, EngineError> {
        let mut parsed = Parsed::default();
        for (section, source) in std::mem::take(&mut self.sections) {
            self.parse(&section, &source, &mut parsed)?;
        }

        Ok(Box::new(FakeModule {
            name: self.name.clone(),
            state: Rc::clone(&self.state),
            parsed,
        }))
    }
}

struct FakeModule {
    name: String,
    state: Rc<EngineState>,
    parsed: Parsed,
}

impl ScriptModule for FakeModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn function_by_decl(&self, decl: &str) -> Option<Rc<dyn ScriptFunction>> {
        let function = self.parsed.functions.iter().find(|f| f.decl == decl)?;
        Some(Rc::clone(function) as Rc<dyn ScriptFunction>)
    }

    fn type_info_by_decl(&self, decl: &str) -> Option<Rc<dyn TypeInfo>> {
        if self.parsed.no_arrays {
            return None;
        }
        let type_info = self.state.array_types.iter().find(|t| t.decl == decl)?;
        Some(Rc::clone(type_info) as Rc<dyn TypeInfo>)
    }

    fn metadata_entrypoint(&self) -> Option<Rc<dyn ScriptFunction>> {
        let entry = self.parsed.entry.as_deref()?;
        let function = self.parsed.functions.iter().find(|f| f.name() == entry)?;
        Some(Rc::clone(function) as Rc<dyn ScriptFunction>)
    }

    fn discard(self: Box<Self>) {
        self.state
            .modules_discarded
            .set(self.state.modules_discarded.get() + 1);
    }
}

/// An argument as bound on the context
#[derive(Debug, Clone)]
pub enum BoundArg {
    Address(Primitive),
    Object(ObjectRef),
}

struct Prepared {
    decl: String,
    program: String,
    body: Body,
}

struct FakeContext {
    state: Rc<EngineState>,
    user_data: Option<Rc<dyn Any>>,
    prepared: Option<Prepared>,
    args: Vec<Option<BoundArg>>,
    return_byte: u8,
}

impl FakeContext {
    fn bind(&mut self, index: usize, arg: BoundArg) -> Result<(), EngineError> {
        if self.prepared.is_none() {
            return Err(EngineError::new("SetArg", "context is not prepared"));
        }
        if self.args.len() <= index {
            self.args.resize(index + 1, None);
        }
        self.args[index] = Some(arg);
        Ok(())
    }
}

impl Drop for FakeContext {
    fn drop(&mut self) {
        self.state
            .contexts_released
            .set(self.state.contexts_released.get() + 1);
    }
}

impl ScriptContext for FakeContext {
    fn set_user_data(&mut self, data: Rc<dyn Any>) {
        self.user_data = Some(data);
    }

    fn user_data(&self) -> Option<Rc<dyn Any>> {
        self.user_data.clone()
    }

    fn prepare(&mut self, function: &dyn ScriptFunction) -> Result<(), EngineError> {
        if self.state.fail_prepare.get() {
            return Err(EngineError::new("Prepare", "context is busy"));
        }
        let function = function
            .as_any()
            .downcast_ref::<FakeFunction>()
            .ok_or_else(|| EngineError::new("Prepare", "foreign function"))?;

        self.prepared = Some(Prepared {
            decl: function.decl.clone(),
            program: function.program.clone(),
            body: Rc::clone(&function.body),
        });
        self.args.clear();
        self.return_byte = 0;
        Ok(())
    }

    fn set_arg_address(&mut self, index: usize, value: &Primitive) -> Result<(), EngineError> {
        self.bind(index, BoundArg::Address(*value))
    }

    fn set_arg_object(&mut self, index: usize, value: &ObjectRef) -> Result<(), EngineError> {
        self.bind(index, BoundArg::Object(value.clone()))
    }

    fn execute(&mut self) -> Result<ExecutionState, EngineError> {
        let prepared = self
            .prepared
            .take()
            .ok_or_else(|| EngineError::new("Execute", "context is not prepared"))?;

        let mut invocation = Invocation {
            state: Rc::clone(&self.state),
            program: prepared.program.clone(),
            user_data: self.user_data.clone(),
            args: self.args.drain(..).flatten().collect(),
        };

        let outcome = (prepared.body)(&mut invocation);
        let state = match outcome {
            Outcome::Finished => ExecutionState::Finished,
            Outcome::Returned(value) => {
                self.return_byte = u8::from(value);
                ExecutionState::Finished
            }
            Outcome::Suspended => ExecutionState::Suspended,
            Outcome::Exception(message) => ExecutionState::Exception(ExceptionInfo {
                message: message.to_string(),
                function: prepared.decl.clone(),
                section: "main.as".to_string(),
                line: 1,
                column: 1,
                stack: vec![prepared.decl.clone()],
            }),
        };
        Ok(state)
    }

    fn return_byte(&self) -> u8 {
        self.return_byte
    }
}

/// What a function body sees while it runs
pub struct Invocation {
    pub state: Rc<EngineState>,
    program: String,
    user_data: Option<Rc<dyn Any>>,
    pub args: Vec<BoundArg>,
}

impl Invocation {
    pub fn record(&self, entry: impl Into<String>) {
        self.state.record(entry);
    }

    /// Handle to another function of the same program, as a native argument
    pub fn callback(&self, name: &str) -> NativeArg {
        let function = self
            .state
            .function(&self.program, name)
            .unwrap_or_else(|| panic!("no function {name} in program {}", self.program));
        NativeArg::Function(function)
    }

    /// Call a host function the way compiled script code would
    pub fn native(&self, name: &str, args: Vec<NativeArg>) -> Result<NativeReturn, NativeError> {
        let native = self
            .state
            .natives
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("no native {name}"));

        // Handles passed to the host carry a reference the callee owns
        for arg in &args {
            if let NativeArg::Function(function) = arg {
                function.add_ref();
            }
        }
        let mut call = NativeCall::new(self.user_data.clone(), args);
        native(&mut call)
    }

    pub fn entity(&self, index: usize) -> Option<Entity> {
        match self.args.get(index) {
            Some(BoundArg::Object(ObjectRef::Entity(entity))) => Some(*entity),
            _ => None,
        }
    }

    pub fn is_null(&self, index: usize) -> bool {
        matches!(self.args.get(index), Some(BoundArg::Object(ObjectRef::Null)))
    }

    pub fn array(&self, index: usize) -> Option<Vec<Value>> {
        match self.args.get(index) {
            Some(BoundArg::Object(ObjectRef::Script(object))) => object
                .downcast_ref::<FakeArray>()
                .map(|array| array.items.clone()),
            _ => None,
        }
    }
}

pub fn uint(value: u32) -> NativeArg {
    NativeArg::Primitive(Primitive::UInt32(value))
}

pub fn string(value: &str) -> NativeArg {
    NativeArg::Object(ObjectRef::String(value.to_string()))
}

/// The `uint` a native returned
pub fn returned_uint(ret: NativeReturn) -> u32 {
    match ret {
        NativeReturn::Primitive(Primitive::UInt32(value)) => value,
        other => panic!("expected a uint, got {other:?}"),
    }
}

/// A runtime over the fake engine, with resources read from a temp dir
pub struct Fixture {
    pub dir: TempDir,
    pub state: Rc<EngineState>,
    pub clock: Rc<ManualClock>,
    pub runtime: ScriptRuntime,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(ScriptingConfig::default())
    }

    pub fn with_config(config: ScriptingConfig) -> Self {
        let (engine, state) = FakeEngine::new();
        let clock = Rc::new(ManualClock::new());
        let runtime = ScriptRuntime::new(engine, config)
            .unwrap()
            .with_clock(Rc::clone(&clock) as Rc<dyn Clock>);

        Self {
            dir: TempDir::new().unwrap(),
            state,
            clock,
            runtime,
        }
    }

    pub fn write(&self, path: &str, contents: &str) {
        let path = self.dir.path().join(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    pub fn resource(&self, name: &str, main: &str) -> ScriptResource {
        self.runtime.create_resource(
            ResourceInfo::new(name, main),
            Rc::new(DirPackage::new(self.dir.path())),
        )
    }

    /// Write `main.as` with `source` and return a started resource
    pub fn start(&self, source: &str) -> ScriptResource {
        use altscript_scripting_host::ResourceImpl;

        self.write("main.as", source);
        let mut resource = self.resource("test", "main.as");
        assert!(resource.start(), "resource failed to start");
        resource
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}
