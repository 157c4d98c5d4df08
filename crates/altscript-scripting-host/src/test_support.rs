use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

use crate::engine::ScriptFunction;
use crate::handle::{Pinned, RefCounted};

/// Function handle that only counts references
pub(crate) struct StubFunction {
    decl: String,
    refs: Cell<i32>,
}

impl StubFunction {
    pub(crate) fn new(decl: &str) -> Rc<Self> {
        Rc::new(Self {
            decl: decl.to_string(),
            refs: Cell::new(0),
        })
    }

    /// Pin a new reference, as a subscription would
    pub(crate) fn pinned(function: &Rc<Self>) -> Pinned<dyn ScriptFunction> {
        let handle: Rc<dyn ScriptFunction> = function.clone();
        Pinned::acquire(handle)
    }

    pub(crate) fn refs(&self) -> i32 {
        self.refs.get()
    }
}

impl RefCounted for StubFunction {
    fn add_ref(&self) {
        self.refs.set(self.refs.get() + 1);
    }

    fn release(&self) {
        self.refs.set(self.refs.get() - 1);
    }
}

impl ScriptFunction for StubFunction {
    fn declaration(&self) -> String {
        self.decl.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
