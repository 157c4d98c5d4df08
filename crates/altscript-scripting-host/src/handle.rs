use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// Interpreter-side reference counting for handles shared with the host
pub trait RefCounted {
    fn add_ref(&self);
    fn release(&self);
}

/// One owned interpreter reference to a handle
///
/// The reference is given back to the interpreter exactly once, when the
/// `Pinned` is dropped. `Pinned` is not `Clone`; copies made for
/// iteration clone the inner `Rc` instead and do not own a reference.
pub struct Pinned<T: ?Sized + RefCounted> {
    handle: Rc<T>,
}

impl<T: ?Sized + RefCounted> Pinned<T> {
    /// Take a new reference to a borrowed handle
    pub fn acquire(handle: Rc<T>) -> Self {
        handle.add_ref();
        Self { handle }
    }

    /// Take over a reference the interpreter already counted for us
    /// (e.g. a handle passed as a native call argument)
    pub fn adopt(handle: Rc<T>) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &Rc<T> {
        &self.handle
    }
}

impl<T: ?Sized + RefCounted> Deref for Pinned<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.handle
    }
}

impl<T: ?Sized + RefCounted> Drop for Pinned<T> {
    fn drop(&mut self) {
        self.handle.release();
    }
}

impl<T: ?Sized + RefCounted> fmt::Debug for Pinned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pinned")
            .field("handle", &Rc::as_ptr(&self.handle))
            .finish()
    }
}
