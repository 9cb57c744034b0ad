//! `Listener<A>` — a shared handler with identity.
//!
//! Rust closures have no identity of their own, so removal-by-reference
//! compares the shared allocation instead: clones of one `Listener` are the
//! same listener, two separately constructed listeners never are.

use std::fmt;
use std::sync::Arc;

/// A cloneable handle to an event handler.
pub struct Listener<A: ?Sized + 'static> {
    callback: Arc<dyn Fn(&A) + Send + Sync>,
}

impl<A: ?Sized + 'static> Listener<A> {
    /// Wrap `callback` in a new listener with its own identity.
    pub fn new(callback: impl Fn(&A) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Invoke the handler directly.
    pub fn call(&self, args: &A) {
        (self.callback)(args)
    }

    /// Whether `self` and `other` are the same listener.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        // Compare data pointers only; vtable pointers for one allocation may differ
        // across codegen units.
        std::ptr::eq(
            Arc::as_ptr(&self.callback) as *const (),
            Arc::as_ptr(&other.callback) as *const (),
        )
    }
}

impl<A: ?Sized + 'static> Clone for Listener<A> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<A: ?Sized + 'static> PartialEq for Listener<A> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<A: ?Sized + 'static> Eq for Listener<A> {}

impl<A: ?Sized + 'static> fmt::Debug for Listener<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Arc::as_ptr(&self.callback) as *const ())
    }
}
