use std::{
    fmt,
    rc::{Rc, Weak},
};

use thiserror::Error;

use crate::interpreter::value::{
    core::Value,
    object::{CellRef, VariableCell},
};

/// Raised when a pointer is used after its target cell was purged.
///
/// Value operations report this bare marker; the evaluator turns it into a
/// positioned [`RuntimeError::DanglingPointer`](crate::error::RuntimeError).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the variable behind this pointer no longer exists")]
pub struct DanglingPointer;

/// A non-owning reference to a variable cell.
///
/// Reading through the pointer yields the cell's current value, and
/// assignments to a variable holding a pointer write into the target cell.
///
/// # Example
/// ```
/// use kll::interpreter::value::{core::Value, object::Object, pointer::Pointer};
///
/// let scope = Object::new();
/// let cell = scope.declare("x", Value::Number(1.0), 1, false);
/// let pointer = Pointer::to(&cell);
/// drop(cell);
///
/// assert_eq!(pointer.get(), Ok(Value::Number(1.0)));
/// scope.purge(1);
/// assert!(pointer.get().is_err());
/// ```
#[derive(Clone)]
pub struct Pointer(Weak<std::cell::RefCell<VariableCell>>);

impl Pointer {
    /// Creates a pointer to `cell`.
    #[must_use]
    pub fn to(cell: &CellRef) -> Self {
        Self(Rc::downgrade(cell))
    }

    /// Returns the target cell.
    ///
    /// # Errors
    /// [`DanglingPointer`] when the cell no longer exists.
    pub fn target(&self) -> Result<CellRef, DanglingPointer> {
        self.0.upgrade().ok_or(DanglingPointer)
    }

    /// Returns a copy of the value currently stored in the target cell.
    ///
    /// # Errors
    /// [`DanglingPointer`] when the cell no longer exists.
    pub fn get(&self) -> Result<Value, DanglingPointer> {
        Ok(self.target()?.borrow().value.clone())
    }

    /// Returns `true` if both pointers refer to the same cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.upgrade() {
            Some(cell) => write!(f, "Pointer({})", cell.borrow().name),
            None => write!(f, "Pointer(<dangling>)"),
        }
    }
}
