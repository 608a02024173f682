use std::{cell::RefCell, collections::BTreeMap, fmt, rc::Rc};

use tracing::debug;

use crate::interpreter::value::core::Value;

/// A named storage slot.
///
/// Cells are owned by exactly one [`Object`]; pointers only hold weak
/// references to them, so removing a cell from its Object destroys it.
#[derive(Debug, Clone)]
pub struct VariableCell {
    /// The name the cell is stored under.
    pub name:     String,
    /// Current contents.
    pub value:    Value,
    /// Nesting depth the cell was created at. Leaving a block removes every
    /// cell whose depth is at least the block's depth.
    pub depth:    usize,
    /// Constant cells silently ignore writes.
    pub is_const: bool,
}

/// Shared handle to a [`VariableCell`].
pub type CellRef = Rc<RefCell<VariableCell>>;

/// A mapping from names to variable cells.
///
/// The same type serves as a record value (`ctx`, `Math`, module exports)
/// and as a scope frame. Cloning an `Object` clones the handle, not the
/// entries; two clones observe each other's writes.
///
/// # Example
/// ```
/// use kll::interpreter::value::{core::Value, object::Object};
///
/// let object = Object::new();
/// object.declare("x", Value::Number(1.0), 0, false);
/// assert!(object.set("x", Value::Number(2.0)));
/// assert_eq!(object.get("x"), Some(Value::Number(2.0)));
/// assert!(!object.set("missing", Value::Null));
/// ```
#[derive(Clone, Default)]
pub struct Object(Rc<RefCell<BTreeMap<String, CellRef>>>);

impl Object {
    /// Creates an empty object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an object whose entries are all constant and live at depth 0.
    ///
    /// Used to build host records such as `console` and `Math`.
    pub fn constant<I, S>(entries: I) -> Self
        where I: IntoIterator<Item = (S, Value)>,
              S: Into<String>
    {
        let object = Self::new();
        for (name, value) in entries {
            object.declare(name, value, 0, true);
        }
        object
    }

    /// Creates a cell, replacing any cell already stored under `name`.
    ///
    /// A replaced cell is dropped, so pointers to it become dangling.
    ///
    /// # Returns
    /// The new cell.
    pub fn declare(&self,
                   name: impl Into<String>,
                   value: Value,
                   depth: usize,
                   is_const: bool)
                   -> CellRef {
        let name = name.into();
        let cell = Rc::new(RefCell::new(VariableCell { name: name.clone(),
                                                       value,
                                                       depth,
                                                       is_const }));
        self.0.borrow_mut().insert(name, Rc::clone(&cell));
        cell
    }

    /// Returns the cell stored under `name`.
    #[must_use]
    pub fn cell(&self, name: &str) -> Option<CellRef> {
        self.0.borrow().get(name).cloned()
    }

    /// Returns a copy of the value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.borrow().get(name).map(|cell| cell.borrow().value.clone())
    }

    /// Overwrites an existing, non-constant entry.
    ///
    /// # Returns
    /// `true` when the value was written. Missing and constant entries are
    /// left untouched.
    pub fn set(&self, name: &str, value: Value) -> bool {
        let Some(cell) = self.cell(name) else {
            return false;
        };
        let mut cell = cell.borrow_mut();
        if cell.is_const {
            return false;
        }
        cell.value = value;
        true
    }

    /// Returns `true` if an entry named `name` exists.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.borrow().contains_key(name)
    }

    /// Removes every cell created at `min_depth` or deeper.
    ///
    /// # Returns
    /// The number of removed cells.
    pub fn purge(&self, min_depth: usize) -> usize {
        let mut entries = self.0.borrow_mut();
        let before = entries.len();
        entries.retain(|_, cell| cell.borrow().depth < min_depth);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(min_depth, removed, "purged scope");
        }
        removed
    }

    /// Removes every entry.
    ///
    /// The entries are dropped only after the object is released, so values
    /// that refer back to this object can go with them.
    ///
    /// # Returns
    /// The number of removed cells.
    pub fn clear(&self) -> usize {
        let entries = std::mem::take(&mut *self.0.borrow_mut());
        entries.len()
    }

    /// Entry names in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().keys().cloned().collect()
    }

    /// Returns `(name, value)` pairs in sorted order.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0
            .borrow()
            .iter()
            .map(|(name, cell)| (name.clone(), cell.borrow().value.clone()))
            .collect()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Returns `true` if the object has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Returns `true` if both handles refer to the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address used to detect cycles while printing.
    pub(crate) fn address(&self) -> *const () {
        Rc::as_ptr(&self.0).cast()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Object").field(&self.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purge_removes_deeper_cells_only() {
        let object = Object::new();
        object.declare("outer", Value::Number(1.0), 0, false);
        object.declare("inner", Value::Number(2.0), 1, false);
        object.declare("deepest", Value::Number(3.0), 2, false);

        assert_eq!(object.purge(1), 2);
        assert_eq!(object.keys(), vec!["outer".to_string()]);
        assert_eq!(object.purge(1), 0);
    }

    #[test]
    fn constants_ignore_writes() {
        let object = Object::constant([("pi", Value::Number(3.1415))]);
        assert!(!object.set("pi", Value::Number(3.0)));
        assert_eq!(object.get("pi"), Some(Value::Number(3.1415)));
    }

    #[test]
    fn redeclaring_replaces_the_cell() {
        let object = Object::new();
        let first = object.declare("x", Value::Number(1.0), 0, false);
        let second = object.declare("x", Value::Number(2.0), 1, false);
        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(object.cell("x").map(|cell| cell.borrow().depth), Some(1));
    }

    #[test]
    fn clear_releases_self_references() {
        let object = Object::new();
        let cell = object.declare("me", Value::Object(object.clone()), 0, false);
        let weak = Rc::downgrade(&cell);
        drop(cell);

        assert_eq!(object.clear(), 1);
        assert!(object.is_empty());
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn clones_share_entries() {
        let object = Object::new();
        let alias = object.clone();
        alias.declare("x", Value::Null, 0, false);
        assert!(object.contains_key("x"));
        assert!(object.ptr_eq(&alias));
        assert!(!object.ptr_eq(&Object::new()));
    }
}
