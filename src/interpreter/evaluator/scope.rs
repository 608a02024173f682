use std::rc::Rc;

use crate::{
    error::diagnostic::SourceFile,
    interpreter::value::{
        core::Value,
        object::{CellRef, Object},
    },
};

/// A chain of variable frames.
///
/// The evaluator runs almost everything in a single flat frame: blocks and
/// calls do not push frames, they tag the cells they create with a deeper
/// depth and sweep them on exit (see [`ScopeGuard`]). A frame only gets a
/// parent when a function runs in the isolated call mode.
///
/// Cloning a `Scope` clones the handle.
///
/// # Example
/// ```
/// use kll::interpreter::{evaluator::scope::Scope, value::object::Object};
///
/// let root = Scope::root(Object::new());
/// let child = root.child();
/// root.locals().declare("x", 1.0.into(), 0, false);
///
/// assert!(child.lookup("x").is_some());
/// assert!(child.locals().is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct Scope(Rc<Frame>);

#[derive(Debug)]
struct Frame {
    locals: Object,
    parent: Option<Scope>,
    file:   Option<Rc<SourceFile>>,
}

impl Scope {
    /// Creates a scope with a single frame, running the main program.
    #[must_use]
    pub fn root(locals: Object) -> Self {
        Self(Rc::new(Frame { locals,
                             parent: None,
                             file: None }))
    }

    /// Creates a scope with a single frame, running the text of `file`.
    #[must_use]
    pub fn for_file(locals: Object, file: Rc<SourceFile>) -> Self {
        Self(Rc::new(Frame { locals,
                             parent: None,
                             file: Some(file) }))
    }

    /// Creates an empty frame whose lookups fall back to `self`.
    #[must_use]
    pub fn child(&self) -> Self {
        Self(Rc::new(Frame { locals: Object::new(),
                             parent: Some(self.clone()),
                             file:   None, }))
    }

    /// The file the root frame of the chain runs; `None` for the main
    /// program.
    #[must_use]
    pub fn file(&self) -> Option<&Rc<SourceFile>> {
        let mut current = self;
        while let Some(parent) = &current.0.parent {
            current = parent;
        }
        current.0.file.as_ref()
    }

    /// Returns `true` if both scopes run the same source text.
    #[must_use]
    pub fn same_file(&self, other: &Self) -> bool {
        match (self.file(), other.file()) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// The innermost frame; declarations go here.
    #[must_use]
    pub fn locals(&self) -> &Object {
        &self.0.locals
    }

    /// Finds the cell for `name`, innermost frame first.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<CellRef> {
        let mut current = Some(self);
        while let Some(scope) = current {
            if let Some(cell) = scope.0.locals.cell(name) {
                return Some(cell);
            }
            current = scope.0.parent.as_ref();
        }
        None
    }

    /// Membership test over every frame of the chain.
    ///
    /// `needle` is tested with [`Value::contains`] against each frame, so a
    /// variable node or a string both work.
    #[must_use]
    pub fn contains(&self, needle: &Value) -> bool {
        let mut current = Some(self);
        while let Some(scope) = current {
            if Value::Object(scope.0.locals.clone()).contains(needle).unwrap_or(false) {
                return true;
            }
            current = scope.0.parent.as_ref();
        }
        false
    }

    /// Opens a block: the returned guard removes every cell created in
    /// this frame at `depth` or deeper when it is dropped.
    #[must_use]
    pub fn enter(&self, depth: usize) -> ScopeGuard {
        ScopeGuard { locals: self.0.locals.clone(),
                     depth }
    }
}

/// Sweeps a frame when a block or call is left, including when it is left
/// through an error.
///
/// # Example
/// ```
/// use kll::interpreter::{evaluator::scope::Scope, value::object::Object};
///
/// let scope = Scope::root(Object::new());
/// {
///     let _guard = scope.enter(1);
///     scope.locals().declare("inner", 1.0.into(), 1, false);
///     scope.locals().declare("outer", 1.0.into(), 0, false);
/// }
/// assert_eq!(scope.locals().keys(), vec!["outer".to_string()]);
/// ```
#[must_use]
pub struct ScopeGuard {
    locals: Object,
    depth:  usize,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.locals.purge(self.depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_prefers_the_inner_frame() {
        let root = Scope::root(Object::new());
        root.locals().declare("x", Value::from(1.0), 0, false);
        let child = root.child();
        child.locals().declare("x", Value::from(2.0), 1, false);

        let cell = child.lookup("x").unwrap();
        assert_eq!(cell.borrow().value, Value::from(2.0));
        assert!(child.lookup("y").is_none());
    }

    #[test]
    fn children_run_the_file_of_their_root() {
        let file = Rc::new(SourceFile { name: "lib.kll".to_string(),
                                        text: String::new(), });
        let module = Scope::for_file(Object::new(), Rc::clone(&file));
        let main = Scope::root(Object::new());

        assert!(module.child().file().is_some_and(|found| Rc::ptr_eq(found, &file)));
        assert!(module.child().same_file(&module));
        assert!(!module.same_file(&main));
        assert!(main.child().same_file(&main));
    }

    #[test]
    fn contains_walks_parents() {
        let root = Scope::root(Object::new());
        root.locals().declare("x", Value::Null, 0, false);
        let child = root.child();
        assert!(child.contains(&Value::from("x")));
        assert!(!child.contains(&Value::from("y")));
    }
}
