use std::{fmt, rc::Rc};

use crate::{
    ast::{LiteralValue, Node},
    interpreter::{
        evaluator::core::EvalResult,
        value::{
            function::{Function, Kwargs, NativeFunction, native_error},
            number::number_attribute,
            object::Object,
            pointer::{DanglingPointer, Pointer},
            string::string_attribute,
        },
    },
    util::num::format_number,
};

/// Result of a value operation that may have to follow a pointer.
pub type ValueResult<T> = Result<T, DanglingPointer>;

/// Represents a runtime value in the interpreter.
///
/// Scalars (`Number`, `Str`, `Bool`, `Null`) are copied on assignment.
/// The remaining variants are shared handles: cloning them aliases the same
/// underlying array, object, function or cell.
#[derive(Clone, Default)]
pub enum Value {
    /// A double precision number. Integral values print without a decimal
    /// point.
    Number(f64),
    /// A string.
    Str(String),
    /// A boolean. The prelude binds `true` and `false` to these.
    Bool(bool),
    /// The absence of a value.
    #[default]
    Null,
    /// An immutable, shared sequence.
    Array(Rc<Vec<Self>>),
    /// A shared record of variable cells.
    Object(Object),
    /// A user-defined function.
    Function(Rc<Function>),
    /// A host callable.
    Native(NativeFunction),
    /// A reference to a variable cell.
    Pointer(Pointer),
    /// A syntax tree fragment. Used as the needle for `exist` and printed by
    /// `debug-run`.
    Node(Rc<Node>),
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::Array(Rc::new(v))
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Self::Object(v)
    }
}

impl From<&LiteralValue> for Value {
    fn from(literal: &LiteralValue) -> Self {
        match literal {
            LiteralValue::Number(value) => Self::Number(*value),
            LiteralValue::Str(text) => Self::Str(text.clone()),
            LiteralValue::Null => Self::Null,
        }
    }
}

/// Identity comparison, as performed by `==`.
///
/// Scalars compare by value; arrays, objects, functions, pointers and nodes
/// compare by reference. Values of different variants are never equal.
///
/// # Example
/// ```
/// use kll::interpreter::value::core::Value;
///
/// assert_eq!(Value::from(1.0), Value::from(1.0));
/// assert_ne!(Value::from(vec![]), Value::from(vec![]));
///
/// let array = Value::from(vec![Value::Null]);
/// assert_eq!(array, array.clone());
/// ```
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Null, Self::Null) => true,
            (Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Native(a), Self::Native(b)) => a.ptr_eq(b),
            (Self::Pointer(a), Self::Pointer(b)) => a.ptr_eq(b),
            (Self::Node(a), Self::Node(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "Number({})", format_number(*value)),
            Self::Str(text) => write!(f, "Str({text:?})"),
            Self::Bool(value) => write!(f, "Bool({value})"),
            Self::Null => write!(f, "Null"),
            Self::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Self::Object(object) => fmt::Debug::fmt(object, f),
            Self::Function(function) => fmt::Debug::fmt(function, f),
            Self::Native(native) => fmt::Debug::fmt(native, f),
            Self::Pointer(pointer) => fmt::Debug::fmt(pointer, f),
            Self::Node(node) => write!(f, "Node({})", node.label()),
        }
    }
}

impl Value {
    /// Follows pointers until a non-pointer value is reached.
    ///
    /// Non-pointer values are returned as they are.
    ///
    /// # Errors
    /// [`DanglingPointer`] when a pointer on the way targets a purged cell,
    /// or when the pointers form a cycle and never reach a value.
    pub fn deref(&self) -> ValueResult<Self> {
        let Self::Pointer(first) = self else {
            return Ok(self.clone());
        };
        let mut visited = vec![first.clone()];
        let mut current = first.get()?;
        while let Self::Pointer(next) = &current {
            if visited.iter().any(|seen| seen.ptr_eq(next)) {
                return Err(DanglingPointer);
            }
            visited.push(next.clone());
            current = next.get()?;
        }
        Ok(current)
    }

    /// Name of the variant, as used in messages.
    ///
    /// A pointer reports `Pointer`, not the type of its target.
    #[must_use]
    pub const fn type_tag(&self) -> &'static str {
        match self {
            Self::Number(_) => "Number",
            Self::Str(_) => "String",
            Self::Bool(_) => "Bool",
            Self::Null => "Null",
            Self::Array(_) => "Array",
            Self::Object(_) => "Object",
            Self::Function(_) => "Function",
            Self::Native(_) => "NativeFunction",
            Self::Pointer(_) => "Pointer",
            Self::Node(_) => "Node",
        }
    }

    /// Converts the value to a number.
    ///
    /// Numbers convert to themselves, strings and nodes to `0`, and every
    /// other variant to `-1`.
    ///
    /// # Errors
    /// [`DanglingPointer`] for a pointer whose target is gone.
    pub fn to_number(&self) -> ValueResult<f64> {
        Ok(match self.deref()? {
            Self::Number(value) => value,
            Self::Str(_) | Self::Node(_) => 0.0,
            _ => -1.0,
        })
    }

    /// Converts the value to a boolean.
    ///
    /// Numbers are true when positive, strings when non-empty and booleans
    /// are themselves. Everything else is false.
    ///
    /// # Errors
    /// [`DanglingPointer`] for a pointer whose target is gone.
    pub fn to_bool(&self) -> ValueResult<bool> {
        Ok(match self.deref()? {
            Self::Number(value) => value > 0.0,
            Self::Str(text) => !text.is_empty(),
            Self::Bool(value) => value,
            _ => false,
        })
    }

    /// `self + other`.
    ///
    /// Numbers add the numeric value of `other`; strings append the display
    /// string of `other`. Every other left operand gives `Null`.
    ///
    /// # Errors
    /// [`DanglingPointer`] when either operand is a dangling pointer.
    ///
    /// # Example
    /// ```
    /// use kll::interpreter::value::core::Value;
    ///
    /// assert_eq!(Value::from(1.0).sum(&Value::from(2.0)), Ok(Value::from(3.0)));
    /// assert_eq!(Value::from("n=").sum(&Value::from(2.0)), Ok(Value::from("n=2")));
    /// assert_eq!(Value::from(2.0).sum(&Value::from("x")), Ok(Value::from(2.0)));
    /// assert_eq!(Value::Null.sum(&Value::from(1.0)), Ok(Value::Null));
    /// ```
    pub fn sum(&self, other: &Self) -> ValueResult<Self> {
        match self.deref()? {
            Self::Str(text) => Ok(Self::Str(text + &other.deref()?.to_string())),
            left => left.numeric(other, |a, b| a + b),
        }
    }

    /// `self - other`. Only numbers subtract; everything else gives `Null`.
    ///
    /// # Errors
    /// [`DanglingPointer`] when either operand is a dangling pointer.
    pub fn sub(&self, other: &Self) -> ValueResult<Self> {
        self.deref()?.numeric(other, |a, b| a - b)
    }

    /// `self * other`. Only numbers multiply; everything else gives `Null`.
    ///
    /// # Errors
    /// [`DanglingPointer`] when either operand is a dangling pointer.
    pub fn mul(&self, other: &Self) -> ValueResult<Self> {
        self.deref()?.numeric(other, |a, b| a * b)
    }

    /// `self / other`. Division by zero yields an infinite or `NaN` number.
    ///
    /// # Errors
    /// [`DanglingPointer`] when either operand is a dangling pointer.
    pub fn div(&self, other: &Self) -> ValueResult<Self> {
        self.deref()?.numeric(other, |a, b| a / b)
    }

    fn numeric(&self, other: &Self, op: fn(f64, f64) -> f64) -> ValueResult<Self> {
        match self {
            Self::Number(value) => Ok(Self::Number(op(*value, other.to_number()?))),
            _ => Ok(Self::Null),
        }
    }

    /// Reads the attribute `name`.
    ///
    /// Objects read their entries; numbers and strings expose the
    /// attributes described in [`number_attribute`] and [`string_attribute`].
    /// Anything missing is `Null`.
    ///
    /// # Errors
    /// [`DanglingPointer`] for a pointer whose target is gone.
    pub fn get_attribute(&self, name: &str) -> ValueResult<Self> {
        Ok(match self.deref()? {
            Self::Object(object) => object.get(name).unwrap_or_default(),
            Self::Number(value) => number_attribute(value, name),
            Self::Str(text) => string_attribute(&text, name),
            _ => Self::Null,
        })
    }

    /// Writes the attribute `name`.
    ///
    /// Only existing, non-constant entries of objects can be written; every
    /// other write is ignored.
    ///
    /// # Errors
    /// [`DanglingPointer`] for a pointer whose target is gone.
    pub fn set_attribute(&self, name: &str, value: Self) -> ValueResult<()> {
        if let Self::Object(object) = self.deref()? {
            object.set(name, value);
        }
        Ok(())
    }

    /// Membership test.
    ///
    /// - Strings test whether `needle`'s display string is a substring.
    /// - Arrays test whether an element is identical to `needle`.
    /// - Objects test whether a key is named by `needle`, which is either a
    ///   variable node or a string.
    ///
    /// Every other container contains nothing.
    ///
    /// # Errors
    /// [`DanglingPointer`] for a pointer whose target is gone.
    pub fn contains(&self, needle: &Self) -> ValueResult<bool> {
        Ok(match self.deref()? {
            Self::Str(text) => text.contains(&needle.deref()?.to_string()),
            Self::Array(items) => items.iter().any(|item| item == needle),
            Self::Object(object) => match needle {
                Self::Node(node) => node.variable_name().is_some_and(|name| object.contains_key(name)),
                Self::Str(name) => object.contains_key(name),
                _ => false,
            },
            _ => false,
        })
    }

    /// Invokes the value.
    ///
    /// Functions and native functions run; pointers call their target;
    /// every other value returns `Null` without error.
    ///
    /// # Parameters
    /// - `args`: Positional arguments.
    /// - `kwargs`: Named arguments.
    /// - `depth`: Depth of the calling code. The callee's body runs one level
    ///   deeper.
    ///
    /// # Errors
    /// Whatever the callee raises. A dangling pointer becomes
    /// `RuntimeError::Native`; a function whose context was dropped fails
    /// with `RuntimeError::ContextDropped`.
    pub fn call(&self, args: &[Self], kwargs: &Kwargs, depth: usize) -> EvalResult<Self> {
        match self {
            Self::Function(function) => {
                function.context.upgrade()?.call_function(function, args, kwargs, depth)
            },
            Self::Native(native) => native.call(args, kwargs, depth),
            Self::Pointer(_) => self.deref().map_err(native_error)?.call(args, kwargs, depth),
            _ => Ok(Self::Null),
        }
    }

    /// Returns the display string, as printed by `console.log`.
    ///
    /// # Example
    /// ```
    /// use kll::interpreter::value::core::Value;
    ///
    /// let array = Value::from(vec![Value::from(1.0), Value::from("a"), Value::Null]);
    /// assert_eq!(array.to_display_string(), "[1, \"a\", null]");
    /// ```
    #[must_use]
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, open: &mut Vec<*const ()>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", format_number(*value)),
            Self::Str(text) => write!(f, "{text}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Null => write!(f, "null"),
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.write_member(f, open)?;
                }
                write!(f, "]")
            },
            Self::Object(object) => {
                let address = object.address();
                if open.contains(&address) {
                    return write!(f, "{{...}}");
                }
                open.push(address);
                write!(f, "{{")?;
                for (i, (name, value)) in object.entries().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}:")?;
                    value.write_member(f, open)?;
                }
                open.pop();
                write!(f, "}}")
            },
            Self::Function(function) => write!(f, "{function}"),
            Self::Native(_) => write!(f, "<native function>"),
            Self::Pointer(_) => match self.deref() {
                Ok(target) => target.write(f, open),
                Err(_) => write!(f, "<dangling pointer>"),
            },
            Self::Node(node) => write!(f, "{node}"),
        }
    }

    /// Members of arrays and objects quote their strings.
    fn write_member(&self, f: &mut fmt::Formatter<'_>, open: &mut Vec<*const ()>) -> fmt::Result {
        match self {
            Self::Str(text) => write!(f, "\"{text}\""),
            _ => self.write(f, open),
        }
    }
}

/// Formats the value for output.
///
/// Objects print as `{name:value, ...}` with names sorted. An object that
/// contains itself, directly or through other objects, prints the inner
/// occurrence as `{...}`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, &mut Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;

    #[test]
    fn conversions() {
        assert_eq!(Value::from(2.5).to_number(), Ok(2.5));
        assert_eq!(Value::from("12").to_number(), Ok(0.0));
        assert_eq!(Value::Null.to_number(), Ok(-1.0));
        assert_eq!(Value::Bool(true).to_number(), Ok(-1.0));
        assert_eq!(Value::from(vec![]).to_number(), Ok(-1.0));

        assert_eq!(Value::from(0.0).to_bool(), Ok(false));
        assert_eq!(Value::from(-1.0).to_bool(), Ok(false));
        assert_eq!(Value::from("x").to_bool(), Ok(true));
        assert_eq!(Value::from("").to_bool(), Ok(false));
        assert_eq!(Value::Object(Object::new()).to_bool(), Ok(false));
    }

    #[test]
    fn arithmetic_on_non_numbers_is_null() {
        assert_eq!(Value::from("a").sub(&Value::from(1.0)), Ok(Value::Null));
        assert_eq!(Value::from("a").mul(&Value::from(1.0)), Ok(Value::Null));
        assert_eq!(Value::Bool(true).div(&Value::from(1.0)), Ok(Value::Null));
        assert_eq!(Value::from(1.0).sub(&Value::Null), Ok(Value::Number(2.0)));
    }

    #[test]
    fn division_by_zero_is_not_finite() {
        let Ok(Value::Number(value)) = Value::from(1.0).div(&Value::from(0.0)) else {
            panic!("expected a number");
        };
        assert!(value.is_infinite());
    }

    #[test]
    fn display_quotes_nested_strings_and_sorts_keys() {
        let object = Object::new();
        object.declare("b", Value::from("text"), 0, false);
        object.declare("a", Value::from(1.5), 0, false);
        assert_eq!(Value::Object(object).to_string(), "{a:1.5, b:\"text\"}");
        assert_eq!(Value::from("plain").to_string(), "plain");
    }

    #[test]
    fn display_survives_cycles() {
        let object = Object::new();
        object.declare("me", Value::Object(object.clone()), 0, false);
        assert_eq!(Value::Object(object).to_string(), "{me:{...}}");
    }

    #[test]
    fn pointers_delegate_to_their_target() {
        let scope = Object::new();
        let cell = scope.declare("x", Value::from(2.0), 1, false);
        let pointer = Value::Pointer(Pointer::to(&cell));
        drop(cell);

        assert_eq!(pointer.type_tag(), "Pointer");
        assert_eq!(pointer.sum(&Value::from(1.0)), Ok(Value::from(3.0)));
        assert_eq!(Value::from(1.0).sum(&pointer), Ok(Value::from(3.0)));
        assert_eq!(pointer.to_string(), "2");

        scope.purge(1);
        assert_eq!(pointer.to_number(), Err(DanglingPointer));
        assert_eq!(pointer.to_string(), "<dangling pointer>");
    }

    #[test]
    fn pointer_cycles_are_reported() {
        let scope = Object::new();
        let cell = scope.declare("x", Value::Null, 0, false);
        cell.borrow_mut().value = Value::Pointer(Pointer::to(&cell));
        let pointer = Value::Pointer(Pointer::to(&cell));
        assert_eq!(pointer.deref(), Err(DanglingPointer));
    }

    #[test]
    fn object_membership() {
        let object = Object::new();
        object.declare("x", Value::Null, 0, false);
        let value = Value::Object(object);
        let needle = Value::Node(Rc::new(Node::new(NodeKind::Variable("x".to_string()), 1, 1)));
        assert_eq!(value.contains(&needle), Ok(true));
        assert_eq!(value.contains(&Value::from("x")), Ok(true));
        assert_eq!(value.contains(&Value::from("y")), Ok(false));
    }

    #[test]
    fn string_and_array_membership() {
        assert_eq!(Value::from("hello").contains(&Value::from("ell")), Ok(true));
        assert_eq!(Value::from("n1").contains(&Value::from(1.0)), Ok(true));

        let shared = Value::from(vec![]);
        let array = Value::from(vec![Value::from(1.0), shared.clone()]);
        assert_eq!(array.contains(&Value::from(1.0)), Ok(true));
        assert_eq!(array.contains(&shared), Ok(true));
        assert_eq!(array.contains(&Value::from(vec![])), Ok(false));
    }

    #[test]
    fn attributes() {
        let object = Object::new();
        object.declare("x", Value::from(1.0), 0, false);
        let value = Value::Object(object.clone());
        assert_eq!(value.get_attribute("x"), Ok(Value::from(1.0)));
        assert_eq!(value.get_attribute("y"), Ok(Value::Null));

        value.set_attribute("x", Value::from(2.0)).unwrap();
        value.set_attribute("y", Value::from(2.0)).unwrap();
        assert_eq!(object.get("x"), Some(Value::from(2.0)));
        assert!(!object.contains_key("y"));
    }
}
