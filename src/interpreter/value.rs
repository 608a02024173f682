/// The `Value` enum and the operations every variant supports.
///
/// Defines arithmetic, conversion, attribute access, membership and
/// invocation, all dispatched on the left operand. Also contains the
/// cycle-safe display routine.
pub mod core;

/// Variable cells and the `Object` mapping that holds them.
///
/// An `Object` is both a record value and a scope frame: every entry is a
/// shared cell tagged with the depth it was created at, so leaving a block
/// can sweep the cells that block created.
pub mod object;

/// User-defined and host callables.
///
/// Defines `Function` (a body, its parameters and the scope it captured),
/// `NativeFunction` (a host callback) and the keyword-argument map both
/// receive.
pub mod function;

/// Non-owning references to variable cells.
pub mod pointer;

/// Attributes and bound methods of string values.
pub mod string;

/// Attributes of number values.
pub mod number;
