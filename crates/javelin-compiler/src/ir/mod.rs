//! Intermediate Representation (IR)
//!
//! Three-address code between the AST and the stack-machine assembly. Each
//! method is a flat instruction list with named labels; control flow is
//! explicit through `goto` and conditional branches.
//!
//! # Structure
//!
//! - `IrClass` - The compiled class with its fields and methods
//! - `IrMethod` - Instructions, label positions and the variable table
//! - `IrInstr` - Three-address code instructions
//! - `Operand` - Literals, variables and array elements with their types

pub mod instr;
pub mod method;
pub mod module;
pub mod pretty;
pub mod value;

pub use instr::{BinaryOp, CallInstr, CallKind, Condition, IrInstr, UnaryOp};
pub use method::{IrMethod, IrParam, VarEntry, VarTable};
pub use module::{IrClass, IrField};
pub use pretty::PrettyPrint;
pub use value::{IrType, Operand};
