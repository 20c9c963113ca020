//! Code Generation from IR to Jasmin Assembly
//!
//! This module turns the (optionally register-allocated) IR into the textual
//! assembly accepted by the Jasmin assembler.
//!
//! # Pipeline
//!
//! ```text
//! IrClass → JasminGenerator → assembly text
//! ```
//!
//! Every emitted instruction records how many operand slots it pops and
//! pushes, which yields `.limit stack`. `.limit locals` is one past the
//! highest register in the variable table.

mod context;
pub mod emit;

pub use context::JasminGenerator;

use crate::error::CompileResult;
use crate::ir::IrClass;

/// Generate assembly text for an IR class
pub fn generate(class: &IrClass) -> CompileResult<String> {
    let text = JasminGenerator::new(class).generate()?;
    log::debug!(
        "{}: generated {} line(s) of assembly",
        class.name,
        text.lines().count()
    );
    Ok(text)
}
