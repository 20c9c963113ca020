//! Javelin Compiler - AST to Jasmin Code Generation
//!
//! This crate implements the back end of the Javelin teaching language: it
//! takes a validated AST, optionally folds and propagates constants, lowers
//! the tree to a three-address IR, optionally packs variables into fewer JVM
//! local slots by graph coloring, and emits Jasmin assembly.
//!
//! ```text
//! Ast ─▶ optimize ─▶ lower ─▶ IrClass ─▶ regalloc ─▶ codegen ─▶ Jasmin text
//! ```

pub mod ast;
pub mod codegen;
pub mod config;
pub mod error;
pub mod ir;
pub mod lower;
pub mod optimize;
pub mod pipeline;
pub mod regalloc;
pub mod report;
pub mod symbols;
pub mod typing;
pub mod varargs;

pub use ast::{Ast, AstBuilder, Kind, NodeId};
pub use config::{CompilerConfig, ConfigError, RegisterAllocation};
pub use error::{CompileError, CompileResult};
pub use ir::{IrClass, IrMethod, PrettyPrint};
pub use pipeline::{CompilationOutput, Compiler};
pub use report::{Report, ReportKind, Stage};
pub use symbols::SymbolTable;
