//! Compilation Pipeline
//!
//! Runs the back-end stages in order on one compilation unit:
//!
//! 1. vararg packing
//! 2. constant folding and propagation (when `optimize` is set)
//! 3. lowering to IR
//! 4. register allocation (unless skipped)
//! 5. Jasmin emission
//!
//! Configuration problems surface before any method is touched, because a
//! [`CompilerConfig`] can only be built through its validating loaders.

use crate::ast::Ast;
use crate::codegen;
use crate::config::CompilerConfig;
use crate::error::CompileResult;
use crate::ir::IrClass;
use crate::lower::lower_program;
use crate::optimize::{OptStats, Optimizer};
use crate::regalloc::RegisterAllocator;
use crate::report::Report;
use crate::symbols::SymbolTable;
use crate::varargs::pack_varargs;

/// Everything a compilation produces
#[derive(Debug, Clone)]
pub struct CompilationOutput {
    /// IR after register allocation
    pub ir: IrClass,
    /// Jasmin assembly text
    pub jasmin: String,
    /// Diagnostics in the order they were produced
    pub reports: Vec<Report>,
}

impl CompilationOutput {
    pub fn has_errors(&self) -> bool {
        self.reports.iter().any(Report::is_error)
    }
}

/// Main compiler entry point
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile a program tree. The tree is rewritten in place by vararg
    /// packing and, when enabled, the optimizer.
    pub fn compile(&self, ast: &mut Ast) -> CompileResult<CompilationOutput> {
        let table = SymbolTable::from_ast(ast)?;

        pack_varargs(ast, &table);
        if self.config.optimize {
            optimize(ast, &table);
        }

        let mut ir = lower_program(ast, &table)?;
        let reports = allocate(&mut ir, &self.config)?;
        let jasmin = codegen::generate(&ir)?;

        Ok(CompilationOutput {
            ir,
            jasmin,
            reports,
        })
    }

    /// Compile a program tree handed over as JSON
    pub fn compile_json(&self, json: &str) -> CompileResult<CompilationOutput> {
        let mut ast = Ast::from_json(json)?;
        self.compile(&mut ast)
    }
}

/// Run constant folding and propagation to a fixpoint
pub fn optimize(ast: &mut Ast, table: &SymbolTable) -> OptStats {
    Optimizer::new().optimize(ast, table)
}

/// Apply the configured register allocation to every method
pub fn allocate(ir: &mut IrClass, config: &CompilerConfig) -> CompileResult<Vec<Report>> {
    RegisterAllocator::new(config.register_allocation).allocate_class(ir)
}
