//! AST Optimization Passes
//!
//! Constant folding and constant propagation, run in place on the AST before
//! lowering. The two passes alternate until neither changes the tree.

mod fold;
mod propagate;

pub use fold::{eval_binary, Constant, ConstantFolder};
pub use propagate::ConstantPropagator;

use crate::ast::Ast;
use crate::symbols::SymbolTable;

/// Optimizer that runs folding and propagation to a joint fixpoint
#[derive(Debug, Clone, Default)]
pub struct Optimizer {
    stats: OptStats,
}

impl Optimizer {
    /// Create a new optimizer
    pub fn new() -> Self {
        Self::default()
    }

    /// Run both passes until a full round leaves the tree unchanged
    pub fn optimize(&mut self, ast: &mut Ast, table: &SymbolTable) -> OptStats {
        let mut stats = OptStats::default();

        loop {
            stats.iterations += 1;

            let mut folder = ConstantFolder::new();
            let folded = folder.fold(ast);
            stats.constants_folded += folder.folded();

            // Field bindings live for one traversal only
            let mut propagator = ConstantPropagator::new(table);
            let propagated = propagator.propagate(ast);
            stats.constants_propagated += propagator.substituted();
            stats.assignments_removed += propagator.removed();

            if !folded && !propagated {
                break;
            }
        }

        log::debug!(
            "optimizer: {} round(s), {} folded, {} propagated, {} assignment(s) removed",
            stats.iterations,
            stats.constants_folded,
            stats.constants_propagated,
            stats.assignments_removed
        );
        self.stats = stats.clone();
        stats
    }

    /// Statistics of the last run
    pub fn stats(&self) -> OptStats {
        self.stats.clone()
    }
}

/// Statistics about optimizations performed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptStats {
    /// Rounds of folding + propagation, including the final unchanged one
    pub iterations: usize,
    /// Number of operator nodes folded into literals
    pub constants_folded: usize,
    /// Number of variable references replaced by literals
    pub constants_propagated: usize,
    /// Number of literal assignments removed
    pub assignments_removed: usize,
}
