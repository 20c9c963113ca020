//! Register Allocation
//!
//! Rewrites the register column of each method's variable table so that
//! variables which are never live at the same time share a JVM local slot.
//!
//! `this` (for instance methods) and the parameters keep the first
//! `min_register` slots untouched; everything else is colored on the
//! interference graph built from liveness.

mod coloring;
mod interference;
mod liveness;

pub use coloring::{Coloring, GraphColoring};
pub use interference::InterferenceGraph;
pub use liveness::{Liveness, VarSet};

use std::fmt::Write;

use rustc_hash::FxHashSet;

use crate::config::RegisterAllocation;
use crate::error::{CompileError, CompileResult};
use crate::ir::{IrClass, IrMethod};
use crate::report::{Report, Stage};

/// Outcome of allocating one method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allocation {
    /// Registers were committed with this total count
    Committed(u32),
    /// The fixed budget is below what the method needs; nothing changed
    BudgetTooSmall { minimum: u32 },
}

/// Per-method register allocator
pub struct RegisterAllocator {
    mode: RegisterAllocation,
}

impl RegisterAllocator {
    pub fn new(mode: RegisterAllocation) -> Self {
        Self { mode }
    }

    /// Allocate every method of `class`, appending one report per method
    pub fn allocate_class(&self, class: &mut IrClass) -> CompileResult<Vec<Report>> {
        let mut reports = Vec::new();
        for method in &mut class.methods {
            match self.allocate_method(method)? {
                Some(Allocation::Committed(k)) => {
                    reports.push(Report::new_log(Stage::Optimization, success_message(method, k)));
                }
                Some(Allocation::BudgetTooSmall { minimum }) => {
                    reports.push(Report::new_error(
                        Stage::Optimization,
                        format!(
                            "Register allocation failed in method '{}'. The minimum number of registers for this method is {}",
                            method.name, minimum
                        ),
                    ));
                }
                None => {}
            }
        }
        Ok(reports)
    }

    /// Allocate one method. `None` in skip mode.
    pub fn allocate_method(&self, method: &mut IrMethod) -> CompileResult<Option<Allocation>> {
        if self.mode == RegisterAllocation::Skip {
            return Ok(None);
        }

        let liveness = Liveness::analyze(method);
        let graph = InterferenceGraph::build(&liveness);
        let min_register = method.reserved_registers();
        let coloring = GraphColoring::new(&graph, precolored(method), min_register);

        let (k, colors) = match self.mode {
            RegisterAllocation::Minimize => coloring.minimum().ok_or_else(|| {
                CompileError::AllocationExhausted {
                    method: method.name.clone(),
                }
            })?,
            RegisterAllocation::Fixed(budget) => {
                let (minimum, _) = coloring.minimum().ok_or_else(|| {
                    CompileError::AllocationExhausted {
                        method: method.name.clone(),
                    }
                })?;
                if minimum > budget {
                    log::debug!(
                        "{}: budget of {} registers is below the minimum {}",
                        method.name,
                        budget,
                        minimum
                    );
                    return Ok(Some(Allocation::BudgetTooSmall { minimum }));
                }
                let colors = coloring
                    .color(budget)
                    .ok_or_else(|| CompileError::internal(format!(
                        "method '{}' colored with {} registers but not with {}",
                        method.name, minimum, budget
                    )))?;
                (budget, colors)
            }
            RegisterAllocation::Skip => return Ok(None),
        };

        commit(method, &graph, &colors, min_register);
        log::debug!(
            "{}: {} variable(s) in {} register(s)",
            method.name,
            method.var_table.len(),
            k
        );
        Ok(Some(Allocation::Committed(k)))
    }
}

/// Minimum register count for one method, without changing it
pub fn minimum_registers(method: &IrMethod) -> CompileResult<u32> {
    let liveness = Liveness::analyze(method);
    let graph = InterferenceGraph::build(&liveness);
    GraphColoring::new(&graph, precolored(method), method.reserved_registers())
        .minimum()
        .map(|(k, _)| k)
        .ok_or_else(|| CompileError::AllocationExhausted {
            method: method.name.clone(),
        })
}

fn precolored(method: &IrMethod) -> FxHashSet<String> {
    let mut names: FxHashSet<String> = method.params.iter().map(|p| p.name.clone()).collect();
    if !method.is_static {
        names.insert("this".to_string());
    }
    names
}

fn commit(method: &mut IrMethod, graph: &InterferenceGraph, colors: &Coloring, min_register: u32) {
    // Field names appear as defs of putfield but have no table entry
    for (name, &register) in colors {
        method.var_table.set_register(name, register);
    }

    let reserved = precolored(method);
    let unused: Vec<String> = method
        .var_table
        .iter()
        .filter(|entry| !graph.contains(&entry.name) && !reserved.contains(&entry.name))
        .map(|entry| entry.name.clone())
        .collect();
    for name in unused {
        method.var_table.set_register(&name, min_register);
    }
}

fn success_message(method: &IrMethod, k: u32) -> String {
    let mut message = format!(
        "Register allocation succeeded in method '{}' with {} registers.\n",
        method.name, k
    );
    for entry in method.var_table.iter() {
        let _ = writeln!(
            message,
            "Variable '{}' was assigned to register {}.",
            entry.name, entry.register
        );
    }
    message
}
