//! Liveness Analysis
//!
//! Backward dataflow over one method's instruction list:
//!
//! ```text
//! in(i)  = use(i) ∪ (out(i) − def(i))
//! out(i) = ∪ in(s) for s in succ(i)
//! ```
//!
//! iterated from empty sets until nothing changes.

use std::collections::BTreeSet;

use crate::ir::IrMethod;

/// Sets of variable names
pub type VarSet = BTreeSet<String>;

/// Liveness result for one method
#[derive(Debug, Clone, Default)]
pub struct Liveness {
    pub uses: Vec<VarSet>,
    pub defs: Vec<VarSet>,
    pub live_in: Vec<VarSet>,
    pub live_out: Vec<VarSet>,
    /// Full passes until the fixpoint, including the last unchanged one
    pub iterations: usize,
}

/// Per-instruction state of the fixpoint iteration
struct Solver {
    uses: Vec<VarSet>,
    defs: Vec<VarSet>,
    successors: Vec<Vec<usize>>,
    live_in: Vec<VarSet>,
    live_out: Vec<VarSet>,
}

impl Solver {
    fn new(method: &IrMethod) -> Self {
        let n = method.instructions.len();
        let uses = method
            .instructions
            .iter()
            .map(|instr| instr.uses().into_iter().map(str::to_string).collect())
            .collect();
        let defs = method
            .instructions
            .iter()
            .map(|instr| instr.defs().into_iter().map(str::to_string).collect())
            .collect();
        Self {
            uses,
            defs,
            successors: (0..n).map(|i| method.successors(i)).collect(),
            live_in: vec![VarSet::new(); n],
            live_out: vec![VarSet::new(); n],
        }
    }

    /// One full pass; returns whether any set changed
    fn pass(&mut self) -> bool {
        let mut changed = false;

        // Reverse order converges faster for a backward problem
        for i in (0..self.live_in.len()).rev() {
            let mut out = VarSet::new();
            for &s in &self.successors[i] {
                out.extend(self.live_in[s].iter().cloned());
            }

            let mut inn = self.uses[i].clone();
            inn.extend(out.difference(&self.defs[i]).cloned());

            if inn != self.live_in[i] || out != self.live_out[i] {
                changed = true;
                self.live_in[i] = inn;
                self.live_out[i] = out;
            }
        }
        changed
    }
}

impl Liveness {
    /// Run the analysis to its fixpoint
    pub fn analyze(method: &IrMethod) -> Self {
        let mut solver = Solver::new(method);
        let mut iterations = 1;
        while solver.pass() {
            iterations += 1;
        }

        log::trace!("{}: liveness converged after {} pass(es)", method.name, iterations);

        Self {
            uses: solver.uses,
            defs: solver.defs,
            live_in: solver.live_in,
            live_out: solver.live_out,
            iterations,
        }
    }

    /// `out(i) ∪ def(i)`: names that must not share a register at `i`
    pub fn out_def(&self, index: usize) -> VarSet {
        let mut set = self.live_out[index].clone();
        set.extend(self.defs[index].iter().cloned());
        set
    }

    pub fn len(&self) -> usize {
        self.live_in.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live_in.is_empty()
    }
}
