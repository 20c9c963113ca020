//! Constant Propagation
//!
//! Substitutes variable references with the literal most recently assigned
//! to the variable. A literal assignment to a local or parameter is removed
//! once its binding is recorded; it comes back if a use inside a loop still
//! needs the variable, or if the variable is reassigned under a condition.

use rustc_hash::FxHashMap;

use crate::ast::{attr, Ast, Kind, NodeId};
use crate::symbols::SymbolTable;

use super::fold::Constant;

/// One propagation pass over the whole tree
pub struct ConstantPropagator<'a> {
    table: &'a SymbolTable,
    /// Name of the method being visited
    method: String,
    /// Locals and parameters of the current method
    locals: FxHashMap<String, Constant>,
    /// Fields, tracked across methods
    globals: FxHashMap<String, Constant>,
    /// Literal assignments waiting to be removed when the method ends
    pending: FxHashMap<String, NodeId>,
    substituted: usize,
    removed: usize,
}

impl<'a> ConstantPropagator<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Self {
            table,
            method: String::new(),
            locals: FxHashMap::default(),
            globals: FxHashMap::default(),
            pending: FxHashMap::default(),
            substituted: 0,
            removed: 0,
        }
    }

    /// Variable references replaced by literals
    pub fn substituted(&self) -> usize {
        self.substituted
    }

    /// Literal assignments removed from the tree
    pub fn removed(&self) -> usize {
        self.removed
    }

    /// Run over the tree once. Returns whether the tree changed.
    pub fn propagate(&mut self, ast: &mut Ast) -> bool {
        if let Some(root) = ast.root() {
            self.visit(ast, root);
        }
        self.substituted > 0 || self.removed > 0
    }

    fn visit(&mut self, ast: &mut Ast, node: NodeId) {
        let kind = ast.kind(node);
        if kind.is_method() {
            self.enter_method(ast, node);
        }

        let children = ast.children(node).to_vec();
        for child in children {
            self.visit(ast, child);
        }

        match kind {
            Kind::MethodDecl | Kind::MainMethodDecl => self.leave_method(ast),
            Kind::AssignStmt => self.visit_assign(ast, node),
            Kind::VarRefExpr => self.visit_var_ref(ast, node),
            _ => {}
        }
    }

    fn enter_method(&mut self, ast: &Ast, method: NodeId) {
        self.method = ast.name(method).unwrap_or_default().to_string();
        self.locals.clear();
        self.pending.clear();
    }

    fn leave_method(&mut self, ast: &mut Ast) {
        let mut pending: Vec<NodeId> = self.pending.drain().map(|(_, stmt)| stmt).collect();
        pending.sort();
        for stmt in pending {
            if ast.detach(stmt).is_some() {
                self.removed += 1;
            }
        }
        self.locals.clear();
    }

    fn is_local(&self, name: &str) -> bool {
        self.table.is_local(&self.method, name)
    }

    fn binding(&self, name: &str) -> Option<Constant> {
        if self.is_local(name) {
            self.locals.get(name).copied()
        } else if self.table.is_field(name) {
            self.globals.get(name).copied()
        } else {
            None
        }
    }

    fn bind(&mut self, name: &str, value: Constant) {
        if self.is_local(name) {
            self.locals.insert(name.to_string(), value);
        } else if self.table.is_field(name) {
            self.globals.insert(name.to_string(), value);
        }
    }

    fn unbind(&mut self, name: &str) {
        if self.is_local(name) {
            self.locals.remove(name);
        } else {
            self.globals.remove(name);
        }
    }

    fn visit_assign(&mut self, ast: &mut Ast, stmt: NodeId) {
        let Some(name) = ast.name(stmt).map(str::to_string) else {
            return;
        };
        let value = ast
            .child(stmt, 0)
            .and_then(|rhs| Constant::from_node(ast, rhs));

        let conditional = ast.is_within(stmt, Kind::IfStmt) || ast.is_within(stmt, Kind::WhileStmt);
        if conditional {
            // The earlier literal store may still be the value seen on the
            // path that skips this statement
            self.pending.remove(&name);
            self.unbind(&name);
            return;
        }

        match value {
            Some(value) => {
                self.bind(&name, value);
                if self.is_local(&name) {
                    self.pending.insert(name, stmt);
                }
            }
            None => self.unbind(&name),
        }
    }

    fn visit_var_ref(&mut self, ast: &mut Ast, node: NodeId) {
        let Some(name) = ast.name(node).map(str::to_string) else {
            return;
        };

        if ast.is_within(node, Kind::WhileStmt) {
            // The loop may run after a later store; keep the variable alive
            if self.is_local(&name) {
                self.pending.remove(&name);
            }
            return;
        }

        if let Some(value) = self.binding(&name) {
            log::trace!("{}: {} -> {}", self.method, name, value.value());
            ast.replace_with_literal(node, value.kind(), value.value());
            self.substituted += 1;
        }
    }
}
