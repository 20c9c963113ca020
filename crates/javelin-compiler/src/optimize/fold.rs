//! Constant Folding
//!
//! Replaces operator nodes whose operands are literals with the literal they
//! evaluate to, and strips redundant parentheses.

use crate::ast::{attr, Ast, Kind, NodeId};

/// A literal value read from the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Int(i32),
    Bool(bool),
}

impl Constant {
    /// Read a literal node; `None` for anything else
    pub fn from_node(ast: &Ast, node: NodeId) -> Option<Self> {
        let value = ast.attr(node, attr::VALUE)?;
        match ast.kind(node) {
            Kind::IntegerLiteral => value.parse().ok().map(Constant::Int),
            Kind::BooleanLiteral => value.parse().ok().map(Constant::Bool),
            _ => None,
        }
    }

    pub fn kind(self) -> Kind {
        match self {
            Constant::Int(_) => Kind::IntegerLiteral,
            Constant::Bool(_) => Kind::BooleanLiteral,
        }
    }

    pub fn value(self) -> String {
        match self {
            Constant::Int(v) => v.to_string(),
            Constant::Bool(v) => v.to_string(),
        }
    }
}

/// Constant folding pass over the AST
#[derive(Debug, Default)]
pub struct ConstantFolder {
    folded: usize,
}

impl ConstantFolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes folded so far
    pub fn folded(&self) -> usize {
        self.folded
    }

    /// Fold the whole tree once. Returns whether any operator was folded;
    /// removing parentheses alone does not count as a modification.
    pub fn fold(&mut self, ast: &mut Ast) -> bool {
        let before = self.folded;
        if let Some(root) = ast.root() {
            self.fold_node(ast, root);
        }
        self.folded > before
    }

    fn fold_node(&mut self, ast: &mut Ast, node: NodeId) {
        // Children first, so a parent sees already-folded operands
        let children = ast.children(node).to_vec();
        for child in children {
            self.fold_node(ast, child);
        }

        match ast.kind(node) {
            Kind::BinaryExpr => self.fold_binary(ast, node),
            Kind::NotExpr => self.fold_not(ast, node),
            Kind::ParenExpr => {
                if let &[inner] = ast.children(node) {
                    ast.replace(node, inner);
                }
            }
            _ => {}
        }
    }

    fn fold_binary(&mut self, ast: &mut Ast, node: NodeId) {
        let (Some(left), Some(right)) = (ast.child(node, 0), ast.child(node, 1)) else {
            return;
        };
        let (Some(l), Some(r)) = (Constant::from_node(ast, left), Constant::from_node(ast, right))
        else {
            return;
        };
        let Some(op) = ast.attr(node, attr::OP) else {
            return;
        };

        if let Some(result) = eval_binary(op, l, r) {
            log::trace!("folded {} {} {} into {}", l.value(), op, r.value(), result.value());
            ast.replace_with_literal(node, result.kind(), result.value());
            self.folded += 1;
        }
    }

    fn fold_not(&mut self, ast: &mut Ast, node: NodeId) {
        let Some(operand) = ast.child(node, 0) else {
            return;
        };
        if let Some(Constant::Bool(value)) = Constant::from_node(ast, operand) {
            let result = Constant::Bool(!value);
            ast.replace_with_literal(node, result.kind(), result.value());
            self.folded += 1;
        }
    }
}

/// Evaluate a binary operator on two literals.
///
/// Arithmetic wraps at 32 bits. Division by zero is left unfolded so the
/// fault still happens at run time.
pub fn eval_binary(op: &str, left: Constant, right: Constant) -> Option<Constant> {
    match (op, left, right) {
        ("+", Constant::Int(a), Constant::Int(b)) => Some(Constant::Int(a.wrapping_add(b))),
        ("-", Constant::Int(a), Constant::Int(b)) => Some(Constant::Int(a.wrapping_sub(b))),
        ("*", Constant::Int(a), Constant::Int(b)) => Some(Constant::Int(a.wrapping_mul(b))),
        ("/", Constant::Int(a), Constant::Int(b)) if b != 0 => {
            Some(Constant::Int(a.wrapping_div(b)))
        }
        ("<", Constant::Int(a), Constant::Int(b)) => Some(Constant::Bool(a < b)),
        ("&&", Constant::Bool(a), Constant::Bool(b)) => Some(Constant::Bool(a && b)),
        _ => None,
    }
}
