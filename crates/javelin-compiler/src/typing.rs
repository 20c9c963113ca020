//! Static expression types
//!
//! The front end has already type-checked the tree, so these rules only
//! recover the type of an expression for lowering and the vararg rewrite.

use crate::ast::{attr, Ast, Kind, NodeId};
use crate::symbols::{SymbolTable, Type};

/// Type of expression `expr`, or `None` when it cannot be known locally
/// (a call to a method declared outside this class, an unknown name).
pub fn expr_type(ast: &Ast, expr: NodeId, table: &SymbolTable) -> Option<Type> {
    match ast.kind(expr) {
        Kind::BinaryExpr => binary_type(ast.attr(expr, attr::OP)?),
        Kind::NotExpr | Kind::BooleanLiteral => Some(Type::boolean()),
        Kind::IntegerLiteral | Kind::ArrayLengthExpr => Some(Type::int()),
        Kind::NewIntArrayExpr | Kind::ArrayExpr => Some(Type::int_array()),
        Kind::ParenExpr => expr_type(ast, ast.child(expr, 0)?, table),
        Kind::ThisExpr => Some(Type::new(table.class_name.clone(), false)),
        Kind::NewObjectExpr => Some(Type::new(ast.name(expr)?, false)),
        Kind::ArrayAccessExpr => {
            let array = expr_type(ast, ast.child(expr, 0)?, table)?;
            Some(Type::new(array.name, false))
        }
        Kind::VarRefExpr => {
            let method = ast
                .enclosing_method(expr)
                .and_then(|m| ast.name(m))
                .unwrap_or_default();
            var_type(ast.name(expr)?, method, table)
        }
        Kind::MethodCallExpr => {
            let name = ast.name(expr)?;
            let receiver = ast.child(expr, 0)?;
            if is_own_receiver(ast, receiver, table) && table.has_method(name) {
                table.return_type(name).cloned()
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Result type of a binary operator
pub fn binary_type(op: &str) -> Option<Type> {
    match op {
        "+" | "-" | "*" | "/" => Some(Type::int()),
        "&&" | "<" => Some(Type::boolean()),
        _ => None,
    }
}

/// Resolve a name inside `method`: local, parameter, field, then class name
pub fn var_type(name: &str, method: &str, table: &SymbolTable) -> Option<Type> {
    if let Some(symbol) = table.local_or_param(method, name) {
        return Some(symbol.ty.clone());
    }
    if let Some(field) = table.field(name) {
        return Some(field.ty.clone());
    }
    if table.is_class_name(name) {
        return Some(Type::class_ref(name));
    }
    None
}

/// Whether a call on `receiver` dispatches to a method of the class being
/// compiled (`this`, the class name itself, or a value of the class type).
/// A method inherited from an imported superclass is not visible here.
pub fn is_own_receiver(ast: &Ast, receiver: NodeId, table: &SymbolTable) -> bool {
    match ast.kind(receiver) {
        Kind::ThisExpr => true,
        Kind::ParenExpr => ast
            .child(receiver, 0)
            .is_some_and(|inner| is_own_receiver(ast, inner, table)),
        _ => expr_type(ast, receiver, table)
            .is_some_and(|ty| ty.name == table.class_name && !ty.is_array),
    }
}
