//! Vararg Packing
//!
//! Rewrites calls to methods whose last parameter is variadic so the trailing
//! arguments travel as one array literal. Runs on the AST before lowering.

use crate::ast::{Ast, Kind, NodeId};
use crate::symbols::SymbolTable;
use crate::typing::{expr_type, is_own_receiver};

/// Pack vararg arguments for every eligible call in the tree. Returns the
/// number of calls rewritten.
pub fn pack_varargs(ast: &mut Ast, table: &SymbolTable) -> usize {
    let Some(root) = ast.root() else {
        return 0;
    };

    let calls: Vec<NodeId> = ast
        .descendants(root)
        .into_iter()
        .filter(|&node| ast.kind(node) == Kind::MethodCallExpr)
        .collect();

    let mut rewritten = 0;
    for call in calls {
        if pack_call(ast, call, table) {
            rewritten += 1;
        }
    }

    if rewritten > 0 {
        log::debug!("packed vararg arguments in {} call(s)", rewritten);
    }
    rewritten
}

fn pack_call(ast: &mut Ast, call: NodeId, table: &SymbolTable) -> bool {
    let Some(name) = ast.name(call) else {
        return false;
    };
    let Some(receiver) = ast.child(call, 0) else {
        return false;
    };
    let own_call =
        is_own_receiver(ast, receiver, table) || is_class_receiver(ast, receiver, table);
    if !own_call || !table.has_method(name) {
        return false;
    }

    let params = table.parameters(name);
    match params.last() {
        Some(last) if last.ty.is_vararg => {}
        _ => return false,
    }

    // children = receiver followed by the arguments
    let args: Vec<NodeId> = ast.children(call)[1..].to_vec();
    let fixed = params.len() - 1;

    let trailing: Vec<NodeId> = if args.len() != params.len() {
        args.iter().skip(fixed).copied().collect()
    } else {
        let last = args[fixed];
        let already_array = expr_type(ast, last, table).is_some_and(|ty| ty.is_array);
        if already_array {
            return false;
        }
        vec![last]
    };

    let array = ast.add_node(Kind::ArrayExpr);
    for arg in trailing {
        ast.append_child(array, arg);
    }
    ast.append_child(call, array);
    true
}

/// `Foo.bar(...)` where `Foo` is the class being compiled
fn is_class_receiver(ast: &Ast, receiver: NodeId, table: &SymbolTable) -> bool {
    ast.kind(receiver) == Kind::VarRefExpr && ast.name(receiver) == Some(table.class_name.as_str())
}
