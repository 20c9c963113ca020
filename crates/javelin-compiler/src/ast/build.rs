//! Typed constructors for AST nodes
//!
//! The parser lives outside this crate; `AstBuilder` is how an embedding
//! front end (and the test suite) assembles a tree with the shapes the back
//! end expects.

use super::{attr, Ast, Kind, NodeId};

/// Builds an [`Ast`] node by node
#[derive(Debug, Default)]
pub struct AstBuilder {
    ast: Ast,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish the tree with `root` as its root node
    pub fn finish(mut self, root: NodeId) -> Ast {
        self.ast.set_root(root);
        self.ast
    }

    fn node(&mut self, kind: Kind, attrs: &[(&str, &str)], children: &[NodeId]) -> NodeId {
        let id = self.ast.add_node(kind);
        for (key, value) in attrs {
            self.ast.set_attr(id, *key, *value);
        }
        for &child in children {
            self.ast.append_child(id, child);
        }
        id
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    /// `Program` with its imports followed by the class
    pub fn program(&mut self, imports: &[NodeId], class: NodeId) -> NodeId {
        let mut children = imports.to_vec();
        children.push(class);
        self.node(Kind::Program, &[], &children)
    }

    /// `import a.b.C;` given as the dotted path
    pub fn import(&mut self, path: &str) -> NodeId {
        self.node(Kind::ImportDecl, &[(attr::NAME, path)], &[])
    }

    /// Class with its fields (`VarDecl`s) and methods
    pub fn class(
        &mut self,
        name: &str,
        parent: Option<&str>,
        fields: &[NodeId],
        methods: &[NodeId],
    ) -> NodeId {
        let mut children = fields.to_vec();
        children.extend_from_slice(methods);
        let id = self.node(Kind::ClassDecl, &[(attr::NAME, name)], &children);
        if let Some(parent) = parent {
            self.ast.set_attr(id, attr::PARENT, parent);
        }
        id
    }

    pub fn ty(&mut self, name: &str) -> NodeId {
        self.node(Kind::Type, &[(attr::NAME, name)], &[])
    }

    pub fn array_ty(&mut self, name: &str) -> NodeId {
        self.node(Kind::Type, &[(attr::NAME, name), (attr::ARRAY, "true")], &[])
    }

    /// `int...` parameter type
    pub fn vararg_ty(&mut self, name: &str) -> NodeId {
        self.node(
            Kind::Type,
            &[(attr::NAME, name), (attr::ARRAY, "true"), (attr::VAR_ARG, "true")],
            &[],
        )
    }

    pub fn var_decl(&mut self, name: &str, ty: NodeId) -> NodeId {
        self.node(Kind::VarDecl, &[(attr::NAME, name)], &[ty])
    }

    pub fn param(&mut self, name: &str, ty: NodeId) -> NodeId {
        self.node(Kind::Param, &[(attr::NAME, name)], &[ty])
    }

    /// Public instance method
    pub fn method(
        &mut self,
        name: &str,
        return_ty: NodeId,
        params: &[NodeId],
        locals: &[NodeId],
        body: &[NodeId],
    ) -> NodeId {
        self.method_decl(name, return_ty, params, locals, body, false)
    }

    /// Public static method
    pub fn static_method(
        &mut self,
        name: &str,
        return_ty: NodeId,
        params: &[NodeId],
        locals: &[NodeId],
        body: &[NodeId],
    ) -> NodeId {
        self.method_decl(name, return_ty, params, locals, body, true)
    }

    fn method_decl(
        &mut self,
        name: &str,
        return_ty: NodeId,
        params: &[NodeId],
        locals: &[NodeId],
        body: &[NodeId],
        is_static: bool,
    ) -> NodeId {
        let mut children = vec![return_ty];
        children.extend_from_slice(params);
        children.extend_from_slice(locals);
        children.extend_from_slice(body);
        let is_static = if is_static { "true" } else { "false" };
        self.node(
            Kind::MethodDecl,
            &[
                (attr::NAME, name),
                (attr::IS_PUBLIC, "true"),
                (attr::IS_STATIC, is_static),
            ],
            &children,
        )
    }

    /// `public static void main(String[] <args>)`
    pub fn main_method(&mut self, args: &str, locals: &[NodeId], body: &[NodeId]) -> NodeId {
        let mut children = locals.to_vec();
        children.extend_from_slice(body);
        self.node(
            Kind::MainMethodDecl,
            &[(attr::NAME, "main"), (attr::VAR, args)],
            &children,
        )
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    pub fn block(&mut self, stmts: &[NodeId]) -> NodeId {
        self.node(Kind::BlockStmt, &[], stmts)
    }

    pub fn if_stmt(&mut self, cond: NodeId, then_branch: NodeId, else_branch: NodeId) -> NodeId {
        self.node(Kind::IfStmt, &[], &[cond, then_branch, else_branch])
    }

    pub fn while_stmt(&mut self, cond: NodeId, body: NodeId) -> NodeId {
        self.node(Kind::WhileStmt, &[], &[cond, body])
    }

    pub fn expr_stmt(&mut self, expr: NodeId) -> NodeId {
        self.node(Kind::ExprStmt, &[], &[expr])
    }

    pub fn assign(&mut self, name: &str, value: NodeId) -> NodeId {
        self.node(Kind::AssignStmt, &[(attr::NAME, name)], &[value])
    }

    pub fn array_assign(&mut self, name: &str, index: NodeId, value: NodeId) -> NodeId {
        self.node(Kind::ArrayAssignStmt, &[(attr::NAME, name)], &[index, value])
    }

    pub fn ret(&mut self, value: Option<NodeId>) -> NodeId {
        let children: Vec<NodeId> = value.into_iter().collect();
        self.node(Kind::ReturnStmt, &[], &children)
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    pub fn int(&mut self, value: i32) -> NodeId {
        let value = value.to_string();
        self.node(Kind::IntegerLiteral, &[(attr::VALUE, value.as_str())], &[])
    }

    pub fn boolean(&mut self, value: bool) -> NodeId {
        let value = if value { "true" } else { "false" };
        self.node(Kind::BooleanLiteral, &[(attr::VALUE, value)], &[])
    }

    pub fn var(&mut self, name: &str) -> NodeId {
        self.node(Kind::VarRefExpr, &[(attr::NAME, name)], &[])
    }

    pub fn this(&mut self) -> NodeId {
        self.node(Kind::ThisExpr, &[], &[])
    }

    pub fn binary(&mut self, op: &str, left: NodeId, right: NodeId) -> NodeId {
        self.node(Kind::BinaryExpr, &[(attr::OP, op)], &[left, right])
    }

    pub fn not(&mut self, operand: NodeId) -> NodeId {
        self.node(Kind::NotExpr, &[], &[operand])
    }

    pub fn paren(&mut self, inner: NodeId) -> NodeId {
        self.node(Kind::ParenExpr, &[], &[inner])
    }

    /// `receiver.name(args...)`
    pub fn call(&mut self, receiver: NodeId, name: &str, args: &[NodeId]) -> NodeId {
        let mut children = vec![receiver];
        children.extend_from_slice(args);
        self.node(Kind::MethodCallExpr, &[(attr::NAME, name)], &children)
    }

    pub fn new_object(&mut self, class: &str) -> NodeId {
        self.node(Kind::NewObjectExpr, &[(attr::NAME, class)], &[])
    }

    pub fn new_int_array(&mut self, size: NodeId) -> NodeId {
        self.node(Kind::NewIntArrayExpr, &[], &[size])
    }

    pub fn array_access(&mut self, array: NodeId, index: NodeId) -> NodeId {
        self.node(Kind::ArrayAccessExpr, &[], &[array, index])
    }

    pub fn array_length(&mut self, array: NodeId) -> NodeId {
        self.node(Kind::ArrayLengthExpr, &[], &[array])
    }

    /// Array literal `[e0, e1, ...]`
    pub fn array(&mut self, elements: &[NodeId]) -> NodeId {
        self.node(Kind::ArrayExpr, &[], elements)
    }
}
