//! AST node kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of node kinds produced by the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    // Declarations
    Program,
    ImportDecl,
    ClassDecl,
    VarDecl,
    Type,
    MethodDecl,
    MainMethodDecl,
    Param,

    // Statements
    BlockStmt,
    IfStmt,
    WhileStmt,
    ExprStmt,
    AssignStmt,
    ArrayAssignStmt,
    ReturnStmt,

    // Expressions
    BinaryExpr,
    NotExpr,
    ParenExpr,
    IntegerLiteral,
    BooleanLiteral,
    VarRefExpr,
    ThisExpr,
    MethodCallExpr,
    NewObjectExpr,
    NewIntArrayExpr,
    ArrayAccessExpr,
    ArrayLengthExpr,
    ArrayExpr,
}

impl Kind {
    pub fn is_method(self) -> bool {
        matches!(self, Kind::MethodDecl | Kind::MainMethodDecl)
    }

    pub fn is_literal(self) -> bool {
        matches!(self, Kind::IntegerLiteral | Kind::BooleanLiteral)
    }

    pub fn is_statement(self) -> bool {
        matches!(
            self,
            Kind::BlockStmt
                | Kind::IfStmt
                | Kind::WhileStmt
                | Kind::ExprStmt
                | Kind::AssignStmt
                | Kind::ArrayAssignStmt
                | Kind::ReturnStmt
        )
    }

    pub fn is_expression(self) -> bool {
        matches!(
            self,
            Kind::BinaryExpr
                | Kind::NotExpr
                | Kind::ParenExpr
                | Kind::IntegerLiteral
                | Kind::BooleanLiteral
                | Kind::VarRefExpr
                | Kind::ThisExpr
                | Kind::MethodCallExpr
                | Kind::NewObjectExpr
                | Kind::NewIntArrayExpr
                | Kind::ArrayAccessExpr
                | Kind::ArrayLengthExpr
                | Kind::ArrayExpr
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
