//! Symbol Table
//!
//! Read-only view of the class being compiled: imports, class and superclass
//! names, fields, and per-method return type, parameters and locals.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ast::{attr, Ast, Kind, NodeId};
use crate::error::{CompileError, CompileResult};

pub const INT: &str = "int";
pub const BOOLEAN: &str = "boolean";
pub const STRING: &str = "String";
pub const VOID: &str = "void";

/// Source-level type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    pub name: String,
    pub is_array: bool,
    /// Last parameter declared as `T...`
    #[serde(default)]
    pub is_vararg: bool,
    /// Name used as a class (static receiver), not as a value
    #[serde(default)]
    pub is_class: bool,
}

impl Type {
    pub fn new(name: impl Into<String>, is_array: bool) -> Self {
        Self {
            name: name.into(),
            is_array,
            is_vararg: false,
            is_class: false,
        }
    }

    pub fn int() -> Self {
        Self::new(INT, false)
    }

    pub fn boolean() -> Self {
        Self::new(BOOLEAN, false)
    }

    pub fn int_array() -> Self {
        Self::new(INT, true)
    }

    pub fn void() -> Self {
        Self::new(VOID, false)
    }

    pub fn vararg(name: impl Into<String>) -> Self {
        Self {
            is_vararg: true,
            ..Self::new(name, true)
        }
    }

    pub fn class_ref(name: impl Into<String>) -> Self {
        Self {
            is_class: true,
            ..Self::new(name, false)
        }
    }

    pub fn is_void(&self) -> bool {
        self.name == VOID && !self.is_array
    }

    /// Read a `Type` node
    pub fn from_node(ast: &Ast, node: NodeId) -> CompileResult<Self> {
        if ast.kind(node) != Kind::Type {
            return Err(CompileError::internal(format!(
                "expected a Type node, found {}",
                ast.kind(node)
            )));
        }
        let name = ast
            .name(node)
            .ok_or_else(|| CompileError::internal("Type node without a name"))?;
        if ast.has_attr(node, attr::VAR_ARG) {
            Ok(Type::vararg(name))
        } else {
            Ok(Type::new(name, ast.has_attr(node, attr::ARRAY)))
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.is_vararg {
            write!(f, "...")
        } else if self.is_array {
            write!(f, "[]")
        } else {
            Ok(())
        }
    }
}

/// Named, typed entity (field, parameter or local)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub ty: Type,
    pub name: String,
}

impl Symbol {
    pub fn new(ty: Type, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }
}

/// Per-class symbol information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    /// Dotted import paths, in declaration order
    pub imports: Vec<String>,
    pub class_name: String,
    /// Empty when the class has no explicit superclass
    pub super_class: String,
    pub fields: Vec<Symbol>,
    pub methods: Vec<String>,
    pub return_types: FxHashMap<String, Type>,
    pub params: FxHashMap<String, Vec<Symbol>>,
    pub locals: FxHashMap<String, Vec<Symbol>>,
    /// Methods declared `static` (including `main`)
    #[serde(default)]
    pub static_methods: Vec<String>,
}

impl SymbolTable {
    /// Collect the symbol table from a `Program` tree
    pub fn from_ast(ast: &Ast) -> CompileResult<Self> {
        let root = ast
            .root()
            .ok_or_else(|| CompileError::internal("AST has no root"))?;
        let class = ast
            .children_of_kind(root, Kind::ClassDecl)
            .next()
            .ok_or_else(|| CompileError::internal("program without a class declaration"))?;

        let mut table = SymbolTable {
            imports: ast
                .children_of_kind(root, Kind::ImportDecl)
                .filter_map(|import| ast.name(import).map(str::to_string))
                .collect(),
            class_name: required_name(ast, class)?.to_string(),
            super_class: ast.attr(class, attr::PARENT).unwrap_or_default().to_string(),
            ..SymbolTable::default()
        };

        for field in ast.children_of_kind(class, Kind::VarDecl) {
            table.fields.push(declared_symbol(ast, field)?);
        }

        for &method in ast.children(class) {
            match ast.kind(method) {
                Kind::MethodDecl => table.add_method(ast, method)?,
                Kind::MainMethodDecl => table.add_main(ast, method)?,
                _ => {}
            }
        }

        Ok(table)
    }

    fn add_method(&mut self, ast: &Ast, method: NodeId) -> CompileResult<()> {
        let name = required_name(ast, method)?.to_string();
        let return_node = ast
            .child(method, 0)
            .ok_or_else(|| CompileError::internal(format!("method '{}' has no return type", name)))?;

        let mut params = Vec::new();
        for param in ast.children_of_kind(method, Kind::Param) {
            params.push(declared_symbol(ast, param)?);
        }
        let mut locals = Vec::new();
        for local in ast.children_of_kind(method, Kind::VarDecl) {
            locals.push(declared_symbol(ast, local)?);
        }

        if ast.flag(method, attr::IS_STATIC) {
            self.static_methods.push(name.clone());
        }
        self.return_types
            .insert(name.clone(), Type::from_node(ast, return_node)?);
        self.params.insert(name.clone(), params);
        self.locals.insert(name.clone(), locals);
        self.methods.push(name);
        Ok(())
    }

    fn add_main(&mut self, ast: &Ast, method: NodeId) -> CompileResult<()> {
        let name = ast.name(method).unwrap_or("main").to_string();
        let args = ast.attr(method, attr::VAR).unwrap_or("args");

        let mut locals = Vec::new();
        for local in ast.children_of_kind(method, Kind::VarDecl) {
            locals.push(declared_symbol(ast, local)?);
        }

        self.return_types.insert(name.clone(), Type::void());
        self.params
            .insert(name.clone(), vec![Symbol::new(Type::new(STRING, true), args)]);
        self.locals.insert(name.clone(), locals);
        self.static_methods.push(name.clone());
        self.methods.push(name);
        Ok(())
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m == name)
    }

    pub fn return_type(&self, method: &str) -> Option<&Type> {
        self.return_types.get(method)
    }

    pub fn parameters(&self, method: &str) -> &[Symbol] {
        self.params.get(method).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn local_variables(&self, method: &str) -> &[Symbol] {
        self.locals.get(method).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_static(&self, method: &str) -> bool {
        self.static_methods.iter().any(|m| m == method)
    }

    pub fn field(&self, name: &str) -> Option<&Symbol> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Local or parameter of `method`
    pub fn local_or_param(&self, method: &str, name: &str) -> Option<&Symbol> {
        self.local_variables(method)
            .iter()
            .chain(self.parameters(method))
            .find(|s| s.name == name)
    }

    pub fn is_local(&self, method: &str, name: &str) -> bool {
        self.local_or_param(method, name).is_some()
    }

    /// Import whose last path segment is `simple_name`
    pub fn import_path(&self, simple_name: &str) -> Option<&str> {
        self.imports
            .iter()
            .find(|path| path.rsplit('.').next() == Some(simple_name))
            .map(String::as_str)
    }

    pub fn is_imported(&self, simple_name: &str) -> bool {
        self.import_path(simple_name).is_some()
    }

    /// Names usable as a class: imports and the class itself
    pub fn is_class_name(&self, name: &str) -> bool {
        name == self.class_name || self.is_imported(name)
    }
}

fn required_name(ast: &Ast, node: NodeId) -> CompileResult<&str> {
    ast.name(node)
        .ok_or_else(|| CompileError::internal(format!("{} node without a name", ast.kind(node))))
}

/// `VarDecl` / `Param` node: name attribute plus a `Type` child
fn declared_symbol(ast: &Ast, node: NodeId) -> CompileResult<Symbol> {
    let name = required_name(ast, node)?;
    let ty_node = ast
        .child(node, 0)
        .ok_or_else(|| CompileError::internal(format!("declaration '{}' has no type", name)))?;
    Ok(Symbol::new(Type::from_node(ast, ty_node)?, name))
}
