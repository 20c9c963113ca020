//! IR Class
//!
//! Top-level container for one compiled class.

use super::method::IrMethod;
use super::value::IrType;

/// A class field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrField {
    pub name: String,
    pub ty: IrType,
}

/// An IR class (compilation unit)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrClass {
    pub name: String,
    /// Explicit superclass, if any
    pub super_class: Option<String>,
    /// Dotted import paths
    pub imports: Vec<String>,
    pub fields: Vec<IrField>,
    pub methods: Vec<IrMethod>,
}

impl IrClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_class: None,
            imports: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn method(&self, name: &str) -> Option<&IrMethod> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn method_mut(&mut self, name: &str) -> Option<&mut IrMethod> {
        self.methods.iter_mut().find(|m| m.name == name)
    }

    /// Full import path whose last segment is `simple_name`
    pub fn import_path(&self, simple_name: &str) -> Option<&str> {
        self.imports
            .iter()
            .find(|path| path.rsplit('.').next() == Some(simple_name))
            .map(String::as_str)
    }
}
