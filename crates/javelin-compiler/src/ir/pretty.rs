//! Pretty-printing for IR
//!
//! Provides human-readable output for debugging IR structures.

use super::instr::{CallInstr, Condition, IrInstr, UnaryOp};
use super::method::IrMethod;
use super::module::IrClass;
use std::fmt;

/// Trait for pretty-printing IR constructs
pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for IrClass {
    fn pretty_print(&self) -> String {
        let mut output = String::new();
        for import in &self.imports {
            output.push_str(&format!("import {};\n", import));
        }
        if !self.imports.is_empty() {
            output.push('\n');
        }

        match &self.super_class {
            Some(parent) => output.push_str(&format!("{} extends {} {{\n", self.name, parent)),
            None => output.push_str(&format!("{} {{\n", self.name)),
        }
        for field in &self.fields {
            output.push_str(&format!("    .field public {}.{};\n", field.name, field.ty));
        }
        for method in &self.methods {
            output.push('\n');
            for line in method.pretty_print().lines() {
                output.push_str("    ");
                output.push_str(line);
                output.push('\n');
            }
        }
        output.push_str("}\n");
        output
    }
}

impl PrettyPrint for IrMethod {
    fn pretty_print(&self) -> String {
        let mut output = String::new();

        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{}.{}", p.name, p.ty))
            .collect();
        let mut modifiers = String::new();
        if self.is_public {
            modifiers.push_str("public ");
        }
        if self.is_static {
            modifiers.push_str("static ");
        }
        output.push_str(&format!(
            ".method {}{}({}).{} {{\n",
            modifiers,
            self.name,
            params.join(", "),
            self.return_ty
        ));

        for (i, instr) in self.instructions.iter().enumerate() {
            for label in self.labels_at(i) {
                output.push_str(&format!("  {}:\n", label));
            }
            output.push_str(&format!("    {};\n", instr));
        }
        for label in self.labels_at(self.instructions.len()) {
            output.push_str(&format!("  {}:\n", label));
        }

        output.push_str("}\n");
        output
    }
}

impl fmt::Display for CallInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}", self.kind.name(), self.caller)?;
        if let Some(method) = &self.method {
            write!(f, ", \"{}\"", method)?;
        }
        for arg in &self.args {
            write!(f, ", {}", arg)?;
        }
        write!(f, ").{}", self.return_ty)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Operand(op) => write!(f, "{}", op),
            Condition::Binary { op, left, right } => {
                write!(f, "{} {}.{} {}", left, op.symbol(), op.result_type(), right)
            }
        }
    }
}

impl fmt::Display for IrInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrInstr::Assign { dest, ty, rhs } => write!(f, "{} :=.{} {}", dest, ty, rhs),
            IrInstr::BinaryOp {
                op,
                left,
                right,
                ty,
            } => write!(f, "{} {}.{} {}", left, op.symbol(), ty, right),
            IrInstr::UnaryOp { op, operand, ty } => match op {
                UnaryOp::Not => write!(f, "!.{} {}", ty, operand),
            },
            IrInstr::Call(call) => write!(f, "{}", call),
            IrInstr::GetField { object, field } => {
                write!(f, "getfield({}, {}).{}", object, field, field.ty())
            }
            IrInstr::PutField {
                object,
                field,
                value,
            } => write!(f, "putfield({}, {}, {}).V", object, field, value),
            IrInstr::Branch { cond, label } => write!(f, "if ({}) goto {}", cond, label),
            IrInstr::Goto { label } => write!(f, "goto {}", label),
            IrInstr::Return { value, ty } => match value {
                Some(value) => write!(f, "ret.{} {}", ty, value),
                None => write!(f, "ret.{}", ty),
            },
            IrInstr::SingleOp(op) => write!(f, "{}", op),
        }
    }
}
