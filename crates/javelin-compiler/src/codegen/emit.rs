//! Instruction Text Helpers
//!
//! Helper functions for the textual forms of common JVM instructions.

use crate::error::{CompileError, CompileResult};
use crate::ir::{BinaryOp, IrClass, IrType};

/// Push an integer constant using the shortest form
pub fn push_int(value: i32) -> String {
    match value {
        -1 => "iconst_m1".to_string(),
        0..=5 => format!("iconst_{}", value),
        -128..=127 => format!("bipush {}", value),
        -32768..=32767 => format!("sipush {}", value),
        _ => format!("ldc {}", value),
    }
}

/// Slots 0-3 have one-byte forms
fn slot_suffix(register: u32) -> String {
    if register <= 3 {
        format!("_{}", register)
    } else {
        format!(" {}", register)
    }
}

/// `iload`/`aload` for a value of `ty` in `register`
pub fn load(ty: &IrType, register: u32) -> CompileResult<String> {
    match ty {
        IrType::Int32 | IrType::Boolean => Ok(format!("iload{}", slot_suffix(register))),
        IrType::This(_) => Ok("aload_0".to_string()),
        t if t.is_reference() => Ok(format!("aload{}", slot_suffix(register))),
        other => Err(CompileError::unsupported(format!("load of {}", other))),
    }
}

/// `istore`/`astore` for a value of `ty` into `register`
pub fn store(ty: &IrType, register: u32) -> CompileResult<String> {
    match ty {
        IrType::Int32 | IrType::Boolean => Ok(format!("istore{}", slot_suffix(register))),
        IrType::This(_) => Ok("astore_0".to_string()),
        t if t.is_reference() => Ok(format!("astore{}", slot_suffix(register))),
        other => Err(CompileError::unsupported(format!("store of {}", other))),
    }
}

/// Return instruction for a method returning `ty`
pub fn return_instr(ty: &IrType) -> &'static str {
    match ty {
        IrType::Void => "return",
        IrType::Int32 | IrType::Boolean => "ireturn",
        _ => "areturn",
    }
}

/// Arithmetic or bitwise instruction for a non-comparison operator.
/// `&&` over two evaluated booleans is a bitwise and.
pub fn arithmetic(op: BinaryOp) -> Option<&'static str> {
    match op {
        BinaryOp::Add => Some("iadd"),
        BinaryOp::Sub => Some("isub"),
        BinaryOp::Mul => Some("imul"),
        BinaryOp::Div => Some("idiv"),
        BinaryOp::And => Some("iand"),
        _ => None,
    }
}

/// Jump taken when `left - right` satisfies the comparison
pub fn compare_jump(op: BinaryOp) -> Option<&'static str> {
    (op == BinaryOp::Lt).then_some("iflt")
}

/// Internal name of a class: an imported class uses its slash-separated
/// import path; `Object` and `String` map to `java/lang`.
pub fn class_path(class: &IrClass, simple_name: &str) -> String {
    if let Some(path) = class.import_path(simple_name) {
        return path.replace('.', "/");
    }
    match simple_name {
        "Object" | "String" if simple_name != class.name => format!("java/lang/{}", simple_name),
        _ => simple_name.to_string(),
    }
}

/// Field or parameter descriptor
pub fn descriptor(class: &IrClass, ty: &IrType) -> CompileResult<String> {
    Ok(match ty {
        IrType::Int32 => "I".to_string(),
        IrType::Boolean => "Z".to_string(),
        IrType::Void => "V".to_string(),
        IrType::String => "Ljava/lang/String;".to_string(),
        IrType::Array(inner) => match inner.as_ref() {
            IrType::Int32 => "[I".to_string(),
            IrType::String => "[Ljava/lang/String;".to_string(),
            other => return Err(CompileError::unsupported(format!("array of {}", other))),
        },
        IrType::ObjectRef(name) | IrType::ClassRef(name) | IrType::This(name) => {
            format!("L{};", class_path(class, name))
        }
    })
}

/// `(args)ret` method descriptor
pub fn method_descriptor<'t>(
    class: &IrClass,
    params: impl IntoIterator<Item = &'t IrType>,
    ret: &IrType,
) -> CompileResult<String> {
    let mut out = String::from("(");
    for ty in params {
        out.push_str(&descriptor(class, ty)?);
    }
    out.push(')');
    out.push_str(&descriptor(class, ret)?);
    Ok(out)
}
