//! Code Generator Context
//!
//! Manages state during assembly generation from IR.

use super::emit::{
    arithmetic, class_path, compare_jump, descriptor, load, method_descriptor, push_int,
    return_instr, store,
};
use crate::error::{CompileError, CompileResult};
use crate::ir::{
    BinaryOp, CallInstr, CallKind, Condition, IrClass, IrInstr, IrMethod, IrType, Operand,
    UnaryOp,
};

const INDENT: &str = "    ";

/// Assembly generator for one class
pub struct JasminGenerator<'c> {
    class: &'c IrClass,
}

/// Context for compiling a single method
struct MethodContext<'m> {
    method: &'m IrMethod,
    /// Instruction lines, without indentation; labels end in `:`
    lines: Vec<String>,
    /// Current operand stack height
    height: i32,
    /// Highest height reached
    max_height: i32,
    /// Counter for comparison labels
    next_cmp: usize,
}

impl<'m> MethodContext<'m> {
    fn new(method: &'m IrMethod) -> Self {
        Self {
            method,
            lines: Vec::new(),
            height: 0,
            max_height: 0,
            next_cmp: 0,
        }
    }

    /// Emit an instruction that pops `pops` slots and pushes `pushes`
    fn emit(&mut self, instr: impl Into<String>, pops: i32, pushes: i32) {
        self.lines.push(instr.into());
        self.height -= pops;
        self.height += pushes;
        self.max_height = self.max_height.max(self.height);
    }

    fn label(&mut self, name: &str) {
        self.lines.push(format!("{}:", name));
    }

    fn register(&self, name: &str) -> CompileResult<u32> {
        self.method
            .var_table
            .register(name)
            .ok_or_else(|| CompileError::unresolved(name))
    }

    /// Local slots needed: one past the highest register in use, and at
    /// least the reserved `this`/parameter slots
    fn limit_locals(&self) -> u32 {
        let reserved = self.method.reserved_registers();
        self.method
            .var_table
            .max_register()
            .map_or(reserved, |max| (max + 1).max(reserved))
    }
}

impl<'c> JasminGenerator<'c> {
    pub fn new(class: &'c IrClass) -> Self {
        Self { class }
    }

    /// Generate the assembly text of the whole class
    pub fn generate(&self) -> CompileResult<String> {
        let class = self.class;
        let super_class = class
            .super_class
            .as_deref()
            .map_or_else(|| "java/lang/Object".to_string(), |s| class_path(class, s));

        let mut out = String::new();
        out.push_str(&format!(".class public {}\n", class.name));
        out.push_str(&format!(".super {}\n", super_class));

        if !class.fields.is_empty() {
            out.push('\n');
        }
        for field in &class.fields {
            out.push_str(&format!(
                ".field public '{}' {}\n",
                field.name,
                descriptor(class, &field.ty)?
            ));
        }

        out.push_str("\n; default constructor\n");
        out.push_str(".method public <init>()V\n");
        out.push_str(&format!("{}aload_0\n", INDENT));
        out.push_str(&format!("{}invokespecial {}/<init>()V\n", INDENT, super_class));
        out.push_str(&format!("{}return\n", INDENT));
        out.push_str(".end method\n");

        for method in &class.methods {
            out.push('\n');
            out.push_str(&self.generate_method(method)?);
        }

        Ok(out)
    }

    fn generate_method(&self, method: &IrMethod) -> CompileResult<String> {
        let mut ctx = MethodContext::new(method);

        for (index, instr) in method.instructions.iter().enumerate() {
            for label in method.labels_at(index) {
                ctx.label(label);
            }
            self.generate_instr(&mut ctx, instr)?;

            // A value left by a call at statement position is unused
            if let IrInstr::Call(call) = instr {
                if call.kind.produces_value(&call.return_ty) {
                    ctx.emit("pop", 1, 0);
                }
            }
        }
        for label in method.labels_at(method.instructions.len()) {
            ctx.label(label);
        }

        if ctx.height != 0 {
            log::debug!(
                "{}: operand stack ends at height {}",
                method.name,
                ctx.height
            );
        }

        let mut modifiers = String::new();
        if method.is_public {
            modifiers.push_str("public ");
        }
        if method.is_static {
            modifiers.push_str("static ");
        }
        let params: Vec<&IrType> = method.params.iter().map(|p| &p.ty).collect();

        let mut out = format!(
            ".method {}{}{}\n",
            modifiers,
            method.name,
            method_descriptor(self.class, params, &method.return_ty)?
        );
        out.push_str(&format!("{}.limit stack {}\n", INDENT, ctx.max_height));
        out.push_str(&format!("{}.limit locals {}\n", INDENT, ctx.limit_locals()));
        for line in &ctx.lines {
            if line.ends_with(':') {
                out.push_str(&format!("  {}\n", line));
            } else {
                out.push_str(&format!("{}{}\n", INDENT, line));
            }
        }
        out.push_str(".end method\n");
        Ok(out)
    }

    fn generate_instr(&self, ctx: &mut MethodContext<'_>, instr: &IrInstr) -> CompileResult<()> {
        match instr {
            IrInstr::Assign { dest, rhs, .. } => self.generate_assign(ctx, dest, rhs),
            IrInstr::Call(call) => self.generate_call(ctx, call),
            IrInstr::PutField {
                object,
                field,
                value,
            } => {
                let is_static = is_class_qualified(object);
                if !is_static {
                    self.load_operand(ctx, object)?;
                }
                self.load_operand(ctx, value)?;
                let (opcode, pops) = if is_static {
                    ("putstatic", 1)
                } else {
                    ("putfield", 2)
                };
                let member = self.field_ref(object, field)?;
                ctx.emit(format!("{} {}", opcode, member), pops, 0);
                Ok(())
            }
            IrInstr::Branch { cond, label } => {
                match cond {
                    Condition::Operand(op) => {
                        self.load_operand(ctx, op)?;
                        ctx.emit(format!("ifne {}", label), 1, 0);
                    }
                    Condition::Binary { op, left, right } => match compare_jump(*op) {
                        Some(jump) => {
                            self.load_operand(ctx, left)?;
                            self.load_operand(ctx, right)?;
                            ctx.emit("isub", 2, 1);
                            ctx.emit(format!("{} {}", jump, label), 1, 0);
                        }
                        None => {
                            self.generate_binary(ctx, *op, left, right)?;
                            ctx.emit(format!("ifne {}", label), 1, 0);
                        }
                    },
                }
                Ok(())
            }
            IrInstr::Goto { label } => {
                ctx.emit(format!("goto {}", label), 0, 0);
                Ok(())
            }
            IrInstr::Return { value, ty } => {
                let pops = match value {
                    Some(value) => {
                        self.load_operand(ctx, value)?;
                        1
                    }
                    None => 0,
                };
                ctx.emit(return_instr(ty), pops, 0);
                Ok(())
            }
            // Value-producing instructions outside an assignment
            other => {
                self.generate_value(ctx, other)?;
                ctx.emit("pop", 1, 0);
                Ok(())
            }
        }
    }

    fn generate_assign(
        &self,
        ctx: &mut MethodContext<'_>,
        dest: &Operand,
        rhs: &IrInstr,
    ) -> CompileResult<()> {
        match dest {
            Operand::Var { name, ty } => {
                if let Some(delta) = increment(name, ty, rhs) {
                    let register = ctx.register(name)?;
                    ctx.emit(format!("iinc {} {}", register, delta), 0, 0);
                    return Ok(());
                }
                self.generate_value(ctx, rhs)?;
                let register = ctx.register(name)?;
                ctx.emit(store(ty, register)?, 1, 0);
                Ok(())
            }
            Operand::ArrayElement { name, index, ty } => {
                let register = ctx.register(name)?;
                ctx.emit(load(&IrType::Array(Box::new(ty.clone())), register)?, 0, 1);
                self.load_operand(ctx, index)?;
                self.generate_value(ctx, rhs)?;
                ctx.emit("iastore", 3, 0);
                Ok(())
            }
            Operand::Literal { .. } => Err(CompileError::internal("assignment to a literal")),
        }
    }

    /// Emit code leaving the value of `instr` on the stack
    fn generate_value(&self, ctx: &mut MethodContext<'_>, instr: &IrInstr) -> CompileResult<()> {
        match instr {
            IrInstr::SingleOp(op) => self.load_operand(ctx, op),
            IrInstr::BinaryOp {
                op, left, right, ..
            } => self.generate_binary(ctx, *op, left, right),
            IrInstr::UnaryOp {
                op: UnaryOp::Not,
                operand,
                ..
            } => {
                self.load_operand(ctx, operand)?;
                ctx.emit("iconst_1", 0, 1);
                ctx.emit("ixor", 2, 1);
                Ok(())
            }
            IrInstr::Call(call) => {
                self.generate_call(ctx, call)?;
                if !call.kind.produces_value(&call.return_ty) {
                    return Err(CompileError::internal(format!(
                        "{} used as a value",
                        call.kind.name()
                    )));
                }
                Ok(())
            }
            IrInstr::GetField { object, field } => {
                let member = self.field_ref(object, field)?;
                if is_class_qualified(object) {
                    ctx.emit(format!("getstatic {}", member), 0, 1);
                } else {
                    self.load_operand(ctx, object)?;
                    ctx.emit(format!("getfield {}", member), 1, 1);
                }
                Ok(())
            }
            other => Err(CompileError::internal(format!(
                "'{}' does not produce a value",
                other
            ))),
        }
    }

    fn generate_binary(
        &self,
        ctx: &mut MethodContext<'_>,
        op: BinaryOp,
        left: &Operand,
        right: &Operand,
    ) -> CompileResult<()> {
        self.load_operand(ctx, left)?;
        self.load_operand(ctx, right)?;

        if let Some(instr) = arithmetic(op) {
            ctx.emit(instr, 2, 1);
            return Ok(());
        }

        let jump = compare_jump(op)
            .ok_or_else(|| CompileError::unsupported(format!("operator '{}'", op.symbol())))?;
        let id = ctx.next_cmp;
        ctx.next_cmp += 1;
        let true_label = format!("cmp_{}_true", id);
        let end_label = format!("cmp_{}_end", id);

        ctx.emit("isub", 2, 1);
        ctx.emit(format!("{} {}", jump, true_label), 1, 0);
        ctx.emit("iconst_0", 0, 1);
        ctx.emit(format!("goto {}", end_label), 0, 0);
        // The true path starts without the 0 pushed above
        ctx.height -= 1;
        ctx.label(&true_label);
        ctx.emit("iconst_1", 0, 1);
        ctx.label(&end_label);
        Ok(())
    }

    fn generate_call(&self, ctx: &mut MethodContext<'_>, call: &CallInstr) -> CompileResult<()> {
        let argc = call.args.len() as i32;
        let method_name = call.method.as_deref().unwrap_or_default();

        match call.kind {
            CallKind::New => match &call.return_ty {
                IrType::Array(_) => {
                    let size = call
                        .args
                        .first()
                        .ok_or_else(|| CompileError::internal("array allocation without a size"))?;
                    self.load_operand(ctx, size)?;
                    ctx.emit("newarray int", 1, 1);
                }
                ty => {
                    let name = match ty {
                        IrType::ObjectRef(name) => name.as_str(),
                        _ => call.caller.name().unwrap_or_default(),
                    };
                    ctx.emit(format!("new {}", class_path(self.class, name)), 0, 1);
                }
            },
            CallKind::InvokeSpecial => {
                self.load_operand(ctx, &call.caller)?;
                self.load_args(ctx, &call.args)?;
                let owner = self.owner_path(call.caller.ty());
                let desc = self.call_descriptor(call)?;
                ctx.emit(format!("invokespecial {}/<init>{}", owner, desc), argc + 1, 0);
            }
            CallKind::InvokeVirtual => {
                self.load_operand(ctx, &call.caller)?;
                self.load_args(ctx, &call.args)?;
                let owner = self.owner_path(call.caller.ty());
                let desc = self.call_descriptor(call)?;
                let pushes = i32::from(!call.return_ty.is_void());
                ctx.emit(
                    format!("invokevirtual {}/{}{}", owner, method_name, desc),
                    argc + 1,
                    pushes,
                );
            }
            CallKind::InvokeStatic => {
                self.load_args(ctx, &call.args)?;
                let owner = self.owner_path(call.caller.ty());
                let desc = self.call_descriptor(call)?;
                let pushes = i32::from(!call.return_ty.is_void());
                ctx.emit(
                    format!("invokestatic {}/{}{}", owner, method_name, desc),
                    argc,
                    pushes,
                );
            }
            CallKind::ArrayLength => {
                self.load_operand(ctx, &call.caller)?;
                ctx.emit("arraylength", 1, 1);
            }
        }
        Ok(())
    }

    fn load_args(&self, ctx: &mut MethodContext<'_>, args: &[Operand]) -> CompileResult<()> {
        for arg in args {
            self.load_operand(ctx, arg)?;
        }
        Ok(())
    }

    fn call_descriptor(&self, call: &CallInstr) -> CompileResult<String> {
        method_descriptor(
            self.class,
            call.args.iter().map(Operand::ty),
            &call.return_ty,
        )
    }

    /// `owner/name descriptor` operand of a field instruction
    fn field_ref(&self, object: &Operand, field: &Operand) -> CompileResult<String> {
        Ok(format!(
            "{}/{} {}",
            self.owner_path(object.ty()),
            field.name().unwrap_or_default(),
            descriptor(self.class, field.ty())?
        ))
    }

    /// Internal name of the class owning a member accessed through `ty`
    fn owner_path(&self, ty: &IrType) -> String {
        match ty {
            IrType::This(_) => self.class.name.clone(),
            IrType::ObjectRef(name) | IrType::ClassRef(name) => class_path(self.class, name),
            IrType::String => "java/lang/String".to_string(),
            _ => "java/lang/Object".to_string(),
        }
    }

    /// Push the value of an operand
    fn load_operand(&self, ctx: &mut MethodContext<'_>, op: &Operand) -> CompileResult<()> {
        match op {
            Operand::Literal { value, .. } => {
                ctx.emit(push_int(*value), 0, 1);
                Ok(())
            }
            Operand::Var { name, ty } => {
                let register = match ty {
                    IrType::This(_) => 0,
                    _ => ctx.register(name)?,
                };
                ctx.emit(load(ty, register)?, 0, 1);
                Ok(())
            }
            Operand::ArrayElement { name, index, ty } => {
                let register = ctx.register(name)?;
                ctx.emit(load(&IrType::Array(Box::new(ty.clone())), register)?, 0, 1);
                self.load_operand(ctx, index)?;
                ctx.emit("iaload", 2, 1);
                Ok(())
            }
        }
    }
}

/// Field access through a class name rather than an instance
fn is_class_qualified(object: &Operand) -> bool {
    matches!(object.ty(), IrType::ClassRef(_))
}

/// `x := x + c`, `x := c + x` or `x := x - c` with the result in `iinc` range
fn increment(name: &str, ty: &IrType, rhs: &IrInstr) -> Option<i32> {
    if *ty != IrType::Int32 {
        return None;
    }
    let IrInstr::BinaryOp {
        op, left, right, ..
    } = rhs
    else {
        return None;
    };
    let is_target = |op: &Operand| matches!(op, Operand::Var { name: n, .. } if n == name);
    let literal = |op: &Operand| match op {
        Operand::Literal { value, .. } => Some(*value),
        _ => None,
    };

    let delta = match op {
        BinaryOp::Add if is_target(left) => literal(right)?,
        BinaryOp::Add if is_target(right) => literal(left)?,
        BinaryOp::Sub if is_target(left) => literal(right)?.checked_neg()?,
        _ => return None,
    };
    (-128..=127).contains(&delta).then_some(delta)
}
