//! Expression Lowering
//!
//! Converts AST expressions to IR instructions. Every expression yields an
//! operand; compound expressions leave their value in a fresh temporary.
//!
//! The `expected` type passed down is the type the surrounding context wants.
//! It is only consulted for calls to methods declared outside the class,
//! whose return type is otherwise unknown.

use super::{ir_type, Lowerer};
use crate::ast::{attr, Kind, NodeId};
use crate::error::{CompileError, CompileResult};
use crate::ir::{
    BinaryOp, CallInstr, CallKind, Condition, IrInstr, IrType, Operand, UnaryOp,
};
use crate::typing::is_own_receiver;

impl<'a> Lowerer<'a> {
    /// Lower an expression
    pub(super) fn lower_expr(&mut self, expr: NodeId, expected: &IrType) -> CompileResult<Operand> {
        match self.ast.kind(expr) {
            Kind::IntegerLiteral => Ok(Operand::int(self.literal_value(expr)?)),
            Kind::BooleanLiteral => Ok(Operand::boolean(
                self.ast.attr(expr, attr::VALUE) == Some("true"),
            )),
            Kind::ParenExpr => {
                let inner = self.child(expr, 0)?;
                self.lower_expr(inner, expected)
            }
            Kind::VarRefExpr => self.lower_var_ref(expr),
            Kind::ThisExpr => Ok(self.this_operand()),
            Kind::BinaryExpr => self.lower_binary(expr),
            Kind::NotExpr => self.lower_not(expr),
            Kind::MethodCallExpr => {
                let call = self.lower_call(expr, expected)?;
                let ty = call.return_ty.clone();
                Ok(self.assign_temp(ty, IrInstr::Call(call)))
            }
            Kind::NewObjectExpr => self.lower_new_object(expr),
            Kind::NewIntArrayExpr => {
                let size = self.child(expr, 0)?;
                let size = self.lower_expr(size, &IrType::Int32)?;
                Ok(self.new_array(size))
            }
            Kind::ArrayAccessExpr => self.lower_array_access(expr),
            Kind::ArrayLengthExpr => {
                let array = self.child(expr, 0)?;
                let array = self.lower_expr(array, &IrType::int_array())?;
                let call = CallInstr {
                    kind: CallKind::ArrayLength,
                    caller: array,
                    method: None,
                    args: Vec::new(),
                    return_ty: IrType::Int32,
                };
                Ok(self.assign_temp(IrType::Int32, IrInstr::Call(call)))
            }
            Kind::ArrayExpr => self.lower_array_literal(expr),
            other => Err(CompileError::internal(format!(
                "{} is not an expression",
                other
            ))),
        }
    }

    pub(super) fn child(&self, node: NodeId, index: usize) -> CompileResult<NodeId> {
        self.ast.child(node, index).ok_or_else(|| {
            CompileError::internal(format!(
                "{} is missing child {}",
                self.ast.kind(node),
                index
            ))
        })
    }

    fn literal_value(&self, node: NodeId) -> CompileResult<i32> {
        let value = self.ast.attr(node, attr::VALUE).unwrap_or_default();
        value
            .parse()
            .map_err(|_| CompileError::internal(format!("bad integer literal '{}'", value)))
    }

    pub(super) fn node_name(&self, node: NodeId) -> CompileResult<String> {
        self.ast
            .name(node)
            .map(str::to_string)
            .ok_or_else(|| CompileError::internal(format!("{} without a name", self.ast.kind(node))))
    }

    /// Locals and parameters are operands; fields are read into a temporary;
    /// class names become class references.
    fn lower_var_ref(&mut self, expr: NodeId) -> CompileResult<Operand> {
        let name = self.node_name(expr)?;
        if let Some(ty) = self.local_type(&name) {
            return Ok(Operand::var(name, ty));
        }
        if let Some(ty) = self.field_type(&name) {
            return Ok(self.get_field(&name, ty));
        }
        if self.table.is_class_name(&name) {
            let ty = IrType::ClassRef(name.clone());
            return Ok(Operand::var(name, ty));
        }
        Err(CompileError::unresolved(name))
    }

    pub(super) fn get_field(&mut self, name: &str, ty: IrType) -> Operand {
        let rhs = IrInstr::GetField {
            object: self.this_operand(),
            field: Operand::var(name, ty.clone()),
        };
        self.assign_temp(ty, rhs)
    }

    fn lower_binary(&mut self, expr: NodeId) -> CompileResult<Operand> {
        let op_name = self.ast.attr(expr, attr::OP).unwrap_or_default();
        let op = BinaryOp::from_source(op_name)
            .ok_or_else(|| CompileError::unsupported(format!("operator '{}'", op_name)))?;
        let left = self.child(expr, 0)?;
        let right = self.child(expr, 1)?;

        match op {
            BinaryOp::And => self.lower_and(left, right),
            BinaryOp::Lt => self.lower_less_than(left, right),
            _ => {
                let l = self.lower_expr(left, &IrType::Int32)?;
                let r = self.lower_expr(right, &IrType::Int32)?;
                let rhs = IrInstr::BinaryOp {
                    op,
                    left: l,
                    right: r,
                    ty: IrType::Int32,
                };
                Ok(self.assign_temp(IrType::Int32, rhs))
            }
        }
    }

    /// ```text
    ///     <left>
    ///     if (l) goto true_N
    ///     t := 0
    ///     goto end_N
    /// true_N:
    ///     <right>
    ///     t := r
    /// end_N:
    /// ```
    fn lower_and(&mut self, left: NodeId, right: NodeId) -> CompileResult<Operand> {
        let l = self.lower_expr(left, &IrType::Boolean)?;
        let id = self.next_label_id();
        let true_label = format!("true_{}", id);
        let end_label = format!("end_{}", id);
        let result = self.new_temp(IrType::Boolean);

        self.emit(IrInstr::Branch {
            cond: Condition::Operand(l),
            label: true_label.clone(),
        });
        self.copy(&result, Operand::boolean(false));
        self.emit(IrInstr::Goto {
            label: end_label.clone(),
        });

        self.place_label(true_label);
        let r = self.lower_expr(right, &IrType::Boolean)?;
        self.copy(&result, r);
        self.place_label(end_label);
        Ok(result)
    }

    /// Materialize `l < r` as 0/1 through a conditional branch
    fn lower_less_than(&mut self, left: NodeId, right: NodeId) -> CompileResult<Operand> {
        let l = self.lower_expr(left, &IrType::Int32)?;
        let r = self.lower_expr(right, &IrType::Int32)?;
        let id = self.next_label_id();
        let true_label = format!("true_{}", id);
        let end_label = format!("end_{}", id);
        let result = self.new_temp(IrType::Boolean);

        self.emit(IrInstr::Branch {
            cond: Condition::Binary {
                op: BinaryOp::Lt,
                left: l,
                right: r,
            },
            label: true_label.clone(),
        });
        self.copy(&result, Operand::boolean(false));
        self.emit(IrInstr::Goto {
            label: end_label.clone(),
        });
        self.place_label(true_label);
        self.copy(&result, Operand::boolean(true));
        self.place_label(end_label);
        Ok(result)
    }

    /// `dest := value`
    pub(super) fn copy(&mut self, dest: &Operand, value: Operand) {
        let ty = dest.ty().clone();
        self.emit(IrInstr::Assign {
            dest: dest.clone(),
            ty,
            rhs: Box::new(IrInstr::SingleOp(value)),
        });
    }

    fn lower_not(&mut self, expr: NodeId) -> CompileResult<Operand> {
        let operand = self.child(expr, 0)?;
        let value = self.lower_expr(operand, &IrType::Boolean)?;
        let rhs = IrInstr::UnaryOp {
            op: UnaryOp::Not,
            operand: value,
            ty: IrType::Boolean,
        };
        Ok(self.assign_temp(IrType::Boolean, rhs))
    }

    /// Build the call for a `MethodCallExpr` without binding its result
    pub(super) fn lower_call(&mut self, expr: NodeId, expected: &IrType) -> CompileResult<CallInstr> {
        let name = self.node_name(expr)?;
        let receiver = self.child(expr, 0)?;
        let args: Vec<NodeId> = self.ast.children(expr)[1..].to_vec();

        let static_class = self.static_receiver(receiver);
        let own_method = self.table.has_method(&name)
            && (static_class.as_deref() == Some(self.table.class_name.as_str())
                || is_own_receiver(self.ast, receiver, self.table));

        let (kind, caller) = match static_class {
            Some(class) => {
                let ty = IrType::ClassRef(class.clone());
                (CallKind::InvokeStatic, Operand::var(class, ty))
            }
            None => {
                let object_ty = IrType::ObjectRef("Object".to_string());
                let caller = self.lower_expr(receiver, &object_ty)?;
                (CallKind::InvokeVirtual, caller)
            }
        };

        let param_types: Vec<IrType> = if own_method {
            self.table
                .parameters(&name)
                .iter()
                .map(|p| ir_type(&p.ty))
                .collect()
        } else {
            Vec::new()
        };
        let mut lowered_args = Vec::with_capacity(args.len());
        for (i, arg) in args.into_iter().enumerate() {
            let expected_arg = param_types.get(i).cloned().unwrap_or(IrType::Int32);
            lowered_args.push(self.lower_expr(arg, &expected_arg)?);
        }

        let return_ty = if own_method {
            self.table
                .return_type(&name)
                .map(ir_type)
                .unwrap_or_else(|| expected.clone())
        } else {
            // Unknown signature: take the type the context expects
            expected.clone()
        };

        Ok(CallInstr {
            kind,
            caller,
            method: Some(name),
            args: lowered_args,
            return_ty,
        })
    }

    /// Class name used as the receiver of a static call: an import or the
    /// class itself, not shadowed by a local, parameter or (in an instance
    /// method) a field.
    fn static_receiver(&self, receiver: NodeId) -> Option<String> {
        if self.ast.kind(receiver) != Kind::VarRefExpr {
            return None;
        }
        let name = self.ast.name(receiver)?;
        if !self.table.is_class_name(name) || self.local_type(name).is_some() {
            return None;
        }
        if self.table.is_field(name) && !self.ctx.is_static {
            return None;
        }
        Some(name.to_string())
    }

    fn lower_new_object(&mut self, expr: NodeId) -> CompileResult<Operand> {
        let class = self.node_name(expr)?;
        let ty = IrType::ObjectRef(class.clone());
        let new = CallInstr {
            kind: CallKind::New,
            caller: Operand::var(class.clone(), IrType::ClassRef(class)),
            method: None,
            args: Vec::new(),
            return_ty: ty.clone(),
        };
        let object = self.assign_temp(ty, IrInstr::Call(new));
        self.emit(IrInstr::Call(CallInstr {
            kind: CallKind::InvokeSpecial,
            caller: object.clone(),
            method: Some("<init>".to_string()),
            args: Vec::new(),
            return_ty: IrType::Void,
        }));
        Ok(object)
    }

    fn new_array(&mut self, size: Operand) -> Operand {
        let ty = IrType::int_array();
        let call = CallInstr {
            kind: CallKind::New,
            caller: Operand::var("array", IrType::ClassRef("array".to_string())),
            method: None,
            args: vec![size],
            return_ty: ty.clone(),
        };
        self.assign_temp(ty, IrInstr::Call(call))
    }

    /// Name of the variable holding an array value, copying it into a
    /// temporary when it is not a plain variable
    pub(super) fn array_name(&mut self, array: Operand) -> String {
        match array {
            Operand::Var { name, .. } => name,
            other => {
                let ty = other.ty().clone();
                let temp = self.assign_temp(ty, IrInstr::SingleOp(other));
                temp.name().unwrap_or_default().to_string()
            }
        }
    }

    fn lower_array_access(&mut self, expr: NodeId) -> CompileResult<Operand> {
        let array = self.child(expr, 0)?;
        let index = self.child(expr, 1)?;
        let array = self.lower_expr(array, &IrType::int_array())?;
        let elem_ty = array.ty().element().clone();
        let index = self.lower_expr(index, &IrType::Int32)?;
        let name = self.array_name(array);
        let element = Operand::element(name, index, elem_ty.clone());
        Ok(self.assign_temp(elem_ty, IrInstr::SingleOp(element)))
    }

    /// `[e0, e1, ...]`: allocate, then store each element
    fn lower_array_literal(&mut self, expr: NodeId) -> CompileResult<Operand> {
        let elements: Vec<NodeId> = self.ast.children(expr).to_vec();
        let array = self.new_array(Operand::int(elements.len() as i32));
        let name = array.name().unwrap_or_default().to_string();

        for (i, element) in elements.into_iter().enumerate() {
            let value = self.lower_expr(element, &IrType::Int32)?;
            let slot = Operand::element(name.clone(), Operand::int(i as i32), IrType::Int32);
            self.copy(&slot, value);
        }
        Ok(array)
    }
}
