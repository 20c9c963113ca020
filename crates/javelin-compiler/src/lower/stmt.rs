//! Statement Lowering
//!
//! Converts AST statements to IR instructions.

use super::Lowerer;
use crate::ast::{Kind, NodeId};
use crate::error::{CompileError, CompileResult};
use crate::ir::{Condition, IrInstr, IrType, Operand};

impl<'a> Lowerer<'a> {
    /// Lower a statement
    pub(super) fn lower_stmt(&mut self, stmt: NodeId) -> CompileResult<()> {
        match self.ast.kind(stmt) {
            Kind::BlockStmt => {
                let children = self.ast.children(stmt).to_vec();
                for child in children {
                    self.lower_stmt(child)?;
                }
                Ok(())
            }
            Kind::ExprStmt => self.lower_expr_stmt(stmt),
            Kind::AssignStmt => self.lower_assign(stmt),
            Kind::ArrayAssignStmt => self.lower_array_assign(stmt),
            Kind::ReturnStmt => self.lower_return(stmt),
            Kind::IfStmt => self.lower_if(stmt),
            Kind::WhileStmt => self.lower_while(stmt),
            other => Err(CompileError::internal(format!(
                "{} is not a statement",
                other
            ))),
        }
    }

    fn lower_expr_stmt(&mut self, stmt: NodeId) -> CompileResult<()> {
        let mut expr = self.child(stmt, 0)?;
        while self.ast.kind(expr) == Kind::ParenExpr {
            expr = self.child(expr, 0)?;
        }

        if self.ast.kind(expr) == Kind::MethodCallExpr {
            // The result, if any, is discarded
            let call = self.lower_call(expr, &IrType::Void)?;
            self.emit(IrInstr::Call(call));
        } else {
            self.lower_expr(expr, &IrType::Void)?;
        }
        Ok(())
    }

    fn lower_assign(&mut self, stmt: NodeId) -> CompileResult<()> {
        let name = self.node_name(stmt)?;
        let value = self.child(stmt, 0)?;

        if let Some(ty) = self.local_type(&name) {
            let mark = self.ctx.temps.len();
            let result = self.lower_expr(value, &ty)?;
            let target = Operand::var(name, ty.clone());
            if !self.retarget(&result, mark, &target) {
                self.emit(IrInstr::Assign {
                    dest: target,
                    ty,
                    rhs: Box::new(IrInstr::SingleOp(result)),
                });
            }
            return Ok(());
        }

        if let Some(ty) = self.field_type(&name) {
            let result = self.lower_expr(value, &ty)?;
            self.emit(IrInstr::PutField {
                object: self.this_operand(),
                field: Operand::var(name, ty),
                value: result,
            });
            return Ok(());
        }

        Err(CompileError::unresolved(name))
    }

    /// Make the instruction that computed `result` write `target` directly.
    ///
    /// Only applies when `result` is a temporary created for this statement,
    /// the last instruction is its single assignment, and no label points
    /// past that instruction.
    fn retarget(&mut self, result: &Operand, mark: usize, target: &Operand) -> bool {
        let Operand::Var { name, .. } = result else {
            return false;
        };
        if !self.ctx.pending_labels.is_empty() || !self.is_temp_since(name, mark) {
            return false;
        }
        match self.ctx.instructions.last_mut() {
            Some(IrInstr::Assign {
                dest: dest @ Operand::Var { .. },
                ..
            }) if dest.name() == Some(name.as_str()) => {
                *dest = target.clone();
                true
            }
            _ => false,
        }
    }

    fn lower_array_assign(&mut self, stmt: NodeId) -> CompileResult<()> {
        let name = self.node_name(stmt)?;
        let index = self.child(stmt, 0)?;
        let value = self.child(stmt, 1)?;

        let array = if let Some(ty) = self.local_type(&name) {
            Operand::var(name, ty)
        } else if let Some(ty) = self.field_type(&name) {
            self.get_field(&name, ty)
        } else {
            return Err(CompileError::unresolved(name));
        };

        let elem_ty = array.ty().element().clone();
        let index = self.lower_expr(index, &IrType::Int32)?;
        let value = self.lower_expr(value, &elem_ty)?;
        let array = self.array_name(array);
        let slot = Operand::element(array, index, elem_ty);
        self.copy(&slot, value);
        Ok(())
    }

    fn lower_return(&mut self, stmt: NodeId) -> CompileResult<()> {
        let ty = self.method_return_type();
        let value = match self.ast.child(stmt, 0) {
            Some(expr) => Some(self.lower_expr(expr, &ty)?),
            None => None,
        };
        let ty = if value.is_some() { ty } else { IrType::Void };
        self.emit(IrInstr::Return { value, ty });
        Ok(())
    }

    /// ```text
    ///     <cond>
    ///     if (c) goto if_then_N
    ///     <else>
    ///     goto if_end_N
    /// if_then_N:
    ///     <then>
    /// if_end_N:
    /// ```
    fn lower_if(&mut self, stmt: NodeId) -> CompileResult<()> {
        let cond = self.child(stmt, 0)?;
        let then_branch = self.child(stmt, 1)?;
        let else_branch = self.ast.child(stmt, 2);

        let cond = self.lower_expr(cond, &IrType::Boolean)?;
        let id = self.next_label_id();
        let then_label = format!("if_then_{}", id);
        let end_label = format!("if_end_{}", id);

        self.emit(IrInstr::Branch {
            cond: Condition::Operand(cond),
            label: then_label.clone(),
        });
        if let Some(else_branch) = else_branch {
            self.lower_stmt(else_branch)?;
        }
        self.emit(IrInstr::Goto {
            label: end_label.clone(),
        });
        self.place_label(then_label);
        self.lower_stmt(then_branch)?;
        self.place_label(end_label);
        Ok(())
    }

    /// ```text
    ///     goto while_cond_N
    /// while_body_N:
    ///     <body>
    /// while_cond_N:
    ///     <cond>
    ///     if (c) goto while_body_N
    /// ```
    fn lower_while(&mut self, stmt: NodeId) -> CompileResult<()> {
        let cond = self.child(stmt, 0)?;
        let body = self.child(stmt, 1)?;

        let id = self.next_label_id();
        let body_label = format!("while_body_{}", id);
        let cond_label = format!("while_cond_{}", id);

        self.emit(IrInstr::Goto {
            label: cond_label.clone(),
        });
        self.place_label(body_label.clone());
        self.lower_stmt(body)?;
        self.place_label(cond_label);
        let cond = self.lower_expr(cond, &IrType::Boolean)?;
        self.emit(IrInstr::Branch {
            cond: Condition::Operand(cond),
            label: body_label,
        });
        Ok(())
    }
}
