//! AST to IR Lowering
//!
//! Converts the validated AST into the IR representation, one method at a
//! time. Temporaries (`t0`, `t1`, ...) and label numbers are scoped to the
//! method being lowered.

mod expr;
mod stmt;

use crate::ast::{Ast, Kind, NodeId};
use crate::error::{CompileError, CompileResult};
use crate::ir::{IrClass, IrField, IrInstr, IrMethod, IrParam, IrType, Operand, VarTable};
use crate::symbols::{SymbolTable, Type, BOOLEAN, INT, STRING, VOID};
use rustc_hash::{FxHashMap, FxHashSet};

/// Lower a whole program to its IR class
pub fn lower_program(ast: &Ast, table: &SymbolTable) -> CompileResult<IrClass> {
    Lowerer::new(ast, table).lower_program()
}

/// Map a source type to its IR type
pub fn ir_type(ty: &Type) -> IrType {
    if ty.is_class {
        return IrType::ClassRef(ty.name.clone());
    }
    let base = match ty.name.as_str() {
        INT => IrType::Int32,
        BOOLEAN => IrType::Boolean,
        STRING => IrType::String,
        VOID => IrType::Void,
        other => IrType::ObjectRef(other.to_string()),
    };
    if ty.is_array {
        IrType::Array(Box::new(base))
    } else {
        base
    }
}

/// Per-method lowering state
#[derive(Debug, Default)]
struct MethodContext {
    name: String,
    is_static: bool,
    return_ty: Option<IrType>,
    instructions: Vec<IrInstr>,
    labels: FxHashMap<String, usize>,
    /// Labels waiting for the next emitted instruction
    pending_labels: Vec<String>,
    next_temp: u32,
    next_label: u32,
    /// Temporaries in creation order
    temps: Vec<String>,
    /// Source names a temporary must not shadow
    reserved: FxHashSet<String>,
}

/// AST to IR lowerer
pub struct Lowerer<'a> {
    ast: &'a Ast,
    table: &'a SymbolTable,
    ctx: MethodContext,
}

impl<'a> Lowerer<'a> {
    /// Create a new lowerer
    pub fn new(ast: &'a Ast, table: &'a SymbolTable) -> Self {
        Self {
            ast,
            table,
            ctx: MethodContext::default(),
        }
    }

    /// Lower the class of the program
    pub fn lower_program(&mut self) -> CompileResult<IrClass> {
        let root = self
            .ast
            .root()
            .ok_or_else(|| CompileError::internal("AST has no root"))?;
        let class = self
            .ast
            .children_of_kind(root, Kind::ClassDecl)
            .next()
            .ok_or_else(|| CompileError::internal("program without a class declaration"))?;

        let mut ir_class = IrClass::new(self.table.class_name.clone());
        if !self.table.super_class.is_empty() {
            ir_class.super_class = Some(self.table.super_class.clone());
        }
        ir_class.imports = self.table.imports.clone();
        ir_class.fields = self
            .table
            .fields
            .iter()
            .map(|field| IrField {
                name: field.name.clone(),
                ty: ir_type(&field.ty),
            })
            .collect();

        for &node in self.ast.children(class) {
            if self.ast.kind(node).is_method() {
                let method = self.lower_method(node)?;
                log::debug!(
                    "lowered {}.{}: {} instruction(s), {} variable(s)",
                    ir_class.name,
                    method.name,
                    method.instructions.len(),
                    method.var_table.len()
                );
                ir_class.methods.push(method);
            }
        }

        Ok(ir_class)
    }

    /// Lower one method declaration
    fn lower_method(&mut self, node: NodeId) -> CompileResult<IrMethod> {
        let name = self.ast.name(node).unwrap_or("main").to_string();
        let is_main = self.ast.kind(node) == Kind::MainMethodDecl;
        let is_static = is_main || self.table.is_static(&name);
        let return_ty = self
            .table
            .return_type(&name)
            .map(ir_type)
            .ok_or_else(|| CompileError::unresolved(name.clone()))?;

        self.ctx = MethodContext {
            name: name.clone(),
            is_static,
            return_ty: Some(return_ty.clone()),
            reserved: self.reserved_names(&name),
            ..MethodContext::default()
        };

        let body: Vec<NodeId> = self
            .ast
            .children(node)
            .iter()
            .copied()
            .filter(|&child| self.ast.kind(child).is_statement())
            .collect();
        for stmt in body {
            self.lower_stmt(stmt)?;
        }

        let ends_in_return = matches!(self.ctx.instructions.last(), Some(IrInstr::Return { .. }))
            && self.ctx.pending_labels.is_empty();
        if (is_main || return_ty.is_void()) && !ends_in_return {
            self.emit(IrInstr::Return {
                value: None,
                ty: IrType::Void,
            });
        }

        let ctx = std::mem::take(&mut self.ctx);
        let mut labels = ctx.labels;
        for label in ctx.pending_labels {
            labels.insert(label, ctx.instructions.len());
        }

        let mut method = IrMethod::new(name.clone(), return_ty);
        method.is_static = is_static;
        method.is_public = is_main || self.ast.flag(node, crate::ast::attr::IS_PUBLIC);
        method.params = self
            .table
            .parameters(&name)
            .iter()
            .map(|p| IrParam {
                name: p.name.clone(),
                ty: ir_type(&p.ty),
            })
            .collect();
        method.instructions = ctx.instructions;
        method.labels = labels;
        method.var_table = self.build_var_table(&method);
        Ok(method)
    }

    fn reserved_names(&self, method: &str) -> FxHashSet<String> {
        let mut reserved: FxHashSet<String> = self
            .table
            .parameters(method)
            .iter()
            .chain(self.table.local_variables(method))
            .chain(&self.table.fields)
            .map(|s| s.name.clone())
            .collect();
        reserved.insert("this".to_string());
        reserved.insert(self.table.class_name.clone());
        for import in &self.table.imports {
            if let Some(simple) = import.rsplit('.').next() {
                reserved.insert(simple.to_string());
            }
        }
        reserved
    }

    /// `this`, then parameters, then declared locals, then every other
    /// variable in order of first appearance
    fn build_var_table(&self, method: &IrMethod) -> VarTable {
        let mut table = VarTable::new();
        if !method.is_static {
            table.declare("this", IrType::This(self.table.class_name.clone()));
        }
        for param in &method.params {
            table.declare(param.name.clone(), param.ty.clone());
        }
        for local in self.table.local_variables(&method.name) {
            table.declare(local.name.clone(), ir_type(&local.ty));
        }

        let mut seen = Vec::new();
        for instr in &method.instructions {
            collect_vars(instr, &mut seen);
        }
        for (name, ty) in seen {
            if !table.contains(name) {
                table.declare(name, ty.clone());
            }
        }
        table
    }

    // ------------------------------------------------------------------
    // Instruction building
    // ------------------------------------------------------------------

    /// Append an instruction, binding any pending labels to it
    fn emit(&mut self, instr: IrInstr) {
        let index = self.ctx.instructions.len();
        for label in self.ctx.pending_labels.drain(..) {
            self.ctx.labels.insert(label, index);
        }
        self.ctx.instructions.push(instr);
    }

    /// Mark the next emitted instruction with `label`
    fn place_label(&mut self, label: String) {
        self.ctx.pending_labels.push(label);
    }

    /// Fresh number shared by the labels of one construct
    fn next_label_id(&mut self) -> u32 {
        let id = self.ctx.next_label;
        self.ctx.next_label += 1;
        id
    }

    /// Fresh temporary that does not collide with a source name
    fn new_temp(&mut self, ty: IrType) -> Operand {
        loop {
            let name = format!("t{}", self.ctx.next_temp);
            self.ctx.next_temp += 1;
            if !self.ctx.reserved.contains(&name) {
                self.ctx.temps.push(name.clone());
                return Operand::var(name, ty);
            }
        }
    }

    /// Emit `temp := rhs` and return the temporary
    fn assign_temp(&mut self, ty: IrType, rhs: IrInstr) -> Operand {
        let temp = self.new_temp(ty.clone());
        self.emit(IrInstr::Assign {
            dest: temp.clone(),
            ty,
            rhs: Box::new(rhs),
        });
        temp
    }

    /// Whether `name` is a temporary created after `mark` temporaries existed
    fn is_temp_since(&self, name: &str, mark: usize) -> bool {
        self.ctx.temps[mark.min(self.ctx.temps.len())..]
            .iter()
            .any(|temp| temp == name)
    }

    fn method_return_type(&self) -> IrType {
        self.ctx.return_ty.clone().unwrap_or(IrType::Void)
    }

    /// Type of a local or parameter of the current method
    fn local_type(&self, name: &str) -> Option<IrType> {
        self.table
            .local_or_param(&self.ctx.name, name)
            .map(|symbol| ir_type(&symbol.ty))
    }

    fn field_type(&self, name: &str) -> Option<IrType> {
        self.table.field(name).map(|field| ir_type(&field.ty))
    }

    fn this_operand(&self) -> Operand {
        Operand::var("this", IrType::This(self.table.class_name.clone()))
    }
}

/// Record variables in order of first appearance. Class references and
/// field operands are not variables.
fn collect_vars<'i>(instr: &'i IrInstr, seen: &mut Vec<(&'i str, &'i IrType)>) {
    fn operand<'i>(op: &'i Operand, seen: &mut Vec<(&'i str, &'i IrType)>) {
        match op {
            Operand::Literal { .. } => {}
            Operand::Var { name, ty } => {
                if !matches!(ty, IrType::ClassRef(_)) && !seen.iter().any(|(n, _)| *n == name.as_str()) {
                    seen.push((name.as_str(), ty));
                }
            }
            Operand::ArrayElement { index, .. } => operand(index, seen),
        }
    }

    match instr {
        IrInstr::Assign { dest, rhs, .. } => {
            operand(dest, seen);
            collect_vars(rhs, seen);
        }
        IrInstr::BinaryOp { left, right, .. } => {
            operand(left, seen);
            operand(right, seen);
        }
        IrInstr::UnaryOp { operand: op, .. } | IrInstr::SingleOp(op) => operand(op, seen),
        IrInstr::Call(call) => {
            if call.kind != crate::ir::CallKind::New {
                operand(&call.caller, seen);
            }
            for arg in &call.args {
                operand(arg, seen);
            }
        }
        IrInstr::GetField { object, .. } => operand(object, seen),
        IrInstr::PutField { object, value, .. } => {
            operand(object, seen);
            operand(value, seen);
        }
        IrInstr::Branch { cond, .. } => match cond {
            crate::ir::Condition::Operand(op) => operand(op, seen),
            crate::ir::Condition::Binary { left, right, .. } => {
                operand(left, seen);
                operand(right, seen);
            }
        },
        IrInstr::Return { value, .. } => {
            if let Some(value) = value {
                operand(value, seen);
            }
        }
        IrInstr::Goto { .. } => {}
    }
}
