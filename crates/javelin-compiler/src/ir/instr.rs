//! IR Instructions
//!
//! Three-address code instructions for the IR.

use super::value::{IrType, Operand};

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    And,
}

impl BinaryOp {
    /// Operator of a source-level binary expression
    pub fn from_source(op: &str) -> Option<Self> {
        match op {
            "+" => Some(BinaryOp::Add),
            "-" => Some(BinaryOp::Sub),
            "*" => Some(BinaryOp::Mul),
            "/" => Some(BinaryOp::Div),
            "<" => Some(BinaryOp::Lt),
            "&&" => Some(BinaryOp::And),
            _ => None,
        }
    }

    pub fn is_comparison(self) -> bool {
        self == BinaryOp::Lt
    }

    pub fn is_logical(self) -> bool {
        self == BinaryOp::And
    }

    /// Type of the value the operator produces
    pub fn result_type(self) -> IrType {
        if self.is_comparison() || self.is_logical() {
            IrType::Boolean
        } else {
            IrType::Int32
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Lt => "<",
            BinaryOp::And => "&&",
        }
    }
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
}

/// Dispatch kind of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// Allocate an object or an int array
    New,
    InvokeStatic,
    InvokeVirtual,
    /// Constructor call on a freshly allocated object
    InvokeSpecial,
    ArrayLength,
}

impl CallKind {
    pub fn name(self) -> &'static str {
        match self {
            CallKind::New => "new",
            CallKind::InvokeStatic => "invokestatic",
            CallKind::InvokeVirtual => "invokevirtual",
            CallKind::InvokeSpecial => "invokespecial",
            CallKind::ArrayLength => "arraylength",
        }
    }

    /// Whether a call of this kind leaves a value on the operand stack
    pub fn produces_value(self, return_ty: &IrType) -> bool {
        match self {
            CallKind::New | CallKind::ArrayLength => true,
            CallKind::InvokeSpecial => false,
            CallKind::InvokeStatic | CallKind::InvokeVirtual => !return_ty.is_void(),
        }
    }
}

/// A call of any dispatch kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInstr {
    pub kind: CallKind,
    /// Receiver object, class reference, or the allocated class / `array`
    pub caller: Operand,
    /// Invoked method; `None` for `new` and `arraylength`
    pub method: Option<String>,
    pub args: Vec<Operand>,
    pub return_ty: IrType,
}

/// Condition of a conditional branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Jump when the operand is non-zero
    Operand(Operand),
    Binary {
        op: BinaryOp,
        left: Operand,
        right: Operand,
    },
}

/// IR instruction (Three-Address Code)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrInstr {
    /// `dest := rhs`, where `rhs` is a value-producing instruction
    Assign {
        dest: Operand,
        ty: IrType,
        rhs: Box<IrInstr>,
    },

    /// `left op right`
    BinaryOp {
        op: BinaryOp,
        left: Operand,
        right: Operand,
        ty: IrType,
    },

    /// `op operand`
    UnaryOp {
        op: UnaryOp,
        operand: Operand,
        ty: IrType,
    },

    Call(CallInstr),

    /// Read `object.field`
    GetField { object: Operand, field: Operand },

    /// `object.field = value`
    PutField {
        object: Operand,
        field: Operand,
        value: Operand,
    },

    /// `if (cond) goto label`
    Branch { cond: Condition, label: String },

    Goto { label: String },

    Return { value: Option<Operand>, ty: IrType },

    /// A plain operand, as the right-hand side of a copy
    SingleOp(Operand),
}

impl IrInstr {
    /// Type of the value this instruction produces
    pub fn result_type(&self) -> IrType {
        match self {
            IrInstr::Assign { ty, .. } => ty.clone(),
            IrInstr::BinaryOp { ty, .. } | IrInstr::UnaryOp { ty, .. } => ty.clone(),
            IrInstr::Call(call) => call.return_ty.clone(),
            IrInstr::GetField { field, .. } => field.ty().clone(),
            IrInstr::SingleOp(op) => op.ty().clone(),
            IrInstr::Return { ty, .. } => ty.clone(),
            IrInstr::PutField { .. } | IrInstr::Branch { .. } | IrInstr::Goto { .. } => {
                IrType::Void
            }
        }
    }

    /// Label this instruction jumps to, if any
    pub fn jump_target(&self) -> Option<&str> {
        match self {
            IrInstr::Branch { label, .. } | IrInstr::Goto { label } => Some(label),
            _ => None,
        }
    }

    /// Whether control can continue to the next instruction
    pub fn falls_through(&self) -> bool {
        !matches!(self, IrInstr::Goto { .. } | IrInstr::Return { .. })
    }

    /// Variables read by this instruction
    pub fn uses(&self) -> Vec<&str> {
        let mut vars = Vec::new();
        match self {
            IrInstr::Assign { dest, rhs, .. } => {
                // Storing into an element reads the array and the index
                if let Operand::ArrayElement { .. } = dest {
                    vars.extend(dest.used_vars());
                }
                vars.extend(rhs.uses());
            }
            IrInstr::BinaryOp { left, right, .. } => {
                vars.extend(left.used_vars());
                vars.extend(right.used_vars());
            }
            IrInstr::UnaryOp { operand, .. } => vars.extend(operand.used_vars()),
            IrInstr::Call(call) => {
                if call.kind != CallKind::New {
                    vars.extend(call.caller.used_vars());
                }
                for arg in &call.args {
                    vars.extend(arg.used_vars());
                }
            }
            IrInstr::GetField { object, .. } => vars.extend(object.used_vars()),
            IrInstr::PutField { object, value, .. } => {
                vars.extend(object.used_vars());
                vars.extend(value.used_vars());
            }
            IrInstr::Branch { cond, .. } => match cond {
                Condition::Operand(op) => vars.extend(op.used_vars()),
                Condition::Binary { left, right, .. } => {
                    vars.extend(left.used_vars());
                    vars.extend(right.used_vars());
                }
            },
            IrInstr::Return { value, .. } => {
                if let Some(value) = value {
                    vars.extend(value.used_vars());
                }
            }
            IrInstr::SingleOp(op) => vars.extend(op.used_vars()),
            IrInstr::Goto { .. } => {}
        }
        vars
    }

    /// Names written by this instruction. A field store counts its field.
    pub fn defs(&self) -> Vec<&str> {
        match self {
            IrInstr::Assign {
                dest: Operand::Var { name, .. },
                ..
            } => vec![name.as_str()],
            IrInstr::PutField { field, .. } => field.name().into_iter().collect(),
            _ => Vec::new(),
        }
    }
}
