//! IR Values
//!
//! Types and operands of the three-address IR.

use std::fmt;

/// Type of an IR value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IrType {
    Int32,
    Boolean,
    String,
    Void,
    Array(Box<IrType>),
    /// Instance of a class
    ObjectRef(String),
    /// A class used as a namespace (static receiver)
    ClassRef(String),
    /// The receiver of an instance method, of the given class
    This(String),
}

impl IrType {
    pub fn int_array() -> Self {
        IrType::Array(Box::new(IrType::Int32))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, IrType::Void)
    }

    /// Values held as references (loaded with `aload`)
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            IrType::String | IrType::Array(_) | IrType::ObjectRef(_) | IrType::This(_)
        )
    }

    /// Element type of an array, or the type itself
    pub fn element(&self) -> &IrType {
        match self {
            IrType::Array(inner) => inner,
            other => other,
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Int32 => write!(f, "i32"),
            IrType::Boolean => write!(f, "bool"),
            IrType::String => write!(f, "String"),
            IrType::Void => write!(f, "V"),
            IrType::Array(inner) => write!(f, "array.{}", inner),
            IrType::ObjectRef(name) | IrType::ClassRef(name) | IrType::This(name) => {
                write!(f, "{}", name)
            }
        }
    }
}

/// Operand of an instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Integer or boolean constant (booleans are 0/1)
    Literal { value: i32, ty: IrType },
    /// Named variable: local, parameter, temporary, `this` or a class name
    Var { name: String, ty: IrType },
    /// `name[index]`; `ty` is the element type
    ArrayElement {
        name: String,
        index: Box<Operand>,
        ty: IrType,
    },
}

impl Operand {
    pub fn literal(value: i32, ty: IrType) -> Self {
        Operand::Literal { value, ty }
    }

    pub fn int(value: i32) -> Self {
        Self::literal(value, IrType::Int32)
    }

    pub fn boolean(value: bool) -> Self {
        Self::literal(i32::from(value), IrType::Boolean)
    }

    pub fn var(name: impl Into<String>, ty: IrType) -> Self {
        Operand::Var {
            name: name.into(),
            ty,
        }
    }

    pub fn element(name: impl Into<String>, index: Operand, ty: IrType) -> Self {
        Operand::ArrayElement {
            name: name.into(),
            index: Box::new(index),
            ty,
        }
    }

    pub fn ty(&self) -> &IrType {
        match self {
            Operand::Literal { ty, .. }
            | Operand::Var { ty, .. }
            | Operand::ArrayElement { ty, .. } => ty,
        }
    }

    /// Name of the variable this operand denotes (the array for an element)
    pub fn name(&self) -> Option<&str> {
        match self {
            Operand::Literal { .. } => None,
            Operand::Var { name, .. } | Operand::ArrayElement { name, .. } => Some(name),
        }
    }

    /// Variables read when this operand is evaluated
    pub fn used_vars(&self) -> Vec<&str> {
        match self {
            Operand::Literal { .. } => Vec::new(),
            Operand::Var { name, ty } => match ty {
                IrType::ClassRef(_) => Vec::new(),
                _ => vec![name.as_str()],
            },
            Operand::ArrayElement { name, index, .. } => {
                let mut vars = vec![name.as_str()];
                vars.extend(index.used_vars());
                vars
            }
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Operand::Literal { .. })
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal { value, ty } => write!(f, "{}.{}", value, ty),
            Operand::Var { name, ty } => match ty {
                IrType::ClassRef(_) => write!(f, "{}", name),
                IrType::This(_) => write!(f, "this"),
                _ => write!(f, "{}.{}", name, ty),
            },
            Operand::ArrayElement { name, index, ty } => {
                write!(f, "{}[{}].{}", name, index, ty)
            }
        }
    }
}
