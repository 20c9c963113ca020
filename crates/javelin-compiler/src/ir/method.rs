//! IR Methods
//!
//! A method holds its instruction list, the label positions and the table of
//! variables with their register slots.

use super::instr::IrInstr;
use super::value::IrType;
use rustc_hash::FxHashMap;

/// A method parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrParam {
    pub name: String,
    pub ty: IrType,
}

/// One row of the variable table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarEntry {
    pub name: String,
    pub ty: IrType,
    /// Local slot in the target frame
    pub register: u32,
}

/// Variables of a method in slot order, with lookup by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarTable {
    entries: Vec<VarEntry>,
    index: FxHashMap<String, usize>,
}

impl VarTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable in the next free slot. A name already present keeps
    /// its entry.
    pub fn declare(&mut self, name: impl Into<String>, ty: IrType) -> u32 {
        let name = name.into();
        if let Some(&i) = self.index.get(&name) {
            return self.entries[i].register;
        }
        let register = self.entries.len() as u32;
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push(VarEntry { name, ty, register });
        register
    }

    pub fn get(&self, name: &str) -> Option<&VarEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn register(&self, name: &str) -> Option<u32> {
        self.get(name).map(|entry| entry.register)
    }

    /// Move `name` to `register`. Returns false for an unknown name.
    pub fn set_register(&mut self, name: &str, register: u32) -> bool {
        match self.index.get(name) {
            Some(&i) => {
                self.entries[i].register = register;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &VarEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest slot in use
    pub fn max_register(&self) -> Option<u32> {
        self.entries.iter().map(|entry| entry.register).max()
    }
}

/// An IR method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrMethod {
    pub name: String,
    pub is_static: bool,
    pub is_public: bool,
    pub params: Vec<IrParam>,
    pub return_ty: IrType,
    pub instructions: Vec<IrInstr>,
    /// Label name to the index of the instruction it marks. A label at the
    /// end of the method maps to `instructions.len()`.
    pub labels: FxHashMap<String, usize>,
    pub var_table: VarTable,
}

impl IrMethod {
    pub fn new(name: impl Into<String>, return_ty: IrType) -> Self {
        Self {
            name: name.into(),
            is_static: false,
            is_public: true,
            params: Vec::new(),
            return_ty,
            instructions: Vec::new(),
            labels: FxHashMap::default(),
            var_table: VarTable::new(),
        }
    }

    /// Slots below this number hold `this` and the parameters
    pub fn reserved_registers(&self) -> u32 {
        self.params.len() as u32 + u32::from(!self.is_static)
    }

    /// Labels marking instruction `index`, sorted by name
    pub fn labels_at(&self, index: usize) -> Vec<&str> {
        let mut labels: Vec<&str> = self
            .labels
            .iter()
            .filter(|&(_, &at)| at == index)
            .map(|(name, _)| name.as_str())
            .collect();
        labels.sort_unstable();
        labels
    }

    /// Instructions control may reach right after instruction `index`
    pub fn successors(&self, index: usize) -> Vec<usize> {
        let Some(instr) = self.instructions.get(index) else {
            return Vec::new();
        };
        let mut succ = Vec::with_capacity(2);
        if let Some(&target) = instr.jump_target().and_then(|label| self.labels.get(label)) {
            if target < self.instructions.len() {
                succ.push(target);
            }
        }
        if instr.falls_through() && index + 1 < self.instructions.len() && !succ.contains(&(index + 1))
        {
            succ.push(index + 1);
        }
        succ
    }
}
