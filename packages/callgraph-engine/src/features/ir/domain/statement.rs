//! Typed statements of a method body
//!
//! Bodies are in SSA form: every value is defined once. Parameters are values
//! `1..=n` (the receiver is value `1` for instance methods); other values are
//! numbered above them. A call site is the statement index of its invoke.

use crate::features::points_to::domain::ConstantValue;
use crate::shared::models::{FieldRef, MethodRef, TypeName};
use serde::{Deserialize, Serialize};

/// SSA value number
pub type ValueId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvokeKind {
    Static,
    /// Constructors, private methods and `super` calls
    Special,
    Virtual,
    Interface,
}

impl InvokeKind {
    #[inline]
    pub fn is_static(self) -> bool {
        matches!(self, InvokeKind::Static)
    }

    /// Target depends on the receiver's runtime type
    #[inline]
    pub fn is_dispatched(self) -> bool {
        matches!(self, InvokeKind::Virtual | InvokeKind::Interface)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeInstruction {
    pub kind: InvokeKind,
    /// Declared target
    pub target: MethodRef,
    /// Actual arguments, receiver first for instance calls
    pub args: Vec<ValueId>,
    /// Result value
    #[serde(default)]
    pub def: Option<ValueId>,
    /// Value receiving exceptions caught around the call
    #[serde(default)]
    pub exception: Option<ValueId>,
}

impl InvokeInstruction {
    pub fn receiver(&self) -> Option<ValueId> {
        if self.kind.is_static() {
            None
        } else {
            self.args.first().copied()
        }
    }

    /// Argument bound to declared parameter `index` (receiver excluded)
    pub fn parameter(&self, index: usize) -> Option<ValueId> {
        let offset = usize::from(!self.kind.is_static());
        self.args.get(index + offset).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Statement {
    New {
        def: ValueId,
        ty: TypeName,
    },
    NewArray {
        def: ValueId,
        /// Array type (`T[]`)
        ty: TypeName,
        #[serde(default)]
        length: Option<u32>,
    },
    Constant {
        def: ValueId,
        value: ConstantValue,
    },
    Assign {
        def: ValueId,
        src: ValueId,
    },
    Phi {
        def: ValueId,
        srcs: Vec<ValueId>,
    },
    CheckCast {
        def: ValueId,
        src: ValueId,
        ty: TypeName,
    },
    GetField {
        def: ValueId,
        object: ValueId,
        field: FieldRef,
    },
    PutField {
        object: ValueId,
        field: FieldRef,
        value: ValueId,
    },
    GetStatic {
        def: ValueId,
        field: FieldRef,
    },
    PutStatic {
        field: FieldRef,
        value: ValueId,
    },
    ArrayLoad {
        def: ValueId,
        array: ValueId,
    },
    ArrayStore {
        array: ValueId,
        value: ValueId,
    },
    Invoke(InvokeInstruction),
    Return {
        #[serde(default)]
        value: Option<ValueId>,
    },
    Throw {
        value: ValueId,
    },
}

impl Statement {
    /// Value defined by the statement
    pub fn def(&self) -> Option<ValueId> {
        match self {
            Statement::New { def, .. }
            | Statement::NewArray { def, .. }
            | Statement::Constant { def, .. }
            | Statement::Assign { def, .. }
            | Statement::Phi { def, .. }
            | Statement::CheckCast { def, .. }
            | Statement::GetField { def, .. }
            | Statement::GetStatic { def, .. }
            | Statement::ArrayLoad { def, .. } => Some(*def),
            Statement::Invoke(invoke) => invoke.def,
            Statement::PutField { .. }
            | Statement::PutStatic { .. }
            | Statement::ArrayStore { .. }
            | Statement::Return { .. }
            | Statement::Throw { .. } => None,
        }
    }

    pub fn as_invoke(&self) -> Option<&InvokeInstruction> {
        match self {
            Statement::Invoke(invoke) => Some(invoke),
            _ => None,
        }
    }
}

/// Parameter count plus ordered statements
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodBody {
    pub param_count: u32,
    pub statements: Vec<Statement>,
}

impl MethodBody {
    pub fn new(param_count: u32, statements: Vec<Statement>) -> Self {
        Self {
            param_count,
            statements,
        }
    }

    /// Invoke statements with their call-site indices
    pub fn invokes(&self) -> impl Iterator<Item = (u32, &InvokeInstruction)> + '_ {
        self.statements
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_invoke().map(|inv| (i as u32, inv)))
    }

    /// Type a value is cast to by the first `CheckCast` reading it
    pub fn cast_type_of(&self, value: ValueId) -> Option<&TypeName> {
        self.statements.iter().find_map(|s| match s {
            Statement::CheckCast { src, ty, .. } if *src == value => Some(ty),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
