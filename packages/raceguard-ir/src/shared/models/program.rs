//! The analysis IR
//!
//! One `Program` per lowered translation unit. Procedures are flat CFGs of
//! basic blocks; branch conditions are opaque (only the block structure
//! matters to the lockset analysis). Locks are acquired and released through
//! calls whose callee names the domain profile classifies, so the IR itself
//! carries no locking primitives.
//!
//! `LogAccess` and `AssertRaceFree` never appear in ingested units; the
//! instrumentation pass and the pair builder synthesize them.

use super::attributes::AttributeSet;
use super::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Memory access direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessMode {
    Read,
    Write,
}

impl AccessMode {
    pub fn is_write(&self) -> bool {
        matches!(self, AccessMode::Write)
    }

    pub fn is_read(&self) -> bool {
        matches!(self, AccessMode::Read)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Read => write!(f, "read"),
            AccessMode::Write => write!(f, "write"),
        }
    }
}

/// Instruction operand. Locals are opaque to the lockset analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    Var(String),
    Literal(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Procedure or external call. Lock acquire/release and device
    /// registration are calls like any other; the domain profile tells
    /// them apart.
    Call {
        callee: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Operand>,
        #[serde(default)]
        span: Span,
    },
    /// Read of a named memory location into a local.
    Load {
        dest: String,
        location: String,
        #[serde(default)]
        span: Span,
    },
    /// Write of a named memory location.
    Store {
        location: String,
        value: Operand,
        #[serde(default)]
        span: Span,
    },
    /// Local data flow, invisible to the lockset analysis.
    Assign {
        dest: String,
        value: Operand,
        #[serde(default)]
        span: Span,
    },
    /// Synthesized: record an access to a watched location.
    LogAccess {
        location: String,
        mode: AccessMode,
        #[serde(default)]
        span: Span,
    },
    /// Synthesized: race-freedom obligation discharged by a verifier.
    AssertRaceFree {
        location: String,
        #[serde(default)]
        span: Span,
    },
}

impl Instruction {
    pub fn span(&self) -> Span {
        match self {
            Instruction::Call { span, .. }
            | Instruction::Load { span, .. }
            | Instruction::Store { span, .. }
            | Instruction::Assign { span, .. }
            | Instruction::LogAccess { span, .. }
            | Instruction::AssertRaceFree { span, .. } => *span,
        }
    }

    /// Location touched by a load or store, if any.
    pub fn accessed_location(&self) -> Option<(&str, AccessMode)> {
        match self {
            Instruction::Load { location, .. } => Some((location, AccessMode::Read)),
            Instruction::Store { location, .. } => Some((location, AccessMode::Write)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicBlock {
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instructions: Vec<Instruction>,
    /// Successor block labels; empty marks an exit block.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub successors: Vec<String>,
}

impl BasicBlock {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            instructions: Vec::new(),
            successors: Vec::new(),
        }
    }

    pub fn is_exit(&self) -> bool {
        self.successors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(default, skip_serializing_if = "AttributeSet::is_empty")]
    pub attributes: AttributeSet,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Procedure {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
    #[serde(default, skip_serializing_if = "AttributeSet::is_empty")]
    pub attributes: AttributeSet,
    pub blocks: Vec<BasicBlock>,
    #[serde(default)]
    pub span: Span,
}

impl Procedure {
    /// First block is the entry block by convention.
    pub fn entry_block(&self) -> Option<&BasicBlock> {
        self.blocks.first()
    }

    pub fn block(&self, label: &str) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.label == label)
    }

    pub fn exit_blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        self.blocks.iter().filter(|b| b.is_exit())
    }
}

/// A lowered translation unit: one driver file worth of globals and
/// procedures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub unit: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub procedures: Vec<Procedure>,
}

impl Program {
    pub fn new(unit: &str) -> Self {
        Self {
            unit: unit.to_string(),
            variables: Vec::new(),
            procedures: Vec::new(),
        }
    }

    pub fn procedure(&self, name: &str) -> Option<&Procedure> {
        self.procedures.iter().find(|p| p.name == name)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }
}
