//! Shared models

mod attributes;
mod index;
pub mod naming;
mod program;
mod span;

pub use attributes::{
    AttributeSet, ATTR_ACCESS_CHECKING, ATTR_CHECKER, ATTR_CURRENT_LOCKSET, ATTR_DOMAIN_SPECIFIC,
    ATTR_ENTRY_POINT, ATTR_LOCK, ATTR_MEMORY_LOCKSET, ATTR_TAG, ATTR_WATCHDOG,
};
pub use index::{IndexError, IrIndex};
pub use program::{AccessMode, BasicBlock, Instruction, Operand, Procedure, Program, Variable};
pub use span::Span;
