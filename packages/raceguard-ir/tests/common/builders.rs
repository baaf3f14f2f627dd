//! Test data builders
//!
//! This module provides builder patterns for constructing IR programs.

use raceguard_ir::shared::{
    AttributeSet, BasicBlock, Instruction, Operand, Procedure, Program, Span, Variable,
    ATTR_ENTRY_POINT, ATTR_LOCK, ATTR_TAG,
};

/// Builder for Program
#[derive(Debug)]
pub struct ProgramBuilder {
    program: Program,
}

impl ProgramBuilder {
    /// Create a new builder for one translation unit
    pub fn new(unit: &str) -> Self {
        Self {
            program: Program::new(unit),
        }
    }

    /// Declare a global lock variable
    pub fn with_lock(mut self, name: &str) -> Self {
        self.program.variables.push(Variable {
            name: name.to_string(),
            attributes: AttributeSet::new().with_flag(ATTR_LOCK),
            span: Span::zero(),
        });
        self
    }

    /// Declare a plain global variable
    pub fn with_global(mut self, name: &str) -> Self {
        self.program.variables.push(Variable {
            name: name.to_string(),
            attributes: AttributeSet::new(),
            span: Span::zero(),
        });
        self
    }

    /// Add a fully built procedure
    pub fn with_procedure(mut self, procedure: Procedure) -> Self {
        self.program.procedures.push(procedure);
        self
    }

    /// Add a straight-line entry point with a single block
    pub fn with_entry_point(self, name: &str, instructions: Vec<Instruction>) -> Self {
        self.with_procedure(
            ProcedureBuilder::new(name)
                .entry_point()
                .block("entry", instructions, &[])
                .build(),
        )
    }

    /// Add a straight-line helper with a single block
    pub fn with_helper(self, name: &str, instructions: Vec<Instruction>) -> Self {
        self.with_procedure(
            ProcedureBuilder::new(name)
                .block("entry", instructions, &[])
                .build(),
        )
    }

    /// Build the final Program
    pub fn build(self) -> Program {
        self.program
    }
}

/// Builder for Procedure
#[derive(Debug)]
pub struct ProcedureBuilder {
    name: String,
    attributes: AttributeSet,
    blocks: Vec<BasicBlock>,
}

impl ProcedureBuilder {
    /// Create a new procedure builder
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: AttributeSet::new(),
            blocks: Vec::new(),
        }
    }

    /// Mark the procedure as a driver entry point
    pub fn entry_point(mut self) -> Self {
        self.attributes = self.attributes.with_flag(ATTR_ENTRY_POINT);
        self
    }

    /// Tag the procedure as a helper of the named entry point
    pub fn tagged(mut self, entry_point: &str) -> Self {
        self.attributes = self.attributes.with_tag(ATTR_TAG, entry_point);
        self
    }

    /// Append a block; the first block added is the entry block
    pub fn block(
        mut self,
        label: &str,
        instructions: Vec<Instruction>,
        successors: &[&str],
    ) -> Self {
        let mut block = BasicBlock::new(label);
        block.instructions = instructions;
        block.successors = successors.iter().map(|s| s.to_string()).collect();
        self.blocks.push(block);
        self
    }

    /// Build the final Procedure
    pub fn build(self) -> Procedure {
        Procedure {
            name: self.name,
            params: Vec::new(),
            attributes: self.attributes,
            blocks: self.blocks,
            span: Span::zero(),
        }
    }
}

/// Helper to create a call with no arguments
pub fn call(callee: &str) -> Instruction {
    Instruction::Call {
        callee: callee.to_string(),
        args: Vec::new(),
        span: Span::zero(),
    }
}

/// Helper to create a call with one lock argument
pub fn lock_call(callee: &str, lock: &str) -> Instruction {
    Instruction::Call {
        callee: callee.to_string(),
        args: vec![Operand::Var(lock.to_string())],
        span: Span::zero(),
    }
}

/// Helper to create a mutex acquisition
pub fn lock(name: &str) -> Instruction {
    lock_call("mutex_lock", name)
}

/// Helper to create a mutex release
pub fn unlock(name: &str) -> Instruction {
    lock_call("mutex_unlock", name)
}

/// Helper to create a store of a literal
pub fn store(location: &str) -> Instruction {
    Instruction::Store {
        location: location.to_string(),
        value: Operand::Literal(1),
        span: Span::zero(),
    }
}

/// Helper to create a load into a throwaway local
pub fn load(location: &str) -> Instruction {
    Instruction::Load {
        dest: "tmp".to_string(),
        location: location.to_string(),
        span: Span::zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_builder() {
        let program = ProgramBuilder::new("drivers/net/fake.c")
            .with_lock("dev_mutex")
            .with_entry_point("ioctl", vec![lock("dev_mutex"), store("counter")])
            .with_helper("reset", vec![store("counter")])
            .build();

        assert_eq!(program.unit, "drivers/net/fake.c");
        assert!(program.variable("dev_mutex").unwrap().attributes.is_lock());
        assert!(program.procedure("ioctl").unwrap().attributes.is_entry_point());
        assert!(!program.procedure("reset").unwrap().attributes.is_entry_point());
    }

    #[test]
    fn test_procedure_builder_block_order() {
        let procedure = ProcedureBuilder::new("write")
            .entry_point()
            .block("entry", vec![lock("m")], &["body"])
            .block("body", vec![store("state"), unlock("m")], &[])
            .build();

        assert_eq!(procedure.entry_block().unwrap().label, "entry");
        assert_eq!(procedure.blocks.len(), 2);
        assert!(procedure.block("body").unwrap().is_exit());
    }

    #[test]
    fn test_instruction_helpers() {
        assert_eq!(
            store("counter").accessed_location().unwrap().0,
            "counter"
        );
        assert_eq!(load("counter").accessed_location().unwrap().0, "counter");
        assert!(lock("m").accessed_location().is_none());
    }
}
