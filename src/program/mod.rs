//! This module contains the implementation of the [`Program`], a type that
//! represents a sequence of tape-machine instructions along with the loop
//! structure needed to execute it.

pub mod brackets;

use std::rc::Rc;

use crate::{
    constant::PROGRAM_MAXIMUM_SIZE,
    error::{
        container::Locatable,
        load::{Error, Result},
    },
    opcode::Opcode,
    program::brackets::BracketMap,
};

/// How the loop structure of a program is resolved.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum BracketMatching {
    /// Every loop is matched when the program is loaded, rejecting unbalanced
    /// programs before execution. Loop transitions are then `O(1)`.
    #[default]
    Precomputed,

    /// No validation happens at load time. Skipping a loop re-scans the
    /// program for the matching exit, and unbalanced loops surface as faults
    /// on whichever paths reach them.
    Lazy,
}

/// The program is an immutable sequence of [`Opcode`]s, shared by every
/// execution state that runs over it.
///
/// # Instruction Indices
///
/// Every character of the source text becomes exactly one instruction, so the
/// index of an instruction is the index of its character in the source. The
/// index equal to [`Self::len`] is the end of the program, and a state whose
/// program counter reaches it has finished.
///
/// # Size Limits
///
/// Instruction indices are stored as [`u32`], so the program cannot contain
/// more than [`u32::MAX`] instructions. This is validated upon construction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Program {
    /// The sequence of [`Opcode`]s.
    instructions: Rc<Vec<Opcode>>,

    /// The precomputed loop structure, present only for programs loaded with
    /// [`BracketMatching::Precomputed`].
    brackets: Option<Rc<BracketMap>>,
}

impl Program {
    /// Loads the program described by `source`, resolving its loop structure
    /// as described by `matching`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the program is too large, or if `matching` is
    /// [`BracketMatching::Precomputed`] and the loops in `source` are not
    /// balanced.
    pub fn load(source: &str, matching: BracketMatching) -> Result<Self> {
        let instructions: Vec<Opcode> = source.chars().map(Opcode::from).collect();
        check_size(instructions.len())?;

        let brackets = match matching {
            BracketMatching::Precomputed => Some(Rc::new(BracketMap::build(&instructions)?)),
            BracketMatching::Lazy => None,
        };
        let instructions = Rc::new(instructions);

        Ok(Self {
            instructions,
            brackets,
        })
    }

    /// Loads the program described by `source` with its loop structure
    /// resolved and validated up front.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the loops in `source` are not balanced.
    pub fn new(source: &str) -> Result<Self> {
        Self::load(source, BracketMatching::Precomputed)
    }

    /// Loads the program described by `source` without validating its loop
    /// structure.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the program is too large.
    pub fn new_lazy(source: &str) -> Result<Self> {
        Self::load(source, BracketMatching::Lazy)
    }

    /// Gets the number of instructions in the program.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Checks if the program contains no instructions at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Gets the index one past the last instruction, at which execution ends.
    #[allow(clippy::cast_possible_truncation)] // Validated at construction
    #[must_use]
    pub fn end(&self) -> u32 {
        self.instructions.len() as u32
    }

    /// Gets the instruction at the specified `instruction_pointer`, if it
    /// exists.
    #[must_use]
    pub fn instruction(&self, instruction_pointer: u32) -> Option<Opcode> {
        self.instructions.get(instruction_pointer as usize).copied()
    }

    /// Gets all of the instructions in the program.
    #[must_use]
    pub fn instructions(&self) -> &[Opcode] {
        self.instructions.as_slice()
    }

    /// Gets the way in which the loop structure of this program is resolved.
    #[must_use]
    pub fn bracket_matching(&self) -> BracketMatching {
        if self.brackets.is_some() {
            BracketMatching::Precomputed
        } else {
            BracketMatching::Lazy
        }
    }

    /// Gets the index of the loop exit matching the loop enter at `enter`.
    ///
    /// Returns [`None`] if `enter` is not a loop enter or has no matching
    /// exit, which can only happen for lazily-loaded programs.
    #[must_use]
    pub fn matching_exit(&self, enter: u32) -> Option<u32> {
        if self.instruction(enter) != Some(Opcode::LoopEnter) {
            return None;
        }

        match &self.brackets {
            Some(map) => map.partner(enter),
            None => brackets::scan_for_exit(&self.instructions, enter),
        }
    }

    /// Gets the index of the loop enter matching the loop exit at `exit`.
    ///
    /// Returns [`None`] if `exit` is not a loop exit or has no matching enter,
    /// which can only happen for lazily-loaded programs.
    #[must_use]
    pub fn matching_enter(&self, exit: u32) -> Option<u32> {
        if self.instruction(exit) != Some(Opcode::LoopExit) {
            return None;
        }

        match &self.brackets {
            Some(map) => map.partner(exit),
            None => brackets::scan_for_enter(&self.instructions, exit),
        }
    }

    /// Converts the program back into its source text.
    #[must_use]
    pub fn as_text(&self) -> String {
        self.instructions.iter().map(Opcode::as_char).collect()
    }
}

/// A [`Program`] is usually created directly from its source text, with its
/// loop structure validated.
impl<'a> TryFrom<&'a str> for Program {
    type Error = crate::error::load::LocatedError;

    fn try_from(value: &'a str) -> Result<Self> {
        Self::new(value)
    }
}

/// Checks that a program of `length` instructions can be addressed by a `u32`
/// instruction pointer.
fn check_size(length: usize) -> Result<()> {
    if length > PROGRAM_MAXIMUM_SIZE {
        Err(Error::ProgramTooLarge.locate(u32::MAX))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{
        constant::PROGRAM_MAXIMUM_SIZE,
        error::load,
        opcode::Opcode,
        program::{check_size, BracketMatching, Program},
    };

    #[test]
    fn rejects_programs_past_the_maximum_size() {
        assert!(check_size(PROGRAM_MAXIMUM_SIZE).is_ok());

        let error = check_size(PROGRAM_MAXIMUM_SIZE + 1).expect_err("Oversized program loaded");
        assert_eq!(error.payload, load::Error::ProgramTooLarge);
    }

    #[test]
    fn can_load_program_from_text() -> anyhow::Result<()> {
        let source = "++[>+<-] done.";
        let program = Program::try_from(source)?;

        assert_eq!(program.len(), source.chars().count());
        assert_eq!(program.end(), 14);
        assert_eq!(program.instruction(2), Some(Opcode::LoopEnter));
        assert_eq!(program.instruction(8), Some(Opcode::Nop(' ')));
        assert_eq!(program.instruction(14), None);
        assert_eq!(program.as_text(), source);
        assert_eq!(program.bracket_matching(), BracketMatching::Precomputed);

        Ok(())
    }

    #[test]
    fn accepts_the_empty_program() -> anyhow::Result<()> {
        let program = Program::new("")?;
        assert!(program.is_empty());
        assert_eq!(program.end(), 0);

        Ok(())
    }

    #[test]
    fn rejects_unbalanced_programs_when_precomputing() {
        let error = Program::new("+[").expect_err("Loaded an unbalanced program");
        assert_eq!(error.location, 1);
        assert_eq!(error.payload, load::Error::UnmatchedLoopEnter);
    }

    #[test]
    fn accepts_unbalanced_programs_when_lazy() -> anyhow::Result<()> {
        let program = Program::new_lazy("]+[")?;
        assert_eq!(program.bracket_matching(), BracketMatching::Lazy);
        assert_eq!(program.matching_enter(0), None);
        assert_eq!(program.matching_exit(2), None);

        Ok(())
    }

    #[test]
    fn lazy_and_precomputed_matching_agree() -> anyhow::Result<()> {
        let source = "[[]>[[-]<]]";
        let eager = Program::new(source)?;
        let lazy = Program::new_lazy(source)?;

        for index in 0..eager.end() {
            assert_eq!(eager.matching_exit(index), lazy.matching_exit(index));
            assert_eq!(eager.matching_enter(index), lazy.matching_enter(index));
        }

        Ok(())
    }

    #[test]
    fn matching_only_answers_for_loop_instructions() -> anyhow::Result<()> {
        let program = Program::new("+[-]")?;
        assert_eq!(program.matching_exit(0), None);
        assert_eq!(program.matching_exit(3), None);
        assert_eq!(program.matching_exit(1), Some(3));
        assert_eq!(program.matching_enter(3), Some(1));

        Ok(())
    }
}
