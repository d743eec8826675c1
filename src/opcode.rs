//! This module contains the [`Opcode`] type, the closed set of instructions
//! understood by the tape machine.

use std::fmt::{Display, Formatter};

/// The instructions of the tape machine.
///
/// There are eight meaningful opcodes, each written as a single character in
/// the program text. Every other character is a no-op that is retained in the
/// program so that instruction indices match character positions.
///
/// # Semantics
///
/// | Char | Opcode             | Effect                                         |
/// | :--: | :----------------- | :--------------------------------------------- |
/// | `>`  | `IncrementPointer` | Moves the tape pointer one cell to the right.  |
/// | `<`  | `DecrementPointer` | Moves the tape pointer one cell to the left.   |
/// | `+`  | `IncrementCell`    | Adds one to the current cell, wrapping.        |
/// | `-`  | `DecrementCell`    | Subtracts one from the current cell, wrapping. |
/// | `[`  | `LoopEnter`        | Skips past the matching `]` if the cell is 0.  |
/// | `]`  | `LoopExit`         | Repeats the loop body if the cell is not 0.    |
/// | `,`  | `Read`             | Stores the next input byte in the cell.        |
/// | `.`  | `Write`            | Writes the cell to the output.                 |
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Opcode {
    IncrementPointer,
    DecrementPointer,
    IncrementCell,
    DecrementCell,
    LoopEnter,
    LoopExit,
    Read,
    Write,

    /// Any other character, which does nothing when executed.
    Nop(char),
}

impl Opcode {
    /// Gets the character that encodes this opcode in program text.
    #[must_use]
    pub fn as_char(&self) -> char {
        match self {
            Self::IncrementPointer => '>',
            Self::DecrementPointer => '<',
            Self::IncrementCell => '+',
            Self::DecrementCell => '-',
            Self::LoopEnter => '[',
            Self::LoopExit => ']',
            Self::Read => ',',
            Self::Write => '.',
            Self::Nop(c) => *c,
        }
    }

    /// Gets a textual representation of the opcode to aid in debugging.
    #[must_use]
    pub fn as_text_code(&self) -> &'static str {
        match self {
            Self::IncrementPointer => "PTR_INC",
            Self::DecrementPointer => "PTR_DEC",
            Self::IncrementCell => "CELL_INC",
            Self::DecrementCell => "CELL_DEC",
            Self::LoopEnter => "LOOP_ENTER",
            Self::LoopExit => "LOOP_EXIT",
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::Nop(_) => "NOP",
        }
    }

    /// Checks whether executing the opcode can depend on the value of the
    /// current cell.
    #[must_use]
    pub fn is_branch(&self) -> bool {
        matches!(self, Self::LoopEnter | Self::LoopExit)
    }
}

impl From<char> for Opcode {
    fn from(value: char) -> Self {
        match value {
            '>' => Self::IncrementPointer,
            '<' => Self::DecrementPointer,
            '+' => Self::IncrementCell,
            '-' => Self::DecrementCell,
            '[' => Self::LoopEnter,
            ']' => Self::LoopExit,
            ',' => Self::Read,
            '.' => Self::Write,
            other => Self::Nop(other),
        }
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_text_code())
    }
}
