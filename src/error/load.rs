//! This module contains the error type that pertains to loading program text
//! into a [`crate::program::Program`].

use thiserror::Error;

use crate::error::container;

/// Errors that occur when the program text is malformed.
///
/// These are reported before any exploration begins, and abort the run
/// entirely.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("Loop exit has no matching loop enter")]
    UnmatchedLoopExit,

    #[error("Loop enter has no matching loop exit")]
    UnmatchedLoopEnter,

    #[error("The length of the program exceeded {}", u32::MAX)]
    ProgramTooLarge,
}

/// A load error with an associated location in the program.
pub type LocatedError = container::Located<Error>;

/// The result type for functions that may return load errors.
pub type Result<T> = std::result::Result<T, LocatedError>;

/// Make it possible to attach locations to these errors.
impl container::Locatable for Error {
    type Located = LocatedError;

    fn locate(self, instruction_pointer: u32) -> Self::Located {
        container::Located {
            location: instruction_pointer,
            payload:  self,
        }
    }
}
