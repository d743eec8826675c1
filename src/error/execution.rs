//! This module contains errors pertaining to the execution of a program, both
//! symbolically by the [`crate::engine::Engine`] and concretely by the
//! [`crate::interpreter`].
//!
//! Every error here is local to the path on which it arises. The engine files
//! the faulting state alongside its error and continues exploring the rest.

use thiserror::Error;

use crate::error::container;

/// Faults that occur while executing a single path through the program.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("Tape access at {pointer} is outside the tape of {capacity} cells")]
    MemoryAccess { pointer: i64, capacity: usize },

    #[error("Loop exit encountered with no enclosing loop on the stack")]
    UnbalancedLoop,

    #[error("No matching loop exit could be found to skip the loop body")]
    NoMatchingLoopExit,

    #[error("Cannot write the unresolved symbolic value in cell {pointer} to the output")]
    UnsupportedConcretization { pointer: i64 },
}

/// An execution error with an associated location in the program.
pub type LocatedError = container::Located<Error>;

/// A container of execution errors used for aggregation of errors during
/// execution.
pub type Errors = container::Errors<LocatedError>;

/// The result type for methods that may have execution errors.
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
