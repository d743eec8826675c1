//! This module contains the errors reported by the library: the located
//! [`Error`] type of its interface, the [`Truncation`] reasons for stopping
//! early, and the load and execution error families they are built from.

pub mod container;
pub mod execution;
pub mod load;

use thiserror::Error;

/// The result type of the library interface, which reports every error it
/// found rather than the first.
pub type Result<T> = std::result::Result<T, Errors>;

/// An error reported through the library interface.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Error {
    /// Errors that come from loading the program text.
    #[error(transparent)]
    Load(#[from] load::Error),

    /// Errors that come from executing a path through the program. These
    /// never abort exploration, and are only reported in this form by
    /// [`crate::engine::ExecutionResult::errors`].
    #[error(transparent)]
    Execution(#[from] execution::Error),
}

/// The reasons for which the [`crate::engine::Engine`] may stop exploring
/// before the worklist is empty.
///
/// Truncation is not a fault of any one path. The states that had not yet
/// finished are preserved so that the caller can inspect or resume them.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum Truncation {
    #[error("Exploration exceeded the limit of {limit} live states")]
    LiveStateLimit { limit: usize },

    #[error("Exploration exceeded the limit of {limit} executed instructions")]
    StepLimit { limit: usize },

    #[error("Exploration reached the limit of {limit} finished paths")]
    TerminalStateLimit { limit: usize },

    #[error("Exploration was stopped by the watchdog")]
    StoppedByWatchdog,
}

/// A library error with an associated program location.
pub type LocatedError = container::Located<Error>;

/// A container of errors that may occur in the library.
pub type Errors = container::Errors<LocatedError>;

impl From<load::LocatedError> for LocatedError {
    fn from(value: load::LocatedError) -> Self {
        value.map(Error::Load)
    }
}

impl From<execution::LocatedError> for LocatedError {
    fn from(value: execution::LocatedError) -> Self {
        value.map(Error::Execution)
    }
}

/// Load errors abort the run, so the library interface reports one on its own.
impl From<load::LocatedError> for Errors {
    fn from(value: load::LocatedError) -> Self {
        LocatedError::from(value).into()
    }
}

impl From<execution::Errors> for Errors {
    fn from(value: execution::Errors) -> Self {
        let errors: Vec<execution::LocatedError> = value.into();
        errors.into_iter().map(LocatedError::from).collect::<Vec<_>>().into()
    }
}
