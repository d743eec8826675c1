//! This library implements symbolic execution for programs written for a
//! minimal eight-instruction tape machine. Rather than running a program on
//! one input, it explores every path that the program can take over _all_
//! inputs, recording for each path the condition on the inputs under which it
//! is taken.
//!
//! # How it Works
//!
//! From a very high level, exploration is performed as follows:
//!
//! 1. Program text is ingested and turned into a [`program::Program`]. This is
//!    a sequence of [`opcode::Opcode`]s with its loop structure resolved.
//! 2. A single [`engine::state::ExecutionState`] is created at the start of
//!    the program and placed on the worklist of the [`engine::Engine`].
//! 3. Every read of input stores a fresh symbolic variable rather than a byte.
//!    Arithmetic on such values builds [`expr::Term`]s over the inputs.
//! 4. When a loop test depends on the inputs, the state forks. One side assumes
//!    the tested cell is zero and the other that it is not, each recording its
//!    assumption in its [`expr::PathConstraint`].
//! 5. Every path ends up completed, faulted, or, if a configured limit stopped
//!    exploration early, unexplored. These are returned in an
//!    [`engine::ExecutionResult`].
//!
//! The library does not decide whether a path constraint is satisfiable. Each
//! one can be rendered as an SMT-LIB2 script for an external solver.
//!
//! # Basic Usage
//!
//! For the most basic usage of the library, it is sufficient to construct an
//! `Explorer` and call the `.explore` method.
//!
//! ```
//! use tape_symex::{engine::Config, watchdog::LazyWatchdog};
//!
//! let result = tape_symex::new(",[>]++.", Config::default(), LazyWatchdog.in_rc())
//!     .explore()
//!     .unwrap();
//!
//! // When the input is non-zero, the loop moves right onto a cell of zero.
//! assert_eq!(result.completed.len(), 1);
//! assert_eq!(result.completed[0].constraint().to_string(), "input_0 != 0");
//! assert_eq!(result.completed[0].output_bytes(), Some(vec![2]));
//!
//! // When it is zero, the program writes the symbolic `input_0 + 2`.
//! assert_eq!(result.errored.len(), 1);
//! assert_eq!(result.errored[0].state.constraint().to_string(), "input_0 == 0");
//! ```

#![warn(clippy::all, clippy::cargo, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)] // Allows for better API naming

pub mod constant;
pub mod engine;
pub mod error;
pub mod explorer;
pub mod expr;
pub mod interpreter;
pub mod opcode;
pub mod program;
pub mod report;
pub mod utility;
pub mod watchdog;

use crate::{engine::ExecutionResult, watchdog::LazyWatchdog};

// Re-exports to provide the library interface.
pub use engine::run;
pub use explorer::new;
pub use interpreter::interpret;
pub use program::Program;

/// Explores every path through the program described by `source` on a tape of
/// `tape_capacity` cells, with every other setting at its default.
///
/// # Errors
///
/// Returns [`Err`] if the program cannot be loaded, such as when its loops are
/// unbalanced.
pub fn explore(source: &str, tape_capacity: usize) -> error::Result<ExecutionResult> {
    let config = engine::Config::default().with_tape_capacity(tape_capacity);
    new(source, config, LazyWatchdog.in_rc()).explore()
}
