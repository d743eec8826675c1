//! This module contains the serializable reports that describe the result of
//! an exploration run.
//!
//! The engine's own types hold shared, reference-counted terms that are not
//! meant to outlive a run. Reports flatten them to plain strings and numbers so
//! that results can be printed, stored or compared by external tooling.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    engine::{state::ExecutionState, ExecutionResult, Statistics},
    error::execution::LocatedError,
};

/// How a path ended up.
#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStatus {
    /// The path reached the end of the program.
    Completed,

    /// The path faulted.
    Errored,

    /// Exploration stopped before the path finished.
    Unexplored,
}

/// A single non-zero cell of the tape at the end of a path.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct CellReport {
    /// The index of the cell.
    pub index: usize,

    /// The value in the cell, with symbolic values in braces.
    pub value: String,
}

/// A description of one path through the program.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PathReport {
    /// The identifier of the final state of the path.
    pub id: Uuid,

    /// The identifier of the state it was forked from.
    pub parent: Option<Uuid>,

    pub status: PathStatus,

    /// The path constraint, written as a conjunction.
    pub constraint: String,

    /// The path constraint as an SMT-LIB2 script.
    pub smtlib: String,

    /// The final program counter. For errored paths this is the instruction
    /// that faulted.
    pub instruction_pointer: u32,

    /// The final position of the tape head.
    pub pointer: i64,

    /// The values written along the path.
    pub output: Vec<String>,

    /// The output as bytes, when every value written was concrete.
    pub output_bytes: Option<Vec<u8>>,

    /// The cells of the final tape that do not hold zero.
    pub cells: Vec<CellReport>,

    /// The fault, for errored paths.
    pub error: Option<String>,
}

impl PathReport {
    /// Describes the path that led to `state`, which ended up with `status`
    /// and possibly faulted with `error`.
    #[must_use]
    pub fn new(state: &ExecutionState, status: PathStatus, error: Option<&LocatedError>) -> Self {
        let cells = state
            .tape()
            .non_zero_cells()
            .map(|(index, value)| CellReport {
                index,
                value: value.to_string(),
            })
            .collect();

        Self {
            id: state.id(),
            parent: state.parent(),
            status,
            constraint: state.constraint().to_string(),
            smtlib: state.constraint().to_smtlib(),
            instruction_pointer: state.instruction_pointer(),
            pointer: state.pointer(),
            output: state.output().iter().map(ToString::to_string).collect(),
            output_bytes: state.output_bytes(),
            cells,
            error: error.map(ToString::to_string),
        }
    }
}

/// A description of a whole exploration run.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Summary {
    /// The number of paths that reached the end of the program.
    pub completed: usize,

    /// The number of paths that faulted.
    pub errored: usize,

    /// The number of paths left unfinished.
    pub unexplored: usize,

    /// Why exploration stopped early, if it did.
    pub truncation: Option<String>,

    /// Counters describing the work done.
    pub statistics: Statistics,

    /// Every path, completed ones first, then errored, then unexplored.
    pub paths: Vec<PathReport>,
}

impl From<&ExecutionResult> for Summary {
    fn from(result: &ExecutionResult) -> Self {
        let completed = result
            .completed
            .iter()
            .map(|state| PathReport::new(state, PathStatus::Completed, None));
        let errored = result
            .errored
            .iter()
            .map(|faulted| {
                PathReport::new(&faulted.state, PathStatus::Errored, Some(&faulted.error))
            });
        let unexplored = result
            .unexplored
            .iter()
            .map(|state| PathReport::new(state, PathStatus::Unexplored, None));

        Self {
            completed:  result.completed.len(),
            errored:    result.errored.len(),
            unexplored: result.unexplored.len(),
            truncation: result.truncation.map(|reason| reason.to_string()),
            statistics: result.statistics.clone(),
            paths:      completed.chain(errored).chain(unexplored).collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        engine::run,
        program::Program,
        report::{PathStatus, Summary},
    };

    #[test]
    fn summarizes_every_path() -> anyhow::Result<()> {
        let result = run(&Program::new(",[>+[<<]]")?, 16);
        let summary = Summary::from(&result);

        assert_eq!(summary.completed, 1);
        assert_eq!(summary.errored, 1);
        assert_eq!(summary.unexplored, 0);
        assert_eq!(summary.truncation, None);
        assert_eq!(summary.paths.len(), 2);

        let completed = &summary.paths[0];
        assert_eq!(completed.status, PathStatus::Completed);
        assert_eq!(completed.constraint, "input_0 == 0");
        assert_eq!(completed.error, None);

        let errored = &summary.paths[1];
        assert_eq!(errored.status, PathStatus::Errored);
        assert_eq!(errored.constraint, "input_0 != 0");
        assert_eq!(errored.instruction_pointer, 7);
        assert_eq!(errored.pointer, -1);
        assert_eq!(errored.cells.len(), 2);
        assert_eq!(errored.cells[0].value, "{input_0}");
        assert_eq!(errored.cells[1].value, "1");
        assert!(errored.error.as_deref().is_some_and(|e| e.starts_with("[0x00000007]")));

        Ok(())
    }
}
