//! This module tests the library end to end on small programs whose paths are
//! known exactly.
#![cfg(test)]

use tape_symex::{
    engine::Config,
    error::{execution, load, Error},
    interpret,
    program::{BracketMatching, Program},
};

mod common;

#[test]
fn writes_a_computed_byte() -> anyhow::Result<()> {
    let program = Program::new("++.")?;
    assert_eq!(interpret(&program, &[])?, vec![2]);

    let result = common::explore("++.")?;
    assert!(result.is_exhaustive());
    assert!(result.errored.is_empty());
    assert_eq!(result.completed.len(), 1);
    assert_eq!(result.completed[0].output_bytes(), Some(vec![2]));
    assert!(result.completed[0].constraint().is_empty());

    Ok(())
}

#[test]
fn splits_on_a_loop_over_an_input() -> anyhow::Result<()> {
    let result = common::explore(",[>]")?;

    assert!(result.errored.is_empty());
    assert_eq!(result.completed.len(), 2);
    assert_eq!(
        common::constraints_of(&result.completed),
        vec!["input_0 != 0", "input_0 == 0"]
    );

    Ok(())
}

#[test]
fn rejects_a_lone_loop_exit_at_load_time() {
    let errors = common::explore("]").expect_err("Explored an unbalanced program");
    let errors = errors
        .downcast::<tape_symex::error::Errors>()
        .expect("Load failed with an unexpected error type");

    assert_eq!(errors.len(), 1);
    assert_eq!(errors.payloads()[0].location, 0);
    assert_eq!(
        errors.payloads()[0].payload,
        Error::Load(load::Error::UnmatchedLoopExit)
    );
}

#[test]
fn faults_on_a_lone_loop_exit_when_lazy() -> anyhow::Result<()> {
    let config = Config::default().with_bracket_matching(BracketMatching::Lazy);
    let result = common::explore_with("]", config)?;

    assert!(result.completed.is_empty());
    assert_eq!(result.errored.len(), 1);
    assert_eq!(result.errored[0].error.location, 0);
    assert_eq!(result.errored[0].error.payload, execution::Error::UnbalancedLoop);

    Ok(())
}

#[test]
fn faults_on_a_move_off_the_left_of_the_tape() -> anyhow::Result<()> {
    let result = common::explore("<+")?;

    assert!(result.completed.is_empty());
    assert_eq!(result.errored.len(), 1);

    let faulted = &result.errored[0];
    assert_eq!(faulted.error.location, 1);
    assert_eq!(
        faulted.error.payload,
        execution::Error::MemoryAccess {
            pointer:  -1,
            capacity: 30_000,
        }
    );
    assert_eq!(faulted.state.instruction_pointer(), 1);

    Ok(())
}

#[test]
fn splits_on_every_combination_of_two_loops() -> anyhow::Result<()> {
    // The second read is two cells to the right of wherever the first loop
    // left the head, so it always lands on an untouched cell.
    let result = common::explore(",[>]>>,[>]")?;

    assert!(result.errored.is_empty());
    assert_eq!(result.completed.len(), 4);
    assert!(result.completed.iter().all(|state| state.constraint().len() == 2));
    assert_eq!(
        common::constraints_of(&result.completed),
        vec![
            "input_0 != 0 && input_1 != 0",
            "input_0 != 0 && input_1 == 0",
            "input_0 == 0 && input_1 != 0",
            "input_0 == 0 && input_1 == 0",
        ]
    );

    Ok(())
}

#[test]
fn faults_at_the_right_end_of_a_small_tape() -> anyhow::Result<()> {
    let result = tape_symex::explore(">>>+", 3)?;

    assert_eq!(result.errored.len(), 1);
    assert_eq!(
        result.errored[0].error.payload,
        execution::Error::MemoryAccess {
            pointer:  3,
            capacity: 3,
        }
    );

    Ok(())
}

#[test]
fn treats_other_characters_as_comments() -> anyhow::Result<()> {
    let source = "add two: ++ then print: .";
    let program = Program::new(source)?;
    assert_eq!(interpret(&program, &[])?, vec![2]);

    let result = common::explore(source)?;
    assert_eq!(result.completed.len(), 1);
    assert_eq!(result.completed[0].output_bytes(), Some(vec![2]));

    Ok(())
}

#[test]
fn explores_the_empty_program() -> anyhow::Result<()> {
    let result = common::explore("")?;

    assert_eq!(result.completed.len(), 1);
    assert!(result.completed[0].is_done());
    assert!(result.completed[0].output().is_empty());

    Ok(())
}
