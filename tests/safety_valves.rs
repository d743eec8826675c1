//! This module tests that exploration of programs with unboundedly many paths
//! stops where it is told to, keeping everything it has found.
#![cfg(test)]

use std::{
    collections::BTreeSet,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use tape_symex::{
    constant::DEFAULT_MAXIMUM_TERMINAL_STATES,
    engine::Config,
    error::Truncation,
    expr::Predicate,
    watchdog::{DeadlineWatchdog, FlagWatchdog},
};

mod common;

/// Every trip around this loop forks again, so without pruning the non-zero
/// side never finishes.
const COUNTDOWN: &str = ",[-]";

/// Finishes a path on every trip around a loop that never ends.
const SPIN: &str = ",[]";

/// Reads forever while the last input was non-zero, so every fork is feasible.
const READ_LOOP: &str = ",[>,]";

#[test]
fn the_step_limit_truncates_exploration() -> anyhow::Result<()> {
    let config = Config::default().with_max_total_steps(10_000);
    let result = common::explore_with(READ_LOOP, config)?;

    assert_eq!(result.truncation, Some(Truncation::StepLimit { limit: 10_000 }));
    assert_eq!(result.statistics.total_steps, 10_000);
    assert!(!result.is_exhaustive());
    assert!(!result.completed.is_empty());
    assert!(!result.unexplored.is_empty());

    Ok(())
}

#[test]
fn the_live_state_limit_truncates_exploration() -> anyhow::Result<()> {
    let config = Config::default().with_max_live_states(1);
    let result = common::explore_with(READ_LOOP, config)?;

    assert_eq!(result.truncation, Some(Truncation::LiveStateLimit { limit: 1 }));
    assert_eq!(result.unexplored.len(), 2);

    Ok(())
}

#[test]
fn the_flag_watchdog_stops_exploration() -> anyhow::Result<()> {
    let flag = Arc::new(AtomicBool::new(false));
    flag.store(true, Ordering::Relaxed);
    let watchdog = FlagWatchdog::new(flag).polling_every(1).in_rc();

    let result = common::explore_watched(READ_LOOP, Config::default(), watchdog)?;

    assert_eq!(result.truncation, Some(Truncation::StoppedByWatchdog));
    assert_eq!(result.unexplored.len(), 1);
    assert!(result.completed.is_empty());

    Ok(())
}

#[test]
fn the_deadline_watchdog_stops_exploration() -> anyhow::Result<()> {
    let watchdog = DeadlineWatchdog::new(Duration::from_millis(50)).polling_every(1).in_rc();
    let config = Config::default().with_steps_per_slice(100);

    let result = common::explore_watched(READ_LOOP, config, watchdog)?;

    assert_eq!(result.truncation, Some(Truncation::StoppedByWatchdog));
    assert!(!result.completed.is_empty());

    Ok(())
}

#[test]
fn pruning_makes_bounded_countdowns_finite() -> anyhow::Result<()> {
    let config = Config::default().with_prune_infeasible(true);
    let result = common::explore_with(COUNTDOWN, config)?;

    assert!(result.is_exhaustive());
    assert!(result.errored.is_empty());
    assert_eq!(result.completed.len(), 256);
    assert_eq!(result.statistics.pruned, 1);

    Ok(())
}

#[test]
fn countdowns_need_a_limit_without_pruning() -> anyhow::Result<()> {
    let config = Config::default().with_max_total_steps(5_000);
    let result = common::explore_with(COUNTDOWN, config)?;

    assert!(result.truncation.is_some());
    assert_eq!(result.statistics.pruned, 0);

    // Every completed path leaves the loop after a distinct number of trips.
    let trips: BTreeSet<usize> = result
        .completed
        .iter()
        .map(|state| state.constraint().len())
        .collect();
    assert!(result.completed.len() > 1);
    assert_eq!(trips.len(), result.completed.len());

    Ok(())
}

#[test]
fn the_default_limits_stop_a_loop_that_finishes_a_path_every_trip() -> anyhow::Result<()> {
    common::init_logging();
    let result = tape_symex::explore(SPIN, 16)?;

    assert_eq!(
        result.truncation,
        Some(Truncation::TerminalStateLimit {
            limit: DEFAULT_MAXIMUM_TERMINAL_STATES,
        })
    );
    assert_eq!(result.completed.len(), DEFAULT_MAXIMUM_TERMINAL_STATES);
    assert_eq!(result.unexplored.len(), 1);
    assert_eq!(
        result.unexplored[0].constraint().len(),
        DEFAULT_MAXIMUM_TERMINAL_STATES
    );

    Ok(())
}

#[test]
fn a_truncated_spin_keeps_each_exit_once() -> anyhow::Result<()> {
    let config = Config::default().with_max_total_steps(20_000);
    let result = common::explore_with(SPIN, config)?;

    assert_eq!(result.truncation, Some(Truncation::StepLimit { limit: 20_000 }));
    let exits: BTreeSet<usize> = result
        .completed
        .iter()
        .map(|state| state.constraint().len())
        .collect();
    assert!(result.completed.len() > 1_000);
    assert_eq!(exits.len(), result.completed.len());

    // Each path left the loop under a zero test, after its parent's clauses.
    let unexplored = &result.unexplored[0];
    for state in &result.completed {
        let last = state.constraint().last().expect("Completed path has no clauses");
        assert!(matches!(last, Predicate::IsZero(_)));
    }
    assert_eq!(
        result.completed[1].constraint().clauses()[0],
        unexplored.constraint().clauses()[0]
    );

    Ok(())
}
