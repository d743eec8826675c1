//! This module contains common utilities for simplifying the writing of
//! integration tests for this library.

#![cfg(test)]

use tape_symex as symex;
use tape_symex::{
    engine::{state::ExecutionState, Config, ExecutionResult},
    watchdog::{DynWatchdog, LazyWatchdog},
};

/// Installs a logger that writes through the test harness, so that running the
/// tests with `RUST_LOG` set shows what the engine did.
#[allow(unused)] // It is actually
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Explores the program described by `source` with the default configuration.
#[allow(unused)] // It is actually
pub fn explore(source: &str) -> anyhow::Result<ExecutionResult> {
    explore_with(source, Config::default())
}

/// Explores the program described by `source` with the provided `config` and
/// no watchdog.
#[allow(unused)] // It is actually
pub fn explore_with(source: &str, config: Config) -> anyhow::Result<ExecutionResult> {
    explore_watched(source, config, LazyWatchdog.in_rc())
}

/// Explores the program described by `source` with the provided `config` and
/// `watchdog`.
#[allow(unused)] // It is actually
pub fn explore_watched(
    source: &str,
    config: Config,
    watchdog: DynWatchdog,
) -> anyhow::Result<ExecutionResult> {
    init_logging();
    Ok(symex::new(source, config, watchdog).explore()?)
}

/// Gets the path constraints of `states` as strings, sorted so that tests do
/// not depend on the exploration order.
#[allow(unused)] // It is actually
pub fn constraints_of<'a>(states: impl IntoIterator<Item = &'a ExecutionState>) -> Vec<String> {
    let mut constraints: Vec<String> = states
        .into_iter()
        .map(|state| state.constraint().to_string())
        .collect();
    constraints.sort();
    constraints
}
