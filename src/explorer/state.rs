//! This module contains the state tracking functionality for the explorer.

use std::fmt::Debug;

use crate::{
    engine,
    engine::{Engine, ExecutionResult},
    program::Program,
    watchdog::DynWatchdog,
};

/// A marker trait that says that the type implementing it is an explorer
/// state.
///
/// Explorer states can be transitioned between as part of the
/// [`crate::explorer::Explorer`] state machine, and are intended to enforce
/// that correct state transitions take place.
pub trait State
where
    Self: Debug + Sized,
{
}

/// The initial state for the explorer, holding only the program text.
#[derive(Debug)]
pub struct HasSource {
    /// The engine configuration.
    pub config: engine::Config,

    /// The watchdog that is monitoring the progress of the explorer.
    pub watchdog: DynWatchdog,
}
impl State for HasSource {}

/// The explorer has loaded the program text, and its loop structure has been
/// resolved as the configuration asks.
#[derive(Debug)]
pub struct ProgramLoaded {
    /// The loaded program.
    pub program: Program,

    /// The engine configuration.
    pub config: engine::Config,

    /// The watchdog that is monitoring the progress of the explorer.
    pub watchdog: DynWatchdog,
}
impl State for ProgramLoaded {}

/// The explorer has prepared the engine, seeded with the initial state.
#[derive(Debug)]
pub struct EngineReady {
    /// The engine, ready to explore.
    pub engine: Engine,
}
impl State for EngineReady {}

/// The explorer has finished exploring, either exhaustively or until one of
/// its limits stopped it.
#[derive(Debug)]
pub struct ExplorationComplete {
    /// The result of exploring the program.
    pub result: ExecutionResult,
}
impl State for ExplorationComplete {}
