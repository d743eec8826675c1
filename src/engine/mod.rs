//! This module contains the symbolic exploration engine.
//!
//! The engine owns a worklist of [`ExecutionState`]s that still need to run.
//! It repeatedly takes one, runs it until something interesting happens, and
//! files the result: finished states are completed, faulted states are
//! recorded alongside their errors, and the two sides of a fork are returned
//! to the worklist. A fault is only ever local to the state that raised it.

pub mod state;
pub mod value;
pub mod worklist;

use serde::{Deserialize, Serialize};

use crate::{
    constant::{
        DEFAULT_MAXIMUM_LIVE_STATES,
        DEFAULT_MAXIMUM_TERMINAL_STATES,
        DEFAULT_MAXIMUM_TOTAL_STEPS,
        DEFAULT_PRUNE_INFEASIBLE,
        DEFAULT_STEPS_PER_SLICE,
        DEFAULT_TAPE_CAPACITY,
    },
    engine::{
        state::{ExecutionState, Outcome},
        worklist::{Strategy, Worklist},
    },
    error::{execution, execution::LocatedError, Errors, Truncation},
    program::{BracketMatching, Program},
    utility::clip_uuid,
    watchdog::{DynWatchdog, LazyWatchdog},
};

/// The engine that explores every path through a program.
#[derive(Clone, Debug)]
pub struct Engine {
    /// The program being explored.
    program: Program,

    /// The states that still need to run.
    worklist: Worklist,

    /// The states that reached the end of the program.
    completed: Vec<ExecutionState>,

    /// The states that faulted, along with their errors.
    faulted: Vec<FaultedState>,

    /// Counters describing the work done so far.
    statistics: Statistics,

    /// The reason the most recent call to [`Self::execute`] stopped early, if
    /// it did.
    truncation: Option<Truncation>,

    /// The configuration of the engine.
    config: Config,

    /// A watchdog that gets polled at intervals to check whether exploration
    /// needs to stop.
    watchdog: DynWatchdog,
}

impl Engine {
    /// Constructs a new engine that explores `program`.
    ///
    /// It is created with a single initial state at the start of the program.
    /// Loops are resolved the way `program` was loaded, whatever the
    /// `bracket_matching` of the `config` says.
    #[must_use]
    pub fn new(program: Program, config: Config, watchdog: DynWatchdog) -> Self {
        if program.bracket_matching() != config.bracket_matching {
            log::warn!(
                "Program was loaded with {:?} bracket matching but the engine is configured for \
                 {:?}; the program's matching applies",
                program.bracket_matching(),
                config.bracket_matching
            );
        }
        let mut worklist = Worklist::new(config.strategy);
        worklist.push(ExecutionState::new(program.clone(), &config));
        let completed = Vec::new();
        let faulted = Vec::new();
        let statistics = Statistics {
            peak_live_states: 1,
            ..Statistics::default()
        };
        let truncation = None;

        Self {
            program,
            worklist,
            completed,
            faulted,
            statistics,
            truncation,
            config,
            watchdog,
        }
    }

    /// Explores the program until no states remain to be run.
    ///
    /// Paths that never reach the end of the program keep exploration going
    /// until one of the limits in the [`Config`] or the watchdog stops it.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if exploration was truncated. The states that had not
    /// finished remain in the engine, and may be inspected or collected with
    /// [`Self::consume`].
    ///
    /// Calling this function again resumes exploration from where it stopped
    /// with a fresh budget of `maximum_total_steps`. The limits on live and
    /// terminal states apply to the engine as a whole, so a call that stopped
    /// at one of those stops again at once.
    pub fn execute(&mut self) -> Result<(), Truncation> {
        let poll_interval = self.watchdog.poll_every().max(1);
        let steps_at_start = self.statistics.total_steps;
        let mut counter: usize = 0;
        self.truncation = None;

        log::info!(
            "Exploring a program of {} instructions with {} pending states",
            self.program.len(),
            self.worklist.len()
        );

        while let Some(state) = self.worklist.take() {
            // If we have been told to stop, stop and report the truncation.
            if counter % poll_interval == 0 && self.watchdog.should_stop() {
                self.worklist.put_back(state);
                return self.truncate(Truncation::StoppedByWatchdog);
            }
            counter += 1;

            // The terminal states are all kept, so their number bounds memory.
            if self.completed.len() + self.faulted.len() >= self.config.maximum_terminal_states {
                self.worklist.put_back(state);
                return self.truncate(Truncation::TerminalStateLimit {
                    limit: self.config.maximum_terminal_states,
                });
            }

            let taken = self.statistics.total_steps - steps_at_start;
            let remaining = self.config.maximum_total_steps.saturating_sub(taken);
            if remaining == 0 {
                self.worklist.put_back(state);
                return self.truncate(Truncation::StepLimit {
                    limit: self.config.maximum_total_steps,
                });
            }

            log::trace!(
                "Running state {} from instruction {}",
                clip_uuid(&state.id()),
                state.instruction_pointer()
            );
            let step = state.step(self.config.steps_per_slice.max(1).min(remaining));
            self.statistics.total_steps += step.executed;
            self.statistics.slices += 1;

            match step.outcome {
                Outcome::Advanced(state) => self.worklist.push(state),
                Outcome::Done(state) => {
                    log::debug!(
                        "State {} completed under {}",
                        clip_uuid(&state.id()),
                        state.constraint()
                    );
                    self.completed.push(state);
                }
                Outcome::Faulted { state, error } => {
                    log::debug!("State {} faulted with {error}", clip_uuid(&state.id()));
                    self.faulted.push(FaultedState { state, error });
                }
                Outcome::Forked { zero, non_zero } => {
                    self.statistics.forks += 1;
                    self.file_fork(zero, non_zero);

                    let live_states = self.worklist.len();
                    self.statistics.peak_live_states =
                        self.statistics.peak_live_states.max(live_states);
                    if live_states > self.config.maximum_live_states {
                        return self.truncate(Truncation::LiveStateLimit {
                            limit: self.config.maximum_live_states,
                        });
                    }
                }
            }
        }

        log::info!(
            "Exploration finished with {} completed and {} errored states after {} steps",
            self.completed.len(),
            self.faulted.len(),
            self.statistics.total_steps
        );

        Ok(())
    }

    /// Adds the two sides of a fork to the worklist such that the zero side
    /// runs first, dropping any side that is provably infeasible if pruning
    /// is enabled.
    fn file_fork(&mut self, zero: ExecutionState, non_zero: ExecutionState) {
        let mut keep = |child: ExecutionState| {
            if let Some(clause) = child.constraint().last() {
                log::debug!(
                    "State {} forked off {} with {clause}",
                    clip_uuid(&child.id()),
                    child.parent().map(|id| clip_uuid(&id)).unwrap_or_default()
                );
            }
            if self.config.prune_infeasible && child.constraint().feasibility().is_infeasible() {
                log::warn!(
                    "Pruning state {} as {} is unsatisfiable",
                    clip_uuid(&child.id()),
                    child.constraint()
                );
                self.statistics.pruned += 1;
                None
            } else {
                Some(child)
            }
        };

        match (keep(zero), keep(non_zero)) {
            (Some(zero), Some(non_zero)) => self.worklist.push_fork(zero, non_zero),
            (Some(child), None) | (None, Some(child)) => self.worklist.push(child),
            (None, None) => (),
        }
    }

    /// Records that exploration stopped early for `reason`.
    fn truncate(&mut self, reason: Truncation) -> Result<(), Truncation> {
        log::warn!(
            "Exploration truncated with {} states left unexplored: {reason}",
            self.worklist.len()
        );
        self.truncation = Some(reason);
        Err(reason)
    }

    /// Gets the program being explored.
    #[must_use]
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Gets the configuration of the engine.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gets the watchdog that the engine polls.
    #[must_use]
    pub fn watchdog(&self) -> &DynWatchdog {
        &self.watchdog
    }

    /// Gets the states that reached the end of the program so far.
    #[must_use]
    pub fn completed_states(&self) -> &[ExecutionState] {
        self.completed.as_slice()
    }

    /// Gets the states that faulted so far.
    #[must_use]
    pub fn faulted_states(&self) -> &[FaultedState] {
        self.faulted.as_slice()
    }

    /// Iterates over the states that still need to run.
    pub fn pending_states(&self) -> impl Iterator<Item = &ExecutionState> {
        self.worklist.iter()
    }

    /// Gets the counters describing the work done so far.
    #[must_use]
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Checks if no states remain to be run.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.worklist.is_empty()
    }

    /// Consumes the engine to produce the result of exploration.
    ///
    /// If the engine has not yet been executed, or was truncated, the states
    /// that still need to run are returned as unexplored.
    #[must_use]
    pub fn consume(self) -> ExecutionResult {
        ExecutionResult {
            program:    self.program,
            completed:  self.completed,
            errored:    self.faulted,
            unexplored: self.worklist.into(),
            truncation: self.truncation,
            statistics: self.statistics,
        }
    }
}

/// A state that faulted, along with the error it faulted with.
#[derive(Clone, Debug, PartialEq)]
pub struct FaultedState {
    pub state: ExecutionState,
    pub error: LocatedError,
}

/// Counters describing the work done by the [`Engine`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Statistics {
    /// The number of instructions executed, summed over every path and every
    /// call to [`Engine::execute`].
    pub total_steps: usize,

    /// The number of times a state was taken from the worklist and run.
    pub slices: usize,

    /// The number of states that split in two.
    pub forks: usize,

    /// The number of forked states discarded as infeasible.
    pub pruned: usize,

    /// The largest number of states that were waiting in the worklist at
    /// once.
    pub peak_live_states: usize,
}

/// The outcome of exploring a program.
#[derive(Clone, Debug)]
pub struct ExecutionResult {
    /// The program that was explored.
    pub program: Program,

    /// The states that reached the end of the program.
    pub completed: Vec<ExecutionState>,

    /// The states that faulted, along with their errors.
    pub errored: Vec<FaultedState>,

    /// The states that had not finished when exploration stopped. Always
    /// empty unless `truncation` is set.
    pub unexplored: Vec<ExecutionState>,

    /// Why exploration stopped early, if it did.
    pub truncation: Option<Truncation>,

    /// Counters describing the work done.
    pub statistics: Statistics,
}

impl ExecutionResult {
    /// Checks if every path through the program was explored to its end.
    #[must_use]
    pub fn is_exhaustive(&self) -> bool {
        self.truncation.is_none() && self.unexplored.is_empty()
    }

    /// Gets the errors of every faulted state as library errors, ordered by
    /// location.
    #[must_use]
    pub fn errors(&self) -> Errors {
        let mut errors = execution::Errors::new();
        for faulted in &self.errored {
            errors.add_located(faulted.error.location, faulted.error.payload.clone());
        }
        errors.into()
    }
}

/// What happens when a path writes a value that is still symbolic.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum OutputPolicy {
    /// The path faults with
    /// [`crate::error::execution::Error::UnsupportedConcretization`].
    #[default]
    RejectSymbolic,

    /// The symbolic value is kept in the path's output record, to be resolved
    /// once a model of the path constraint is available.
    RecordSymbolic,
}

/// The configuration for the exploration engine.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// The number of cells on the tape of every state.
    ///
    /// Defaults to [`DEFAULT_TAPE_CAPACITY`].
    pub tape_capacity: usize,

    /// How the loop structure of the program is resolved when it is loaded.
    /// It applies when loading program text, as through
    /// [`crate::explorer::Explorer::load`]. An [`Engine`] given an already
    /// loaded [`Program`] follows the matching of that program.
    ///
    /// Defaults to [`BracketMatching::Precomputed`].
    pub bracket_matching: BracketMatching,

    /// The order in which pending states are explored.
    ///
    /// Defaults to [`Strategy::DepthFirst`].
    pub strategy: Strategy,

    /// What happens when a symbolic value is written.
    ///
    /// Defaults to [`OutputPolicy::RejectSymbolic`].
    pub output_policy: OutputPolicy,

    /// The maximum number of states that may wait in the worklist before
    /// exploration is truncated.
    ///
    /// Defaults to [`DEFAULT_MAXIMUM_LIVE_STATES`].
    pub maximum_live_states: usize,

    /// The maximum number of completed and faulted states that are kept
    /// before exploration is truncated.
    ///
    /// Defaults to [`DEFAULT_MAXIMUM_TERMINAL_STATES`].
    pub maximum_terminal_states: usize,

    /// The maximum number of instructions, summed over every path, that a
    /// single call to [`Engine::execute`] runs before exploration is
    /// truncated.
    ///
    /// Defaults to [`DEFAULT_MAXIMUM_TOTAL_STEPS`].
    pub maximum_total_steps: usize,

    /// The maximum number of instructions a state runs before control returns
    /// to the scheduler. This bounds how long a single non-terminating path
    /// can delay the limits and the watchdog from being checked.
    ///
    /// Defaults to [`DEFAULT_STEPS_PER_SLICE`].
    pub steps_per_slice: usize,

    /// Whether forked states whose constraints are provably unsatisfiable are
    /// discarded.
    ///
    /// Defaults to [`DEFAULT_PRUNE_INFEASIBLE`].
    pub prune_infeasible: bool,
}

impl Config {
    /// Sets the `tape_capacity` config parameter to `value`.
    #[must_use]
    pub fn with_tape_capacity(mut self, value: usize) -> Self {
        self.tape_capacity = value;
        self
    }

    /// Sets the `bracket_matching` config parameter to `value`.
    #[must_use]
    pub fn with_bracket_matching(mut self, value: BracketMatching) -> Self {
        self.bracket_matching = value;
        self
    }

    /// Sets the `strategy` config parameter to `value`.
    #[must_use]
    pub fn with_strategy(mut self, value: Strategy) -> Self {
        self.strategy = value;
        self
    }

    /// Sets the `output_policy` config parameter to `value`.
    #[must_use]
    pub fn with_output_policy(mut self, value: OutputPolicy) -> Self {
        self.output_policy = value;
        self
    }

    /// Sets the `maximum_live_states` config parameter to `value`.
    #[must_use]
    pub fn with_max_live_states(mut self, value: usize) -> Self {
        self.maximum_live_states = value;
        self
    }

    /// Sets the `maximum_terminal_states` config parameter to `value`.
    #[must_use]
    pub fn with_max_terminal_states(mut self, value: usize) -> Self {
        self.maximum_terminal_states = value;
        self
    }

    /// Sets the `maximum_total_steps` config parameter to `value`.
    #[must_use]
    pub fn with_max_total_steps(mut self, value: usize) -> Self {
        self.maximum_total_steps = value;
        self
    }

    /// Sets the `steps_per_slice` config parameter to `value`.
    #[must_use]
    pub fn with_steps_per_slice(mut self, value: usize) -> Self {
        self.steps_per_slice = value;
        self
    }

    /// Sets the `prune_infeasible` config parameter to `value`.
    #[must_use]
    pub fn with_prune_infeasible(mut self, value: bool) -> Self {
        self.prune_infeasible = value;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        let tape_capacity = DEFAULT_TAPE_CAPACITY;
        let bracket_matching = BracketMatching::default();
        let strategy = Strategy::default();
        let output_policy = OutputPolicy::default();
        let maximum_live_states = DEFAULT_MAXIMUM_LIVE_STATES;
        let maximum_terminal_states = DEFAULT_MAXIMUM_TERMINAL_STATES;
        let maximum_total_steps = DEFAULT_MAXIMUM_TOTAL_STEPS;
        let steps_per_slice = DEFAULT_STEPS_PER_SLICE;
        let prune_infeasible = DEFAULT_PRUNE_INFEASIBLE;
        Self {
            tape_capacity,
            bracket_matching,
            strategy,
            output_policy,
            maximum_live_states,
            maximum_terminal_states,
            maximum_total_steps,
            steps_per_slice,
            prune_infeasible,
        }
    }
}

/// Explores every path through `program` on a tape of `tape_capacity` cells,
/// with every other setting at its default and no watchdog.
///
/// If exploration is truncated by one of the default limits, the partial
/// result is returned with its `truncation` set.
#[must_use]
pub fn run(program: &Program, tape_capacity: usize) -> ExecutionResult {
    let config = Config::default().with_tape_capacity(tape_capacity);
    let mut engine = Engine::new(program.clone(), config, LazyWatchdog.in_rc());
    if engine.execute().is_err() {
        log::debug!("Returning a partial exploration");
    }
    engine.consume()
}
