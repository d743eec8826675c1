//! This module contains the definition of the explorer, the top-level driver
//! of the library.

pub mod state;

use crate::{
    engine,
    engine::{Engine, ExecutionResult},
    error,
    explorer::state::State,
    program::Program,
    report::Summary,
    watchdog::DynWatchdog,
};

/// Creates a new explorer wrapping the provided program `source`, and with the
/// provided engine `config` and `watchdog`.
#[must_use]
pub fn new(
    source: impl Into<String>,
    config: engine::Config,
    watchdog: DynWatchdog,
) -> Explorer<state::HasSource> {
    let source = source.into();
    let state = state::HasSource { config, watchdog };
    Explorer { source, state }
}

/// The `Explorer` is responsible for ingesting program text and producing the
/// set of paths through it.
///
/// # Enforcing Valid State Transitions
///
/// The explorer enforces that only correct state transitions can occur through
/// use of structs that implement the exact state required by it at any given
/// point.
///
/// There is the [`Self::state`] function that provides access to the state data
/// of whichever state the explorer is currently in.
#[derive(Debug)]
pub struct Explorer<S: State> {
    /// The program text that is being explored.
    source: String,

    /// The internal state of the explorer.
    state: S,
}

/// The safe operations available in all states.
impl<S: State> Explorer<S> {
    /// Gets the program text being explored.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Gets an immutable reference to the current state of the explorer.
    pub fn state(&self) -> &S {
        &self.state
    }
}

/// Unsafe operations available in all states.
///
/// These operations are capable of **violating the state invariants** of the
/// explorer, and must be used with the _utmost_ care.
impl<S: State> Explorer<S> {
    /// Gets a mutable reference to the current state of the explorer.
    ///
    /// # Safety
    ///
    /// Do not mutate the state instance unless you totally understand the
    /// state that the explorer is in, and the implications of doing so.
    pub unsafe fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Forces the explorer into the state `NS`, with the value of the state
    /// created by applying `transform` to the explorer's current state and
    /// disregarding any safety with regard to state transitions.
    ///
    /// # Safety
    ///
    /// Do not force a state transition for the explorer unless you totally
    /// understand the state that the explorer is in, and the implications
    /// of doing so.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the provided `transform` returns [`Err`].
    pub unsafe fn transform_state<NS: State>(
        self,
        transform: impl FnOnce(S) -> error::Result<NS>,
    ) -> error::Result<Explorer<NS>> {
        let state = transform(self.state)?;
        let source = self.source;

        Ok(Explorer { source, state })
    }
}

/// A type that allows the user to easily name the initial state of the
/// explorer.
pub type InitialExplorer = Explorer<state::HasSource>;

/// Operations available on a newly-created explorer.
impl Explorer<state::HasSource> {
    /// Executes the exploration process from beginning to end, performing all
    /// the intermediate steps automatically and returning the result.
    ///
    /// A truncated exploration is not an error. The result records the
    /// truncation along with the paths it left unexplored.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the program cannot be loaded.
    pub fn explore(self) -> error::Result<ExecutionResult> {
        let explorer = self.load()?;
        let explorer = explorer.prepare_engine();
        let explorer = explorer.execute();

        Ok(explorer.into_result())
    }

    /// Loads the program text, resolving its loop structure as the
    /// configuration asks.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the program is malformed. Nothing is explored for
    /// such a program.
    pub fn load(self) -> error::Result<Explorer<state::ProgramLoaded>> {
        let program = Program::load(&self.source, self.state.config.bracket_matching)?;
        log::debug!(
            "Loaded a program of {} instructions with {:?} bracket matching",
            program.len(),
            program.bracket_matching()
        );

        unsafe {
            self.transform_state(|old_state| {
                let config = old_state.config;
                let watchdog = old_state.watchdog;
                Ok(state::ProgramLoaded {
                    program,
                    config,
                    watchdog,
                })
            })
        }
    }
}

/// Operations available on an explorer that has loaded its program.
impl Explorer<state::ProgramLoaded> {
    /// Prepares the engine to explore the loaded program.
    #[must_use]
    pub fn prepare_engine(self) -> Explorer<state::EngineReady> {
        let state::ProgramLoaded {
            program,
            config,
            watchdog,
        } = self.state;
        let engine = Engine::new(program, config, watchdog);

        Explorer {
            source: self.source,
            state:  state::EngineReady { engine },
        }
    }

    /// Gets the loaded program.
    #[must_use]
    pub fn program(&self) -> &Program {
        &self.state.program
    }
}

/// Operations available on an explorer that is ready to explore.
impl Explorer<state::EngineReady> {
    /// Explores the program until every path is finished, or until one of the
    /// configured limits stops exploration.
    #[must_use]
    pub fn execute(self) -> Explorer<state::ExplorationComplete> {
        let mut engine = self.state.engine;
        if let Err(truncation) = engine.execute() {
            log::warn!("Exploration of the program did not finish: {truncation}");
        }
        let result = engine.consume();

        Explorer {
            source: self.source,
            state:  state::ExplorationComplete { result },
        }
    }

    /// Gets the prepared engine.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.state.engine
    }
}

/// Operations available on an explorer that has finished exploring.
impl Explorer<state::ExplorationComplete> {
    /// Gets the result of exploration.
    #[must_use]
    pub fn result(&self) -> &ExecutionResult {
        &self.state.result
    }

    /// Describes the result of exploration in serializable form.
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary::from(&self.state.result)
    }

    /// Consumes the explorer to get the result of exploration.
    #[must_use]
    pub fn into_result(self) -> ExecutionResult {
        self.state.result
    }
}

#[cfg(test)]
mod test {
    use crate::{
        engine::Config,
        error::{load, Error},
        explorer,
        program::BracketMatching,
        watchdog::LazyWatchdog,
    };

    #[test]
    fn steps_through_each_state() -> anyhow::Result<()> {
        let explorer = explorer::new(",[>]", Config::default(), LazyWatchdog.in_rc());
        assert_eq!(explorer.source(), ",[>]");

        let explorer = explorer.load()?;
        assert_eq!(explorer.program().len(), 4);

        let explorer = explorer.prepare_engine();
        assert!(!explorer.engine().is_complete());

        let explorer = explorer.execute();
        assert_eq!(explorer.result().completed.len(), 2);
        assert_eq!(explorer.summary().completed, 2);

        Ok(())
    }

    #[test]
    fn load_errors_abort_exploration() {
        let errors = explorer::new("+]", Config::default(), LazyWatchdog.in_rc())
            .explore()
            .expect_err("Explored an unbalanced program");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.payloads()[0].location, 1);
        assert_eq!(
            errors.payloads()[0].payload,
            Error::Load(load::Error::UnmatchedLoopExit)
        );
    }

    #[test]
    fn lazy_matching_defers_balance_errors_to_the_paths() -> anyhow::Result<()> {
        let config = Config::default().with_bracket_matching(BracketMatching::Lazy);
        let result = explorer::new("+]", config, LazyWatchdog.in_rc()).explore()?;

        assert!(result.completed.is_empty());
        assert_eq!(result.errored.len(), 1);

        Ok(())
    }

    #[test]
    fn truncation_is_kept_in_the_result() -> anyhow::Result<()> {
        let config = Config::default().with_max_total_steps(50);
        let result = explorer::new("+[]", config, LazyWatchdog.in_rc()).explore()?;

        assert!(result.truncation.is_some());
        assert_eq!(result.unexplored.len(), 1);

        Ok(())
    }
}
