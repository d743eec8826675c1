//! This module contains the worklist of states that are waiting to be run.

use std::collections::VecDeque;

use crate::engine::state::ExecutionState;

/// The order in which the engine explores pending states.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Strategy {
    /// The most recently produced state is run next, so each path is followed
    /// as far as possible before its siblings. This keeps the number of live
    /// states proportional to the depth of the fork tree.
    #[default]
    DepthFirst,

    /// The least recently produced state is run next, so paths are explored
    /// in order of the number of forks along them.
    BreadthFirst,
}

/// The pending states, ordered by a [`Strategy`].
#[derive(Clone, Debug)]
pub struct Worklist {
    strategy: Strategy,
    states:   VecDeque<ExecutionState>,
}

impl Worklist {
    /// Constructs an empty worklist that orders its states by `strategy`.
    #[must_use]
    pub fn new(strategy: Strategy) -> Self {
        let states = VecDeque::new();
        Self { strategy, states }
    }

    /// Takes the next state to run, if any.
    pub fn take(&mut self) -> Option<ExecutionState> {
        match self.strategy {
            Strategy::DepthFirst => self.states.pop_back(),
            Strategy::BreadthFirst => self.states.pop_front(),
        }
    }

    /// Adds a newly produced state.
    pub fn push(&mut self, state: ExecutionState) {
        self.states.push_back(state);
    }

    /// Returns a state obtained from [`Self::take`] without running it, so
    /// that it is the next one taken.
    pub fn put_back(&mut self, state: ExecutionState) {
        match self.strategy {
            Strategy::DepthFirst => self.states.push_back(state),
            Strategy::BreadthFirst => self.states.push_front(state),
        }
    }

    /// Adds the two sides of a fork such that `first` is taken before
    /// `second`.
    pub fn push_fork(&mut self, first: ExecutionState, second: ExecutionState) {
        match self.strategy {
            Strategy::DepthFirst => {
                self.states.push_back(second);
                self.states.push_back(first);
            }
            Strategy::BreadthFirst => {
                self.states.push_back(first);
                self.states.push_back(second);
            }
        }
    }

    /// Gets the number of pending states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Checks if there are no pending states.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Iterates over the pending states in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &ExecutionState> {
        self.states.iter()
    }

    /// Gets the order in which states are taken.
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }
}

impl From<Worklist> for Vec<ExecutionState> {
    fn from(value: Worklist) -> Self {
        value.states.into()
    }
}
