//! The state representation for the symbolic exploration engine, and the
//! single-step semantics that move a state through the program.

pub mod tape;

use derivative::Derivative;
use uuid::Uuid;

use crate::{
    constant::INPUT_VARIABLE_PREFIX,
    engine::{
        state::tape::Tape,
        value::{Value, ZeroTest},
        Config,
        OutputPolicy,
    },
    error::{
        container::Locatable,
        execution::{Error, LocatedError, Result},
    },
    expr::{PathConstraint, Predicate},
    opcode::Opcode,
    program::Program,
    utility::clip_uuid,
};

/// A snapshot of one path through the program.
///
/// # Ownership
///
/// Every state exclusively owns its tape, loop stack, path constraint and
/// output. Forking produces two fully independent states. The tape shares
/// pages until they are written and the constraint shares the clauses of its
/// ancestors, neither of which is observable by either state, as shared data
/// is never mutated.
///
/// # Identity
///
/// Each state carries a fresh [`Uuid`] along with the identifier of the state
/// it was forked from. These are ignored for the purposes of equality, so two
/// states are equal when they would behave identically from here on.
#[derive(Clone, Derivative)]
#[derivative(Debug, PartialEq)]
pub struct ExecutionState {
    /// The unique identifier of this state.
    #[derivative(PartialEq = "ignore")]
    id: Uuid,

    /// The identifier of the state that this one was forked from, if any.
    #[derivative(PartialEq = "ignore")]
    parent: Option<Uuid>,

    /// The program being executed.
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    program: Program,

    /// The index of the next instruction to execute.
    instruction_pointer: u32,

    /// The tape head. This may be moved outside the tape, and only faults when
    /// the tape is accessed.
    pointer: i64,

    /// The indices of the loop enters of the loops currently being executed,
    /// innermost last.
    loop_stack: Vec<u32>,

    /// The tape of cells.
    #[derivative(Debug = "ignore")]
    tape: Tape,

    /// The conditions on the inputs under which execution follows this path.
    constraint: PathConstraint,

    /// The number of inputs read along this path so far.
    input_counter: usize,

    /// The values written along this path, in order.
    output: Vec<Value>,

    /// What to do when a symbolic value is written.
    #[derivative(PartialEq = "ignore")]
    output_policy: OutputPolicy,

    /// The number of instructions executed along this path, including those
    /// executed by its ancestors.
    #[derivative(PartialEq = "ignore")]
    steps: usize,
}

/// The result of running a state for a bounded number of instructions.
#[derive(Debug)]
pub struct Step {
    /// The number of instructions that were executed.
    pub executed: usize,

    /// Where the state ended up.
    pub outcome: Outcome,
}

/// The ways in which running a state can stop.
#[derive(Debug)]
pub enum Outcome {
    /// The instruction budget ran out before anything else happened.
    Advanced(ExecutionState),

    /// The program counter reached the end of the program.
    Done(ExecutionState),

    /// A loop test depended on the inputs, so the state split in two.
    Forked {
        /// The side on which the tested cell is zero.
        zero: ExecutionState,

        /// The side on which the tested cell is non-zero.
        non_zero: ExecutionState,
    },

    /// The state faulted. Its program counter is left at the faulting
    /// instruction.
    Faulted {
        state: ExecutionState,
        error: LocatedError,
    },
}

/// What the scheduler needs to do after a single instruction.
#[derive(Debug)]
enum Effect {
    Continue,
    Branch(Branch),
}

/// An undetermined loop test, awaiting a fork.
#[derive(Debug)]
struct Branch {
    /// The transitions that each side of the fork takes.
    kind: BranchKind,

    /// The predicate that holds exactly when the tested cell is zero.
    when_zero: Predicate,
}

#[derive(Copy, Clone, Debug)]
enum BranchKind {
    /// At a loop enter. The zero side skips to one past `exit`.
    Enter { exit: u32 },

    /// At a loop exit. The non-zero side repeats from one past `enter`.
    Exit { enter: u32 },
}

impl ExecutionState {
    /// Constructs the initial state for running `program`: the program counter
    /// and tape head at zero, a zeroed tape, and a trivially true constraint.
    #[must_use]
    pub fn new(program: Program, config: &Config) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent: None,
            program,
            instruction_pointer: 0,
            pointer: 0,
            loop_stack: Vec::new(),
            tape: Tape::new(config.tape_capacity),
            constraint: PathConstraint::new(),
            input_counter: 0,
            output: Vec::new(),
            output_policy: config.output_policy,
            steps: 0,
        }
    }

    /// Runs the state until it finishes, faults or forks, or until it has
    /// executed `max_instructions` instructions.
    ///
    /// A state that is already finished is returned as [`Outcome::Done`]
    /// without executing anything.
    #[must_use]
    pub fn step(mut self, max_instructions: usize) -> Step {
        let mut executed = 0;

        loop {
            let Some(opcode) = self.program.instruction(self.instruction_pointer) else {
                return Step {
                    executed,
                    outcome: Outcome::Done(self),
                };
            };
            if executed >= max_instructions {
                return Step {
                    executed,
                    outcome: Outcome::Advanced(self),
                };
            }

            executed += 1;
            self.steps += 1;

            match self.execute(opcode) {
                Ok(Effect::Continue) => (),
                Ok(Effect::Branch(branch)) => {
                    let (zero, non_zero) = self.fork(&branch);
                    return Step {
                        executed,
                        outcome: Outcome::Forked { zero, non_zero },
                    };
                }
                Err(error) => {
                    log::trace!("State {} faulted: {error}", clip_uuid(&self.id));
                    return Step {
                        executed,
                        outcome: Outcome::Faulted { state: self, error },
                    };
                }
            }
        }
    }

    /// Executes `opcode`, the instruction at the current program counter.
    fn execute(&mut self, opcode: Opcode) -> Result<Effect> {
        let instruction_pointer = self.instruction_pointer;
        let pointer = self.pointer;

        match opcode {
            Opcode::IncrementPointer => {
                self.pointer = pointer.wrapping_add(1);
                self.advance();
            }
            Opcode::DecrementPointer => {
                self.pointer = pointer.wrapping_sub(1);
                self.advance();
            }
            Opcode::IncrementCell => {
                let value = self.tape.get(pointer).locate(instruction_pointer)?.add(1);
                self.tape.set(pointer, value).locate(instruction_pointer)?;
                self.advance();
            }
            Opcode::DecrementCell => {
                let value = self.tape.get(pointer).locate(instruction_pointer)?.sub(1);
                self.tape.set(pointer, value).locate(instruction_pointer)?;
                self.advance();
            }
            Opcode::LoopEnter => {
                let test = self.tape.get(pointer).locate(instruction_pointer)?.is_zero();
                match test {
                    ZeroTest::NonZero => self.enter_loop(),
                    ZeroTest::Zero => {
                        let exit = self.loop_exit()?;
                        self.skip_loop(exit);
                    }
                    ZeroTest::Undetermined(when_zero) => {
                        // The target is needed by one side of the fork, so a missing exit
                        // faults the state before it splits.
                        let exit = self.loop_exit()?;
                        let kind = BranchKind::Enter { exit };
                        return Ok(Effect::Branch(Branch { kind, when_zero }));
                    }
                }
            }
            Opcode::LoopExit => {
                let Some(&enter) = self.loop_stack.last() else {
                    return Err(Error::UnbalancedLoop.locate(instruction_pointer));
                };
                let test = self.tape.get(pointer).locate(instruction_pointer)?.is_zero();
                match test {
                    ZeroTest::Zero => self.exit_loop(),
                    ZeroTest::NonZero => self.repeat_loop(enter),
                    ZeroTest::Undetermined(when_zero) => {
                        let kind = BranchKind::Exit { enter };
                        return Ok(Effect::Branch(Branch { kind, when_zero }));
                    }
                }
            }
            Opcode::Read => {
                let name = format!("{INPUT_VARIABLE_PREFIX}{}", self.input_counter);
                self.tape.set(pointer, Value::input(name)).locate(instruction_pointer)?;
                self.input_counter += 1;
                self.advance();
            }
            Opcode::Write => {
                let value = self.tape.get(pointer).locate(instruction_pointer)?;
                if value.is_symbolic() && self.output_policy == OutputPolicy::RejectSymbolic {
                    let error = Error::UnsupportedConcretization { pointer };
                    return Err(error.locate(instruction_pointer));
                }
                self.output.push(value.clone());
                self.advance();
            }
            Opcode::Nop(_) => self.advance(),
        }

        Ok(Effect::Continue)
    }

    /// Splits the state at an undetermined loop test into its zero and
    /// non-zero sides, each with the corresponding clause appended to its
    /// constraint and the corresponding transition applied.
    fn fork(&self, branch: &Branch) -> (ExecutionState, ExecutionState) {
        let mut zero = self.child(branch.when_zero.clone());
        let mut non_zero = self.child(branch.when_zero.negate());

        match branch.kind {
            BranchKind::Enter { exit } => {
                zero.skip_loop(exit);
                non_zero.enter_loop();
            }
            BranchKind::Exit { enter } => {
                zero.exit_loop();
                non_zero.repeat_loop(enter);
            }
        }

        log::trace!(
            "State {} forked at {} into {} (zero) and {} (non-zero)",
            clip_uuid(&self.id),
            self.instruction_pointer,
            clip_uuid(&zero.id),
            clip_uuid(&non_zero.id)
        );

        (zero, non_zero)
    }

    /// Creates an independent copy of this state with `clause` appended to its
    /// constraint.
    fn child(&self, clause: Predicate) -> ExecutionState {
        let mut child = self.clone();
        child.id = Uuid::new_v4();
        child.parent = Some(self.id);
        child.constraint = self.constraint.with_clause(clause);
        child
    }

    /// Gets the exit matching the loop enter at the current program counter.
    fn loop_exit(&self) -> Result<u32> {
        let instruction_pointer = self.instruction_pointer;
        self.program
            .matching_exit(instruction_pointer)
            .ok_or(Error::NoMatchingLoopExit.locate(instruction_pointer))
    }

    fn advance(&mut self) {
        self.instruction_pointer += 1;
    }

    fn enter_loop(&mut self) {
        self.loop_stack.push(self.instruction_pointer);
        self.advance();
    }

    fn skip_loop(&mut self, exit: u32) {
        self.instruction_pointer = exit + 1;
    }

    fn exit_loop(&mut self) {
        self.loop_stack.pop();
        self.advance();
    }

    fn repeat_loop(&mut self, enter: u32) {
        self.instruction_pointer = enter + 1;
    }

    /// Gets the unique identifier of the state.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Gets the identifier of the state that this one was forked from, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Uuid> {
        self.parent
    }

    /// Gets the program that the state executes.
    #[must_use]
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Gets the index of the next instruction to execute.
    #[must_use]
    pub fn instruction_pointer(&self) -> u32 {
        self.instruction_pointer
    }

    /// Gets the position of the tape head.
    #[must_use]
    pub fn pointer(&self) -> i64 {
        self.pointer
    }

    /// Gets the loop enters of the loops currently being executed, innermost
    /// last.
    #[must_use]
    pub fn loop_stack(&self) -> &[u32] {
        self.loop_stack.as_slice()
    }

    /// Gets the tape.
    #[must_use]
    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Gets the tape mutably.
    pub fn tape_mut(&mut self) -> &mut Tape {
        &mut self.tape
    }

    /// Gets the path constraint.
    #[must_use]
    pub fn constraint(&self) -> &PathConstraint {
        &self.constraint
    }

    /// Gets the number of inputs read along this path.
    #[must_use]
    pub fn input_counter(&self) -> usize {
        self.input_counter
    }

    /// Gets the values written along this path.
    #[must_use]
    pub fn output(&self) -> &[Value] {
        self.output.as_slice()
    }

    /// Gets the output as bytes, if every value written was concrete.
    #[must_use]
    pub fn output_bytes(&self) -> Option<Vec<u8>> {
        self.output.iter().map(Value::as_concrete).collect()
    }

    /// Gets the number of instructions executed to reach this state.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Checks if the state has reached the end of the program.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.instruction_pointer >= self.program.end()
    }
}
