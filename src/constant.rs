//! This module contains constants that are needed throughout the codebase.

/// The width of a tape cell in bits.
pub const CELL_SIZE_BITS: u32 = 8;

/// The number of distinct values that a single tape cell can hold.
pub const CELL_VALUE_COUNT: usize = 1 << CELL_SIZE_BITS;

/// The default number of cells on the tape of a symbolic exploration run.
///
/// The tape size is a fixed parameter of an exploration run, as it affects
/// which accesses fault and hence the identity of the explored paths.
pub const DEFAULT_TAPE_CAPACITY: usize = 30_000;

/// The number of cells stored in each copy-on-write page of the symbolic tape.
///
/// Forking a state copies one pointer per page, while the first write to a
/// page after a fork copies this many cells.
pub const TAPE_PAGE_SIZE_CELLS: usize = 256;

/// The maximum number of instructions that a program may contain, so that
/// every instruction and the end of the program have a `u32` index.
pub const PROGRAM_MAXIMUM_SIZE: usize = u32::MAX as usize;

/// The prefix used to name the symbolic variables created by input reads.
///
/// The `n`th read along a path is named `input_n`.
pub const INPUT_VARIABLE_PREFIX: &str = "input_";

/// The byte that the concrete interpreter stores when the input stream yields
/// a newline or has been exhausted.
pub const END_OF_INPUT_BYTE: u8 = 0;

/// The default maximum number of states that may be waiting in the worklist
/// at once before exploration is truncated.
pub const DEFAULT_MAXIMUM_LIVE_STATES: usize = 100_000;

/// The default maximum number of completed and faulted states the engine keeps
/// before exploration is truncated.
///
/// Every terminal state is retained until exploration finishes, so this is what
/// bounds the memory of a program that finishes a path on every trip around a
/// loop that never ends.
pub const DEFAULT_MAXIMUM_TERMINAL_STATES: usize = 100_000;

/// The default maximum number of instructions, summed over every path, that
/// the engine executes in one call before exploration is truncated.
pub const DEFAULT_MAXIMUM_TOTAL_STEPS: usize = 500_000_000;

/// The default maximum number of instructions that a single state executes
/// before control returns to the scheduler.
pub const DEFAULT_STEPS_PER_SLICE: usize = 10_000;

/// The default value for whether forked states with provably unsatisfiable
/// path constraints are discarded.
pub const DEFAULT_PRUNE_INFEASIBLE: bool = false;

/// The default number of scheduling slices the engine will wait before
/// polling the watchdog.
pub const DEFAULT_WATCHDOG_POLL_LOOP_ITERATIONS: usize = 100;
