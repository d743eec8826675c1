//! This module contains a concrete interpreter for tape-machine programs.
//!
//! It runs a program against a real input stream, and serves as the reference
//! against which the symbolic engine is checked. For a program without reads,
//! exploration produces exactly one path, and its output must be the output of
//! this interpreter.
//!
//! # Input Convention
//!
//! Every read consumes one byte of input. A newline, or an input stream that
//! has run dry, stores [`END_OF_INPUT_BYTE`] instead. Concretizing the inputs
//! of a symbolic path must respect the same convention for the two to agree.

use crate::{
    constant::END_OF_INPUT_BYTE,
    error::{
        container::Locatable,
        execution::{Error, Result},
    },
    opcode::Opcode,
    program::Program,
};

/// How the tape of the interpreter behaves when the head moves past its
/// right end.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum TapeBound {
    /// The tape grows on demand, so only accesses left of the first cell
    /// fault.
    #[default]
    Growable,

    /// The tape has exactly this many cells, matching the fixed tape of the
    /// symbolic engine.
    Fixed(usize),
}

/// Runs `program` against `input` on a growable tape, returning the bytes it
/// writes.
///
/// # Errors
///
/// Returns [`Err`] if the program faults.
pub fn interpret(program: &Program, input: &[u8]) -> Result<Vec<u8>> {
    Interpreter::new(program, input, TapeBound::Growable).run()
}

/// The concrete machine state for a single run of a program.
#[derive(Clone, Debug)]
pub struct Interpreter<'a> {
    program: &'a Program,
    bound: TapeBound,
    tape: Vec<u8>,
    pointer: i64,
    instruction_pointer: u32,
    loop_stack: Vec<u32>,
    input: std::slice::Iter<'a, u8>,
    output: Vec<u8>,
}

impl<'a> Interpreter<'a> {
    /// Constructs an interpreter at the start of `program`, reading from
    /// `input`.
    #[must_use]
    pub fn new(program: &'a Program, input: &'a [u8], bound: TapeBound) -> Self {
        let tape = match bound {
            TapeBound::Growable => Vec::new(),
            TapeBound::Fixed(capacity) => vec![0; capacity],
        };
        Self {
            program,
            bound,
            tape,
            pointer: 0,
            instruction_pointer: 0,
            loop_stack: Vec::new(),
            input: input.iter(),
            output: Vec::new(),
        }
    }

    /// Runs the program to its end, returning everything it wrote.
    ///
    /// This does not return if the program does not terminate on the given
    /// input.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the program faults.
    pub fn run(mut self) -> Result<Vec<u8>> {
        while let Some(opcode) = self.program.instruction(self.instruction_pointer) {
            self.execute(opcode).locate(self.instruction_pointer)?;
        }
        Ok(self.output)
    }

    /// Executes `opcode`, the instruction at the current program counter.
    fn execute(&mut self, opcode: Opcode) -> std::result::Result<(), Error> {
        match opcode {
            Opcode::IncrementPointer => self.pointer = self.pointer.wrapping_add(1),
            Opcode::DecrementPointer => self.pointer = self.pointer.wrapping_sub(1),
            Opcode::IncrementCell => {
                let cell = self.cell()?;
                *cell = cell.wrapping_add(1);
            }
            Opcode::DecrementCell => {
                let cell = self.cell()?;
                *cell = cell.wrapping_sub(1);
            }
            Opcode::LoopEnter => {
                if *self.cell()? == 0 {
                    let exit = self
                        .program
                        .matching_exit(self.instruction_pointer)
                        .ok_or(Error::NoMatchingLoopExit)?;
                    self.instruction_pointer = exit + 1;
                    return Ok(());
                }
                self.loop_stack.push(self.instruction_pointer);
            }
            Opcode::LoopExit => {
                let Some(&enter) = self.loop_stack.last() else {
                    return Err(Error::UnbalancedLoop);
                };
                if *self.cell()? != 0 {
                    self.instruction_pointer = enter + 1;
                    return Ok(());
                }
                self.loop_stack.pop();
            }
            Opcode::Read => {
                let byte = match self.input.next() {
                    Some(b'\n') | None => END_OF_INPUT_BYTE,
                    Some(byte) => *byte,
                };
                *self.cell()? = byte;
            }
            Opcode::Write => {
                let byte = *self.cell()?;
                self.output.push(byte);
            }
            Opcode::Nop(_) => (),
        }

        self.instruction_pointer += 1;
        Ok(())
    }

    /// Gets the cell under the head, growing the tape if it is allowed to.
    fn cell(&mut self) -> std::result::Result<&mut u8, Error> {
        let fault = Error::MemoryAccess {
            pointer:  self.pointer,
            capacity: self.tape.len(),
        };
        let index = usize::try_from(self.pointer).map_err(|_| fault.clone())?;

        if index >= self.tape.len() {
            match self.bound {
                TapeBound::Growable => self.tape.resize(index + 1, 0),
                TapeBound::Fixed(_) => return Err(fault),
            }
        }

        Ok(&mut self.tape[index])
    }
}

#[cfg(test)]
mod test {
    use crate::{
        error::execution::Error,
        interpreter::{interpret, Interpreter, TapeBound},
        program::Program,
    };

    #[test]
    fn writes_cell_values() -> anyhow::Result<()> {
        assert_eq!(interpret(&Program::new("++.")?, &[])?, vec![2]);
        Ok(())
    }

    #[test]
    fn runs_loops() -> anyhow::Result<()> {
        // 8 * 8 = 64, plus one.
        let program = Program::new("++++++++[>++++++++<-]>+.")?;
        assert_eq!(interpret(&program, &[])?, vec![65]);
        Ok(())
    }

    #[test]
    fn cells_wrap_around() -> anyhow::Result<()> {
        assert_eq!(interpret(&Program::new("-.+.")?, &[])?, vec![255, 0]);
        Ok(())
    }

    #[test]
    fn reads_input_with_the_end_of_input_convention() -> anyhow::Result<()> {
        let program = Program::new(",.,.,.")?;
        assert_eq!(interpret(&program, b"a\n")?, vec![b'a', 0, 0]);
        Ok(())
    }

    #[test]
    fn echoes_until_a_zero_byte() -> anyhow::Result<()> {
        let program = Program::new(",[.,]")?;
        assert_eq!(interpret(&program, b"hi\nthere")?, b"hi".to_vec());
        Ok(())
    }

    #[test]
    fn grows_the_tape_to_the_right() -> anyhow::Result<()> {
        let program = Program::new(">>>>>>>>>>+.")?;
        assert_eq!(interpret(&program, &[])?, vec![1]);
        Ok(())
    }

    #[test]
    fn faults_left_of_the_tape() -> anyhow::Result<()> {
        let error = interpret(&Program::new("<+")?, &[]).expect_err("Accessed a negative cell");
        assert_eq!(error.location, 1);
        assert!(matches!(error.payload, Error::MemoryAccess { pointer: -1, .. }));
        Ok(())
    }

    #[test]
    fn faults_right_of_a_fixed_tape() -> anyhow::Result<()> {
        let program = Program::new(">>+")?;
        let error = Interpreter::new(&program, &[], TapeBound::Fixed(2))
            .run()
            .expect_err("Accessed a cell beyond the tape");
        assert_eq!(error.location, 2);
        assert_eq!(
            error.payload,
            Error::MemoryAccess {
                pointer:  2,
                capacity: 2,
            }
        );
        Ok(())
    }

    #[test]
    fn faults_on_unbalanced_exits() -> anyhow::Result<()> {
        let error = interpret(&Program::new_lazy("+]")?, &[]).expect_err("Ran an unbalanced exit");
        assert_eq!(error.location, 1);
        assert_eq!(error.payload, Error::UnbalancedLoop);
        Ok(())
    }

    #[test]
    fn is_deterministic() -> anyhow::Result<()> {
        let program = Program::new(",[>+<-],>[<+>-]<.")?;
        let first = interpret(&program, &[3, 4])?;
        let second = interpret(&program, &[3, 4])?;
        assert_eq!(first, second);
        assert_eq!(first, vec![7]);
        Ok(())
    }
}
