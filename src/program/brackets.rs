//! This module contains the bracket matching for loop instructions, both the
//! precomputed [`BracketMap`] and the scanning fallback used by lazily-loaded
//! programs.

use crate::{
    error::{
        container::Locatable,
        load::{Error, Result},
    },
    opcode::Opcode,
};

/// A precomputed correspondence between every [`Opcode::LoopEnter`] and its
/// matching [`Opcode::LoopExit`], in both directions.
///
/// Building the map validates that the program's loops are balanced, so that
/// malformed programs are rejected before any execution rather than faulting
/// part-way through an exploration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BracketMap {
    /// The partner of each instruction, indexed by instruction. Only loop
    /// instructions have a partner.
    partners: Vec<Option<u32>>,
}

impl BracketMap {
    /// Builds the bracket map for `instructions`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] located at the offending instruction if a loop exit has
    /// no preceding unmatched loop enter, or if a loop enter is never closed.
    /// In the latter case the outermost unclosed loop enter is reported.
    pub fn build(instructions: &[Opcode]) -> Result<Self> {
        let mut partners = vec![None; instructions.len()];
        let mut open: Vec<u32> = Vec::new();

        for (offset, opcode) in instructions.iter().enumerate() {
            let index = u32::try_from(offset).map_err(|_| Error::ProgramTooLarge.locate(u32::MAX))?;
            match opcode {
                Opcode::LoopEnter => open.push(index),
                Opcode::LoopExit => {
                    let enter = open.pop().ok_or(Error::UnmatchedLoopExit.locate(index))?;
                    partners[enter as usize] = Some(index);
                    partners[offset] = Some(enter);
                }
                _ => (),
            }
        }

        if let Some(unclosed) = open.first() {
            return Err(Error::UnmatchedLoopEnter.locate(*unclosed));
        }

        Ok(Self { partners })
    }

    /// Gets the index of the loop instruction matching the one at `index`.
    ///
    /// Returns [`None`] if `index` is not a loop instruction or is out of
    /// bounds.
    #[must_use]
    pub fn partner(&self, index: u32) -> Option<u32> {
        self.partners.get(index as usize).copied().flatten()
    }

    /// Gets the number of matched loops in the map.
    #[must_use]
    pub fn loop_count(&self) -> usize {
        self.partners.iter().flatten().count() / 2
    }
}

/// Scans forward from the loop enter at `enter` for its matching loop exit,
/// tracking nesting depth.
///
/// Returns [`None`] if the end of the program is reached first.
#[must_use]
pub fn scan_for_exit(instructions: &[Opcode], enter: u32) -> Option<u32> {
    let mut depth = 0usize;
    for (offset, opcode) in instructions.iter().enumerate().skip(enter as usize) {
        match opcode {
            Opcode::LoopEnter => depth += 1,
            Opcode::LoopExit => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return u32::try_from(offset).ok();
                }
            }
            _ => (),
        }
    }

    None
}

/// Scans backward from the loop exit at `exit` for its matching loop enter,
/// tracking nesting depth.
///
/// Returns [`None`] if the start of the program is reached first.
#[must_use]
pub fn scan_for_enter(instructions: &[Opcode], exit: u32) -> Option<u32> {
    let end = (exit as usize).checked_add(1)?.min(instructions.len());
    let mut depth = 0usize;
    for (offset, opcode) in instructions[..end].iter().enumerate().rev() {
        match opcode {
            Opcode::LoopExit => depth += 1,
            Opcode::LoopEnter => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return u32::try_from(offset).ok();
                }
            }
            _ => (),
        }
    }

    None
}
