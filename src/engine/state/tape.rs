//! This module contains the definition of the symbolic tape.

use std::rc::Rc;

use crate::{
    constant::TAPE_PAGE_SIZE_CELLS,
    engine::value::Value,
    error::execution::Error,
};

/// A representation of the tape of the symbolic machine.
///
/// Where the tape of the concrete interpreter can grow on demand, the symbolic
/// tape has a fixed `capacity`. Which accesses fault is part of a path's
/// identity, so the tape size is a parameter of the whole exploration run.
///
/// # Sharing
///
/// The cells are stored in fixed-size pages behind [`Rc`]. Cloning a tape, as
/// happens when a state forks, copies only the page pointers. The first write
/// to a shared page copies that page, so a write through one tape is never
/// observable through another.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tape {
    /// The number of addressable cells.
    capacity: usize,

    /// The pages of cells. Only the first `capacity` cells are addressable.
    pages: Vec<Rc<Vec<Value>>>,
}

impl Tape {
    /// Constructs a new tape of `capacity` cells, all holding zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let zero_page = Rc::new(vec![Value::zero(); TAPE_PAGE_SIZE_CELLS]);
        let pages = vec![zero_page; capacity.div_ceil(TAPE_PAGE_SIZE_CELLS)];
        Self { capacity, pages }
    }

    /// Gets the number of addressable cells on the tape.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reads the value of the cell at `pointer`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `pointer` is outside `[0, capacity)`.
    pub fn get(&self, pointer: i64) -> Result<&Value, Error> {
        let index = self.index(pointer)?;
        Ok(&self.pages[index / TAPE_PAGE_SIZE_CELLS][index % TAPE_PAGE_SIZE_CELLS])
    }

    /// Canonicalises `value` and stores it in the cell at `pointer`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `pointer` is outside `[0, capacity)`.
    pub fn set(&mut self, pointer: i64, value: Value) -> Result<(), Error> {
        let index = self.index(pointer)?;
        let page = Rc::make_mut(&mut self.pages[index / TAPE_PAGE_SIZE_CELLS]);
        page[index % TAPE_PAGE_SIZE_CELLS] = value.canonicalize();
        Ok(())
    }

    /// Iterates over every addressable cell in order.
    pub fn cells(&self) -> impl Iterator<Item = &Value> + '_ {
        self.pages.iter().flat_map(|page| page.iter()).take(self.capacity)
    }

    /// Iterates over the cells that do not hold concrete zero, along with
    /// their indices.
    pub fn non_zero_cells(&self) -> impl Iterator<Item = (usize, &Value)> + '_ {
        self.cells()
            .enumerate()
            .filter(|(_, value)| **value != Value::zero())
    }

    /// Copies out the full contents of the tape.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Value> {
        self.cells().cloned().collect()
    }

    /// Checks if the cell at `pointer` is stored in the same page allocation as
    /// in `other`, meaning that neither tape has written to that page since
    /// they diverged.
    #[must_use]
    pub fn shares_page_with(&self, other: &Tape, pointer: usize) -> bool {
        let page = pointer / TAPE_PAGE_SIZE_CELLS;
        match (self.pages.get(page), other.pages.get(page)) {
            (Some(mine), Some(theirs)) => Rc::ptr_eq(mine, theirs),
            _ => false,
        }
    }

    /// Checks `pointer` against the bounds of the tape, converting it to a cell
    /// index.
    fn index(&self, pointer: i64) -> Result<usize, Error> {
        usize::try_from(pointer)
            .ok()
            .filter(|index| *index < self.capacity)
            .ok_or(Error::MemoryAccess {
                pointer,
                capacity: self.capacity,
            })
    }
}
