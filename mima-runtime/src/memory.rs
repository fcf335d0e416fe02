//! Memory subsystem
//!
//! Memory is a total function from 8-bit address to 8-bit word. Writes are
//! functional: `write` returns a new memory and leaves the old snapshot
//! untouched, so a run's history can be kept by holding on to old values.

use crate::word::Word;
use mima_spec::ADDRESS_SPACE;
use std::fmt;

pub trait Memory: Clone + fmt::Debug + Send + Sync + 'static {
    type Word: Word;

    fn read(&self, address: &Self::Word) -> Self::Word;

    fn write(&self, address: &Self::Word, value: Self::Word) -> Self;
}

/// Concrete memory: all 256 cells, copied on write
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ConcreteMemory {
    cells: [u8; ADDRESS_SPACE],
}

impl ConcreteMemory {
    /// Zero-filled memory
    pub fn new() -> Self {
        Self {
            cells: [0; ADDRESS_SPACE],
        }
    }

    /// Memory with the leading cells taken from `values`
    pub fn from_values(values: &[u8]) -> Self {
        let mut memory = Self::new();
        for (cell, value) in memory.cells.iter_mut().zip(values) {
            *cell = *value;
        }
        memory
    }

    #[inline]
    pub fn get(&self, address: u8) -> u8 {
        self.cells[address as usize]
    }

    pub fn cells(&self) -> &[u8; ADDRESS_SPACE] {
        &self.cells
    }

    /// Addresses holding a non-zero value
    pub fn non_zero(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0)
            .map(|(a, v)| (a as u8, *v))
    }
}

impl Default for ConcreteMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConcreteMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.non_zero()).finish()
    }
}

impl Memory for ConcreteMemory {
    type Word = u8;

    #[inline]
    fn read(&self, address: &u8) -> u8 {
        self.get(*address)
    }

    fn write(&self, address: &u8, value: u8) -> Self {
        let mut next = self.clone();
        next.cells[*address as usize] = value;
        next
    }
}
