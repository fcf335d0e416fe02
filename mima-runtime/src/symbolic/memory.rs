//! Symbolic memory backed by a persistent array term

use super::term::{ArrayTerm, Term};
use crate::memory::Memory;
use std::fmt;

/// Memory as an array term: a base array plus a chain of stores
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SymbolicMemory {
    array: ArrayTerm,
}

impl SymbolicMemory {
    /// Fully unconstrained memory
    pub fn fresh(name: impl Into<String>) -> Self {
        Self {
            array: ArrayTerm::base(name),
        }
    }

    /// All-zero memory, the machine's state at the start of a run
    pub fn zeroed() -> Self {
        Self {
            array: ArrayTerm::filled(0),
        }
    }

    pub fn from_array(array: ArrayTerm) -> Self {
        Self { array }
    }

    pub fn array(&self) -> &ArrayTerm {
        &self.array
    }

    /// Read at a concrete address
    pub fn get(&self, address: u8) -> Term {
        Term::select(&self.array, &Term::constant(address))
    }
}

impl fmt::Debug for SymbolicMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolicMemory({})", self.array)
    }
}

impl Memory for SymbolicMemory {
    type Word = Term;

    fn read(&self, address: &Term) -> Term {
        Term::select(&self.array, address)
    }

    fn write(&self, address: &Term, value: Term) -> Self {
        Self {
            array: self.array.store(address, &value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_covers_every_address() {
        let mem = SymbolicMemory::zeroed();
        assert_eq!(mem.get(0).as_const(), Some(0));
        assert_eq!(mem.get(20).as_const(), Some(0));
        assert_eq!(mem.get(255).as_const(), Some(0));
        assert_eq!(mem.read(&Term::var("p")).as_const(), Some(0));
        assert_eq!(mem.array().depth(), 0);
    }

    #[test]
    fn test_write_then_read() {
        let before = SymbolicMemory::zeroed();
        let after = before.write(&Term::constant(1), Term::var("x"));

        assert_eq!(after.get(1), Term::var("x"));
        assert_eq!(before.get(1).as_const(), Some(0));
        assert_eq!(after.get(0).as_const(), Some(0));
    }

    #[test]
    fn test_fresh_is_unconstrained() {
        let mem = SymbolicMemory::fresh("m");
        assert_eq!(mem.get(0).to_string(), "(select m #x00)");
    }
}
