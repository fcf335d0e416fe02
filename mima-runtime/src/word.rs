//! Word model
//!
//! The interpreter is written once against [`Word`] and [`Flag`]. Two
//! backends implement them: plain `u8`/`bool` for concrete runs and
//! [`Term`](crate::symbolic::Term)/[`Formula`](crate::symbolic::Formula) for
//! symbolic runs. Both obey the same 8-bit wrapping laws.

use crate::memory::{ConcreteMemory, Memory};
use std::fmt;

/// 8-bit machine word
pub trait Word: Clone + fmt::Debug + fmt::Display + PartialEq + Send + Sync + 'static {
    /// Truth value produced by comparisons on this word type
    type Flag: Flag;

    fn constant(value: u8) -> Self;

    /// Wrapping addition modulo 256
    fn add(&self, rhs: &Self) -> Self;

    fn and(&self, rhs: &Self) -> Self;

    fn or(&self, rhs: &Self) -> Self;

    fn xor(&self, rhs: &Self) -> Self;

    /// One's complement
    fn complement(&self) -> Self;

    /// Rotate right by one bit: bit 0 wraps into bit 7
    fn rotate_right_one(&self) -> Self;

    fn equals(&self, rhs: &Self) -> Self::Flag;

    /// Two's complement less-than
    fn signed_lt(&self, rhs: &Self) -> Self::Flag;

    /// If-then-else over words
    fn select(condition: &Self::Flag, then: &Self, otherwise: &Self) -> Self;

    /// Concrete value, when this word is known
    fn as_concrete(&self) -> Option<u8>;

    /// Sign test used by JMN
    fn is_negative(&self) -> Self::Flag {
        self.signed_lt(&Self::constant(0))
    }
}

/// Truth value
pub trait Flag: Clone + fmt::Debug + fmt::Display + Send + Sync + 'static {
    fn constant(value: bool) -> Self;

    fn negate(&self) -> Self;

    /// Concrete value, when this flag is decided
    fn as_concrete(&self) -> Option<bool>;
}

impl Word for u8 {
    type Flag = bool;

    #[inline]
    fn constant(value: u8) -> Self {
        value
    }

    #[inline]
    fn add(&self, rhs: &Self) -> Self {
        self.wrapping_add(*rhs)
    }

    #[inline]
    fn and(&self, rhs: &Self) -> Self {
        self & rhs
    }

    #[inline]
    fn or(&self, rhs: &Self) -> Self {
        self | rhs
    }

    #[inline]
    fn xor(&self, rhs: &Self) -> Self {
        self ^ rhs
    }

    #[inline]
    fn complement(&self) -> Self {
        !self
    }

    #[inline]
    fn rotate_right_one(&self) -> Self {
        (self >> 1) | ((self & 1) << 7)
    }

    #[inline]
    fn equals(&self, rhs: &Self) -> bool {
        self == rhs
    }

    #[inline]
    fn signed_lt(&self, rhs: &Self) -> bool {
        (*self as i8) < (*rhs as i8)
    }

    #[inline]
    fn select(condition: &bool, then: &Self, otherwise: &Self) -> Self {
        if *condition {
            *then
        } else {
            *otherwise
        }
    }

    #[inline]
    fn as_concrete(&self) -> Option<u8> {
        Some(*self)
    }
}

impl Flag for bool {
    #[inline]
    fn constant(value: bool) -> Self {
        value
    }

    #[inline]
    fn negate(&self) -> Self {
        !self
    }

    #[inline]
    fn as_concrete(&self) -> Option<bool> {
        Some(*self)
    }
}

/// Value domain an interpretation runs in
///
/// A backend is chosen once per run; concrete and symbolic values never mix
/// inside a single run.
pub trait Backend: Clone + fmt::Debug + Send + Sync + 'static {
    type Word: Word;
    type Memory: Memory<Word = Self::Word>;

    /// Backend name for diagnostics
    const NAME: &'static str;

    /// Memory at the start of a run; every cell holds zero
    fn initial_memory() -> Self::Memory;
}

/// Concrete 8-bit integers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Concrete;

impl Backend for Concrete {
    type Word = u8;
    type Memory = ConcreteMemory;

    const NAME: &'static str = "concrete";

    fn initial_memory() -> ConcreteMemory {
        ConcreteMemory::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_wraps() {
        assert_eq!(Word::add(&255u8, &1), 0);
        assert_eq!(Word::add(&200u8, &100), 44);
    }

    #[test]
    fn test_rotate_right_one() {
        assert_eq!(0b0000_0001u8.rotate_right_one(), 0b1000_0000);
        assert_eq!(0b1000_0000u8.rotate_right_one(), 0b0100_0000);
        assert_eq!(0b0000_0011u8.rotate_right_one(), 0b1000_0001);
    }

    #[test]
    fn test_signed_comparisons() {
        assert!(0xFFu8.is_negative());
        assert!(0x80u8.is_negative());
        assert!(!0x7Fu8.is_negative());
        assert!(!0u8.is_negative());
        assert!(0xFEu8.signed_lt(&0xFF));
        assert!(!1u8.signed_lt(&0xFF));
    }

    #[test]
    fn test_select() {
        assert_eq!(<u8 as Word>::select(&true, &0xFF, &0), 0xFF);
        assert_eq!(<u8 as Word>::select(&false, &0xFF, &0), 0);
    }

    #[test]
    fn test_flag() {
        assert!(!<bool as Flag>::constant(true).negate());
        assert_eq!(false.as_concrete(), Some(false));
    }
}
