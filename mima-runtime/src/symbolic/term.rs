//! Symbolic 8-bit terms, formulas and array terms
//!
//! Terms are immutable and structurally shared through `Arc`. Every
//! constructor folds constants eagerly, so a run over concrete inputs produces
//! nothing but constants even under the symbolic backend.

use crate::word::{Flag, Word};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

// ========== Terms ==========

/// Binary bit-vector operators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    And,
    Or,
    Xor,
}

impl BinOp {
    fn apply(self, a: u8, b: u8) -> u8 {
        match self {
            BinOp::Add => a.wrapping_add(b),
            BinOp::And => a & b,
            BinOp::Or => a | b,
            BinOp::Xor => a ^ b,
        }
    }

    fn smt_name(self) -> &'static str {
        match self {
            BinOp::Add => "bvadd",
            BinOp::And => "bvand",
            BinOp::Or => "bvor",
            BinOp::Xor => "bvxor",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
pub enum TermKind {
    /// Concrete value
    Const(u8),
    /// Free 8-bit variable
    Var(String),
    /// One's complement
    Not(Term),
    Binary(BinOp, Term, Term),
    /// Rotate right by one bit
    RotateRight(Term),
    /// If-then-else
    Ite(Formula, Term, Term),
    /// Array read
    Select(ArrayTerm, Term),
}

/// Symbolic 8-bit value
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Term(Arc<TermKind>);

impl Term {
    pub fn constant(value: u8) -> Self {
        Term(Arc::new(TermKind::Const(value)))
    }

    /// Free variable
    pub fn var(name: impl Into<String>) -> Self {
        Term(Arc::new(TermKind::Var(name.into())))
    }

    pub fn kind(&self) -> &TermKind {
        &self.0
    }

    pub fn as_const(&self) -> Option<u8> {
        match *self.0 {
            TermKind::Const(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_const(&self) -> bool {
        self.as_const().is_some()
    }

    pub fn binary(op: BinOp, a: &Term, b: &Term) -> Self {
        match (op, a.as_const(), b.as_const()) {
            (_, Some(x), Some(y)) => Term::constant(op.apply(x, y)),
            (BinOp::Add | BinOp::Or | BinOp::Xor, Some(0), _) => b.clone(),
            (BinOp::Add | BinOp::Or | BinOp::Xor, _, Some(0)) => a.clone(),
            (BinOp::And, Some(0), _) | (BinOp::And, _, Some(0)) => Term::constant(0),
            (BinOp::And, Some(0xFF), _) => b.clone(),
            (BinOp::And, _, Some(0xFF)) => a.clone(),
            (BinOp::Or, Some(0xFF), _) | (BinOp::Or, _, Some(0xFF)) => Term::constant(0xFF),
            (BinOp::Xor, _, _) if a == b => Term::constant(0),
            (BinOp::And | BinOp::Or, _, _) if a == b => a.clone(),
            _ => Term(Arc::new(TermKind::Binary(op, a.clone(), b.clone()))),
        }
    }

    pub fn not(a: &Term) -> Self {
        match a.kind() {
            TermKind::Const(v) => Term::constant(!v),
            TermKind::Not(inner) => inner.clone(),
            _ => Term(Arc::new(TermKind::Not(a.clone()))),
        }
    }

    pub fn rotate_right(a: &Term) -> Self {
        match a.as_const() {
            Some(v) => Term::constant(v.rotate_right_one()),
            None => Term(Arc::new(TermKind::RotateRight(a.clone()))),
        }
    }

    pub fn ite(condition: &Formula, then: &Term, otherwise: &Term) -> Self {
        match condition.as_const() {
            Some(true) => then.clone(),
            Some(false) => otherwise.clone(),
            None if then == otherwise => then.clone(),
            None => Term(Arc::new(TermKind::Ite(
                condition.clone(),
                then.clone(),
                otherwise.clone(),
            ))),
        }
    }

    /// Read `index` from `array`, resolving stores at known addresses
    pub fn select(array: &ArrayTerm, index: &Term) -> Self {
        let mut current = array;
        loop {
            match current.kind() {
                ArrayKind::Store {
                    array: inner,
                    index: stored,
                    value,
                } => {
                    if stored == index {
                        return value.clone();
                    }
                    match (stored.as_const(), index.as_const()) {
                        (Some(_), Some(_)) => current = inner,
                        _ => break,
                    }
                }
                ArrayKind::Filled(value) => return Term::constant(*value),
                ArrayKind::Base(_) => break,
            }
        }
        Term(Arc::new(TermKind::Select(current.clone(), index.clone())))
    }

    pub fn ne(&self, other: &Term) -> Formula {
        Formula::eq(self, other).negate()
    }

    /// Evaluate under an assignment; unassigned inputs read as zero
    pub fn eval(&self, model: &Model) -> u8 {
        match self.kind() {
            TermKind::Const(v) => *v,
            TermKind::Var(name) => model.var(name),
            TermKind::Not(a) => !a.eval(model),
            TermKind::Binary(op, a, b) => op.apply(a.eval(model), b.eval(model)),
            TermKind::RotateRight(a) => a.eval(model).rotate_right_one(),
            TermKind::Ite(c, a, b) => {
                if c.eval(model) {
                    a.eval(model)
                } else {
                    b.eval(model)
                }
            }
            TermKind::Select(array, index) => array.eval_read(index.eval(model), model),
        }
    }

    /// Record every free input this term depends on
    pub fn collect_atoms(&self, atoms: &mut Atoms) {
        match self.kind() {
            TermKind::Const(_) => {}
            TermKind::Var(name) => {
                atoms.vars.insert(name.clone());
            }
            TermKind::Not(a) | TermKind::RotateRight(a) => a.collect_atoms(atoms),
            TermKind::Binary(_, a, b) => {
                a.collect_atoms(atoms);
                b.collect_atoms(atoms);
            }
            TermKind::Ite(c, a, b) => {
                c.collect_atoms(atoms);
                a.collect_atoms(atoms);
                b.collect_atoms(atoms);
            }
            TermKind::Select(array, index) => {
                index.collect_atoms(atoms);
                if let Some(base) = array.collect_atoms(atoms) {
                    match index.as_const() {
                        Some(address) => {
                            atoms.cells.insert((base, address));
                        }
                        None => atoms.symbolic_reads = true,
                    }
                }
            }
        }
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// SMT-LIB 2 rendering
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            TermKind::Const(v) => write!(f, "#x{:02x}", v),
            TermKind::Var(name) => write!(f, "{}", name),
            TermKind::Not(a) => write!(f, "(bvnot {})", a),
            TermKind::Binary(op, a, b) => write!(f, "({} {} {})", op.smt_name(), a, b),
            TermKind::RotateRight(a) => write!(f, "((_ rotate_right 1) {})", a),
            TermKind::Ite(c, a, b) => write!(f, "(ite {} {} {})", c, a, b),
            TermKind::Select(array, index) => write!(f, "(select {} {})", array, index),
        }
    }
}

impl Word for Term {
    type Flag = Formula;

    fn constant(value: u8) -> Self {
        Term::constant(value)
    }

    fn add(&self, rhs: &Self) -> Self {
        Term::binary(BinOp::Add, self, rhs)
    }

    fn and(&self, rhs: &Self) -> Self {
        Term::binary(BinOp::And, self, rhs)
    }

    fn or(&self, rhs: &Self) -> Self {
        Term::binary(BinOp::Or, self, rhs)
    }

    fn xor(&self, rhs: &Self) -> Self {
        Term::binary(BinOp::Xor, self, rhs)
    }

    fn complement(&self) -> Self {
        Term::not(self)
    }

    fn rotate_right_one(&self) -> Self {
        Term::rotate_right(self)
    }

    fn equals(&self, rhs: &Self) -> Formula {
        Formula::eq(self, rhs)
    }

    fn signed_lt(&self, rhs: &Self) -> Formula {
        Formula::slt(self, rhs)
    }

    fn select(condition: &Formula, then: &Self, otherwise: &Self) -> Self {
        Term::ite(condition, then, otherwise)
    }

    fn as_concrete(&self) -> Option<u8> {
        self.as_const()
    }
}

// ========== Formulas ==========

#[derive(Debug, PartialEq, Eq, Hash)]
pub enum FormulaKind {
    Const(bool),
    Eq(Term, Term),
    /// Signed less-than
    Slt(Term, Term),
    Not(Formula),
    And(Vec<Formula>),
    Or(Vec<Formula>),
}

/// Symbolic truth value
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Formula(Arc<FormulaKind>);

impl Formula {
    pub fn constant(value: bool) -> Self {
        Formula(Arc::new(FormulaKind::Const(value)))
    }

    pub fn kind(&self) -> &FormulaKind {
        &self.0
    }

    pub fn as_const(&self) -> Option<bool> {
        match *self.0 {
            FormulaKind::Const(v) => Some(v),
            _ => None,
        }
    }

    pub fn eq(a: &Term, b: &Term) -> Self {
        match (a.as_const(), b.as_const()) {
            (Some(x), Some(y)) => Formula::constant(x == y),
            _ if a == b => Formula::constant(true),
            _ => Formula(Arc::new(FormulaKind::Eq(a.clone(), b.clone()))),
        }
    }

    pub fn slt(a: &Term, b: &Term) -> Self {
        match (a.as_const(), b.as_const()) {
            (Some(x), Some(y)) => Formula::constant((x as i8) < (y as i8)),
            _ if a == b => Formula::constant(false),
            _ => Formula(Arc::new(FormulaKind::Slt(a.clone(), b.clone()))),
        }
    }

    pub fn negate(&self) -> Self {
        match self.kind() {
            FormulaKind::Const(v) => Formula::constant(!v),
            FormulaKind::Not(inner) => inner.clone(),
            _ => Formula(Arc::new(FormulaKind::Not(self.clone()))),
        }
    }

    /// Conjunction; empty is `true`
    pub fn and(parts: impl IntoIterator<Item = Formula>) -> Self {
        let mut kept = Vec::new();
        for part in parts {
            match part.as_const() {
                Some(true) => {}
                Some(false) => return Formula::constant(false),
                None => kept.push(part),
            }
        }
        match kept.len() {
            0 => Formula::constant(true),
            1 => kept.remove(0),
            _ => Formula(Arc::new(FormulaKind::And(kept))),
        }
    }

    /// Disjunction; empty is `false`
    pub fn or(parts: impl IntoIterator<Item = Formula>) -> Self {
        let mut kept = Vec::new();
        for part in parts {
            match part.as_const() {
                Some(false) => {}
                Some(true) => return Formula::constant(true),
                None => kept.push(part),
            }
        }
        match kept.len() {
            0 => Formula::constant(false),
            1 => kept.remove(0),
            _ => Formula(Arc::new(FormulaKind::Or(kept))),
        }
    }

    pub fn eval(&self, model: &Model) -> bool {
        match self.kind() {
            FormulaKind::Const(v) => *v,
            FormulaKind::Eq(a, b) => a.eval(model) == b.eval(model),
            FormulaKind::Slt(a, b) => (a.eval(model) as i8) < (b.eval(model) as i8),
            FormulaKind::Not(f) => !f.eval(model),
            FormulaKind::And(parts) => parts.iter().all(|p| p.eval(model)),
            FormulaKind::Or(parts) => parts.iter().any(|p| p.eval(model)),
        }
    }

    pub fn collect_atoms(&self, atoms: &mut Atoms) {
        match self.kind() {
            FormulaKind::Const(_) => {}
            FormulaKind::Eq(a, b) | FormulaKind::Slt(a, b) => {
                a.collect_atoms(atoms);
                b.collect_atoms(atoms);
            }
            FormulaKind::Not(f) => f.collect_atoms(atoms),
            FormulaKind::And(parts) | FormulaKind::Or(parts) => {
                for part in parts {
                    part.collect_atoms(atoms);
                }
            }
        }
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            FormulaKind::Const(v) => write!(f, "{}", v),
            FormulaKind::Eq(a, b) => write!(f, "(= {} {})", a, b),
            FormulaKind::Slt(a, b) => write!(f, "(bvslt {} {})", a, b),
            FormulaKind::Not(inner) => write!(f, "(not {})", inner),
            FormulaKind::And(parts) => write_nary(f, "and", parts),
            FormulaKind::Or(parts) => write_nary(f, "or", parts),
        }
    }
}

fn write_nary(f: &mut fmt::Formatter<'_>, op: &str, parts: &[Formula]) -> fmt::Result {
    write!(f, "({}", op)?;
    for part in parts {
        write!(f, " {}", part)?;
    }
    write!(f, ")")
}

impl Flag for Formula {
    fn constant(value: bool) -> Self {
        Formula::constant(value)
    }

    fn negate(&self) -> Self {
        Formula::negate(self)
    }

    fn as_concrete(&self) -> Option<bool> {
        self.as_const()
    }
}

// ========== Arrays ==========

#[derive(Debug, PartialEq, Eq, Hash)]
pub enum ArrayKind {
    /// Unconstrained array
    Base(String),
    /// Every cell holds the same value
    Filled(u8),
    Store {
        array: ArrayTerm,
        index: Term,
        value: Term,
    },
}

/// Array from 8-bit address to 8-bit value
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ArrayTerm(Arc<ArrayKind>);

impl ArrayTerm {
    /// Unconstrained array named `name`
    pub fn base(name: impl Into<String>) -> Self {
        ArrayTerm(Arc::new(ArrayKind::Base(name.into())))
    }

    /// Array with `value` in all 256 cells
    pub fn filled(value: u8) -> Self {
        ArrayTerm(Arc::new(ArrayKind::Filled(value)))
    }

    pub fn kind(&self) -> &ArrayKind {
        &self.0
    }

    /// Functional update
    ///
    /// A store to the address written last replaces that store instead of
    /// stacking on top of it.
    pub fn store(&self, index: &Term, value: &Term) -> Self {
        let array = match self.kind() {
            ArrayKind::Store {
                array,
                index: last,
                ..
            } if last == index => array.clone(),
            _ => self.clone(),
        };
        ArrayTerm(Arc::new(ArrayKind::Store {
            array,
            index: index.clone(),
            value: value.clone(),
        }))
    }

    /// Name of the unconstrained array at the bottom of the store chain
    ///
    /// `None` when the chain ends in a filled array.
    pub fn base_name(&self) -> Option<&str> {
        let mut current = self;
        loop {
            match current.kind() {
                ArrayKind::Base(name) => return Some(name),
                ArrayKind::Filled(_) => return None,
                ArrayKind::Store { array, .. } => current = array,
            }
        }
    }

    /// Number of stores on top of the base array
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let ArrayKind::Store { array, .. } = current.kind() {
            depth += 1;
            current = array;
        }
        depth
    }

    fn eval_read(&self, address: u8, model: &Model) -> u8 {
        let mut current = self;
        loop {
            match current.kind() {
                ArrayKind::Base(name) => return model.cell(name, address),
                ArrayKind::Filled(value) => return *value,
                ArrayKind::Store {
                    array,
                    index,
                    value,
                } => {
                    if index.eval(model) == address {
                        return value.eval(model);
                    }
                    current = array;
                }
            }
        }
    }

    /// Collect atoms of the store chain, returning the base array name
    fn collect_atoms(&self, atoms: &mut Atoms) -> Option<String> {
        let mut current = self;
        loop {
            match current.kind() {
                ArrayKind::Base(name) => {
                    atoms.arrays.insert(name.clone());
                    return Some(name.clone());
                }
                ArrayKind::Filled(_) => return None,
                ArrayKind::Store {
                    array,
                    index,
                    value,
                } => {
                    index.collect_atoms(atoms);
                    value.collect_atoms(atoms);
                    current = array;
                }
            }
        }
    }
}

impl fmt::Debug for ArrayTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for ArrayTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ArrayKind::Base(name) => write!(f, "{}", name),
            ArrayKind::Filled(value) => write!(
                f,
                "((as const (Array (_ BitVec 8) (_ BitVec 8))) #x{:02x})",
                value
            ),
            ArrayKind::Store {
                array,
                index,
                value,
            } => write!(f, "(store {} {} {})", array, index, value),
        }
    }
}

// ========== Assignments ==========

/// Free inputs a set of formulas depends on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Atoms {
    pub vars: BTreeSet<String>,
    pub arrays: BTreeSet<String>,
    /// Base-array cells read at a known address
    pub cells: BTreeSet<(String, u8)>,
    /// Set when a base array is read at a symbolic address
    pub symbolic_reads: bool,
}

impl Atoms {
    pub fn of(formulas: &[Formula]) -> Self {
        let mut atoms = Atoms::default();
        for formula in formulas {
            formula.collect_atoms(&mut atoms);
        }
        atoms
    }

    /// Number of free 8-bit inputs
    pub fn len(&self) -> usize {
        self.vars.len() + self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Assignment of free inputs to concrete values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    vars: BTreeMap<String, u8>,
    cells: BTreeMap<(String, u8), u8>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_var(&mut self, name: impl Into<String>, value: u8) {
        self.vars.insert(name.into(), value);
    }

    pub fn set_cell(&mut self, array: impl Into<String>, address: u8, value: u8) {
        self.cells.insert((array.into(), address), value);
    }

    pub fn var(&self, name: &str) -> u8 {
        self.vars.get(name).copied().unwrap_or(0)
    }

    pub fn cell(&self, array: &str, address: u8) -> u8 {
        self.cells
            .get(&(array.to_string(), address))
            .copied()
            .unwrap_or(0)
    }

    pub fn vars(&self) -> impl Iterator<Item = (&str, u8)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, u8, u8)> {
        self.cells.iter().map(|((a, i), v)| (a.as_str(), *i, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty() && self.cells.is_empty()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.vars() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", name, value)?;
            first = false;
        }
        for (array, address, value) in self.cells() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}[{}] = {}", array, address, value)?;
            first = false;
        }
        Ok(())
    }
}

/// Render assertions as an SMT-LIB 2 script
pub fn to_smtlib(assertions: &[Formula]) -> String {
    let atoms = Atoms::of(assertions);
    let mut script = String::new();
    for var in &atoms.vars {
        script.push_str(&format!("(declare-const {} (_ BitVec 8))\n", var));
    }
    for array in &atoms.arrays {
        script.push_str(&format!(
            "(declare-const {} (Array (_ BitVec 8) (_ BitVec 8)))\n",
            array
        ));
    }
    for assertion in assertions {
        script.push_str(&format!("(assert {})\n", assertion));
    }
    script.push_str("(check-sat)\n");
    script
}
