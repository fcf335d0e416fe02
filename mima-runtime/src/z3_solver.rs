//! Z3-backed solver
//!
//! Translates terms and formulas into Z3 bit-vector and array expressions.
//! Every check runs in a fresh context.

use crate::error::SolverError;
use crate::solver::{SatResult, Solver};
use crate::symbolic::{ArrayKind, ArrayTerm, Atoms, BinOp, Formula, FormulaKind, Model, Term, TermKind};
use z3::ast::{Array, Ast, Bool, BV};
use z3::{Config, Context, Sort};

const WIDTH: u32 = 8;

#[derive(Debug, Clone, Copy, Default)]
pub struct Z3Solver;

impl Z3Solver {
    pub fn new() -> Self {
        Self
    }
}

struct Encoder<'ctx> {
    ctx: &'ctx Context,
}

impl<'ctx> Encoder<'ctx> {
    fn term(&self, term: &Term) -> Result<BV<'ctx>, SolverError> {
        Ok(match term.kind() {
            TermKind::Const(v) => BV::from_u64(self.ctx, u64::from(*v), WIDTH),
            TermKind::Var(name) => BV::new_const(self.ctx, name.as_str(), WIDTH),
            TermKind::Not(a) => self.term(a)?.bvnot(),
            TermKind::Binary(op, a, b) => {
                let (a, b) = (self.term(a)?, self.term(b)?);
                match op {
                    BinOp::Add => a.bvadd(&b),
                    BinOp::And => a.bvand(&b),
                    BinOp::Or => a.bvor(&b),
                    BinOp::Xor => a.bvxor(&b),
                }
            }
            TermKind::RotateRight(a) => {
                let a = self.term(a)?;
                let one = BV::from_u64(self.ctx, 1, WIDTH);
                let seven = BV::from_u64(self.ctx, 7, WIDTH);
                a.bvlshr(&one).bvor(&a.bvshl(&seven))
            }
            TermKind::Ite(c, a, b) => self.formula(c)?.ite(&self.term(a)?, &self.term(b)?),
            TermKind::Select(array, index) => self
                .array(array)?
                .select(&self.term(index)?)
                .as_bv()
                .ok_or_else(|| SolverError::Backend(format!("non bit-vector select {}", term)))?,
        })
    }

    fn array(&self, array: &ArrayTerm) -> Result<Array<'ctx>, SolverError> {
        Ok(match array.kind() {
            ArrayKind::Base(name) => {
                let sort = Sort::bitvector(self.ctx, WIDTH);
                Array::new_const(self.ctx, name.as_str(), &sort, &sort)
            }
            ArrayKind::Filled(value) => {
                let sort = Sort::bitvector(self.ctx, WIDTH);
                let fill = BV::from_u64(self.ctx, u64::from(*value), WIDTH);
                Array::const_array(self.ctx, &sort, &fill)
            }
            ArrayKind::Store {
                array,
                index,
                value,
            } => self
                .array(array)?
                .store(&self.term(index)?, &self.term(value)?),
        })
    }

    fn formula(&self, formula: &Formula) -> Result<Bool<'ctx>, SolverError> {
        Ok(match formula.kind() {
            FormulaKind::Const(v) => Bool::from_bool(self.ctx, *v),
            FormulaKind::Eq(a, b) => self.term(a)?._eq(&self.term(b)?),
            FormulaKind::Slt(a, b) => self.term(a)?.bvslt(&self.term(b)?),
            FormulaKind::Not(f) => self.formula(f)?.not(),
            FormulaKind::And(parts) => {
                let parts = self.formulas(parts)?;
                Bool::and(self.ctx, &parts.iter().collect::<Vec<_>>())
            }
            FormulaKind::Or(parts) => {
                let parts = self.formulas(parts)?;
                Bool::or(self.ctx, &parts.iter().collect::<Vec<_>>())
            }
        })
    }

    fn formulas(&self, formulas: &[Formula]) -> Result<Vec<Bool<'ctx>>, SolverError> {
        formulas.iter().map(|f| self.formula(f)).collect()
    }
}

impl Solver for Z3Solver {
    fn name(&self) -> &'static str {
        "z3"
    }

    fn check(&self, assertions: &[Formula]) -> Result<SatResult, SolverError> {
        let mut config = Config::new();
        config.set_model_generation(true);
        let ctx = Context::new(&config);
        let encoder = Encoder { ctx: &ctx };
        let solver = z3::Solver::new(&ctx);

        for assertion in assertions {
            solver.assert(&encoder.formula(assertion)?);
        }

        match solver.check() {
            z3::SatResult::Unsat => {
                tracing::debug!(solver = self.name(), "unsat");
                Ok(SatResult::Unsat)
            }
            z3::SatResult::Unknown => Ok(SatResult::Unknown(
                solver
                    .get_reason_unknown()
                    .unwrap_or_else(|| "no reason given".to_string()),
            )),
            z3::SatResult::Sat => {
                let z3_model = solver
                    .get_model()
                    .ok_or_else(|| SolverError::Backend("no model produced".to_string()))?;
                let atoms = Atoms::of(assertions);
                let mut model = Model::new();

                let value = |bv: &BV<'_>| -> Result<u8, SolverError> {
                    z3_model
                        .eval(bv, true)
                        .and_then(|v| v.as_u64())
                        .map(|v| v as u8)
                        .ok_or_else(|| SolverError::Backend(format!("cannot evaluate {}", bv)))
                };

                for name in &atoms.vars {
                    model.set_var(name.clone(), value(&BV::new_const(&ctx, name.as_str(), WIDTH))?);
                }
                for (array, address) in &atoms.cells {
                    let read = encoder.term(&Term::select(
                        &ArrayTerm::base(array.clone()),
                        &Term::constant(*address),
                    ))?;
                    model.set_cell(array.clone(), *address, value(&read)?);
                }

                if !atoms.symbolic_reads {
                    if let Some(failed) = assertions.iter().find(|a| !a.eval(&model)) {
                        return Err(SolverError::InvalidModel(failed.to_string()));
                    }
                }

                tracing::debug!(solver = self.name(), %model, "sat");
                Ok(SatResult::Sat(model))
            }
        }
    }
}
