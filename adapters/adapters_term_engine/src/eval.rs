//! Model Evaluation
//!
//! Evaluates ground Boolean structure over a model. Uninterpreted terms must be
//! assigned by the model; anything the model cannot decide is reported as
//! `EvalUnknownTerm`.

use crate::engine::{EngineResult, TermEngine};
use crate::objects::Model;
use crate::terms::TermKind;
use entities_data_handling::{ErrorCode, ErrorReport, TermHandle};
use entities_utilities::BigRational;

/// Value of a term in a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Rational(BigRational),
    /// Least significant bit first
    Bv(Vec<bool>),
    Scalar(u32),
}

fn unknown(t: TermHandle) -> ErrorReport {
    ErrorReport::new(ErrorCode::EvalUnknownTerm).with_term(t)
}

fn conversion_failed(t: TermHandle) -> ErrorReport {
    ErrorReport::new(ErrorCode::EvalConversionFailed).with_term(t)
}

impl TermEngine {
    pub fn evaluate(&self, model: &Model, t: TermHandle) -> EngineResult<Value> {
        let kind = self.term_kind(t)?;
        Ok(match kind {
            TermKind::BoolConst(b) => Value::Bool(*b),
            TermKind::ArithConst(q) => Value::Rational(q.clone()),
            TermKind::BvConst(bits) => Value::Bv(bits.clone()),
            TermKind::ScalarConst(index) => Value::Scalar(*index),
            TermKind::Uninterpreted => {
                let assigned = model.value_of(t).ok_or_else(|| unknown(t))?;
                return self.evaluate(model, assigned);
            }
            TermKind::Not(a) => Value::Bool(!self.eval_bool(model, *a)?),
            TermKind::And(args) => {
                let mut all = true;
                for &a in args {
                    all &= self.eval_bool(model, a)?;
                }
                Value::Bool(all)
            }
            TermKind::Or(args) => {
                let mut any = false;
                for &a in args {
                    any |= self.eval_bool(model, a)?;
                }
                Value::Bool(any)
            }
            TermKind::Xor(args) => {
                let mut parity = false;
                for &a in args {
                    parity ^= self.eval_bool(model, a)?;
                }
                Value::Bool(parity)
            }
            TermKind::Eq(a, b) => Value::Bool(self.evaluate(model, *a)? == self.evaluate(model, *b)?),
            TermKind::Distinct(args) => {
                let values = args
                    .iter()
                    .map(|&a| self.evaluate(model, a))
                    .collect::<EngineResult<Vec<_>>>()?;
                let pairwise = values
                    .iter()
                    .enumerate()
                    .all(|(i, v)| values[i + 1..].iter().all(|w| v != w));
                Value::Bool(pairwise)
            }
            TermKind::Ite(c, a, b) => {
                let branch = if self.eval_bool(model, *c)? { *a } else { *b };
                return self.evaluate(model, branch);
            }
            TermKind::BvArray(args) => Value::Bv(
                args.iter()
                    .map(|&a| self.eval_bool(model, a))
                    .collect::<EngineResult<Vec<_>>>()?,
            ),
            _ => return Err(unknown(t)),
        })
    }

    pub fn eval_bool(&self, model: &Model, t: TermHandle) -> EngineResult<bool> {
        match self.evaluate(model, t)? {
            Value::Bool(b) => Ok(b),
            _ => Err(conversion_failed(t)),
        }
    }

    pub fn eval_rational(&self, model: &Model, t: TermHandle) -> EngineResult<BigRational> {
        match self.evaluate(model, t)? {
            Value::Rational(q) => Ok(q),
            _ => Err(conversion_failed(t)),
        }
    }

    pub fn eval_bv(&self, model: &Model, t: TermHandle) -> EngineResult<Vec<bool>> {
        match self.evaluate(model, t)? {
            Value::Bv(bits) => Ok(bits),
            _ => Err(conversion_failed(t)),
        }
    }
}
