// crates/adapt/src/mql/eval.rs

use domain::record::{is_scalar, Record};
use serde_json::Value as Json;
use std::cmp::Ordering;

use crate::mql::ast::{Comparison, Filter, Literal, Operator};
use crate::mql::error::QueryError;

/// Decides a single comparison against a record.
///
/// The logical walk in [`eval_filter_with`] is independent of how leaves are
/// compared, so tests can substitute a counting comparator.
#[cfg_attr(test, mockall::automock)]
pub trait Comparator {
    fn compare(&self, cmp: &Comparison, record: &Record) -> Result<bool, QueryError>;
}

/// Default comparison rules:
///
/// - absent path → `false` for every operator
/// - non-scalar value (object / array) → `false`
/// - number vs number → numeric comparison
/// - string vs string → `eq`/`ne` lexical; ordering is a [`QueryError::Type`]
/// - bool vs bool, null vs null → `eq`/`ne` only
/// - anything else is a type mismatch → `false`
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictComparator;

impl Comparator for StrictComparator {
    fn compare(&self, cmp: &Comparison, record: &Record) -> Result<bool, QueryError> {
        let Some(actual) = record.get(&cmp.field) else {
            return Ok(false);
        };
        if !is_scalar(actual) {
            return Ok(false);
        }

        let op = cmp.operator;
        let ordering = match (actual, &cmp.literal) {
            (Json::Number(a), Literal::Number(b)) => match a.as_f64() {
                Some(a) => a.partial_cmp(b),
                None => None,
            },
            (Json::String(a), Literal::String(b)) => {
                if op.is_ordering() {
                    return Err(QueryError::Type {
                        field: cmp.field.clone(),
                        operator: op,
                    });
                }
                Some(a.as_str().cmp(b.as_str()))
            }
            (Json::Bool(a), Literal::Bool(b)) if !op.is_ordering() => Some(a.cmp(b)),
            (Json::Null, Literal::Null) if !op.is_ordering() => Some(Ordering::Equal),
            _ => None,
        };

        // `None` covers type mismatches and incomparable numbers.
        Ok(ordering.is_some_and(|ord| matches_ordering(op, ord)))
    }
}

fn matches_ordering(op: Operator, ord: Ordering) -> bool {
    match op {
        Operator::Eq => ord == Ordering::Equal,
        Operator::Ne => ord != Ordering::Equal,
        Operator::Gt => ord == Ordering::Greater,
        Operator::Gte => ord != Ordering::Less,
        Operator::Lt => ord == Ordering::Less,
        Operator::Lte => ord != Ordering::Greater,
    }
}

/// Evaluate a full Filter against a record with the default rules.
pub fn eval_filter(filter: &Filter, record: &Record) -> Result<bool, QueryError> {
    eval_filter_with(&StrictComparator, filter, record)
}

/// Evaluate a Filter, delegating leaves to `comparator`.
///
/// `And` stops at the first `false` child and `Or` at the first `true` one;
/// later children are never handed to the comparator.
pub fn eval_filter_with<C>(
    comparator: &C,
    filter: &Filter,
    record: &Record,
) -> Result<bool, QueryError>
where
    C: Comparator + ?Sized,
{
    use Filter::*;

    match filter {
        Field(cmp) => comparator.compare(cmp, record),
        And(children) => {
            for child in children {
                if !eval_filter_with(comparator, child, record)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Or(children) => {
            for child in children {
                if eval_filter_with(comparator, child, record)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Not(inner) => Ok(!eval_filter_with(comparator, inner, record)?),
    }
}
