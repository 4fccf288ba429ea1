//! Temporal comparisons and Allen-style interval relations.
//!
//! Every operand is reduced to a (start, end) pair of timestamp
//! expressions; an instant is the degenerate interval whose start equals
//! its end. The truth tables are written out explicitly - s1/e1 are the
//! left operand's bounds, s2/e2 the right's:
//!
//! | relation | condition                      |
//! |----------|--------------------------------|
//! | equals   | s1=s2 AND e1=e2                |
//! | before   | e1<=s2 AND s1<s2               |
//! | after    | s1>=e2 AND s1>s2               |
//! | meets    | s1=e2 OR e1=s2                 |
//! | overlaps | s1=s2 OR (s1<=e2 AND e1>s2)    |
//! | contains | s1<=s2 AND e1>s2 AND e1>=e2    |
//! | starts   | s1=s2                          |
//! | finishes | e1=e2                          |
//!
//! `overlaps` is not symmetric around the half-open boundary; see the
//! native-evaluation tests, which record that `overlaps(a, b)` and
//! `overlaps(b, a)` can disagree when one operand starts exactly at the
//! other's end.

use chrono::{DateTime, FixedOffset};

use crate::error::{Error, Result};
use crate::expr::{Constant, Op};
use crate::sql::expr::{BinaryOperator, Expr};

/// A temporal operand reduced to SQL expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeOperand {
    Instant(Expr),
    Interval { start: Expr, end: Expr },
}

impl TimeOperand {
    /// The (start, end) bounds; an instant is s = e.
    fn bounds(&self) -> (Expr, Expr) {
        match self {
            TimeOperand::Instant(e) => (e.clone(), e.clone()),
            TimeOperand::Interval { start, end } => (start.clone(), end.clone()),
        }
    }

    fn is_instant(&self) -> bool {
        matches!(self, TimeOperand::Instant(_))
    }

    /// The representative point: an instant itself, an interval's start.
    pub fn start(&self) -> Expr {
        match self {
            TimeOperand::Instant(e) => e.clone(),
            TimeOperand::Interval { start, .. } => start.clone(),
        }
    }
}

fn cmp(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
    Expr::binary(left, op, right)
}

/// Compile one of the interval relation functions.
pub fn relation(op: Op, left: &TimeOperand, right: &TimeOperand) -> Result<Expr> {
    let (s1, e1) = left.bounds();
    let (s2, e2) = right.bounds();
    use BinaryOperator::{Eq, Gt, Gte, Lt, Lte};
    let expr = match op {
        Op::Before => cmp(e1, Lte, s2.clone()).and(cmp(s1, Lt, s2)),
        Op::After => cmp(s1.clone(), Gte, e2).and(cmp(s1, Gt, s2)),
        Op::Meets => cmp(s1, Eq, e2).or(cmp(e1, Eq, s2)),
        Op::Overlaps => cmp(s1.clone(), Eq, s2.clone())
            .or(cmp(s1, Lte, e2).and(cmp(e1, Gt, s2))),
        Op::During => {
            // x during y is y contains x.
            cmp(s2.clone(), Lte, s1.clone())
                .and(cmp(e2.clone(), Gt, s1))
                .and(cmp(e2, Gte, e1))
        }
        Op::Starts => cmp(s1, Eq, s2),
        Op::Finishes => cmp(e1, Eq, e2),
        other => {
            return Err(Error::unsupported(format!(
                "'{}' is not an interval relation",
                other
            )))
        }
    };
    Ok(expr)
}

/// Compile a comparison operator over temporal operands.
///
/// Boundary convention: an interval is less than a point only if its end is
/// at or before the point and its start strictly before it; `le`/`ge` drop
/// the strict conjunct.
pub fn compare(op: Op, left: &TimeOperand, right: &TimeOperand) -> Result<Expr> {
    use BinaryOperator::{Eq, Gt, Gte, Lt, Lte, Ne};
    // Instant-to-instant comparisons need no boundary algebra.
    if left.is_instant() && right.is_instant() {
        let sql_op = match op {
            Op::Equal => Eq,
            Op::NotEqual => Ne,
            Op::LessThan => Lt,
            Op::LessEqual => Lte,
            Op::GreaterThan => Gt,
            Op::GreaterEqual => Gte,
            other => return Err(Error::unsupported(format!("'{}' is not a comparison", other))),
        };
        return Ok(cmp(left.start(), sql_op, right.start()));
    }
    let (s1, e1) = left.bounds();
    let (s2, e2) = right.bounds();
    let expr = match op {
        Op::Equal => cmp(s1, Eq, s2).and(cmp(e1, Eq, e2)),
        Op::NotEqual => Expr::UnaryOp {
            op: crate::sql::expr::UnaryOperator::Not,
            expr: Box::new(cmp(s1, Eq, s2).and(cmp(e1, Eq, e2))),
        },
        Op::LessThan => cmp(e1, Lte, s2.clone()).and(cmp(s1, Lt, s2)),
        Op::GreaterThan => cmp(s1.clone(), Gte, e2).and(cmp(s1, Gt, s2)),
        Op::LessEqual => cmp(e1, Lte, s2),
        Op::GreaterEqual => cmp(s1, Gte, e2),
        other => return Err(Error::unsupported(format!("'{}' is not a comparison", other))),
    };
    Ok(expr)
}

// =============================================================================
// Native evaluation
// =============================================================================

/// The same truth tables evaluated on constant values. Used by tests to
/// check the algebra's symmetry properties without a database.
pub mod eval {
    use super::*;

    /// Bounds of a temporal constant; instants collapse to s = e.
    pub fn bounds(c: &Constant) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
        match c {
            Constant::DateTime(dt) => Some((*dt, *dt)),
            Constant::Interval(iv) => Some((iv.start, iv.end)),
            _ => None,
        }
    }

    /// Evaluate a relation on native bounds.
    pub fn relation_holds(
        op: Op,
        a: (DateTime<FixedOffset>, DateTime<FixedOffset>),
        b: (DateTime<FixedOffset>, DateTime<FixedOffset>),
    ) -> bool {
        let (s1, e1) = a;
        let (s2, e2) = b;
        match op {
            Op::Equal => s1 == s2 && e1 == e2,
            Op::Before => e1 <= s2 && s1 < s2,
            Op::After => s1 >= e2 && s1 > s2,
            Op::Meets => s1 == e2 || e1 == s2,
            Op::Overlaps => s1 == s2 || (s1 <= e2 && e1 > s2),
            Op::During => s2 <= s1 && e2 > s1 && e2 >= e1,
            Op::Starts => s1 == s2,
            Op::Finishes => e1 == e2,
            _ => false,
        }
    }
}
