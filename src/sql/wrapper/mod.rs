//! Compiled SQL-level representatives of expression nodes.
//!
//! A wrapper is a field, a condition, or both; which operator implementation
//! applies to a pair of wrappers is decided by their runtime shape, because
//! the SQL columns behind a logical property are only known at this layer.
//! The shapes are a closed set: adding one forces every dispatch site to
//! handle it.

pub mod json;
pub mod time;

pub use json::{JsonFields, JsonWrapper};
pub use time::TimeOperand;

use crate::expr::types::ExprType;
use crate::sql::dialect::CastType;
use crate::sql::expr::{Expr, Literal};

/// One typed field of a multi-column wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantField {
    pub kind: ExprType,
    pub expr: Expr,
}

/// A single-expression wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleWrapper {
    pub expr: Expr,
    pub kind: ExprType,
    /// Whether the expression is boolean-valued and usable as a condition.
    pub condition: bool,
}

impl SimpleWrapper {
    pub fn new(expr: Expr, kind: ExprType) -> Self {
        Self {
            expr,
            kind,
            condition: kind == ExprType::Bool,
        }
    }

    pub fn condition(expr: Expr) -> Self {
        Self {
            expr,
            kind: ExprType::Bool,
            condition: true,
        }
    }
}

/// A single timestamp expression.
#[derive(Debug, Clone, PartialEq)]
pub struct InstantWrapper {
    pub expr: Expr,
}

/// A start/end pair of timestamp expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalWrapper {
    pub start: Expr,
    pub end: Expr,
}

/// A property persisted redundantly in several typed columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldListWrapper {
    pub fields: Vec<VariantField>,
}

impl FieldListWrapper {
    /// The field of exactly this type, if present.
    pub fn field_of(&self, kind: ExprType) -> Option<&VariantField> {
        self.fields.iter().find(|f| f.kind == kind)
    }
}

/// A compiled SQL-level value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldWrapper {
    Simple(SimpleWrapper),
    Instant(InstantWrapper),
    Interval(IntervalWrapper),
    Json(JsonWrapper),
    Null,
    FieldList(FieldListWrapper),
}

impl FieldWrapper {
    pub fn simple(expr: Expr, kind: ExprType) -> Self {
        FieldWrapper::Simple(SimpleWrapper::new(expr, kind))
    }

    pub fn condition_of(expr: Expr) -> Self {
        FieldWrapper::Simple(SimpleWrapper::condition(expr))
    }

    /// The wrapper's scalar face. Always resolvable: even a wrapper whose
    /// primary role is a condition may be re-used as a selectable value.
    pub fn default_field(&self) -> Expr {
        match self {
            FieldWrapper::Simple(w) => w.expr.clone(),
            FieldWrapper::Instant(w) => w.expr.clone(),
            // An interval's representative scalar is its start.
            FieldWrapper::Interval(w) => w.start.clone(),
            FieldWrapper::Json(w) => w.materialize().text,
            FieldWrapper::Null => Expr::Literal(Literal::Null),
            FieldWrapper::FieldList(w) => w
                .fields
                .first()
                .map(|f| f.expr.clone())
                .unwrap_or(Expr::Literal(Literal::Null)),
        }
    }

    /// A scalar expression of the requested type: native match first, then
    /// an allowed cast (numeric widths, numeric/JSON to string), then `None`
    /// for "not representable" - callers that require success turn that into
    /// a type-mismatch failure.
    pub fn field_as(&self, ty: ExprType) -> Option<Expr> {
        match self {
            FieldWrapper::Simple(w) => cast_field(&w.expr, w.kind, ty),
            FieldWrapper::Instant(w) => match ty {
                ExprType::DateTime => Some(w.expr.clone()),
                ExprType::String => Some(w.expr.clone().cast(CastType::Text)),
                _ => None,
            },
            FieldWrapper::Interval(w) => match ty {
                ExprType::DateTime => Some(w.start.clone()),
                ExprType::String => Some(w.start.clone().cast(CastType::Text)),
                _ => None,
            },
            FieldWrapper::Json(w) => {
                let fields = w.materialize();
                match ty {
                    ExprType::String => Some(fields.text),
                    ExprType::Int | ExprType::Double => Some(fields.number),
                    ExprType::Bool => Some(fields.boolean),
                    ExprType::Json => Some(fields.jsonb),
                    _ => None,
                }
            }
            FieldWrapper::Null => Some(Expr::Literal(Literal::Null)),
            FieldWrapper::FieldList(w) => {
                if let Some(field) = w.field_of(ty) {
                    return Some(field.expr.clone());
                }
                w.fields
                    .iter()
                    .find_map(|f| cast_field(&f.expr, f.kind, ty))
            }
        }
    }

    /// The wrapper as a boolean condition, if it has one.
    pub fn condition(&self) -> Option<Expr> {
        match self {
            FieldWrapper::Simple(w) if w.condition || w.kind == ExprType::Bool => {
                Some(w.expr.clone())
            }
            FieldWrapper::Json(w) => Some(w.materialize().boolean),
            FieldWrapper::FieldList(w) => w.field_of(ExprType::Bool).map(|f| f.expr.clone()),
            _ => None,
        }
    }

    /// The temporal face of this wrapper, if it has one.
    pub fn as_time_operand(&self) -> Option<TimeOperand> {
        match self {
            FieldWrapper::Instant(w) => Some(TimeOperand::Instant(w.expr.clone())),
            FieldWrapper::Interval(w) => Some(TimeOperand::Interval {
                start: w.start.clone(),
                end: w.end.clone(),
            }),
            _ => None,
        }
    }

    /// The logical type this wrapper carries.
    pub fn kind(&self) -> ExprType {
        match self {
            FieldWrapper::Simple(w) => w.kind,
            FieldWrapper::Instant(_) => ExprType::DateTime,
            FieldWrapper::Interval(_) => ExprType::Interval,
            FieldWrapper::Json(_) => ExprType::Json,
            FieldWrapper::Null => ExprType::Any,
            FieldWrapper::FieldList(w) => {
                w.fields.first().map(|f| f.kind).unwrap_or(ExprType::Any)
            }
        }
    }

    /// Whether this wrapper is a duration-valued simple expression.
    pub fn is_duration(&self) -> bool {
        matches!(self, FieldWrapper::Simple(w) if w.kind == ExprType::Duration)
    }
}

/// Cast policy for simple expressions: native, numeric widths, to-string.
fn cast_field(expr: &Expr, from: ExprType, to: ExprType) -> Option<Expr> {
    if from == to {
        return Some(expr.clone());
    }
    match (from, to) {
        (ExprType::Int, ExprType::Double) => Some(expr.clone().cast(CastType::Double)),
        (ExprType::Double, ExprType::Int) => Some(expr.clone().cast(CastType::BigInt)),
        (ExprType::Int | ExprType::Double | ExprType::Json, ExprType::String) => {
            Some(expr.clone().cast(CastType::Text))
        }
        _ => None,
    }
}
