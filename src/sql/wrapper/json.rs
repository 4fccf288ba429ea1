//! Typed access into JSON-embedded values.
//!
//! A document-valued property compiles to a descriptor (column + path);
//! [`JsonWrapper::materialize`] is a pure function producing the four
//! parallel faces of the same extraction - text, numeric, boolean, jsonb -
//! so nothing here holds hidden mutable state and materializing twice gives
//! the same bundle.
//!
//! Comparisons are type-directed: numeric and boolean operands compare in
//! jsonb space, guarded by a `jsonb_typeof` predicate so a JSON string `"3"`
//! never matches the number `3`; everything else falls back to text.

use crate::error::{Error, Result};
use crate::expr::types::ExprType;
use crate::model::CustomStep;
use crate::sql::dialect::{CastType, Dialect, SqlDialect};
use crate::sql::expr::{func, BinaryOperator, Expr, Literal};
use crate::sql::wrapper::FieldWrapper;

/// Descriptor of a JSON-embedded value: the document column and the path of
/// steps into it.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonWrapper {
    pub column: Expr,
    pub steps: Vec<CustomStep>,
}

/// The materialized faces of one JSON extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonFields {
    pub text: Expr,
    pub number: Expr,
    pub boolean: Expr,
    pub jsonb: Expr,
}

impl JsonWrapper {
    pub fn new(column: Expr, steps: Vec<CustomStep>) -> Self {
        Self { column, steps }
    }

    /// Build the four sub-expressions over the same path. Pure; calling it
    /// twice yields identical bundles.
    pub fn materialize(&self) -> JsonFields {
        let document = self.column.clone().cast(CastType::Jsonb);
        let (jsonb, text) = if self.steps.is_empty() {
            (document, self.column.clone().cast(CastType::Text))
        } else {
            let path = Expr::Literal(Literal::String(path_literal(&self.steps)));
            (
                Expr::binary(document.clone(), BinaryOperator::JsonGet, path.clone()),
                Expr::binary(document, BinaryOperator::JsonGetText, path),
            )
        };
        JsonFields {
            number: text.clone().cast(CastType::Numeric),
            boolean: text.clone().cast(CastType::Boolean),
            text,
            jsonb,
        }
    }
}

/// `{a,0,b}` path-array literal for `#>`/`#>>`.
fn path_literal(steps: &[CustomStep]) -> String {
    let elements: Vec<String> = steps
        .iter()
        .map(|step| match step {
            CustomStep::Named(name) => quote_path_element(name),
            CustomStep::Index(i) => i.to_string(),
        })
        .collect();
    format!("{{{}}}", elements.join(","))
}

/// Quote a path element when it contains array-literal syntax.
fn quote_path_element(name: &str) -> String {
    if name.contains([',', '{', '}', '"', '\\', ' ']) {
        format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        name.to_string()
    }
}

/// Compile a comparison between a JSON extraction and a non-JSON operand.
///
/// `json_left` preserves the surface operand order for the asymmetric
/// comparisons.
pub fn compare(
    dialect: Dialect,
    op: BinaryOperator,
    json: &JsonWrapper,
    other: &FieldWrapper,
    json_left: bool,
) -> Result<Expr> {
    if !dialect.supports_jsonb() {
        return Err(Error::unsupported(format!(
            "JSON comparison requires jsonb support, which {} lacks",
            dialect.name()
        )));
    }
    if matches!(other, FieldWrapper::Json(_)) {
        // Two JSON-wrapped operands have no defined comparison semantics.
        return Err(Error::unsupported(
            "comparing two JSON-embedded values is not defined",
        ));
    }
    let fields = json.materialize();
    let guard_type = match other.kind() {
        ExprType::Int | ExprType::Double => Some("number"),
        ExprType::Bool => Some("boolean"),
        _ => None,
    };
    match guard_type {
        Some(type_name) => {
            let other_expr = other
                .field_as(other.kind())
                .ok_or_else(|| Error::type_mismatch("json compare", "operand has no scalar"))?;
            let wrapped = func("TO_JSONB", vec![other_expr]);
            let cmp = ordered(op, fields.jsonb.clone(), wrapped, json_left);
            // jsonb's native ordering would let cross-type comparisons
            // "succeed"; the typeof guard rejects them.
            let guard = func("JSONB_TYPEOF", vec![fields.jsonb])
                .eq(Expr::Literal(Literal::String(type_name.into())));
            Ok(cmp.and(guard))
        }
        None => {
            let other_text = other.field_as(ExprType::String).ok_or_else(|| {
                Error::type_mismatch("json compare", "operand not representable as text")
            })?;
            Ok(ordered(op, fields.text, other_text, json_left))
        }
    }
}

/// Compile `contains` against a JSON array: jsonb containment of the other
/// operand.
pub fn contains(dialect: Dialect, json: &JsonWrapper, other: &FieldWrapper) -> Result<Expr> {
    if !dialect.supports_jsonb() {
        return Err(Error::unsupported(format!(
            "JSON containment requires jsonb support, which {} lacks",
            dialect.name()
        )));
    }
    let fields = json.materialize();
    let needle = match other {
        FieldWrapper::Json(w) => w.materialize().jsonb,
        other => {
            let expr = other
                .field_as(other.kind())
                .ok_or_else(|| Error::type_mismatch("contains", "operand has no scalar"))?;
            func("TO_JSONB", vec![expr])
        }
    };
    Ok(Expr::binary(fields.jsonb, BinaryOperator::JsonContains, needle))
}

fn ordered(op: BinaryOperator, json_expr: Expr, other_expr: Expr, json_left: bool) -> Expr {
    if json_left {
        Expr::binary(json_expr, op, other_expr)
    } else {
        Expr::binary(other_expr, op, json_expr)
    }
}
