//! Field compilation: typed expressions → SQL field wrappers.
//!
//! Dispatch is structurally recursive. A `Path` resolves to the column(s)
//! behind its final property, a `Constant` inlines a literal, and a
//! `Function` compiles its operands first and then selects the operator
//! implementation by the *runtime shape* of the operand wrappers - the SQL
//! columns behind a logical property are a persistence decision this layer
//! is the first to see.

use crate::error::{Error, Result};
use crate::expr::types::ExprType;
use crate::expr::{Constant, Expression, Function, Op, Path};
use crate::compiler::{OrderBy, SortDir};
use crate::model::{ColumnMapping, EntityProperty, Model, Property};
use crate::sql::dialect::{CastType, Dialect, SqlDialect};
use crate::sql::expr::{func, lit_int, table_col, BinaryOperator, Expr, Literal, UnaryOperator};
use crate::sql::wrapper::{
    json, time, FieldListWrapper, FieldWrapper, InstantWrapper, IntervalWrapper, JsonWrapper,
    TimeOperand, VariantField,
};

/// Compiles typed expressions against the entity model's column metadata.
pub struct FieldCompiler<'a> {
    model: &'a Model,
    dialect: Dialect,
}

impl<'a> FieldCompiler<'a> {
    pub fn new(model: &'a Model, dialect: Dialect) -> Self {
        Self { model, dialect }
    }

    /// Compile an expression to its SQL-level wrapper.
    pub fn compile(&self, expr: &Expression) -> Result<FieldWrapper> {
        match expr {
            Expression::Path(path) => self.compile_path(path),
            Expression::Constant(c) => self.compile_constant(c),
            Expression::Function(f) => self.compile_function(f),
        }
    }

    /// Compile an expression that must be usable as a boolean condition
    /// (e.g. a `$filter` root).
    pub fn compile_condition(&self, expr: &Expression) -> Result<Expr> {
        let wrapper = self.compile(expr)?;
        wrapper
            .condition()
            .ok_or_else(|| Error::type_mismatch("$filter", "expression is not a condition"))
    }

    /// Compile `$orderby` entries to sortable expressions.
    pub fn compile_order_by(&self, entries: &[OrderBy]) -> Result<Vec<(Expr, SortDir)>> {
        entries
            .iter()
            .map(|entry| {
                let wrapper = self.compile(&entry.expr)?;
                Ok((wrapper.default_field(), entry.direction))
            })
            .collect()
    }

    // =========================================================================
    // Paths
    // =========================================================================

    fn compile_path(&self, path: &Path) -> Result<FieldWrapper> {
        // A resolved path is navigations*, one entity property, custom
        // steps*. Joins for the navigation prefix belong to the execution
        // layer; this layer addresses the final property's columns.
        let mut base: Option<&EntityProperty> = None;
        let mut steps = Vec::new();
        for property in path.properties() {
            match property {
                Property::Navigation(_) => {}
                Property::Entity(p) => base = Some(p),
                Property::Custom(c) => steps.push(c.step.clone()),
            }
        }
        let property =
            base.ok_or_else(|| Error::invalid_path("path resolves to no column"))?;
        let owner = self.model.entity_type(&property.owner)?;
        let mapping = owner.column_mapping(&property.name).ok_or_else(|| {
            Error::invalid_path(format!(
                "'{}.{}' has no column mapping",
                owner.name, property.name
            ))
        })?;

        match mapping {
            ColumnMapping::Single { column } => {
                let expr = table_col(&owner.table, column);
                if !steps.is_empty() || property.data_type == ExprType::Json {
                    Ok(FieldWrapper::Json(JsonWrapper::new(expr, steps)))
                } else if property.data_type == ExprType::DateTime {
                    Ok(FieldWrapper::Instant(InstantWrapper { expr }))
                } else {
                    Ok(FieldWrapper::simple(expr, property.data_type))
                }
            }
            ColumnMapping::Interval { start, end } => {
                if !steps.is_empty() {
                    return Err(Error::invalid_path(format!(
                        "'{}' is a time span and has no sub-properties",
                        property.name
                    )));
                }
                Ok(FieldWrapper::Interval(IntervalWrapper {
                    start: table_col(&owner.table, start),
                    end: table_col(&owner.table, end),
                }))
            }
            ColumnMapping::Variants(variants) => {
                if !steps.is_empty() {
                    // Document steps address the JSON variant column.
                    let json_col = variants
                        .iter()
                        .find(|v| v.data_type == ExprType::Json)
                        .ok_or_else(|| {
                            Error::invalid_path(format!(
                                "'{}' has no document column to step into",
                                property.name
                            ))
                        })?;
                    return Ok(FieldWrapper::Json(JsonWrapper::new(
                        table_col(&owner.table, &json_col.column),
                        steps,
                    )));
                }
                Ok(FieldWrapper::FieldList(FieldListWrapper {
                    fields: variants
                        .iter()
                        .map(|v| VariantField {
                            kind: v.data_type,
                            expr: table_col(&owner.table, &v.column),
                        })
                        .collect(),
                }))
            }
        }
    }

    // =========================================================================
    // Constants
    // =========================================================================

    fn compile_constant(&self, constant: &Constant) -> Result<FieldWrapper> {
        let wrapper = match constant {
            Constant::Null => FieldWrapper::Null,
            Constant::Bool(b) => {
                FieldWrapper::simple(Expr::Literal(Literal::Bool(*b)), ExprType::Bool)
            }
            Constant::Int(n) => FieldWrapper::simple(lit_int(*n), ExprType::Int),
            Constant::Double(d) => {
                FieldWrapper::simple(Expr::Literal(Literal::Float(*d)), ExprType::Double)
            }
            Constant::String(s) => {
                FieldWrapper::simple(Expr::Literal(Literal::String(s.clone())), ExprType::String)
            }
            Constant::Date(_) => FieldWrapper::simple(
                Expr::Literal(Literal::Date(constant.to_literal())),
                ExprType::Date,
            ),
            Constant::Time(_) => FieldWrapper::simple(
                Expr::Literal(Literal::Time(constant.to_literal())),
                ExprType::Time,
            ),
            Constant::DateTime(_) => FieldWrapper::Instant(InstantWrapper {
                expr: Expr::Literal(Literal::Timestamp(constant.to_literal())),
            }),
            Constant::Duration(d) => {
                if !self.dialect.supports_iso_duration() {
                    return Err(Error::unsupported(format!(
                        "{} does not accept ISO-8601 duration literals",
                        self.dialect.name()
                    )));
                }
                FieldWrapper::simple(
                    Expr::Literal(Literal::Duration(d.to_string())),
                    ExprType::Duration,
                )
            }
            Constant::Interval(iv) => FieldWrapper::Interval(IntervalWrapper {
                start: Expr::Literal(Literal::Timestamp(
                    Constant::DateTime(iv.start).to_literal(),
                )),
                end: Expr::Literal(Literal::Timestamp(Constant::DateTime(iv.end).to_literal())),
            }),
            Constant::Geometry(g) => FieldWrapper::simple(
                func(
                    "ST_GEOGFROMTEXT",
                    vec![Expr::Literal(Literal::String(g.wkt.clone()))],
                ),
                ExprType::Geometry,
            ),
        };
        Ok(wrapper)
    }

    // =========================================================================
    // Functions
    // =========================================================================

    fn compile_function(&self, function: &Function) -> Result<FieldWrapper> {
        let op = function.op;
        let args: Vec<FieldWrapper> = function
            .args
            .iter()
            .map(|a| self.compile(a))
            .collect::<Result<_>>()?;

        match op {
            Op::And | Op::Or => {
                let left = condition_face(&args[0], op)?;
                let right = condition_face(&args[1], op)?;
                let sql_op = if op == Op::And {
                    BinaryOperator::And
                } else {
                    BinaryOperator::Or
                };
                Ok(FieldWrapper::condition_of(Expr::binary(left, sql_op, right)))
            }
            Op::Not => {
                let inner = condition_face(&args[0], op)?;
                Ok(FieldWrapper::condition_of(Expr::UnaryOp {
                    op: UnaryOperator::Not,
                    expr: Box::new(inner),
                }))
            }
            Op::Equal
            | Op::NotEqual
            | Op::LessThan
            | Op::LessEqual
            | Op::GreaterThan
            | Op::GreaterEqual => self.compare(op, &args[0], &args[1]),
            Op::Add | Op::Subtract | Op::Multiply | Op::Divide | Op::Modulo => {
                self.arithmetic(op, &args[0], &args[1])
            }
            Op::Before | Op::After | Op::Meets | Op::During | Op::Overlaps | Op::Starts
            | Op::Finishes => {
                let left = time_operand(&args[0], op)?;
                let right = time_operand(&args[1], op)?;
                time::relation(op, &left, &right).map(FieldWrapper::condition_of)
            }
            Op::SubstringOf => {
                let needle = string_face(&args[0], op)?;
                let haystack = string_face(&args[1], op)?;
                Ok(FieldWrapper::condition_of(position_gt_zero(needle, haystack)))
            }
            Op::Contains => self.compile_contains(&args[0], &args[1]),
            Op::StartsWith => {
                let value = string_face(&args[0], op)?;
                let prefix = string_face(&args[1], op)?;
                let lead = func("LEFT", vec![value, func("CHAR_LENGTH", vec![prefix.clone()])]);
                Ok(FieldWrapper::condition_of(lead.eq(prefix)))
            }
            Op::EndsWith => {
                let value = string_face(&args[0], op)?;
                let suffix = string_face(&args[1], op)?;
                let tail = func(
                    "RIGHT",
                    vec![value, func("CHAR_LENGTH", vec![suffix.clone()])],
                );
                Ok(FieldWrapper::condition_of(tail.eq(suffix)))
            }
            Op::Length => {
                let value = string_face(&args[0], op)?;
                Ok(FieldWrapper::simple(
                    func("CHAR_LENGTH", vec![value]),
                    ExprType::Int,
                ))
            }
            Op::IndexOf => {
                let haystack = string_face(&args[0], op)?;
                let needle = string_face(&args[1], op)?;
                // 0-based on the wire, 1-based in SQL.
                Ok(FieldWrapper::simple(
                    Expr::binary(
                        Expr::Position {
                            needle: Box::new(needle),
                            haystack: Box::new(haystack),
                        },
                        BinaryOperator::Minus,
                        lit_int(1),
                    ),
                    ExprType::Int,
                ))
            }
            Op::Substring => {
                let value = string_face(&args[0], op)?;
                let start = shift_index(int_face(&args[1], op)?);
                let mut call_args = vec![value, start];
                if let Some(len) = args.get(2) {
                    call_args.push(int_face(len, op)?);
                }
                Ok(FieldWrapper::simple(
                    func("SUBSTRING", call_args),
                    ExprType::String,
                ))
            }
            Op::ToLower | Op::ToUpper | Op::Trim => {
                let name = match op {
                    Op::ToLower => "LOWER",
                    Op::ToUpper => "UPPER",
                    _ => "TRIM",
                };
                let value = string_face(&args[0], op)?;
                Ok(FieldWrapper::simple(
                    func(name, vec![value]),
                    ExprType::String,
                ))
            }
            Op::Concat => {
                let left = string_face(&args[0], op)?;
                let right = string_face(&args[1], op)?;
                Ok(FieldWrapper::simple(
                    Expr::binary(left, BinaryOperator::Concat, right),
                    ExprType::String,
                ))
            }
            Op::Round | Op::Floor | Op::Ceiling => {
                let name = match op {
                    Op::Round => "ROUND",
                    Op::Floor => "FLOOR",
                    _ => "CEIL",
                };
                let value = numeric_face(&args[0], op)?.1;
                Ok(FieldWrapper::simple(func(name, vec![value]), ExprType::Int))
            }
            Op::Year | Op::Month | Op::Day | Op::Hour | Op::Minute => {
                let part = match op {
                    Op::Year => "YEAR",
                    Op::Month => "MONTH",
                    Op::Day => "DAY",
                    Op::Hour => "HOUR",
                    _ => "MINUTE",
                };
                let value = temporal_face(&args[0], op)?;
                Ok(FieldWrapper::simple(
                    Expr::Extract {
                        part,
                        expr: Box::new(value),
                    },
                    ExprType::Int,
                ))
            }
            Op::Second => {
                let value = temporal_face(&args[0], op)?;
                let seconds = Expr::Extract {
                    part: "SECOND",
                    expr: Box::new(value),
                };
                Ok(FieldWrapper::simple(
                    func("FLOOR", vec![seconds]),
                    ExprType::Int,
                ))
            }
            Op::FractionalSeconds => {
                let value = temporal_face(&args[0], op)?;
                let seconds = Expr::Extract {
                    part: "SECOND",
                    expr: Box::new(value),
                };
                Ok(FieldWrapper::simple(
                    Expr::binary(
                        seconds.clone(),
                        BinaryOperator::Minus,
                        func("FLOOR", vec![seconds]),
                    ),
                    ExprType::Double,
                ))
            }
            Op::Date => {
                let value = temporal_face(&args[0], op)?;
                Ok(FieldWrapper::simple(
                    value.cast(CastType::Date),
                    ExprType::Date,
                ))
            }
            Op::Time => {
                let value = temporal_face(&args[0], op)?;
                Ok(FieldWrapper::simple(
                    value.cast(CastType::Time),
                    ExprType::Time,
                ))
            }
            Op::Now => Ok(FieldWrapper::Instant(InstantWrapper {
                expr: func("NOW", vec![]),
            })),
            Op::GeoDistance => Ok(FieldWrapper::simple(
                func(
                    "ST_DISTANCE",
                    vec![args[0].default_field(), args[1].default_field()],
                ),
                ExprType::Double,
            )),
            Op::GeoLength => Ok(FieldWrapper::simple(
                func("ST_LENGTH", vec![args[0].default_field()]),
                ExprType::Double,
            )),
            Op::GeoIntersects
            | Op::StEquals
            | Op::StDisjoint
            | Op::StTouches
            | Op::StWithin
            | Op::StOverlaps
            | Op::StCrosses
            | Op::StIntersects
            | Op::StContains => Ok(FieldWrapper::condition_of(func(
                geo_function_name(op),
                vec![args[0].default_field(), args[1].default_field()],
            ))),
        }
    }

    /// Comparison dispatch over operand shapes.
    fn compare(&self, op: Op, left: &FieldWrapper, right: &FieldWrapper) -> Result<FieldWrapper> {
        // Null comparisons become IS [NOT] NULL.
        if matches!(left, FieldWrapper::Null) || matches!(right, FieldWrapper::Null) {
            let value = if matches!(left, FieldWrapper::Null) {
                right
            } else {
                left
            };
            let unary = match op {
                Op::Equal => UnaryOperator::IsNull,
                Op::NotEqual => UnaryOperator::IsNotNull,
                _ => {
                    return Err(Error::type_mismatch(
                        op.name(),
                        "null only supports eq and ne",
                    ))
                }
            };
            return Ok(FieldWrapper::condition_of(Expr::UnaryOp {
                op: unary,
                expr: Box::new(value.default_field()),
            }));
        }

        // JSON-embedded operands choose their representation by the other
        // side's type.
        match (left, right) {
            (FieldWrapper::Json(_), FieldWrapper::Json(_)) => {
                return Err(Error::unsupported(
                    "comparing two JSON-embedded values is not defined",
                ));
            }
            (FieldWrapper::Json(j), other) => {
                return json::compare(self.dialect, comparison_op(op)?, j, other, true)
                    .map(FieldWrapper::condition_of);
            }
            (other, FieldWrapper::Json(j)) => {
                return json::compare(self.dialect, comparison_op(op)?, j, other, false)
                    .map(FieldWrapper::condition_of);
            }
            _ => {}
        }

        // Temporal operands use interval-boundary comparisons.
        match (left.as_time_operand(), right.as_time_operand()) {
            (Some(a), Some(b)) => {
                return time::compare(op, &a, &b).map(FieldWrapper::condition_of);
            }
            (None, None) => {}
            _ => {
                return Err(Error::type_mismatch(
                    op.name(),
                    "cannot compare a time value with a non-time value",
                ))
            }
        }

        self.simple_compare(op, left, right).map(FieldWrapper::condition_of)
    }

    /// Scalar comparison: native representation first, then the cast
    /// policy, then text-vs-text.
    fn simple_compare(&self, op: Op, left: &FieldWrapper, right: &FieldWrapper) -> Result<Expr> {
        let sql_op = comparison_op(op)?;
        let lk = left.kind();
        let rk = right.kind();
        if lk.is_numeric() && rk.is_numeric() {
            let a = left.field_as(lk).expect("numeric wrapper has its own face");
            let b = right.field_as(rk).expect("numeric wrapper has its own face");
            return Ok(Expr::binary(a, sql_op, b));
        }
        for target in [lk, rk, ExprType::String] {
            if let (Some(a), Some(b)) = (left.field_as(target), right.field_as(target)) {
                return Ok(Expr::binary(a, sql_op, b));
            }
        }
        Err(Error::type_mismatch(
            op.name(),
            format!("no common representation for {} and {}", lk, rk),
        ))
    }

    /// Arithmetic dispatch: temporal shift/difference rules, else numeric.
    fn arithmetic(&self, op: Op, left: &FieldWrapper, right: &FieldWrapper) -> Result<FieldWrapper> {
        let l_time = left.as_time_operand();
        let r_time = right.as_time_operand();
        let temporal_involved =
            l_time.is_some() || r_time.is_some() || left.is_duration() || right.is_duration();
        if !temporal_involved {
            let (lk, le) = numeric_face(left, op)?;
            let (rk, re) = numeric_face(right, op)?;
            let kind = if lk == ExprType::Int && rk == ExprType::Int {
                ExprType::Int
            } else {
                ExprType::Double
            };
            return Ok(FieldWrapper::simple(
                Expr::binary(le, arithmetic_op(op), re),
                kind,
            ));
        }

        match op {
            Op::Add => match (l_time, left.is_duration(), r_time, right.is_duration()) {
                (Some(t), _, None, true) => Ok(shift_operand(t, right.default_field(), BinaryOperator::Plus)),
                (None, true, Some(t), _) => Ok(shift_operand(t, left.default_field(), BinaryOperator::Plus)),
                (None, true, None, true) => Ok(FieldWrapper::simple(
                    Expr::binary(
                        left.default_field(),
                        BinaryOperator::Plus,
                        right.default_field(),
                    ),
                    ExprType::Duration,
                )),
                _ => Err(Error::unsupported(
                    "addition of two time values is not defined",
                )),
            },
            Op::Subtract => match (l_time, left.is_duration(), r_time, right.is_duration()) {
                (Some(t), _, None, true) => Ok(shift_operand(t, right.default_field(), BinaryOperator::Minus)),
                // The difference of two time values measures between their
                // starts.
                (Some(a), _, Some(b), _) => Ok(FieldWrapper::simple(
                    Expr::binary(a.start(), BinaryOperator::Minus, b.start()),
                    ExprType::Duration,
                )),
                (None, true, None, true) => Ok(FieldWrapper::simple(
                    Expr::binary(
                        left.default_field(),
                        BinaryOperator::Minus,
                        right.default_field(),
                    ),
                    ExprType::Duration,
                )),
                _ => Err(Error::unsupported(
                    "subtraction is not defined for these time operands",
                )),
            },
            _ => Err(Error::unsupported(
                "multiplication and division are not defined for time values",
            )),
        }
    }

    fn compile_contains(&self, haystack: &FieldWrapper, needle: &FieldWrapper) -> Result<FieldWrapper> {
        if let FieldWrapper::Json(j) = haystack {
            return json::contains(self.dialect, j, needle).map(FieldWrapper::condition_of);
        }
        let haystack = string_face(haystack, Op::Contains)?;
        let needle = string_face(needle, Op::Contains)?;
        Ok(FieldWrapper::condition_of(position_gt_zero(
            needle, haystack,
        )))
    }
}

// =============================================================================
// Operand faces
// =============================================================================

fn condition_face(wrapper: &FieldWrapper, op: Op) -> Result<Expr> {
    wrapper
        .condition()
        .ok_or_else(|| Error::type_mismatch(op.name(), "operand is not a condition"))
}

fn string_face(wrapper: &FieldWrapper, op: Op) -> Result<Expr> {
    wrapper
        .field_as(ExprType::String)
        .ok_or_else(|| Error::type_mismatch(op.name(), "operand not representable as text"))
}

fn int_face(wrapper: &FieldWrapper, op: Op) -> Result<Expr> {
    wrapper
        .field_as(ExprType::Int)
        .ok_or_else(|| Error::type_mismatch(op.name(), "operand not representable as integer"))
}

fn numeric_face(wrapper: &FieldWrapper, op: Op) -> Result<(ExprType, Expr)> {
    let kind = if wrapper.kind() == ExprType::Int {
        ExprType::Int
    } else {
        ExprType::Double
    };
    wrapper
        .field_as(kind)
        .map(|e| (kind, e))
        .ok_or_else(|| Error::type_mismatch(op.name(), "operand not representable as number"))
}

fn temporal_face(wrapper: &FieldWrapper, op: Op) -> Result<Expr> {
    if let Some(t) = wrapper.as_time_operand() {
        return Ok(t.start());
    }
    match wrapper.kind() {
        ExprType::Date | ExprType::Time => Ok(wrapper.default_field()),
        _ => Err(Error::type_mismatch(
            op.name(),
            "operand is not a date or time value",
        )),
    }
}

fn time_operand(wrapper: &FieldWrapper, op: Op) -> Result<TimeOperand> {
    wrapper
        .as_time_operand()
        .ok_or_else(|| Error::type_mismatch(op.name(), "operand is not an instant or interval"))
}

// =============================================================================
// Small builders
// =============================================================================

/// Apply a duration shift to an instant or both interval endpoints.
fn shift_operand(operand: TimeOperand, duration: Expr, op: BinaryOperator) -> FieldWrapper {
    match operand {
        TimeOperand::Instant(e) => FieldWrapper::Instant(InstantWrapper {
            expr: Expr::binary(e, op, duration),
        }),
        TimeOperand::Interval { start, end } => FieldWrapper::Interval(IntervalWrapper {
            start: Expr::binary(start, op, duration.clone()),
            end: Expr::binary(end, op, duration),
        }),
    }
}

fn position_gt_zero(needle: Expr, haystack: Expr) -> Expr {
    Expr::binary(
        Expr::Position {
            needle: Box::new(needle),
            haystack: Box::new(haystack),
        },
        BinaryOperator::Gt,
        lit_int(0),
    )
}

/// 0-based wire index to 1-based SQL index, folding literals.
fn shift_index(expr: Expr) -> Expr {
    match expr {
        Expr::Literal(Literal::Int(n)) => lit_int(n + 1),
        other => Expr::binary(other, BinaryOperator::Plus, lit_int(1)),
    }
}

fn comparison_op(op: Op) -> Result<BinaryOperator> {
    let sql_op = match op {
        Op::Equal => BinaryOperator::Eq,
        Op::NotEqual => BinaryOperator::Ne,
        Op::LessThan => BinaryOperator::Lt,
        Op::LessEqual => BinaryOperator::Lte,
        Op::GreaterThan => BinaryOperator::Gt,
        Op::GreaterEqual => BinaryOperator::Gte,
        other => {
            return Err(Error::unsupported(format!(
                "'{}' is not a comparison",
                other
            )))
        }
    };
    Ok(sql_op)
}

fn arithmetic_op(op: Op) -> BinaryOperator {
    match op {
        Op::Add => BinaryOperator::Plus,
        Op::Subtract => BinaryOperator::Minus,
        Op::Multiply => BinaryOperator::Mul,
        Op::Divide => BinaryOperator::Div,
        _ => BinaryOperator::Mod,
    }
}

fn geo_function_name(op: Op) -> &'static str {
    match op {
        Op::GeoIntersects | Op::StIntersects => "ST_INTERSECTS",
        Op::StEquals => "ST_EQUALS",
        Op::StDisjoint => "ST_DISJOINT",
        Op::StTouches => "ST_TOUCHES",
        Op::StWithin => "ST_WITHIN",
        Op::StOverlaps => "ST_OVERLAPS",
        Op::StCrosses => "ST_CROSSES",
        _ => "ST_CONTAINS",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler;
    use crate::config::QuerySettings;
    use crate::model::sta;

    /// Compile a `$filter` against Observations down to SQL text.
    fn filter_sql(filter: &str) -> Result<String> {
        filter_sql_on("Observations", filter, Dialect::Postgres)
    }

    fn filter_sql_on(root: &str, filter: &str, dialect: Dialect) -> Result<String> {
        let model = sta::core_model();
        let settings = QuerySettings::default();
        let query = compiler::compile(&model, &settings, root, &format!("$filter={}", filter))?;
        let compiler = FieldCompiler::new(&model, dialect);
        let expr = query.filter.expect("filter present");
        compiler.compile_condition(&expr).map(|e| e.to_sql(dialect))
    }

    #[test]
    fn test_numeric_comparison_picks_number_variant() {
        let sql = filter_sql("result gt 10").unwrap();
        assert_eq!(sql, "(\"observations\".\"result_number\" > 10)");
    }

    #[test]
    fn test_string_comparison_picks_string_variant() {
        let sql = filter_sql("result eq 'calm'").unwrap();
        assert_eq!(sql, "(\"observations\".\"result_string\" = 'calm')");
    }

    #[test]
    fn test_arithmetic_inside_comparison() {
        let sql = filter_sql("(result sub 5) gt 10").unwrap();
        assert_eq!(
            sql,
            "((\"observations\".\"result_number\" - 5) > 10)"
        );
    }

    #[test]
    fn test_and_condition() {
        let sql = filter_sql("result gt 1 and result lt 9").unwrap();
        assert_eq!(
            sql,
            "((\"observations\".\"result_number\" > 1) AND (\"observations\".\"result_number\" < 9))"
        );
    }

    #[test]
    fn test_null_comparison() {
        let sql = filter_sql("resultTime eq null").unwrap();
        assert_eq!(sql, "(\"observations\".\"result_time\" IS NULL)");
        let sql = filter_sql("resultTime ne null").unwrap();
        assert_eq!(sql, "(\"observations\".\"result_time\" IS NOT NULL)");
    }

    #[test]
    fn test_instant_vs_interval_uses_boundaries() {
        let sql = filter_sql("phenomenonTime lt 2024-01-01T00:00:00Z").unwrap();
        assert_eq!(
            sql,
            "((\"observations\".\"phenomenon_time_end\" <= TIMESTAMPTZ '2024-01-01T00:00:00Z') \
             AND (\"observations\".\"phenomenon_time_start\" < TIMESTAMPTZ '2024-01-01T00:00:00Z'))"
        );
    }

    #[test]
    fn test_temporal_relation() {
        let sql =
            filter_sql("before(phenomenonTime, 2024-01-01T00:00:00Z)").unwrap();
        assert!(sql.contains("phenomenon_time_end\" <="), "{}", sql);
        assert!(sql.contains("phenomenon_time_start\" <"), "{}", sql);
    }

    #[test]
    fn test_instant_plus_duration_shifts() {
        let sql = filter_sql("resultTime add duration'P1D' gt 2024-01-01T00:00:00Z").unwrap();
        assert_eq!(
            sql,
            "((\"observations\".\"result_time\" + INTERVAL 'P1D') > TIMESTAMPTZ '2024-01-01T00:00:00Z')"
        );
    }

    #[test]
    fn test_interval_minus_duration_shifts_both_bounds() {
        let sql = filter_sql(
            "starts(phenomenonTime sub duration'PT1H', 2024-01-01T00:00:00Z)",
        )
        .unwrap();
        assert!(
            sql.contains("(\"observations\".\"phenomenon_time_start\" - INTERVAL 'PT1H')"),
            "{}",
            sql
        );
    }

    #[test]
    fn test_instant_difference_is_duration() {
        // (now() sub resultTime) has no comparison here; check the shape
        // via an le comparison against a duration-typed property-free expr.
        let model = sta::core_model();
        let settings = QuerySettings::default();
        let query = compiler::compile(
            &model,
            &settings,
            "Observations",
            "$filter=(now() sub resultTime) le duration'P7D'",
        )
        .unwrap();
        let compiler = FieldCompiler::new(&model, Dialect::Postgres);
        let sql = compiler
            .compile_condition(&query.filter.unwrap())
            .unwrap()
            .to_sql(Dialect::Postgres);
        assert!(sql.contains("(NOW() - \"observations\".\"result_time\")"), "{}", sql);
    }

    #[test]
    fn test_interval_times_interval_unsupported() {
        assert!(matches!(
            filter_sql("(phenomenonTime mul phenomenonTime) eq 1"),
            Err(Error::TypeMismatch { .. }) | Err(Error::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_json_numeric_guard() {
        let sql = filter_sql("parameters/depth eq 3").unwrap();
        assert!(sql.contains("TO_JSONB(3)"), "{}", sql);
        assert!(sql.contains("JSONB_TYPEOF"), "{}", sql);
        assert!(sql.contains("'number'"), "{}", sql);
    }

    #[test]
    fn test_json_string_comparison_stays_text() {
        let sql = filter_sql("parameters/depth eq '3'").unwrap();
        assert!(sql.contains("#>>"), "{}", sql);
        assert!(!sql.contains("JSONB_TYPEOF"), "{}", sql);
    }

    #[test]
    fn test_json_on_mysql_unsupported() {
        assert!(matches!(
            filter_sql_on("Observations", "parameters/depth eq 3", Dialect::MySql),
            Err(Error::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_string_functions() {
        let sql = filter_sql_on("Things", "startswith(name, 'Ther')", Dialect::Postgres).unwrap();
        assert_eq!(
            sql,
            "(LEFT(\"things\".\"name\", CHAR_LENGTH('Ther')) = 'Ther')"
        );
        let sql = filter_sql_on("Things", "contains(name, 'erm')", Dialect::Postgres).unwrap();
        assert_eq!(sql, "(POSITION('erm' IN \"things\".\"name\") > 0)");
    }

    #[test]
    fn test_substring_shifts_index() {
        let model = sta::core_model();
        let settings = QuerySettings::default();
        let query = compiler::compile(
            &model,
            &settings,
            "Things",
            "$filter=substring(name, 2) eq 'ermometer'",
        )
        .unwrap();
        let sql = FieldCompiler::new(&model, Dialect::Postgres)
            .compile_condition(&query.filter.unwrap())
            .unwrap()
            .to_sql(Dialect::Postgres);
        assert!(sql.contains("SUBSTRING(\"things\".\"name\", 3)"), "{}", sql);
    }

    #[test]
    fn test_year_extract() {
        let sql = filter_sql("year(resultTime) eq 2024").unwrap();
        assert_eq!(
            sql,
            "(EXTRACT(YEAR FROM \"observations\".\"result_time\") = 2024)"
        );
    }

    #[test]
    fn test_geospatial_predicate() {
        let sql = filter_sql_on(
            "Locations",
            "st_within(location, geography'POINT (30 10)')",
            Dialect::Postgres,
        )
        .unwrap();
        assert_eq!(
            sql,
            "ST_WITHIN(\"locations\".\"location\", ST_GEOGFROMTEXT('POINT (30 10)'))"
        );
    }

    #[test]
    fn test_boolean_variant_as_condition() {
        let sql = filter_sql("result eq true").unwrap();
        assert_eq!(sql, "(\"observations\".\"result_boolean\" = true)");
    }

    #[test]
    fn test_order_by_compilation() {
        let model = sta::core_model();
        let settings = QuerySettings::default();
        let query = compiler::compile(
            &model,
            &settings,
            "Observations",
            "$orderby=phenomenonTime desc,result",
        )
        .unwrap();
        let compiled = FieldCompiler::new(&model, Dialect::Postgres)
            .compile_order_by(&query.order_by)
            .unwrap();
        assert_eq!(compiled.len(), 2);
        assert_eq!(
            compiled[0].0.to_sql(Dialect::Postgres),
            "\"observations\".\"phenomenon_time_start\""
        );
        assert_eq!(compiled[0].1, SortDir::Desc);
    }

    #[test]
    fn test_mysql_quoting_in_condition() {
        let sql = filter_sql_on("Things", "name eq 'x'", Dialect::MySql).unwrap();
        assert_eq!(sql, "(`things`.`name` = 'x')");
    }
}
