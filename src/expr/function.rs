//! The operator table.
//!
//! Every operator and canonical function carries a declared list of allowed
//! type bindings: the legal combinations of parameter types and the result
//! type each combination produces. Overload resolution intersects these
//! bindings with the admissible result types propagated from the enclosing
//! context.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::expr::types::ExprType;

/// A legal (parameter types..., return type) combination for an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeBinding {
    pub params: &'static [ExprType],
    pub ret: ExprType,
}

/// Operators and canonical functions understood by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    // Logical
    And,
    Or,
    Not,
    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Negate,
    // String
    SubstringOf,
    Contains,
    StartsWith,
    EndsWith,
    Length,
    IndexOf,
    Substring,
    ToLower,
    ToUpper,
    Trim,
    Concat,
    // Math
    Round,
    Floor,
    Ceiling,
    // Date/time components
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    FractionalSeconds,
    Date,
    Time,
    Now,
    // Temporal relations
    Before,
    After,
    Meets,
    During,
    Overlaps,
    Starts,
    Finishes,
    // Geospatial
    GeoDistance,
    GeoLength,
    GeoIntersects,
    StEquals,
    StDisjoint,
    StTouches,
    StWithin,
    StOverlaps,
    StCrosses,
    StIntersects,
    StContains,
}

use ExprType::*;

/// Bindings shared by all six comparison operators.
static COMPARE_BINDINGS: &[TypeBinding] = &[
    TypeBinding { params: &[Int, Int], ret: Bool },
    TypeBinding { params: &[Int, Double], ret: Bool },
    TypeBinding { params: &[Double, Int], ret: Bool },
    TypeBinding { params: &[Double, Double], ret: Bool },
    TypeBinding { params: &[String, String], ret: Bool },
    TypeBinding { params: &[Bool, Bool], ret: Bool },
    TypeBinding { params: &[Date, Date], ret: Bool },
    TypeBinding { params: &[Time, Time], ret: Bool },
    TypeBinding { params: &[Duration, Duration], ret: Bool },
    // Instants bind to interval parameters as degenerate intervals, so this
    // row covers DateTime/Interval in every combination.
    TypeBinding { params: &[Interval, Interval], ret: Bool },
    TypeBinding { params: &[Geometry, Geometry], ret: Bool },
];

static NUMERIC_BINARY: &[TypeBinding] = &[
    TypeBinding { params: &[Int, Int], ret: Int },
    TypeBinding { params: &[Int, Double], ret: Double },
    TypeBinding { params: &[Double, Int], ret: Double },
    TypeBinding { params: &[Double, Double], ret: Double },
];

static ADD_BINDINGS: &[TypeBinding] = &[
    TypeBinding { params: &[Int, Int], ret: Int },
    TypeBinding { params: &[Int, Double], ret: Double },
    TypeBinding { params: &[Double, Int], ret: Double },
    TypeBinding { params: &[Double, Double], ret: Double },
    TypeBinding { params: &[DateTime, Duration], ret: DateTime },
    TypeBinding { params: &[Duration, DateTime], ret: DateTime },
    TypeBinding { params: &[Interval, Duration], ret: Interval },
    TypeBinding { params: &[Duration, Interval], ret: Interval },
    TypeBinding { params: &[Duration, Duration], ret: Duration },
];

static SUB_BINDINGS: &[TypeBinding] = &[
    TypeBinding { params: &[Int, Int], ret: Int },
    TypeBinding { params: &[Int, Double], ret: Double },
    TypeBinding { params: &[Double, Int], ret: Double },
    TypeBinding { params: &[Double, Double], ret: Double },
    TypeBinding { params: &[DateTime, Duration], ret: DateTime },
    TypeBinding { params: &[Interval, Duration], ret: Interval },
    TypeBinding { params: &[DateTime, DateTime], ret: Duration },
    // An interval minus an instant or interval measures from the start.
    TypeBinding { params: &[Interval, Interval], ret: Duration },
    TypeBinding { params: &[Duration, Duration], ret: Duration },
];

static BOOL_PAIR: &[TypeBinding] = &[TypeBinding { params: &[Bool, Bool], ret: Bool }];

static STRING_PREDICATE: &[TypeBinding] =
    &[TypeBinding { params: &[String, String], ret: Bool }];

static TEMPORAL_RELATION: &[TypeBinding] =
    &[TypeBinding { params: &[Interval, Interval], ret: Bool }];

static GEO_PREDICATE: &[TypeBinding] =
    &[TypeBinding { params: &[Geometry, Geometry], ret: Bool }];

impl Op {
    /// The canonical (lower-case, URL-side) name of this operator.
    pub fn name(&self) -> &'static str {
        match self {
            Op::And => "and",
            Op::Or => "or",
            Op::Not => "not",
            Op::Equal => "eq",
            Op::NotEqual => "ne",
            Op::LessThan => "lt",
            Op::LessEqual => "le",
            Op::GreaterThan => "gt",
            Op::GreaterEqual => "ge",
            Op::Add => "add",
            Op::Subtract => "sub",
            Op::Multiply => "mul",
            Op::Divide => "div",
            Op::Modulo => "mod",
            Op::Negate => "-",
            Op::SubstringOf => "substringof",
            Op::Contains => "contains",
            Op::StartsWith => "startswith",
            Op::EndsWith => "endswith",
            Op::Length => "length",
            Op::IndexOf => "indexof",
            Op::Substring => "substring",
            Op::ToLower => "tolower",
            Op::ToUpper => "toupper",
            Op::Trim => "trim",
            Op::Concat => "concat",
            Op::Round => "round",
            Op::Floor => "floor",
            Op::Ceiling => "ceiling",
            Op::Year => "year",
            Op::Month => "month",
            Op::Day => "day",
            Op::Hour => "hour",
            Op::Minute => "minute",
            Op::Second => "second",
            Op::FractionalSeconds => "fractionalseconds",
            Op::Date => "date",
            Op::Time => "time",
            Op::Now => "now",
            Op::Before => "before",
            Op::After => "after",
            Op::Meets => "meets",
            Op::During => "during",
            Op::Overlaps => "overlaps",
            Op::Starts => "starts",
            Op::Finishes => "finishes",
            Op::GeoDistance => "geo.distance",
            Op::GeoLength => "geo.length",
            Op::GeoIntersects => "geo.intersects",
            Op::StEquals => "st_equals",
            Op::StDisjoint => "st_disjoint",
            Op::StTouches => "st_touches",
            Op::StWithin => "st_within",
            Op::StOverlaps => "st_overlaps",
            Op::StCrosses => "st_crosses",
            Op::StIntersects => "st_intersects",
            Op::StContains => "st_contains",
        }
    }

    /// The allowed type bindings of this operator.
    pub fn bindings(&self) -> &'static [TypeBinding] {
        match self {
            Op::And | Op::Or => BOOL_PAIR,
            Op::Not => &[TypeBinding { params: &[Bool], ret: Bool }],
            Op::Equal
            | Op::NotEqual
            | Op::LessThan
            | Op::LessEqual
            | Op::GreaterThan
            | Op::GreaterEqual => COMPARE_BINDINGS,
            Op::Add => ADD_BINDINGS,
            Op::Subtract => SUB_BINDINGS,
            Op::Multiply | Op::Divide | Op::Modulo => NUMERIC_BINARY,
            Op::Negate => &[
                TypeBinding { params: &[Int], ret: Int },
                TypeBinding { params: &[Double], ret: Double },
                TypeBinding { params: &[Duration], ret: Duration },
            ],
            Op::SubstringOf | Op::Contains | Op::StartsWith | Op::EndsWith => STRING_PREDICATE,
            Op::Length => &[TypeBinding { params: &[String], ret: Int }],
            Op::IndexOf => &[TypeBinding { params: &[String, String], ret: Int }],
            Op::Substring => &[
                TypeBinding { params: &[String, Int], ret: String },
                TypeBinding { params: &[String, Int, Int], ret: String },
            ],
            Op::ToLower | Op::ToUpper | Op::Trim => {
                &[TypeBinding { params: &[String], ret: String }]
            }
            Op::Concat => &[TypeBinding { params: &[String, String], ret: String }],
            Op::Round | Op::Floor | Op::Ceiling => &[
                TypeBinding { params: &[Double], ret: Int },
                TypeBinding { params: &[Int], ret: Int },
            ],
            Op::Year | Op::Month | Op::Day => &[
                TypeBinding { params: &[DateTime], ret: Int },
                TypeBinding { params: &[Date], ret: Int },
            ],
            Op::Hour | Op::Minute | Op::Second => &[
                TypeBinding { params: &[DateTime], ret: Int },
                TypeBinding { params: &[Time], ret: Int },
            ],
            Op::FractionalSeconds => &[TypeBinding { params: &[DateTime], ret: Double }],
            Op::Date => &[TypeBinding { params: &[DateTime], ret: Date }],
            Op::Time => &[TypeBinding { params: &[DateTime], ret: Time }],
            Op::Now => &[TypeBinding { params: &[], ret: DateTime }],
            Op::Before | Op::After | Op::Meets | Op::During | Op::Overlaps | Op::Starts
            | Op::Finishes => TEMPORAL_RELATION,
            Op::GeoDistance => &[TypeBinding { params: &[Geometry, Geometry], ret: Double }],
            Op::GeoLength => &[TypeBinding { params: &[Geometry], ret: Double }],
            Op::GeoIntersects
            | Op::StEquals
            | Op::StDisjoint
            | Op::StTouches
            | Op::StWithin
            | Op::StOverlaps
            | Op::StCrosses
            | Op::StIntersects
            | Op::StContains => GEO_PREDICATE,
        }
    }

    /// Whether `argc` is a legal argument count for this operator.
    pub fn accepts_arity(&self, argc: usize) -> bool {
        self.bindings().iter().any(|b| b.params.len() == argc)
    }

    /// All result types this operator can produce.
    pub fn result_types(&self) -> Vec<ExprType> {
        let mut types: Vec<ExprType> = Vec::new();
        for binding in self.bindings() {
            if !types.contains(&binding.ret) {
                types.push(binding.ret);
            }
        }
        types
    }

    /// Whether this is one of the six comparison operators.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Op::Equal
                | Op::NotEqual
                | Op::LessThan
                | Op::LessEqual
                | Op::GreaterThan
                | Op::GreaterEqual
        )
    }

    /// Whether this is one of the temporal relation operators.
    pub fn is_temporal_relation(&self) -> bool {
        matches!(
            self,
            Op::Before | Op::After | Op::Meets | Op::During | Op::Overlaps | Op::Starts
                | Op::Finishes
        )
    }

    /// Resolve a function-call name (not an infix keyword) to an operator.
    pub fn from_function_name(name: &str) -> Option<Op> {
        FUNCTION_TABLE.get(name.to_ascii_lowercase().as_str()).copied()
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Functions callable with `name(args...)` syntax. Infix keywords (`and`,
/// `eq`, `add`, ...) are resolved by the grammar, not this table.
static FUNCTION_TABLE: Lazy<HashMap<&'static str, Op>> = Lazy::new(|| {
    let callable = [
        Op::SubstringOf,
        Op::Contains,
        Op::StartsWith,
        Op::EndsWith,
        Op::Length,
        Op::IndexOf,
        Op::Substring,
        Op::ToLower,
        Op::ToUpper,
        Op::Trim,
        Op::Concat,
        Op::Round,
        Op::Floor,
        Op::Ceiling,
        Op::Year,
        Op::Month,
        Op::Day,
        Op::Hour,
        Op::Minute,
        Op::Second,
        Op::FractionalSeconds,
        Op::Date,
        Op::Time,
        Op::Now,
        Op::Before,
        Op::After,
        Op::Meets,
        Op::During,
        Op::Overlaps,
        Op::Starts,
        Op::Finishes,
        Op::GeoDistance,
        Op::GeoLength,
        Op::GeoIntersects,
        Op::StEquals,
        Op::StDisjoint,
        Op::StTouches,
        Op::StWithin,
        Op::StOverlaps,
        Op::StCrosses,
        Op::StIntersects,
        Op::StContains,
    ];
    callable.into_iter().map(|op| (op.name(), op)).collect()
});
