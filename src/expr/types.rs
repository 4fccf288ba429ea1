//! Logical types for query expressions.

use serde::{Deserialize, Serialize};

/// The logical type of an expression or function parameter.
///
/// `Any` only ever appears in function type bindings, never as the type of a
/// compiled expression. `Json` is the static type of every value reached
/// through an embedded document; its concrete type is only known at the SQL
/// layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExprType {
    Bool,
    Int,
    Double,
    String,
    Date,
    Time,
    DateTime,
    Duration,
    Interval,
    Geometry,
    Json,
    Any,
}

impl ExprType {
    /// Whether a value of type `actual` can bind to a parameter declared as
    /// `self`. Integers widen to doubles; JSON-typed values bind anywhere
    /// because their concrete type is resolved at the SQL layer.
    pub fn accepts(self, actual: ExprType) -> bool {
        if self == actual || self == ExprType::Any || actual == ExprType::Any {
            return true;
        }
        if actual == ExprType::Json {
            return true;
        }
        matches!(
            (self, actual),
            (ExprType::Double, ExprType::Int)
                // An instant binds where an interval is expected: it is the
                // degenerate interval whose start equals its end.
                | (ExprType::Interval, ExprType::DateTime)
        )
    }

    /// Whether this is a numeric type.
    pub fn is_numeric(self) -> bool {
        matches!(self, ExprType::Int | ExprType::Double)
    }

    /// Whether this is a temporal type.
    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            ExprType::Date
                | ExprType::Time
                | ExprType::DateTime
                | ExprType::Duration
                | ExprType::Interval
        )
    }
}

impl std::fmt::Display for ExprType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExprType::Bool => "Bool",
            ExprType::Int => "Int",
            ExprType::Double => "Double",
            ExprType::String => "String",
            ExprType::Date => "Date",
            ExprType::Time => "Time",
            ExprType::DateTime => "DateTime",
            ExprType::Duration => "Duration",
            ExprType::Interval => "Interval",
            ExprType::Geometry => "Geometry",
            ExprType::Json => "Json",
            ExprType::Any => "Any",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_exact() {
        assert!(ExprType::Int.accepts(ExprType::Int));
        assert!(ExprType::String.accepts(ExprType::String));
        assert!(!ExprType::Int.accepts(ExprType::String));
    }

    #[test]
    fn test_accepts_widening() {
        assert!(ExprType::Double.accepts(ExprType::Int));
        assert!(!ExprType::Int.accepts(ExprType::Double));
    }

    #[test]
    fn test_accepts_json_anywhere() {
        assert!(ExprType::Int.accepts(ExprType::Json));
        assert!(ExprType::DateTime.accepts(ExprType::Json));
    }

    #[test]
    fn test_accepts_instant_as_interval() {
        assert!(ExprType::Interval.accepts(ExprType::DateTime));
        assert!(!ExprType::DateTime.accepts(ExprType::Interval));
    }
}
