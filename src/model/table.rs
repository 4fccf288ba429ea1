//! Column metadata: how a logical property is persisted.

use serde::{Deserialize, Serialize};

use crate::expr::types::ExprType;

/// One typed column of a multi-column property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantColumn {
    pub data_type: ExprType,
    pub column: String,
}

/// The SQL column(s) backing a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnMapping {
    /// One scalar column.
    Single { column: String },
    /// A time span persisted as paired start/end columns.
    Interval { start: String, end: String },
    /// A value persisted redundantly in several typed columns; comparisons
    /// pick the column matching the other operand's type.
    Variants(Vec<VariantColumn>),
}

impl ColumnMapping {
    pub fn single(column: impl Into<String>) -> Self {
        ColumnMapping::Single {
            column: column.into(),
        }
    }

    pub fn interval(start: impl Into<String>, end: impl Into<String>) -> Self {
        ColumnMapping::Interval {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Whether this mapping shape fits a property of logical type `ty`.
    pub fn fits(&self, ty: ExprType) -> bool {
        match self {
            ColumnMapping::Interval { .. } => ty == ExprType::Interval,
            ColumnMapping::Single { .. } => ty != ExprType::Interval,
            ColumnMapping::Variants(_) => true,
        }
    }
}
