//! Typed expression AST.
//!
//! The compiler turns the grammar's generic parse tree into this AST:
//! property paths resolved against the entity model, typed constants, and
//! function applications whose operands satisfied one of the operator's
//! declared type bindings.

pub mod constant;
pub mod function;
pub mod types;

pub use constant::{Constant, DurationValue, GeometryValue, IntervalValue};
pub use function::{Op, TypeBinding};
pub use types::ExprType;

use serde::{Deserialize, Serialize};

use crate::model::Property;

/// One resolved step of a path: a property, optionally pinned to a single
/// entity by an identifier (`Datastreams(5)`). Identifiers only ever appear
/// on navigation segments, and only in `$filter`; the execution layer is the
/// consumer of the pinning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSegment {
    pub property: Property,
    pub id: Option<i64>,
}

impl PathSegment {
    pub fn new(property: Property) -> Self {
        Self { property, id: None }
    }

    pub fn identified(property: Property, id: i64) -> Self {
        Self {
            property,
            id: Some(id),
        }
    }
}

/// An ordered chain of properties rooted at the query's target entity type.
///
/// Invariant (maintained by the compiler): every non-first segment belongs to
/// the entity type reached by the previous navigation segment, and custom
/// steps only follow a property that allows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    pub segments: Vec<PathSegment>,
}

impl Path {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// A path over plain (unidentified) properties.
    pub fn from_properties(properties: Vec<Property>) -> Self {
        Self {
            segments: properties.into_iter().map(PathSegment::new).collect(),
        }
    }

    /// The property the path ultimately reads.
    pub fn final_property(&self) -> &Property {
        &self.segments.last().expect("paths are never empty").property
    }

    /// The properties of all segments, in order.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.segments.iter().map(|s| &s.property)
    }

    /// The logical type of the value this path yields.
    pub fn expr_type(&self) -> ExprType {
        self.final_property().data_type()
    }

    /// Whether any segment is a custom (document) step.
    pub fn has_custom_steps(&self) -> bool {
        self.properties()
            .any(|p| matches!(p, Property::Custom(_)))
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .segments
            .iter()
            .map(|s| match s.id {
                Some(id) => format!("{}({})", s.property.name(), id),
                None => s.property.name(),
            })
            .collect();
        write!(f, "{}", names.join("/"))
    }
}

/// An operator applied to compiled operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub op: Op,
    pub args: Vec<Expression>,
    /// The result type of the binding selected during overload resolution.
    pub return_type: ExprType,
}

/// A typed expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Path(Path),
    Constant(Constant),
    Function(Function),
}

impl Expression {
    /// The logical type of this expression.
    pub fn expr_type(&self) -> ExprType {
        match self {
            Expression::Path(p) => p.expr_type(),
            Expression::Constant(c) => c.expr_type(),
            Expression::Function(f) => f.return_type,
        }
    }

    pub fn function(op: Op, args: Vec<Expression>, return_type: ExprType) -> Self {
        Expression::Function(Function {
            op,
            args,
            return_type,
        })
    }

    pub fn int(value: i64) -> Self {
        Expression::Constant(Constant::Int(value))
    }

    pub fn double(value: f64) -> Self {
        Expression::Constant(Constant::Double(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expression::Constant(Constant::String(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        Expression::Constant(Constant::Bool(value))
    }

    /// The path inside this expression, if it is a plain path.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Expression::Path(p) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CustomProperty, CustomStep, EntityProperty};

    fn prop(name: &str, data_type: ExprType) -> Property {
        Property::Entity(EntityProperty {
            name: name.into(),
            owner: "Observations".into(),
            data_type,
            nullable: true,
            has_custom: false,
            aliases: Vec::new(),
        })
    }

    #[test]
    fn test_path_type_is_final_segment_type() {
        let path = Path::from_properties(vec![prop("result", ExprType::Double)]);
        assert_eq!(path.expr_type(), ExprType::Double);
    }

    #[test]
    fn test_path_display() {
        let path = Path::from_properties(vec![
            prop("parameters", ExprType::Json),
            Property::Custom(CustomProperty {
                step: CustomStep::Named("depth".into()),
            }),
        ]);
        assert_eq!(path.to_string(), "parameters/depth");
        assert!(path.has_custom_steps());
    }

    #[test]
    fn test_identified_segment_display() {
        let path = Path::new(vec![PathSegment::identified(
            prop("Datastreams", ExprType::Json),
            5,
        )]);
        assert_eq!(path.to_string(), "Datastreams(5)");
    }

    #[test]
    fn test_function_type() {
        let f = Expression::function(
            Op::Add,
            vec![Expression::int(1), Expression::int(2)],
            ExprType::Int,
        );
        assert_eq!(f.expr_type(), ExprType::Int);
    }
}
