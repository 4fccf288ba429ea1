//! Property definitions for entity types.

use serde::{Deserialize, Serialize};

use crate::expr::types::ExprType;

/// How many related entities a navigation property reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    One,
    Many,
}

/// A primitive or document-valued property persisted on the entity's table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityProperty {
    pub name: String,
    /// Name of the entity type this property belongs to.
    pub owner: String,
    pub data_type: ExprType,
    pub nullable: bool,
    /// Whether this property carries an embedded document that sub-property
    /// steps may reach into.
    pub has_custom: bool,
    /// Alternative names this property answers to (e.g. `@iot.id` for `id`).
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// A relation edge to another entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationProperty {
    pub name: String,
    pub owner: String,
    /// Name of the entity type this navigation reaches.
    pub target: String,
    pub cardinality: Cardinality,
    pub required: bool,
}

/// One step into an embedded document: a member name or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomStep {
    Named(String),
    Index(i64),
}

impl std::fmt::Display for CustomStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CustomStep::Named(name) => write!(f, "{}", name),
            CustomStep::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// A named or indexed step below a document-bearing property. Only legal
/// beneath an entity property (or another custom step) flagged `has_custom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomProperty {
    pub step: CustomStep,
}

/// A property of an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Property {
    Entity(EntityProperty),
    Navigation(NavigationProperty),
    Custom(CustomProperty),
}

impl Property {
    /// The surface name of this property.
    pub fn name(&self) -> String {
        match self {
            Property::Entity(p) => p.name.clone(),
            Property::Navigation(p) => p.name.clone(),
            Property::Custom(p) => p.step.to_string(),
        }
    }

    pub fn is_navigation(&self) -> bool {
        matches!(self, Property::Navigation(_))
    }

    /// The logical type of a value read through this property.
    pub fn data_type(&self) -> ExprType {
        match self {
            Property::Entity(p) => p.data_type,
            // Navigation properties have no scalar type; treat as Json so
            // misuse fails at binding resolution rather than panicking.
            Property::Navigation(_) => ExprType::Json,
            Property::Custom(_) => ExprType::Json,
        }
    }

    /// Whether sub-property steps below this property are legal.
    pub fn allows_custom(&self) -> bool {
        match self {
            Property::Entity(p) => p.has_custom,
            Property::Navigation(_) => false,
            // A step into a document stays inside the document.
            Property::Custom(_) => true,
        }
    }

    /// Whether `candidate` names this property: exact match first, then
    /// case-insensitive, then the alias table (case-insensitive).
    pub fn answers_to(&self, candidate: &str) -> bool {
        let own = self.name();
        if own == candidate || own.eq_ignore_ascii_case(candidate) {
            return true;
        }
        if let Property::Entity(p) = self {
            return p
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(candidate));
        }
        false
    }
}
