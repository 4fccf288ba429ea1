//! The entity model: entity types, their properties, and the table/column
//! metadata behind them.
//!
//! A model is built once at startup (`ModelBuilder` → [`ModelBuilder::finalize`])
//! and never mutated afterwards; compilation only ever reads it, so sharing
//! a finalized model across request threads needs no locking.

pub mod loader;
pub mod property;
pub mod sta;
pub mod table;

pub use property::{
    Cardinality, CustomProperty, CustomStep, EntityProperty, NavigationProperty, Property,
};
pub use table::{ColumnMapping, VariantColumn};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::expr::types::ExprType;

// =============================================================================
// EntityType
// =============================================================================

/// One entity type: its properties and the table that persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityType {
    pub name: String,
    pub table: String,
    properties: Vec<Property>,
    /// Column mapping per entity-property name.
    columns: BTreeMap<String, ColumnMapping>,
}

impl EntityType {
    /// All properties, in declaration order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Look up a property by name: exact match wins over case-insensitive
    /// match, which wins over alias match.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name() == name)
            .or_else(|| self.properties.iter().find(|p| p.answers_to(name)))
    }

    /// The column mapping for an entity property.
    pub fn column_mapping(&self, property_name: &str) -> Option<&ColumnMapping> {
        self.columns.get(property_name)
    }

    /// Navigation properties only.
    pub fn navigations(&self) -> impl Iterator<Item = &NavigationProperty> {
        self.properties.iter().filter_map(|p| match p {
            Property::Navigation(nav) => Some(nav),
            _ => None,
        })
    }
}

// =============================================================================
// Model
// =============================================================================

/// An immutable registry of entity types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    types: BTreeMap<String, EntityType>,
}

impl Model {
    /// Start building a model.
    pub fn builder() -> ModelBuilder {
        ModelBuilder::default()
    }

    /// Look up an entity type by name (case-insensitive fallback).
    pub fn entity_type(&self, name: &str) -> Result<&EntityType> {
        if let Some(t) = self.types.get(name) {
            return Ok(t);
        }
        self.types
            .values()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownEntityType { name: name.into() })
    }

    /// All entity types, ordered by name.
    pub fn entity_types(&self) -> impl Iterator<Item = &EntityType> {
        self.types.values()
    }
}

// =============================================================================
// ModelBuilder
// =============================================================================

/// Mutable accumulation phase of a [`Model`].
#[derive(Debug, Default)]
pub struct ModelBuilder {
    types: BTreeMap<String, EntityType>,
}

impl ModelBuilder {
    /// Register an entity type backed by `table`.
    pub fn entity_type(&mut self, name: impl Into<String>, table: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.types.insert(
            name.clone(),
            EntityType {
                name,
                table: table.into(),
                properties: Vec::new(),
                columns: BTreeMap::new(),
            },
        );
        self
    }

    /// Add an entity property with its column mapping to a registered type.
    pub fn property(
        &mut self,
        type_name: &str,
        property: EntityProperty,
        mapping: ColumnMapping,
    ) -> &mut Self {
        if let Some(t) = self.types.get_mut(type_name) {
            t.columns.insert(property.name.clone(), mapping);
            t.properties.push(Property::Entity(property));
        }
        self
    }

    /// Add a navigation edge to a registered type.
    pub fn navigation(&mut self, type_name: &str, nav: NavigationProperty) -> &mut Self {
        if let Some(t) = self.types.get_mut(type_name) {
            t.properties.push(Property::Navigation(nav));
        }
        self
    }

    /// Validate and freeze the model.
    ///
    /// Checks: navigation targets exist, property owners match their type,
    /// every entity property has a column mapping of a shape fitting its
    /// logical type, and no duplicate property names. The identifier
    /// property (`id`) gains the `@iot.id` alias if it does not carry it.
    pub fn finalize(mut self) -> Result<Model> {
        let type_names: Vec<String> = self.types.keys().cloned().collect();
        for entity in self.types.values_mut() {
            let mut seen: Vec<String> = Vec::new();
            for property in &mut entity.properties {
                let name = property.name();
                if seen.iter().any(|s| s == &name) {
                    return Err(Error::InvalidModel {
                        message: format!("duplicate property '{}' on '{}'", name, entity.name),
                    });
                }
                seen.push(name);
                match property {
                    Property::Entity(p) => {
                        if p.owner != entity.name {
                            return Err(Error::InvalidModel {
                                message: format!(
                                    "property '{}' declares owner '{}' but lives on '{}'",
                                    p.name, p.owner, entity.name
                                ),
                            });
                        }
                        if p.name == "id" && !p.aliases.iter().any(|a| a == "@iot.id") {
                            p.aliases.push("@iot.id".into());
                        }
                        let mapping = entity.columns.get(&p.name).ok_or_else(|| {
                            Error::InvalidModel {
                                message: format!(
                                    "property '{}.{}' has no column mapping",
                                    entity.name, p.name
                                ),
                            }
                        })?;
                        if !mapping.fits(p.data_type) {
                            return Err(Error::InvalidModel {
                                message: format!(
                                    "column mapping of '{}.{}' does not fit type {}",
                                    entity.name, p.name, p.data_type
                                ),
                            });
                        }
                    }
                    Property::Navigation(nav) => {
                        if !type_names.contains(&nav.target) {
                            return Err(Error::InvalidModel {
                                message: format!(
                                    "navigation '{}.{}' targets unknown type '{}'",
                                    entity.name, nav.name, nav.target
                                ),
                            });
                        }
                    }
                    Property::Custom(_) => {
                        return Err(Error::InvalidModel {
                            message: format!(
                                "custom steps cannot be declared on '{}'",
                                entity.name
                            ),
                        });
                    }
                }
            }
        }
        Ok(Model { types: self.types })
    }
}

/// Convenience constructor for an entity property.
pub fn entity_property(
    owner: &str,
    name: &str,
    data_type: ExprType,
    nullable: bool,
) -> EntityProperty {
    EntityProperty {
        name: name.into(),
        owner: owner.into(),
        data_type,
        nullable,
        has_custom: false,
        aliases: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_model() -> Model {
        let mut builder = Model::builder();
        builder.entity_type("Things", "things");
        builder.property(
            "Things",
            entity_property("Things", "id", ExprType::Int, false),
            ColumnMapping::single("id"),
        );
        builder.property(
            "Things",
            entity_property("Things", "name", ExprType::String, false),
            ColumnMapping::single("name"),
        );
        builder.entity_type("Datastreams", "datastreams");
        builder.property(
            "Datastreams",
            entity_property("Datastreams", "id", ExprType::Int, false),
            ColumnMapping::single("id"),
        );
        builder.navigation(
            "Things",
            NavigationProperty {
                name: "Datastreams".into(),
                owner: "Things".into(),
                target: "Datastreams".into(),
                cardinality: Cardinality::Many,
                required: false,
            },
        );
        builder.finalize().expect("model should validate")
    }

    #[test]
    fn test_lookup_entity_type() {
        let model = small_model();
        assert!(model.entity_type("Things").is_ok());
        assert!(model.entity_type("things").is_ok());
        assert!(matches!(
            model.entity_type("Nope"),
            Err(Error::UnknownEntityType { .. })
        ));
    }

    #[test]
    fn test_id_gets_iot_alias() {
        let model = small_model();
        let things = model.entity_type("Things").unwrap();
        assert!(things.property("@iot.id").is_some());
        assert!(things.property("ID").is_some());
    }

    #[test]
    fn test_unknown_navigation_target_rejected() {
        let mut builder = Model::builder();
        builder.entity_type("Things", "things");
        builder.navigation(
            "Things",
            NavigationProperty {
                name: "Ghosts".into(),
                owner: "Things".into(),
                target: "Ghosts".into(),
                cardinality: Cardinality::Many,
                required: false,
            },
        );
        assert!(matches!(
            builder.finalize(),
            Err(Error::InvalidModel { .. })
        ));
    }

    #[test]
    fn test_missing_column_mapping_rejected() {
        let mut builder = Model::builder();
        builder.entity_type("Things", "things");
        if let Some(t) = builder.types.get_mut("Things") {
            t.properties.push(Property::Entity(entity_property(
                "Things",
                "name",
                ExprType::String,
                false,
            )));
        }
        assert!(builder.finalize().is_err());
    }

    #[test]
    fn test_interval_mapping_shape_enforced() {
        let mut builder = Model::builder();
        builder.entity_type("Observations", "observations");
        builder.property(
            "Observations",
            entity_property("Observations", "phenomenonTime", ExprType::Interval, true),
            ColumnMapping::single("phenomenon_time"),
        );
        assert!(builder.finalize().is_err());
    }
}
