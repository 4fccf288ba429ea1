//! TOML model definitions.
//!
//! Lets the CLI (and embedders) define an entity model declaratively:
//!
//! ```toml
//! [[entity]]
//! name = "Rooms"
//! table = "rooms"
//!
//! [[entity.property]]
//! name = "id"
//! type = "int"
//! nullable = false
//!
//! [[entity.property]]
//! name = "climate"
//! type = "json"
//! custom = true
//!
//! [[entity.property]]
//! name = "occupied"
//! type = "interval"
//! start_column = "occupied_start"
//! end_column = "occupied_end"
//!
//! [[entity.navigation]]
//! name = "Building"
//! target = "Buildings"
//! many = false
//! required = true
//! ```

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::expr::types::ExprType;
use crate::model::{
    Cardinality, ColumnMapping, EntityProperty, Model, NavigationProperty, VariantColumn,
};

/// Root of a model definition file.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelDef {
    #[serde(default)]
    pub entity: Vec<EntityTypeDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntityTypeDef {
    pub name: String,
    pub table: String,
    #[serde(default)]
    pub property: Vec<PropertyDef>,
    #[serde(default)]
    pub navigation: Vec<NavigationDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default = "default_true")]
    pub nullable: bool,
    /// Whether sub-property steps into this property are legal.
    #[serde(default)]
    pub custom: bool,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Column name; defaults to the property name.
    pub column: Option<String>,
    /// Start/end columns for interval-typed properties.
    pub start_column: Option<String>,
    pub end_column: Option<String>,
    /// Typed variant columns for multi-column properties.
    #[serde(default)]
    pub variants: Vec<VariantDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariantDef {
    #[serde(rename = "type")]
    pub data_type: String,
    pub column: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavigationDef {
    pub name: String,
    pub target: String,
    #[serde(default)]
    pub many: bool,
    #[serde(default)]
    pub required: bool,
}

fn default_true() -> bool {
    true
}

fn parse_type(name: &str) -> Result<ExprType> {
    let ty = match name.to_ascii_lowercase().as_str() {
        "bool" | "boolean" => ExprType::Bool,
        "int" | "integer" => ExprType::Int,
        "double" | "float" | "number" => ExprType::Double,
        "string" | "text" => ExprType::String,
        "date" => ExprType::Date,
        "time" => ExprType::Time,
        "datetime" | "timestamp" => ExprType::DateTime,
        "duration" => ExprType::Duration,
        "interval" => ExprType::Interval,
        "geometry" | "geography" => ExprType::Geometry,
        "json" => ExprType::Json,
        other => {
            return Err(Error::InvalidModel {
                message: format!("unknown property type '{}'", other),
            })
        }
    };
    Ok(ty)
}

impl ModelDef {
    /// Parse a model definition from TOML text.
    pub fn from_toml(text: &str) -> Result<ModelDef> {
        toml::from_str(text).map_err(|e| Error::InvalidModel {
            message: e.to_string(),
        })
    }

    /// Build and finalize a [`Model`] from this definition.
    pub fn build(&self) -> Result<Model> {
        let mut builder = Model::builder();
        for entity in &self.entity {
            builder.entity_type(&entity.name, &entity.table);
            for prop in &entity.property {
                let data_type = parse_type(&prop.data_type)?;
                let mapping = if !prop.variants.is_empty() {
                    let mut variants = Vec::new();
                    for v in &prop.variants {
                        variants.push(VariantColumn {
                            data_type: parse_type(&v.data_type)?,
                            column: v.column.clone(),
                        });
                    }
                    ColumnMapping::Variants(variants)
                } else if data_type == ExprType::Interval {
                    let (start, end) = match (&prop.start_column, &prop.end_column) {
                        (Some(s), Some(e)) => (s.clone(), e.clone()),
                        _ => {
                            return Err(Error::InvalidModel {
                                message: format!(
                                    "interval property '{}.{}' needs start_column and end_column",
                                    entity.name, prop.name
                                ),
                            })
                        }
                    };
                    ColumnMapping::Interval { start, end }
                } else {
                    ColumnMapping::Single {
                        column: prop.column.clone().unwrap_or_else(|| prop.name.clone()),
                    }
                };
                builder.property(
                    &entity.name,
                    EntityProperty {
                        name: prop.name.clone(),
                        owner: entity.name.clone(),
                        data_type,
                        nullable: prop.nullable,
                        has_custom: prop.custom,
                        aliases: prop.aliases.clone(),
                    },
                    mapping,
                );
            }
            for nav in &entity.navigation {
                builder.navigation(
                    &entity.name,
                    NavigationProperty {
                        name: nav.name.clone(),
                        owner: entity.name.clone(),
                        target: nav.target.clone(),
                        cardinality: if nav.many {
                            Cardinality::Many
                        } else {
                            Cardinality::One
                        },
                        required: nav.required,
                    },
                );
            }
        }
        builder.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOMS: &str = r#"
        [[entity]]
        name = "Rooms"
        table = "rooms"

        [[entity.property]]
        name = "id"
        type = "int"
        nullable = false

        [[entity.property]]
        name = "climate"
        type = "json"
        custom = true

        [[entity.property]]
        name = "occupied"
        type = "interval"
        start_column = "occupied_start"
        end_column = "occupied_end"

        [[entity.navigation]]
        name = "Building"
        target = "Buildings"
        required = true

        [[entity]]
        name = "Buildings"
        table = "buildings"

        [[entity.property]]
        name = "id"
        type = "int"
        nullable = false
    "#;

    #[test]
    fn test_build_from_toml() {
        let model = ModelDef::from_toml(ROOMS).unwrap().build().unwrap();
        let rooms = model.entity_type("Rooms").unwrap();
        assert!(matches!(
            rooms.column_mapping("occupied"),
            Some(ColumnMapping::Interval { .. })
        ));
        assert!(rooms.property("climate").unwrap().allows_custom());
        let nav = rooms.navigations().next().unwrap();
        assert_eq!(nav.target, "Buildings");
        assert_eq!(nav.cardinality, Cardinality::One);
    }

    #[test]
    fn test_interval_without_columns_rejected() {
        let def = ModelDef::from_toml(
            r#"
            [[entity]]
            name = "Rooms"
            table = "rooms"

            [[entity.property]]
            name = "occupied"
            type = "interval"
            "#,
        )
        .unwrap();
        assert!(def.build().is_err());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let def = ModelDef::from_toml(
            r#"
            [[entity]]
            name = "Rooms"
            table = "rooms"

            [[entity.property]]
            name = "x"
            type = "blob"
            "#,
        )
        .unwrap();
        assert!(def.build().is_err());
    }
}
