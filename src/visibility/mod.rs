//! Visibility resolution: which properties and expansions to serialize.
//!
//! Given an entity type and the query that fetched it, computes the set of
//! property names to emit, the navigation links to advertise, and a nested
//! visibility per expanded navigation. Overlapping `$expand` declarations
//! merge by recursive union - the more permissive selection wins.

use std::collections::{BTreeMap, BTreeSet};

use crate::compiler::Query;
use crate::error::Result;
use crate::model::{EntityType, Model, Property};

/// The computed visibility of one entity in one response position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Visibility {
    /// Plain property names to serialize.
    pub properties: BTreeSet<String>,
    /// Navigation links to emit.
    pub navigation_links: BTreeSet<String>,
    /// Nested visibility per expanded navigation property.
    pub expands: BTreeMap<String, Visibility>,
}

impl Visibility {
    /// Union-merge another visibility into this one, recursively.
    pub fn merge(&mut self, other: &Visibility) {
        self.properties
            .extend(other.properties.iter().cloned());
        self.navigation_links
            .extend(other.navigation_links.iter().cloned());
        for (name, nested) in &other.expands {
            self.expands
                .entry(name.clone())
                .or_default()
                .merge(nested);
        }
    }

    /// Whether `other`'s visible surface is contained in this one.
    pub fn contains(&self, other: &Visibility) -> bool {
        other.properties.is_subset(&self.properties)
            && other.navigation_links.is_subset(&self.navigation_links)
            && other.expands.iter().all(|(name, nested)| {
                self.expands
                    .get(name)
                    .map(|own| own.contains(nested))
                    .unwrap_or(false)
            })
    }
}

/// Resolve the visibility of `entity_type` under `query`.
///
/// `top_level` distinguishes the response root from expanded entities:
/// without an explicit `$select`, root entities expose all properties and
/// navigation links, while expanded entities expose only plain properties.
pub fn resolve(
    model: &Model,
    entity_type: &EntityType,
    query: Option<&Query>,
    top_level: bool,
) -> Result<Visibility> {
    let mut visibility = Visibility::default();

    let select = query.map(|q| q.select.as_slice()).unwrap_or(&[]);
    if select.is_empty() {
        for property in entity_type.properties() {
            match property {
                Property::Navigation(nav) => {
                    if top_level {
                        visibility.navigation_links.insert(nav.name.clone());
                    }
                }
                _ => {
                    visibility.properties.insert(property.name());
                }
            }
        }
    } else {
        for property in select {
            match property {
                // Selecting a navigation property implies its link even
                // absent an expansion.
                Property::Navigation(nav) => {
                    visibility.navigation_links.insert(nav.name.clone());
                }
                _ => {
                    visibility.properties.insert(property.name());
                }
            }
        }
    }

    if let Some(query) = query {
        for expand in &query.expand {
            apply_expand(model, &mut visibility, &expand.path, expand.query.as_ref())?;
        }
    }

    Ok(visibility)
}

/// Descend one expand path, merging nested visibilities; only the final
/// segment carries the expand's own sub-query.
fn apply_expand(
    model: &Model,
    visibility: &mut Visibility,
    path: &[crate::model::NavigationProperty],
    query: Option<&Query>,
) -> Result<()> {
    let Some((nav, rest)) = path.split_first() else {
        return Ok(());
    };
    let target = model.entity_type(&nav.target)?;
    let nested_query = if rest.is_empty() { query } else { None };
    let nested = resolve(model, target, nested_query, false)?;
    visibility.navigation_links.insert(nav.name.clone());
    let entry = visibility.expands.entry(nav.name.clone()).or_default();
    entry.merge(&nested);
    apply_expand(model, entry, rest, query)
}
