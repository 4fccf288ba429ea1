//! The `Query` value object and the compiler that builds it.
//!
//! A `Query` is constructed once per request from the parse tree and is
//! immutable afterwards; pagination derives follow-up queries as new values
//! instead of mutating the original.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compiler::expression::ExpressionCompiler;
use crate::config::QuerySettings;
use crate::error::{Error, Result};
use crate::expr::types::ExprType;
use crate::expr::Expression;
use crate::grammar::{
    self, ExpandItemNode, OptionNode, OrderByNode, QueryNode, SortDir as AstSortDir,
};
use crate::model::{EntityType, Model, NavigationProperty, Property};

/// Sort direction of one `$orderby` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

/// One `$orderby` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub expr: Expression,
    pub direction: SortDir,
}

/// One `$expand` entry: a navigation path plus an optional sub-query applied
/// to the expanded set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expand {
    pub path: Vec<NavigationProperty>,
    pub query: Option<Query>,
}

/// A compiled query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Query {
    /// Page size, already clamped to the configured ceiling.
    pub top: Option<u64>,
    pub skip: Option<u64>,
    /// `None` when `$count` was absent, so "not requested" stays
    /// distinguishable from an explicit `false`.
    pub count: Option<bool>,
    /// Selected properties; insertion-ordered, duplicates dropped.
    pub select: Vec<Property>,
    pub expand: Vec<Expand>,
    pub filter: Option<Expression>,
    pub order_by: Vec<OrderBy>,
    pub format: Option<String>,
}

impl Query {
    /// Effective page size.
    pub fn top_or_default(&self, settings: &QuerySettings) -> u64 {
        self.top.unwrap_or(settings.default_top)
    }

    pub fn skip_or_default(&self) -> u64 {
        self.skip.unwrap_or(0)
    }

    pub fn count_or_default(&self) -> bool {
        self.count.unwrap_or(false)
    }

    /// The query for the next page: identical options with `skip` advanced
    /// by the effective page size. Used to build `@iot.nextLink`.
    pub fn next_page(&self, settings: &QuerySettings) -> Query {
        let mut next = self.clone();
        next.skip = Some(self.skip_or_default() + self.top_or_default(settings));
        next
    }

    fn add_select(&mut self, property: Property) {
        if !self.select.contains(&property) {
            self.select.push(property);
        }
    }
}

/// Compiles parse trees into [`Query`] values against one entity model.
pub struct QueryCompiler<'a> {
    model: &'a Model,
    settings: &'a QuerySettings,
}

impl<'a> QueryCompiler<'a> {
    pub fn new(model: &'a Model, settings: &'a QuerySettings) -> Self {
        Self { model, settings }
    }

    /// Parse and compile a query-option string against `root`.
    pub fn compile_str(&self, root: &EntityType, source: &str) -> Result<Query> {
        debug!(entity_type = %root.name, source, "compiling query");
        let tree = grammar::parse(source)?;
        self.compile(root, &tree)
    }

    /// Compile an options block. `$expand` sub-queries recurse through this
    /// same entry point with the navigation target as root.
    pub fn compile(&self, root: &EntityType, node: &QueryNode) -> Result<Query> {
        let mut query = Query::default();
        let exprs = ExpressionCompiler::new(self.model, root);
        for option in &node.options {
            match option {
                OptionNode::Top(value) => {
                    query.top = Some((*value).min(self.settings.max_top));
                }
                OptionNode::Skip(value) => query.skip = Some(*value),
                OptionNode::Count(value) => query.count = Some(*value),
                OptionNode::Format(value) => query.format = Some(value.clone()),
                OptionNode::Filter(expr) => {
                    query.filter = Some(exprs.compile(expr, Some(&[ExprType::Bool]))?);
                }
                OptionNode::Select(paths) => {
                    for path in paths {
                        let resolved = exprs.compile_select_path(path)?;
                        // The first segment is what this level serializes;
                        // deeper segments only shape nested visibility.
                        let first = resolved.segments[0].property.clone();
                        query.add_select(first);
                    }
                }
                OptionNode::OrderBy(entries) => {
                    for entry in entries {
                        query.order_by.push(self.compile_order_by(&exprs, entry)?);
                    }
                }
                OptionNode::Expand(items) => {
                    for item in items {
                        query.expand.push(self.compile_expand(root, item)?);
                    }
                }
                OptionNode::Unknown(name) => {
                    return Err(Error::UnknownOption { name: name.clone() });
                }
            }
        }
        Ok(query)
    }

    fn compile_order_by(
        &self,
        exprs: &ExpressionCompiler<'_>,
        entry: &OrderByNode,
    ) -> Result<OrderBy> {
        let path = exprs.compile_path(&entry.path, false)?;
        Ok(OrderBy {
            expr: Expression::Path(path),
            direction: match entry.direction {
                AstSortDir::Asc => SortDir::Asc,
                AstSortDir::Desc => SortDir::Desc,
            },
        })
    }

    /// Compile one expand item.
    ///
    /// A sub-query on the final segment attaches to the expand itself. A
    /// sub-query on an earlier segment splits the path there: the remainder
    /// becomes an `$expand` of the sub-query, mirroring how the surface
    /// syntax `A($top=5)/B` scopes the options to `A`.
    fn compile_expand(&self, root: &EntityType, item: &ExpandItemNode) -> Result<Expand> {
        // Resolve the navigation chain and compile each segment's sub-query
        // against that segment's target type.
        let mut current = root;
        let mut resolved: Vec<(NavigationProperty, Option<Query>)> = Vec::new();
        for seg in &item.segments {
            let property =
                current
                    .property(&seg.name)
                    .ok_or_else(|| Error::UnknownProperty {
                        entity_type: current.name.clone(),
                        name: seg.name.clone(),
                    })?;
            let nav = match property {
                Property::Navigation(nav) => nav.clone(),
                _ => {
                    return Err(Error::invalid_path(format!(
                        "'{}' is not a relation and cannot be expanded",
                        seg.name
                    )))
                }
            };
            let target = self.model.entity_type(&nav.target)?;
            let query = match seg.subqueries.as_slice() {
                [] => None,
                [sub] => Some(self.compile(target, sub)?),
                _ => {
                    return Err(Error::MultipleSubqueries {
                        segment: seg.name.clone(),
                    })
                }
            };
            resolved.push((nav, query));
            current = target;
        }

        // Assemble right-to-left: a plain segment extends the child's path,
        // a segment with options absorbs the child as a nested expand.
        let mut expand: Option<Expand> = None;
        for (nav, query) in resolved.into_iter().rev() {
            expand = Some(match (query, expand) {
                (None, None) => Expand {
                    path: vec![nav],
                    query: None,
                },
                (None, Some(child)) => {
                    let mut path = vec![nav];
                    path.extend(child.path);
                    Expand {
                        path,
                        query: child.query,
                    }
                }
                (Some(query), None) => Expand {
                    path: vec![nav],
                    query: Some(query),
                },
                (Some(mut query), Some(child)) => {
                    query.expand.push(child);
                    Expand {
                        path: vec![nav],
                        query: Some(query),
                    }
                }
            });
        }
        Ok(expand.expect("expand items have at least one segment"))
    }
}
