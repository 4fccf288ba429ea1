//! # staq
//!
//! A SensorThings query compiler that turns OData-style query options into
//! dialect-safe SQL field expressions and conditions.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Query string ($filter, $expand, $top, ...)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [grammar]
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Generic parse tree                       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compiler + entity model]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Query / typed Expression (paths resolved)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql field compiler]
//! ┌─────────────────────────────────────────────────────────┐
//! │       FieldWrapper → SQL fields and conditions           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The [`visibility`] module sits beside the SQL layer and computes, from
//! `$select`/`$expand`, which properties and expansions the serializer
//! should emit.
//!
//! ## Example
//!
//! ```
//! use staq::compiler;
//! use staq::config::QuerySettings;
//! use staq::model::sta;
//! use staq::sql::{Dialect, FieldCompiler};
//!
//! let model = sta::core_model();
//! let settings = QuerySettings::default();
//! let query = compiler::compile(
//!     &model,
//!     &settings,
//!     "Observations",
//!     "$filter=result gt 10&$top=20",
//! )
//! .unwrap();
//!
//! let fields = FieldCompiler::new(&model, Dialect::Postgres);
//! let condition = fields.compile_condition(query.filter.as_ref().unwrap()).unwrap();
//! assert_eq!(
//!     condition.to_sql(Dialect::Postgres),
//!     "(\"observations\".\"result_number\" > 10)"
//! );
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod expr;
pub mod grammar;
pub mod model;
pub mod sql;
pub mod visibility;

pub use error::{Error, Result};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compiler::{compile, Expand, OrderBy, Query, QueryCompiler, SortDir};
    pub use crate::config::QuerySettings;
    pub use crate::error::{Error, Result};
    pub use crate::expr::{Constant, Expression, ExprType, Op, Path};
    pub use crate::model::{Model, ModelBuilder, Property};
    pub use crate::sql::{Dialect, FieldCompiler, FieldWrapper};
    pub use crate::visibility::{resolve as resolve_visibility, Visibility};
}
