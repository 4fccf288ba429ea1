//! Query compilation: parse tree → typed `Query`/`Expression` values.
//!
//! Two-layer architecture:
//! 1. [`QueryCompiler`] walks the option list, clamps `$top`, recurses into
//!    `$expand` sub-queries, and dispatches `$filter`/`$orderby`/`$select`
//!    bodies to the expression layer.
//! 2. [`ExpressionCompiler`] resolves member chains against the entity
//!    model, classifies literals, and overload-resolves functions with
//!    admissible-result-type hints narrowing top-down.
//!
//! Both are pure, synchronous transforms over an immutable [`Model`]; all
//! state lives in the values they return.

pub mod expression;
pub mod query;

pub use expression::ExpressionCompiler;
pub use query::{Expand, OrderBy, Query, QueryCompiler, SortDir};

use crate::config::QuerySettings;
use crate::error::Result;
use crate::model::Model;

/// Parse and compile a query-option string in one call.
pub fn compile(
    model: &Model,
    settings: &QuerySettings,
    entity_type: &str,
    source: &str,
) -> Result<Query> {
    let root = model.entity_type(entity_type)?;
    QueryCompiler::new(model, settings).compile_str(root, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sta;

    #[test]
    fn test_compile_entry_point() {
        let model = sta::core_model();
        let settings = QuerySettings::default();
        let q = compile(&model, &settings, "Observations", "$top=3").unwrap();
        assert_eq!(q.top, Some(3));
    }

    #[test]
    fn test_compile_unknown_entity_type() {
        let model = sta::core_model();
        let settings = QuerySettings::default();
        assert!(compile(&model, &settings, "Widgets", "$top=3").is_err());
    }
}
