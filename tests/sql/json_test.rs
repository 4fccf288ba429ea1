//! Integration tests for JSON-embedded value access and coercion.

use staq::compiler;
use staq::config::QuerySettings;
use staq::error::Error;
use staq::model::sta;
use staq::sql::{Dialect, FieldCompiler};

fn filter_sql(root: &str, filter: &str, dialect: Dialect) -> Result<String, Error> {
    let model = sta::core_model();
    let settings = QuerySettings::default();
    let query = compiler::compile(&model, &settings, root, &format!("$filter={}", filter))?;
    let fields = FieldCompiler::new(&model, dialect);
    fields
        .compile_condition(&query.filter.expect("filter"))
        .map(|e| e.to_sql(dialect))
}

fn pg(root: &str, filter: &str) -> Result<String, Error> {
    filter_sql(root, filter, Dialect::Postgres)
}

#[test]
fn test_integer_comparison_guards_against_json_strings() {
    // Comparing to the number 3 must not match the JSON string "3": the
    // jsonb comparison carries a typeof guard.
    let sql = pg("Observations", "parameters/depth eq 3").unwrap();
    assert_eq!(
        sql,
        "(((CAST(\"observations\".\"parameters\" AS JSONB) #> '{depth}') = TO_JSONB(3)) \
         AND (JSONB_TYPEOF((CAST(\"observations\".\"parameters\" AS JSONB) #> '{depth}')) = 'number'))"
    );
}

#[test]
fn test_string_comparison_matches_text_face() {
    // Comparing to the string '3' uses the text extraction, which matches a
    // JSON string "3".
    let sql = pg("Observations", "parameters/depth eq '3'").unwrap();
    assert_eq!(
        sql,
        "((CAST(\"observations\".\"parameters\" AS JSONB) #>> '{depth}') = '3')"
    );
}

#[test]
fn test_boolean_comparison_guards_with_boolean_typeof() {
    let sql = pg("Observations", "parameters/valid eq true").unwrap();
    assert!(sql.contains("TO_JSONB(true)"), "{}", sql);
    assert!(sql.contains("= 'boolean'"), "{}", sql);
}

#[test]
fn test_ordering_comparison_keeps_guard() {
    let sql = pg("Observations", "parameters/depth gt 3").unwrap();
    assert!(sql.contains("> TO_JSONB(3)") || sql.contains("#> '{depth}') > TO_JSONB(3)"), "{}", sql);
    assert!(sql.contains("JSONB_TYPEOF"), "{}", sql);
}

#[test]
fn test_array_index_steps() {
    let sql = pg("Observations", "parameters/values[0] eq 3").unwrap();
    assert!(sql.contains("'{values,0}'"), "{}", sql);
}

#[test]
fn test_contains_maps_to_jsonb_containment() {
    let sql = pg("Observations", "contains(parameters/tags, 'indoor')").unwrap();
    assert!(sql.contains("@> TO_JSONB('indoor')"), "{}", sql);
}

#[test]
fn test_result_document_column_steps() {
    // Custom steps below the variant-mapped result property address its
    // JSON column.
    let sql = pg("Observations", "result/reading eq 5").unwrap();
    assert!(sql.contains("\"result_json\""), "{}", sql);
    assert!(sql.contains("'{reading}'"), "{}", sql);
}

#[test]
fn test_json_vs_json_is_unsupported() {
    let err = pg("Observations", "parameters/a eq parameters/b").unwrap_err();
    assert!(
        matches!(err, Error::UnsupportedOperation { .. }),
        "{:?}",
        err
    );
}

#[test]
fn test_json_operations_need_jsonb_support() {
    let err = filter_sql("Observations", "parameters/depth eq 3", Dialect::MySql).unwrap_err();
    assert!(
        matches!(err, Error::UnsupportedOperation { .. }),
        "{:?}",
        err
    );
}

#[test]
fn test_whole_document_comparison_uses_text() {
    let sql = pg("Things", "properties eq '{}'").unwrap();
    assert_eq!(
        sql,
        "(CAST(\"things\".\"properties\" AS TEXT) = '{}')"
    );
}
