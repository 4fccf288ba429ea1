//! Integration tests for the temporal interval algebra.

use chrono::{DateTime, FixedOffset};
use staq::compiler;
use staq::config::QuerySettings;
use staq::error::Error;
use staq::expr::Op;
use staq::model::sta;
use staq::sql::wrapper::time::eval::relation_holds;
use staq::sql::{Dialect, FieldCompiler};

fn filter_sql(root: &str, filter: &str) -> Result<String, Error> {
    let model = sta::core_model();
    let settings = QuerySettings::default();
    let query = compiler::compile(&model, &settings, root, &format!("$filter={}", filter))?;
    let fields = FieldCompiler::new(&model, Dialect::Postgres);
    fields
        .compile_condition(&query.filter.expect("filter"))
        .map(|e| e.to_sql(Dialect::Postgres))
}

fn dt(text: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(text).unwrap()
}

fn span(s: &str, e: &str) -> (DateTime<FixedOffset>, DateTime<FixedOffset>) {
    (dt(s), dt(e))
}

fn point(t: &str) -> (DateTime<FixedOffset>, DateTime<FixedOffset>) {
    (dt(t), dt(t))
}

// =============================================================================
// Generated SQL
// =============================================================================

#[test]
fn test_interval_interval_equals() {
    let sql = filter_sql(
        "Observations",
        "phenomenonTime eq 2024-01-01T00:00:00Z/2024-01-02T00:00:00Z",
    )
    .unwrap();
    assert_eq!(
        sql,
        "((\"observations\".\"phenomenon_time_start\" = TIMESTAMPTZ '2024-01-01T00:00:00Z') \
         AND (\"observations\".\"phenomenon_time_end\" = TIMESTAMPTZ '2024-01-02T00:00:00Z'))"
    );
}

#[test]
fn test_interval_before_instant() {
    let sql = filter_sql(
        "Observations",
        "before(phenomenonTime, 2024-06-01T00:00:00Z)",
    )
    .unwrap();
    assert_eq!(
        sql,
        "((\"observations\".\"phenomenon_time_end\" <= TIMESTAMPTZ '2024-06-01T00:00:00Z') \
         AND (\"observations\".\"phenomenon_time_start\" < TIMESTAMPTZ '2024-06-01T00:00:00Z'))"
    );
}

#[test]
fn test_instant_after_instant() {
    let sql = filter_sql("Observations", "after(resultTime, 2024-06-01T00:00:00Z)").unwrap();
    // An instant is the degenerate interval s = e.
    assert_eq!(
        sql,
        "((\"observations\".\"result_time\" >= TIMESTAMPTZ '2024-06-01T00:00:00Z') \
         AND (\"observations\".\"result_time\" > TIMESTAMPTZ '2024-06-01T00:00:00Z'))"
    );
}

#[test]
fn test_meets_emits_both_boundary_equalities() {
    let sql = filter_sql(
        "Observations",
        "meets(phenomenonTime, 2024-06-01T00:00:00Z)",
    )
    .unwrap();
    assert_eq!(
        sql,
        "((\"observations\".\"phenomenon_time_start\" = TIMESTAMPTZ '2024-06-01T00:00:00Z') \
         OR (\"observations\".\"phenomenon_time_end\" = TIMESTAMPTZ '2024-06-01T00:00:00Z'))"
    );
}

#[test]
fn test_during_interval_interval() {
    let sql = filter_sql(
        "Observations",
        "during(phenomenonTime, 2024-01-01T00:00:00Z/2024-02-01T00:00:00Z)",
    )
    .unwrap();
    assert!(sql.contains("<= \"observations\".\"phenomenon_time_start\""), "{}", sql);
    assert!(sql.contains("> \"observations\".\"phenomenon_time_start\""), "{}", sql);
    assert!(sql.contains(">= \"observations\".\"phenomenon_time_end\""), "{}", sql);
}

#[test]
fn test_starts_and_finishes() {
    let sql = filter_sql(
        "Observations",
        "starts(phenomenonTime, 2024-01-01T00:00:00Z/2024-02-01T00:00:00Z)",
    )
    .unwrap();
    assert_eq!(
        sql,
        "(\"observations\".\"phenomenon_time_start\" = TIMESTAMPTZ '2024-01-01T00:00:00Z')"
    );
    let sql = filter_sql(
        "Observations",
        "finishes(phenomenonTime, 2024-01-01T00:00:00Z/2024-02-01T00:00:00Z)",
    )
    .unwrap();
    assert_eq!(
        sql,
        "(\"observations\".\"phenomenon_time_end\" = TIMESTAMPTZ '2024-02-01T00:00:00Z')"
    );
}

#[test]
fn test_instant_comparisons_stay_plain() {
    let sql = filter_sql("Observations", "resultTime ge 2024-06-01T00:00:00Z").unwrap();
    assert_eq!(
        sql,
        "(\"observations\".\"result_time\" >= TIMESTAMPTZ '2024-06-01T00:00:00Z')"
    );
}

#[test]
fn test_interval_le_uses_end_only() {
    let sql = filter_sql("Observations", "phenomenonTime le 2024-06-01T00:00:00Z").unwrap();
    assert_eq!(
        sql,
        "(\"observations\".\"phenomenon_time_end\" <= TIMESTAMPTZ '2024-06-01T00:00:00Z')"
    );
}

// =============================================================================
// Arithmetic
// =============================================================================

#[test]
fn test_interval_shift_keeps_interval_shape() {
    let sql = filter_sql(
        "Observations",
        "finishes(phenomenonTime add duration'PT6H', 2024-01-01T06:00:00Z)",
    )
    .unwrap();
    assert!(
        sql.contains("(\"observations\".\"phenomenon_time_end\" + INTERVAL 'PT6H')"),
        "{}",
        sql
    );
}

#[test]
fn test_interval_difference_measured_from_start() {
    let sql = filter_sql(
        "Observations",
        "(phenomenonTime sub resultTime) le duration'P1D'",
    )
    .unwrap();
    assert!(
        sql.contains(
            "(\"observations\".\"phenomenon_time_start\" - \"observations\".\"result_time\")"
        ),
        "{}",
        sql
    );
}

#[test]
fn test_unsupported_temporal_products() {
    for filter in [
        "(phenomenonTime mul phenomenonTime) eq 1",
        "(phenomenonTime div duration'P1D') eq 1",
        "(duration'P1D' mul duration'P1D') eq duration'P2D'",
    ] {
        let err = filter_sql("Observations", filter).unwrap_err();
        assert!(
            matches!(
                err,
                Error::TypeMismatch { .. } | Error::UnsupportedOperation { .. }
            ),
            "{}: {:?}",
            filter,
            err
        );
    }
}

// =============================================================================
// Truth-table properties (native evaluation)
// =============================================================================

fn samples() -> Vec<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    vec![
        span("2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z"),
        span("2024-01-02T00:00:00Z", "2024-01-04T00:00:00Z"),
        span("2024-01-01T00:00:00Z", "2024-01-04T00:00:00Z"),
        span("2024-01-03T00:00:00Z", "2024-01-05T00:00:00Z"),
        point("2024-01-01T00:00:00Z"),
        point("2024-01-02T12:00:00Z"),
        point("2024-01-06T00:00:00Z"),
    ]
}

#[test]
fn test_before_after_duality_over_samples() {
    for a in samples() {
        for b in samples() {
            assert_eq!(
                relation_holds(Op::Before, a, b),
                relation_holds(Op::After, b, a),
                "a={:?} b={:?}",
                a,
                b
            );
        }
    }
}

#[test]
fn test_equals_and_meets_are_symmetric_over_samples() {
    for a in samples() {
        for b in samples() {
            assert_eq!(
                relation_holds(Op::Equal, a, b),
                relation_holds(Op::Equal, b, a)
            );
            assert_eq!(
                relation_holds(Op::Meets, a, b),
                relation_holds(Op::Meets, b, a)
            );
        }
    }
}

#[test]
fn test_overlaps_asymmetry_is_inherited_behavior() {
    // The overlaps row accepts an interval whose start touches the other's
    // end in one orientation only. Recorded here rather than silently
    // symmetrized.
    let a = span("2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z");
    let b = span("2023-12-30T00:00:00Z", "2024-01-01T00:00:00Z");
    assert!(relation_holds(Op::Overlaps, a, b));
    assert!(!relation_holds(Op::Overlaps, b, a));

    // Genuinely overlapping spans agree in both orientations.
    let c = span("2024-01-01T00:00:00Z", "2024-01-03T00:00:00Z");
    let d = span("2024-01-02T00:00:00Z", "2024-01-04T00:00:00Z");
    assert!(relation_holds(Op::Overlaps, c, d));
    assert!(relation_holds(Op::Overlaps, d, c));
}

#[test]
fn test_disjoint_intervals_relate_only_by_order() {
    let early = span("2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z");
    let late = span("2024-01-03T00:00:00Z", "2024-01-05T00:00:00Z");
    assert!(relation_holds(Op::Before, early, late));
    assert!(!relation_holds(Op::After, early, late));
    assert!(!relation_holds(Op::Overlaps, early, late));
    assert!(!relation_holds(Op::Meets, early, late));
    assert!(relation_holds(Op::After, late, early));
}
