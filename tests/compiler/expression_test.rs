//! Integration tests for expression compilation and literal handling.

use staq::compiler;
use staq::config::QuerySettings;
use staq::error::Error;
use staq::expr::{Constant, DurationValue, Expression, ExprType, Op};
use staq::model::sta;

fn compile_filter(root: &str, filter: &str) -> Result<Expression, Error> {
    let model = sta::core_model();
    let settings = QuerySettings::default();
    compiler::compile(&model, &settings, root, &format!("$filter={}", filter))
        .map(|q| q.filter.expect("filter compiled"))
}

#[test]
fn test_filter_tree_shape() {
    // (result sub 5) gt 10 => GreaterThan(Subtract(Path(result), 5), 10)
    let expr = compile_filter("Observations", "(result sub 5) gt 10").unwrap();
    let Expression::Function(gt) = expr else {
        panic!("expected a function root");
    };
    assert_eq!(gt.op, Op::GreaterThan);
    assert_eq!(gt.return_type, ExprType::Bool);
    let Expression::Function(sub) = &gt.args[0] else {
        panic!("expected subtraction on the left");
    };
    assert_eq!(sub.op, Op::Subtract);
    let Expression::Path(path) = &sub.args[0] else {
        panic!("expected a path");
    };
    assert_eq!(path.final_property().name(), "result");
    assert_eq!(sub.args[1], Expression::Constant(Constant::Int(5)));
    assert_eq!(gt.args[1], Expression::Constant(Constant::Int(10)));
}

#[test]
fn test_custom_step_under_non_json_property_always_fails() {
    // resultQuality is a plain string; name is a plain string on Things.
    for (root, filter) in [
        ("Observations", "resultQuality/depth eq 1"),
        ("Things", "name/foo eq 'x'"),
        ("Things", "name/foo/bar eq 'x'"),
    ] {
        let err = compile_filter(root, filter).unwrap_err();
        assert!(
            matches!(err, Error::InvalidPath { .. }),
            "{} {}: {:?}",
            root,
            filter,
            err
        );
    }
}

#[test]
fn test_deep_custom_steps_allowed_under_json() {
    let expr = compile_filter("Observations", "parameters/calibration/offset eq 0.5").unwrap();
    let Expression::Function(eq) = expr else {
        panic!("expected function");
    };
    let Expression::Path(path) = &eq.args[0] else {
        panic!("expected path");
    };
    assert_eq!(path.segments.len(), 3);
    assert_eq!(path.expr_type(), ExprType::Json);
}

#[test]
fn test_literal_round_trip_every_kind() {
    let literals = [
        "null",
        "true",
        "false",
        "42",
        "-7",
        "2.5",
        "'text with ''quotes'''",
        "2024-02-29",
        "13:45:30",
        "2024-01-01T00:00:00Z",
        "2024-01-01T00:00:00Z/2024-02-01T00:00:00Z",
        "duration'P1DT2H30M'",
        "geography'POINT (30 10)'",
    ];
    for text in literals {
        let constant = Constant::parse_literal(text).unwrap_or_else(|e| {
            panic!("parse {:?}: {}", text, e);
        });
        let round = Constant::parse_literal(&constant.to_literal()).unwrap();
        assert_eq!(round, constant, "round trip of {:?}", text);
    }
}

#[test]
fn test_duration_round_trip_against_instants() {
    use chrono::DateTime;
    let instant = DateTime::parse_from_rfc3339("2024-03-15T06:30:00Z").unwrap();
    for iso in ["PT1S", "PT2H30M", "PT26H", "PT0.5S", "-PT45M"] {
        let d = DurationValue::parse_iso(iso).unwrap();
        assert_eq!(
            DurationValue::between(d.add_to(instant), instant),
            d,
            "(instant + {}) - instant",
            iso
        );
    }
}

#[test]
fn test_bad_geography_literal() {
    let err = compile_filter(
        "Locations",
        "st_within(location, geography'TRIANGLE (0 0, 1 1)')",
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidLiteral { .. }), "{:?}", err);
}

#[test]
fn test_bad_duration_literal() {
    let err = compile_filter("Observations", "resultTime add duration'one day' gt now()")
        .unwrap_err();
    assert!(matches!(err, Error::InvalidLiteral { .. }), "{:?}", err);
}

#[test]
fn test_identified_path_allowed_in_filter_only() {
    let model = sta::core_model();
    let settings = QuerySettings::default();

    assert!(compile_filter("Observations", "Datastream(7)/name eq 'x'").is_ok());

    let err = compiler::compile(&model, &settings, "Things", "$select=Datastreams(5)")
        .unwrap_err();
    assert!(matches!(err, Error::IdentifiedPathNotAllowed { .. }));

    let err = compiler::compile(&model, &settings, "Observations", "$orderby=Datastream(5)/id")
        .unwrap_err();
    assert!(matches!(err, Error::IdentifiedPathNotAllowed { .. }));
}

#[test]
fn test_overload_resolution_narrows_by_context() {
    // substring returns a string, so its comparison operand must reach the
    // string binding even though `result` is numeric-first.
    let expr = compile_filter("Observations", "substring('abcdef', 1, 3) eq 'bcd'").unwrap();
    let Expression::Function(eq) = expr else {
        panic!("expected function");
    };
    assert_eq!(eq.args[0].expr_type(), ExprType::String);
}

#[test]
fn test_no_binding_is_type_mismatch() {
    for filter in [
        "result add 'text' gt 1",
        "tolower(resultTime) eq 'x'",
        "length(5) eq 1",
    ] {
        let err = compile_filter("Observations", filter).unwrap_err();
        assert!(
            matches!(err, Error::TypeMismatch { .. }),
            "{}: {:?}",
            filter,
            err
        );
    }
}

#[test]
fn test_unknown_names() {
    assert!(matches!(
        compile_filter("Observations", "mystery eq 1"),
        Err(Error::UnknownProperty { .. })
    ));
    assert!(matches!(
        compile_filter("Observations", "mystery(result) eq 1"),
        Err(Error::UnknownFunction { .. })
    ));
}
