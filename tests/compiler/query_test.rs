//! Integration tests for query compilation.

use staq::compiler::{self, SortDir};
use staq::config::QuerySettings;
use staq::error::Error;
use staq::expr::{Constant, Expression, Op};
use staq::model::sta;

fn settings() -> QuerySettings {
    QuerySettings::default()
}

#[test]
fn test_top_is_clamped_not_rejected() {
    let model = sta::core_model();
    let settings = settings();

    let over = format!("$top={}", settings.max_top + 1);
    let query = compiler::compile(&model, &settings, "Observations", &over).unwrap();
    assert_eq!(query.top, Some(settings.max_top));

    let query = compiler::compile(&model, &settings, "Observations", "$top=5").unwrap();
    assert_eq!(query.top, Some(5));
}

#[test]
fn test_top_respects_custom_ceiling() {
    let model = sta::core_model();
    let settings = QuerySettings {
        default_top: 10,
        max_top: 50,
    };
    let query = compiler::compile(&model, &settings, "Observations", "$top=200").unwrap();
    assert_eq!(query.top, Some(50));
}

#[test]
fn test_expand_scenario() {
    // $expand=Observations($filter=result eq 1;$top=5),ObservedProperty&$top=10
    let model = sta::core_model();
    let query = compiler::compile(
        &model,
        &settings(),
        "Datastreams",
        "$expand=Observations($filter=result eq 1;$top=5),ObservedProperty&$top=10",
    )
    .unwrap();

    assert_eq!(query.top, Some(10));
    assert_eq!(query.expand.len(), 2);

    let observations = &query.expand[0];
    assert_eq!(observations.path.len(), 1);
    assert_eq!(observations.path[0].name, "Observations");
    let nested = observations.query.as_ref().expect("nested query");
    assert_eq!(nested.top, Some(5));
    match nested.filter.as_ref().expect("nested filter") {
        Expression::Function(f) => {
            assert_eq!(f.op, Op::Equal);
            assert_eq!(f.args[1], Expression::Constant(Constant::Int(1)));
            assert!(matches!(f.args[0], Expression::Path(_)));
        }
        other => panic!("expected function, got {:?}", other),
    }

    let observed_property = &query.expand[1];
    assert_eq!(observed_property.path[0].name, "ObservedProperty");
    assert!(observed_property.query.is_none());
}

#[test]
fn test_orderby_identifier_aliases_compile_identically() {
    let model = sta::core_model();
    let by_alias = compiler::compile(&model, &settings(), "Observations", "$orderby=@iot.id")
        .unwrap();
    let by_name = compiler::compile(&model, &settings(), "Observations", "$orderby=ID").unwrap();
    assert_eq!(by_alias.order_by, by_name.order_by);
    assert_eq!(by_alias.order_by[0].direction, SortDir::Asc);
}

#[test]
fn test_unknown_option_is_rejected() {
    let model = sta::core_model();
    let err = compiler::compile(&model, &settings(), "Observations", "$sort=id").unwrap_err();
    assert!(matches!(err, Error::UnknownOption { name } if name == "$sort"));
}

#[test]
fn test_multiple_subqueries_rejected() {
    let model = sta::core_model();
    let err = compiler::compile(
        &model,
        &settings(),
        "Datastreams",
        "$expand=Observations($top=1)($top=2)",
    )
    .unwrap_err();
    assert!(matches!(err, Error::MultipleSubqueries { segment } if segment == "Observations"));
}

#[test]
fn test_nested_expand_recurses_through_full_compiler() {
    // The nested block is a full query: its own expand, filter, top.
    let model = sta::core_model();
    let query = compiler::compile(
        &model,
        &settings(),
        "Things",
        "$expand=Datastreams($top=3;$expand=Sensor;$filter=name ne 'x')",
    )
    .unwrap();
    let nested = query.expand[0].query.as_ref().unwrap();
    assert_eq!(nested.top, Some(3));
    assert_eq!(nested.expand.len(), 1);
    assert_eq!(nested.expand[0].path[0].name, "Sensor");
    assert!(nested.filter.is_some());
}

#[test]
fn test_nested_expand_unknown_property_names_inner_type() {
    let model = sta::core_model();
    let err = compiler::compile(
        &model,
        &settings(),
        "Things",
        "$expand=Datastreams($filter=bogus eq 1)",
    )
    .unwrap_err();
    assert!(
        matches!(&err, Error::UnknownProperty { entity_type, name }
            if entity_type == "Datastreams" && name == "bogus"),
        "got {:?}",
        err
    );
}

#[test]
fn test_skip_and_count() {
    let model = sta::core_model();
    let query =
        compiler::compile(&model, &settings(), "Observations", "$skip=7&$count=true").unwrap();
    assert_eq!(query.skip, Some(7));
    assert_eq!(query.count, Some(true));
    assert!(query.count_or_default());
}

#[test]
fn test_next_page_advances_skip_only() {
    let model = sta::core_model();
    let settings = settings();
    let query = compiler::compile(
        &model,
        &settings,
        "Observations",
        "$top=25&$skip=50&$filter=result gt 1",
    )
    .unwrap();
    let next = query.next_page(&settings);
    assert_eq!(next.skip, Some(75));
    assert_eq!(next.top, query.top);
    assert_eq!(next.filter, query.filter);
    assert_eq!(query.skip, Some(50));
}

#[test]
fn test_malformed_query_is_parse_error() {
    let model = sta::core_model();
    for source in ["$top=abc", "$filter=result eq", "$expand=Observations("] {
        let err = compiler::compile(&model, &settings(), "Observations", source).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "{}: {:?}", source, err);
    }
}
