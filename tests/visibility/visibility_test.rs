//! Integration tests for visibility resolution.

use staq::compiler;
use staq::config::QuerySettings;
use staq::model::sta;
use staq::visibility::{resolve, Visibility};

fn resolve_str(root: &str, source: &str) -> Visibility {
    let model = sta::core_model();
    let settings = QuerySettings::default();
    let query = compiler::compile(&model, &settings, root, source).unwrap();
    let entity_type = model.entity_type(root).unwrap();
    resolve(&model, entity_type, Some(&query), true).unwrap()
}

#[test]
fn test_top_level_default_shows_all_properties_and_links() {
    let v = resolve_str("Datastreams", "");
    for name in ["name", "description", "unitOfMeasurement", "phenomenonTime"] {
        assert!(v.properties.contains(name), "missing {}", name);
    }
    for link in ["Thing", "Sensor", "ObservedProperty", "Observations"] {
        assert!(v.navigation_links.contains(link), "missing {}", link);
    }
}

#[test]
fn test_expanded_entities_default_to_plain_properties() {
    let v = resolve_str("Things", "$expand=Datastreams");
    let nested = v.expands.get("Datastreams").unwrap();
    assert!(nested.properties.contains("name"));
    // No sub-select: expanded entities hide navigation links.
    assert!(nested.navigation_links.is_empty());
    assert!(nested.expands.is_empty());
}

#[test]
fn test_selecting_navigation_property_emits_link() {
    let v = resolve_str("Things", "$select=name,Datastreams");
    assert!(v.properties.contains("name"));
    assert!(v.navigation_links.contains("Datastreams"));
    assert!(!v.properties.contains("Datastreams"));
}

#[test]
fn test_overlapping_expands_take_the_union() {
    // Two declarations over the same path: the more permissive union wins.
    let narrow_then_wide = resolve_str(
        "Things",
        "$expand=Datastreams($select=id),Datastreams($select=name)",
    );
    let nested = narrow_then_wide.expands.get("Datastreams").unwrap();
    assert!(nested.properties.contains("id"));
    assert!(nested.properties.contains("name"));
}

#[test]
fn test_expand_path_merges_with_direct_expand() {
    let v = resolve_str(
        "Datastreams",
        "$expand=Observations/FeatureOfInterest,Observations($select=result)",
    );
    let obs = v.expands.get("Observations").unwrap();
    // The union of the path-expand (all plain properties) and the
    // sub-selected expand.
    assert!(obs.properties.contains("result"));
    assert!(obs.properties.contains("phenomenonTime"));
    assert!(obs.expands.contains_key("FeatureOfInterest"));
}

#[test]
fn test_merge_idempotent_and_associative() {
    let a = resolve_str("Things", "$select=id&$expand=Locations($select=name)");
    let b = resolve_str("Things", "$select=name&$expand=Locations($select=encodingType)");
    let c = resolve_str("Things", "$expand=Datastreams($select=id)");

    // Idempotent: merging a into itself changes nothing.
    let mut twice = a.clone();
    twice.merge(&a);
    assert_eq!(twice, a);

    // Associative: (a ∪ b) ∪ c == a ∪ (b ∪ c).
    let mut left = a.clone();
    left.merge(&b);
    left.merge(&c);
    let mut right_inner = b.clone();
    right_inner.merge(&c);
    let mut right = a.clone();
    right.merge(&right_inner);
    assert_eq!(left, right);
}

#[test]
fn test_merge_yields_superset_of_both() {
    let a = resolve_str("Things", "$select=id&$expand=Locations($select=name)");
    let b = resolve_str("Things", "$select=name,Datastreams");
    let mut merged = a.clone();
    merged.merge(&b);
    assert!(merged.contains(&a));
    assert!(merged.contains(&b));
    assert!(merged.properties.is_superset(&a.properties));
    assert!(merged.properties.is_superset(&b.properties));
}

#[test]
fn test_select_of_json_path_exposes_document_property() {
    let v = resolve_str("Observations", "$select=parameters/depth,result");
    // Selecting into a document keeps the document property visible at this
    // level; the serializer prunes inside it.
    assert!(v.properties.contains("parameters"));
    assert!(v.properties.contains("result"));
}
