//! The built-in SensorThings core model.
//!
//! Eight entity types with the standard navigation edges, used by the test
//! suite and as the CLI's default model. Interval-valued time properties map
//! to paired start/end columns; observation results are persisted in typed
//! variant columns.

use crate::expr::types::ExprType;
use crate::model::{
    entity_property, Cardinality, ColumnMapping, EntityProperty, Model, NavigationProperty,
    VariantColumn,
};

fn id(owner: &str) -> EntityProperty {
    entity_property(owner, "id", ExprType::Int, false)
}

fn string_prop(owner: &str, name: &str) -> EntityProperty {
    entity_property(owner, name, ExprType::String, false)
}

fn json_prop(owner: &str, name: &str) -> EntityProperty {
    EntityProperty {
        has_custom: true,
        ..entity_property(owner, name, ExprType::Json, true)
    }
}

fn nav(owner: &str, name: &str, target: &str, cardinality: Cardinality, required: bool) -> NavigationProperty {
    NavigationProperty {
        name: name.into(),
        owner: owner.into(),
        target: target.into(),
        cardinality,
        required,
    }
}

/// Build the SensorThings core model.
pub fn core_model() -> Model {
    use Cardinality::{Many, One};

    let mut b = Model::builder();

    b.entity_type("Things", "things");
    b.property("Things", id("Things"), ColumnMapping::single("id"));
    b.property("Things", string_prop("Things", "name"), ColumnMapping::single("name"));
    b.property(
        "Things",
        string_prop("Things", "description"),
        ColumnMapping::single("description"),
    );
    b.property(
        "Things",
        json_prop("Things", "properties"),
        ColumnMapping::single("properties"),
    );
    b.navigation("Things", nav("Things", "Datastreams", "Datastreams", Many, false));
    b.navigation("Things", nav("Things", "Locations", "Locations", Many, false));
    b.navigation(
        "Things",
        nav("Things", "HistoricalLocations", "HistoricalLocations", Many, false),
    );

    b.entity_type("Locations", "locations");
    b.property("Locations", id("Locations"), ColumnMapping::single("id"));
    b.property(
        "Locations",
        string_prop("Locations", "name"),
        ColumnMapping::single("name"),
    );
    b.property(
        "Locations",
        string_prop("Locations", "description"),
        ColumnMapping::single("description"),
    );
    b.property(
        "Locations",
        string_prop("Locations", "encodingType"),
        ColumnMapping::single("encoding_type"),
    );
    b.property(
        "Locations",
        entity_property("Locations", "location", ExprType::Geometry, false),
        ColumnMapping::single("location"),
    );
    b.property(
        "Locations",
        json_prop("Locations", "properties"),
        ColumnMapping::single("properties"),
    );
    b.navigation("Locations", nav("Locations", "Things", "Things", Many, false));
    b.navigation(
        "Locations",
        nav("Locations", "HistoricalLocations", "HistoricalLocations", Many, false),
    );

    b.entity_type("HistoricalLocations", "historical_locations");
    b.property(
        "HistoricalLocations",
        id("HistoricalLocations"),
        ColumnMapping::single("id"),
    );
    b.property(
        "HistoricalLocations",
        entity_property("HistoricalLocations", "time", ExprType::DateTime, false),
        ColumnMapping::single("time"),
    );
    b.navigation(
        "HistoricalLocations",
        nav("HistoricalLocations", "Thing", "Things", One, true),
    );
    b.navigation(
        "HistoricalLocations",
        nav("HistoricalLocations", "Locations", "Locations", Many, false),
    );

    b.entity_type("Datastreams", "datastreams");
    b.property("Datastreams", id("Datastreams"), ColumnMapping::single("id"));
    b.property(
        "Datastreams",
        string_prop("Datastreams", "name"),
        ColumnMapping::single("name"),
    );
    b.property(
        "Datastreams",
        string_prop("Datastreams", "description"),
        ColumnMapping::single("description"),
    );
    b.property(
        "Datastreams",
        string_prop("Datastreams", "observationType"),
        ColumnMapping::single("observation_type"),
    );
    b.property(
        "Datastreams",
        json_prop("Datastreams", "unitOfMeasurement"),
        ColumnMapping::single("unit_of_measurement"),
    );
    b.property(
        "Datastreams",
        entity_property("Datastreams", "observedArea", ExprType::Geometry, true),
        ColumnMapping::single("observed_area"),
    );
    b.property(
        "Datastreams",
        entity_property("Datastreams", "phenomenonTime", ExprType::Interval, true),
        ColumnMapping::interval("phenomenon_time_start", "phenomenon_time_end"),
    );
    b.property(
        "Datastreams",
        entity_property("Datastreams", "resultTime", ExprType::Interval, true),
        ColumnMapping::interval("result_time_start", "result_time_end"),
    );
    b.property(
        "Datastreams",
        json_prop("Datastreams", "properties"),
        ColumnMapping::single("properties"),
    );
    b.navigation("Datastreams", nav("Datastreams", "Thing", "Things", One, true));
    b.navigation("Datastreams", nav("Datastreams", "Sensor", "Sensors", One, true));
    b.navigation(
        "Datastreams",
        nav("Datastreams", "ObservedProperty", "ObservedProperties", One, true),
    );
    b.navigation(
        "Datastreams",
        nav("Datastreams", "Observations", "Observations", Many, false),
    );

    b.entity_type("Sensors", "sensors");
    b.property("Sensors", id("Sensors"), ColumnMapping::single("id"));
    b.property("Sensors", string_prop("Sensors", "name"), ColumnMapping::single("name"));
    b.property(
        "Sensors",
        string_prop("Sensors", "description"),
        ColumnMapping::single("description"),
    );
    b.property(
        "Sensors",
        string_prop("Sensors", "encodingType"),
        ColumnMapping::single("encoding_type"),
    );
    b.property(
        "Sensors",
        string_prop("Sensors", "metadata"),
        ColumnMapping::single("metadata"),
    );
    b.property(
        "Sensors",
        json_prop("Sensors", "properties"),
        ColumnMapping::single("properties"),
    );
    b.navigation("Sensors", nav("Sensors", "Datastreams", "Datastreams", Many, false));

    b.entity_type("ObservedProperties", "observed_properties");
    b.property(
        "ObservedProperties",
        id("ObservedProperties"),
        ColumnMapping::single("id"),
    );
    b.property(
        "ObservedProperties",
        string_prop("ObservedProperties", "name"),
        ColumnMapping::single("name"),
    );
    b.property(
        "ObservedProperties",
        string_prop("ObservedProperties", "definition"),
        ColumnMapping::single("definition"),
    );
    b.property(
        "ObservedProperties",
        string_prop("ObservedProperties", "description"),
        ColumnMapping::single("description"),
    );
    b.property(
        "ObservedProperties",
        json_prop("ObservedProperties", "properties"),
        ColumnMapping::single("properties"),
    );
    b.navigation(
        "ObservedProperties",
        nav("ObservedProperties", "Datastreams", "Datastreams", Many, false),
    );

    b.entity_type("Observations", "observations");
    b.property("Observations", id("Observations"), ColumnMapping::single("id"));
    b.property(
        "Observations",
        entity_property("Observations", "phenomenonTime", ExprType::Interval, false),
        ColumnMapping::interval("phenomenon_time_start", "phenomenon_time_end"),
    );
    b.property(
        "Observations",
        entity_property("Observations", "resultTime", ExprType::DateTime, true),
        ColumnMapping::single("result_time"),
    );
    b.property(
        "Observations",
        EntityProperty {
            has_custom: true,
            ..entity_property("Observations", "result", ExprType::Double, true)
        },
        ColumnMapping::Variants(vec![
            VariantColumn {
                data_type: ExprType::Double,
                column: "result_number".into(),
            },
            VariantColumn {
                data_type: ExprType::String,
                column: "result_string".into(),
            },
            VariantColumn {
                data_type: ExprType::Bool,
                column: "result_boolean".into(),
            },
            VariantColumn {
                data_type: ExprType::Json,
                column: "result_json".into(),
            },
        ]),
    );
    b.property(
        "Observations",
        entity_property("Observations", "resultQuality", ExprType::String, true),
        ColumnMapping::single("result_quality"),
    );
    b.property(
        "Observations",
        entity_property("Observations", "validTime", ExprType::Interval, true),
        ColumnMapping::interval("valid_time_start", "valid_time_end"),
    );
    b.property(
        "Observations",
        json_prop("Observations", "parameters"),
        ColumnMapping::single("parameters"),
    );
    b.navigation(
        "Observations",
        nav("Observations", "Datastream", "Datastreams", One, true),
    );
    b.navigation(
        "Observations",
        nav("Observations", "FeatureOfInterest", "FeaturesOfInterest", One, true),
    );

    b.entity_type("FeaturesOfInterest", "features_of_interest");
    b.property(
        "FeaturesOfInterest",
        id("FeaturesOfInterest"),
        ColumnMapping::single("id"),
    );
    b.property(
        "FeaturesOfInterest",
        string_prop("FeaturesOfInterest", "name"),
        ColumnMapping::single("name"),
    );
    b.property(
        "FeaturesOfInterest",
        string_prop("FeaturesOfInterest", "description"),
        ColumnMapping::single("description"),
    );
    b.property(
        "FeaturesOfInterest",
        string_prop("FeaturesOfInterest", "encodingType"),
        ColumnMapping::single("encoding_type"),
    );
    b.property(
        "FeaturesOfInterest",
        json_prop("FeaturesOfInterest", "feature"),
        ColumnMapping::single("feature"),
    );
    b.navigation(
        "FeaturesOfInterest",
        nav("FeaturesOfInterest", "Observations", "Observations", Many, false),
    );

    b.finalize().expect("core model is valid")
}
