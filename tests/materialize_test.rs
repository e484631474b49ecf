use coco_harvest::convert::DatatypeRegistry;
use coco_harvest::materialize::materialize;
use coco_harvest::results::SparqlResults;
use polars::prelude::*;

fn parse(json: &str) -> SparqlResults {
    serde_json::from_str(json).expect("result set json")
}

fn registry() -> DatatypeRegistry {
    DatatypeRegistry::new().expect("registry construction")
}

#[test]
fn test_column_set_is_the_union_of_row_keys() {
    // Row 1 binds {a, b}, row 2 binds {a, c}: the frame gets columns
    // {a, b, c}, with row 1's c and row 2's b null.
    let results = parse(
        r#"{
        "head": { "vars": ["a", "b", "c"] },
        "results": { "bindings": [
            { "a": { "value": "x" }, "b": { "value": "y" } },
            { "a": { "value": "z" }, "c": { "value": "w" } }
        ] }
    }"#,
    );

    let frame = materialize(&registry(), &results).unwrap();
    assert_eq!(frame.height(), 2);
    assert_eq!(frame.get_column_names_str(), &["a", "b", "c"]);

    let b = frame.column("b").unwrap().as_materialized_series().clone();
    assert_eq!(b.str().unwrap().get(0), Some("y"));
    assert!(b.get(1).unwrap().is_null());

    let c = frame.column("c").unwrap().as_materialized_series().clone();
    assert!(c.get(0).unwrap().is_null());
    assert_eq!(c.str().unwrap().get(1), Some("w"));
}

#[test]
fn test_unbound_variable_yields_no_column() {
    let results = parse(
        r#"{
        "head": { "vars": ["a", "never_bound"] },
        "results": { "bindings": [ { "a": { "value": "x" } } ] }
    }"#,
    );

    let frame = materialize(&registry(), &results).unwrap();
    assert_eq!(frame.get_column_names_str(), &["a"]);
}

#[test]
fn test_typed_columns_get_native_dtypes() {
    let results = parse(
        r#"{
        "head": { "vars": ["person", "letters", "share", "sent", "languages"] },
        "results": { "bindings": [
            {
                "person": { "type": "uri", "value": "http://ldf.fi/coco/actors/p1" },
                "letters": { "datatype": "http://www.w3.org/2001/XMLSchema#integer", "value": "12" },
                "share": { "datatype": "http://www.w3.org/2001/XMLSchema#decimal", "value": "0.5" },
                "sent": { "datatype": "http://www.w3.org/2001/XMLSchema#dateTime", "value": "1889-07-15T00:00:00" },
                "languages": { "datatype": "http://www.w3.org/2001/XMLSchema#string", "value": "fi;sv" }
            }
        ] }
    }"#,
    );

    let frame = materialize(&registry(), &results).unwrap();
    assert_eq!(frame.column("person").unwrap().dtype(), &DataType::String);
    assert_eq!(frame.column("letters").unwrap().dtype(), &DataType::Int64);
    assert_eq!(frame.column("share").unwrap().dtype(), &DataType::Float64);
    assert_eq!(frame.column("sent").unwrap().dtype(), &DataType::Date);
    assert_eq!(
        frame.column("languages").unwrap().dtype(),
        &DataType::List(Box::new(DataType::String))
    );

    let languages = frame
        .column("languages")
        .unwrap()
        .as_materialized_series()
        .list()
        .unwrap()
        .get_as_series(0)
        .unwrap();
    let languages: Vec<String> = languages
        .str()
        .unwrap()
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();
    assert_eq!(languages, vec!["fi".to_string(), "sv".to_string()]);
}

#[test]
fn test_round_trip_preserves_cell_values() {
    // Converting a result set to a frame and reading the cells back
    // reproduces the same (column, value) pairs.
    let results = parse(
        r#"{
        "head": { "vars": ["n", "label"] },
        "results": { "bindings": [
            { "n": { "datatype": "http://www.w3.org/2001/XMLSchema#integer", "value": "1" },
              "label": { "value": "first" } },
            { "n": { "datatype": "http://www.w3.org/2001/XMLSchema#integer", "value": "2" },
              "label": { "value": "second" } }
        ] }
    }"#,
    );

    let frame = materialize(&registry(), &results).unwrap();
    let n = frame.column("n").unwrap().as_materialized_series().clone();
    let label = frame
        .column("label")
        .unwrap()
        .as_materialized_series()
        .clone();

    assert_eq!(n.i64().unwrap().get(0), Some(1));
    assert_eq!(n.i64().unwrap().get(1), Some(2));
    assert_eq!(label.str().unwrap().get(0), Some("first"));
    assert_eq!(label.str().unwrap().get(1), Some("second"));
}

#[test]
fn test_empty_result_set_materializes_to_empty_frame() {
    let results = parse(
        r#"{
        "head": { "vars": ["a"] },
        "results": { "bindings": [] }
    }"#,
    );

    let frame = materialize(&registry(), &results).unwrap();
    assert_eq!(frame.height(), 0);
    assert_eq!(frame.width(), 0);
}

#[test]
fn test_malformed_literal_fails_the_whole_materialization() {
    // One bad integer literal poisons the result set; there is no
    // partial-row recovery.
    let results = parse(
        r#"{
        "head": { "vars": ["n"] },
        "results": { "bindings": [
            { "n": { "datatype": "http://www.w3.org/2001/XMLSchema#integer", "value": "1" } },
            { "n": { "datatype": "http://www.w3.org/2001/XMLSchema#integer", "value": "two" } }
        ] }
    }"#,
    );

    assert!(materialize(&registry(), &results).is_err());
}
