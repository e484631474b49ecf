//! SPARQL 1.1 JSON result set model.
//!
//! This is the exact response shape the endpoint returns for SELECT queries
//! with `Accept: application/sparql-results+json`: a `head` listing the
//! projected variables and `results.bindings` holding one map per solution.
//! A variable bound through an OPTIONAL pattern may be absent from individual
//! bindings, so rows are plain maps rather than fixed-width records.

use serde::Deserialize;
use std::collections::HashMap;

/// One query-result cell: the lexical value plus its optional datatype tag.
///
/// Only `value` and `datatype` drive conversion. The `type` and `xml:lang`
/// fields are part of the wire format and are kept so real endpoint responses
/// deserialize, but nothing downstream consumes them.
#[derive(Debug, Clone, Deserialize)]
pub struct BoundValue {
    pub value: String,
    #[serde(default)]
    pub datatype: Option<String>,
    #[serde(rename = "type", default)]
    pub term_type: Option<String>,
    #[serde(rename = "xml:lang", default)]
    pub lang: Option<String>,
}

impl BoundValue {
    /// An untyped literal cell (no datatype tag).
    pub fn plain(value: impl Into<String>) -> Self {
        BoundValue {
            value: value.into(),
            datatype: None,
            term_type: None,
            lang: None,
        }
    }

    /// A cell tagged with a datatype URI.
    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        BoundValue {
            value: value.into(),
            datatype: Some(datatype.into()),
            term_type: None,
            lang: None,
        }
    }
}

/// One solution: variable name to bound value. Keys vary row to row.
pub type ResultRow = HashMap<String, BoundValue>;

#[derive(Debug, Clone, Deserialize)]
pub struct Head {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Bindings {
    pub bindings: Vec<ResultRow>,
}

/// A full SELECT result set as returned by one query execution.
#[derive(Debug, Clone, Deserialize)]
pub struct SparqlResults {
    pub head: Head,
    pub results: Bindings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_select_results() {
        let json = r#"{
            "head": { "vars": ["person", "birthyear", "occupations"] },
            "results": { "bindings": [
                {
                    "person": { "type": "uri", "value": "http://ldf.fi/coco/actors/p1" },
                    "birthyear": {
                        "type": "literal",
                        "datatype": "http://www.w3.org/2001/XMLSchema#integer",
                        "value": "1802"
                    }
                },
                {
                    "person": { "type": "uri", "value": "http://ldf.fi/coco/actors/p2" },
                    "occupations": {
                        "type": "literal",
                        "datatype": "http://www.w3.org/2001/XMLSchema#string",
                        "value": "teacher;writer"
                    }
                }
            ] }
        }"#;

        let results: SparqlResults = serde_json::from_str(json).unwrap();
        assert_eq!(results.head.vars, vec!["person", "birthyear", "occupations"]);
        assert_eq!(results.results.bindings.len(), 2);

        let first = &results.results.bindings[0];
        assert_eq!(first["person"].value, "http://ldf.fi/coco/actors/p1");
        assert_eq!(first["person"].term_type.as_deref(), Some("uri"));
        assert_eq!(
            first["birthyear"].datatype.as_deref(),
            Some("http://www.w3.org/2001/XMLSchema#integer")
        );
        // OPTIONAL variable absent from the first binding
        assert!(!first.contains_key("occupations"));
    }

    #[test]
    fn test_deserialize_lang_tagged_literal() {
        let json = r#"{
            "head": { "vars": ["label"] },
            "results": { "bindings": [
                { "label": { "type": "literal", "xml:lang": "en", "value": "National Library" } }
            ] }
        }"#;

        let results: SparqlResults = serde_json::from_str(json).unwrap();
        let row = &results.results.bindings[0];
        assert_eq!(row["label"].lang.as_deref(), Some("en"));
        assert!(row["label"].datatype.is_none());
    }
}
