//! Datatype conversion for SPARQL result bindings.
//!
//! The endpoint tags literal cells with XSD datatype URIs. This module maps
//! each tagged value to a native scalar through an explicit registry keyed by
//! datatype URI, with a text fallback for unknown tags and untyped literals.
//!
//! Two dataset-specific rules live here:
//!
//! - `xsd:string` cells carry `;`-separated multi-value lists built by
//!   GROUP_CONCAT in the extraction queries, so they convert to string lists,
//!   not plain text. This holds for the CoCo queries only, it is not a
//!   general RDF rule.
//! - `xsd:dateTime` cells that fail the full timestamp pattern (approximate
//!   or partial dates such as `"1889-07"`) fall back to their leading year
//!   and month with the day clamped to a fixed 28, so every recovered date is
//!   valid in any month. The clamp is intentional; regenerated tables must
//!   stay comparable with previously exported ones.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::collections::HashMap;

use crate::error::{HarvestError, Result};
use crate::results::BoundValue;

pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
pub const XSD_DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Native cell value produced by conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Text(String),
    List(Vec<String>),
}

type Converter = Box<dyn Fn(&str) -> Result<Value> + Send + Sync>;

/// Registry of datatype URI to conversion function.
///
/// Lookup is a plain map so new datatypes can be registered without touching
/// the dispatch path. Unknown URIs and untyped literals fall through to text.
pub struct DatatypeRegistry {
    converters: HashMap<&'static str, Converter>,
}

impl DatatypeRegistry {
    pub fn new() -> Result<Self> {
        // Leading year and month of a dateTime that failed the full pattern.
        // The day group is matched when present but never used: the fallback
        // day is always 28.
        let partial_date = Regex::new(r"^(\d{4})-(\d{2})(?:-(\d{2}))?")?;

        let mut converters: HashMap<&'static str, Converter> = HashMap::new();
        converters.insert(XSD_INTEGER, Box::new(convert_integer));
        converters.insert(XSD_DECIMAL, Box::new(convert_decimal));
        converters.insert(XSD_DATE, Box::new(convert_date));
        converters.insert(
            XSD_DATE_TIME,
            Box::new(move |value| convert_date_time(&partial_date, value)),
        );
        converters.insert(XSD_STRING, Box::new(convert_list));

        Ok(DatatypeRegistry { converters })
    }

    /// Convert one bound value into its native representation.
    ///
    /// Malformed literals under a registered datatype propagate as
    /// `HarvestError::Conversion`; the endpoint schema is expected to have
    /// validated its data, so there is no per-row recovery.
    pub fn convert(&self, bound: &BoundValue) -> Result<Value> {
        match bound.datatype.as_deref() {
            Some(datatype) => match self.converters.get(datatype) {
                Some(converter) => converter(&bound.value),
                None => Ok(Value::Text(bound.value.clone())),
            },
            // Untyped literal. U+0001 is a known corruption artifact in the
            // source records and is scrubbed to '?'.
            None => Ok(Value::Text(bound.value.replace('\u{1}', "?"))),
        }
    }
}

fn conversion_error(datatype: &str, value: &str) -> HarvestError {
    HarvestError::Conversion {
        datatype: datatype.to_string(),
        value: value.to_string(),
    }
}

fn convert_integer(value: &str) -> Result<Value> {
    value
        .parse::<i64>()
        .map(Value::Integer)
        .map_err(|_| conversion_error(XSD_INTEGER, value))
}

fn convert_decimal(value: &str) -> Result<Value> {
    value
        .parse::<f64>()
        .map(Value::Float)
        .map_err(|_| conversion_error(XSD_DECIMAL, value))
}

fn convert_date(value: &str) -> Result<Value> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Value::Date)
        .map_err(|_| conversion_error(XSD_DATE, value))
}

fn convert_date_time(partial_date: &Regex, value: &str) -> Result<Value> {
    if let Ok(stamp) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Value::Date(stamp.date()));
    }

    // Approximate or partial date. Recover year and month, clamp day to 28.
    let captures = partial_date
        .captures(value)
        .ok_or_else(|| conversion_error(XSD_DATE_TIME, value))?;
    let year = captures[1]
        .parse::<i32>()
        .map_err(|_| conversion_error(XSD_DATE_TIME, value))?;
    let month = captures[2]
        .parse::<u32>()
        .map_err(|_| conversion_error(XSD_DATE_TIME, value))?;

    NaiveDate::from_ymd_opt(year, month, 28)
        .map(Value::Date)
        .ok_or_else(|| conversion_error(XSD_DATE_TIME, value))
}

fn convert_list(value: &str) -> Result<Value> {
    // Split preserves empty segments and does not trim.
    Ok(Value::List(value.split(';').map(str::to_string).collect()))
}
