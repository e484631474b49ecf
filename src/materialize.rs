//! Result materialization: a converted result set assembled into a
//! column-oriented polars `DataFrame`.
//!
//! Every bound value is pushed through the [`DatatypeRegistry`] first, so by
//! the time columns are built each cell already carries its native type. The
//! column set is the union of the variable names bound in any row; a row that
//! lacks a column contributes a null. Column order follows the endpoint's
//! `head.vars` declaration, restricted to variables that were actually bound.
//!
//! Pure transformation, no side effects: the result set is consumed row by
//! row and never persisted.

use polars::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::convert::{DatatypeRegistry, Value};
use crate::error::{HarvestError, Result};
use crate::results::SparqlResults;

/// A single result row after datatype conversion.
pub type ConvertedRow = HashMap<String, Value>;

/// Convert every bound value of every row, keeping the row structure.
pub fn convert_rows(
    registry: &DatatypeRegistry,
    results: &SparqlResults,
) -> Result<Vec<ConvertedRow>> {
    results
        .results
        .bindings
        .iter()
        .map(|row| {
            row.iter()
                .map(|(name, bound)| Ok((name.clone(), registry.convert(bound)?)))
                .collect()
        })
        .collect()
}

/// Materialize a full result set into a `DataFrame`.
pub fn materialize(registry: &DatatypeRegistry, results: &SparqlResults) -> Result<DataFrame> {
    let rows = convert_rows(registry, results)?;
    let columns = column_union(&results.head.vars, &rows);
    frame_from_rows(&columns, &rows)
}

/// Union of the variable names bound in any row, in `vars` order.
///
/// A projected variable that never received a binding yields no column.
/// Names bound in rows but missing from `vars` (defensive, endpoints declare
/// everything they project) are appended in sorted order so the result stays
/// deterministic.
fn column_union(vars: &[String], rows: &[ConvertedRow]) -> Vec<String> {
    let mut bound: HashSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut columns: Vec<String> = vars
        .iter()
        .filter(|var| bound.remove(var.as_str()))
        .cloned()
        .collect();

    let mut stragglers: Vec<String> = bound.into_iter().map(str::to_string).collect();
    stragglers.sort();
    columns.extend(stragglers);
    columns
}

/// Assemble converted rows into a frame with the given column set.
pub fn frame_from_rows(columns: &[String], rows: &[ConvertedRow]) -> Result<DataFrame> {
    if columns.is_empty() {
        return Ok(DataFrame::empty());
    }

    let mut built = Vec::with_capacity(columns.len());
    for name in columns {
        let cells: Vec<Option<&Value>> = rows.iter().map(|row| row.get(name)).collect();
        built.push(build_column(name, &cells)?);
    }
    Ok(DataFrame::new(built)?)
}

/// Build one typed column. The dtype is fixed by the first non-null cell;
/// a later cell of a different variant is reported, not coerced.
fn build_column(name: &str, cells: &[Option<&Value>]) -> Result<Column> {
    let first = cells.iter().flatten().next();

    let column = match first {
        None => {
            Series::full_null(name.into(), cells.len(), &DataType::String).into_column()
        }
        Some(Value::Integer(_)) => {
            let mut data: Vec<Option<i64>> = Vec::with_capacity(cells.len());
            for cell in cells {
                match cell {
                    Some(Value::Integer(n)) => data.push(Some(*n)),
                    None => data.push(None),
                    Some(_) => return Err(mixed_column(name)),
                }
            }
            Series::new(name.into(), data).into_column()
        }
        Some(Value::Float(_)) => {
            let mut data: Vec<Option<f64>> = Vec::with_capacity(cells.len());
            for cell in cells {
                match cell {
                    Some(Value::Float(x)) => data.push(Some(*x)),
                    None => data.push(None),
                    Some(_) => return Err(mixed_column(name)),
                }
            }
            Series::new(name.into(), data).into_column()
        }
        Some(Value::Date(_)) => {
            let mut data: Vec<Option<chrono::NaiveDate>> = Vec::with_capacity(cells.len());
            for cell in cells {
                match cell {
                    Some(Value::Date(date)) => data.push(Some(*date)),
                    None => data.push(None),
                    Some(_) => return Err(mixed_column(name)),
                }
            }
            DateChunked::from_naive_date_options(name.into(), data)
                .into_series()
                .into_column()
        }
        Some(Value::Text(_)) => {
            let mut data: Vec<Option<String>> = Vec::with_capacity(cells.len());
            for cell in cells {
                match cell {
                    Some(Value::Text(text)) => data.push(Some(text.clone())),
                    None => data.push(None),
                    Some(_) => return Err(mixed_column(name)),
                }
            }
            Series::new(name.into(), data).into_column()
        }
        Some(Value::List(_)) => {
            let mut data: Vec<Option<Series>> = Vec::with_capacity(cells.len());
            for cell in cells {
                match cell {
                    Some(Value::List(items)) => {
                        data.push(Some(Series::new(PlSmallStr::EMPTY, items.clone())))
                    }
                    None => data.push(None),
                    Some(_) => return Err(mixed_column(name)),
                }
            }
            Series::new(name.into(), data).into_column()
        }
    };

    Ok(column)
}

fn mixed_column(name: &str) -> HarvestError {
    HarvestError::Table(format!("column '{name}' mixes native value types"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_union_follows_vars_order() {
        let vars = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let rows = vec![
            HashMap::from([
                ("c".to_string(), Value::Integer(1)),
                ("a".to_string(), Value::Integer(2)),
            ]),
            HashMap::from([("extra".to_string(), Value::Integer(3))]),
        ];

        // "b" was never bound, "extra" was never projected
        assert_eq!(column_union(&vars, &rows), vec!["a", "c", "extra"]);
    }

    #[test]
    fn test_empty_result_set_yields_empty_frame() {
        let frame = frame_from_rows(&[], &[]).unwrap();
        assert_eq!(frame.height(), 0);
        assert_eq!(frame.width(), 0);
    }

    #[test]
    fn test_mixed_type_column_is_reported() {
        let columns = vec!["v".to_string()];
        let rows = vec![
            HashMap::from([("v".to_string(), Value::Integer(1))]),
            HashMap::from([("v".to_string(), Value::Text("two".to_string()))]),
        ];
        assert!(matches!(
            frame_from_rows(&columns, &rows),
            Err(HarvestError::Table(_))
        ));
    }
}
