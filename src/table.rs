//! Table composition helpers: join, group/aggregate, string coercion,
//! vertical stacking and Parquet export.
//!
//! Every operation takes frames by value and produces a new frame; nothing
//! is mutated in place, so callers are free to reuse inputs or parallelize
//! query issuance later without shared-state hazards.

use polars::prelude::*;
use std::fs::File;
use std::path::Path;

use crate::error::Result;

/// Reduction applied to a column within each group.
#[derive(Debug, Clone)]
pub enum Aggregate {
    /// Numeric sum.
    Sum,
    /// An arbitrary sample value (the first seen).
    First,
    /// String concatenation with the given separator.
    Concat(String),
}

/// Inner join of two frames on a shared key column.
///
/// Rows without a match on both sides are dropped; disjoint key sets yield
/// an empty frame, not an error.
pub fn inner_join(left: DataFrame, right: DataFrame, key: &str) -> Result<DataFrame> {
    let joined = left
        .lazy()
        .join(
            right.lazy(),
            [col(key)],
            [col(key)],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;
    Ok(joined)
}

/// Group `frame` by `key` and reduce `column` with the given aggregate.
///
/// Used to fold the fan-out a query's GROUP_CONCAT/COUNT patterns leave
/// behind, e.g. summing letter counts after datasource name normalization
/// merges two sources into one key.
pub fn group_agg(frame: DataFrame, key: &str, column: &str, agg: &Aggregate) -> Result<DataFrame> {
    let expr = match agg {
        Aggregate::Sum => col(column).sum(),
        Aggregate::First => col(column).first(),
        Aggregate::Concat(separator) => col(column).str().join(separator, true),
    };

    let grouped = frame
        .lazy()
        .group_by([col(key)])
        .agg([expr])
        .collect()?;
    Ok(grouped)
}

/// Cast every column of the frame to text.
///
/// Frames from different datasources disagree on column dtypes (a year may
/// be an integer in one source and free text in another), so stacking them
/// requires a uniform representation first. List columns are re-joined with
/// `;`, the same separator the converter split them on.
pub fn coerce_to_strings(frame: DataFrame) -> Result<DataFrame> {
    let names = frame.get_column_names_owned();
    let dtypes = frame.dtypes();

    let mut exprs = Vec::with_capacity(names.len());
    for (name, dtype) in names.iter().zip(dtypes) {
        let expr = match dtype {
            DataType::List(_) => col(name.as_str()).list().join(lit(";"), true),
            _ => col(name.as_str()).cast(DataType::String),
        };
        exprs.push(expr.alias(name.as_str()));
    }

    let coerced = frame.lazy().with_columns(exprs).collect()?;
    Ok(coerced)
}

/// Stack frames vertically, aligning columns by name.
///
/// Columns missing from one frame come out null in its rows. Dtypes must
/// already agree across frames; run [`coerce_to_strings`] first when sources
/// disagree.
pub fn stack(frames: &[DataFrame]) -> Result<DataFrame> {
    if frames.is_empty() {
        return Ok(DataFrame::empty());
    }
    let stacked = polars::functions::concat_df_diagonal(frames)?;
    Ok(stacked)
}

/// Write a frame to a Parquet file.
pub fn write_parquet(frame: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    ParquetWriter::new(file).finish(frame)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(pairs: &[(&str, &[i64])]) -> DataFrame {
        let columns: Vec<Column> = pairs
            .iter()
            .map(|(name, values)| Series::new((*name).into(), values.to_vec()).into_column())
            .collect();
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn test_inner_join_keeps_only_matches() {
        let left = frame(&[("k", &[1, 2, 3]), ("x", &[10, 20, 30])]);
        let right = frame(&[("k", &[2, 3, 4]), ("y", &[200, 300, 400])]);

        let joined = inner_join(left, right, "k").unwrap();
        assert_eq!(joined.height(), 2);
        assert_eq!(joined.get_column_names().len(), 3);
    }

    #[test]
    fn test_group_sum() {
        let mut df = frame(&[("k", &[1, 1, 2]), ("v", &[5, 7, 9])]);
        df = group_agg(df, "k", "v", &Aggregate::Sum).unwrap();
        // two groups: k=1 sums to 12, k=2 sums to 9
        assert_eq!(df.height(), 2);
        let total: i64 = df
            .column("v")
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .sum()
            .unwrap();
        assert_eq!(total, 21);
    }
}
