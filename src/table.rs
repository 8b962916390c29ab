//! String-typed polars frames.
//!
//! Every column of a [`Table`] has `DataType::String` and a null is the only
//! representation of a missing value. Loaders turn blanks, error cells and
//! whitespace-only text into nulls before a frame reaches a `Table`, so the
//! transforms downstream never need to distinguish between kinds of "null".

use color_eyre::Result;
use polars::prelude::*;
use std::collections::HashSet;

/// A frame of text columns with unique, order-preserving names.
#[derive(Debug, Clone)]
pub struct Table {
    df: DataFrame,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            df: DataFrame::empty(),
        }
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.df.equals_missing(&other.df)
    }
}

impl From<DataFrame> for Table {
    fn from(df: DataFrame) -> Self {
        Self { df }
    }
}

impl Table {
    /// Build a table from text rows.
    ///
    /// Headers go through [`unique_headers`]. Short rows are padded with nulls,
    /// long rows are truncated, and empty or whitespace-only cells become null.
    pub fn from_rows<H, R, C>(headers: &[H], rows: &[R]) -> Result<Table>
    where
        H: AsRef<str>,
        R: AsRef<[C]>,
        C: AsRef<str>,
    {
        let raw: Vec<String> = headers.iter().map(|h| h.as_ref().to_string()).collect();
        let columns: Vec<Column> = unique_headers(&raw)
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let values: Vec<Option<String>> = rows
                    .iter()
                    .map(|row| {
                        row.as_ref()
                            .get(idx)
                            .map(|cell| cell.as_ref())
                            .filter(|cell| !cell.trim().is_empty())
                            .map(str::to_string)
                    })
                    .collect();
                Series::new(name.as_str().into(), values).into()
            })
            .collect();
        Ok(Table {
            df: DataFrame::new(columns)?,
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn columns(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.as_str().to_string())
            .collect()
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.df.width()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.df.get_column_index(name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Text at `row` of the column at position `col`; nulls and positions out
    /// of range read as `""`.
    pub fn text(&self, row: usize, col: usize) -> &str {
        if row >= self.df.height() {
            return "";
        }
        self.df
            .get_columns()
            .get(col)
            .and_then(|c| c.str().ok())
            .and_then(|ca| ca.get(row))
            .unwrap_or("")
    }

    /// Value at `row` for column `name`, with null as `""`. `None` when either
    /// is out of range.
    pub fn value(&self, row: usize, name: &str) -> Option<&str> {
        let idx = self.column_index(name)?;
        (row < self.df.height()).then(|| self.text(row, idx))
    }

    /// Rename a column. Returns `false` when `from` does not exist or `to` is
    /// already taken by another column.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return self.has_column(from);
        }
        if self.has_column(to) || !self.has_column(from) {
            return false;
        }
        self.df.rename(from, to.into()).is_ok()
    }

    /// Project onto `names`, keeping only those that exist, in the order given.
    pub fn select_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        let mut picked: Vec<&str> = Vec::new();
        for name in names.iter().map(AsRef::as_ref) {
            if self.has_column(name) && !picked.contains(&name) {
                picked.push(name);
            }
        }
        Ok(Table {
            df: self.df.select(picked)?,
        })
    }

    /// Replace every non-null value of column `name` with `f(value)`; results
    /// that come back empty become null. Missing columns are ignored.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> Result<()>
    where
        F: FnMut(&str) -> String,
    {
        let Ok(column) = self.df.column(name) else {
            return Ok(());
        };
        let values: Vec<Option<String>> = column
            .str()?
            .into_iter()
            .map(|v| v.map(&mut f).filter(|s| !s.is_empty()))
            .collect();
        self.df.with_column(Series::new(name.into(), values))?;
        Ok(())
    }

    /// Rows where `mask` is true.
    pub fn filter(&self, mask: &BooleanChunked) -> Result<Table> {
        Ok(Table {
            df: self.df.filter(mask)?,
        })
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Table {
        Table {
            df: self.df.head(Some(n)),
        }
    }

    /// Number of distinct non-null values in column `name`.
    pub fn distinct_count(&self, name: &str) -> Option<usize> {
        let column = self.df.column(name).ok()?;
        column.as_materialized_series().drop_nulls().n_unique().ok()
    }
}

/// Make header names usable as column keys: blank headers become
/// `column_<n>` (1-based position) and repeats get `.1`, `.2`, ... suffixes.
pub fn unique_headers(raw: &[String]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for (idx, header) in raw.iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("column_{}", idx + 1)
        } else {
            header.clone()
        };
        let mut name = base.clone();
        let mut n = 1;
        while taken.contains(&name) {
            name = format!("{}.{}", base, n);
            n += 1;
        }
        taken.insert(name.clone());
        out.push(name);
    }
    out
}
