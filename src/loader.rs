//! Workbook loading (xlsx, xlsm, xlsb, xls, ods) via calamine.

use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use chrono::NaiveTime;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::{Column, DataFrame, NamedFrom, Series};
use std::fmt::Display;
use std::path::Path;

use crate::error_display::user_message_from_calamine;
use crate::table::{unique_headers, Table};

/// Sheets of one workbook, in workbook order.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<(String, Table)>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a sheet.
    pub fn insert(&mut self, name: impl Into<String>, table: Table) {
        let name = name.into();
        match self.sheets.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = table,
            None => self.sheets.push((name, table)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.sheets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.sheets.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// Read every sheet of the workbook at `path`.
///
/// A sheet that fails to parse is skipped with a warning; failing to open the
/// workbook itself is an error.
pub fn load_workbook(path: &Path) -> Result<Workbook> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| eyre!("{} ({})", user_message_from_calamine(&e), path.display()))?;
    let sheet_names = workbook.sheet_names().to_vec();

    let sheets = sheet_names.into_iter().map(|name| {
        let range = workbook.worksheet_range(&name);
        (name, range)
    });
    let out = collect_sheets(sheets);
    log::info!("loaded {} sheets from {}", out.len(), path.display());
    Ok(out)
}

/// Turn parsed sheet ranges into a workbook, keeping their order. Sheets
/// that failed to parse, or whose cells do not make a frame, are left out.
pub fn collect_sheets<I, E>(sheets: I) -> Workbook
where
    I: IntoIterator<Item = (String, std::result::Result<Range<Data>, E>)>,
    E: Display,
{
    let mut out = Workbook::new();
    for (name, range) in sheets {
        let table = range
            .map_err(|e| eyre!("{}", e))
            .and_then(|range| {
                let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
                table_from_cells(&rows)
            });
        match table {
            Ok(table) => {
                log::debug!(
                    "sheet '{}': {} rows x {} columns",
                    name,
                    table.height(),
                    table.width()
                );
                out.insert(name, table);
            }
            Err(e) => log::warn!("skipping sheet '{}': {}", name, e),
        }
    }
    out
}

/// Build a String-typed frame from a grid of cells whose first row is the
/// header. Blank and error cells become null.
pub fn table_from_cells(rows: &[Vec<Data>]) -> Result<Table> {
    let Some((header, body)) = rows.split_first() else {
        return Ok(Table::default());
    };
    let headers: Vec<String> = header.iter().map(cell_to_string).collect();
    let columns: Vec<Column> = unique_headers(&headers)
        .iter()
        .enumerate()
        .map(|(col_idx, name)| {
            let values: Vec<Option<String>> = body
                .iter()
                .map(|row| {
                    row.get(col_idx)
                        .map(cell_to_string)
                        .filter(|v| !v.is_empty())
                })
                .collect();
            Series::new(name.as_str().into(), values).into()
        })
        .collect();
    Ok(Table::from(DataFrame::new(columns)?))
}

/// Render one cell as text, with blanks and error cells as the empty string.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => {
            if s.trim().is_empty() {
                String::new()
            } else {
                s.clone()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => String::from(if *b { "TRUE" } else { "FALSE" }),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(dt) if dt.time() == NaiveTime::MIN => dt.format("%Y-%m-%d").to_string(),
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => cell.to_string(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

/// Whole-number floats print without a fractional part so numeric client IDs
/// read back as `1`, not `1.0`.
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else if f.is_nan() {
        String::new()
    } else {
        f.to_string()
    }
}
