//! Grant filters: one single-select dropdown per reporting field.

use std::fmt;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::*;

use crate::fields::{is_multi_select, FILTER_FIELDS};
use crate::table::Table;

/// Default number of options offered per field.
pub const DEFAULT_MAX_OPTIONS: usize = 100;

/// Current choice for one filter field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// No filtering on this field.
    #[default]
    All,
    /// The field is not a column of the current view.
    Unavailable,
    Value(String),
}

impl Selection {
    pub fn label(&self) -> &str {
        match self {
            Selection::All => "All",
            Selection::Unavailable => "(Not available)",
            Selection::Value(v) => v.as_str(),
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Selection::Value(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

/// One field's options and selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: &'static str,
    /// Most frequent values first. Empty when the field is unavailable.
    pub options: Vec<String>,
    pub selection: Selection,
}

impl FieldFilter {
    pub fn is_available(&self) -> bool {
        self.selection != Selection::Unavailable
    }

    pub fn is_multi_select(&self) -> bool {
        is_multi_select(self.field)
    }
}

/// Split a multi-select cell into trimmed, non-empty tokens.
pub fn split_tokens(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(['|', ',', '&'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Whether a cell satisfies a selected value for `field`.
pub fn cell_matches(field: &str, cell: &str, selected: &str) -> bool {
    if is_multi_select(field) {
        split_tokens(cell).any(|t| t == selected)
    } else {
        cell == selected
    }
}

/// Column holding per-value counts while options are ranked.
const COUNT: &str = "count";

/// Up to `limit` most frequent values of `field`, ties in first-seen order.
///
/// Multi-select fields count individual tokens. If none of their cells yield a
/// token, the raw values are counted instead.
pub fn field_options(table: &Table, field: &str, limit: usize) -> Result<Vec<String>> {
    let Ok(column) = table.frame().column(field) else {
        return Ok(Vec::new());
    };
    let values = column.as_materialized_series().drop_nulls();

    if is_multi_select(field) {
        let tokens: Vec<&str> = values
            .str()?
            .into_iter()
            .flatten()
            .flat_map(split_tokens)
            .collect();
        if !tokens.is_empty() {
            return rank_values(Series::new(field.into(), tokens), limit);
        }
    }
    rank_values(values, limit)
}

fn rank_values(values: Series, limit: usize) -> Result<Vec<String>> {
    let name = values.name().clone();
    let ranked = DataFrame::new(vec![values.into()])?
        .lazy()
        .group_by_stable([col(name.clone())])
        .agg([len().alias(COUNT)])
        .sort_by_exprs(
            vec![col(COUNT)],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .slice(0, u32::try_from(limit).unwrap_or(u32::MAX))
        .collect()?;
    Ok(ranked
        .column(name.as_str())?
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect())
}

/// Selections and options for every grant filter field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    fields: Vec<FieldFilter>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            fields: FILTER_FIELDS
                .iter()
                .map(|&field| FieldFilter {
                    field,
                    options: Vec::new(),
                    selection: Selection::Unavailable,
                })
                .collect(),
        }
    }
}

impl FilterState {
    /// Options derived from `view`, with every available field reset to `All`.
    pub fn for_view(view: &Table, max_options: usize) -> Result<Self> {
        let fields = FILTER_FIELDS
            .iter()
            .map(|&field| {
                Ok(if view.has_column(field) {
                    FieldFilter {
                        field,
                        options: field_options(view, field, max_options)?,
                        selection: Selection::All,
                    }
                } else {
                    FieldFilter {
                        field,
                        options: Vec::new(),
                        selection: Selection::Unavailable,
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[FieldFilter] {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&FieldFilter> {
        self.fields.iter().find(|f| f.field == field)
    }

    /// Select `value` for `field`. `None` means `All`.
    pub fn select(&mut self, field: &str, value: Option<&str>) -> Result<()> {
        let filter = self
            .fields
            .iter_mut()
            .find(|f| f.field == field)
            .ok_or_else(|| eyre!("Unknown filter field: {}", field))?;
        if !filter.is_available() {
            return Err(eyre!("Filter '{}' is not available for this view", field));
        }
        filter.selection = match value {
            Some(v) => Selection::Value(v.to_string()),
            None => Selection::All,
        };
        Ok(())
    }

    /// Reset every available field to `All`.
    pub fn clear(&mut self) {
        for f in self.fields.iter_mut().filter(|f| f.is_available()) {
            f.selection = Selection::All;
        }
    }

    /// `(field, value)` pairs that currently restrict rows.
    pub fn active(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields
            .iter()
            .filter_map(|f| f.selection.value().map(|v| (f.field, v)))
    }

    pub fn any_active(&self) -> bool {
        self.active().next().is_some()
    }

    /// Rows of `view` that satisfy every active filter.
    pub fn apply(&self, view: &Table) -> Result<Table> {
        let mut mask: Option<BooleanChunked> = None;
        for (field, value) in self.active() {
            let Ok(column) = view.frame().column(field) else {
                continue;
            };
            let matches: BooleanChunked = column
                .str()?
                .into_iter()
                .map(|cell| cell.is_some_and(|c| cell_matches(field, c, value)))
                .collect();
            mask = Some(match mask {
                Some(mask) => mask & matches,
                None => matches,
            });
        }
        match mask {
            Some(mask) => view.filter(&mask),
            None => Ok(view.clone()),
        }
    }

    pub fn summary(&self) -> ActiveFilters<'_> {
        ActiveFilters(self)
    }
}

/// `Field=Value, ...` description of the active filters.
pub struct ActiveFilters<'a>(&'a FilterState);

impl fmt::Display for ActiveFilters<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.0.any_active() {
            return write!(f, "(none)");
        }
        let parts: Vec<String> = self
            .0
            .active()
            .map(|(field, value)| format!("{}={}", field, value))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}
