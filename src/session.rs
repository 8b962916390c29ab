//! Everything known about one loaded workbook: sheets, views, the current
//! view and its filters.
//!
//! A `Session` is built once per load (usually on the worker thread, see
//! [`crate::worker`]) and then owned and mutated by the UI thread alone.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::{Path, PathBuf};

use crate::dedupe::dedupe_clients;
use crate::fields::{preview_columns, CLIENT_ID};
use crate::filter::{FilterState, DEFAULT_MAX_OPTIONS};
use crate::identifier::ensure_id_column;
use crate::loader::{load_workbook, Workbook};
use crate::normalize::apply_normalizations;
use crate::table::Table;
use crate::views::{build_views, ViewSet};

/// Total vs. filtered counts for the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub total_rows: usize,
    pub shown_rows: usize,
    /// Distinct clients; falls back to row counts when the view has no identifier.
    pub total_clients: usize,
    pub shown_clients: usize,
}

#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    workbook: Workbook,
    views: ViewSet,
    max_options: usize,
    current_name: Option<String>,
    current: Table,
    filtered: Table,
    filters: FilterState,
    status: String,
}

impl Session {
    /// Load the workbook at `path` and select its default view.
    pub fn open(path: &Path, max_options: usize) -> Result<Self> {
        let workbook = load_workbook(path)?;
        Self::from_workbook(path, workbook, max_options)
    }

    /// Build views for an already loaded workbook and select the default one.
    pub fn from_workbook(path: &Path, workbook: Workbook, max_options: usize) -> Result<Self> {
        let views = build_views(&workbook)?;
        let mut session = Self {
            path: path.to_path_buf(),
            workbook,
            views,
            max_options: if max_options == 0 {
                DEFAULT_MAX_OPTIONS
            } else {
                max_options
            },
            current_name: None,
            current: Table::default(),
            filtered: Table::default(),
            filters: FilterState::default(),
            status: String::new(),
        };
        match session.views.default_view().map(str::to_string) {
            Some(name) => {
                if let Err(e) = session.select_view(&name) {
                    log::warn!("could not select default view '{}': {:?}", name, e);
                }
            }
            None => session.status = format!("Loaded {} sheets.", session.workbook.len()),
        }
        Ok(session)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    /// View names, preferred views first.
    pub fn view_names(&self) -> Vec<String> {
        self.views.ordered_names()
    }

    pub fn current_view_name(&self) -> Option<&str> {
        self.current_name.as_deref()
    }

    /// Switch to `name`: normalize and dedupe a copy of the view, rebuild the
    /// filter options from it, and reset every selection.
    pub fn select_view(&mut self, name: &str) -> Result<()> {
        let view = self
            .views
            .get(name)
            .ok_or_else(|| eyre!("No such view: {}", name))?;
        let mut table = view.clone();
        ensure_id_column(&mut table);
        apply_normalizations(&mut table)?;
        let (table, report) = dedupe_clients(table)?;
        let filters = FilterState::for_view(&table, self.max_options)?;
        let filtered = filters.apply(&table)?;

        self.filters = filters;
        self.current = table;
        self.filtered = filtered;
        self.current_name = Some(name.to_string());
        self.status = report.to_string();
        Ok(())
    }

    /// The deduplicated, normalized current view.
    pub fn current(&self) -> &Table {
        &self.current
    }

    /// The current view after filtering.
    pub fn filtered(&self) -> &Table {
        &self.filtered
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Select `value` (`None` for `All`) on `field` and recompute the filtered rows.
    pub fn set_selection(&mut self, field: &str, value: Option<&str>) -> Result<()> {
        self.filters.select(field, value)?;
        self.refilter()
    }

    pub fn clear_filters(&mut self) -> Result<()> {
        self.filters.clear();
        self.refilter()
    }

    pub fn summary(&self) -> Summary {
        let clients = |t: &Table| t.distinct_count(CLIENT_ID).unwrap_or(t.height());
        Summary {
            total_rows: self.current.height(),
            shown_rows: self.filtered.height(),
            total_clients: clients(&self.current),
            shown_clients: clients(&self.filtered),
        }
    }

    /// Grant-style preview columns present in the current view, or every
    /// column when none of them are.
    pub fn preview_columns(&self) -> Vec<String> {
        let cols: Vec<String> = preview_columns()
            .filter(|c| self.current.has_column(c))
            .map(str::to_string)
            .collect();
        if cols.is_empty() {
            self.current.columns()
        } else {
            cols
        }
    }

    /// First `limit` filtered rows projected onto [`Session::preview_columns`].
    pub fn preview(&self, limit: usize) -> Result<Table> {
        self.filtered
            .head(limit)
            .select_columns(self.preview_columns().as_slice())
    }

    /// Last pipeline message (dedupe counts, load summary).
    pub fn status(&self) -> &str {
        &self.status
    }

    fn refilter(&mut self) -> Result<()> {
        self.filtered = self.filters.apply(&self.current)?;
        Ok(())
    }
}
