use color_eyre::Result;
use polars::prelude::UniqueKeepStrategy;
use std::fmt;

use crate::fields::CLIENT_ID;
use crate::table::Table;

/// Before/after counts of one deduplication pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupeReport {
    pub rows_before: usize,
    pub rows_after: usize,
    /// Distinct non-null identifiers, when the table has an identifier column.
    pub ids: Option<(usize, usize)>,
}

impl fmt::Display for DedupeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ids {
            Some((before, after)) => write!(
                f,
                "Deduped clients: rows {} → {}, unique IDs {} → {}",
                self.rows_before, self.rows_after, before, after
            ),
            None => write!(
                f,
                "Deduped rows (no ID column): {} → {}",
                self.rows_before, self.rows_after
            ),
        }
    }
}

/// Collapse a table to one row per client.
///
/// With a [`CLIENT_ID`] column the first row seen for each identifier is kept.
/// Rows without an identifier count as one client and collapse to the first
/// of them. Without the column, rows identical in every column are collapsed.
pub fn dedupe_clients(table: Table) -> Result<(Table, DedupeReport)> {
    let rows_before = table.height();
    let ids_before = table.distinct_count(CLIENT_ID);

    let frame = table.frame();
    let deduped = if table.has_column(CLIENT_ID) {
        let subset = [CLIENT_ID.into()];
        frame.unique_stable(Some(&subset[..]), UniqueKeepStrategy::First, None)?
    } else {
        frame.unique_stable(None, UniqueKeepStrategy::First, None)?
    };
    let deduped = Table::from(deduped);

    let report = DedupeReport {
        rows_before,
        rows_after: deduped.height(),
        ids: ids_before.zip(deduped.distinct_count(CLIENT_ID)),
    };
    log::info!("{}", report);
    Ok((deduped, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_ids(ids: &[&str]) -> Table {
        let rows: Vec<Vec<String>> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| vec![id.to_string(), format!("g{}", i)])
            .collect();
        Table::from_rows(&[CLIENT_ID, "Gender"], &rows).unwrap()
    }

    #[test]
    fn test_keeps_first_row_per_id() {
        let (t, report) = dedupe_clients(with_ids(&["1", "2", "2", "3", "1"])).unwrap();
        assert_eq!(t.height(), 3);
        assert_eq!(t.value(1, CLIENT_ID), Some("2"));
        assert_eq!(t.value(1, "Gender"), Some("g1"));
        assert_eq!(report.rows_before, 5);
        assert_eq!(report.rows_after, 3);
        assert_eq!(report.ids, Some((3, 3)));
    }

    #[test]
    fn test_distinct_ids_equal_row_count() {
        let (t, _) = dedupe_clients(with_ids(&["a", "b", "a", "c", "b", "d"])).unwrap();
        assert_eq!(t.distinct_count(CLIENT_ID), Some(t.height()));
    }

    #[test]
    fn test_blank_ids_collapse_to_one_row() {
        let (t, report) = dedupe_clients(with_ids(&["", "", "1"])).unwrap();
        assert_eq!(t.height(), 2);
        assert_eq!(t.value(0, CLIENT_ID), Some(""));
        assert_eq!(t.value(0, "Gender"), Some("g0"));
        // the surviving blank row is not counted as a client
        assert_eq!(t.distinct_count(CLIENT_ID), Some(1));
        assert_eq!(report.ids, Some((1, 1)));
    }

    #[test]
    fn test_idempotent() {
        let (once, _) = dedupe_clients(with_ids(&["1", "1", "2"])).unwrap();
        let (twice, report) = dedupe_clients(once.clone()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(report.rows_before, report.rows_after);
    }

    #[test]
    fn test_whole_row_dedupe_without_id() {
        let rows: &[&[&str]] = &[&["F", "A"], &["F", "A"], &["F", "B"]];
        let t = Table::from_rows(&["Gender", "Program"], rows).unwrap();
        let (t, report) = dedupe_clients(t).unwrap();
        assert_eq!(t.height(), 2);
        assert_eq!(report.ids, None);
        assert!(report.to_string().contains("no ID column"));
    }
}
