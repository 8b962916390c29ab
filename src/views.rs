//! Named views over a loaded workbook: one per sheet, plus a merged per-client report.

use color_eyre::Result;
use polars::prelude::*;

use crate::dedupe::dedupe_clients;
use crate::fields::*;
use crate::identifier::ensure_id_column;
use crate::loader::Workbook;
use crate::normalize::apply_normalizations;
use crate::table::Table;

/// Sheet that already holds one combined row per client.
pub const COMBINED_SHEET: &str = "New Client Demographics";
pub const COMBINED_VIEW: &str = "New Client Demographics (combined tab)";
pub const MERGED_VIEW: &str = "Merged Report View";

/// Suffix polars gives right-hand columns that clash with the left during a join.
const RIGHT_SUFFIX: &str = "_right";

/// Sheets joined into the merged view when there is no combined sheet, each
/// with the columns it contributes. Sheets and columns outside this list are
/// not part of the merged report.
pub const SHEET_MAPPINGS: &[(&str, &[&str])] = &[
    (
        "Race - Rows",
        &[CLIENT_ID, RACE_ETHNICITY, PROGRAM, FUNDER, VICTIMIZATION_TYPE],
    ),
    (
        "Gender - Rows",
        &[CLIENT_ID, GENDER, FUNDER, VICTIMIZATION_TYPE],
    ),
    (
        "Age of Victim - Rows",
        &[CLIENT_ID, DATE_OF_BIRTH, FUNDER, VICTIMIZATION_TYPE],
    ),
    (
        "Disability, Veteran, LG - Rows",
        &[
            CLIENT_ID,
            VETERAN_STATUS,
            LGBTQ,
            DISABILITY,
            CITIZENSHIP,
            PRIMARY_LANGUAGE,
            IMMIGRANT_STATUS,
        ],
    ),
    (
        "Victimization Type - Rows",
        &[
            CLIENT_ID,
            VICTIMIZATION_TYPE,
            VICTIM_TYPE,
            AGE_AT_TRAFFICKING,
            FUNDER,
        ],
    ),
    (
        "Homelessness - Rows",
        &[CLIENT_ID, HOMELESSNESS, FUNDER, VICTIMIZATION_TYPE],
    ),
];

/// View name for a raw sheet.
pub fn sheet_view_name(sheet: &str) -> String {
    format!("Sheet: {}", sheet)
}

/// Views in build order, with the default selection.
#[derive(Debug, Clone, Default)]
pub struct ViewSet {
    views: Vec<(String, Table)>,
    default_view: Option<String>,
}

impl ViewSet {
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.views
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The view selected right after a load.
    pub fn default_view(&self) -> Option<&str> {
        self.default_view.as_deref()
    }

    /// View names with the combined and merged views first, then the rest in
    /// build order.
    pub fn ordered_names(&self) -> Vec<String> {
        let preferred = [COMBINED_VIEW, MERGED_VIEW];
        let mut names: Vec<String> = preferred
            .iter()
            .filter(|p| self.contains(p))
            .map(|p| p.to_string())
            .collect();
        names.extend(
            self.views
                .iter()
                .map(|(n, _)| n)
                .filter(|n| !preferred.contains(&n.as_str()))
                .cloned(),
        );
        names
    }

    fn push(&mut self, name: impl Into<String>, table: Table) {
        self.views.push((name.into(), table));
    }
}

/// Build every view for a loaded workbook.
pub fn build_views(workbook: &Workbook) -> Result<ViewSet> {
    let mut set = ViewSet::default();
    for (sheet, table) in workbook.iter() {
        set.push(sheet_view_name(sheet), table.clone());
    }
    if let Some(merged) = build_merged_view(workbook)? {
        set.push(MERGED_VIEW, merged);
    }
    if let Some(combined) = workbook.get(COMBINED_SHEET) {
        set.push(COMBINED_VIEW, combined.clone());
    }

    set.default_view = if set.contains(COMBINED_VIEW) {
        Some(COMBINED_VIEW.to_string())
    } else if set.contains(MERGED_VIEW) {
        Some(MERGED_VIEW.to_string())
    } else {
        set.views.first().map(|(n, _)| n.clone())
    };
    Ok(set)
}

/// One normalized, deduplicated row per client.
///
/// The combined sheet is used when present. Otherwise the mapped sheets are
/// full-outer-joined on the client identifier. `None` when no mapped sheet
/// contributes.
pub fn build_merged_view(workbook: &Workbook) -> Result<Option<Table>> {
    log::info!("creating merged report view (deduplicate to 1 row/client)");

    if let Some(combined) = workbook.get(COMBINED_SHEET) {
        let mut table = combined.clone();
        ensure_id_column(&mut table);
        apply_normalizations(&mut table)?;
        return Ok(Some(dedupe_clients(table)?.0));
    }

    let mut merged: Option<Table> = None;
    for &(sheet, columns) in SHEET_MAPPINGS {
        let Some(raw) = workbook.get(sheet) else {
            continue;
        };
        let mut table = raw.clone();
        ensure_id_column(&mut table);
        if !table.has_column(CLIENT_ID) {
            log::warn!(
                "sheet '{}' has no '{}' column; left out of the merged view",
                sheet,
                CLIENT_ID
            );
            continue;
        }
        let (table, _) = dedupe_clients(table.select_columns(columns)?)?;
        merged = Some(match merged {
            None => table,
            Some(left) => outer_join(&left, &table, CLIENT_ID)?,
        });
    }

    let Some(mut merged) = merged else {
        return Ok(None);
    };
    apply_normalizations(&mut merged)?;
    Ok(Some(dedupe_clients(merged)?.0))
}

/// Full outer join on `key`, sorted by key with keyless rows last.
///
/// The key comes out as one column. Non-key columns present on both sides
/// are coalesced into one column holding the left value, or the right value
/// where the left is null. Null keys never match.
pub fn outer_join(left: &Table, right: &Table, key: &str) -> Result<Table> {
    if !left.has_column(key) || !right.has_column(key) {
        return Ok(left.clone());
    }

    let mut exprs: Vec<Expr> = left
        .columns()
        .iter()
        .map(|c| {
            if c != key && right.has_column(c) {
                let right_name = format!("{}{}", c, RIGHT_SUFFIX);
                coalesce(&[col(c.as_str()), col(right_name)]).alias(c.as_str())
            } else {
                col(c.as_str())
            }
        })
        .collect();
    exprs.extend(
        right
            .columns()
            .iter()
            .filter(|c| !left.has_column(c))
            .map(|c| col(c.as_str())),
    );

    let joined = left
        .frame()
        .clone()
        .lazy()
        .join(
            right.frame().clone().lazy(),
            [col(key)],
            [col(key)],
            JoinArgs::new(JoinType::Full)
                .with_coalesce(JoinCoalesce::CoalesceColumns)
                .with_suffix(Some(RIGHT_SUFFIX.into())),
        )
        .select(exprs)
        .sort_by_exprs(
            vec![col(key)],
            SortMultipleOptions::default()
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .collect()?;
    Ok(Table::from(joined))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::from_rows(columns, rows).unwrap()
    }

    #[test]
    fn test_outer_join_keeps_unmatched_both_sides() {
        let left = sheet(&[CLIENT_ID, "A"], &[&["1", "a1"], &["2", "a2"]]);
        let right = sheet(&[CLIENT_ID, "B"], &[&["2", "b2"], &["3", "b3"]]);
        let joined = outer_join(&left, &right, CLIENT_ID).unwrap();
        assert_eq!(joined.columns(), [CLIENT_ID, "A", "B"]);
        assert_eq!(joined.height(), 3);
        assert_eq!(joined.value(0, "B"), Some(""));
        assert_eq!(joined.value(1, "B"), Some("b2"));
        assert_eq!(joined.value(2, CLIENT_ID), Some("3"));
        assert_eq!(joined.value(2, "A"), Some(""));
    }

    #[test]
    fn test_outer_join_coalesces_shared_columns() {
        let left = sheet(&[CLIENT_ID, FUNDER], &[&["1", ""], &["2", "OVC"]]);
        let right = sheet(&[CLIENT_ID, FUNDER], &[&["1", "HUD"], &["2", "DOJ"]]);
        let joined = outer_join(&left, &right, CLIENT_ID).unwrap();
        assert_eq!(joined.columns(), [CLIENT_ID, FUNDER]);
        assert_eq!(joined.value(0, FUNDER), Some("HUD"));
        assert_eq!(joined.value(1, FUNDER), Some("OVC"));
    }

    #[test]
    fn test_outer_join_sorts_by_key() {
        let left = sheet(&[CLIENT_ID, "A"], &[&["3", "a3"], &["1", "a1"], &["", "a-"]]);
        let right = sheet(&[CLIENT_ID, "B"], &[&["2", "b2"], &["", "b-"]]);
        let joined = outer_join(&left, &right, CLIENT_ID).unwrap();
        let ids: Vec<&str> = (0..joined.height())
            .map(|i| joined.value(i, CLIENT_ID).unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3", "", ""]);
        // keyless rows do not match each other
        let mut keyless: Vec<(&str, &str)> = (3..5)
            .map(|i| (joined.value(i, "A").unwrap(), joined.value(i, "B").unwrap()))
            .collect();
        keyless.sort();
        assert_eq!(keyless, vec![("", "b-"), ("a-", "")]);
    }

    #[test]
    fn test_merged_view_from_row_sheets() {
        let mut wb = Workbook::new();
        wb.insert(
            "Race - Rows",
            sheet(
                &[CLIENT_ID, RACE_ETHNICITY],
                &[&["1", "White"], &["2", "Black"], &["2", "Asian"]],
            ),
        );
        wb.insert(
            "Gender - Rows",
            sheet(&[CLIENT_ID, GENDER], &[&["1", "Female"], &["2", "Male"]]),
        );
        let merged = build_merged_view(&wb).unwrap().expect("merged view");
        assert_eq!(merged.height(), 2);
        assert_eq!(merged.value(1, RACE_ETHNICITY), Some("Black"));
        assert_eq!(merged.value(1, GENDER), Some("Male"));
    }

    #[test]
    fn test_merged_view_drops_unlisted_columns_and_sheets() {
        let mut wb = Workbook::new();
        wb.insert(
            "Gender - Rows",
            sheet(&["legacy id", GENDER, "Notes"], &[&["1", "Female", "x"]]),
        );
        wb.insert("Other", sheet(&[CLIENT_ID, PROGRAM], &[&["9", "Shelter"]]));
        let merged = build_merged_view(&wb).unwrap().expect("merged view");
        assert_eq!(merged.columns(), [CLIENT_ID, GENDER]);
        assert_eq!(merged.height(), 1);
    }

    #[test]
    fn test_no_merged_view_without_mapped_sheets() {
        let mut wb = Workbook::new();
        wb.insert("Clients", sheet(&[CLIENT_ID], &[&["1"]]));
        assert!(build_merged_view(&wb).unwrap().is_none());
        let views = build_views(&wb).unwrap();
        assert_eq!(views.default_view(), Some("Sheet: Clients"));
    }

    #[test]
    fn test_combined_sheet_preferred() {
        let mut wb = Workbook::new();
        wb.insert("Gender - Rows", sheet(&[CLIENT_ID, GENDER], &[&["1", "F"]]));
        wb.insert(
            COMBINED_SHEET,
            sheet(
                &["Legacy_Client_ID", CITIZENSHIP],
                &[&["1", "nicaraugua"], &["1", "Honduras"], &["2", "Mexico"]],
            ),
        );
        let views = build_views(&wb).unwrap();
        assert_eq!(views.default_view(), Some(COMBINED_VIEW));
        assert_eq!(
            views.ordered_names(),
            vec![
                COMBINED_VIEW.to_string(),
                MERGED_VIEW.to_string(),
                "Sheet: Gender - Rows".to_string(),
                format!("Sheet: {}", COMBINED_SHEET),
            ]
        );
        let merged = views.get(MERGED_VIEW).expect("merged");
        assert_eq!(merged.height(), 2);
        assert_eq!(merged.value(0, CITIZENSHIP), Some("Nicaragua"));
    }
}
