mod common;

use common::write_workbook;
use grantview::fields::{
    CITIZENSHIP, CLIENT_ID, FUNDER, GENDER, PROGRAM, RACE_ETHNICITY, VICTIMIZATION_TYPE,
};
use grantview::filter::Selection;
use grantview::normalize::BOTH_TRAFFICKING;
use grantview::views::{COMBINED_VIEW, MERGED_VIEW};
use grantview::Session;
use tempfile::TempDir;

const RACE: &[&[&str]] = &[
    &["Legacy Client ID", "Race/Ethnicity", "Funder"],
    &["1", "White", "OVC"],
    &["2", "Black, African American & Biracial", "HUD"],
    &["2", "Asian", "HUD"],
];

const GENDER_ROWS: &[&[&str]] = &[
    &["Legacy Client ID", "Gender"],
    &["1", "Female"],
    &["2", "Male"],
];

#[test]
fn test_merged_view_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(
        dir.path(),
        "export.xlsx",
        &[("Race - Rows", RACE), ("Gender - Rows", GENDER_ROWS)],
    );

    let mut session = Session::open(&path, 100).unwrap();
    assert_eq!(session.current_view_name(), Some(MERGED_VIEW));

    let merged = session.current();
    assert_eq!(merged.height(), 2);
    assert_eq!(merged.value(0, CLIENT_ID), Some("1"));
    assert_eq!(merged.value(1, CLIENT_ID), Some("2"));
    assert_eq!(
        merged.value(1, RACE_ETHNICITY),
        Some("Black, African American & Biracial")
    );
    assert_eq!(merged.value(1, GENDER), Some("Male"));
    assert_eq!(merged.value(1, FUNDER), Some("HUD"));

    session.set_selection(RACE_ETHNICITY, Some("Biracial")).unwrap();
    assert_eq!(session.summary().shown_clients, 1);
    session.set_selection(RACE_ETHNICITY, Some("African")).unwrap();
    assert_eq!(session.summary().shown_clients, 0);

    session.clear_filters().unwrap();
    let summary = session.summary();
    assert_eq!(summary.shown_rows, summary.total_rows);
    assert_eq!(summary.shown_clients, 2);
}

#[test]
fn test_raw_sheets_are_views_too() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(
        dir.path(),
        "export.xlsx",
        &[("Race - Rows", RACE), ("Gender - Rows", GENDER_ROWS)],
    );

    let mut session = Session::open(&path, 100).unwrap();
    assert_eq!(
        session.view_names(),
        vec![
            MERGED_VIEW.to_string(),
            "Sheet: Race - Rows".to_string(),
            "Sheet: Gender - Rows".to_string(),
        ]
    );
    session.select_view("Sheet: Gender - Rows").unwrap();
    assert_eq!(
        session.filters().get(RACE_ETHNICITY).unwrap().selection,
        Selection::Unavailable
    );
    assert_eq!(
        session.filters().get(GENDER).unwrap().options,
        vec!["Female".to_string(), "Male".to_string()]
    );
}

#[test]
fn test_combined_tab_is_preferred() {
    let dir = TempDir::new().unwrap();
    let combined: &[&[&str]] = &[
        &[
            "legacy_client_id",
            "Country of Citizenship",
            "Type of Victimization",
            "Program",
        ],
        &["10", "nicaraugua", "Sex Trafficking & Labor Trafficking", "Shelter"],
        &["10", "Honduras", "Sex Trafficking", "Shelter"],
        &["11", "Mexico", "", "Outreach"],
    ];
    let path = write_workbook(
        dir.path(),
        "export.xlsx",
        &[
            ("Gender - Rows", GENDER_ROWS),
            ("New Client Demographics", combined),
        ],
    );

    let session = Session::open(&path, 100).unwrap();
    assert_eq!(session.current_view_name(), Some(COMBINED_VIEW));
    assert_eq!(session.view_names()[0], COMBINED_VIEW);

    let view = session.current();
    assert_eq!(view.height(), 2);
    assert_eq!(view.value(0, CLIENT_ID), Some("10"));
    assert_eq!(view.value(0, CITIZENSHIP), Some("Nicaragua"));
    assert_eq!(view.value(0, VICTIMIZATION_TYPE), Some(BOTH_TRAFFICKING));
    assert_eq!(view.value(1, VICTIMIZATION_TYPE), Some(""));
    assert!(session.filters().get(PROGRAM).unwrap().is_available());
    assert!(!session.filters().get(GENDER).unwrap().is_available());
}

#[test]
fn test_merged_view_keeps_combined_bucket_after_selection() {
    let dir = TempDir::new().unwrap();
    let victimization: &[&[&str]] = &[
        &["Legacy Client ID", "Type of Victimization", "Victim Type"],
        &["1", "labor trafficking, sex trafficking", "Primary"],
    ];
    let path = write_workbook(
        dir.path(),
        "export.xlsx",
        &[("Victimization Type - Rows", victimization)],
    );

    let session = Session::open(&path, 100).unwrap();
    assert_eq!(session.current_view_name(), Some(MERGED_VIEW));
    assert_eq!(
        session.current().value(0, VICTIMIZATION_TYPE),
        Some(BOTH_TRAFFICKING)
    );
}

#[test]
fn test_workbook_without_mapped_sheets() {
    let dir = TempDir::new().unwrap();
    let intake: &[&[&str]] = &[&["Client", "Program"], &["a", "Shelter"], &["a", "Shelter"]];
    let path = write_workbook(dir.path(), "export.xlsx", &[("Intake", intake)]);

    let session = Session::open(&path, 100).unwrap();
    assert_eq!(session.current_view_name(), Some("Sheet: Intake"));
    // no identifier column: whole-row dedupe, counts fall back to rows
    assert_eq!(session.current().height(), 1);
    assert_eq!(session.summary().total_clients, 1);
    assert!(session.status().contains("no ID column"));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = Session::open(&dir.path().join("missing.xlsx"), 100).unwrap_err();
    assert!(err.to_string().contains("missing.xlsx"));
}
