//! Canonicalization of the free-text fields that arrive inconsistent from the export.

use color_eyre::Result;

use crate::fields::{CITIZENSHIP, MULTI_SELECT_FIELDS, VICTIMIZATION_TYPE};
use crate::table::Table;

pub const BOTH_TRAFFICKING: &str = "Both Sex & Labor Trafficking";
pub const SEX_TRAFFICKING: &str = "Sex Trafficking";
pub const LABOR_TRAFFICKING: &str = "Labor Trafficking";
pub const OTHER_EXPLOITATION: &str = "Other/Exploitation";

const BUCKETS: [&str; 4] = [
    BOTH_TRAFFICKING,
    SEX_TRAFFICKING,
    LABOR_TRAFFICKING,
    OTHER_EXPLOITATION,
];

/// Known misspellings of Nicaragua, trimmed and lowercased.
const NICARAGUA_SPELLINGS: &[&str] = &["nicaragua", "nicaraugua", "niceragua", "nicaragua."];

/// `true` for values that carry no information: empty or the literal `nan`.
pub fn is_null_like(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v.eq_ignore_ascii_case("nan")
}

/// Bucket a victimization description.
///
/// The combined bucket is checked before the single categories, so text that
/// mentions both kinds of trafficking never lands in either single bucket.
/// A value that already names a bucket keeps it, so views can be normalized
/// more than once.
pub fn normalize_victimization(value: &str) -> String {
    if let Some(bucket) = BUCKETS.iter().find(|b| b.eq_ignore_ascii_case(value.trim())) {
        return bucket.to_string();
    }
    let lower = value.to_lowercase();
    let sex = lower.contains("sex trafficking");
    let labor = lower.contains("labor trafficking");
    let bucket = match (sex, labor) {
        (true, true) => BOTH_TRAFFICKING,
        (true, false) => SEX_TRAFFICKING,
        (false, true) => LABOR_TRAFFICKING,
        (false, false) if is_null_like(value) => "",
        (false, false) => OTHER_EXPLOITATION,
    };
    bucket.to_string()
}

pub fn normalize_citizenship(value: &str) -> String {
    let trimmed = value.trim();
    if NICARAGUA_SPELLINGS.contains(&trimmed.to_lowercase().as_str()) {
        "Nicaragua".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Blank-coerce a multi-value field without splitting it.
pub fn normalize_jumbled(value: &str) -> String {
    if is_null_like(value) {
        String::new()
    } else {
        value.trim().to_string()
    }
}

/// Apply every field normalization whose column is present. Values that
/// normalize to nothing become null.
pub fn apply_normalizations(table: &mut Table) -> Result<()> {
    if table.has_column(VICTIMIZATION_TYPE) {
        log::debug!("normalizing '{}'", VICTIMIZATION_TYPE);
        table.map_column(VICTIMIZATION_TYPE, normalize_victimization)?;
    }
    if table.has_column(CITIZENSHIP) {
        log::debug!("standardizing '{}'", CITIZENSHIP);
        table.map_column(CITIZENSHIP, normalize_citizenship)?;
    }
    for field in MULTI_SELECT_FIELDS {
        table.map_column(field, normalize_jumbled)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_victimization_buckets() {
        assert_eq!(normalize_victimization("Sex Trafficking"), SEX_TRAFFICKING);
        assert_eq!(
            normalize_victimization("labor trafficking, debt bondage"),
            LABOR_TRAFFICKING
        );
        assert_eq!(normalize_victimization("Forced criminality"), OTHER_EXPLOITATION);
        assert_eq!(normalize_victimization(""), "");
        assert_eq!(normalize_victimization(" NaN "), "");
    }

    #[test]
    fn test_victimization_combined_wins() {
        for raw in [
            "Sex Trafficking & Labor Trafficking",
            "LABOR TRAFFICKING, SEX TRAFFICKING",
            "both: sex trafficking|labor trafficking",
        ] {
            assert_eq!(normalize_victimization(raw), BOTH_TRAFFICKING, "{}", raw);
        }
    }

    #[test]
    fn test_victimization_is_idempotent_on_buckets() {
        for bucket in [
            BOTH_TRAFFICKING,
            SEX_TRAFFICKING,
            LABOR_TRAFFICKING,
            OTHER_EXPLOITATION,
        ] {
            assert_eq!(normalize_victimization(bucket), bucket);
        }
    }

    #[test]
    fn test_citizenship_misspellings() {
        for raw in [
            "Nicaragua",
            "nicaragua",
            "Nicaraugua",
            "NICERAGUA",
            "Nicaragua.",
            " nicaragua ",
        ] {
            assert_eq!(normalize_citizenship(raw), "Nicaragua", "{}", raw);
        }
        assert_eq!(normalize_citizenship(" Honduras "), "Honduras");
        assert_eq!(normalize_citizenship(""), "");
    }

    #[test]
    fn test_jumbled_blank_coercion() {
        assert_eq!(normalize_jumbled("nan"), "");
        assert_eq!(normalize_jumbled("NAN"), "");
        assert_eq!(normalize_jumbled("   "), "");
        assert_eq!(normalize_jumbled("  Black | White "), "Black | White");
    }

    #[test]
    fn test_apply_normalizations_only_touches_known_columns() {
        let rows: &[&[&str]] = &[&["sex trafficking", "niceragua", " nan ", " keep me "]];
        let mut t = Table::from_rows(
            &[VICTIMIZATION_TYPE, CITIZENSHIP, "Race/Ethnicity", "Notes"],
            rows,
        )
        .unwrap();
        apply_normalizations(&mut t).unwrap();
        assert_eq!(t.value(0, VICTIMIZATION_TYPE), Some(SEX_TRAFFICKING));
        assert_eq!(t.value(0, CITIZENSHIP), Some("Nicaragua"));
        assert_eq!(t.value(0, "Race/Ethnicity"), Some(""));
        assert_eq!(t.frame().column("Race/Ethnicity").unwrap().null_count(), 1);
        assert_eq!(t.value(0, "Notes"), Some(" keep me "));
    }
}
