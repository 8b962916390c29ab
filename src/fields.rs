//! Column names of the grant-reporting export.

/// Canonical client identifier column.
pub const CLIENT_ID: &str = "Legacy Client ID";

/// Header spellings (trimmed, lowercase) that are renamed to [`CLIENT_ID`].
pub const CLIENT_ID_ALIASES: &[&str] = &["legacy client id", "legacy_client_id", "legacy id"];

pub const FUNDER: &str = "Funder";
pub const VICTIMIZATION_TYPE: &str = "Type of Victimization";
pub const GENDER: &str = "Gender";
pub const HOMELESSNESS: &str = "Homelessness";
pub const PROGRAM: &str = "Program";
pub const RACE_ETHNICITY: &str = "Race/Ethnicity";
pub const VICTIM_TYPE: &str = "Victim Type";
pub const AGE_AT_TRAFFICKING: &str = "Age at Time of Trafficking";
pub const VETERAN_STATUS: &str = "Veteran Status";
pub const LGBTQ: &str = "LGBTQ/Two-Spirited";
pub const DISABILITY: &str = "Disability";
pub const IMMIGRANT_STATUS: &str = "Immigrant Status";
pub const CITIZENSHIP: &str = "Country of Citizenship";
pub const PRIMARY_LANGUAGE: &str = "Primary Language";
pub const DATE_OF_BIRTH: &str = "Date of Birth";

/// Grant filter fields, in display order.
pub const FILTER_FIELDS: [&str; 14] = [
    FUNDER,
    VICTIMIZATION_TYPE,
    GENDER,
    HOMELESSNESS,
    PROGRAM,
    RACE_ETHNICITY,
    VICTIM_TYPE,
    AGE_AT_TRAFFICKING,
    VETERAN_STATUS,
    LGBTQ,
    DISABILITY,
    IMMIGRANT_STATUS,
    CITIZENSHIP,
    PRIMARY_LANGUAGE,
];

/// Fields whose cells may hold several entries joined by `|`, `,` or `&`.
/// The same set has its blanks coerced during value normalization.
pub const MULTI_SELECT_FIELDS: [&str; 5] = [
    RACE_ETHNICITY,
    DISABILITY,
    VICTIM_TYPE,
    HOMELESSNESS,
    AGE_AT_TRAFFICKING,
];

pub fn is_multi_select(field: &str) -> bool {
    MULTI_SELECT_FIELDS.contains(&field)
}

/// Preview column order: the identifier first, then the filter fields.
pub fn preview_columns() -> impl Iterator<Item = &'static str> {
    std::iter::once(CLIENT_ID).chain(FILTER_FIELDS)
}
