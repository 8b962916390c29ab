use crate::fields::{CLIENT_ID, CLIENT_ID_ALIASES};
use crate::table::Table;

/// Make sure the client identifier lives under its canonical name.
///
/// Tables that already have [`CLIENT_ID`] are left alone. Otherwise the first
/// column whose trimmed, lowercased header is a known alias is renamed. Tables
/// with no recognizable identifier pass through unchanged.
pub fn ensure_id_column(table: &mut Table) {
    if table.has_column(CLIENT_ID) {
        return;
    }
    let alias = table
        .columns()
        .iter()
        .find(|c| CLIENT_ID_ALIASES.contains(&c.trim().to_lowercase().as_str()))
        .cloned();
    if let Some(alias) = alias {
        log::debug!("renaming column '{}' to '{}'", alias, CLIENT_ID);
        table.rename_column(&alias, CLIENT_ID);
    }
}
