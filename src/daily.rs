// 📅 Daily Selector - one catalog entry per calendar day
//
// Every player sees the same secret on the same day without the choice ever
// being stored: the date string is checksummed and reduced modulo the catalog size.
// The checksum is fixed; changing it changes which entry every past and future date selects.

use crate::catalog::{list_entries, CatalogEntry};
use crate::error::{PokedleError, Result};
use chrono::NaiveDate;
use rusqlite::Connection;

/// Calendar rendering fed to the checksum (8 digits, zero padded)
pub const DATE_KEY_FORMAT: &str = "%Y%m%d";

/// Sum of the code points of the date rendered as `YYYYMMDD`.
///
/// Only years 1000-9999 render as exactly 8 digits. Outside that range chrono
/// pads or signs the year (`00990101`, `+100000101`) and the checksum is taken
/// over that rendering as-is; it never panics.
pub fn date_checksum(date: NaiveDate) -> u32 {
    date.format(DATE_KEY_FORMAT)
        .to_string()
        .chars()
        .map(|c| c as u32)
        .sum()
}

/// Pick the daily secret from entries in their stable creation order
pub fn pick_daily(all_entries: &[CatalogEntry], date: NaiveDate) -> Result<&CatalogEntry> {
    if all_entries.is_empty() {
        return Err(PokedleError::EmptyCatalog);
    }

    let idx = date_checksum(date) as usize % all_entries.len();
    Ok(&all_entries[idx])
}

/// Load the ordered catalog and pick the secret for `date`
pub fn pick_daily_from_store(conn: &Connection, date: NaiveDate) -> Result<CatalogEntry> {
    let entries = list_entries(conn)?;
    pick_daily(&entries, date).cloned()
}
