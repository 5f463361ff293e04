// 🎮 One guess submission: lookup → daily pick → evaluate → log
// Each step runs in the order issued on the caller's connection

use crate::catalog::lookup_entry;
use crate::daily::pick_daily_from_store;
use crate::error::{FieldError, PokedleError, Result};
use crate::evaluate::{evaluate, GuessResult};
use crate::outcomes::append_outcome;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;

/// Play one guess against the secret for `date`.
///
/// Unknown names and an empty catalog fail before anything is logged;
/// every evaluated guess appends exactly one outcome, matched or not.
pub fn play_guess(
    conn: &Connection,
    name: &str,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<GuessResult> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PokedleError::InvalidField(vec![FieldError::new(
            "name",
            "Please enter a name",
        )]));
    }

    let guess = lookup_entry(conn, name)?;
    let secret = pick_daily_from_store(conn, date)?;

    let result = evaluate(&guess, &secret);
    append_outcome(conn, &result.to_outcome(now))?;

    tracing::info!(
        guess = %result.guess_name,
        matched = result.matched,
        mismatches = result.mismatches(),
        "guess evaluated"
    );

    Ok(result)
}
