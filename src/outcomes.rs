// 📜 Guess Log - append-only record of every evaluated guess
// Rows are never updated or deleted; the stats view reads the newest page

use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

/// Upper bound on how many outcomes the stats view returns
pub const STATS_PAGE_SIZE: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessOutcome {
    pub id: String,
    pub submitted_name: String,
    pub matched: bool,
    pub secret_name: String,
    pub created_at: DateTime<Utc>,
}

impl GuessOutcome {
    pub fn new(submitted_name: &str, matched: bool, secret_name: &str, at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            submitted_name: submitted_name.to_string(),
            matched,
            secret_name: secret_name.to_string(),
            created_at: at,
        }
    }
}

/// Totals shown above the recent-guesses table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeSummary {
    pub total: i64,
    pub matched: i64,
}

pub fn append_outcome(conn: &Connection, outcome: &GuessOutcome) -> Result<()> {
    conn.execute(
        "INSERT INTO outcomes (outcome_id, submitted_name, matched, secret_name, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            outcome.id,
            outcome.submitted_name,
            outcome.matched,
            outcome.secret_name,
            // Fixed-width UTC so text ordering equals time ordering
            outcome.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        ],
    )?;

    Ok(())
}

/// Newest first, at most `STATS_PAGE_SIZE` rows
pub fn list_recent_outcomes(conn: &Connection, limit: usize) -> Result<Vec<GuessOutcome>> {
    let limit = limit.min(STATS_PAGE_SIZE) as i64;

    let mut stmt = conn.prepare(
        "SELECT outcome_id, submitted_name, matched, secret_name, created_at
         FROM outcomes
         ORDER BY created_at DESC, id DESC
         LIMIT ?1",
    )?;

    let outcomes = stmt
        .query_map(params![limit], |row| {
            let created_at_str: String = row.get(4)?;

            Ok(GuessOutcome {
                id: row.get(0)?,
                submitted_name: row.get(1)?,
                matched: row.get(2)?,
                secret_name: row.get(3)?,
                created_at: DateTime::parse_from_rfc3339(&created_at_str)
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            4,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?
                    .with_timezone(&Utc),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(outcomes)
}

pub fn outcome_summary(conn: &Connection) -> Result<OutcomeSummary> {
    let summary = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(matched), 0) FROM outcomes",
        [],
        |row| {
            Ok(OutcomeSummary {
                total: row.get(0)?,
                matched: row.get(1)?,
            })
        },
    )?;

    Ok(summary)
}
