//! Badge award ledger queries.
//!
//! The (user_id, badge_id) primary key is the duplicate-award guard that
//! survives races: a second insert becomes an OR IGNORE no-op.

use super::{parse_ts, AwardStore};
use crate::error::AwardsResult;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::collections::HashSet;

/// One row of the award ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct AwardRow {
    pub badge_id: String,
    pub awarded_at: DateTime<Utc>,
}

pub(super) fn earned_ids(conn: &Connection, user_id: &str) -> AwardsResult<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT badge_id FROM badge_award WHERE user_id = ?1")?;
    let ids = stmt
        .query_map(params![user_id], |row| row.get(0))?
        .collect::<Result<HashSet<_>, _>>()?;
    Ok(ids)
}

pub(super) fn insert(
    conn: &Connection,
    user_id: &str,
    badge_id: &str,
    awarded_at: DateTime<Utc>,
) -> AwardsResult<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO badge_award (user_id, badge_id, awarded_at)
         VALUES (?1, ?2, ?3)",
        params![user_id, badge_id, awarded_at.to_rfc3339()],
    )?;
    Ok(inserted > 0)
}

impl AwardStore {
    pub fn earned_badge_ids(&self, user_id: &str) -> AwardsResult<HashSet<String>> {
        earned_ids(&self.conn, user_id)
    }

    /// Ledger rows for one user, oldest award first.
    pub fn awards_for_user(&self, user_id: &str) -> AwardsResult<Vec<AwardRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT badge_id, awarded_at FROM badge_award
             WHERE user_id = ?1
             ORDER BY awarded_at ASC, badge_id ASC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            let raw: String = row.get(1)?;
            Ok(AwardRow {
                badge_id: row.get(0)?,
                awarded_at: parse_ts(1, &raw)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn award_count(&self, user_id: &str) -> AwardsResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM badge_award WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    /// Direct ledger insert, bypassing evaluation. Returns false on the
    /// ignorable duplicate. Used by backfills and tests.
    pub fn insert_award(
        &self,
        user_id: &str,
        badge_id: &str,
        awarded_at: DateTime<Utc>,
    ) -> AwardsResult<bool> {
        insert(&self.conn, user_id, badge_id, awarded_at)
    }
}
