//! Activity counter row queries.

use super::{parse_ts, AwardStore};
use crate::catalog::MetricKind;
use crate::counters::ActivityCounters;
use crate::error::AwardsResult;
use crate::types::UserId;
use rusqlite::{params, Connection, OptionalExtension};

pub(super) fn get(conn: &Connection, user_id: &str) -> AwardsResult<Option<ActivityCounters>> {
    conn.query_row(
        "SELECT user_id, doodle_count, comment_count, current_streak, max_streak,
                last_activity, doodles_liked_count, likes_received_count
         FROM activity_counters WHERE user_id = ?1",
        params![user_id],
        counters_row_mapper,
    )
    .optional()
    .map_err(Into::into)
}

pub(super) fn save(conn: &Connection, row: &ActivityCounters) -> AwardsResult<()> {
    conn.execute(
        "UPDATE activity_counters
         SET doodle_count = ?2, comment_count = ?3, current_streak = ?4,
             max_streak = ?5, last_activity = ?6,
             doodles_liked_count = ?7, likes_received_count = ?8
         WHERE user_id = ?1",
        params![
            row.user_id,
            row.doodle_count,
            row.comment_count,
            row.current_streak,
            row.max_streak,
            row.last_activity.map(|ts| ts.to_rfc3339()),
            row.doodles_liked_count,
            row.likes_received_count,
        ],
    )?;
    Ok(())
}

fn counters_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActivityCounters> {
    let last_activity = match row.get::<_, Option<String>>(5)? {
        Some(raw) => Some(parse_ts(5, &raw)?),
        None => None,
    };
    Ok(ActivityCounters {
        user_id: row.get(0)?,
        doodle_count: row.get(1)?,
        comment_count: row.get(2)?,
        current_streak: row.get(3)?,
        max_streak: row.get(4)?,
        last_activity,
        doodles_liked_count: row.get(6)?,
        likes_received_count: row.get(7)?,
    })
}

impl AwardStore {
    /// Seed the all-zero counter row for a new profile.
    /// Returns false when the profile already existed (idempotent retry).
    pub fn create_profile(&self, user_id: &str) -> AwardsResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO activity_counters (user_id) VALUES (?1)",
            params![user_id],
        )?;
        Ok(inserted > 0)
    }

    pub fn counters(&self, user_id: &str) -> AwardsResult<Option<ActivityCounters>> {
        get(&self.conn, user_id)
    }

    pub fn profile_count(&self) -> AwardsResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM activity_counters", [], |row| {
                row.get(0)
            })
            .map_err(Into::into)
    }

    /// Top users for one metric, highest first, ties broken by user id.
    /// Backing read for the leaderboard views; the streak board ranks by
    /// best-ever streak so a lapsed day does not knock a user off it.
    pub fn top_by_metric(
        &self,
        metric: MetricKind,
        limit: usize,
    ) -> AwardsResult<Vec<(UserId, i64)>> {
        let column = match metric {
            MetricKind::DoodleCount => "doodle_count",
            MetricKind::CommentCount => "comment_count",
            MetricKind::Streak => "max_streak",
            MetricKind::DoodlesLiked => "doodles_liked_count",
            MetricKind::LikesReceived => "likes_received_count",
        };
        let sql = format!(
            "SELECT user_id, {column} FROM activity_counters
             ORDER BY {column} DESC, user_id ASC LIMIT ?1"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
