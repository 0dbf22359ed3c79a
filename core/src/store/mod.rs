//! SQLite persistence layer.
//!
//! RULE: Only the store modules talk to the database.
//! The processor calls store methods and never executes SQL directly.

mod awards;
mod counters;

pub use awards::AwardRow;

use crate::error::AwardsResult;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior};
use std::collections::HashSet;

pub struct AwardStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl AwardStore {
    pub fn open(path: &str) -> AwardsResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> AwardsResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases, this returns a new in-memory database (isolated).
    /// For file-based databases, this opens the same file.
    pub fn reopen(&self) -> AwardsResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> AwardsResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_counters.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_awards.sql"))?;
        Ok(())
    }

    /// Run one user's read-modify-write as a single transaction.
    ///
    /// IMMEDIATE takes the write lock at BEGIN, so two writers racing on
    /// the same row serialize instead of both reading the stale value.
    /// An Err from the closure rolls everything back: counters and awards
    /// land together or not at all.
    pub fn with_user_tx<T>(
        &mut self,
        body: impl FnOnce(&StoreTx<'_>) -> AwardsResult<T>,
    ) -> AwardsResult<T> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = body(&StoreTx { conn: &tx })?;
        tx.commit()?;
        Ok(out)
    }
}

/// The store surface visible inside a per-user transaction.
pub struct StoreTx<'a> {
    conn: &'a Connection,
}

impl StoreTx<'_> {
    pub fn counters(
        &self,
        user_id: &str,
    ) -> AwardsResult<Option<crate::counters::ActivityCounters>> {
        counters::get(self.conn, user_id)
    }

    pub fn save_counters(&self, row: &crate::counters::ActivityCounters) -> AwardsResult<()> {
        counters::save(self.conn, row)
    }

    pub fn earned_badge_ids(&self, user_id: &str) -> AwardsResult<HashSet<String>> {
        awards::earned_ids(self.conn, user_id)
    }

    /// Insert one award row. Returns false when the badge was already in
    /// the ledger (the ignorable duplicate).
    pub fn insert_award(
        &self,
        user_id: &str,
        badge_id: &str,
        awarded_at: DateTime<Utc>,
    ) -> AwardsResult<bool> {
        awards::insert(self.conn, user_id, badge_id, awarded_at)
    }
}

/// Timestamps are stored as RFC 3339 TEXT. Parse failures surface as
/// rusqlite conversion errors so row mappers stay uniform.
pub(crate) fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}
