//! Per-user activity counters: the row the action processor mutates.
//!
//! RULE: counters only move up. There is no decrement path; deleting a
//! doodle or removing a like does not claw back progress, so badge
//! requirements stay satisfied once reached.

use crate::catalog::MetricKind;
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityCounters {
    pub user_id: UserId,
    pub doodle_count: i64,
    pub comment_count: i64,
    pub current_streak: i64,
    /// Highest streak ever reached; survives streak resets.
    pub max_streak: i64,
    /// Timestamp of the last streak-affecting action. None until the
    /// first doodle or comment.
    pub last_activity: Option<DateTime<Utc>>,
    pub doodles_liked_count: i64,
    pub likes_received_count: i64,
}

impl ActivityCounters {
    /// The all-zero row seeded at profile creation.
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            doodle_count: 0,
            comment_count: 0,
            current_streak: 0,
            max_streak: 0,
            last_activity: None,
            doodles_liked_count: 0,
            likes_received_count: 0,
        }
    }

    /// The counter value a badge requirement for `metric` is measured against.
    pub fn metric_value(&self, metric: MetricKind) -> i64 {
        match metric {
            MetricKind::DoodleCount => self.doodle_count,
            MetricKind::CommentCount => self.comment_count,
            MetricKind::Streak => self.current_streak,
            MetricKind::DoodlesLiked => self.doodles_liked_count,
            MetricKind::LikesReceived => self.likes_received_count,
        }
    }
}
