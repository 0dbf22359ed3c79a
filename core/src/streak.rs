//! Daily streak evaluation.
//!
//! Day difference is measured on UTC calendar days (both timestamps
//! truncated to their date), not on raw millisecond division. A doodle at
//! 23:50 followed by one at 00:10 the next day is a consecutive-day
//! continuation, never "same day".

use chrono::{DateTime, Utc};

/// The result of evaluating one streak-affecting action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    pub streak: i64,
    pub last_activity: DateTime<Utc>,
}

/// Compute the new streak value for an action happening at `now`.
///
/// - no previous activity: streak starts at 1
/// - same calendar day: streak unchanged
/// - next calendar day: streak + 1
/// - gap of two or more days: streak resets to 1
/// - `now` earlier than the previous activity (clock skew): streak
///   unchanged; skew never shrinks a streak
///
/// `last_activity` in the returned update is always `now`.
pub fn evaluate(
    previous_last_activity: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    previous_streak: i64,
) -> StreakUpdate {
    let streak = match previous_last_activity {
        None => 1,
        Some(prev) => {
            let day_diff = (now.date_naive() - prev.date_naive()).num_days();
            if day_diff == 1 {
                previous_streak + 1
            } else if day_diff > 1 {
                1
            } else {
                // day_diff <= 0: same day, or an out-of-order event
                previous_streak
            }
        }
    };
    StreakUpdate {
        streak,
        last_activity: now,
    }
}
