//! The action processor, where every activity action lands.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Validate ids
//!   2. Open the per-user transaction
//!   3. Apply the counter delta
//!   4. Streak evaluation (doodles and comments only)
//!   5. Badge evaluation against the award ledger
//!   6. Persist counters and new awards, commit
//!
//! RULES:
//!   - The processor is the only writer of counters and awards.
//!   - One user's counters and awards commit together or not at all.
//!   - like_given and like_received touch disjoint rows; nothing couples
//!     the liker's transaction to the recipient's.
//!   - A failed action leaves no partial state behind.

use crate::{
    action::ActivityAction,
    catalog::{BadgeCatalog, BadgeDefinition},
    counters::ActivityCounters,
    error::{AwardsError, AwardsResult},
    evaluator,
    store::AwardStore,
    streak,
    types::UserId,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

pub struct ActionProcessor {
    store: AwardStore,
    catalog: BadgeCatalog,
}

/// What one processed action changed.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub actor_id: UserId,
    /// The actor's counters after the action. None for like_received,
    /// where the actor's row is never touched or read.
    pub counters: Option<ActivityCounters>,
    /// Badges the actor earned from this action, in catalog order.
    pub new_badges: Vec<BadgeDefinition>,
    /// Set only for like_received, so unlock notifications route to the
    /// doodle owner rather than the liker.
    pub recipient: Option<RecipientOutcome>,
}

/// The recipient-side effect of a like_received action.
#[derive(Debug, Clone, Serialize)]
pub struct RecipientOutcome {
    pub user_id: UserId,
    pub counters: ActivityCounters,
    pub new_badges: Vec<BadgeDefinition>,
}

/// Everything the profile badge tab renders in one shot.
#[derive(Debug, Clone, Serialize)]
pub struct BadgeStatus {
    /// Every catalog entry with its earned flag and progress, in catalog order.
    pub all: Vec<BadgeStatusEntry>,
    /// The earned subset with award timestamps, oldest first.
    pub earned: Vec<EarnedBadge>,
    pub counters: ActivityCounters,
}

#[derive(Debug, Clone, Serialize)]
pub struct BadgeStatusEntry {
    pub definition: BadgeDefinition,
    pub earned: bool,
    /// Percentage toward the requirement, clamped to 100.
    pub progress: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct EarnedBadge {
    pub definition: BadgeDefinition,
    pub awarded_at: DateTime<Utc>,
}

struct UserUpdate {
    counters: ActivityCounters,
    new_badges: Vec<BadgeDefinition>,
}

impl ActionProcessor {
    pub fn new(store: AwardStore, catalog: BadgeCatalog) -> Self {
        Self { store, catalog }
    }

    /// Seed the all-zero counter row for a freshly created profile.
    /// Returns false when the row already existed.
    pub fn create_profile(&self, user_id: &str) -> AwardsResult<bool> {
        if user_id.trim().is_empty() {
            return Err(AwardsError::InvalidAction {
                reason: "user id is empty".to_string(),
            });
        }
        let created = self.store.create_profile(user_id)?;
        if created {
            log::info!("profile created for user={user_id}");
        }
        Ok(created)
    }

    /// Process one activity action at the current wall-clock time.
    pub fn process(
        &mut self,
        actor_id: &str,
        action: ActivityAction,
    ) -> AwardsResult<ProcessOutcome> {
        self.process_at(actor_id, action, Utc::now())
    }

    /// Process one activity action at an explicit timestamp.
    /// Split out so tests and the replay runner control the clock.
    pub fn process_at(
        &mut self,
        actor_id: &str,
        action: ActivityAction,
        now: DateTime<Utc>,
    ) -> AwardsResult<ProcessOutcome> {
        if actor_id.trim().is_empty() {
            return Err(AwardsError::InvalidAction {
                reason: "actor id is empty".to_string(),
            });
        }
        log::debug!("processing {} for user={actor_id}", action.kind_name());

        match action {
            ActivityAction::LikeReceived { ref recipient_id } => {
                if recipient_id.trim().is_empty() {
                    return Err(AwardsError::InvalidAction {
                        reason: "like_received without a recipient id".to_string(),
                    });
                }
                let update = self.apply_to_user(recipient_id, &action, now)?;
                Ok(ProcessOutcome {
                    actor_id: actor_id.to_string(),
                    counters: None,
                    new_badges: Vec::new(),
                    recipient: Some(RecipientOutcome {
                        user_id: recipient_id.clone(),
                        counters: update.counters,
                        new_badges: update.new_badges,
                    }),
                })
            }
            _ => {
                let update = self.apply_to_user(actor_id, &action, now)?;
                Ok(ProcessOutcome {
                    actor_id: actor_id.to_string(),
                    counters: Some(update.counters),
                    new_badges: update.new_badges,
                    recipient: None,
                })
            }
        }
    }

    /// The read-modify-write for one user's row, as one transaction.
    /// For like_received this runs against the recipient, and the delta
    /// lands on their likes_received_count.
    fn apply_to_user(
        &mut self,
        user_id: &str,
        action: &ActivityAction,
        now: DateTime<Utc>,
    ) -> AwardsResult<UserUpdate> {
        let catalog = &self.catalog;
        self.store.with_user_tx(|tx| {
            let mut counters =
                tx.counters(user_id)?
                    .ok_or_else(|| AwardsError::ProfileNotFound {
                        user_id: user_id.to_string(),
                    })?;

            apply_counter_delta(&mut counters, action);

            if action.advances_streak() {
                let update = streak::evaluate(counters.last_activity, now, counters.current_streak);
                if update.streak != counters.current_streak {
                    log::debug!(
                        "user={user_id} streak {} -> {}",
                        counters.current_streak,
                        update.streak
                    );
                }
                counters.current_streak = update.streak;
                counters.max_streak = counters.max_streak.max(update.streak);
                counters.last_activity = Some(update.last_activity);
            }

            let earned = tx.earned_badge_ids(user_id)?;
            let new_badges: Vec<BadgeDefinition> =
                evaluator::newly_satisfied(&counters, &earned, catalog)
                    .into_iter()
                    .cloned()
                    .collect();

            tx.save_counters(&counters)?;
            for badge in &new_badges {
                if tx.insert_award(user_id, &badge.id, now)? {
                    log::info!("user={user_id} earned badge '{}' ({})", badge.id, badge.name);
                } else {
                    // A concurrent writer got there first. The ledger
                    // already holds the row, which is the required state.
                    log::warn!(
                        "user={user_id} badge '{}' was already in the ledger",
                        badge.id
                    );
                }
            }

            Ok(UserUpdate {
                counters,
                new_badges,
            })
        })
    }

    /// The full badge picture for one user: catalog entries with earned
    /// flags and progress, the earned subset with timestamps, and the raw
    /// counters. Read-only.
    pub fn badge_status(&self, user_id: &str) -> AwardsResult<BadgeStatus> {
        let counters =
            self.store
                .counters(user_id)?
                .ok_or_else(|| AwardsError::ProfileNotFound {
                    user_id: user_id.to_string(),
                })?;
        let ledger = self.store.awards_for_user(user_id)?;
        let awarded_at: HashMap<&str, DateTime<Utc>> = ledger
            .iter()
            .map(|row| (row.badge_id.as_str(), row.awarded_at))
            .collect();

        let all: Vec<BadgeStatusEntry> = self
            .catalog
            .iter()
            .map(|badge| BadgeStatusEntry {
                earned: awarded_at.contains_key(badge.id.as_str()),
                progress: evaluator::progress_toward(badge, &counters),
                definition: badge.clone(),
            })
            .collect();

        // Ledger rows whose badge id has left the catalog are kept in the
        // ledger but not displayed.
        let earned: Vec<EarnedBadge> = ledger
            .iter()
            .filter_map(|row| {
                self.catalog.get(&row.badge_id).map(|def| EarnedBadge {
                    definition: def.clone(),
                    awarded_at: row.awarded_at,
                })
            })
            .collect();

        Ok(BadgeStatus {
            all,
            earned,
            counters,
        })
    }

    pub fn catalog(&self) -> &BadgeCatalog {
        &self.catalog
    }

    /// Direct store access for read-side queries (leaderboards, summaries).
    pub fn store(&self) -> &AwardStore {
        &self.store
    }
}

fn apply_counter_delta(counters: &mut ActivityCounters, action: &ActivityAction) {
    match action {
        ActivityAction::DoodleCreated => counters.doodle_count += 1,
        ActivityAction::CommentAdded => counters.comment_count += 1,
        ActivityAction::LikeGiven => counters.doodles_liked_count += 1,
        // Applied to the recipient's row, never the liker's.
        ActivityAction::LikeReceived { .. } => counters.likes_received_count += 1,
    }
}
