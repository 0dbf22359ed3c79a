use crate::types::UserId;
use serde::{Deserialize, Serialize};

/// All activity actions the processor accepts.
/// A closed set: an unrecognized action name fails at the serde boundary
/// instead of silently dispatching to nothing.
///
/// Collaborators fire an action only after the underlying entity (doodle,
/// comment, like) is durably created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActivityAction {
    DoodleCreated,
    CommentAdded,
    /// The acting user liked someone else's doodle.
    LikeGiven,
    /// Someone liked a doodle owned by `recipient_id`. Credits the
    /// recipient, not the caller.
    LikeReceived { recipient_id: UserId },
}

impl ActivityAction {
    /// Stable wire name, used in logs and runner output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ActivityAction::DoodleCreated => "doodle_created",
            ActivityAction::CommentAdded => "comment_added",
            ActivityAction::LikeGiven => "like_given",
            ActivityAction::LikeReceived { .. } => "like_received",
        }
    }

    /// Whether this action counts as daily creative activity. Only these
    /// advance the streak and stamp last_activity; giving or receiving
    /// likes never does.
    pub fn advances_streak(&self) -> bool {
        matches!(
            self,
            ActivityAction::DoodleCreated | ActivityAction::CommentAdded
        )
    }
}
