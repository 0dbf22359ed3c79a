//! Badge catalog: the versioned, ordered list of badge definitions.
//!
//! RULE: the catalog is loaded once at startup and never mutated while the
//! engine runs. Adding a badge is a catalog edit plus restart, not a schema
//! change. Catalog order is display order and award order.

use crate::error::{AwardsError, AwardsResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which per-user counter a badge requirement is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    DoodleCount,
    CommentCount,
    Streak,
    DoodlesLiked,
    LikesReceived,
}

impl MetricKind {
    /// Stable name used in logs and runner output.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::DoodleCount => "doodle_count",
            MetricKind::CommentCount => "comment_count",
            MetricKind::Streak => "streak",
            MetricKind::DoodlesLiked => "doodles_liked",
            MetricKind::LikesReceived => "likes_received",
        }
    }
}

/// One entry in the badge catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub metric: MetricKind,
    /// Counter value at which the badge unlocks (reached-or-exceeded).
    pub requirement: i64,
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogFile {
    catalog_version: String,
    badges: Vec<BadgeDefinition>,
}

/// The immutable badge list the evaluator walks.
#[derive(Debug, Clone)]
pub struct BadgeCatalog {
    version: String,
    badges: Vec<BadgeDefinition>,
}

impl BadgeCatalog {
    /// Build a catalog from an ordered definition list.
    /// Rejects duplicate ids and non-positive requirements.
    pub fn new(version: &str, badges: Vec<BadgeDefinition>) -> AwardsResult<Self> {
        let mut seen: HashSet<&str> = HashSet::new();
        for badge in &badges {
            if !seen.insert(badge.id.as_str()) {
                return Err(AwardsError::Catalog {
                    reason: format!("duplicate badge id '{}'", badge.id),
                });
            }
            if badge.requirement <= 0 {
                return Err(AwardsError::Catalog {
                    reason: format!(
                        "badge '{}' has requirement {}, must be positive",
                        badge.id, badge.requirement
                    ),
                });
            }
        }
        Ok(Self {
            version: version.to_string(),
            badges,
        })
    }

    /// Load from the data/ directory.
    /// In tests, use BadgeCatalog::builtin().
    pub fn load(data_dir: &str) -> AwardsResult<Self> {
        let path = format!("{data_dir}/badges/badge_catalog.json");
        let content = std::fs::read_to_string(&path).map_err(|e| AwardsError::Catalog {
            reason: format!("Cannot read {path}: {e}"),
        })?;
        let file: CatalogFile = serde_json::from_str(&content)?;
        Self::new(&file.catalog_version, file.badges)
    }

    /// The catalog shipped with the app, compiled in. Matches the contents
    /// of data/badges/badge_catalog.json.
    pub fn builtin() -> Self {
        Self {
            version: "2024.1".to_string(),
            badges: builtin_badges(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.badges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.badges.is_empty()
    }

    /// Definitions in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, BadgeDefinition> {
        self.badges.iter()
    }

    pub fn get(&self, badge_id: &str) -> Option<&BadgeDefinition> {
        self.badges.iter().find(|b| b.id == badge_id)
    }
}

fn def(
    id: &str,
    name: &str,
    description: &str,
    icon: &str,
    metric: MetricKind,
    requirement: i64,
) -> BadgeDefinition {
    BadgeDefinition {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        metric,
        requirement,
    }
}

fn builtin_badges() -> Vec<BadgeDefinition> {
    vec![
        def(
            "first_doodle",
            "First Creation",
            "Created your first doodle",
            "🎨",
            MetricKind::DoodleCount,
            1,
        ),
        def(
            "doodle_collector_10",
            "Doodle Collector",
            "Created 10 doodles",
            "🖼️",
            MetricKind::DoodleCount,
            10,
        ),
        def(
            "doodle_master_100",
            "Doodle Master",
            "Created 100 doodles",
            "🏆",
            MetricKind::DoodleCount,
            100,
        ),
        def(
            "first_comment",
            "Commentator",
            "Left your first comment",
            "💬",
            MetricKind::CommentCount,
            1,
        ),
        def(
            "first_streak",
            "Consistency",
            "Kept a 3-day doodle streak",
            "🔥",
            MetricKind::Streak,
            3,
        ),
        def(
            "streak_master",
            "Streak Master",
            "Kept a 7-day doodle streak",
            "🔥🔥",
            MetricKind::Streak,
            7,
        ),
        def(
            "liker_1",
            "First Liker",
            "Liked your first doodle",
            "👍",
            MetricKind::DoodlesLiked,
            1,
        ),
        def(
            "liker_10",
            "Thumbs Up",
            "Liked 10 doodles",
            "👍👍",
            MetricKind::DoodlesLiked,
            10,
        ),
        def(
            "liker_100",
            "Big Fan",
            "Liked 100 doodles",
            "💖",
            MetricKind::DoodlesLiked,
            100,
        ),
        def(
            "liked_1",
            "First Like",
            "Received your first like",
            "⭐",
            MetricKind::LikesReceived,
            1,
        ),
        def(
            "liked_10",
            "Popular",
            "Received 10 likes",
            "🌟",
            MetricKind::LikesReceived,
            10,
        ),
        def(
            "liked_100",
            "Superstar",
            "Received 100 likes",
            "✨",
            MetricKind::LikesReceived,
            100,
        ),
    ]
}
