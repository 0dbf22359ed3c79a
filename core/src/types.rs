//! Shared primitive types used across the entire engine.

/// A stable, unique identifier for a user profile. Minted by the
/// auth/profile layer; the engine never generates one.
pub type UserId = String;

/// The stable string key of a badge definition, e.g. "first_doodle".
pub type BadgeId = String;
