//! Achievements engine for Doodle a Day.
//!
//! The engine owns exactly three things:
//!   - per-user activity counters (doodles, comments, likes, daily streak),
//!   - the badge catalog and unlock evaluation against those counters,
//!   - the award ledger that makes every unlock at-most-once.
//!
//! It does not own doodles, comments, likes, or notifications. Those live
//! with collaborators that report activity as [`action::ActivityAction`]s
//! and render what [`processor::ActionProcessor`] returns.
//!
//! RULES:
//!   - Only the store modules talk to SQLite.
//!   - Counters are mutated exclusively by the ActionProcessor.
//!   - One user's read-modify-write is one transaction; counters and
//!     awards commit together.
//!   - The catalog is loaded once at startup and never mutated at runtime.

pub mod action;
pub mod catalog;
pub mod counters;
pub mod error;
pub mod evaluator;
pub mod processor;
pub mod store;
pub mod streak;
pub mod types;
