//! Error taxonomy: invalid actions, missing profiles, catalog validation,
//! and the wire format of the action enum.

use chrono::{DateTime, TimeZone, Utc};
use doodleaday_core::{
    action::ActivityAction,
    catalog::{BadgeCatalog, BadgeDefinition, MetricKind},
    error::AwardsError,
    processor::ActionProcessor,
    store::AwardStore,
};

fn processor() -> ActionProcessor {
    let store = AwardStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    ActionProcessor::new(store, BadgeCatalog::builtin())
}

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
}

fn badge(id: &str, metric: MetricKind, requirement: i64) -> BadgeDefinition {
    BadgeDefinition {
        id: id.to_string(),
        name: id.to_string(),
        description: String::new(),
        icon: "🎖️".to_string(),
        metric,
        requirement,
    }
}

/// Empty and whitespace-only actor ids are rejected before any work.
#[test]
fn empty_actor_id_is_invalid() {
    let mut p = processor();

    let err = p
        .process_at("", ActivityAction::DoodleCreated, day(1))
        .unwrap_err();
    assert!(matches!(err, AwardsError::InvalidAction { .. }), "got {err:?}");

    let err = p
        .process_at("   ", ActivityAction::CommentAdded, day(1))
        .unwrap_err();
    assert!(matches!(err, AwardsError::InvalidAction { .. }), "got {err:?}");
}

/// Profile creation rejects empty ids too.
#[test]
fn empty_profile_id_is_invalid() {
    let p = processor();
    let err = p.create_profile("").unwrap_err();
    assert!(matches!(err, AwardsError::InvalidAction { .. }), "got {err:?}");
}

/// Actions for a user without a counter row name the user in the error.
#[test]
fn unknown_user_is_profile_not_found() {
    let mut p = processor();

    let err = p
        .process_at("ghost", ActivityAction::DoodleCreated, day(1))
        .unwrap_err();
    match err {
        AwardsError::ProfileNotFound { user_id } => assert_eq!(user_id, "ghost"),
        other => panic!("expected ProfileNotFound, got {other:?}"),
    }

    let err = p.badge_status("ghost").unwrap_err();
    assert_eq!(err.to_string(), "No activity counters for user 'ghost'");
}

/// like_received without a usable recipient id is an invalid action;
/// with an unknown recipient it is ProfileNotFound for the recipient.
#[test]
fn like_received_requires_a_known_recipient() {
    let mut p = processor();
    p.create_profile("liker").unwrap();

    let err = p
        .process_at("liker", ActivityAction::LikeReceived { recipient_id: String::new() }, day(1))
        .unwrap_err();
    assert!(matches!(err, AwardsError::InvalidAction { .. }), "got {err:?}");

    let err = p
        .process_at(
            "liker",
            ActivityAction::LikeReceived {
                recipient_id: "ghost".to_string(),
            },
            day(1),
        )
        .unwrap_err();
    match err {
        AwardsError::ProfileNotFound { user_id } => assert_eq!(user_id, "ghost"),
        other => panic!("expected ProfileNotFound, got {other:?}"),
    }
    assert!(
        p.store().counters("ghost").unwrap().is_none(),
        "the failed action must not create a row as a side effect"
    );
}

/// Duplicate badge ids fail catalog validation.
#[test]
fn catalog_rejects_duplicate_ids() {
    let badges = vec![
        badge("dup", MetricKind::DoodleCount, 1),
        badge("dup", MetricKind::CommentCount, 2),
    ];
    let err = BadgeCatalog::new("test", badges).unwrap_err();
    assert!(matches!(err, AwardsError::Catalog { .. }), "got {err:?}");
    assert!(err.to_string().contains("dup"), "error names the id: {err}");
}

/// Requirements must be positive; zero or negative thresholds would
/// unlock for everyone at profile creation.
#[test]
fn catalog_rejects_non_positive_requirements() {
    for requirement in [0, -3] {
        let badges = vec![badge("bad", MetricKind::DoodleCount, requirement)];
        let err = BadgeCatalog::new("test", badges).unwrap_err();
        assert!(
            matches!(err, AwardsError::Catalog { .. }),
            "requirement {requirement}: got {err:?}"
        );
    }
}

/// The action enum is closed: unknown kinds fail to parse instead of
/// being silently dropped or coerced.
#[test]
fn unknown_action_kind_fails_to_parse() {
    let result = serde_json::from_str::<ActivityAction>(r#"{"action":"photo_uploaded"}"#);
    assert!(result.is_err(), "unknown action kinds must be rejected");
}

/// The wire format is an internally tagged object, with the recipient id
/// inline for like_received.
#[test]
fn action_wire_format_is_tagged() {
    let json = serde_json::to_string(&ActivityAction::LikeReceived {
        recipient_id: "artist".to_string(),
    })
    .unwrap();
    assert_eq!(json, r#"{"action":"like_received","recipient_id":"artist"}"#);

    let parsed: ActivityAction = serde_json::from_str(r#"{"action":"doodle_created"}"#).unwrap();
    assert_eq!(parsed, ActivityAction::DoodleCreated);
}
