//! Award ledger guarantees: at-most-once rows, duplicate inserts as
//! ignorable no-ops, stable ordering, and visibility across connections.

use chrono::{DateTime, TimeZone, Utc};
use doodleaday_core::{
    action::ActivityAction,
    catalog::BadgeCatalog,
    processor::ActionProcessor,
    store::AwardStore,
};

fn open_store() -> AwardStore {
    let store = AwardStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
}

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
}

/// The second insert of the same (user, badge) pair reports false and
/// leaves the original row, including its timestamp, untouched.
#[test]
fn duplicate_award_insert_is_an_ignored_no_op() {
    let store = open_store();
    store.create_profile("maya").unwrap();

    assert!(
        store.insert_award("maya", "first_doodle", day(1)).unwrap(),
        "first insert must land"
    );
    assert!(
        !store.insert_award("maya", "first_doodle", day(2)).unwrap(),
        "second insert must be ignored, not fail"
    );

    assert_eq!(store.award_count("maya").unwrap(), 1);
    let rows = store.awards_for_user("maya").unwrap();
    assert_eq!(
        rows[0].awarded_at,
        day(1),
        "the original award timestamp survives the ignored duplicate"
    );
}

/// A ledger row that predates the action (say, restored from a backup)
/// suppresses the award without erroring the whole action.
#[test]
fn pre_seeded_ledger_row_absorbs_a_new_qualification() {
    let store = open_store();
    store.create_profile("maya").unwrap();
    store.insert_award("maya", "first_doodle", day(1)).unwrap();

    let mut p = ActionProcessor::new(store, BadgeCatalog::builtin());
    let outcome = p
        .process_at("maya", ActivityAction::DoodleCreated, day(2))
        .unwrap();

    assert!(
        outcome.new_badges.is_empty(),
        "the pre-existing ledger row must suppress the unlock"
    );
    let counters = outcome.counters.expect("counters");
    assert_eq!(counters.doodle_count, 1, "the counter still advances");
    assert_eq!(p.store().award_count("maya").unwrap(), 1);
}

/// Two connections onto the same database share one ledger, and the
/// second writer's duplicate is absorbed the same way.
#[test]
fn two_connections_share_one_ledger() {
    let uri = "file:ledger_two_conns?mode=memory&cache=shared";
    let store_a = AwardStore::open(uri).unwrap();
    store_a.migrate().unwrap();
    let store_b = AwardStore::open(uri).unwrap();

    store_a.create_profile("maya").unwrap();
    assert!(store_a.insert_award("maya", "first_doodle", day(1)).unwrap());
    assert!(
        !store_b.insert_award("maya", "first_doodle", day(5)).unwrap(),
        "the second connection must see the existing row"
    );
    assert_eq!(store_b.award_count("maya").unwrap(), 1);
}

/// Awards persist across a reconnect to the same database.
#[test]
fn awards_survive_a_reconnect() {
    let store = AwardStore::open("file:ledger_reconnect?mode=memory&cache=shared").unwrap();
    store.migrate().unwrap();
    store.create_profile("maya").unwrap();
    store.insert_award("maya", "first_doodle", day(1)).unwrap();

    let reopened = store.reopen().unwrap();
    assert_eq!(
        reopened.award_count("maya").unwrap(),
        1,
        "awards must survive a reconnect"
    );
    let rows = reopened.awards_for_user("maya").unwrap();
    assert_eq!(rows[0].badge_id, "first_doodle");
}

/// awards_for_user orders by award time, then badge id for same-instant
/// awards, so the profile timeline is stable.
#[test]
fn awards_are_ordered_by_time_then_badge_id() {
    let store = open_store();
    store.create_profile("maya").unwrap();

    store.insert_award("maya", "first_comment", day(3)).unwrap();
    store.insert_award("maya", "liker_1", day(1)).unwrap();
    store.insert_award("maya", "first_doodle", day(1)).unwrap();

    let ids: Vec<String> = store
        .awards_for_user("maya")
        .unwrap()
        .into_iter()
        .map(|row| row.badge_id)
        .collect();
    assert_eq!(
        ids,
        vec!["first_doodle", "liker_1", "first_comment"],
        "oldest first; same-instant awards tie-break on badge id"
    );
}

/// Earned badge ids come back as a set for the evaluator's skip check.
#[test]
fn earned_ids_round_trip_as_a_set() {
    let store = open_store();
    store.create_profile("maya").unwrap();
    store.insert_award("maya", "first_doodle", day(1)).unwrap();
    store.insert_award("maya", "first_comment", day(2)).unwrap();

    let earned = store.earned_badge_ids("maya").unwrap();
    assert_eq!(earned.len(), 2);
    assert!(earned.contains("first_doodle"));
    assert!(earned.contains("first_comment"));
    assert!(!earned.contains("streak_master"));
}
