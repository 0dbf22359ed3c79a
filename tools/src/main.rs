//! awards-runner: headless activity driver for the Doodle a Day awards engine.
//!
//! Usage:
//!   awards-runner --seed 12345 --users 8 --days 30 --db run.db
//!   awards-runner --replay actions.jsonl --db run.db
//!
//! Synthetic mode invents a deterministic community of users and a month of
//! doodling, commenting, and liking; replay mode feeds recorded actions from a
//! JSONL file (one `{"user": ..., "action": ..., ...}` object per line).

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use doodleaday_core::{
    action::ActivityAction,
    catalog::{BadgeCatalog, MetricKind},
    processor::{ActionProcessor, ProcessOutcome},
    store::AwardStore,
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::collections::BTreeSet;
use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader};

#[derive(serde::Deserialize)]
struct ReplayLine {
    user: String,
    #[serde(flatten)]
    action: ActivityAction,
    #[serde(default)]
    at: Option<DateTime<Utc>>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let users = parse_arg(&args, "--users", 8usize);
    let days = parse_arg(&args, "--days", 30u64);
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");
    let replay = args
        .windows(2)
        .find(|w| w[0] == "--replay")
        .map(|w| w[1].as_str());

    println!("Doodle a Day awards-runner");
    if replay.is_none() {
        println!("  seed:      {seed}");
        println!("  users:     {users}");
        println!("  days:      {days}");
    }
    println!("  db:        {db}");
    println!("  data_dir:  {data_dir}");
    println!();

    let store = if db == ":memory:" {
        AwardStore::in_memory()?
    } else {
        AwardStore::open(db)?
    };
    store.migrate()?;

    let catalog = match BadgeCatalog::load(data_dir) {
        Ok(catalog) => catalog,
        Err(e) => {
            log::warn!("Falling back to builtin badge catalog: {e}");
            BadgeCatalog::builtin()
        }
    };
    log::info!(
        "Catalog {} loaded with {} badges",
        catalog.version(),
        catalog.len()
    );

    let mut processor = ActionProcessor::new(store, catalog);

    let (user_ids, actions) = match replay {
        Some(path) => run_replay(&mut processor, path)?,
        None => run_synthetic(&mut processor, seed, users, days)?,
    };

    print_summary(&processor, &user_ids, actions)?;
    Ok(())
}

/// Drives a deterministic stream of invented community activity through the
/// processor, announcing every badge unlock as it happens.
fn run_synthetic(
    processor: &mut ActionProcessor,
    seed: u64,
    users: usize,
    days: u64,
) -> Result<(Vec<String>, u64)> {
    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    let user_ids: Vec<String> = (1..=users).map(|i| format!("user-{i:02}")).collect();
    for user_id in &user_ids {
        processor.create_profile(user_id)?;
    }

    let start = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| anyhow::anyhow!("Bad simulation start date"))?;

    let mut actions = 0u64;
    for day in 0..days {
        for (idx, user_id) in user_ids.iter().enumerate() {
            // Roughly 4 active days out of 5 per user.
            if !rng.gen_bool(0.8) {
                continue;
            }
            let now = start
                + Duration::days(day as i64)
                + Duration::hours(rng.gen_range(8..23i64))
                + Duration::minutes(rng.gen_range(0..60i64));

            if rng.gen_bool(0.6) {
                let outcome = processor.process_at(user_id, ActivityAction::DoodleCreated, now)?;
                announce_unlocks(&format!("day {day:>3}"), &outcome);
                actions += 1;
            }
            if rng.gen_bool(0.4) {
                let outcome = processor.process_at(user_id, ActivityAction::CommentAdded, now)?;
                announce_unlocks(&format!("day {day:>3}"), &outcome);
                actions += 1;
            }
            if user_ids.len() > 1 && rng.gen_bool(0.5) {
                // Pick someone other than ourselves to like.
                let pick = rng.gen_range(0..user_ids.len() - 1);
                let target = if pick >= idx { pick + 1 } else { pick };
                let outcome = processor.process_at(user_id, ActivityAction::LikeGiven, now)?;
                announce_unlocks(&format!("day {day:>3}"), &outcome);
                let outcome = processor.process_at(
                    user_id,
                    ActivityAction::LikeReceived {
                        recipient_id: user_ids[target].clone(),
                    },
                    now,
                )?;
                announce_unlocks(&format!("day {day:>3}"), &outcome);
                actions += 2;
            }
        }
    }
    Ok((user_ids, actions))
}

/// Replays recorded actions from a JSONL file. Profiles are created on first
/// sight so a raw export can be fed straight in.
fn run_replay(processor: &mut ActionProcessor, path: &str) -> Result<(Vec<String>, u64)> {
    let file = File::open(path).map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
    let reader = BufReader::new(file);

    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut actions = 0u64;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: ReplayLine = serde_json::from_str(&line)
            .map_err(|e| anyhow::anyhow!("{path}:{}: {e}", line_no + 1))?;

        processor.create_profile(&entry.user)?;
        seen.insert(entry.user.clone());
        if let ActivityAction::LikeReceived { recipient_id } = &entry.action {
            processor.create_profile(recipient_id)?;
            seen.insert(recipient_id.clone());
        }

        let now = entry.at.unwrap_or_else(Utc::now);
        let outcome = processor.process_at(&entry.user, entry.action, now)?;
        announce_unlocks(&now.format("%Y-%m-%d").to_string(), &outcome);
        actions += 1;
    }
    Ok((seen.into_iter().collect(), actions))
}

fn announce_unlocks(prefix: &str, outcome: &ProcessOutcome) {
    for badge in &outcome.new_badges {
        println!(
            "  {prefix}  {:<10} unlocked '{}' ({})",
            outcome.actor_id, badge.name, badge.id
        );
    }
    if let Some(recipient) = &outcome.recipient {
        for badge in &recipient.new_badges {
            println!(
                "  {prefix}  {:<10} unlocked '{}' ({})",
                recipient.user_id, badge.name, badge.id
            );
        }
    }
}

fn print_summary(processor: &ActionProcessor, user_ids: &[String], actions: u64) -> Result<()> {
    let mut total_badges = 0usize;
    let mut rows = Vec::new();
    for user_id in user_ids {
        let status = processor.badge_status(user_id)?;
        total_badges += status.earned.len();
        rows.push((user_id, status));
    }

    println!();
    println!("=== RUN SUMMARY ===");
    println!("  users:          {}", user_ids.len());
    println!("  actions:        {actions}");
    println!("  badges awarded: {total_badges}");

    println!();
    println!("  user        doodles  comments  streak  best  liked  received  badges");
    for (user_id, status) in &rows {
        let c = &status.counters;
        println!(
            "  {:<10} {:>8} {:>9} {:>7} {:>5} {:>6} {:>9} {:>7}",
            user_id,
            c.doodle_count,
            c.comment_count,
            c.current_streak,
            c.max_streak,
            c.doodles_liked_count,
            c.likes_received_count,
            status.earned.len()
        );
    }

    println!();
    println!("=== LEADERBOARDS ===");
    print_board(processor.store(), "Most doodles", MetricKind::DoodleCount)?;
    print_board(processor.store(), "Most liked", MetricKind::LikesReceived)?;
    print_board(processor.store(), "Longest streak", MetricKind::Streak)?;
    Ok(())
}

fn print_board(store: &AwardStore, label: &str, metric: MetricKind) -> Result<()> {
    println!("  {label} ({}):", metric.as_str());
    for (rank, (user_id, value)) in store.top_by_metric(metric, 3)?.iter().enumerate() {
        println!("    {}. {:<10} {value}", rank + 1, user_id);
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
