// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use super::{Session, json_flags};
use crate::finance::achievement::{self, Activity, Progress};
use crate::models::{Achievement, Budget, Transaction};
use crate::store::EntityStore;
use crate::utils::{fmt_pct, humanize, maybe_print_json, pretty_table};

#[derive(Debug, Serialize)]
pub struct AchievementBoard {
    pub total_points: u32,
    pub level: u32,
    pub unlocked: usize,
    pub achievements: Vec<Progress>,
}

fn activity<S: EntityStore>(s: &Session<S>) -> Result<(Activity, Vec<Achievement>)> {
    let txs: Vec<Transaction> = s.store.list(None, None)?;
    let budgets: Vec<Budget> = s.store.list(None, None)?;
    let unlocked: Vec<Achievement> = s.store.list(None, None)?;
    Ok((Activity::measure(&txs, &budgets), unlocked))
}

pub fn board<S: EntityStore>(s: &Session<S>) -> Result<AchievementBoard> {
    let (act, unlocked) = activity(s)?;
    let points = achievement::total_points(&unlocked);
    let achievements = achievement::evaluate(&act, &unlocked);
    Ok(AchievementBoard {
        total_points: points,
        level: achievement::level(points),
        unlocked: achievements.iter().filter(|a| a.unlocked).count(),
        achievements,
    })
}

/// Persists an unlock event for every newly met rule.
pub fn check<S: EntityStore>(s: &Session<S>) -> Result<Vec<Achievement>> {
    let (act, unlocked) = activity(s)?;
    let mut saved = Vec::new();
    for a in achievement::newly_unlocked(&act, &unlocked, s.today) {
        let stored = s.store.create(&a)?;
        info!(key = %stored.key, points = stored.points, "achievement unlocked");
        saved.push(stored);
    }
    Ok(saved)
}

pub fn handle<S: EntityStore>(s: &Session<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let (json_flag, jsonl_flag) = json_flags(sub);
            let b = board(s)?;
            if maybe_print_json(json_flag, jsonl_flag, &b)? {
                return Ok(());
            }
            let rows = b
                .achievements
                .iter()
                .map(|a| {
                    vec![
                        if a.unlocked { "🏆".to_string() } else { "·".to_string() },
                        a.title.to_string(),
                        a.description.to_string(),
                        humanize(a.badge_type),
                        a.points.to_string(),
                        fmt_pct(&a.progress),
                        a.unlocked_date.map(|d| d.to_string()).unwrap_or_default(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["", "Achievement", "Goal", "Badge", "Points", "Progress", "Unlocked"], rows)
            );
            println!(
                "Level {} · {} points · {}/{} unlocked",
                b.level,
                b.total_points,
                b.unlocked,
                b.achievements.len()
            );
        }
        Some(("check", _)) => {
            let fresh = check(s)?;
            if fresh.is_empty() {
                println!("No new achievements yet. Keep going!");
            }
            for a in fresh {
                let title = achievement::definition(&a.key).map_or(a.key.as_str(), |d| d.title);
                println!("🏆 Unlocked {} (+{} points)", title, a.points);
            }
        }
        _ => {}
    }
    Ok(())
}
