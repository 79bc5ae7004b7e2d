// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use super::{Session, json_flags, optional, required};
use crate::finance::goal::{self, GoalPatch, GoalProgress, GoalTotals};
use crate::models::{FinancialGoal, GoalCategory, Priority, UserProfile};
use crate::store::EntityStore;
use crate::utils::{fmt_money, fmt_pct, maybe_print_json, parse_date, parse_decimal, pretty_table};

#[derive(Debug, Serialize)]
pub struct GoalBoard {
    pub goals: Vec<GoalProgress>,
    pub totals: GoalTotals,
}

pub fn board(profile: &UserProfile, today: NaiveDate) -> GoalBoard {
    let mut goals: Vec<GoalProgress> = profile
        .financial_goals
        .iter()
        .map(|g| goal::progress(g, today))
        .collect();
    goals.sort_by(|a, b| {
        b.goal
            .priority
            .cmp(&a.goal.priority)
            .then(a.goal.target_date.cmp(&b.goal.target_date))
    });
    GoalBoard {
        totals: goal::totals(&profile.financial_goals),
        goals,
    }
}

fn patch_from(sub: &clap::ArgMatches) -> Result<GoalPatch> {
    Ok(GoalPatch {
        title: optional(sub, "title").map(|t| t.trim().to_string()),
        target_amount: optional(sub, "target").map(parse_decimal).transpose()?,
        current_amount: optional(sub, "saved").map(parse_decimal).transpose()?,
        target_date: optional(sub, "date").map(parse_date).transpose()?,
        category: optional(sub, "category")
            .map(|c| c.parse::<GoalCategory>())
            .transpose()?,
        priority: optional(sub, "priority")
            .map(|p| p.parse::<Priority>())
            .transpose()?,
    })
}

/// Applies one goal mutation to a fresh copy of the profile and writes the
/// whole profile back.
fn save<S: EntityStore, T>(
    s: &Session<S>,
    change: impl FnOnce(&mut UserProfile) -> Result<T>,
) -> Result<T> {
    let mut profile = s.store.me()?;
    let out = change(&mut profile)?;
    s.store.update_me(&profile)?;
    Ok(out)
}

pub fn add<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<String> {
    let p = patch_from(sub)?;
    let g = FinancialGoal {
        id: String::new(),
        title: p.title.unwrap_or_default(),
        target_amount: p.target_amount.unwrap_or_default(),
        current_amount: p.current_amount.unwrap_or(Decimal::ZERO),
        target_date: p.target_date.unwrap_or(s.today),
        category: p.category.unwrap_or_default(),
        priority: p.priority.unwrap_or_default(),
    };
    let id = save(s, |profile| Ok(goal::add(profile, g)?))?;
    info!(%id, "goal added");
    Ok(id)
}

pub fn contribute<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<Decimal> {
    let id = required(sub, "id")?;
    let amount = parse_decimal(required(sub, "amount")?)?;
    save(s, |profile| Ok(goal::contribute(profile, id, amount)?))
}

pub fn handle<S: EntityStore>(s: &Session<S>, m: &clap::ArgMatches) -> Result<()> {
    let ccy = s.currency();
    match m.subcommand() {
        Some(("add", sub)) => {
            let id = add(s, sub)?;
            println!("Added goal {}", id);
        }
        Some(("list", sub)) => {
            let (json_flag, jsonl_flag) = json_flags(sub);
            let b = board(&s.store.me()?, s.today);
            if maybe_print_json(json_flag, jsonl_flag, &b)? {
                return Ok(());
            }
            let rows = b
                .goals
                .iter()
                .map(|g| {
                    vec![
                        g.goal.title.clone(),
                        format!(
                            "{} / {}",
                            fmt_money(&g.goal.current_amount, ccy),
                            fmt_money(&g.goal.target_amount, ccy)
                        ),
                        fmt_pct(&g.percent),
                        g.goal.target_date.to_string(),
                        g.monthly_needed
                            .map(|v| fmt_money(&v, ccy))
                            .unwrap_or_else(|| if g.completed { "done".into() } else { "overdue".into() }),
                        g.goal.priority.to_string(),
                        g.goal.id.clone(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["Goal", "Saved", "Progress", "Target date", "Per month", "Priority", "Id"], rows)
            );
            println!(
                "Saved {} of {} across all goals ({} completed)",
                fmt_money(&b.totals.saved, ccy),
                fmt_money(&b.totals.target, ccy),
                b.totals.completed
            );
        }
        Some(("edit", sub)) => {
            let id = required(sub, "id")?;
            let patch = patch_from(sub)?;
            save(s, |profile| Ok(goal::edit(profile, id, patch)?))?;
            println!("Updated goal {}", id);
        }
        Some(("rm", sub)) => {
            let id = required(sub, "id")?;
            let removed = save(s, |profile| Ok(goal::remove(profile, id)?))?;
            println!("Deleted goal '{}'", removed.title);
        }
        Some(("contribute", sub)) => {
            let now = contribute(s, sub)?;
            println!("Saved so far: {}", fmt_money(&now, ccy));
        }
        _ => {}
    }
    Ok(())
}
