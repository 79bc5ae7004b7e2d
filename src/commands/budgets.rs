// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use super::{Session, json_flags, optional, required};
use crate::advisor::BudgetSuggestion;
use crate::error::FinmateError;
use crate::finance::budget::{self, BudgetStatus, BudgetSummary};
use crate::models::{Budget, DashboardType};
use crate::store::{EntityStore, Query};
use crate::utils::{fmt_money, fmt_pct, humanize, maybe_print_json, month_key, parse_decimal, parse_month, pretty_table};

pub fn handle<S: EntityStore>(s: &Session<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let b = set(s, sub)?;
            println!(
                "Budget set for {} / {} = {}",
                b.month,
                b.category,
                fmt_money(&b.monthly_limit, s.currency())
            );
        }
        Some(("list", sub)) => list(s, sub)?,
        Some(("rm", sub)) => {
            let id = required(sub, "id")?;
            if !s.store.delete::<Budget>(id)? {
                return Err(FinmateError::NotFound {
                    entity: "Budget",
                    id: id.to_string(),
                }
                .into());
            }
            println!("Deleted budget {}", id);
        }
        Some(("suggest", _)) => suggest(s)?,
        _ => {}
    }
    Ok(())
}

fn month_arg<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<String> {
    match optional(sub, "month") {
        Some(m) => parse_month(m),
        None => Ok(month_key(s.today)),
    }
}

/// Creates the budget, or replaces the limit of an existing one for the
/// same category and month.
pub fn set<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<Budget> {
    let month = month_arg(s, sub)?;
    let b = Budget {
        id: String::new(),
        category: required(sub, "category")?.trim().to_lowercase(),
        monthly_limit: parse_decimal(required(sub, "limit")?)?,
        month,
    };
    b.validate()?;
    let existing: Vec<Budget> = s.store.filter(
        &Query::new()
            .eq("category", b.category.as_str())
            .eq("month", b.month.as_str()),
        None,
        Some(1),
    )?;
    let saved = match existing.first() {
        Some(old) => {
            let mut next = b.clone();
            next.id = old.id.clone();
            s.store.update(&old.id, &next)?
        }
        None => s.store.create(&b)?,
    };
    info!(id = %saved.id, category = %saved.category, month = %saved.month, "budget saved");
    Ok(saved)
}

#[derive(Serialize)]
pub struct BudgetView {
    pub month: String,
    pub budgets: Vec<BudgetStatus>,
    pub summary: BudgetSummary,
}

pub fn view<S: EntityStore>(s: &Session<S>, month: &str) -> Result<BudgetView> {
    let budgets: Vec<Budget> = s
        .store
        .filter(&Query::new().eq("month", month), None, None)?;
    let txs = s.transactions(DashboardType::Personal)?;
    let statuses = budget::with_spending(&budgets, &txs)?;
    Ok(BudgetView {
        month: month.to_string(),
        summary: budget::summarize(&statuses),
        budgets: statuses,
    })
}

fn list<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let month = month_arg(s, sub)?;
    let v = view(s, &month)?;
    if maybe_print_json(json_flag, jsonl_flag, &v)? {
        return Ok(());
    }
    let ccy = s.currency();
    let rows: Vec<Vec<String>> = v
        .budgets
        .iter()
        .map(|st| {
            vec![
                humanize(&st.budget.category),
                fmt_money(&st.budget.monthly_limit, ccy),
                fmt_money(&st.spent, ccy),
                fmt_money(&st.remaining, ccy),
                fmt_pct(&st.percent),
                st.level.label().to_string(),
                st.budget.id.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Category", "Limit", "Spent", "Remaining", "Used", "Status", "Id"],
            rows,
        )
    );
    println!(
        "{}: {} of {} spent ({}), {} left",
        v.month,
        fmt_money(&v.summary.total_spent, ccy),
        fmt_money(&v.summary.total_budget, ccy),
        fmt_pct(&v.summary.percent_used),
        fmt_money(&v.summary.remaining, ccy)
    );
    Ok(())
}

pub fn suggestions<S: EntityStore>(s: &Session<S>) -> Result<Vec<BudgetSuggestion>> {
    let budgets: Vec<Budget> = s.store.list(None, None)?;
    let txs = s.transactions(DashboardType::Personal)?;
    let unbudgeted = budget::unbudgeted_spending(&budgets, &txs);
    Ok(s.advisor().budget_suggestions(&unbudgeted))
}

fn suggest<S: EntityStore>(s: &Session<S>) -> Result<()> {
    let list = suggestions(s)?;
    if list.is_empty() {
        println!("No budget suggestions right now.");
        return Ok(());
    }
    for sug in list {
        println!("• {}: {}", humanize(&sug.category), sug.reason);
        println!(
            "  finmate budget set --category {} --limit <amount>",
            sug.category
        );
    }
    Ok(())
}
