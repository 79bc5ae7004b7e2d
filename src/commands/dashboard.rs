// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Session, json_flags};
use crate::finance::budget::{self, BudgetStatus};
use crate::finance::health::{self, HealthReport, current_month};
use crate::finance::report::spending_by_category;
use crate::models::{Budget, DashboardType, Transaction};
use crate::store::{EntityStore, Query};
use crate::utils::{fmt_money, fmt_pct, humanize, maybe_print_json, month_key, pretty_table};

const RECENT: usize = 5;
const TOP_CATEGORIES: usize = 5;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub month: String,
    pub health: HealthReport,
    pub budgets: Vec<BudgetStatus>,
    pub spending_by_category: Vec<(String, Decimal)>,
    pub recent: Vec<Transaction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
}

pub fn build<S: EntityStore>(s: &Session<S>, with_ai: bool) -> Result<Dashboard> {
    let month = month_key(s.today);
    let txs = s.transactions(DashboardType::Personal)?;
    let budgets: Vec<Budget> = s
        .store
        .filter(&Query::new().eq("month", month.as_str()), None, None)?;
    let month_txs = current_month(&txs, s.today)?;
    let insight = with_ai.then(|| s.advisor().dashboard_insight(&month_txs));
    let mut by_category = spending_by_category(&month_txs);
    by_category.truncate(TOP_CATEGORIES);
    Ok(Dashboard {
        health: health::assess(&txs, &budgets, s.today)?,
        budgets: budget::with_spending(&budgets, &txs)?,
        spending_by_category: by_category,
        recent: txs.iter().take(RECENT).cloned().collect(),
        insight,
        month,
    })
}

pub fn handle<S: EntityStore>(s: &Session<S>, m: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(m);
    let d = build(s, !m.get_flag("no_ai"))?;
    if maybe_print_json(json_flag, jsonl_flag, &d)? {
        return Ok(());
    }
    let ccy = s.currency();
    let h = &d.health;
    println!("{}", d.month);
    println!("Income:   {}", fmt_money(&h.totals.income, ccy));
    println!("Expenses: {}", fmt_money(&h.totals.expenses, ccy));
    println!("Net:      {}", fmt_money(&h.totals.net, ccy));
    println!(
        "Financial health: {:.0}/100 ({}). {}",
        h.score.round(),
        h.band.label(),
        h.band.advice()
    );
    println!(
        "  savings rate {}, budget adherence {}",
        fmt_pct(&h.savings_rate),
        fmt_pct(&h.budget_adherence)
    );

    if !d.budgets.is_empty() {
        let rows = d
            .budgets
            .iter()
            .map(|b| {
                vec![
                    humanize(&b.budget.category),
                    format!(
                        "{} / {}",
                        fmt_money(&b.spent, ccy),
                        fmt_money(&b.budget.monthly_limit, ccy)
                    ),
                    fmt_pct(&b.progress),
                    b.level.label().to_string(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Budget", "Spent", "Progress", "Status"], rows));
    }

    if !d.spending_by_category.is_empty() {
        let rows = d
            .spending_by_category
            .iter()
            .map(|(c, a)| vec![humanize(c), fmt_money(a, ccy)])
            .collect();
        println!("{}", pretty_table(&["Category", "Spent this month"], rows));
    }

    if !d.recent.is_empty() {
        let rows = d
            .recent
            .iter()
            .map(|t| {
                let signed = if t.is_income() { t.amount } else { -t.amount };
                vec![t.date.to_string(), t.description.clone(), fmt_money(&signed, ccy)]
            })
            .collect();
        println!("{}", pretty_table(&["Date", "Recent", "Amount"], rows));
    }

    if let Some(i) = &d.insight {
        println!("\n💡 {}", i);
    }
    Ok(())
}
