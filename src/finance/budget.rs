// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use super::{clamp_pct, percent};
use crate::models::{Budget, Transaction};
use crate::utils::{month_end, month_start};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetLevel {
    OnTrack,
    Warning,
    Over,
}

impl BudgetLevel {
    pub fn label(self) -> &'static str {
        match self {
            BudgetLevel::OnTrack => "on track",
            BudgetLevel::Warning => "warning",
            BudgetLevel::Over => "over budget",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetStatus {
    pub budget: Budget,
    pub spent: Decimal,
    pub remaining: Decimal,
    /// Unclamped share of the limit used.
    pub percent: Decimal,
    /// `percent` clamped to `[0, 100]` for progress bars.
    pub progress: Decimal,
    pub level: BudgetLevel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub total_budget: Decimal,
    pub total_spent: Decimal,
    pub remaining: Decimal,
    pub percent_used: Decimal,
}

/// Expense total for the budget's category inside the budget's calendar month.
pub fn spent_for(budget: &Budget, txs: &[Transaction]) -> Result<Decimal> {
    let from = month_start(&budget.month)?;
    let to = month_end(&budget.month)?;
    Ok(txs
        .iter()
        .filter(|t| {
            t.is_expense() && t.category == budget.category && t.date >= from && t.date <= to
        })
        .map(|t| t.amount)
        .sum())
}

pub fn level_for(pct: Decimal) -> BudgetLevel {
    if pct > Decimal::ONE_HUNDRED {
        BudgetLevel::Over
    } else if pct > Decimal::from(75) {
        BudgetLevel::Warning
    } else {
        BudgetLevel::OnTrack
    }
}

pub fn status(budget: &Budget, txs: &[Transaction]) -> Result<BudgetStatus> {
    let spent = spent_for(budget, txs)?;
    let pct = percent(spent, budget.monthly_limit);
    Ok(BudgetStatus {
        budget: budget.clone(),
        spent,
        remaining: budget.monthly_limit - spent,
        percent: pct,
        progress: clamp_pct(pct),
        level: level_for(pct),
    })
}

/// Recomputes `current_spent` for every budget.
pub fn with_spending(budgets: &[Budget], txs: &[Transaction]) -> Result<Vec<BudgetStatus>> {
    budgets.iter().map(|b| status(b, txs)).collect()
}

pub fn summarize(statuses: &[BudgetStatus]) -> BudgetSummary {
    let total_budget: Decimal = statuses.iter().map(|s| s.budget.monthly_limit).sum();
    let total_spent: Decimal = statuses.iter().map(|s| s.spent).sum();
    BudgetSummary {
        total_budget,
        total_spent,
        remaining: total_budget - total_spent,
        percent_used: percent(total_spent, total_budget),
    }
}

/// Expense totals for categories without any budget, largest first.
pub fn unbudgeted_spending(budgets: &[Budget], txs: &[Transaction]) -> Vec<(String, Decimal)> {
    let budgeted: HashSet<&str> = budgets.iter().map(|b| b.category.as_str()).collect();
    let mut by_cat: BTreeMap<String, Decimal> = BTreeMap::new();
    for t in txs.iter().filter(|t| t.is_expense()) {
        if !budgeted.contains(t.category.as_str()) {
            *by_cat.entry(t.category.clone()).or_insert(Decimal::ZERO) += t.amount;
        }
    }
    let mut items: Vec<(String, Decimal)> = by_cat.into_iter().collect();
    items.sort_by(|a, b| b.1.cmp(&a.1));
    items
}
