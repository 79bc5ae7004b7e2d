// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Gamification: fixed achievement definitions evaluated against activity.
//!
//! Only unlock events are persisted; progress is always recomputed.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::HUNDRED;
use crate::models::{Achievement, Budget, Transaction, TxType};

pub const POINTS_PER_LEVEL: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    TransactionCount,
    BudgetCount,
    AiCategorized,
    /// Longest run of consecutive days with at least one transaction.
    DayStreak,
    /// Best calendar-month net savings, in whole currency units.
    MonthlySavings,
    DistinctCategories,
}

#[derive(Debug, Clone, Copy)]
pub struct Definition {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub badge_type: &'static str,
    pub points: u32,
    pub rule: Rule,
    pub threshold: u64,
}

pub const DEFINITIONS: &[Definition] = &[
    Definition {
        key: "first_transaction",
        title: "First Steps",
        description: "Add your first transaction",
        badge_type: "smart_spender",
        points: 50,
        rule: Rule::TransactionCount,
        threshold: 1,
    },
    Definition {
        key: "transaction_master",
        title: "Transaction Master",
        description: "Record 50 transactions",
        badge_type: "smart_spender",
        points: 200,
        rule: Rule::TransactionCount,
        threshold: 50,
    },
    Definition {
        key: "budget_creator",
        title: "Budget Planner",
        description: "Create your first budget",
        badge_type: "budget_master",
        points: 100,
        rule: Rule::BudgetCount,
        threshold: 1,
    },
    Definition {
        key: "budget_master",
        title: "Budget Master",
        description: "Create 5 budgets",
        badge_type: "budget_master",
        points: 300,
        rule: Rule::BudgetCount,
        threshold: 5,
    },
    Definition {
        key: "ai_explorer",
        title: "AI Explorer",
        description: "Use AI to categorize a transaction",
        badge_type: "ai_explorer",
        points: 75,
        rule: Rule::AiCategorized,
        threshold: 1,
    },
    Definition {
        key: "streak_week",
        title: "Weekly Tracker",
        description: "Track expenses 7 days in a row",
        badge_type: "savings_streak",
        points: 150,
        rule: Rule::DayStreak,
        threshold: 7,
    },
    Definition {
        key: "savings_goal",
        title: "Savings Champion",
        description: "Save 1000 in a single month",
        badge_type: "goal_crusher",
        points: 500,
        rule: Rule::MonthlySavings,
        threshold: 1000,
    },
    Definition {
        key: "expense_category",
        title: "Category Expert",
        description: "Use 8 different categories",
        badge_type: "smart_spender",
        points: 250,
        rule: Rule::DistinctCategories,
        threshold: 8,
    },
];

pub fn definition(key: &str) -> Option<&'static Definition> {
    DEFINITIONS.iter().find(|d| d.key == key)
}

#[derive(Debug, Clone, Serialize)]
pub struct Progress {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub badge_type: &'static str,
    pub points: u32,
    pub measured: u64,
    pub threshold: u64,
    pub progress: Decimal,
    pub unlocked: bool,
    pub unlocked_date: Option<NaiveDate>,
}

/// Activity measurements the rules are checked against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activity {
    pub transactions: u64,
    pub budgets: u64,
    pub ai_categorized: u64,
    pub longest_streak: u64,
    pub best_month_savings: u64,
    pub categories: u64,
}

impl Activity {
    pub fn measure(txs: &[Transaction], budgets: &[Budget]) -> Activity {
        let categories: HashSet<&str> = txs.iter().map(|t| t.category.as_str()).collect();
        Activity {
            transactions: txs.len() as u64,
            budgets: budgets.len() as u64,
            ai_categorized: txs.iter().filter(|t| t.ai_categorized).count() as u64,
            longest_streak: longest_streak(txs),
            best_month_savings: best_month_net(txs)
                .max(Decimal::ZERO)
                .floor()
                .to_u64()
                .unwrap_or(0),
            categories: categories.len() as u64,
        }
    }

    fn value(&self, rule: Rule) -> u64 {
        match rule {
            Rule::TransactionCount => self.transactions,
            Rule::BudgetCount => self.budgets,
            Rule::AiCategorized => self.ai_categorized,
            Rule::DayStreak => self.longest_streak,
            Rule::MonthlySavings => self.best_month_savings,
            Rule::DistinctCategories => self.categories,
        }
    }
}

pub fn longest_streak(txs: &[Transaction]) -> u64 {
    let days: BTreeSet<NaiveDate> = txs.iter().map(|t| t.date).collect();
    let mut best = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for day in days {
        run = match prev {
            Some(p) if day - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(day);
    }
    best
}

/// Highest income minus expenses over any calendar month; zero with no data.
pub fn best_month_net(txs: &[Transaction]) -> Decimal {
    let mut by_month: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for t in txs {
        let net = by_month
            .entry((t.date.year(), t.date.month()))
            .or_insert(Decimal::ZERO);
        match t.r#type {
            TxType::Income => *net += t.amount,
            TxType::Expense => *net -= t.amount,
        }
    }
    by_month.into_values().max().unwrap_or(Decimal::ZERO)
}

pub fn evaluate(activity: &Activity, unlocked: &[Achievement]) -> Vec<Progress> {
    DEFINITIONS
        .iter()
        .map(|def| {
            let measured = activity.value(def.rule);
            let stored = unlocked.iter().find(|a| a.key == def.key);
            let progress = if def.threshold == 0 {
                HUNDRED
            } else {
                (Decimal::from(measured) / Decimal::from(def.threshold) * HUNDRED).min(HUNDRED)
            };
            Progress {
                key: def.key,
                title: def.title,
                description: def.description,
                badge_type: def.badge_type,
                points: def.points,
                measured,
                threshold: def.threshold,
                progress,
                unlocked: stored.is_some() || measured >= def.threshold,
                unlocked_date: stored.map(|a| a.unlocked_date),
            }
        })
        .collect()
}

/// Unlock events for rules that are met but not yet persisted.
pub fn newly_unlocked(
    activity: &Activity,
    unlocked: &[Achievement],
    today: NaiveDate,
) -> Vec<Achievement> {
    let have: HashSet<&str> = unlocked.iter().map(|a| a.key.as_str()).collect();
    DEFINITIONS
        .iter()
        .filter(|def| !have.contains(def.key) && activity.value(def.rule) >= def.threshold)
        .map(|def| Achievement {
            id: String::new(),
            key: def.key.to_string(),
            badge_type: def.badge_type.to_string(),
            points: def.points,
            unlocked_date: today,
        })
        .collect()
}

pub fn total_points(unlocked: &[Achievement]) -> u32 {
    unlocked.iter().map(|a| a.points).sum()
}

pub fn level(points: u32) -> u32 {
    points / POINTS_PER_LEVEL + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::fixtures::{d, dec, tx};
    use crate::models::TxType::{Expense, Income};

    #[test]
    fn streak_counts_consecutive_days_only() {
        let txs = vec![
            tx(Expense, "food", "1", "2025-08-01"),
            tx(Expense, "food", "1", "2025-08-02"),
            tx(Expense, "food", "1", "2025-08-02"),
            tx(Expense, "food", "1", "2025-08-03"),
            tx(Expense, "food", "1", "2025-08-05"),
        ];
        assert_eq!(longest_streak(&txs), 3);
        assert_eq!(longest_streak(&[]), 0);
    }

    #[test]
    fn best_month_net_picks_the_strongest_month() {
        let txs = vec![
            tx(Income, "salary", "3000", "2025-07-01"),
            tx(Expense, "rent", "2500", "2025-07-02"),
            tx(Income, "salary", "3000", "2025-08-01"),
            tx(Expense, "rent", "1500", "2025-08-02"),
        ];
        assert_eq!(best_month_net(&txs), dec("1500"));
    }

    #[test]
    fn progress_is_capped_and_first_steps_unlocks() {
        let txs = vec![tx(Expense, "food", "5", "2025-08-01")];
        let a = Activity::measure(&txs, &[]);
        let p = evaluate(&a, &[]);
        let first = p.iter().find(|p| p.key == "first_transaction").unwrap();
        assert!(first.unlocked);
        assert_eq!(first.progress, dec("100"));
        let master = p.iter().find(|p| p.key == "transaction_master").unwrap();
        assert!(!master.unlocked);
        assert_eq!(master.progress, dec("2"));
    }

    #[test]
    fn newly_unlocked_skips_persisted_keys() {
        let txs = vec![tx(Expense, "food", "5", "2025-08-01")];
        let a = Activity::measure(&txs, &[]);
        let fresh = newly_unlocked(&a, &[], d("2025-08-02"));
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].key, "first_transaction");
        assert_eq!(fresh[0].points, 50);
        assert!(newly_unlocked(&a, &fresh, d("2025-08-03")).is_empty());
    }

    #[test]
    fn level_steps_every_500_points() {
        assert_eq!(level(0), 1);
        assert_eq!(level(499), 1);
        assert_eq!(level(500), 2);
        assert_eq!(level(1275), 3);
    }
}
