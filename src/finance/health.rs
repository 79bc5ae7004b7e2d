// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly totals and the dashboard's financial-health score.

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{HUNDRED, clamp_pct, in_range, total};
use crate::models::{Budget, Transaction, TxType};
use crate::utils::month_bounds;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyTotals {
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

pub fn totals(txs: &[Transaction]) -> MonthlyTotals {
    let income = total(txs, TxType::Income);
    let expenses = total(txs, TxType::Expense);
    MonthlyTotals {
        income,
        expenses,
        net: income - expenses,
    }
}

/// Transactions in the calendar month containing `today`.
pub fn current_month(txs: &[Transaction], today: NaiveDate) -> Result<Vec<Transaction>> {
    let (from, to) = month_bounds(today)?;
    Ok(in_range(txs, from, to))
}

pub fn savings_rate(income: Decimal, expenses: Decimal) -> Decimal {
    if income > Decimal::ZERO {
        (income - expenses) / income * HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Mean per-budget headroom; 50 is neutral (no budgets, or a zero limit).
pub fn budget_adherence(month_txs: &[Transaction], budgets: &[Budget]) -> Decimal {
    let neutral = Decimal::from(50);
    if budgets.is_empty() {
        return neutral;
    }
    let sum: Decimal = budgets
        .iter()
        .map(|b| {
            let spent: Decimal = month_txs
                .iter()
                .filter(|t| t.is_expense() && t.category == b.category)
                .map(|t| t.amount)
                .sum();
            if b.monthly_limit > Decimal::ZERO {
                ((Decimal::ONE - spent / b.monthly_limit) * HUNDRED).max(Decimal::ZERO)
            } else {
                neutral
            }
        })
        .sum();
    sum / Decimal::from(budgets.len())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    Excellent,
    Good,
    NeedsAttention,
}

impl HealthBand {
    pub fn for_score(score: Decimal) -> HealthBand {
        if score >= Decimal::from(70) {
            HealthBand::Excellent
        } else if score >= Decimal::from(40) {
            HealthBand::Good
        } else {
            HealthBand::NeedsAttention
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HealthBand::Excellent => "Excellent",
            HealthBand::Good => "Good",
            HealthBand::NeedsAttention => "Needs Attention",
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            HealthBand::Excellent => {
                "Your finances are in great shape! Keep up the excellent work."
            }
            HealthBand::Good => "You're doing well, but there's room for improvement.",
            HealthBand::NeedsAttention => "Focus on reducing expenses and increasing savings.",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub totals: MonthlyTotals,
    pub savings_rate: Decimal,
    pub budget_adherence: Decimal,
    pub score: Decimal,
    pub band: HealthBand,
}

/// Score in `[0, 100]`: 60% savings rate, 40% budget adherence, both over
/// the current month.
pub fn assess(txs: &[Transaction], budgets: &[Budget], today: NaiveDate) -> Result<HealthReport> {
    let month = current_month(txs, today)?;
    let t = totals(&month);
    let rate = savings_rate(t.income, t.expenses);
    let adherence = budget_adherence(&month, budgets);
    let score = clamp_pct(rate * Decimal::new(6, 1) + adherence * Decimal::new(4, 1));
    Ok(HealthReport {
        totals: t,
        savings_rate: rate,
        budget_adherence: adherence,
        score,
        band: HealthBand::for_score(score),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::fixtures::{d, dec, tx};
    use crate::models::TxType::{Expense, Income};

    fn budget(category: &str, limit: &str) -> Budget {
        Budget {
            id: String::new(),
            category: category.into(),
            monthly_limit: dec(limit),
            month: "2025-08".into(),
        }
    }

    #[test]
    fn savings_rate_zero_without_income() {
        assert_eq!(savings_rate(Decimal::ZERO, dec("10")), Decimal::ZERO);
        assert_eq!(savings_rate(dec("1000"), dec("250")), dec("75"));
    }

    #[test]
    fn adherence_is_neutral_without_budgets() {
        assert_eq!(budget_adherence(&[], &[]), dec("50"));
    }

    #[test]
    fn adherence_floors_each_budget_at_zero() {
        let txs = vec![
            tx(Expense, "food", "300", "2025-08-02"),
            tx(Expense, "fun", "25", "2025-08-02"),
        ];
        // food: max(0, (1 - 3) * 100) = 0; fun: (1 - 0.25) * 100 = 75
        let got = budget_adherence(&txs, &[budget("food", "100"), budget("fun", "100")]);
        assert_eq!(got, dec("37.5"));
    }

    #[test]
    fn score_uses_only_current_month_and_stays_in_range() {
        let txs = vec![
            tx(Income, "salary", "2000", "2025-08-01"),
            tx(Expense, "food", "500", "2025-08-03"),
            tx(Expense, "food", "9000", "2025-07-03"),
        ];
        let r = assess(&txs, &[], d("2025-08-20")).unwrap();
        // savings 75 * 0.6 + 50 * 0.4 = 65
        assert_eq!(r.score, dec("65"));
        assert_eq!(r.band, HealthBand::Good);

        let broke = vec![tx(Income, "salary", "100", "2025-08-01"), tx(Expense, "x", "900", "2025-08-02")];
        let r = assess(&broke, &[], d("2025-08-20")).unwrap();
        assert_eq!(r.score, Decimal::ZERO);
        assert_eq!(r.band, HealthBand::NeedsAttention);
    }
}
