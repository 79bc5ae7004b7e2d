// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Business dashboard metrics, P&L and cash-flow statements.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::BTreeMap;

use super::{percent, total};
use crate::models::{Transaction, TxType};

pub const COGS: &str = "cogs";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessMetrics {
    pub monthly_revenue: Decimal,
    pub monthly_expenses: Decimal,
    /// Estimated at 15% of revenue.
    pub outstanding_payments: Decimal,
    /// Average spend per day over a 30 day month.
    pub burn_rate: Decimal,
    pub profit_margin: Decimal,
}

/// `month_txs` should already be limited to the current month.
pub fn metrics(month_txs: &[Transaction]) -> BusinessMetrics {
    let revenue = total(month_txs, TxType::Income);
    let expenses = total(month_txs, TxType::Expense);
    BusinessMetrics {
        monthly_revenue: revenue,
        monthly_expenses: expenses,
        outstanding_payments: revenue * Decimal::new(15, 2),
        burn_rate: expenses / Decimal::from(30),
        profit_margin: percent(revenue - expenses, revenue),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnStatus {
    Healthy,
    Moderate,
    High,
}

pub fn burn_status(burn_rate: Decimal, monthly_expenses: Decimal) -> BurnStatus {
    if monthly_expenses.is_zero() {
        return BurnStatus::Healthy;
    }
    let ratio = burn_rate * Decimal::from(30) / monthly_expenses;
    if ratio > Decimal::new(12, 1) {
        BurnStatus::High
    } else if ratio > Decimal::new(8, 1) {
        BurnStatus::Moderate
    } else {
        BurnStatus::Healthy
    }
}

/// Whole days the reserves last at the current burn; 0 when nothing burns.
pub fn runway_days(cash_reserves: Decimal, burn_rate: Decimal) -> u64 {
    if burn_rate <= Decimal::ZERO {
        return 0;
    }
    (cash_reserves / burn_rate).floor().to_u64().unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitAndLoss {
    pub revenue: Decimal,
    pub cogs: Decimal,
    pub gross_profit: Decimal,
    pub operating_expenses: Vec<(String, Decimal)>,
    pub total_operating_expenses: Decimal,
    pub net_income: Decimal,
}

pub fn profit_and_loss(txs: &[Transaction]) -> ProfitAndLoss {
    let revenue = total(txs, TxType::Income);
    let cogs: Decimal = txs
        .iter()
        .filter(|t| t.is_expense() && t.category == COGS)
        .map(|t| t.amount)
        .sum();
    let mut opex: BTreeMap<String, Decimal> = BTreeMap::new();
    for t in txs.iter().filter(|t| t.is_expense() && t.category != COGS) {
        *opex.entry(t.category.clone()).or_insert(Decimal::ZERO) += t.amount;
    }
    let total_opex: Decimal = opex.values().copied().sum();
    let gross = revenue - cogs;
    ProfitAndLoss {
        revenue,
        cogs,
        gross_profit: gross,
        operating_expenses: opex.into_iter().collect(),
        total_operating_expenses: total_opex,
        net_income: gross - total_opex,
    }
}

/// Direct-method operating cash flow. Investing and financing are always zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashFlow {
    pub inflows: Decimal,
    pub outflows: Decimal,
    pub net_operating: Decimal,
    pub net_investing: Decimal,
    pub net_financing: Decimal,
    pub net_change: Decimal,
}

pub fn cash_flow(txs: &[Transaction]) -> CashFlow {
    let inflows = total(txs, TxType::Income);
    let outflows = total(txs, TxType::Expense);
    let net = inflows - outflows;
    CashFlow {
        inflows,
        outflows,
        net_operating: net,
        net_investing: Decimal::ZERO,
        net_financing: Decimal::ZERO,
        net_change: net,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartyTotal {
    pub party: String,
    pub total: Decimal,
    pub transactions: usize,
}

/// Totals per `related_party` for one transaction type, largest first.
/// Income gives customers, expenses give vendors.
pub fn top_parties(txs: &[Transaction], kind: TxType, limit: usize) -> Vec<PartyTotal> {
    let mut agg: BTreeMap<&str, (Decimal, usize)> = BTreeMap::new();
    for t in txs.iter().filter(|t| t.r#type == kind) {
        let Some(party) = t.related_party.as_deref().map(str::trim).filter(|p| !p.is_empty())
        else {
            continue;
        };
        let e = agg.entry(party).or_insert((Decimal::ZERO, 0));
        e.0 += t.amount;
        e.1 += 1;
    }
    let mut out: Vec<PartyTotal> = agg
        .into_iter()
        .map(|(p, (total, n))| PartyTotal {
            party: p.to_string(),
            total,
            transactions: n,
        })
        .collect();
    out.sort_by(|a, b| b.total.cmp(&a.total));
    out.truncate(limit);
    out
}

pub fn tax_deductible_total(txs: &[Transaction]) -> Decimal {
    txs.iter()
        .filter(|t| t.is_expense() && t.is_tax_deductible)
        .map(|t| t.amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::fixtures::{biz, dec};
    use crate::models::TxType::{Expense, Income};

    #[test]
    fn metrics_follow_dashboard_formulas() {
        let txs = vec![
            biz(Income, "revenue", "10000", "2025-08-01"),
            biz(Expense, "rent", "3000", "2025-08-02"),
        ];
        let m = metrics(&txs);
        assert_eq!(m.outstanding_payments, dec("1500"));
        assert_eq!(m.burn_rate, dec("100"));
        assert_eq!(m.profit_margin, dec("70"));
        assert_eq!(burn_status(m.burn_rate, m.monthly_expenses), BurnStatus::Moderate);
        assert_eq!(runway_days(dec("50000"), m.burn_rate), 500);
    }

    #[test]
    fn burn_status_thresholds() {
        assert_eq!(burn_status(dec("50"), dec("1000")), BurnStatus::High);
        assert_eq!(burn_status(dec("20"), dec("1000")), BurnStatus::Healthy);
        assert_eq!(burn_status(dec("5"), Decimal::ZERO), BurnStatus::Healthy);
        assert_eq!(runway_days(dec("50000"), Decimal::ZERO), 0);
    }

    #[test]
    fn pnl_separates_cogs_from_operating_expenses() {
        let txs = vec![
            biz(Income, "revenue", "5000", "2025-08-01"),
            biz(Expense, "cogs", "1200", "2025-08-02"),
            biz(Expense, "rent", "800", "2025-08-03"),
            biz(Expense, "marketing", "300", "2025-08-04"),
            biz(Expense, "rent", "200", "2025-08-05"),
        ];
        let p = profit_and_loss(&txs);
        assert_eq!(p.gross_profit, dec("3800"));
        assert_eq!(
            p.operating_expenses,
            vec![("marketing".to_string(), dec("300")), ("rent".to_string(), dec("1000"))]
        );
        assert_eq!(p.total_operating_expenses, dec("1300"));
        assert_eq!(p.net_income, dec("2500"));
        let cf = cash_flow(&txs);
        assert_eq!(cf.net_change, dec("2500"));
        assert_eq!(cf.net_change, p.net_income);
    }

    #[test]
    fn parties_group_by_related_party() {
        let mut a = biz(Income, "revenue", "100", "2025-08-01");
        a.related_party = Some("Acme".into());
        let mut b = biz(Income, "revenue", "300", "2025-08-02");
        b.related_party = Some("Globex".into());
        let mut c = biz(Income, "revenue", "250", "2025-08-03");
        c.related_party = Some("Acme".into());
        let anonymous = biz(Income, "revenue", "999", "2025-08-03");
        let got = top_parties(&[a, b, c, anonymous], Income, 5);
        assert_eq!(got[0].party, "Acme");
        assert_eq!(got[0].total, dec("350"));
        assert_eq!(got[0].transactions, 2);
        assert_eq!(got.len(), 2);
    }
}
