// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pure aggregation helpers over already-loaded records.

pub mod achievement;
pub mod budget;
pub mod business;
pub mod goal;
pub mod health;
pub mod report;
pub mod split;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{Transaction, TxType};

pub(crate) const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Sum of amounts for transactions of `kind`.
pub fn total(txs: &[Transaction], kind: TxType) -> Decimal {
    txs.iter()
        .filter(|t| t.r#type == kind)
        .map(|t| t.amount)
        .sum()
}

/// Transactions dated within `[from, to]`, inclusive.
pub fn in_range(txs: &[Transaction], from: NaiveDate, to: NaiveDate) -> Vec<Transaction> {
    txs.iter()
        .filter(|t| t.date >= from && t.date <= to)
        .cloned()
        .collect()
}

/// `part / whole * 100`, or zero when `whole` is zero.
pub fn percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * HUNDRED
    }
}

pub fn clamp_pct(v: Decimal) -> Decimal {
    v.max(Decimal::ZERO).min(HUNDRED)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::DashboardType;

    pub fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    pub fn tx(kind: TxType, category: &str, amount: &str, date: &str) -> Transaction {
        Transaction::new("test", dec(amount), kind, category, d(date))
    }

    pub fn biz(kind: TxType, category: &str, amount: &str, date: &str) -> Transaction {
        let mut t = tx(kind, category, amount, date);
        t.dashboard_type = DashboardType::Business;
        t
    }
}
