// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use chrono::{Datelike, Duration, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;

use super::{in_range, total};
use crate::error::FinmateError;
use crate::models::{Transaction, TxType};
use crate::utils::month_bounds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<DateRange> {
        if from > to {
            bail!("Range start {} is after its end {}", from, to);
        }
        Ok(DateRange { from, to })
    }

    pub fn contains(&self, d: NaiveDate) -> bool {
        d >= self.from && d <= self.to
    }

    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.from.format("%b %-d, %Y"),
            self.to.format("%b %-d, %Y")
        )
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.from.iter_days().take_while(move |d| *d <= self.to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    ThisWeek,
    ThisMonth,
    LastMonth,
    YearToDate,
}

impl FromStr for Period {
    type Err = FinmateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "this-week" => Ok(Period::ThisWeek),
            "this-month" => Ok(Period::ThisMonth),
            "last-month" => Ok(Period::LastMonth),
            "year-to-date" => Ok(Period::YearToDate),
            other => Err(FinmateError::validation(format!(
                "unknown period '{}', expected this-week, this-month, last-month or year-to-date",
                other
            ))),
        }
    }
}

impl Period {
    /// Weeks run Sunday through Saturday.
    pub fn range(self, today: NaiveDate) -> Result<DateRange> {
        match self {
            Period::ThisWeek => {
                let back = i64::from(today.weekday().num_days_from_sunday());
                let from = today - Duration::days(back);
                DateRange::new(from, from + Duration::days(6))
            }
            Period::ThisMonth => {
                let (from, to) = month_bounds(today)?;
                DateRange::new(from, to)
            }
            Period::LastMonth => {
                let prev = today
                    .checked_sub_months(Months::new(1))
                    .ok_or_else(|| anyhow::anyhow!("No month before {}", today))?;
                let (from, to) = month_bounds(prev)?;
                DateRange::new(from, to)
            }
            Period::YearToDate => {
                let from = NaiveDate::from_ymd_opt(today.year(), 1, 1)
                    .ok_or_else(|| anyhow::anyhow!("No January 1st in {}", today.year()))?;
                DateRange::new(from, today)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodReport {
    pub period_label: String,
    pub range: DateRange,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net_savings: Decimal,
    pub spending_by_category: Vec<(String, Decimal)>,
    pub top_category: Option<(String, Decimal)>,
    pub transaction_count: usize,
}

/// Expense totals per category, largest first.
pub fn spending_by_category(txs: &[Transaction]) -> Vec<(String, Decimal)> {
    let mut agg: HashMap<String, Decimal> = HashMap::new();
    for t in txs.iter().filter(|t| t.is_expense()) {
        *agg.entry(t.category.clone()).or_insert(Decimal::ZERO) += t.amount;
    }
    let mut items: Vec<_> = agg.into_iter().collect();
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    items
}

pub fn period_report(txs: &[Transaction], range: DateRange) -> PeriodReport {
    let scoped = in_range(txs, range.from, range.to);
    let income = total(&scoped, TxType::Income);
    let expenses = total(&scoped, TxType::Expense);
    let by_cat = spending_by_category(&scoped);
    PeriodReport {
        period_label: range.label(),
        range,
        income,
        expenses,
        net_savings: income - expenses,
        top_category: by_cat.first().cloned(),
        spending_by_category: by_cat,
        transaction_count: scoped.len(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub income: Decimal,
    pub expenses: Decimal,
}

/// One point per day of the range, including days with no activity.
pub fn daily_series(txs: &[Transaction], range: DateRange) -> Vec<DailyPoint> {
    let mut by_day: HashMap<NaiveDate, (Decimal, Decimal)> = HashMap::new();
    for t in txs.iter().filter(|t| range.contains(t.date)) {
        let e = by_day.entry(t.date).or_default();
        match t.r#type {
            TxType::Income => e.0 += t.amount,
            TxType::Expense => e.1 += t.amount,
        }
    }
    range
        .days()
        .map(|date| {
            let (income, expenses) = by_day.get(&date).copied().unwrap_or_default();
            DailyPoint {
                date,
                income,
                expenses,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    All,
    Today,
    /// The last seven days, today included.
    Week,
    /// The current calendar month.
    Month,
}

impl FromStr for DateFilter {
    type Err = FinmateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(DateFilter::All),
            "today" => Ok(DateFilter::Today),
            "week" => Ok(DateFilter::Week),
            "month" => Ok(DateFilter::Month),
            other => Err(FinmateError::validation(format!(
                "unknown date range '{}', expected all, today, week or month",
                other
            ))),
        }
    }
}

/// The transaction list's search box and dropdown filters.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub r#type: Option<TxType>,
    pub date: DateFilter,
}

impl TransactionFilter {
    pub fn matches(&self, t: &Transaction, today: NaiveDate) -> bool {
        if let Some(q) = &self.search {
            if !t.description.to_lowercase().contains(&q.to_lowercase()) {
                return false;
            }
        }
        if let Some(c) = &self.category {
            if &t.category != c {
                return false;
            }
        }
        if let Some(k) = self.r#type {
            if t.r#type != k {
                return false;
            }
        }
        match self.date {
            DateFilter::All => true,
            DateFilter::Today => t.date == today,
            DateFilter::Week => t.date >= today - Duration::days(7),
            DateFilter::Month => t.date.year() == today.year() && t.date.month() == today.month(),
        }
    }

    pub fn apply(&self, txs: &[Transaction], today: NaiveDate) -> Vec<Transaction> {
        txs.iter()
            .filter(|t| self.matches(t, today))
            .cloned()
            .collect()
    }
}
