// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use super::{Session, json_flags, optional};
use crate::finance::report::{self, DateRange, Period, PeriodReport};
use crate::models::DashboardType;
use crate::store::EntityStore;
use crate::utils::{fmt_money, humanize, maybe_print_json, parse_date, pretty_table};

const DEFAULT_PERIOD: &str = "this-month";

pub fn handle<S: EntityStore>(s: &Session<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(s, sub)?,
        Some(("daily", sub)) => daily(s, sub)?,
        Some(("ai", sub)) => {
            let (label, r) = build(s, sub)?;
            println!("{} ({})\n", label, r.period_label);
            println!("{}", s.advisor().report_analysis(&label, &r));
        }
        _ => {}
    }
    Ok(())
}

/// `--from`/`--to` when given, else `--period` or `default`.
pub(crate) fn range_arg<S: EntityStore>(
    s: &Session<S>,
    sub: &clap::ArgMatches,
    default: &str,
) -> Result<(String, DateRange)> {
    if let (Some(from), Some(to)) = (optional(sub, "from"), optional(sub, "to")) {
        let range = DateRange::new(parse_date(from)?, parse_date(to)?)?;
        return Ok(("custom".to_string(), range));
    }
    let label = optional(sub, "period").unwrap_or(default).to_string();
    let period: Period = label.parse()?;
    Ok((label, period.range(s.today)?))
}

/// The personal report for the requested period, with its period label.
pub fn build<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<(String, PeriodReport)> {
    let (label, range) = range_arg(s, sub, DEFAULT_PERIOD)?;
    let txs = s.transactions(DashboardType::Personal)?;
    Ok((label, report::period_report(&txs, range)))
}

fn summary<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let (_, r) = build(s, sub)?;
    if maybe_print_json(json_flag, jsonl_flag, &r)? {
        return Ok(());
    }
    let ccy = s.currency();
    println!("{}", r.period_label);
    println!("Income:       {}", fmt_money(&r.income, ccy));
    println!("Expenses:     {}", fmt_money(&r.expenses, ccy));
    println!("Net savings:  {}", fmt_money(&r.net_savings, ccy));
    println!("Transactions: {}", r.transaction_count);
    if let Some((cat, amt)) = &r.top_category {
        println!("Top category: {} ({})", humanize(cat), fmt_money(amt, ccy));
    }
    if !r.spending_by_category.is_empty() {
        let rows = r
            .spending_by_category
            .iter()
            .map(|(cat, amt)| vec![humanize(cat), fmt_money(amt, ccy)])
            .collect();
        println!("{}", pretty_table(&["Category", "Spent"], rows));
    }
    Ok(())
}

fn daily<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let (_, range) = range_arg(s, sub, DEFAULT_PERIOD)?;
    let txs = s.transactions(DashboardType::Personal)?;
    let series = report::daily_series(&txs, range);
    if maybe_print_json(json_flag, jsonl_flag, &series)? {
        return Ok(());
    }
    let ccy = s.currency();
    let rows = series
        .iter()
        .map(|p| {
            vec![
                p.date.format("%b %-d").to_string(),
                fmt_money(&p.income, ccy),
                fmt_money(&p.expenses, ccy),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Day", "Income", "Expenses"], rows));
    Ok(())
}
