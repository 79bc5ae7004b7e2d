// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Business dashboard, P&L and cash-flow statements.

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;

use super::reports::range_arg;
use super::{Session, json_flags};
use crate::finance::business::{self, BurnStatus, BusinessMetrics, PartyTotal};
use crate::finance::health::current_month;
use crate::finance::in_range;
use crate::finance::report::DateRange;
use crate::models::{DashboardType, Transaction, TxType};
use crate::store::EntityStore;
use crate::utils::{fmt_money, fmt_pct, humanize, maybe_print_json, pretty_table};

pub fn handle<S: EntityStore>(s: &Session<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("dashboard", sub)) => dashboard(s, sub)?,
        Some(("pnl", sub)) => pnl(s, sub)?,
        Some(("cashflow", sub)) => cashflow(s, sub)?,
        Some(("parties", sub)) => parties(s, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct BusinessDashboard {
    pub metrics: BusinessMetrics,
    pub burn_status: BurnStatus,
    pub cash_reserves: Decimal,
    pub runway_days: u64,
    pub tax_deductible: Decimal,
    pub top_customers: Vec<PartyTotal>,
    pub top_vendors: Vec<PartyTotal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
}

pub fn build_dashboard<S: EntityStore>(s: &Session<S>, with_ai: bool) -> Result<BusinessDashboard> {
    let txs = s.transactions(DashboardType::Business)?;
    let month = current_month(&txs, s.today)?;
    let metrics = business::metrics(&month);
    let insight = with_ai.then(|| s.advisor().business_insight(&txs, &metrics));
    Ok(BusinessDashboard {
        burn_status: business::burn_status(metrics.burn_rate, metrics.monthly_expenses),
        cash_reserves: s.cfg.cash_reserves,
        runway_days: business::runway_days(s.cfg.cash_reserves, metrics.burn_rate),
        tax_deductible: business::tax_deductible_total(&month),
        top_customers: business::top_parties(&txs, TxType::Income, 3),
        top_vendors: business::top_parties(&txs, TxType::Expense, 3),
        metrics,
        insight,
    })
}

fn burn_label(b: BurnStatus) -> &'static str {
    match b {
        BurnStatus::Healthy => "healthy",
        BurnStatus::Moderate => "moderate",
        BurnStatus::High => "high",
    }
}

fn party_rows(parties: &[PartyTotal], ccy: &str) -> Vec<Vec<String>> {
    parties
        .iter()
        .map(|p| {
            vec![
                p.party.clone(),
                fmt_money(&p.total, ccy),
                p.transactions.to_string(),
            ]
        })
        .collect()
}

fn dashboard<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let d = build_dashboard(s, !sub.get_flag("no_ai"))?;
    if maybe_print_json(json_flag, jsonl_flag, &d)? {
        return Ok(());
    }
    let ccy = s.currency();
    let m = &d.metrics;
    let rows = vec![
        vec!["Monthly revenue".into(), fmt_money(&m.monthly_revenue, ccy)],
        vec!["Monthly expenses".into(), fmt_money(&m.monthly_expenses, ccy)],
        vec!["Profit margin".into(), fmt_pct(&m.profit_margin)],
        vec!["Outstanding (est.)".into(), fmt_money(&m.outstanding_payments, ccy)],
        vec![
            "Burn rate / day".into(),
            format!("{} ({})", fmt_money(&m.burn_rate, ccy), burn_label(d.burn_status)),
        ],
        vec!["Runway".into(), format!("{} days", d.runway_days)],
        vec!["Tax deductible".into(), fmt_money(&d.tax_deductible, ccy)],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    if !d.top_customers.is_empty() {
        println!("Top customers");
        println!("{}", pretty_table(&["Customer", "Revenue", "Txns"], party_rows(&d.top_customers, ccy)));
    }
    if !d.top_vendors.is_empty() {
        println!("Top vendors");
        println!("{}", pretty_table(&["Vendor", "Spend", "Txns"], party_rows(&d.top_vendors, ccy)));
    }
    if let Some(i) = &d.insight {
        println!("\n💡 {}", i);
    }
    Ok(())
}

/// Business transactions inside the statement range, year to date unless told otherwise.
pub fn statement_scope<S: EntityStore>(
    s: &Session<S>,
    sub: &clap::ArgMatches,
) -> Result<(DateRange, Vec<Transaction>)> {
    let (_, range) = range_arg(s, sub, "year-to-date")?;
    let txs = in_range(&s.transactions(DashboardType::Business)?, range.from, range.to);
    Ok((range, txs))
}

fn pnl<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let (range, txs) = statement_scope(s, sub)?;
    let p = business::profit_and_loss(&txs);
    if maybe_print_json(json_flag, jsonl_flag, &p)? {
        return Ok(());
    }
    let ccy = s.currency();
    let mut rows = vec![
        vec!["Revenue".to_string(), fmt_money(&p.revenue, ccy)],
        vec!["Cost of goods sold".to_string(), fmt_money(&-p.cogs, ccy)],
        vec!["Gross profit".to_string(), fmt_money(&p.gross_profit, ccy)],
    ];
    for (cat, amt) in &p.operating_expenses {
        rows.push(vec![format!("  {}", humanize(cat)), fmt_money(&-*amt, ccy)]);
    }
    rows.push(vec![
        "Total operating expenses".to_string(),
        fmt_money(&-p.total_operating_expenses, ccy),
    ]);
    rows.push(vec!["Net income".to_string(), fmt_money(&p.net_income, ccy)]);
    println!("Profit & Loss, {}", range.label());
    println!("{}", pretty_table(&["Line", "Amount"], rows));
    Ok(())
}

fn cashflow<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let (range, txs) = statement_scope(s, sub)?;
    let cf = business::cash_flow(&txs);
    if maybe_print_json(json_flag, jsonl_flag, &cf)? {
        return Ok(());
    }
    let ccy = s.currency();
    let rows = vec![
        vec!["Cash received from customers".into(), fmt_money(&cf.inflows, ccy)],
        vec!["Cash paid for expenses".into(), fmt_money(&-cf.outflows, ccy)],
        vec!["Net cash from operating".into(), fmt_money(&cf.net_operating, ccy)],
        vec!["Net cash from investing".into(), fmt_money(&cf.net_investing, ccy)],
        vec!["Net cash from financing".into(), fmt_money(&cf.net_financing, ccy)],
        vec!["Net change in cash".into(), fmt_money(&cf.net_change, ccy)],
    ];
    println!("Cash flow, {}", range.label());
    println!("{}", pretty_table(&["Line", "Amount"], rows));
    Ok(())
}

fn parties<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(5);
    let txs = s.transactions(DashboardType::Business)?;
    let customers = business::top_parties(&txs, TxType::Income, limit);
    let vendors = business::top_parties(&txs, TxType::Expense, limit);
    if maybe_print_json(
        json_flag,
        jsonl_flag,
        &serde_json::json!({ "customers": customers, "vendors": vendors }),
    )? {
        return Ok(());
    }
    let ccy = s.currency();
    println!("{}", pretty_table(&["Customer", "Revenue", "Txns"], party_rows(&customers, ccy)));
    println!("{}", pretty_table(&["Vendor", "Spend", "Txns"], party_rows(&vendors, ccy)));
    Ok(())
}
