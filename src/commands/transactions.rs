// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::path::Path;
use tracing::info;

use super::{Session, json_flags, optional, required};
use crate::error::FinmateError;
use crate::finance::report::{DateFilter, TransactionFilter};
use crate::models::{BUSINESS_CATEGORIES, DashboardType, PERSONAL_CATEGORIES, Transaction, TxType};
use crate::store::EntityStore;
use crate::utils::{fmt_money, humanize, maybe_print_json, parse_date, parse_decimal, pretty_table};

pub fn handle<S: EntityStore>(s: &Session<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let t = add(s, sub)?;
            println!(
                "Recorded {} {} '{}' on {} [{}] (id {})",
                t.r#type,
                fmt_money(&t.amount, s.currency()),
                t.description,
                t.date,
                t.category,
                t.id
            );
        }
        Some(("list", sub)) => list(s, sub)?,
        Some(("edit", sub)) => {
            let t = edit(s, sub)?;
            println!("Updated transaction {}", t.id);
        }
        Some(("rm", sub)) => {
            let id = required(sub, "id")?;
            if s.store.delete::<Transaction>(id)? {
                println!("Deleted transaction {}", id);
            } else {
                return Err(FinmateError::NotFound {
                    entity: "Transaction",
                    id: id.to_string(),
                }
                .into());
            }
        }
        Some(("receipt", sub)) => receipt(s, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn categories_for(dashboard: DashboardType) -> &'static [&'static str] {
    match dashboard {
        DashboardType::Personal => PERSONAL_CATEGORIES,
        DashboardType::Business => BUSINESS_CATEGORIES,
    }
}

/// Flags only `tx edit` defines; false on `tx add`.
fn edit_flag(sub: &clap::ArgMatches, id: &str) -> bool {
    matches!(sub.try_get_one::<bool>(id), Ok(Some(true)))
}

fn apply_fields(t: &mut Transaction, sub: &clap::ArgMatches) -> Result<()> {
    if let Some(v) = optional(sub, "description") {
        t.description = v.trim().to_string();
    }
    if let Some(v) = optional(sub, "amount") {
        t.amount = parse_decimal(v)?;
    }
    if let Some(v) = optional(sub, "type") {
        t.r#type = v.parse()?;
    }
    if let Some(v) = optional(sub, "category") {
        t.category = v.trim().to_lowercase();
    }
    if let Some(v) = optional(sub, "date") {
        t.date = parse_date(v)?;
    }
    if let Some(v) = optional(sub, "dashboard") {
        t.dashboard_type = v.parse()?;
    }
    if let Some(v) = optional(sub, "party") {
        t.related_party = Some(v.trim().to_string()).filter(|p| !p.is_empty());
    }
    if let Some(v) = optional(sub, "invoice") {
        t.invoice_number = Some(v.trim().to_string()).filter(|p| !p.is_empty());
    }
    if sub.get_flag("tax_deductible") {
        t.is_tax_deductible = true;
    }
    if edit_flag(sub, "no_tax_deductible") {
        t.is_tax_deductible = false;
    }
    if sub.get_flag("recurring") {
        t.recurring = true;
    }
    if edit_flag(sub, "no_recurring") {
        t.recurring = false;
    }
    if edit_flag(sub, "clear_tags") {
        t.tags.clear();
    }
    if let Some(tags) = sub.get_many::<String>("tag") {
        for tag in tags {
            let tag = tag.trim();
            if !tag.is_empty() && !t.tags.iter().any(|x| x == tag) {
                t.tags.push(tag.to_string());
            }
        }
    }
    Ok(())
}

pub fn add<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<Transaction> {
    let mut t = Transaction::new("", Decimal::ZERO, TxType::Expense, "", s.today);
    apply_fields(&mut t, sub)?;
    if t.category.is_empty() {
        let known = categories_for(t.dashboard_type);
        let suggested = if sub.get_flag("ai_categorize") && !t.description.is_empty() {
            s.advisor().suggest_category(&t.description, known)
        } else {
            None
        };
        match suggested {
            Some(c) => {
                t.category = c;
                t.ai_categorized = true;
            }
            None => t.category = "other".to_string(),
        }
    }
    t.validate()?;
    let created = s.store.create(&t)?;
    info!(id = %created.id, amount = %created.amount, "transaction added");
    Ok(created)
}

pub fn edit<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<Transaction> {
    let id = required(sub, "id")?;
    let mut t: Transaction = s.store.get(id)?;
    apply_fields(&mut t, sub)?;
    t.validate()?;
    s.store.update(id, &t)
}

/// The list view: one dashboard, then the search box and dropdown filters.
pub fn query_rows<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let dashboard: DashboardType = optional(sub, "dashboard").unwrap_or("personal").parse()?;
    let filter = TransactionFilter {
        search: optional(sub, "search").map(str::to_string).filter(|q| !q.trim().is_empty()),
        category: optional(sub, "category").map(|c| c.trim().to_lowercase()),
        r#type: optional(sub, "type").map(|v| v.parse::<TxType>()).transpose()?,
        date: optional(sub, "range").unwrap_or("all").parse::<DateFilter>()?,
    };
    let all = s.transactions(dashboard)?;
    let mut rows = filter.apply(&all, s.today);
    if let Some(limit) = sub.get_one::<usize>("limit") {
        rows.truncate(*limit);
    }
    Ok(rows)
}

fn list<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let data = query_rows(s, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let ccy = s.currency();
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                let signed = if t.is_income() { t.amount } else { -t.amount };
                let mut flags = Vec::new();
                if t.ai_categorized {
                    flags.push("ai");
                }
                if t.recurring {
                    flags.push("recurring");
                }
                if t.is_tax_deductible {
                    flags.push("tax");
                }
                vec![
                    t.date.to_string(),
                    t.description.clone(),
                    humanize(&t.category),
                    fmt_money(&signed, ccy),
                    t.related_party.clone().unwrap_or_default(),
                    flags.join(","),
                    t.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Description", "Category", "Amount", "Party", "Flags", "Id"],
                rows,
            )
        );
    }
    Ok(())
}

/// Extracts a transaction from a receipt image and saves it unless
/// `--dry-run` is given. Returns the saved record, if any.
pub fn from_receipt<S: EntityStore>(
    s: &Session<S>,
    sub: &clap::ArgMatches,
) -> Result<Option<Transaction>> {
    let path = Path::new(required(sub, "path")?);
    if !path.is_file() {
        return Err(FinmateError::validation(format!("no such file: {}", path.display())).into());
    }
    let dashboard: DashboardType = optional(sub, "dashboard").unwrap_or("personal").parse()?;
    let Some(draft) = s
        .advisor()
        .extract_receipt(path, categories_for(dashboard))
    else {
        println!("Could not read that receipt. Add the transaction manually with `tx add`.");
        return Ok(None);
    };
    let mut t = Transaction::new("Receipt", Decimal::ZERO, TxType::Expense, "other", s.today);
    t.dashboard_type = dashboard;
    draft.apply(&mut t);
    if sub.get_flag("dry_run") {
        println!("{}", serde_json::to_string_pretty(&t)?);
        return Ok(None);
    }
    t.validate()
        .context("Extracted receipt is incomplete; use --dry-run and `tx add` instead")?;
    let created = s.store.create(&t)?;
    info!(id = %created.id, "transaction created from receipt");
    Ok(Some(created))
}

fn receipt<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    if let Some(t) = from_receipt(s, sub)? {
        println!(
            "Recorded {} '{}' on {} [{}] from receipt (id {})",
            fmt_money(&t.amount, s.currency()),
            t.description,
            t.date,
            t.category,
            t.id
        );
    }
    Ok(())
}
