// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use std::path::Path;

use super::{Session, required};
use crate::models::Transaction;
use crate::store::{EntityStore, Sort};

pub fn handle<S: EntityStore>(s: &Session<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(s, sub),
        _ => Ok(()),
    }
}

fn export_transactions<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required(sub, "format")?.to_lowercase();
    let out = required(sub, "out")?;
    let n = write_transactions(s, &fmt, Path::new(out))?;
    println!("Exported {} transactions to {}", n, out);
    Ok(())
}

/// Writes every transaction, oldest first. Returns how many were written.
pub fn write_transactions<S: EntityStore>(s: &Session<S>, fmt: &str, out: &Path) -> Result<usize> {
    let txs: Vec<Transaction> = s.store.list(Some(&Sort::asc("date")), None)?;
    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Create {}", out.display()))?;
            wtr.write_record([
                "id",
                "date",
                "description",
                "type",
                "amount",
                "currency",
                "category",
                "dashboard",
                "related_party",
                "invoice_number",
                "tax_deductible",
                "recurring",
                "tags",
            ])?;
            for t in &txs {
                wtr.write_record([
                    t.id.clone(),
                    t.date.to_string(),
                    t.description.clone(),
                    t.r#type.to_string(),
                    t.amount.to_string(),
                    s.currency().to_string(),
                    t.category.clone(),
                    t.dashboard_type.to_string(),
                    t.related_party.clone().unwrap_or_default(),
                    t.invoice_number.clone().unwrap_or_default(),
                    t.is_tax_deductible.to_string(),
                    t.recurring.to_string(),
                    t.tags.join(";"),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&txs)?)
                .with_context(|| format!("Write {}", out.display()))?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    Ok(txs.len())
}
