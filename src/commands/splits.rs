// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing::info;

use super::{Session, json_flags, optional, required};
use crate::error::FinmateError;
use crate::finance::split::{self, NewSplit, Person, SplitStats};
use crate::models::{SplitBill, SplitStatus};
use crate::store::{EntityStore, Query, Sort};
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};

pub fn handle<S: EntityStore>(s: &Session<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("create", sub)) => {
            let bill = create(s, sub)?;
            println!(
                "Created split '{}' for {} across {} people (id {})",
                bill.title,
                fmt_money(&bill.total_amount, s.currency()),
                bill.participants.len(),
                bill.id
            );
            println!("Share it with: finmate split share {}", bill.id);
        }
        Some(("list", sub)) => list(s, sub)?,
        Some(("pay", sub)) => {
            let bill = pay(s, sub)?;
            if bill.status == SplitStatus::Settled {
                println!("Payment recorded. '{}' is fully settled.", bill.title);
            } else {
                println!("Payment recorded on '{}'.", bill.title);
            }
        }
        Some(("stats", sub)) => {
            let (json_flag, jsonl_flag) = json_flags(sub);
            let st = stats(s)?;
            if !maybe_print_json(json_flag, jsonl_flag, &st)? {
                let ccy = s.currency();
                println!("You owe:        {}", fmt_money(&st.you_owe, ccy));
                println!("You are owed:   {}", fmt_money(&st.you_are_owed, ccy));
                println!("Active splits:  {}", st.active_splits);
            }
        }
        Some(("share", sub)) => {
            let bill: SplitBill = s.store.get(required(sub, "id")?)?;
            let msg = split::share_message(&bill, s.currency());
            println!("{}\n", msg);
            println!("WhatsApp: {}", split::whatsapp_link(&msg)?);
        }
        Some(("remind", sub)) => remind(s, sub)?,
        _ => {}
    }
    Ok(())
}

fn my_email<'a, S: EntityStore>(s: &'a Session<'_, S>) -> Result<&'a str> {
    let email = s.profile.email.trim();
    if email.is_empty() {
        return Err(FinmateError::validation(
            "set your email first: finmate profile set --email you@example.com",
        )
        .into());
    }
    Ok(email)
}

pub fn create<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<SplitBill> {
    let email = my_email(s)?;
    let creator = if s.profile.full_name.trim().is_empty() {
        Person::parse(email)
    } else {
        Person::new(email, &s.profile.full_name)
    };
    let others: Vec<Person> = sub
        .get_many::<String>("with")
        .map(|vals| vals.map(|v| Person::parse(v)).collect())
        .unwrap_or_default();
    let bill = split::create(NewSplit {
        title: required(sub, "title")?.to_string(),
        total_amount: parse_decimal(required(sub, "amount")?)?,
        category: optional(sub, "category").unwrap_or("food").trim().to_lowercase(),
        bill_date: match optional(sub, "date") {
            Some(d) => parse_date(d)?,
            None => s.today,
        },
        notes: optional(sub, "notes").map(str::to_string),
        creator,
        others,
    })?;
    let saved = s.store.create(&bill)?;
    info!(id = %saved.id, total = %saved.total_amount, "split created");
    Ok(saved)
}

/// Bills the signed-in user created or takes part in, newest first.
pub fn my_bills<S: EntityStore>(s: &Session<S>, status: Option<SplitStatus>) -> Result<Vec<SplitBill>> {
    let me = my_email(s)?;
    let query = match status {
        Some(st) => Query::new().eq("status", st.to_string()),
        None => Query::new(),
    };
    let bills: Vec<SplitBill> = s.store.filter(&query, Some(&Sort::desc("bill_date")), None)?;
    Ok(bills
        .into_iter()
        .filter(|b| {
            b.created_by.eq_ignore_ascii_case(me)
                || b.participants.iter().any(|p| p.email.eq_ignore_ascii_case(me))
        })
        .collect())
}

fn list<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let status = match optional(sub, "status").unwrap_or("active") {
        "all" => None,
        other => Some(other.parse::<SplitStatus>()?),
    };
    let bills = my_bills(s, status)?;
    if maybe_print_json(json_flag, jsonl_flag, &bills)? {
        return Ok(());
    }
    let ccy = s.currency();
    let rows: Vec<Vec<String>> = bills
        .iter()
        .map(|b| {
            let settled = b.participants.iter().filter(|p| p.settled).count();
            vec![
                b.bill_date.to_string(),
                b.title.clone(),
                fmt_money(&b.total_amount, ccy),
                format!("{}/{}", settled, b.participants.len()),
                b.status.to_string(),
                b.id.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "Title", "Total", "Settled", "Status", "Id"], rows)
    );
    Ok(())
}

pub fn pay<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<SplitBill> {
    let id = required(sub, "id")?;
    let payer = match optional(sub, "email") {
        Some(e) => e.trim().to_string(),
        None => my_email(s)?.to_string(),
    };
    let amount = parse_decimal(required(sub, "amount")?)?;
    let bill: SplitBill = s.store.get(id)?;
    let updated = split::record_payment(&bill, &payer, amount)?;
    let saved = s.store.update(id, &updated)?;
    info!(id, payer = %payer, %amount, status = %saved.status, "split payment");
    Ok(saved)
}

pub fn stats<S: EntityStore>(s: &Session<S>) -> Result<SplitStats> {
    let me = my_email(s)?.to_string();
    let bills = my_bills(s, Some(SplitStatus::Active))?;
    Ok(split::stats(&bills, &me))
}

fn remind<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let me = my_email(s)?;
    let bill: SplitBill = s.store.get(required(sub, "id")?)?;
    let only = optional(sub, "email");
    let targets: Vec<_> = split::outstanding(&bill, me)
        .into_iter()
        .filter(|p| only.is_none_or(|e| p.email.eq_ignore_ascii_case(e)))
        .collect();
    if targets.is_empty() {
        println!("Nobody on '{}' needs a reminder.", bill.title);
        return Ok(());
    }
    let subject = format!("Reminder: {}", bill.title);
    for p in targets {
        let msg = split::reminder_message(&bill, p, s.currency(), s.profile.signature());
        println!("── {} <{}>", p.display_name(), p.email);
        println!("{}\n", msg);
        println!("Email:    {}", split::mailto_link(&p.email, &subject, &msg)?);
        println!("WhatsApp: {}\n", split::whatsapp_link(&msg)?);
    }
    Ok(())
}
