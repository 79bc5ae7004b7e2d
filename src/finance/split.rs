// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Split-bill creation, settlement and sharing.
//!
//! Settlement keeps no payment ledger: each payment bumps the participant's
//! cumulative `amount_paid`, and the whole participants array is written back.

use anyhow::Result;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::HashSet;

use crate::error::FinmateError;
use crate::models::{Participant, SplitBill, SplitStatus};
use crate::utils::fmt_money;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern"));

/// Someone on the bill, before shares are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub email: String,
    pub name: String,
}

impl Person {
    pub fn new(email: &str, name: &str) -> Person {
        Person {
            email: email.trim().to_string(),
            name: name.trim().to_string(),
        }
    }

    /// Parses `email` or `email:Name`.
    pub fn parse(raw: &str) -> Person {
        match raw.split_once(':') {
            Some((email, name)) => Person::new(email, name),
            None => {
                let email = raw.trim();
                let name = email.split('@').next().unwrap_or(email);
                Person::new(email, name)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewSplit {
    pub title: String,
    pub total_amount: Decimal,
    pub category: String,
    pub bill_date: NaiveDate,
    pub notes: Option<String>,
    pub creator: Person,
    pub others: Vec<Person>,
}

/// Equal shares of `total` across `n` people, in cents. Leftover cents go to
/// the first shares so the result always sums to `total`.
pub fn equal_shares(total: Decimal, n: usize) -> Vec<Decimal> {
    if n == 0 {
        return Vec::new();
    }
    let count = Decimal::from(n);
    let base = (total / count).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let cent = Decimal::new(1, 2);
    let mut leftover = total - base * count;
    let mut shares = Vec::with_capacity(n);
    for _ in 0..n {
        if leftover >= cent {
            shares.push(base + cent);
            leftover -= cent;
        } else {
            shares.push(base);
        }
    }
    // Sub-cent totals: fold any remainder into the first share.
    if !leftover.is_zero() {
        shares[0] += leftover;
    }
    shares
}

fn check_email(email: &str) -> Result<(), FinmateError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(FinmateError::validation(format!(
            "'{}' is not a valid email address",
            email
        )))
    }
}

/// Builds the bill the create form submits: creator first, having paid the
/// whole total; everyone else owes an equal share.
pub fn create(new: NewSplit) -> Result<SplitBill, FinmateError> {
    if new.title.trim().is_empty() {
        return Err(FinmateError::validation("split title is required"));
    }
    if new.total_amount <= Decimal::ZERO {
        return Err(FinmateError::validation(
            "total amount must be greater than zero",
        ));
    }
    check_email(&new.creator.email)?;

    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(new.creator.email.to_lowercase());
    let mut others = Vec::new();
    for p in new.others {
        check_email(&p.email)?;
        if !seen.insert(p.email.to_lowercase()) {
            return Err(FinmateError::validation(format!(
                "'{}' is already on this bill",
                p.email
            )));
        }
        others.push(p);
    }

    let shares = equal_shares(new.total_amount, others.len() + 1);
    let mut participants = Vec::with_capacity(shares.len());
    participants.push(Participant {
        email: new.creator.email.clone(),
        name: new.creator.name.clone(),
        amount_owed: shares[0],
        amount_paid: new.total_amount,
        settled: new.total_amount >= shares[0],
        is_creator: true,
    });
    for (p, share) in others.into_iter().zip(shares.into_iter().skip(1)) {
        participants.push(Participant {
            email: p.email,
            name: p.name,
            amount_owed: share,
            amount_paid: Decimal::ZERO,
            settled: false,
            is_creator: false,
        });
    }

    let mut bill = SplitBill {
        id: String::new(),
        title: new.title.trim().to_string(),
        total_amount: new.total_amount,
        category: new.category,
        bill_date: new.bill_date,
        notes: new.notes.filter(|n| !n.trim().is_empty()),
        created_by: new.creator.email,
        status: SplitStatus::Active,
        participants,
    };
    bill.status = status_for(&bill.participants);
    Ok(bill)
}

fn status_for(participants: &[Participant]) -> SplitStatus {
    if participants.iter().all(|p| p.settled) {
        SplitStatus::Settled
    } else {
        SplitStatus::Active
    }
}

/// Applies a payment from `email` and returns the updated bill.
pub fn record_payment(
    bill: &SplitBill,
    email: &str,
    payment: Decimal,
) -> Result<SplitBill, FinmateError> {
    if bill.status == SplitStatus::Settled {
        return Err(FinmateError::AlreadySettled(bill.title.clone()));
    }
    let mut updated = bill.clone();
    let p = updated
        .participants
        .iter_mut()
        .find(|p| p.email.eq_ignore_ascii_case(email))
        .ok_or_else(|| FinmateError::UnknownParticipant {
            email: email.to_string(),
            bill: bill.title.clone(),
        })?;
    let remaining = p.remaining();
    if payment <= Decimal::ZERO || payment > remaining {
        return Err(FinmateError::InvalidPayment { payment, remaining });
    }
    p.amount_paid += payment;
    p.settled = p.amount_paid >= p.amount_owed;
    updated.status = status_for(&updated.participants);
    Ok(updated)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SplitStats {
    pub you_owe: Decimal,
    pub you_are_owed: Decimal,
    pub active_splits: usize,
}

/// Balances for `me` across active bills.
pub fn stats(bills: &[SplitBill], me: &str) -> SplitStats {
    let mut s = SplitStats::default();
    for bill in bills.iter().filter(|b| b.status == SplitStatus::Active) {
        s.active_splits += 1;
        if bill.created_by.eq_ignore_ascii_case(me) {
            s.you_are_owed += bill
                .participants
                .iter()
                .filter(|p| !p.email.eq_ignore_ascii_case(me) && !p.settled)
                .map(Participant::remaining)
                .sum::<Decimal>();
        } else if let Some(mine) = bill
            .participants
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(me))
        {
            if !mine.settled {
                s.you_owe += mine.remaining();
            }
        }
    }
    s
}

/// Other participants who still owe money on `bill`.
pub fn outstanding<'a>(bill: &'a SplitBill, me: &str) -> Vec<&'a Participant> {
    bill.participants
        .iter()
        .filter(|p| !p.email.eq_ignore_ascii_case(me) && !p.settled && p.remaining() > Decimal::ZERO)
        .collect()
}

pub fn share_message(bill: &SplitBill, currency: &str) -> String {
    let mut msg = String::from("🧾 Split Bill Alert!\n\n");
    msg.push_str(&format!("📋 {}\n", bill.title));
    msg.push_str(&format!("💰 Total: {}\n", fmt_money(&bill.total_amount, currency)));
    msg.push_str(&format!("📅 Date: {}\n\n", bill.bill_date.format("%B %-d, %Y")));
    msg.push_str("💸 Amount breakdown:\n");
    for p in bill.participants.iter().filter(|p| !p.is_creator) {
        msg.push_str(&format!(
            "• {}: owes {}\n",
            p.display_name(),
            fmt_money(&p.amount_owed, currency)
        ));
    }
    if let Some(notes) = &bill.notes {
        msg.push_str(&format!("\n📝 Notes: {}\n", notes));
    }
    if let Some(creator) = bill.participants.iter().find(|p| p.is_creator) {
        msg.push_str(&format!(
            "\nPlease pay {} your share. Thanks! 🙏",
            creator.display_name()
        ));
    }
    msg
}

pub fn reminder_message(bill: &SplitBill, p: &Participant, currency: &str, sender: &str) -> String {
    let notes = match &bill.notes {
        Some(n) => format!("📝 {}\n\n", n),
        None => String::new(),
    };
    format!(
        "Hi {}! 👋\n\nJust a friendly reminder about our bill:\n\n📋 {}\n💰 Your share: {}\n📅 From: {}\n\n{}Please let me know when you can settle this. Thanks! 🙏\n\n- {}",
        p.display_name(),
        bill.title,
        fmt_money(&p.remaining(), currency),
        bill.bill_date.format("%B %-d, %Y"),
        notes,
        sender
    )
}

pub fn whatsapp_link(message: &str) -> Result<String> {
    let url = Url::parse_with_params("https://wa.me/", &[("text", message)])?;
    Ok(url.to_string())
}

pub fn mailto_link(to: &str, subject: &str, body: &str) -> Result<String> {
    let url = Url::parse_with_params(
        &format!("mailto:{}", to),
        &[("subject", subject), ("body", body)],
    )?;
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::fixtures::{d, dec};

    fn dinner(total: &str, others: &[&str]) -> SplitBill {
        create(NewSplit {
            title: "Dinner".into(),
            total_amount: dec(total),
            category: "food".into(),
            bill_date: d("2025-08-09"),
            notes: None,
            creator: Person::new("me@example.com", "Me"),
            others: others.iter().map(|e| Person::parse(e)).collect(),
        })
        .unwrap()
    }

    #[test]
    fn shares_always_sum_to_total() {
        for (total, n) in [("100", 3), ("10", 4), ("0.05", 3), ("99.99", 7), ("1", 1)] {
            let shares = equal_shares(dec(total), n);
            assert_eq!(shares.len(), n);
            assert_eq!(shares.iter().copied().sum::<Decimal>(), dec(total), "{total}/{n}");
        }
        assert_eq!(
            equal_shares(dec("100"), 3),
            vec![dec("33.34"), dec("33.33"), dec("33.33")]
        );
    }

    #[test]
    fn creator_has_paid_and_is_settled() {
        let bill = dinner("90", &["a@example.com:Ann", "b@example.com"]);
        let creator = &bill.participants[0];
        assert!(creator.is_creator);
        assert_eq!(creator.amount_paid, dec("90"));
        assert!(creator.settled);
        assert_eq!(bill.participants[2].name, "b");
        assert_eq!(bill.status, SplitStatus::Active);
    }

    #[test]
    fn duplicate_and_invalid_emails_rejected() {
        let base = NewSplit {
            title: "x".into(),
            total_amount: dec("10"),
            category: "other".into(),
            bill_date: d("2025-08-09"),
            notes: None,
            creator: Person::new("me@example.com", "Me"),
            others: vec![Person::new("ME@example.com", "Again")],
        };
        assert!(create(base.clone()).is_err());
        let bad = NewSplit {
            others: vec![Person::new("not-an-email", "?")],
            ..base
        };
        assert!(matches!(create(bad), Err(FinmateError::Validation(_))));
    }

    #[test]
    fn payments_settle_participants_then_bill() {
        let bill = dinner("60", &["a@example.com", "b@example.com"]);
        let bill = record_payment(&bill, "a@example.com", dec("5")).unwrap();
        assert_eq!(bill.participants[1].amount_paid, dec("5"));
        assert!(!bill.participants[1].settled);

        let bill = record_payment(&bill, "A@example.com", dec("15")).unwrap();
        assert!(bill.participants[1].settled);
        assert_eq!(bill.status, SplitStatus::Active);

        let bill = record_payment(&bill, "b@example.com", dec("20")).unwrap();
        assert_eq!(bill.status, SplitStatus::Settled);

        assert!(matches!(
            record_payment(&bill, "b@example.com", dec("1")),
            Err(FinmateError::AlreadySettled(_))
        ));
    }

    #[test]
    fn overpayment_and_strangers_rejected() {
        let bill = dinner("60", &["a@example.com"]);
        assert!(matches!(
            record_payment(&bill, "a@example.com", dec("30.01")),
            Err(FinmateError::InvalidPayment { .. })
        ));
        assert!(matches!(
            record_payment(&bill, "a@example.com", Decimal::ZERO),
            Err(FinmateError::InvalidPayment { .. })
        ));
        assert!(matches!(
            record_payment(&bill, "z@example.com", dec("1")),
            Err(FinmateError::UnknownParticipant { .. })
        ));
    }

    #[test]
    fn stats_from_both_sides() {
        let mine = dinner("60", &["a@example.com"]);
        let mut theirs = dinner("40", &["me2@example.com"]);
        theirs.created_by = "a@example.com".into();
        let me = stats(&[mine.clone(), theirs.clone()], "me@example.com");
        assert_eq!(me.you_are_owed, dec("30"));
        assert_eq!(me.active_splits, 2);

        let other = stats(&[mine, theirs], "me2@example.com");
        assert_eq!(other.you_owe, dec("20"));
    }

    #[test]
    fn share_message_lists_everyone_but_creator() {
        let mut bill = dinner("30", &["a@example.com:Ann", "b@example.com:Bob"]);
        bill.notes = Some("Thai place".into());
        let msg = share_message(&bill, "USD");
        assert!(msg.contains("• Ann: owes USD 10.00"));
        assert!(msg.contains("• Bob: owes USD 10.00"));
        assert!(!msg.contains("• Me"));
        assert!(msg.contains("📝 Notes: Thai place"));
        assert!(msg.ends_with("Please pay Me your share. Thanks! 🙏"));
        let link = whatsapp_link("hi there").unwrap();
        assert_eq!(link, "https://wa.me/?text=hi+there");
        assert!(mailto_link("a@example.com", "Dinner", "pay").unwrap().starts_with("mailto:a@example.com?"));
    }
}
