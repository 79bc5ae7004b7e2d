// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{ME, Scripted, parse, session, store_with_profile, sub};
use finmate::commands::splits;
use finmate::config::Config;
use finmate::error::FinmateError;
use finmate::models::{SplitBill, SplitStatus};
use finmate::store::{EntityStore, SqliteStore};
use rust_decimal::Decimal;

fn dinner(store: &SqliteStore, cfg: &Config, llm: &Scripted) -> SplitBill {
    let s = session(store, cfg, llm);
    let m = parse(&[
        "split",
        "create",
        "--title",
        "Team dinner",
        "--amount",
        "100",
        "--with",
        "ann@example.com:Ann",
        "--with",
        "bob@example.com",
        "--date",
        "2025-08-09",
    ]);
    splits::create(&s, sub(&m, &["split", "create"])).unwrap()
}

#[test]
fn create_splits_equally_and_persists() {
    let store = store_with_profile(ME);
    let cfg = Config::default();
    let llm = Scripted::silent();
    let bill = dinner(&store, &cfg, &llm);

    assert_eq!(bill.created_by, ME);
    assert_eq!(bill.participants.len(), 3);
    let creator = &bill.participants[0];
    assert_eq!(creator.name, "Morgan");
    assert!(creator.settled);
    let owed: Decimal = bill.participants.iter().map(|p| p.amount_owed).sum();
    assert_eq!(owed, Decimal::new(100, 0));

    let stored: SplitBill = store.get(&bill.id).unwrap();
    assert_eq!(stored, bill);
}

#[test]
fn create_requires_profile_email() {
    let store = store_with_profile("");
    let cfg = Config::default();
    let llm = Scripted::silent();
    let s = session(&store, &cfg, &llm);
    let m = parse(&["split", "create", "--title", "x", "--amount", "10", "--with", "a@example.com"]);
    assert!(splits::create(&s, sub(&m, &["split", "create"])).is_err());
}

#[test]
fn payments_settle_bill_and_update_stats() {
    let store = store_with_profile(ME);
    let cfg = Config::default();
    let llm = Scripted::silent();
    let bill = dinner(&store, &cfg, &llm);
    let s = session(&store, &cfg, &llm);

    let before = splits::stats(&s).unwrap();
    assert_eq!(before.active_splits, 1);
    assert_eq!(before.you_are_owed, Decimal::new(6666, 2));

    let ann = bill.participants[1].amount_owed.to_string();
    let m = parse(&["split", "pay", &bill.id, "--email", "ann@example.com", "--amount", &ann]);
    let after_ann = splits::pay(&s, sub(&m, &["split", "pay"])).unwrap();
    assert_eq!(after_ann.status, SplitStatus::Active);

    let m = parse(&["split", "pay", &bill.id, "--email", "bob@example.com", "--amount", "50"]);
    let err = splits::pay(&s, sub(&m, &["split", "pay"])).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FinmateError>(),
        Some(FinmateError::InvalidPayment { .. })
    ));

    let bob = bill.participants[2].amount_owed.to_string();
    let m = parse(&["split", "pay", &bill.id, "--email", "bob@example.com", "--amount", &bob]);
    let done = splits::pay(&s, sub(&m, &["split", "pay"])).unwrap();
    assert_eq!(done.status, SplitStatus::Settled);

    let stored: SplitBill = store.get(&bill.id).unwrap();
    assert_eq!(stored.status, SplitStatus::Settled);

    let after = splits::stats(&s).unwrap();
    assert_eq!(after.active_splits, 0);
    assert_eq!(after.you_are_owed, Decimal::ZERO);
}

#[test]
fn participant_sees_what_they_owe() {
    let store = store_with_profile(ME);
    let cfg = Config::default();
    let llm = Scripted::silent();
    let bill = dinner(&store, &cfg, &llm);

    let mut profile = store.me().unwrap();
    profile.email = "bob@example.com".into();
    store.update_me(&profile).unwrap();
    let s = session(&store, &cfg, &llm);

    let st = splits::stats(&s).unwrap();
    assert_eq!(st.you_owe, bill.participants[2].amount_owed);
    assert_eq!(st.you_are_owed, Decimal::ZERO);

    let mine = splits::my_bills(&s, None).unwrap();
    assert_eq!(mine.len(), 1);
}
