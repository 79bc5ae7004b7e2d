// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use finmate::config::Config;
use finmate::error::FinmateError;
use finmate::models::{Budget, DashboardType, Transaction, TxType, UserProfile};
use finmate::store::{Backend, EntityStore, Query, Sort, SqliteStore};
use rust_decimal::Decimal;
use tempfile::tempdir;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
}

fn tx(desc: &str, kind: TxType, date: NaiveDate) -> Transaction {
    Transaction::new(desc, Decimal::new(1000, 2), kind, "food", date)
}

#[test]
fn filter_combines_clauses_sort_and_limit() {
    let store = SqliteStore::in_memory().unwrap();
    store.create(&tx("a", TxType::Expense, day(1))).unwrap();
    store.create(&tx("b", TxType::Income, day(5))).unwrap();
    store.create(&tx("c", TxType::Expense, day(9))).unwrap();
    store.create(&tx("d", TxType::Expense, day(20))).unwrap();
    let mut biz = tx("e", TxType::Expense, day(10));
    biz.dashboard_type = DashboardType::Business;
    store.create(&biz).unwrap();

    let q = Query::new()
        .eq("type", "expense")
        .eq("dashboard_type", "personal")
        .gte("date", "2025-08-01")
        .lte("date", "2025-08-15");
    let got: Vec<Transaction> = store.filter(&q, Some(&Sort::desc("date")), None).unwrap();
    let names: Vec<&str> = got.iter().map(|t| t.description.as_str()).collect();
    assert_eq!(names, vec!["c", "a"]);

    let newest: Vec<Transaction> = store.list(Some(&Sort::parse("-date").unwrap()), Some(2)).unwrap();
    assert_eq!(newest[0].description, "d");
    assert_eq!(newest.len(), 2);

    let oldest: Vec<Transaction> = store.list(Some(&Sort::asc("date")), Some(1)).unwrap();
    assert_eq!(oldest[0].description, "a");
}

#[test]
fn boolean_fields_are_filterable() {
    let store = SqliteStore::in_memory().unwrap();
    let mut t = tx("tagged", TxType::Expense, day(2));
    t.recurring = true;
    store.create(&t).unwrap();
    store.create(&tx("plain", TxType::Expense, day(3))).unwrap();

    let got: Vec<Transaction> = store
        .filter(&Query::new().eq("recurring", true), None, None)
        .unwrap();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].description, "tagged");
}

#[test]
fn entity_kinds_do_not_mix() {
    let store = SqliteStore::in_memory().unwrap();
    store.create(&tx("a", TxType::Expense, day(1))).unwrap();
    let budgets: Vec<Budget> = store.list(None, None).unwrap();
    assert!(budgets.is_empty());
}

#[test]
fn update_and_delete_report_missing_records() {
    let store = SqliteStore::in_memory().unwrap();
    let saved = store.create(&tx("a", TxType::Expense, day(1))).unwrap();

    let mut changed = saved.clone();
    changed.description = "renamed".into();
    let updated = store.update(&saved.id, &changed).unwrap();
    assert_eq!(updated.id, saved.id);
    let fetched: Transaction = store.get(&saved.id).unwrap();
    assert_eq!(fetched.description, "renamed");

    let err = store.update("missing", &changed).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FinmateError>(),
        Some(FinmateError::NotFound { entity: "Transaction", .. })
    ));

    assert!(store.delete::<Transaction>(&saved.id).unwrap());
    assert!(!store.delete::<Transaction>(&saved.id).unwrap());
    assert!(store.get::<Transaction>(&saved.id).is_err());
}

#[test]
fn unsafe_field_names_are_rejected() {
    let store = SqliteStore::in_memory().unwrap();
    let q = Query::new().eq("date') OR 1=1 --", "x");
    assert!(store.filter::<Transaction>(&q, None, None).is_err());
}

#[test]
fn profile_defaults_then_persists_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("finmate.db");
    {
        let store = SqliteStore::open(&path).unwrap();
        let fresh = store.me().unwrap();
        assert_eq!(fresh, UserProfile::default());
        assert_eq!(fresh.currency, "USD");

        let mut p = fresh;
        p.full_name = "Morgan".into();
        p.currency = "EUR".into();
        store.update_me(&p).unwrap();
        store.create(&tx("kept", TxType::Expense, day(4))).unwrap();
    }
    let cfg = Config {
        db_path: Some(path.clone()),
        ..Config::default()
    };
    let backend = Backend::from_config(&cfg).unwrap();
    assert!(backend.describe().starts_with("local store at"));
    assert_eq!(backend.me().unwrap().currency, "EUR");
    let all: Vec<Transaction> = backend.list(None, None).unwrap();
    assert_eq!(all.len(), 1);
}
