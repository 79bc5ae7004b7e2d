// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{Scripted, parse, session, store_with_profile, sub};
use finmate::commands::transactions;
use finmate::config::Config;
use finmate::error::FinmateError;
use finmate::models::{DashboardType, Transaction, TxType};
use finmate::store::EntityStore;
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::tempdir;

fn add(s: &finmate::commands::Session<finmate::store::SqliteStore>, args: &[&str]) -> Transaction {
    let mut argv = vec!["tx", "add"];
    argv.extend_from_slice(args);
    let m = parse(&argv);
    transactions::add(s, sub(&m, &["tx", "add"])).unwrap()
}

#[test]
fn add_defaults_to_today_expense_other() {
    let store = store_with_profile(common::ME);
    let cfg = Config::default();
    let llm = Scripted::silent();
    let s = session(&store, &cfg, &llm);

    let t = add(&s, &["--desc", "Groceries", "--amount", "42.10"]);
    assert!(!t.id.is_empty());
    assert_eq!(t.r#type, TxType::Expense);
    assert_eq!(t.category, "other");
    assert_eq!(t.date, common::today());
    assert_eq!(t.dashboard_type, DashboardType::Personal);

    let stored: Transaction = store.get(&t.id).unwrap();
    assert_eq!(stored, t);
}

#[test]
fn add_rejects_non_positive_amount() {
    let store = store_with_profile(common::ME);
    let cfg = Config::default();
    let llm = Scripted::silent();
    let s = session(&store, &cfg, &llm);
    let m = parse(&["tx", "add", "--desc", "Refund?", "--amount", "0"]);
    let err = transactions::add(&s, sub(&m, &["tx", "add"])).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FinmateError>(),
        Some(FinmateError::Validation(_))
    ));
}

#[test]
fn ai_categorize_uses_suggestion_and_flags_it() {
    let store = store_with_profile(common::ME);
    let cfg = Config::default();
    let llm = Scripted::new(vec![Ok(json!({ "category": "transport" }))]);
    let s = session(&store, &cfg, &llm);

    let t = add(&s, &["--desc", "Uber to airport", "--amount", "31", "--ai-categorize"]);
    assert_eq!(t.category, "transport");
    assert!(t.ai_categorized);
    assert!(llm.prompts.borrow()[0].contains("Uber to airport"));
}

#[test]
fn ai_categorize_falls_back_to_other() {
    let store = store_with_profile(common::ME);
    let cfg = Config::default();
    let llm = Scripted::silent();
    let s = session(&store, &cfg, &llm);
    let t = add(&s, &["--desc", "Mystery", "--amount", "5", "--ai-categorize"]);
    assert_eq!(t.category, "other");
    assert!(!t.ai_categorized);
}

#[test]
fn list_filters_then_limits_newest_first() {
    let store = store_with_profile(common::ME);
    let cfg = Config::default();
    let llm = Scripted::silent();
    let s = session(&store, &cfg, &llm);

    add(&s, &["--desc", "Coffee", "--amount", "4", "--category", "food", "--date", "2025-08-01"]);
    add(&s, &["--desc", "Coffee beans", "--amount", "12", "--category", "food", "--date", "2025-08-10"]);
    add(&s, &["--desc", "Iced coffee", "--amount", "5", "--category", "food", "--date", "2025-08-14"]);
    add(&s, &["--desc", "Salary", "--amount", "3000", "--type", "income", "--category", "salary", "--date", "2025-08-01"]);
    add(&s, &["--desc", "Coffee", "--amount", "4", "--category", "food", "--date", "2025-07-30"]);
    add(&s, &["--desc", "Coffee", "--amount", "4", "--category", "food", "--dashboard", "business"]);

    let m = parse(&["tx", "list", "--search", "coffee", "--range", "month", "--limit", "2"]);
    let rows = transactions::query_rows(&s, sub(&m, &["tx", "list"])).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].description, "Iced coffee");
    assert_eq!(rows[1].description, "Coffee beans");

    let m = parse(&["tx", "list", "--type", "income"]);
    let rows = transactions::query_rows(&s, sub(&m, &["tx", "list"])).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, Decimal::new(3000, 0));

    let m = parse(&["tx", "list", "--dashboard", "business"]);
    let rows = transactions::query_rows(&s, sub(&m, &["tx", "list"])).unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn edit_patches_only_given_fields() {
    let store = store_with_profile(common::ME);
    let cfg = Config::default();
    let llm = Scripted::silent();
    let s = session(&store, &cfg, &llm);
    let t = add(&s, &["--desc", "Lunch", "--amount", "15", "--category", "food", "--tag", "work"]);

    let m = parse(&["tx", "edit", &t.id, "--amount", "18.50", "--tag", "team", "--recurring"]);
    let edited = transactions::edit(&s, sub(&m, &["tx", "edit"])).unwrap();
    assert_eq!(edited.description, "Lunch");
    assert_eq!(edited.amount, Decimal::new(1850, 2));
    assert_eq!(edited.tags, vec!["work".to_string(), "team".to_string()]);
    assert!(edited.recurring);

    let m = parse(&["tx", "edit", "missing-id", "--amount", "1"]);
    assert!(transactions::edit(&s, sub(&m, &["tx", "edit"])).is_err());
}

#[test]
fn edit_can_clear_flags_and_tags() {
    let store = store_with_profile(common::ME);
    let cfg = Config::default();
    let llm = Scripted::silent();
    let s = session(&store, &cfg, &llm);
    let t = add(&s, &[
        "--desc", "Gym", "--amount", "40", "--category", "health", "--tag", "fitness",
        "--tag", "monthly", "--recurring", "--tax-deductible",
    ]);
    assert!(t.recurring && t.is_tax_deductible);

    let m = parse(&["tx", "edit", &t.id, "--no-recurring", "--no-tax-deductible", "--clear-tags"]);
    let edited = transactions::edit(&s, sub(&m, &["tx", "edit"])).unwrap();
    assert!(!edited.recurring);
    assert!(!edited.is_tax_deductible);
    assert!(edited.tags.is_empty());
    assert_eq!(edited.amount, Decimal::new(40, 0));

    let m = parse(&["tx", "edit", &t.id, "--clear-tags", "--tag", "yearly"]);
    let edited = transactions::edit(&s, sub(&m, &["tx", "edit"])).unwrap();
    assert_eq!(edited.tags, vec!["yearly".to_string()]);

    let clash = finmate::cli::build_cli().try_get_matches_from([
        "finmate", "tx", "edit", t.id.as_str(), "--recurring", "--no-recurring",
    ]);
    assert!(clash.is_err());
}

#[test]
fn receipt_prefills_and_saves_transaction() {
    let store = store_with_profile(common::ME);
    let cfg = Config::default();
    let mut llm = Scripted::silent();
    llm.extraction = json!({
        "status": "success",
        "output": {
            "description": "Green Grocer",
            "amount": 23.4,
            "category": "food",
            "date": "2025-08-12"
        }
    });
    let s = session(&store, &cfg, &llm);

    let dir = tempdir().unwrap();
    let path = dir.path().join("receipt.jpg");
    std::fs::write(&path, b"fake image").unwrap();
    let path_str = path.to_string_lossy().to_string();

    let m = parse(&["tx", "receipt", &path_str]);
    let t = transactions::from_receipt(&s, sub(&m, &["tx", "receipt"]))
        .unwrap()
        .expect("saved");
    assert_eq!(t.description, "Green Grocer");
    assert_eq!(t.amount, Decimal::new(234, 1));
    assert_eq!(t.date.to_string(), "2025-08-12");
    assert!(t.ai_categorized);
    assert_eq!(t.receipt_url.as_deref(), Some("https://files.test/receipt.jpg"));
}

#[test]
fn unreadable_receipt_saves_nothing() {
    let store = store_with_profile(common::ME);
    let cfg = Config::default();
    let llm = Scripted::silent();
    let s = session(&store, &cfg, &llm);

    let dir = tempdir().unwrap();
    let path = dir.path().join("blurry.png");
    std::fs::write(&path, b"???").unwrap();
    let path_str = path.to_string_lossy().to_string();

    let m = parse(&["tx", "receipt", &path_str]);
    assert!(transactions::from_receipt(&s, sub(&m, &["tx", "receipt"])).unwrap().is_none());
    let all: Vec<Transaction> = store.list(None, None).unwrap();
    assert!(all.is_empty());
}
