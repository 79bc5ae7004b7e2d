// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{Scripted, parse, session, store_with_profile, sub};
use finmate::commands::budgets;
use finmate::config::Config;
use finmate::finance::budget::BudgetLevel;
use finmate::models::{Budget, Transaction, TxType};
use finmate::store::EntityStore;
use rust_decimal::Decimal;
use serde_json::json;

fn expense(store: &impl EntityStore, category: &str, amount: i64, date: &str) {
    let t = Transaction::new(
        "x",
        Decimal::new(amount, 0),
        TxType::Expense,
        category,
        date.parse().unwrap(),
    );
    store.create(&t).unwrap();
}

#[test]
fn set_defaults_to_current_month_and_upserts() {
    let store = store_with_profile(common::ME);
    let cfg = Config::default();
    let llm = Scripted::silent();
    let s = session(&store, &cfg, &llm);

    let m = parse(&["budget", "set", "--category", "Food", "--limit", "300"]);
    let first = budgets::set(&s, sub(&m, &["budget", "set"])).unwrap();
    assert_eq!(first.month, "2025-08");
    assert_eq!(first.category, "food");

    let m = parse(&["budget", "set", "--category", "food", "--limit", "450"]);
    let second = budgets::set(&s, sub(&m, &["budget", "set"])).unwrap();
    assert_eq!(second.id, first.id);

    let all: Vec<Budget> = store.list(None, None).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].monthly_limit, Decimal::new(450, 0));
}

#[test]
fn view_recomputes_spent_for_the_month() {
    let store = store_with_profile(common::ME);
    let cfg = Config::default();
    let llm = Scripted::silent();
    let s = session(&store, &cfg, &llm);

    for (cat, limit) in [("food", "200"), ("transport", "100")] {
        let m = parse(&["budget", "set", "--category", cat, "--limit", limit]);
        budgets::set(&s, sub(&m, &["budget", "set"])).unwrap();
    }
    expense(&store, "food", 120, "2025-08-03");
    expense(&store, "food", 50, "2025-08-20");
    expense(&store, "food", 500, "2025-07-20");
    expense(&store, "transport", 130, "2025-08-05");

    let v = budgets::view(&s, "2025-08").unwrap();
    let food = v.budgets.iter().find(|b| b.budget.category == "food").unwrap();
    assert_eq!(food.spent, Decimal::new(170, 0));
    assert_eq!(food.level, BudgetLevel::Warning);
    let transport = v.budgets.iter().find(|b| b.budget.category == "transport").unwrap();
    assert_eq!(transport.level, BudgetLevel::Over);
    assert_eq!(transport.progress, Decimal::ONE_HUNDRED);

    assert_eq!(v.summary.total_budget, Decimal::new(300, 0));
    assert_eq!(v.summary.total_spent, Decimal::new(300, 0));
    assert_eq!(v.summary.remaining, Decimal::ZERO);
}

#[test]
fn suggestions_cover_unbudgeted_categories() {
    let store = store_with_profile(common::ME);
    let cfg = Config::default();
    let llm = Scripted::new(vec![Ok(json!({
        "suggestions": [
            {"category": "shopping", "reason": "USD 80 on shopping"},
            {"category": "travel", "reason": "trips add up"},
            {"category": "extra", "reason": "ignored"}
        ]
    }))]);
    let s = session(&store, &cfg, &llm);
    let m = parse(&["budget", "set", "--category", "food", "--limit", "100"]);
    budgets::set(&s, sub(&m, &["budget", "set"])).unwrap();
    expense(&store, "food", 40, "2025-08-02");
    expense(&store, "shopping", 80, "2025-08-02");

    let got = budgets::suggestions(&s).unwrap();
    assert_eq!(got.len(), 2);
    assert_eq!(got[0].category, "shopping");

    let prompt = &llm.prompts.borrow()[0];
    assert!(prompt.contains("shopping"));
    assert!(!prompt.contains("\"food\""));
}

#[test]
fn suggestions_empty_when_assistant_unavailable() {
    let store = store_with_profile(common::ME);
    let cfg = Config::default();
    let llm = Scripted::silent();
    let s = session(&store, &cfg, &llm);
    expense(&store, "shopping", 80, "2025-08-02");
    assert!(budgets::suggestions(&s).unwrap().is_empty());
}
