// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{ME, Scripted, session, store_with_profile};
use finmate::advisor::{CHAT_FALLBACK, Speaker};
use finmate::commands::assistant;
use finmate::config::Config;
use finmate::llm::Unconfigured;
use finmate::models::{Transaction, TxType};
use finmate::store::EntityStore;
use rust_decimal::Decimal;
use serde_json::json;
use std::io::Cursor;

#[test]
fn conversation_keeps_history_until_exit() {
    let store = store_with_profile(ME);
    store
        .create(&Transaction::new(
            "Farmers market",
            Decimal::new(45, 0),
            TxType::Expense,
            "food",
            common::today(),
        ))
        .unwrap();
    let cfg = Config::default();
    let llm = Scripted::new(vec![
        Ok(json!("You spent USD 45 on food.")),
        Ok(json!({ "response": "Try a weekly grocery cap." })),
    ]);
    let s = session(&store, &cfg, &llm);

    let input = Cursor::new("How much on food?\n\nAny tips?\nexit\nnever asked\n");
    let mut out: Vec<u8> = Vec::new();
    let history = assistant::converse(&s, input, &mut out).unwrap();

    assert_eq!(history.len(), 4);
    assert_eq!(history[0].speaker, Speaker::User);
    assert_eq!(history[3].text, "Try a weekly grocery cap.");

    let prompts = llm.prompts.borrow();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("Farmers market"));
    assert!(!prompts[0].contains("Earlier in this conversation"));
    assert!(prompts[1].contains("User: How much on food?"));
    assert!(prompts[1].contains("FinMate: You spent USD 45 on food."));

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("finmate> Try a weekly grocery cap."));
    assert!(!printed.contains("never asked"));
}

#[test]
fn unconfigured_assistant_answers_with_fallback() {
    let store = store_with_profile(ME);
    let cfg = Config::default();
    let s = session(&store, &cfg, &Unconfigured);

    let mut out: Vec<u8> = Vec::new();
    let history = assistant::converse(&s, Cursor::new("hello\n"), &mut out).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].text, CHAT_FALLBACK);
}
