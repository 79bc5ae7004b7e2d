// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing::info;

use super::{Session, json_flags, optional};
use crate::error::FinmateError;
use crate::models::UserProfile;
use crate::store::EntityStore;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle<S: EntityStore>(s: &Session<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let (json_flag, jsonl_flag) = json_flags(sub);
            let p = s.store.me()?;
            if !maybe_print_json(json_flag, jsonl_flag, &p)? {
                let rows = vec![
                    vec!["Name".to_string(), p.full_name.clone()],
                    vec!["Email".to_string(), p.email.clone()],
                    vec!["Currency".to_string(), p.currency.clone()],
                    vec!["Theme".to_string(), p.theme.to_string()],
                    vec!["Email notifications".to_string(), p.email_notifications.to_string()],
                    vec!["Push notifications".to_string(), p.push_notifications.to_string()],
                    vec!["Frequency".to_string(), p.notification_frequency.to_string()],
                    vec!["Goals".to_string(), p.financial_goals.len().to_string()],
                ];
                println!("{}", pretty_table(&["Setting", "Value"], rows));
            }
        }
        Some(("set", sub)) => {
            set(s, sub)?;
            println!("Profile saved.");
        }
        _ => {}
    }
    Ok(())
}

fn check_currency(code: &str) -> Result<String, FinmateError> {
    let code = code.trim().to_uppercase();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(FinmateError::validation(format!(
            "'{}' is not a three-letter currency code",
            code
        )))
    }
}

/// Applies the given settings to the stored profile and saves it wholesale.
pub fn set<S: EntityStore>(s: &Session<S>, sub: &clap::ArgMatches) -> Result<UserProfile> {
    let mut p = s.store.me()?;
    if let Some(v) = optional(sub, "name") {
        p.full_name = v.trim().to_string();
    }
    if let Some(v) = optional(sub, "email") {
        p.email = v.trim().to_string();
    }
    if let Some(v) = optional(sub, "currency") {
        p.currency = check_currency(v)?;
    }
    if let Some(v) = optional(sub, "theme") {
        p.theme = v.parse()?;
    }
    if let Some(v) = sub.get_one::<bool>("email_notifications") {
        p.email_notifications = *v;
    }
    if let Some(v) = sub.get_one::<bool>("push_notifications") {
        p.push_notifications = *v;
    }
    if let Some(v) = optional(sub, "frequency") {
        p.notification_frequency = v.parse()?;
    }
    let saved = s.store.update_me(&p)?;
    info!(currency = %saved.currency, "profile updated");
    Ok(saved)
}
