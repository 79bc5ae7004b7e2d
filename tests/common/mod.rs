// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::ArgMatches;
use serde_json::Value;
use std::cell::RefCell;
use std::path::Path;

use finmate::cli;
use finmate::commands::Session;
use finmate::config::Config;
use finmate::llm::{Extraction, LlmClient};
use finmate::models::UserProfile;
use finmate::store::{EntityStore, SqliteStore};

pub const ME: &str = "me@example.com";

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()
}

/// LLM double: answers `invoke` from a queue, `extract` with a fixed reply,
/// and records every prompt it was given.
pub struct Scripted {
    replies: RefCell<Vec<Result<Value>>>,
    pub prompts: RefCell<Vec<String>>,
    pub extraction: Value,
}

impl Scripted {
    pub fn new(replies: Vec<Result<Value>>) -> Scripted {
        Scripted {
            replies: RefCell::new(replies),
            prompts: RefCell::new(Vec::new()),
            extraction: serde_json::json!({ "status": "error" }),
        }
    }

    pub fn silent() -> Scripted {
        Scripted::new(Vec::new())
    }
}

impl LlmClient for Scripted {
    fn invoke(&self, prompt: &str, _schema: Option<&Value>) -> Result<Value> {
        self.prompts.borrow_mut().push(prompt.to_string());
        let mut r = self.replies.borrow_mut();
        if r.is_empty() {
            bail!("no scripted reply left");
        }
        r.remove(0)
    }

    fn upload(&self, path: &Path) -> Result<String> {
        Ok(format!("https://files.test/{}", path.file_name().unwrap().to_string_lossy()))
    }

    fn extract(&self, _file_url: &str, _schema: &Value) -> Result<Extraction> {
        Ok(serde_json::from_value(self.extraction.clone())?)
    }
}

pub fn store_with_profile(email: &str) -> SqliteStore {
    let store = SqliteStore::in_memory().unwrap();
    let profile = UserProfile {
        email: email.to_string(),
        full_name: "Morgan".to_string(),
        ..UserProfile::default()
    };
    store.update_me(&profile).unwrap();
    store
}

pub fn session<'a>(
    store: &'a SqliteStore,
    cfg: &'a Config,
    llm: &'a dyn LlmClient,
) -> Session<'a, SqliteStore> {
    let profile = store.me().unwrap();
    Session::new(store, profile, cfg, llm, today())
}

/// Parses a command line (without the program name).
pub fn parse(args: &[&str]) -> ArgMatches {
    let mut argv = vec!["finmate"];
    argv.extend_from_slice(args);
    cli::build_cli().try_get_matches_from(argv).unwrap()
}

/// Walks down nested subcommands, e.g. `["tx", "add"]`.
pub fn sub<'a>(m: &'a ArgMatches, path: &[&str]) -> &'a ArgMatches {
    let mut cur = m;
    for name in path {
        cur = cur
            .subcommand_matches(name)
            .unwrap_or_else(|| panic!("no '{}' subcommand", name));
    }
    cur
}
