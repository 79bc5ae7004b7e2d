// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod achievements;
pub mod assistant;
pub mod budgets;
pub mod business;
pub mod dashboard;
pub mod exporter;
pub mod goals;
pub mod profile;
pub mod reports;
pub mod splits;
pub mod transactions;

use anyhow::{Result, anyhow};
use chrono::NaiveDate;

use crate::advisor::Advisor;
use crate::config::Config;
use crate::llm::LlmClient;
use crate::models::{DashboardType, Transaction, UserProfile};
use crate::store::{EntityStore, Query, Sort};

/// Everything a command handler needs: the entity client, the signed-in
/// profile, configuration, the LLM client and today's date.
pub struct Session<'a, S: EntityStore> {
    pub store: &'a S,
    pub profile: UserProfile,
    pub cfg: &'a Config,
    pub llm: &'a dyn LlmClient,
    pub today: NaiveDate,
}

impl<'a, S: EntityStore> Session<'a, S> {
    pub fn new(
        store: &'a S,
        profile: UserProfile,
        cfg: &'a Config,
        llm: &'a dyn LlmClient,
        today: NaiveDate,
    ) -> Self {
        Session {
            store,
            profile,
            cfg,
            llm,
            today,
        }
    }

    pub fn currency(&self) -> &str {
        &self.profile.currency
    }

    pub fn advisor(&self) -> Advisor<'a> {
        Advisor::new(self.llm, &self.profile.currency)
    }

    /// Transactions of one dashboard, newest first.
    pub fn transactions(&self, dashboard: DashboardType) -> Result<Vec<Transaction>> {
        self.store.filter(
            &Query::new().eq("dashboard_type", dashboard.to_string()),
            Some(&Sort::desc("date")),
            None,
        )
    }
}

/// Value of an argument clap already enforces as required.
pub(crate) fn required<'m>(m: &'m clap::ArgMatches, name: &str) -> Result<&'m str> {
    m.get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing --{}", name))
}

pub(crate) fn optional<'m>(m: &'m clap::ArgMatches, name: &str) -> Option<&'m str> {
    m.get_one::<String>(name).map(String::as_str)
}

/// `(--json, --jsonl)` for subcommands that define them.
pub(crate) fn json_flags(m: &clap::ArgMatches) -> (bool, bool) {
    (m.get_flag("json"), m.get_flag("jsonl"))
}
