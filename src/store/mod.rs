// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Entity client.
//!
//! Every screen talks to its records through [`EntityStore`]: `list`, `filter`,
//! `create`, `update`, `delete`, plus the `me` / `update_me` pair for the
//! signed-in profile. [`Backend`] picks the local SQLite document store or the
//! managed platform's REST API from configuration.

mod remote;
mod sqlite;

pub use remote::RemoteStore;
pub use sqlite::SqliteStore;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::config::Config;
use crate::error::FinmateError;
use crate::models::UserProfile;

/// A record type stored through the entity client.
pub trait Entity: Serialize + DeserializeOwned + Clone {
    /// Collection name on the platform, e.g. `Transaction`.
    const NAME: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

static FIELD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("field name pattern"));

pub(crate) fn check_field(field: &str) -> Result<(), FinmateError> {
    if FIELD_RE.is_match(field) {
        Ok(())
    } else {
        Err(FinmateError::UnsafeField(field.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Gte,
    Lte,
}

impl Op {
    pub fn sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Gte => ">=",
            Op::Lte => "<=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub field: String,
    pub op: Op,
    pub value: Value,
}

/// Conjunction of field conditions, the same shape as the platform's query
/// object (`{"dashboard_type": "personal", "date": {"$gte": ..}}`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    clauses: Vec<Clause>,
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    pub fn eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, Op::Eq, value.into())
    }

    pub fn gte(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, Op::Gte, value.into())
    }

    pub fn lte(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, Op::Lte, value.into())
    }

    fn push(mut self, field: &str, op: Op, value: Value) -> Self {
        self.clauses.push(Clause {
            field: field.to_string(),
            op,
            value,
        });
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn validate(&self) -> Result<(), FinmateError> {
        for c in &self.clauses {
            check_field(&c.field)?;
        }
        Ok(())
    }

    /// Platform wire form of the query.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        for c in &self.clauses {
            match c.op {
                Op::Eq => {
                    obj.insert(c.field.clone(), c.value.clone());
                }
                Op::Gte | Op::Lte => {
                    let key = if c.op == Op::Gte { "$gte" } else { "$lte" };
                    let entry = obj.entry(c.field.clone()).or_insert_with(|| json!({}));
                    if !entry.is_object() {
                        *entry = json!({});
                    }
                    if let Some(m) = entry.as_object_mut() {
                        m.insert(key.to_string(), c.value.clone());
                    }
                }
            }
        }
        Value::Object(obj)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub descending: bool,
}

impl Sort {
    /// Parse the platform's sort syntax: `"-date"` sorts descending by date.
    pub fn parse(s: &str) -> Result<Sort, FinmateError> {
        let s = s.trim();
        let (field, descending) = match s.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        check_field(field)?;
        Ok(Sort {
            field: field.to_string(),
            descending,
        })
    }

    pub fn desc(field: &str) -> Sort {
        Sort {
            field: field.to_string(),
            descending: true,
        }
    }

    pub fn asc(field: &str) -> Sort {
        Sort {
            field: field.to_string(),
            descending: false,
        }
    }

    pub fn to_param(&self) -> String {
        if self.descending {
            format!("-{}", self.field)
        } else {
            self.field.clone()
        }
    }
}

pub trait EntityStore {
    fn filter<E: Entity>(
        &self,
        query: &Query,
        sort: Option<&Sort>,
        limit: Option<usize>,
    ) -> Result<Vec<E>>;

    fn list<E: Entity>(&self, sort: Option<&Sort>, limit: Option<usize>) -> Result<Vec<E>> {
        self.filter(&Query::new(), sort, limit)
    }

    fn get<E: Entity>(&self, id: &str) -> Result<E>;

    /// Stores a new record and returns it with its assigned id.
    fn create<E: Entity>(&self, record: &E) -> Result<E>;

    /// Replaces the record stored under `id`.
    fn update<E: Entity>(&self, id: &str, record: &E) -> Result<E>;

    /// Returns false when nothing was stored under `id`.
    fn delete<E: Entity>(&self, id: &str) -> Result<bool>;

    fn me(&self) -> Result<UserProfile>;

    fn update_me(&self, profile: &UserProfile) -> Result<UserProfile>;
}

pub enum Backend {
    Local(SqliteStore),
    Remote(RemoteStore),
}

impl Backend {
    pub fn from_config(cfg: &Config) -> Result<Backend> {
        match &cfg.backend_url {
            Some(url) => Ok(Backend::Remote(RemoteStore::new(
                url,
                cfg.api_key.clone(),
                cfg.request_timeout_secs,
            )?)),
            None => {
                let path = match &cfg.db_path {
                    Some(p) => p.clone(),
                    None => crate::db::db_path()?,
                };
                Ok(Backend::Local(SqliteStore::open(&path)?))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Backend::Local(s) => format!("local store at {}", s.location()),
            Backend::Remote(r) => format!("remote platform at {}", r.base_url()),
        }
    }
}

impl EntityStore for Backend {
    fn filter<E: Entity>(
        &self,
        query: &Query,
        sort: Option<&Sort>,
        limit: Option<usize>,
    ) -> Result<Vec<E>> {
        match self {
            Backend::Local(s) => s.filter(query, sort, limit),
            Backend::Remote(r) => r.filter(query, sort, limit),
        }
    }

    fn get<E: Entity>(&self, id: &str) -> Result<E> {
        match self {
            Backend::Local(s) => s.get(id),
            Backend::Remote(r) => r.get(id),
        }
    }

    fn create<E: Entity>(&self, record: &E) -> Result<E> {
        match self {
            Backend::Local(s) => s.create(record),
            Backend::Remote(r) => r.create(record),
        }
    }

    fn update<E: Entity>(&self, id: &str, record: &E) -> Result<E> {
        match self {
            Backend::Local(s) => s.update(id, record),
            Backend::Remote(r) => r.update(id, record),
        }
    }

    fn delete<E: Entity>(&self, id: &str) -> Result<bool> {
        match self {
            Backend::Local(s) => s.delete::<E>(id),
            Backend::Remote(r) => r.delete::<E>(id),
        }
    }

    fn me(&self) -> Result<UserProfile> {
        match self {
            Backend::Local(s) => s.me(),
            Backend::Remote(r) => r.me(),
        }
    }

    fn update_me(&self, profile: &UserProfile) -> Result<UserProfile> {
        match self {
            Backend::Local(s) => s.update_me(profile),
            Backend::Remote(r) => r.update_me(profile),
        }
    }
}
