// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{Entity, EntityStore, Query, Sort, check_field};
use crate::error::FinmateError;
use crate::models::UserProfile;

/// Local document store: every record is a JSON blob in `records`, queried
/// through SQLite's `json_extract`.
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<SqliteStore> {
        let conn = crate::db::open_at(path)?;
        debug!(path = %path.display(), "opened local store");
        Ok(SqliteStore {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn in_memory() -> Result<SqliteStore> {
        Ok(SqliteStore {
            conn: crate::db::open_in_memory()?,
            path: None,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn location(&self) -> String {
        match &self.path {
            Some(p) => p.display().to_string(),
            None => ":memory:".to_string(),
        }
    }
}

fn to_sql(v: &Value) -> SqlValue {
    match v {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn decode<E: Entity>(raw: &str) -> Result<E> {
    serde_json::from_str(raw).with_context(|| format!("Corrupt {} record: {}", E::NAME, raw))
}

impl EntityStore for SqliteStore {
    fn filter<E: Entity>(
        &self,
        query: &Query,
        sort: Option<&Sort>,
        limit: Option<usize>,
    ) -> Result<Vec<E>> {
        query.validate()?;
        let mut sql = String::from("SELECT data FROM records WHERE entity=?1");
        let mut params_vec: Vec<SqlValue> = vec![SqlValue::Text(E::NAME.to_string())];
        for c in query.clauses() {
            params_vec.push(to_sql(&c.value));
            sql.push_str(&format!(
                " AND json_extract(data, '$.{}') {} ?{}",
                c.field,
                c.op.sql(),
                params_vec.len()
            ));
        }
        match sort {
            Some(s) => {
                check_field(&s.field)?;
                let dir = if s.descending { "DESC" } else { "ASC" };
                sql.push_str(&format!(
                    " ORDER BY json_extract(data, '$.{}') {dir}, seq {dir}",
                    s.field
                ));
            }
            None => sql.push_str(" ORDER BY seq DESC"),
        }
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        debug!(entity = E::NAME, %sql, "filter");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), |r| {
            r.get::<_, String>(0)
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(decode::<E>(&row?)?);
        }
        Ok(out)
    }

    fn get<E: Entity>(&self, id: &str) -> Result<E> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM records WHERE entity=?1 AND id=?2",
                params![E::NAME, id],
                |r| r.get(0),
            )
            .optional()?;
        match raw {
            Some(s) => decode(&s),
            None => Err(FinmateError::NotFound {
                entity: E::NAME,
                id: id.to_string(),
            }
            .into()),
        }
    }

    fn create<E: Entity>(&self, record: &E) -> Result<E> {
        let mut rec = record.clone();
        if rec.id().is_empty() {
            rec.set_id(uuid::Uuid::new_v4().to_string());
        }
        let data = serde_json::to_string(&rec)?;
        self.conn
            .execute(
                "INSERT INTO records(id, entity, data) VALUES (?1, ?2, ?3)",
                params![rec.id(), E::NAME, data],
            )
            .with_context(|| format!("Insert {} '{}'", E::NAME, rec.id()))?;
        debug!(entity = E::NAME, id = rec.id(), "created");
        Ok(rec)
    }

    fn update<E: Entity>(&self, id: &str, record: &E) -> Result<E> {
        let mut rec = record.clone();
        rec.set_id(id.to_string());
        let data = serde_json::to_string(&rec)?;
        let n = self.conn.execute(
            "UPDATE records SET data=?1, updated_at=datetime('now') WHERE entity=?2 AND id=?3",
            params![data, E::NAME, id],
        )?;
        if n == 0 {
            return Err(FinmateError::NotFound {
                entity: E::NAME,
                id: id.to_string(),
            }
            .into());
        }
        debug!(entity = E::NAME, id, "updated");
        Ok(rec)
    }

    fn delete<E: Entity>(&self, id: &str) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM records WHERE entity=?1 AND id=?2",
            params![E::NAME, id],
        )?;
        Ok(n > 0)
    }

    fn me(&self) -> Result<UserProfile> {
        let v: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key='profile'",
                [],
                |r| r.get(0),
            )
            .optional()?;
        match v {
            Some(s) => serde_json::from_str(&s).context("Corrupt profile in settings"),
            None => Ok(UserProfile::default()),
        }
    }

    fn update_me(&self, profile: &UserProfile) -> Result<UserProfile> {
        self.conn.execute(
            "INSERT INTO settings(key, value) VALUES('profile', ?1)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![serde_json::to_string(profile)?],
        )?;
        Ok(profile.clone())
    }
}
