// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use tracing::debug;

use super::{Entity, EntityStore, Query, Sort, check_field};
use crate::error::FinmateError;
use crate::models::UserProfile;

/// Client for the managed platform's entity REST API.
pub struct RemoteStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RemoteStore {
    pub fn new(base_url: &str, api_key: Option<String>, timeout_secs: u64) -> Result<RemoteStore> {
        Ok(RemoteStore {
            client: crate::utils::http_client(timeout_secs)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url<E: Entity>(&self) -> String {
        format!("{}/entities/{}", self.base_url, E::NAME)
    }

    fn record_url<E: Entity>(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url::<E>(), id)
    }

    fn auth(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    fn not_found<E: Entity>(id: &str) -> anyhow::Error {
        FinmateError::NotFound {
            entity: E::NAME,
            id: id.to_string(),
        }
        .into()
    }
}

/// Turns a non-2xx response into a [`FinmateError::Backend`].
fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(FinmateError::Backend {
        status: status.as_u16(),
        body,
    }
    .into())
}

impl EntityStore for RemoteStore {
    fn filter<E: Entity>(
        &self,
        query: &Query,
        sort: Option<&Sort>,
        limit: Option<usize>,
    ) -> Result<Vec<E>> {
        query.validate()?;
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(s) = sort {
            check_field(&s.field)?;
            params.push(("sort", s.to_param()));
        }
        if let Some(l) = limit {
            params.push(("limit", l.to_string()));
        }
        if !query.is_empty() {
            params.push(("q", query.to_json().to_string()));
        }
        let url = self.collection_url::<E>();
        debug!(%url, ?params, "remote filter");
        let resp = self
            .auth(self.client.get(&url).query(&params))
            .send()
            .with_context(|| format!("GET {}", url))?;
        let records: Vec<E> = check(resp)?
            .json()
            .with_context(|| format!("Decode {} list", E::NAME))?;
        Ok(records)
    }

    fn get<E: Entity>(&self, id: &str) -> Result<E> {
        let url = self.record_url::<E>(id);
        let resp = self
            .auth(self.client.get(&url))
            .send()
            .with_context(|| format!("GET {}", url))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(Self::not_found::<E>(id));
        }
        Ok(check(resp)?.json()?)
    }

    fn create<E: Entity>(&self, record: &E) -> Result<E> {
        let url = self.collection_url::<E>();
        let resp = self
            .auth(self.client.post(&url).json(record))
            .send()
            .with_context(|| format!("POST {}", url))?;
        let created: E = check(resp)?
            .json()
            .with_context(|| format!("Decode created {}", E::NAME))?;
        debug!(entity = E::NAME, id = created.id(), "created remotely");
        Ok(created)
    }

    fn update<E: Entity>(&self, id: &str, record: &E) -> Result<E> {
        let url = self.record_url::<E>(id);
        let resp = self
            .auth(self.client.put(&url).json(record))
            .send()
            .with_context(|| format!("PUT {}", url))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(Self::not_found::<E>(id));
        }
        Ok(check(resp)?.json()?)
    }

    fn delete<E: Entity>(&self, id: &str) -> Result<bool> {
        let url = self.record_url::<E>(id);
        let resp = self
            .auth(self.client.delete(&url))
            .send()
            .with_context(|| format!("DELETE {}", url))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check(resp)?;
        Ok(true)
    }

    fn me(&self) -> Result<UserProfile> {
        let url = format!("{}/auth/me", self.base_url);
        let resp = self
            .auth(self.client.get(&url))
            .send()
            .with_context(|| format!("GET {}", url))?;
        Ok(check(resp)?.json()?)
    }

    fn update_me(&self, profile: &UserProfile) -> Result<UserProfile> {
        let url = format!("{}/auth/me", self.base_url);
        let resp = self
            .auth(self.client.put(&url).json(profile))
            .send()
            .with_context(|| format!("PUT {}", url))?;
        Ok(check(resp)?.json()?)
    }
}
