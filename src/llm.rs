// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Client for the platform's LLM and file-extraction integrations.

use anyhow::{Context, Result, anyhow, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::{Client, RequestBuilder, multipart};
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::Path;
use tracing::debug;

use crate::config::Config;

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("fence pattern"));

/// The three integration calls the assistant features need.
pub trait LlmClient {
    /// Raw reply: either a JSON string or, with a schema, usually an object.
    fn invoke(&self, prompt: &str, schema: Option<&Value>) -> Result<Value>;

    /// Uploads a file and returns the URL it can later be referenced by.
    fn upload(&self, path: &Path) -> Result<String>;

    /// Structured extraction from an uploaded file.
    fn extract(&self, file_url: &str, schema: &Value) -> Result<Extraction>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct Extraction {
    pub status: String,
    #[serde(default)]
    pub output: Option<Value>,
}

impl Extraction {
    /// The output, when the extraction succeeded and produced one.
    pub fn into_output(self) -> Option<Value> {
        if self.status == "success" {
            self.output.filter(|v| !v.is_null())
        } else {
            None
        }
    }
}

/// Prose reply of a free-form prompt.
pub fn invoke_text(llm: &dyn LlmClient, prompt: &str) -> Result<String> {
    match llm.invoke(prompt, None)? {
        Value::String(s) => Ok(s),
        Value::Object(map) => match map.get("response").and_then(Value::as_str) {
            Some(s) => Ok(s.to_string()),
            None => Ok(Value::Object(map).to_string()),
        },
        other => Ok(other.to_string()),
    }
}

/// Schema-constrained reply, decoded into `T`.
pub fn invoke_json<T: serde::de::DeserializeOwned>(
    llm: &dyn LlmClient,
    prompt: &str,
    schema: &Value,
) -> Result<T> {
    let raw = llm.invoke(prompt, Some(schema))?;
    let value = match raw {
        Value::String(s) => parse_json_reply(&s)?,
        v => v,
    };
    serde_json::from_value(value).context("Reply does not match the requested schema")
}

/// Parses JSON from model text, tolerating a surrounding ```json fence.
pub fn parse_json_reply(text: &str) -> Result<Value> {
    let body = match FENCED_JSON.captures(text) {
        Some(c) => c.get(1).map_or(text, |m| m.as_str()),
        None => text.trim(),
    };
    serde_json::from_str(body).with_context(|| format!("Reply is not JSON: {}", text))
}

/// HTTP implementation against `{llm_url}/integrations/...`.
pub struct HttpLlm {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpLlm {
    pub fn new(base_url: &str, api_key: Option<String>, timeout_secs: u64) -> Result<HttpLlm> {
        Ok(HttpLlm {
            client: crate::utils::http_client(timeout_secs)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/integrations/{}", self.base_url, path)
    }

    fn auth(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }
}

#[derive(Deserialize)]
struct Uploaded {
    file_url: String,
}

impl LlmClient for HttpLlm {
    fn invoke(&self, prompt: &str, schema: Option<&Value>) -> Result<Value> {
        let url = self.url("llm/invoke");
        let mut body = json!({ "prompt": prompt });
        if let Some(s) = schema {
            body["response_json_schema"] = s.clone();
        }
        debug!(%url, prompt_len = prompt.len(), structured = schema.is_some(), "llm invoke");
        let resp = self
            .auth(self.client.post(&url).json(&body))
            .send()
            .with_context(|| format!("POST {}", url))?
            .error_for_status()?;
        Ok(resp.json()?)
    }

    fn upload(&self, path: &Path) -> Result<String> {
        let url = self.url("upload");
        let form = multipart::Form::new()
            .file("file", path)
            .with_context(|| format!("Open {}", path.display()))?;
        let resp = self
            .auth(self.client.post(&url).multipart(form))
            .send()
            .with_context(|| format!("POST {}", url))?
            .error_for_status()?;
        let up: Uploaded = resp.json().context("Decode upload reply")?;
        Ok(up.file_url)
    }

    fn extract(&self, file_url: &str, schema: &Value) -> Result<Extraction> {
        let url = self.url("extract");
        let body = json!({ "file_url": file_url, "json_schema": schema });
        let resp = self
            .auth(self.client.post(&url).json(&body))
            .send()
            .with_context(|| format!("POST {}", url))?
            .error_for_status()?;
        Ok(resp.json()?)
    }
}

/// Stand-in used when no LLM endpoint is configured; every call fails, so
/// callers take their fallback path.
pub struct Unconfigured;

impl LlmClient for Unconfigured {
    fn invoke(&self, _prompt: &str, _schema: Option<&Value>) -> Result<Value> {
        bail!("No LLM endpoint configured (set FINMATE_LLM_URL)")
    }

    fn upload(&self, _path: &Path) -> Result<String> {
        Err(anyhow!("No LLM endpoint configured (set FINMATE_LLM_URL)"))
    }

    fn extract(&self, _file_url: &str, _schema: &Value) -> Result<Extraction> {
        Err(anyhow!("No LLM endpoint configured (set FINMATE_LLM_URL)"))
    }
}

pub fn from_config(cfg: &Config) -> Result<Box<dyn LlmClient>> {
    match &cfg.llm_url {
        Some(url) => Ok(Box::new(HttpLlm::new(
            url,
            cfg.llm_key.clone(),
            cfg.llm_timeout_secs,
        )?)),
        None => Ok(Box::new(Unconfigured)),
    }
}
