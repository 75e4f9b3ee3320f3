//! Low-level access to the MAST service invoke endpoint.

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// One column descriptor from a MAST response.
#[derive(Debug, Clone, Deserialize)]
pub struct MastField {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
}

/// Envelope returned by MAST services.
#[derive(Debug, Clone, Deserialize)]
pub struct MastResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: Vec<Map<String, Value>>,
    #[serde(default)]
    pub fields: Vec<MastField>,
}

/// Client for MAST service requests.
pub struct MastClient {
    invoke_url: String,
    http: Client,
}

impl MastClient {
    /// Create a client with default endpoint and timeout.
    pub fn new() -> Result<Self> {
        Self::with_config(&ClientConfig::default())
    }

    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            invoke_url: config.mast_invoke_url.clone(),
            http,
        })
    }

    /// Call a MAST service with the given parameter object. One blocking
    /// request; a response status other than `COMPLETE` is an error.
    pub fn service_request(&self, service: &str, params: &Value) -> Result<MastResponse> {
        let request = json!({
            "service": service,
            "params": params,
            "format": "json",
        });
        debug!("invoking {service}");

        let response = self
            .http
            .post(&self.invoke_url)
            .form(&[("request", request.to_string())])
            .send()?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized(
                "check that MAST API token is valid".to_string(),
            ));
        }
        let parsed: MastResponse = response.error_for_status()?.json()?;
        if parsed.status != "COMPLETE" {
            return Err(Error::Query(format!(
                "{service} returned status {}: {}",
                parsed.status, parsed.msg
            )));
        }
        Ok(parsed)
    }
}
