//! HTTP access to the engineering database download endpoint.

use std::time::Duration;

use chrono::{DateTime, Utc};
use log::debug;
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;

use crate::auth::MastApiToken;
use crate::config::ClientConfig;
use crate::edb::timeseries::EdbTimeSeries;
use crate::error::{Error, Result};
use crate::time::mjd::parse_utc;

/// Client for the JWST engineering database hosted by MAST at STScI.
pub struct EngineeringDatabase {
    token: MastApiToken,
    base_url: String,
    http: Client,
}

impl EngineeringDatabase {
    /// Create a client with default endpoints and timeout.
    pub fn new(token: MastApiToken) -> Result<Self> {
        Self::with_config(token, &ClientConfig::default())
    }

    pub fn with_config(token: MastApiToken, config: &ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            token,
            base_url: config.edb_base_url.clone(),
            http,
        })
    }

    /// Get engineering data for a mnemonic over a time interval given as
    /// ISO 8601 strings (naive values are treated as UTC).
    pub fn timeseries(&self, mnemonic: &str, start: &str, end: &str) -> Result<EdbTimeSeries> {
        self.timeseries_between(mnemonic, parse_utc(start)?, parse_utc(end)?)
    }

    /// Get engineering data for a mnemonic over a UTC interval. One
    /// blocking request; failures surface directly, with HTTP 401 mapped
    /// to [`Error::Unauthorized`].
    pub fn timeseries_between(
        &self,
        mnemonic: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<EdbTimeSeries> {
        let filename = format!(
            "{}-{}-{}.csv",
            mnemonic,
            format_edb_date(start),
            format_edb_date(end)
        );
        let url = format!("{}/{}", self.base_url, filename);
        debug!("fetching {url}");

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, format!("token {}", self.token.as_str()))
            .send()?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized(
                "check that MAST API token is valid".to_string(),
            ));
        }
        let body = response.error_for_status()?.text()?;
        EdbTimeSeries::parse(mnemonic, &body)
    }
}

/// Render an instant in the compact EDB request date format.
fn format_edb_date(date: DateTime<Utc>) -> String {
    date.format("%Y%m%dT%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn edb_date_format_is_compact() {
        let dt = Utc.with_ymd_and_hms(2022, 5, 2, 6, 30, 15).unwrap();
        assert_eq!(format_edb_date(dt), "20220502T063015");
    }
}
