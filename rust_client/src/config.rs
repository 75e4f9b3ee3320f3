//! Client configuration file support.
//!
//! Service endpoints and the HTTP timeout can be overridden from a
//! `jwst-client.toml` file; every field has a default, so the file is
//! optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Client settings from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Engineering-database download endpoint
    #[serde(default = "default_edb_base_url")]
    pub edb_base_url: String,
    /// MAST service invoke endpoint
    #[serde(default = "default_mast_invoke_url")]
    pub mast_invoke_url: String,
    /// HTTP request timeout, seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_edb_base_url() -> String {
    "https://mast.stsci.edu/jwst/api/v0.1/Download/file?uri=mast:jwstedb".to_string()
}

fn default_mast_invoke_url() -> String {
    "https://mast.stsci.edu/api/v0/invoke".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            edb_base_url: default_edb_base_url(),
            mast_invoke_url: default_mast_invoke_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Load client configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Configuration(format!("failed to read config file: {e}")))?;
        toml::from_str(&content)
            .map_err(|e| Error::Configuration(format!("failed to parse config file: {e}")))
    }

    /// Load client configuration from the default locations: the current
    /// directory, then its parent.
    pub fn from_default_location() -> Result<Self> {
        let search_paths = [
            PathBuf::from("jwst-client.toml"),
            PathBuf::from("../jwst-client.toml"),
        ];
        for path in &search_paths {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        Err(Error::Configuration(
            "no jwst-client.toml found in default locations".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn defaults_point_at_mast() {
        let config = ClientConfig::default();
        assert!(config.edb_base_url.contains("mast.stsci.edu"));
        assert!(config.mast_invoke_url.ends_with("/invoke"));
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs = 5").unwrap();
        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.edb_base_url, ClientConfig::default().edb_base_url);
    }

    #[test]
    fn malformed_file_is_a_configuration_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs = \"not a number\"").unwrap();
        assert!(matches!(
            ClientConfig::from_file(file.path()),
            Err(Error::Configuration(_))
        ));
    }
}
