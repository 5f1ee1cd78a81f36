//! Legacy `secret.yml` support
//!
//! The file holds upper-case keys, e.g.
//!
//! ```yaml
//! OPENAI_KEY: sk-...
//! DATABASE_PATH: ./data/finroute.sqlite
//! ```

use crate::error::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Secrets file name, looked up next to the config file
pub const DEFAULT_SECRETS_FILE: &str = "secret.yml";

/// Credentials read from the secrets file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(rename = "OPENAI_KEY", default)]
    pub openai_key: Option<String>,

    #[serde(rename = "DATABASE_PATH", default)]
    pub database_path: Option<PathBuf>,
}

impl Secrets {
    /// Read a secrets file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Read a secrets file if it exists
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        if path.exists() {
            tracing::debug!("Loading secrets from {:?}", path);
            Self::load(path).map(Some)
        } else {
            Ok(None)
        }
    }
}
