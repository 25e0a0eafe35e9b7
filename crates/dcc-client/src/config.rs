//! Configuration management for the DCC client
//!
//! Everything is read from the process environment (after loading a `.env`
//! file when one exists) once at startup and is immutable afterwards.

use crate::error::{ClientError, Result};
use dcc_common::DccMode;
use std::path::PathBuf;

// ============================================================================
// Client Configuration Constants
// ============================================================================

/// Default timeout in seconds for Portal requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Default directory for the per-session log files.
pub const DEFAULT_LOG_DIR: &str = "DCC_Logs";

pub const API_KEY_VAR: &str = "DCC_API_KEY";
pub const SECRET_KEY_VAR: &str = "DCC_SECRET_KEY";
pub const MODE_VAR: &str = "DCC_MODE";
pub const LAB_VAR: &str = "DCC_LAB";
pub const AWARD_VAR: &str = "DCC_AWARD";
pub const URL_VAR: &str = "DCC_URL";
pub const TIMEOUT_VAR: &str = "DCC_TIMEOUT_SECS";
pub const LOG_DIR_VAR: &str = "DCC_LOG_DIR";

/// API key pair used as HTTP basic auth on every Portal request
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub secret_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Which Portal deployment to talk to
    pub mode: DccMode,

    pub credentials: Credentials,

    /// Default `lab` for created records
    pub lab: Option<String>,

    /// Default `award` for created records
    pub award: Option<String>,

    /// Portal URL; the mode's URL unless overridden
    pub base_url: String,

    pub timeout_secs: u64,

    /// Directory for the per-session log files
    pub log_dir: PathBuf,
}

impl Config {
    pub fn new(mode: DccMode, credentials: Credentials) -> Self {
        Self {
            mode,
            credentials,
            lab: None,
            award: None,
            base_url: mode.url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }

    /// Load config from environment variables
    ///
    /// Missing credentials are fatal here, before any request is made.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mode = mode_from_env()?;
        let credentials = Credentials::new(required_var(API_KEY_VAR)?, required_var(SECRET_KEY_VAR)?);
        let mut config = Self::new(mode, credentials);

        config.lab = optional_var(LAB_VAR);
        config.award = optional_var(AWARD_VAR);

        if let Some(url) = optional_var(URL_VAR) {
            config.base_url = url;
        }

        if let Some(timeout) = optional_var(TIMEOUT_VAR) {
            config.timeout_secs = timeout
                .parse()
                .map_err(|_| ClientError::config(format!("{TIMEOUT_VAR} must be a whole number of seconds, got '{timeout}'")))?;
        }

        config.log_dir = log_dir_from_env();

        config.validate()?;
        Ok(config)
    }

    /// Switch deployments, resetting the Portal URL to the new mode's URL
    pub fn with_mode(mut self, mode: DccMode) -> Self {
        self.mode = mode;
        self.base_url = mode.url();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_lab(mut self, lab: impl Into<String>) -> Self {
        self.lab = Some(lab.into());
        self
    }

    pub fn with_award(mut self, award: impl Into<String>) -> Self {
        self.award = Some(award.into());
        self
    }

    /// Alias prefix of the configured lab, e.g. `my-lab:`
    pub fn lab_prefix(&self) -> Option<String> {
        self.lab.as_ref().map(|lab| format!("{lab}:"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.credentials.api_key.trim().is_empty() {
            return Err(ClientError::config(format!("{API_KEY_VAR} is empty")));
        }
        if self.credentials.secret_key.trim().is_empty() {
            return Err(ClientError::config(format!("{SECRET_KEY_VAR} is empty")));
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::config(format!("{TIMEOUT_VAR} must be greater than 0")));
        }
        Ok(())
    }
}

/// Portal mode from `DCC_MODE`, dev when unset
pub fn mode_from_env() -> Result<DccMode> {
    match optional_var(MODE_VAR) {
        Some(mode) => Ok(mode.parse()?),
        None => Ok(DccMode::default()),
    }
}

/// Session log directory from `DCC_LOG_DIR`
pub fn log_dir_from_env() -> PathBuf {
    optional_var(LOG_DIR_VAR).map_or_else(|| PathBuf::from(DEFAULT_LOG_DIR), PathBuf::from)
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| ClientError::config(format!("{name} is not set")))
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}
