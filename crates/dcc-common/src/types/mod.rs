//! Common types used across the DCC crates

use crate::error::DccError;
use serde::{Deserialize, Serialize};

/// Host of the development Portal.
pub const DEV_HOST: &str = "test.encodedcc.org";

/// Host of the production Portal.
pub const PROD_HOST: &str = "www.encodeproject.org";

/// Which Portal deployment requests are sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DccMode {
    /// The test deployment. Safe for trial submissions.
    #[default]
    Dev,
    /// The public production deployment.
    Prod,
}

impl DccMode {
    /// Host name of the deployment
    pub fn host(self) -> &'static str {
        match self {
            DccMode::Dev => DEV_HOST,
            DccMode::Prod => PROD_HOST,
        }
    }

    /// Base URL of the deployment, without a trailing slash
    pub fn url(self) -> String {
        format!("https://{}", self.host())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DccMode::Dev => "dev",
            DccMode::Prod => "prod",
        }
    }
}

impl std::str::FromStr for DccMode {
    type Err = DccError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dev" => Ok(DccMode::Dev),
            "prod" => Ok(DccMode::Prod),
            _ => Err(DccError::InvalidMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for DccMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
