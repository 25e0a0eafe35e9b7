//! DCC Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the DCC submission tools.
//!
//! # Overview
//!
//! - **Error Handling**: [`DccError`] and the crate [`Result`] alias
//! - **Checksums**: md5 digests of local files, as the Portal records them
//! - **Types**: the Portal mode (dev or prod) and its host
//! - **Logging**: tracing setup, including the per-session log files
//!
//! # Example
//!
//! ```no_run
//! use dcc_common::checksum::compute_file_md5;
//! use dcc_common::Result;
//!
//! fn fingerprint(path: &str) -> Result<()> {
//!     let md5sum = compute_file_md5(path)?;
//!     tracing::info!(path, md5sum = %md5sum, "computed md5sum");
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{DccError, Result};
pub use types::DccMode;
