//! Portal API module
//!
//! HTTP client for the Portal's REST/JSON interface.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::{PortalClient, PortalResponse};
pub use types::*;
