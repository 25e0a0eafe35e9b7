//! `dcc search` command implementation

use crate::commands::{connect, print_json};
use crate::error::{ClientError, Result};
use dcc_common::DccMode;
use std::collections::BTreeMap;
use tracing::debug;

/// Run the search command
///
/// # Arguments
///
/// * `terms` - Query parameters as `KEY=VALUE`
/// * `limit` - Maximum number of results, all when `None`
pub async fn run(mode: Option<DccMode>, terms: Vec<String>, limit: Option<u32>) -> Result<()> {
    let args = parse_terms(&terms)?;
    let conn = connect(mode).await?;

    debug!(url = %conn.make_search_url(&args, limit), "Searching");
    let results = conn.search(&args, limit).await?;
    print_json(&results)
}

/// Parse `KEY=VALUE` pairs; a later key overrides an earlier one
pub fn parse_terms(terms: &[String]) -> Result<BTreeMap<String, String>> {
    terms
        .iter()
        .map(|term| {
            term.split_once('=')
                .filter(|(key, _)| !key.trim().is_empty())
                .map(|(key, value)| (key.trim().to_string(), value.to_string()))
                .ok_or_else(|| ClientError::config(format!("search term '{term}' is not KEY=VALUE")))
        })
        .collect()
}
