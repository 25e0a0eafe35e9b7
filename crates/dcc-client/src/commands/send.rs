//! `dcc send` command implementation
//!
//! Submits every payload of a JSON file, in file order.

use crate::commands::connect;
use crate::connection::{PatchOptions, SendOptions};
use crate::error::{ClientError, Result};
use crate::payload::{Payload, PROFILE_KEY};
use crate::SubmitMethod;
use colored::Colorize;
use dcc_common::DccMode;
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// Run the send command
///
/// # Arguments
///
/// * `infile` - JSON file holding one payload object or an array of them
/// * `profile` - Profile for payloads without a `_profile` key
/// * `method` - Create-or-update, create only, or update only
/// * `opts` - Not-found, array merge and 403 handling
pub async fn run(
    mode: Option<DccMode>,
    infile: &Path,
    profile: Option<String>,
    method: SubmitMethod,
    opts: SendOptions,
) -> Result<()> {
    let payloads = read_payloads(infile, profile.as_deref())?;
    info!(count = payloads.len(), file = %infile.display(), "Loaded payloads");

    let conn = connect(mode).await?;

    for payload in payloads {
        let label = payload
            .first_alias()
            .or_else(|| payload.record_id().map(str::to_string))
            .unwrap_or_else(|| "<payload>".to_string());

        let record = match method {
            SubmitMethod::Send => conn.send(payload, opts).await?,
            SubmitMethod::Post => conn.post(payload).await?,
            SubmitMethod::Patch => conn.patch(payload, PatchOptions::from(opts)).await?,
        };

        let id = ["accession", "uuid", "@id"]
            .iter()
            .find_map(|key| record.get(*key).and_then(Value::as_str))
            .unwrap_or("?");
        println!("{} {} {}", label.green(), "->".dimmed(), id.bold());
    }

    Ok(())
}

/// Payloads of a JSON file, with `default_profile` filled in where unset
pub fn read_payloads(path: &Path, default_profile: Option<&str>) -> Result<Vec<Payload>> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;

    let values = match value {
        Value::Array(items) => items,
        Value::Object(_) => vec![value],
        _ => {
            return Err(ClientError::invalid_payload(format!(
                "'{}' must hold a JSON object or an array of objects",
                path.display()
            )))
        }
    };

    values
        .into_iter()
        .map(|value| {
            let mut payload = Payload::from_value(value)?;
            if let Some(profile) = default_profile {
                if !payload.contains_key(PROFILE_KEY) {
                    payload.set_profile(profile);
                }
            }
            Ok(payload)
        })
        .collect()
}
