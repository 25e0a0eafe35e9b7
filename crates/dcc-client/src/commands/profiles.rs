//! `dcc profiles` command implementation

use crate::commands::connect;
use crate::error::Result;
use colored::Colorize;
use dcc_common::DccMode;

/// List the profile IDs known to the Portal
pub async fn run(mode: Option<DccMode>) -> Result<()> {
    let conn = connect(mode).await?;
    let profiles = conn.profiles();

    for id in profiles.ids() {
        let awardless = profiles.get(id).is_some_and(|profile| profile.is_awardless());
        if awardless {
            println!("{} {}", id, "(no award)".dimmed());
        } else {
            println!("{id}");
        }
    }
    Ok(())
}
