//! `dcc get` command implementation

use crate::commands::{connect, print_json};
use crate::error::Result;
use dcc_common::DccMode;
use tracing::info;

pub async fn run(
    mode: Option<DccMode>,
    ids: Vec<String>,
    frame: Option<String>,
    ignore_404: bool,
) -> Result<()> {
    let conn = connect(mode).await?;

    match conn.get(&ids, ignore_404, frame.as_deref()).await? {
        Some(record) => print_json(&record),
        None => {
            info!(ids = ?ids, "No record found");
            Ok(())
        }
    }
}
