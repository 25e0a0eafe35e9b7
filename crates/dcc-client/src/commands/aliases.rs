//! `dcc aliases` command implementation

use crate::commands::connect;
use crate::error::Result;
use dcc_common::DccMode;

pub async fn run(mode: Option<DccMode>, record: &str, strip_prefix: bool) -> Result<()> {
    let conn = connect(mode).await?;
    for alias in conn.get_aliases(record, strip_prefix).await? {
        println!("{alias}");
    }
    Ok(())
}
