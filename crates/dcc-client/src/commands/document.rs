//! `dcc document` command implementation

use crate::commands::connect;
use crate::error::Result;
use colored::Colorize;
use dcc_common::DccMode;
use std::path::Path;

/// Create a document record and print its UUID
pub async fn post(
    mode: Option<DccMode>,
    document: &Path,
    document_type: &str,
    description: &str,
    download_filename: Option<&str>,
) -> Result<()> {
    let conn = connect(mode).await?;
    let uuid = conn
        .post_document(document, document_type, description, download_filename)
        .await?;
    println!("{uuid}");
    Ok(())
}

/// Link a document to a record
pub async fn link(mode: Option<DccMode>, record: &str, document: &str) -> Result<()> {
    let conn = connect(mode).await?;
    match conn.link_document(record, document).await? {
        Some(_) => println!("{} {} to {}", "Linked".green(), document, record),
        None => println!("{} is already linked to {}", document, record),
    }
    Ok(())
}
