//! `dcc upload` command implementation

use crate::commands::connect;
use crate::connection::UploadOutcome;
use crate::error::Result;
use crate::upload::{AwsCliUploader, S3Uploader};
use crate::UploadBackend;
use colored::Colorize;
use dcc_common::DccMode;
use std::path::PathBuf;

pub async fn run(
    mode: Option<DccMode>,
    file_id: String,
    path: Option<PathBuf>,
    backend: UploadBackend,
    region: String,
) -> Result<()> {
    let conn = connect(mode).await?;
    let conn = match backend {
        UploadBackend::Cli => conn.with_uploader(AwsCliUploader::new()),
        UploadBackend::Sdk => conn.with_uploader(S3Uploader::new(region)),
    };

    match conn.upload_file(&file_id, path.as_deref()).await? {
        UploadOutcome::Uploaded => println!("{} {}", "Uploaded".green(), file_id),
        UploadOutcome::NoCredentials => println!(
            "{} {}: upload credentials could not be issued",
            "Skipped".yellow(),
            file_id
        ),
    }
    Ok(())
}
