//! md5sum of file records

use crate::error::{ClientError, Result};
use crate::payload::Payload;
use crate::profiles::{FILE_PROFILE_ID, MD5SUM_PROP, SUBMITTED_FILE_PROP};
use dcc_common::checksum::compute_file_md5;
use serde_json::Value;
use tracing::info;

/// Set `md5sum` on a file payload that names a local file and has no checksum yet
pub fn set_file_md5sum(mut payload: Payload, profile_id: &str) -> Result<Payload> {
    if profile_id != FILE_PROFILE_ID || payload.str_value(MD5SUM_PROP).is_some() {
        return Ok(payload);
    }
    let Some(file_name) = payload.str_value(SUBMITTED_FILE_PROP).map(str::to_string) else {
        return Ok(payload);
    };

    info!(file = %file_name, "Computing md5sum");
    let md5sum = compute_file_md5(&file_name).map_err(ClientError::ChecksumFailed)?;
    payload.insert(MD5SUM_PROP, Value::String(md5sum));
    Ok(payload)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::NamedTempFile;

    #[test]
    fn test_md5_is_computed_for_file_records() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"Hello, world!").unwrap();

        let payload = Payload::from_value(json!({
            "submitted_file_name": file.path().to_str().unwrap()
        }))
        .unwrap();
        let out = set_file_md5sum(payload, FILE_PROFILE_ID).unwrap();
        assert_eq!(out.get(MD5SUM_PROP).unwrap(), "6cd3556deb0da54bca060b4c39479839");
    }

    #[test]
    fn test_existing_md5_is_kept() {
        let payload = Payload::from_value(json!({
            "submitted_file_name": "/nonexistent.fastq.gz",
            "md5sum": "abc"
        }))
        .unwrap();
        let out = set_file_md5sum(payload, FILE_PROFILE_ID).unwrap();
        assert_eq!(out.get(MD5SUM_PROP).unwrap(), "abc");
    }

    #[test]
    fn test_other_profiles_are_skipped() {
        let payload = Payload::from_value(json!({"submitted_file_name": "/nonexistent"})).unwrap();
        assert!(set_file_md5sum(payload, "biosample").is_ok());
    }

    #[test]
    fn test_missing_file_fails() {
        let payload = Payload::from_value(json!({
            "submitted_file_name": "/nonexistent/reads.fastq.gz",
            "md5sum": ""
        }))
        .unwrap();
        assert!(matches!(
            set_file_md5sum(payload, FILE_PROFILE_ID),
            Err(ClientError::ChecksumFailed(_))
        ));
    }
}
