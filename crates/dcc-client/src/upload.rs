//! Cloud upload of file contents
//!
//! The Portal hands out short-lived storage credentials per file record. An
//! [`Uploader`] takes those credentials and a local path and copies the file
//! to the credentials' upload URL.

use crate::api::UploadCredentials;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    Client,
};
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Region of the Portal's upload buckets
pub const DEFAULT_UPLOAD_REGION: &str = "us-west-2";

/// Copies a local file to cloud storage
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Name of the backend, for logs
    fn name(&self) -> &'static str;

    /// Copy `path` to `credentials.upload_url`
    async fn upload(&self, path: &Path, credentials: &UploadCredentials) -> Result<()>;
}

/// Uploads with the AWS command line tool (`aws s3 cp <path> <url>`)
#[derive(Debug, Clone)]
pub struct AwsCliUploader {
    program: String,
}

impl AwsCliUploader {
    pub fn new() -> Self {
        Self::with_program("aws")
    }

    /// Use another executable in place of `aws`
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for AwsCliUploader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Uploader for AwsCliUploader {
    fn name(&self) -> &'static str {
        "aws-cli"
    }

    #[instrument(level = "debug", skip(self, credentials), fields(url = %credentials.upload_url))]
    async fn upload(&self, path: &Path, credentials: &UploadCredentials) -> Result<()> {
        let file_path = path.display().to_string();
        debug!(program = %self.program, "Running upload command");

        let output = Command::new(&self.program)
            .arg("s3")
            .arg("cp")
            .arg(path)
            .arg(&credentials.upload_url)
            .envs(credentials.to_env())
            .output()
            .await
            .map_err(|e| ClientError::upload_failed(&file_path, format!("couldn't run '{}': {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClientError::upload_failed(
                &file_path,
                format!("'{}' exited with {}: {}", self.program, output.status, stderr.trim()),
            ));
        }

        info!(file = %file_path, "Upload complete");
        Ok(())
    }
}

/// Uploads through the S3 SDK with the session credentials
#[derive(Debug, Clone)]
pub struct S3Uploader {
    region: String,
    endpoint: Option<String>,
}

impl S3Uploader {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            endpoint: None,
        }
    }

    /// Send requests to a custom S3-compatible endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    fn client(&self, credentials: &UploadCredentials) -> Client {
        let session = Credentials::new(
            &credentials.access_key,
            &credentials.secret_key,
            Some(credentials.session_token.clone()),
            None,
            "dcc-upload",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .credentials_provider(session)
            .region(Region::new(self.region.clone()));

        if let Some(endpoint) = &self.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Client::from_conf(builder.build())
    }
}

impl Default for S3Uploader {
    fn default() -> Self {
        Self::new(DEFAULT_UPLOAD_REGION)
    }
}

#[async_trait]
impl Uploader for S3Uploader {
    fn name(&self) -> &'static str {
        "s3-sdk"
    }

    #[instrument(level = "debug", skip(self, credentials), fields(url = %credentials.upload_url))]
    async fn upload(&self, path: &Path, credentials: &UploadCredentials) -> Result<()> {
        let file_path = path.display().to_string();
        let (bucket, key) = parse_s3_url(&credentials.upload_url)
            .ok_or_else(|| ClientError::upload_failed(&file_path, format!("not an s3:// URL: {}", credentials.upload_url)))?;

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| ClientError::upload_failed(&file_path, e.to_string()))?;

        debug!(bucket, key, "Uploading to s3://{}/{}", bucket, key);

        self.client(credentials)
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| ClientError::upload_failed(&file_path, e.to_string()))?;

        info!(file = %file_path, "Upload complete");
        Ok(())
    }
}

/// Split `s3://bucket/some/key` into `("bucket", "some/key")`
pub fn parse_s3_url(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix("s3://")?;
    let (bucket, key) = rest.split_once('/')?;
    if bucket.is_empty() || key.is_empty() {
        return None;
    }
    Some((bucket, key))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn credentials() -> UploadCredentials {
        UploadCredentials {
            access_key: "AK".into(),
            secret_key: "SK".into(),
            session_token: "TOKEN".into(),
            upload_url: "s3://encode-files/2018/01/28/uuid/ENCFF000AAA.fastq.gz".into(),
            expiration: None,
        }
    }

    #[test]
    fn test_parse_s3_url() {
        assert_eq!(
            parse_s3_url("s3://encode-files/2018/01/28/uuid/ENCFF000AAA.fastq.gz"),
            Some(("encode-files", "2018/01/28/uuid/ENCFF000AAA.fastq.gz"))
        );
        assert_eq!(parse_s3_url("https://encode-files/key"), None);
        assert_eq!(parse_s3_url("s3://bucket-only"), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cli_uploader_success() {
        let uploader = AwsCliUploader::with_program("true");
        assert!(uploader
            .upload(Path::new("/tmp/reads.fastq.gz"), &credentials())
            .await
            .is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cli_uploader_failure() {
        let uploader = AwsCliUploader::with_program("false");
        let err = uploader
            .upload(Path::new("/tmp/reads.fastq.gz"), &credentials())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::UploadFailed { ref file_path, .. } if file_path == "/tmp/reads.fastq.gz"));
    }

    #[tokio::test]
    async fn test_cli_uploader_missing_program() {
        let uploader = AwsCliUploader::with_program("dcc-no-such-program");
        assert!(matches!(
            uploader.upload(Path::new("x"), &credentials()).await,
            Err(ClientError::UploadFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_s3_uploader_rejects_non_s3_url() {
        let mut creds = credentials();
        creds.upload_url = "https://example.org/file".into();
        assert!(matches!(
            S3Uploader::default().upload(Path::new("x"), &creds).await,
            Err(ClientError::UploadFailed { .. })
        ));
    }
}
