//! Error types for the DCC client
//!
//! Messages are user-facing: they say what went wrong and, where there is
//! one, what to change so the next attempt succeeds.

use dcc_common::DccError;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Error type for every Portal operation
#[derive(Error, Debug)]
pub enum ClientError {
    /// Credentials or other settings are missing or invalid
    #[error("Configuration error: {0}. Check your environment variables or .env file.")]
    Config(String),

    /// The profile named by the payload doesn't match any Portal profile
    #[error("Unknown profile ID '{0}'. Run 'dcc profiles' to list the known profiles.")]
    UnknownProfile(String),

    /// Neither `_profile` nor `@id` names a profile
    #[error("No profile specified. Set the '_profile' key in the payload, or the '@id' property.")]
    ProfileNotSpecified,

    /// The payload can't be traced to a Portal record
    #[error("The payload has no identifier for traceability. Set 'aliases', or give a Portal identifier in the '_enc_id' key.")]
    MissingLookupIdentifier,

    /// A required property has no value and no configured default
    #[error("The property '{property}' is missing from the payload and no default is set. Set the {env_var} environment variable to store a default.")]
    MissingRequiredDefault {
        property: &'static str,
        env_var: &'static str,
    },

    /// An update was requested without naming the record
    #[error("The payload has no '_enc_id' key naming the record to update")]
    MissingRecordId,

    /// A create was requested for a payload without aliases
    #[error("The payload has no 'aliases'; at least one alias is required to create a record")]
    MissingAliases,

    /// The payload is not a JSON object
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// The Portal denied access to a record
    #[error("Access to Portal record '{0}' is forbidden")]
    Forbidden(String),

    /// No candidate identifier matched a Portal record
    #[error("Portal record not found: {0}")]
    NotFound(String),

    /// The Portal answered with an unexpected status
    #[error("{method} {url} failed with status {status}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
    },

    /// The Portal answered with a body of unexpected shape
    #[error("Unexpected Portal response from {url}: {reason}")]
    UnexpectedResponse { url: String, reason: String },

    /// The md5sum of a submitted file couldn't be computed
    #[error("Checksum computation failed: {0}")]
    ChecksumFailed(#[source] DccError),

    /// A local attachment couldn't be read
    #[error("Failed to read attachment '{path}': {source}")]
    Attachment {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// No MIME type could be guessed for a document
    #[error("Couldn't guess the MIME type of '{0}'")]
    UnknownMimeType(String),

    /// No local file is known for an upload
    #[error("No file path specified for the upload of '{0}', and the record has no 'submitted_file_name'")]
    NoFilePath(String),

    /// The cloud transfer failed
    #[error("Failed to upload file '{file_path}': {reason}")]
    UploadFailed { file_path: String, reason: String },

    /// Shared utility error
    #[error(transparent)]
    Common(#[from] DccError),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and paths.")]
    Io(#[from] std::io::Error),

    /// HTTP transport failed
    #[error("Network request failed: {0}. Check your internet connection and DCC_MODE.")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}. Check the file syntax.")]
    JsonParse(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClientError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        Self::InvalidPayload(msg.into())
    }

    pub fn unexpected_response(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn upload_failed(file_path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UploadFailed {
            file_path: file_path.into(),
            reason: reason.into(),
        }
    }

    /// True for the not-found classification of a lookup
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
