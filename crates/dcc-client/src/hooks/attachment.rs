//! Inline attachments
//!
//! Profiles such as `document` take an `attachment` object whose `href` is a
//! base64 data URI. A payload may instead give `attachment: {"path": ...}`
//! and have the object built from the local file.

use crate::error::{ClientError, Result};
use crate::payload::Payload;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};
use std::path::Path;
use tracing::debug;

pub const ATTACHMENT_PROP: &str = "attachment";

/// Key of the local-file shortcut inside `attachment`
pub const PATH_KEY: &str = "path";

/// Guessed MIME type of a file name
pub fn guess_mime(file_name: &str) -> Option<mime::Mime> {
    mime_guess::from_path(file_name).first()
}

/// Build the `{download, type, href}` attachment object for a local file
///
/// Files with no recognisable extension are sent as `application/octet-stream`.
pub fn build_attachment(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let download = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let data = std::fs::read(path).map_err(|source| ClientError::Attachment {
        path: path.display().to_string(),
        source,
    })?;

    let mime_type = guess_mime(&download).unwrap_or(mime::APPLICATION_OCTET_STREAM);
    let href = format!("data:{};base64,{}", mime_type.essence_str(), STANDARD.encode(data));

    Ok(json!({
        "download": download,
        "type": mime_type.essence_str(),
        "href": href,
    }))
}

/// Replace an `attachment: {path: ...}` shortcut with the built attachment
pub fn expand_attachment(mut payload: Payload) -> Result<Payload> {
    let Some(path) = payload
        .get(ATTACHMENT_PROP)
        .and_then(|attachment| attachment.get(PATH_KEY))
        .and_then(Value::as_str)
        .map(str::to_string)
    else {
        return Ok(payload);
    };

    debug!(path = %path, "Expanding attachment shortcut");
    payload.insert(ATTACHMENT_PROP, build_attachment(&path)?);
    Ok(payload)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_expand_attachment_shortcut() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.txt");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"hello")
            .unwrap();

        let payload = Payload::from_value(json!({
            "attachment": {"path": path.to_str().unwrap()}
        }))
        .unwrap();
        let out = expand_attachment(payload).unwrap();
        let attachment = out.get(ATTACHMENT_PROP).unwrap();

        assert_eq!(attachment["download"], "x.txt");
        assert_eq!(attachment["type"], "text/plain");
        let href = attachment["href"].as_str().unwrap();
        assert!(href.starts_with("data:"));
        assert_eq!(href, "data:text/plain;base64,aGVsbG8=");
    }

    #[test]
    fn test_complete_attachment_is_untouched() {
        let payload = Payload::from_value(json!({
            "attachment": {"download": "a.pdf", "type": "application/pdf", "href": "data:..."}
        }))
        .unwrap();
        assert_eq!(expand_attachment(payload.clone()).unwrap(), payload);
    }

    #[test]
    fn test_unreadable_attachment() {
        let payload = Payload::from_value(json!({
            "attachment": {"path": "/nonexistent/dir/x.txt"}
        }))
        .unwrap();
        assert!(matches!(
            expand_attachment(payload),
            Err(ClientError::Attachment { .. })
        ));
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime("plot.png").unwrap(), mime::IMAGE_PNG);
        assert!(guess_mime("noextension").is_none());
    }
}
