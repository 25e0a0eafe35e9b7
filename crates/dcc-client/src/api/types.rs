//! Portal API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A Portal record as returned by a lookup or a submission
pub type Record = Map<String, Value>;

/// Key under which create, update and search responses nest their records
pub const GRAPH_KEY: &str = "@graph";

/// Short-lived storage credentials issued for uploading a file record's content
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadCredentials {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: String,
    /// Destination, e.g. `s3://encoded-files-dev/2018/01/28/<uuid>/TSTFF334203.fastq.gz`
    pub upload_url: String,
    /// When the session token stops working; credentials without one are taken as valid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,
}

impl UploadCredentials {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_some_and(|expiration| expiration <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Execution environment for the upload mechanism
    pub fn to_env(&self) -> BTreeMap<&'static str, String> {
        let mut env = BTreeMap::new();
        env.insert("AWS_ACCESS_KEY_ID", self.access_key.clone());
        env.insert("AWS_SECRET_ACCESS_KEY", self.secret_key.clone());
        env.insert("AWS_SECURITY_TOKEN", self.session_token.clone());
        env.insert("AWS_SESSION_TOKEN", self.session_token.clone());
        env.insert("UPLOAD_URL", self.upload_url.clone());
        env
    }
}

impl std::fmt::Debug for UploadCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadCredentials")
            .field("access_key", &self.access_key)
            .field("upload_url", &self.upload_url)
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}

/// First element of a response's `@graph` array, if any
pub fn first_graph_record(body: &Value) -> Option<Record> {
    body.get(GRAPH_KEY)?.as_array()?.first()?.as_object().cloned()
}

/// All elements of a response's `@graph` array
pub fn graph_values(body: &Value) -> Vec<Value> {
    body.get(GRAPH_KEY)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upload_credentials_env() {
        let creds: UploadCredentials = serde_json::from_value(json!({
            "access_key": "access_key",
            "secret_key": "secret_key",
            "session_token": "session_token",
            "upload_url": "upload_url",
            "expiration": "2018-01-29T05:00:00+00:00"
        }))
        .unwrap();

        let env = creds.to_env();
        assert_eq!(env["AWS_ACCESS_KEY_ID"], "access_key");
        assert_eq!(env["AWS_SECRET_ACCESS_KEY"], "secret_key");
        assert_eq!(env["AWS_SECURITY_TOKEN"], "session_token");
        assert_eq!(env["UPLOAD_URL"], "upload_url");
    }

    #[test]
    fn test_expiration() {
        let creds: UploadCredentials = serde_json::from_value(json!({
            "access_key": "a",
            "secret_key": "s",
            "session_token": "t",
            "upload_url": "s3://bucket/key",
            "expiration": "2018-01-29T05:00:00+00:00"
        }))
        .unwrap();

        let before: DateTime<Utc> = "2018-01-29T04:59:59Z".parse().unwrap();
        let after: DateTime<Utc> = "2018-01-29T05:00:01Z".parse().unwrap();
        assert!(!creds.is_expired_at(before));
        assert!(creds.is_expired_at(after));
        assert!(creds.is_expired());

        let open_ended = UploadCredentials {
            expiration: None,
            ..creds
        };
        assert!(!open_ended.is_expired());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let creds = UploadCredentials {
            access_key: "AKIA".into(),
            secret_key: "very-secret".into(),
            session_token: "token".into(),
            upload_url: "s3://bucket/key".into(),
            expiration: None,
        };
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("s3://bucket/key"));
        assert!(!rendered.contains("very-secret"));
        assert!(!rendered.contains("session_token"));
    }

    #[test]
    fn test_graph_helpers() {
        let body = json!({"@graph": [{"accession": "ENCBS000AAA"}, {"accession": "ENCBS000AAB"}]});
        assert_eq!(first_graph_record(&body).unwrap()["accession"], "ENCBS000AAA");
        assert_eq!(graph_values(&body).len(), 2);
        assert!(first_graph_record(&json!({"@graph": []})).is_none());
        assert!(graph_values(&json!({"status": "error"})).is_empty());
    }
}
