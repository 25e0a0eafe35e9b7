//! Submission payloads
//!
//! A payload is one record's properties plus two out-of-band control keys:
//! [`PROFILE_KEY`] selects the target profile and [`ENCID_KEY`] names an
//! existing record. Both are stripped before anything is sent.

use crate::api::Record;
use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Control key selecting the profile of a payload
pub const PROFILE_KEY: &str = "_profile";

/// Control key naming the Portal record a payload refers to
pub const ENCID_KEY: &str = "_enc_id";

pub const ALIASES_PROP: &str = "aliases";
pub const MD5SUM_PROP: &str = "md5sum";
pub const AT_ID_PROP: &str = "@id";

/// One record's worth of properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Record);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ClientError::invalid_payload(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Candidate identifiers in probe order: `_enc_id`, then each alias, then `md5sum`
    pub fn lookup_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();

        if let Some(id) = self.str_value(ENCID_KEY) {
            ids.push(id.to_string());
        }
        ids.extend(self.aliases());
        if let Some(md5) = self.str_value(MD5SUM_PROP) {
            ids.push(md5.to_string());
        }

        let ids: Vec<String> = ids
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();

        if ids.is_empty() {
            return Err(ClientError::MissingLookupIdentifier);
        }
        Ok(ids)
    }

    /// String entries of `aliases`, in order
    pub fn aliases(&self) -> Vec<String> {
        self.0
            .get(ALIASES_PROP)
            .and_then(Value::as_array)
            .map(|aliases| {
                aliases
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn first_alias(&self) -> Option<String> {
        self.aliases().into_iter().next()
    }

    pub fn set_aliases(&mut self, aliases: Vec<String>) {
        let values = aliases.into_iter().map(Value::String).collect();
        self.0.insert(ALIASES_PROP.to_string(), Value::Array(values));
    }

    /// Value of the `_enc_id` control key
    pub fn record_id(&self) -> Option<&str> {
        self.str_value(ENCID_KEY)
    }

    pub fn set_record_id(&mut self, id: impl Into<String>) {
        self.0.insert(ENCID_KEY.to_string(), Value::String(id.into()));
    }

    pub fn set_profile(&mut self, profile: impl Into<String>) {
        self.0.insert(PROFILE_KEY.to_string(), Value::String(profile.into()));
    }

    /// Raw profile selector: `_profile`, falling back to `@id`
    pub fn profile_hint(&self) -> Option<&str> {
        self.str_value(PROFILE_KEY)
            .or_else(|| self.str_value(AT_ID_PROP))
    }

    /// Remove the control keys, and `@id` too when `include_at_id` is set
    pub fn strip_control_keys(&mut self, include_at_id: bool) {
        self.0.remove(PROFILE_KEY);
        self.0.remove(ENCID_KEY);
        if include_at_id {
            self.0.remove(AT_ID_PROP);
        }
    }

    /// Non-empty string value of a property
    pub fn str_value(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn as_map(&self) -> &Record {
        &self.0
    }

    pub fn as_map_mut(&mut self) -> &mut Record {
        &mut self.0
    }

    pub fn into_inner(self) -> Record {
        self.0
    }
}

impl From<Record> for Payload {
    fn from(map: Record) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Payload {
    type Error = ClientError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        Payload::from_value(value).unwrap()
    }

    #[test]
    fn test_lookup_ids_require_an_identifier() {
        let p = payload(json!({"_profile": "biosample", "description": "x"}));
        assert!(matches!(p.lookup_ids(), Err(ClientError::MissingLookupIdentifier)));
    }

    #[test]
    fn test_lookup_ids_from_aliases_only() {
        let p = payload(json!({"aliases": [" lab:a ", "lab:b"]}));
        assert_eq!(p.lookup_ids().unwrap(), vec!["lab:a", "lab:b"]);
    }

    #[test]
    fn test_lookup_ids_order() {
        let p = payload(json!({
            "md5sum": "d41d8cd98f00b204e9800998ecf8427e",
            "aliases": ["lab:a"],
            "_enc_id": "ENCFF000AAA"
        }));
        assert_eq!(
            p.lookup_ids().unwrap(),
            vec!["ENCFF000AAA", "lab:a", "d41d8cd98f00b204e9800998ecf8427e"]
        );
    }

    #[test]
    fn test_blank_identifiers_are_ignored() {
        let p = payload(json!({"aliases": ["  "], "_enc_id": ""}));
        assert!(p.lookup_ids().is_err());
    }

    #[test]
    fn test_profile_hint_falls_back_to_at_id() {
        let p = payload(json!({"@id": "/biosamples/ENCBS000AAA/"}));
        assert_eq!(p.profile_hint(), Some("/biosamples/ENCBS000AAA/"));

        let p = payload(json!({"@id": "/biosamples/x/", "_profile": "library"}));
        assert_eq!(p.profile_hint(), Some("library"));
    }

    #[test]
    fn test_strip_control_keys() {
        let mut p = payload(json!({"_profile": "a", "_enc_id": "b", "@id": "c", "x": 1}));
        p.strip_control_keys(false);
        assert!(p.contains_key("@id"));
        p.strip_control_keys(true);
        assert_eq!(p.into_inner(), json!({"x": 1}).as_object().cloned().unwrap());
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = Payload::from_value(json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_serializes_transparently() {
        let p = payload(json!({"aliases": ["lab:a"]}));
        assert_eq!(serde_json::to_value(&p).unwrap(), json!({"aliases": ["lab:a"]}));
    }
}
