//! Profile registry
//!
//! The table of Portal profiles (schemas), fetched once per session. It is an
//! immutable value handed to the [`Connection`](crate::Connection), so tests
//! build a fixed registry with [`ProfileRegistry::from_entries`].

use crate::api::{endpoints, PortalClient};
use crate::error::{ClientError, Result};
use crate::payload::Payload;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Profile ID of file records
pub const FILE_PROFILE_ID: &str = "file";

/// File property naming the local file to upload
pub const SUBMITTED_FILE_PROP: &str = "submitted_file_name";

/// File property holding the content checksum
pub const MD5SUM_PROP: &str = "md5sum";

pub const AWARD_PROP: &str = "award";
pub const LAB_PROP: &str = "lab";

/// What the client needs to know about one profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub properties: BTreeSet<String>,
}

impl Profile {
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains(name)
    }

    /// Records of this profile take no `award` (and no `lab`)
    pub fn is_awardless(&self) -> bool {
        !self.has_property(AWARD_PROP)
    }
}

/// Lookup table of the known profiles, keyed by profile ID
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, Profile>,
}

impl ProfileRegistry {
    /// Fetch the profiles from the Portal
    pub async fn fetch(client: &PortalClient) -> Result<Self> {
        let url = endpoints::profiles_url(client.base_url());
        info!(url = %url, "Fetching Portal profiles");

        let response = client.get(&url).await?;
        if !response.is_success() {
            return Err(response.status_error());
        }

        let registry = Self::from_profiles_json(&response.body)?;
        debug!(count = registry.len(), "Loaded profile registry");
        Ok(registry)
    }

    /// Build the registry from the `/profiles/` document: schema name → schema
    ///
    /// Private entries (names starting with `_`) are skipped. The file profile
    /// must be present with its upload properties.
    pub fn from_profiles_json(body: &Value) -> Result<Self> {
        let schemas = body
            .as_object()
            .ok_or_else(|| ClientError::config("the Portal profiles document is not a JSON object"))?;

        let mut profiles = BTreeMap::new();
        for (name, schema) in schemas {
            if name.starts_with('_') {
                continue;
            }
            let Some(id) = schema.get("id").and_then(Value::as_str).map(profile_id_from_schema_id) else {
                debug!(name = %name, "Skipping schema without an 'id'");
                continue;
            };
            let properties = schema
                .get("properties")
                .and_then(Value::as_object)
                .map(|props| props.keys().cloned().collect())
                .unwrap_or_default();

            profiles.insert(id.clone(), Profile { id, properties });
        }

        let registry = Self { profiles };
        registry.check_file_profile()?;
        Ok(registry)
    }

    /// Registry of the given profile IDs and their property names, without validation
    pub fn from_entries<'a, I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, P)>,
        P: IntoIterator<Item = &'a str>,
    {
        let profiles = entries
            .into_iter()
            .map(|(id, props)| {
                let profile = Profile {
                    id: id.to_string(),
                    properties: props.into_iter().map(str::to_string).collect(),
                };
                (id.to_string(), profile)
            })
            .collect();
        Self { profiles }
    }

    fn check_file_profile(&self) -> Result<()> {
        let file = self.profiles.get(FILE_PROFILE_ID).ok_or_else(|| {
            ClientError::config(format!("the Portal no longer has a '{FILE_PROFILE_ID}' profile"))
        })?;
        for prop in [SUBMITTED_FILE_PROP, MD5SUM_PROP] {
            if !file.has_property(prop) {
                return Err(ClientError::config(format!(
                    "the '{FILE_PROFILE_ID}' profile no longer has the '{prop}' property"
                )));
            }
        }
        Ok(())
    }

    /// Canonical profile ID for a profile name or record `@id`
    ///
    /// `/genetic-modifications/ENCGM000AAA/` resolves to `genetic_modification`.
    pub fn resolve(&self, name: &str) -> Result<&Profile> {
        let candidate = name
            .trim_matches('/')
            .split('/')
            .next()
            .unwrap_or_default()
            .to_lowercase()
            .replace('-', "_");

        if let Some(profile) = self.profiles.get(&candidate) {
            return Ok(profile);
        }
        candidate
            .strip_suffix('s')
            .and_then(|singular| self.profiles.get(singular))
            .ok_or_else(|| ClientError::UnknownProfile(name.to_string()))
    }

    /// Profile of a payload, from `_profile` or else `@id`
    pub fn profile_from_payload(&self, payload: &Payload) -> Result<&Profile> {
        let hint = payload.profile_hint().ok_or(ClientError::ProfileNotSpecified)?;
        self.resolve(hint)
    }

    pub fn get(&self, id: &str) -> Option<&Profile> {
        self.profiles.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// `/profiles/genetic_modification.json` → `genetic_modification`
fn profile_id_from_schema_id(id: &str) -> String {
    let file_name = id.rsplit('/').next().unwrap_or(id);
    file_name
        .strip_suffix(".json")
        .unwrap_or(file_name)
        .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> ProfileRegistry {
        ProfileRegistry::from_entries([
            ("biosample", vec!["aliases", "award", "lab"]),
            ("genetic_modification", vec!["aliases", "award", "lab"]),
            ("file", vec!["aliases", "award", "lab", "md5sum", "submitted_file_name"]),
            ("user", vec!["email"]),
        ])
    }

    #[test]
    fn test_resolve_variants() {
        let reg = registry();
        for name in [
            "genetic_modification",
            "Genetic-Modification",
            "genetic-modifications",
            "/genetic-modifications/ENCGM000AAA/",
        ] {
            assert_eq!(reg.resolve(name).unwrap().id, "genetic_modification", "{name}");
        }
        assert_eq!(reg.resolve("/biosamples/ENCBS000AAA/").unwrap().id, "biosample");
    }

    #[test]
    fn test_resolve_unknown() {
        let err = registry().resolve("spaceship").unwrap_err();
        assert!(matches!(err, ClientError::UnknownProfile(ref name) if name == "spaceship"));
    }

    #[test]
    fn test_profile_from_payload() {
        let reg = registry();
        let payload = Payload::from_value(json!({"@id": "/files/ENCFF000AAA/"})).unwrap();
        assert_eq!(reg.profile_from_payload(&payload).unwrap().id, "file");

        let payload = Payload::from_value(json!({"aliases": ["lab:x"]})).unwrap();
        assert!(matches!(
            reg.profile_from_payload(&payload),
            Err(ClientError::ProfileNotSpecified)
        ));
    }

    #[test]
    fn test_awardless() {
        let reg = registry();
        assert!(reg.get("user").unwrap().is_awardless());
        assert!(!reg.get("biosample").unwrap().is_awardless());
    }

    #[test]
    fn test_from_profiles_json() {
        let body = json!({
            "_subtypes": {"id": "/profiles/_subtypes.json"},
            "File": {
                "id": "/profiles/file.json",
                "properties": {"md5sum": {}, "submitted_file_name": {}, "award": {}}
            },
            "GeneticModification": {
                "id": "/profiles/genetic_modification.json",
                "properties": {"award": {}}
            }
        });
        let reg = ProfileRegistry::from_profiles_json(&body).unwrap();
        assert_eq!(reg.ids().collect::<Vec<_>>(), vec!["file", "genetic_modification"]);
    }

    #[test]
    fn test_from_profiles_json_requires_file_profile() {
        let body = json!({
            "File": {"id": "/profiles/file.json", "properties": {"md5sum": {}}}
        });
        let err = ProfileRegistry::from_profiles_json(&body).unwrap_err();
        assert!(err.to_string().contains("submitted_file_name"));
    }
}
