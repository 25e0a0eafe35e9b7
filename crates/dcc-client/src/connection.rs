//! Submission coordinator
//!
//! [`Connection`] decides whether a payload is a new or an existing Portal
//! record, runs the pre-submission hooks, creates (POST) or updates (PATCH)
//! the record and then runs the post-submission actions.
//!
//! Every Portal call is awaited before the next one starts.

use crate::alias::{add_to_set, strip_alias_prefix};
use crate::api::{endpoints, graph_values, PortalClient, Record, UploadCredentials};
use crate::config::{Config, AWARD_VAR, LAB_VAR};
use crate::error::{ClientError, Result};
use crate::hooks::attachment::{build_attachment, guess_mime, ATTACHMENT_PROP};
use crate::hooks::{HookContext, Method, PostSubmitAction, PostSubmitPipeline, PreSubmitPipeline};
use crate::payload::{Payload, ALIASES_PROP, AT_ID_PROP};
use crate::profiles::{ProfileRegistry, AWARD_PROP, FILE_PROFILE_ID, LAB_PROP, SUBMITTED_FILE_PROP};
use crate::upload::{AwsCliUploader, Uploader};
use dcc_common::logging::POSTED_LOG_TARGET;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Property holding a file record's storage credentials
pub const UPLOAD_CREDENTIALS_PROP: &str = "upload_credentials";

/// Frame that embeds linked records in a lookup response
pub const EMBEDDED_FRAME: &str = "embedded";

/// FASTQ files keyed by biological replicate, technical replicate, then `paired_end`
pub type FastqReplicateMap = BTreeMap<u64, BTreeMap<u64, BTreeMap<String, Vec<Record>>>>;

/// Options of an update
#[derive(Debug, Clone, Copy)]
pub struct PatchOptions {
    /// Fail on 403; otherwise the current record is returned unchanged
    pub raise_403: bool,
    /// Union list values with the Portal's instead of replacing them
    pub extend_array_values: bool,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            raise_403: true,
            extend_array_values: true,
        }
    }
}

/// Options of a create-or-update
#[derive(Debug, Clone, Copy)]
pub struct SendOptions {
    /// Fail when the record doesn't exist instead of creating it
    pub error_if_not_found: bool,
    pub extend_array_values: bool,
    pub raise_403: bool,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            error_if_not_found: false,
            extend_array_values: true,
            raise_403: true,
        }
    }
}

impl From<SendOptions> for PatchOptions {
    fn from(opts: SendOptions) -> Self {
        Self {
            raise_403: opts.raise_403,
            extend_array_values: opts.extend_array_values,
        }
    }
}

/// Result of an upload request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded,
    /// No credentials could be obtained, nothing was transferred
    NoCredentials,
}

/// Authenticated session with the Portal
pub struct Connection {
    client: PortalClient,
    config: Config,
    profiles: ProfileRegistry,
    pre_submit: PreSubmitPipeline,
    post_submit: PostSubmitPipeline,
    uploader: Arc<dyn Uploader>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("base_url", &self.client.base_url())
            .field("mode", &self.config.mode)
            .field("profiles", &self.profiles.len())
            .field("uploader", &self.uploader.name())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Connect and fetch the profile registry from the Portal
    pub async fn connect(config: Config) -> Result<Self> {
        let client = PortalClient::from_config(&config)?;
        let profiles = ProfileRegistry::fetch(&client).await?;
        Ok(Self::with_client(client, config, profiles))
    }

    /// Connection with a given profile registry
    pub fn new(config: Config, profiles: ProfileRegistry) -> Result<Self> {
        let client = PortalClient::from_config(&config)?;
        Ok(Self::with_client(client, config, profiles))
    }

    fn with_client(client: PortalClient, config: Config, profiles: ProfileRegistry) -> Self {
        info!(mode = %config.mode, url = %client.base_url(), "Connected to the Portal");
        Self {
            client,
            config,
            profiles,
            pre_submit: PreSubmitPipeline::standard(),
            post_submit: PostSubmitPipeline::standard(),
            uploader: Arc::new(AwsCliUploader::new()),
        }
    }

    pub fn with_uploader(mut self, uploader: impl Uploader + 'static) -> Self {
        self.uploader = Arc::new(uploader);
        self
    }

    pub fn with_pre_submit(mut self, pipeline: PreSubmitPipeline) -> Self {
        self.pre_submit = pipeline;
        self
    }

    pub fn with_post_submit(mut self, pipeline: PostSubmitPipeline) -> Self {
        self.post_submit = pipeline;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn profiles(&self) -> &ProfileRegistry {
        &self.profiles
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    /// Candidate identifiers of a payload, in probe order
    pub fn lookup_ids(&self, payload: &Payload) -> Result<Vec<String>> {
        payload.lookup_ids()
    }

    /// Look a record up by each identifier in turn, returning the first hit
    ///
    /// A 403 on any candidate is fatal. When every candidate is a 404 the
    /// result is `None` with `ignore_404`, a `NotFound` error otherwise. Any
    /// other failure status is an error.
    #[instrument(level = "debug", skip(self, ids))]
    pub async fn get<S: AsRef<str>>(
        &self,
        ids: &[S],
        ignore_404: bool,
        frame: Option<&str>,
    ) -> Result<Option<Record>> {
        let mut failures: Vec<(StatusCode, String, String)> = Vec::new();

        for id in ids {
            let id = endpoints::trim_id(id.as_ref());
            if id.is_empty() {
                continue;
            }
            let url = endpoints::record_url(self.base_url(), id, frame)?;
            debug!(id, url = %url, "GET record");

            let response = self.client.get(&url).await?;
            if response.is_success() {
                return response.record().map(Some);
            }
            failures.push((response.status, id.to_string(), url));
        }

        if let Some((_, id, _)) = failures.iter().find(|(status, ..)| *status == StatusCode::FORBIDDEN) {
            error!(id = %id, "Access to record is forbidden");
            return Err(ClientError::Forbidden(id.clone()));
        }

        if let Some((status, _, url)) = failures.iter().find(|(status, ..)| *status != StatusCode::NOT_FOUND) {
            return Err(ClientError::Status {
                method: "GET",
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        if ignore_404 {
            return Ok(None);
        }
        let tried: Vec<&str> = ids.iter().map(|id| id.as_ref()).collect();
        Err(ClientError::NotFound(tried.join(", ")))
    }

    /// Look up a record that must exist
    pub async fn get_record(&self, id: &str) -> Result<Record> {
        self.get(&[id], false, None)
            .await?
            .ok_or_else(|| ClientError::NotFound(id.to_string()))
    }

    async fn get_record_framed(&self, id: &str, frame: &str) -> Result<Record> {
        self.get(&[id], false, Some(frame))
            .await?
            .ok_or_else(|| ClientError::NotFound(id.to_string()))
    }

    /// Aliases of a record, optionally without their lab prefix
    pub async fn get_aliases(&self, id: &str, strip_prefix: bool) -> Result<Vec<String>> {
        let record = self.get_record(id).await?;
        Ok(string_list(record.get(ALIASES_PROP))
            .into_iter()
            .map(|alias| {
                if strip_prefix {
                    strip_alias_prefix(&alias).to_string()
                } else {
                    alias
                }
            })
            .collect())
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    pub fn make_search_url(&self, args: &BTreeMap<String, String>, limit: Option<u32>) -> String {
        endpoints::search_url(self.base_url(), args, limit)
    }

    /// Records matching the query; 404 yields the (empty) `@graph` as well
    #[instrument(level = "debug", skip(self))]
    pub async fn search(&self, args: &BTreeMap<String, String>, limit: Option<u32>) -> Result<Vec<Value>> {
        let url = self.make_search_url(args, limit);
        debug!(url = %url, "Searching the Portal");

        let response = self.client.get(&url).await?;
        if response.status != StatusCode::OK && response.status != StatusCode::NOT_FOUND {
            return Err(response.status_error());
        }
        Ok(graph_values(&response.body))
    }

    // ------------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------------

    /// Create the record, or update it when any lookup identifier finds it
    #[instrument(level = "debug", skip(self, payload))]
    pub async fn send(&self, mut payload: Payload, opts: SendOptions) -> Result<Record> {
        let ids = payload.lookup_ids()?;
        let existing = self.get(&ids, !opts.error_if_not_found, None).await?;

        if existing.is_none() {
            return self.post(payload).await;
        }

        if payload.record_id().is_none() {
            let record_id = payload
                .first_alias()
                .or_else(|| ids.first().cloned())
                .ok_or(ClientError::MissingLookupIdentifier)?;
            debug!(record_id = %record_id, "Record exists; updating it");
            payload.set_record_id(record_id);
        }
        self.patch(payload, opts.into()).await
    }

    /// Create a record
    ///
    /// A 409 is not an error: the record already exists and is returned as
    /// currently stored.
    #[instrument(level = "debug", skip(self, payload))]
    pub async fn post(&self, payload: Payload) -> Result<Record> {
        let profile_id = self.profiles.profile_from_payload(&payload)?.id.clone();
        let awardless = self
            .profiles
            .get(&profile_id)
            .is_some_and(|profile| profile.is_awardless());

        let mut payload = payload;
        if !awardless {
            set_default(&mut payload, AWARD_PROP, self.config.award.as_deref(), AWARD_VAR)?;
            set_default(&mut payload, LAB_PROP, self.config.lab.as_deref(), LAB_VAR)?;
        }
        if payload.first_alias().is_none() {
            return Err(ClientError::MissingAliases);
        }

        let lab_prefix = self.config.lab_prefix();
        let ctx = HookContext {
            method: Method::Post,
            profile_id: &profile_id,
            lab_prefix: lab_prefix.as_deref(),
        };
        let mut payload = self.pre_submit.run(payload, &ctx)?;
        payload.strip_control_keys(true);
        let alias = payload.first_alias().ok_or(ClientError::MissingAliases)?;

        let url = endpoints::collection_url(self.base_url(), &profile_id);
        let body = Value::Object(payload.as_map().clone());
        debug!(alias = %alias, url = %url, payload = %body, "POSTing record");

        let response = self.client.post(&url, &payload).await?;

        if response.is_success() {
            let record = response.graph_record()?;
            let remote_id = primary_id(&record).ok_or_else(|| {
                ClientError::unexpected_response(&url, "created record has no accession or uuid")
            })?;
            info!(target: POSTED_LOG_TARGET, "{}\t{}", alias, remote_id);
            info!(alias = %alias, id = %remote_id, "Created record");

            self.run_post_submit(Method::Post, &remote_id, &profile_id).await;
            return Ok(record);
        }

        if response.status == StatusCode::CONFLICT {
            error!(alias = %alias, "Will not post {} because it already exists", alias);
            return self.get_record(&alias).await;
        }

        error!(alias = %alias, status = response.status.as_u16(), "Failed to POST {}", alias);
        debug!(body = %response.body, "Portal response");
        Err(response.status_error())
    }

    /// Update the record named by the payload's `_enc_id`
    #[instrument(level = "debug", skip(self, payload))]
    pub async fn patch(&self, payload: Payload, opts: PatchOptions) -> Result<Record> {
        let record_id = payload
            .record_id()
            .map(|id| endpoints::trim_id(id).to_string())
            .ok_or(ClientError::MissingRecordId)?;

        let current = self.get_record(&record_id).await?;

        let mut payload = payload;
        if opts.extend_array_values {
            extend_array_values(payload.as_map_mut(), &current);
        }

        let profile_id = self.record_profile_id(&payload, &current);
        let lab_prefix = self.config.lab_prefix();
        let ctx = HookContext {
            method: Method::Patch,
            profile_id: profile_id.as_deref().unwrap_or_default(),
            lab_prefix: lab_prefix.as_deref(),
        };
        let mut payload = self.pre_submit.run(payload, &ctx)?;
        if opts.extend_array_values {
            // Hooks may rewrite merged values into duplicates (`x` prefixed to `lab:x`)
            dedup_array_values(payload.as_map_mut());
        }
        payload.strip_control_keys(false);

        let url = endpoints::patch_url(self.base_url(), &record_id)?;
        let body = Value::Object(payload.as_map().clone());
        debug!(record_id = %record_id, url = %url, payload = %body, "PATCHing record");

        let response = self.client.patch(&url, &payload).await?;

        if response.is_success() {
            let record = response.graph_record()?;
            let remote_id = primary_id(&record).unwrap_or_else(|| record_id.clone());
            let profile_id = self.record_profile_id(&payload, &record).unwrap_or_default();
            self.run_post_submit(Method::Patch, &remote_id, &profile_id).await;
            return Ok(record);
        }

        if response.status == StatusCode::FORBIDDEN {
            if !opts.raise_403 {
                warn!(record_id = %record_id, "PATCH forbidden; returning the current record");
                return Ok(current);
            }
            error!(record_id = %record_id, "Failed to PATCH {}: forbidden", record_id);
            return Err(ClientError::Forbidden(record_id));
        }

        error!(record_id = %record_id, status = response.status.as_u16(), "Failed to PATCH {}", record_id);
        debug!(body = %response.body, "Portal response");
        Err(response.status_error())
    }

    fn record_profile_id(&self, payload: &Payload, record: &Record) -> Option<String> {
        let from_payload = payload.profile_hint().and_then(|hint| self.profiles.resolve(hint).ok());
        let from_record = || {
            record
                .get(AT_ID_PROP)
                .and_then(Value::as_str)
                .and_then(|id| self.profiles.resolve(id).ok())
        };
        from_payload.or_else(from_record).map(|profile| profile.id.clone())
    }

    /// Post-submission actions never fail the submission
    async fn run_post_submit(&self, method: Method, record_id: &str, profile_id: &str) {
        for action in self.post_submit.actions_for(method) {
            match action {
                PostSubmitAction::CloudUpload => {
                    if profile_id != FILE_PROFILE_ID {
                        continue;
                    }
                    if let Err(e) = self.upload_submitted_file(record_id).await {
                        error!(record_id, error = %e, "Upload after create failed");
                    }
                }
            }
        }
    }

    async fn upload_submitted_file(&self, record_id: &str) -> Result<()> {
        let record = self.get_record(record_id).await?;
        let Some(file_name) = non_empty_str(record.get(SUBMITTED_FILE_PROP)) else {
            return Ok(());
        };
        self.upload_file(record_id, Some(Path::new(file_name))).await?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Cloud upload
    // ------------------------------------------------------------------------

    /// Upload credentials stored on a file record, if any
    pub fn extract_upload_credentials(record: &Record) -> Option<UploadCredentials> {
        let creds = record.get(UPLOAD_CREDENTIALS_PROP)?;
        serde_json::from_value(creds.clone()).ok()
    }

    /// Credentials from the record, regenerated when absent or expired
    pub async fn upload_credentials(&self, file_id: &str) -> Result<Option<UploadCredentials>> {
        let record = self.get_record(file_id).await?;
        match Self::extract_upload_credentials(&record) {
            Some(creds) if !creds.is_expired() => return Ok(Some(creds)),
            Some(creds) => {
                info!(file_id, expiration = ?creds.expiration, "Upload credentials expired; requesting new ones");
            }
            None => {}
        }
        self.regenerate_upload_credentials(file_id).await
    }

    /// Ask the Portal to reissue upload credentials
    ///
    /// A refusal (e.g. 403 once the file is no longer `uploading`) is logged
    /// and yields `None`.
    #[instrument(level = "debug", skip(self))]
    pub async fn regenerate_upload_credentials(&self, file_id: &str) -> Result<Option<UploadCredentials>> {
        let url = endpoints::upload_credentials_url(self.base_url(), file_id)?;
        debug!(url = %url, "Requesting new upload credentials");

        let response = self.client.post(&url, &json!({})).await?;
        if !response.is_success() {
            error!(
                file_id,
                status = response.status.as_u16(),
                "Unable to reissue upload credentials for {}",
                file_id
            );
            return Ok(None);
        }

        let creds = response
            .graph_record()
            .ok()
            .and_then(|record| Self::extract_upload_credentials(&record));
        if creds.is_none() {
            error!(file_id, "Reissue response for {} carries no upload credentials", file_id);
        }
        Ok(creds)
    }

    /// Upload the content of a file record
    ///
    /// Without `path` the record's `submitted_file_name` is used. When no
    /// credentials can be obtained the upload is abandoned and logged; a
    /// failed transfer is an error.
    #[instrument(level = "debug", skip(self))]
    pub async fn upload_file(&self, file_id: &str, path: Option<&Path>) -> Result<UploadOutcome> {
        let Some(creds) = self.upload_credentials(file_id).await? else {
            error!(file_id, "Cannot upload file for {} since upload credentials could not be generated", file_id);
            return Ok(UploadOutcome::NoCredentials);
        };

        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let record = self.get_record(file_id).await?;
                non_empty_str(record.get(SUBMITTED_FILE_PROP))
                    .map(PathBuf::from)
                    .ok_or_else(|| ClientError::NoFilePath(file_id.to_string()))?
            }
        };

        info!(file_id, path = %path.display(), backend = self.uploader.name(), "Uploading file");
        if let Err(e) = self.uploader.upload(&path, &creds).await {
            error!(file_id, error = %e, "Failed to upload file '{}' for {}", path.display(), file_id);
            return Err(e);
        }
        Ok(UploadOutcome::Uploaded)
    }

    // ------------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------------

    /// Create a `document` record from a local file, returning its UUID
    ///
    /// The document is aliased `<lab>:<file name>`.
    #[instrument(level = "debug", skip(self, description))]
    pub async fn post_document(
        &self,
        document: &Path,
        document_type: &str,
        description: &str,
        download_filename: Option<&str>,
    ) -> Result<String> {
        let lab = self.config.lab.as_deref().ok_or(ClientError::MissingRequiredDefault {
            property: LAB_PROP,
            env_var: LAB_VAR,
        })?;
        let file_name = document
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ClientError::invalid_payload(format!("'{}' has no file name", document.display())))?;
        if guess_mime(&file_name).is_none() {
            return Err(ClientError::UnknownMimeType(file_name));
        }

        let mut attachment = build_attachment(document)?;
        if let (Some(download), Some(fields)) = (download_filename, attachment.as_object_mut()) {
            fields.insert("download".to_string(), Value::String(download.to_string()));
        }

        let mut payload = Payload::new();
        payload.set_profile("document");
        payload.set_aliases(vec![format!("{lab}:{file_name}")]);
        payload.insert("document_type", Value::String(document_type.to_string()));
        payload.insert("description", Value::String(description.to_string()));
        payload.insert(ATTACHMENT_PROP, attachment);

        let record = self.post(payload).await?;
        record
            .get("uuid")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ClientError::unexpected_response(self.base_url(), "document record has no uuid"))
    }

    /// Add a document to a record's `documents`
    ///
    /// Returns `None` when the document was already linked.
    #[instrument(level = "debug", skip(self))]
    pub async fn link_document(&self, record_id: &str, document_id: &str) -> Result<Option<Record>> {
        let document = self.get_record(document_id).await?;
        let document_at_id = document
            .get(AT_ID_PROP)
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::unexpected_response(document_id, "document has no '@id'"))?
            .to_string();

        let record = self.get_record(record_id).await?;
        let mut documents = record
            .get("documents")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let linked = Value::String(document_at_id);
        if documents.contains(&linked) {
            debug!(record_id, document_id, "Document already linked");
            return Ok(None);
        }
        add_to_set(&mut documents, linked);

        let mut payload = Payload::new();
        payload.set_record_id(record_id);
        payload.insert("documents", Value::Array(documents));
        self.patch(payload, PatchOptions::default()).await.map(Some)
    }

    // ------------------------------------------------------------------------
    // Experiment helpers
    // ------------------------------------------------------------------------

    /// A linked record that may be embedded or referenced by identifier
    async fn linked_record(&self, value: Option<&Value>) -> Result<Option<Record>> {
        match value {
            Some(Value::Object(record)) => Ok(Some(record.clone())),
            Some(Value::String(id)) => self.get_record_framed(id, EMBEDDED_FRAME).await.map(Some),
            _ => Ok(None),
        }
    }

    async fn experiment_fastqs(&self, experiment_id: &str) -> Result<Vec<Record>> {
        let experiment = self.get_record_framed(experiment_id, EMBEDDED_FRAME).await?;
        let files = experiment
            .get("original_files")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut fastqs = Vec::new();
        for file in &files {
            let Some(record) = self.linked_record(Some(file)).await? else {
                continue;
            };
            let is_fastq = record.get("file_format").and_then(Value::as_str) == Some("fastq")
                || record.get("file_type").and_then(Value::as_str) == Some("fastq");
            if is_fastq {
                fastqs.push(record);
            }
        }
        Ok(fastqs)
    }

    /// FASTQ files of an experiment grouped by replicate numbers and read number
    #[instrument(level = "debug", skip(self))]
    pub async fn get_fastq_replicate_map(&self, experiment_id: &str) -> Result<FastqReplicateMap> {
        let mut map = FastqReplicateMap::new();

        for file in self.experiment_fastqs(experiment_id).await? {
            let Some(replicate) = self.linked_record(file.get("replicate")).await? else {
                warn!(file = ?primary_id(&file), "FASTQ file has no replicate");
                continue;
            };
            let (Some(bio), Some(tech)) = (
                replicate.get("biological_replicate_number").and_then(Value::as_u64),
                replicate.get("technical_replicate_number").and_then(Value::as_u64),
            ) else {
                warn!(file = ?primary_id(&file), "Replicate has no replicate numbers");
                continue;
            };
            let read = match file.get("paired_end") {
                Some(Value::String(read)) => read.clone(),
                Some(Value::Number(read)) => read.to_string(),
                _ => String::new(),
            };

            map.entry(bio)
                .or_default()
                .entry(tech)
                .or_default()
                .entry(read)
                .or_default()
                .push(file);
        }
        Ok(map)
    }

    /// De-duplicated platform aliases across an experiment's FASTQ files
    #[instrument(level = "debug", skip(self))]
    pub async fn get_platforms_on_experiment(&self, experiment_id: &str) -> Result<Vec<String>> {
        let mut platforms = BTreeSet::new();
        for file in self.experiment_fastqs(experiment_id).await? {
            if let Some(platform) = self.linked_record(file.get("platform")).await? {
                platforms.extend(string_list(platform.get(ALIASES_PROP)));
            }
        }
        Ok(platforms.into_iter().collect())
    }
}

/// Fill `property` from the configured default unless the payload sets it
fn set_default(
    payload: &mut Payload,
    property: &'static str,
    default: Option<&str>,
    env_var: &'static str,
) -> Result<()> {
    if payload.contains_key(property) {
        return Ok(());
    }
    let value = default.ok_or(ClientError::MissingRequiredDefault { property, env_var })?;
    payload.insert(property, Value::String(value.to_string()));
    Ok(())
}

/// Union every list value of the payload with the record's value of the same key
///
/// Record values come first; duplicates are dropped.
pub fn extend_array_values(payload: &mut Record, record: &Record) {
    for (key, value) in payload.iter_mut() {
        let Value::Array(items) = value else {
            continue;
        };
        let mut merged = Vec::new();
        let remote = record.get(key).and_then(Value::as_array).cloned().unwrap_or_default();
        for item in remote.into_iter().chain(items.drain(..)) {
            add_to_set(&mut merged, item);
        }
        *items = merged;
    }
}

/// Drop repeated items from every list value, keeping first occurrences
pub fn dedup_array_values(payload: &mut Record) {
    for value in payload.values_mut() {
        if let Value::Array(items) = value {
            let mut unique = Vec::with_capacity(items.len());
            for item in items.drain(..) {
                add_to_set(&mut unique, item);
            }
            *items = unique;
        }
    }
}

/// Accession, falling back to the UUID for records without one
fn primary_id(record: &Record) -> Option<String> {
    non_empty_str(record.get("accession"))
        .or_else(|| non_empty_str(record.get("uuid")))
        .map(str::to_string)
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}
