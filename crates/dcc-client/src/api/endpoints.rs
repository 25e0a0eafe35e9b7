//! Portal endpoint URL builders

use crate::error::{ClientError, Result};
use std::collections::BTreeMap;
use url::Url;

/// Query string every record lookup carries, so reads bypass the search index.
pub const RECORD_QUERY: &str = "format=json&datastore=database";

/// Strip whitespace and surrounding slashes from a record identifier
pub fn trim_id(id: &str) -> &str {
    id.trim().trim_matches('/')
}

/// Build the lookup URL of a record from any of its identifiers
///
/// The identifier is percent-encoded segment by segment, so `#` or `?` in an
/// alias can't leak into the query.
pub fn record_url(base_url: &str, id: &str, frame: Option<&str>) -> Result<String> {
    let mut url = portal_url(base_url, trim_id(id), true)?;
    url.set_query(Some(RECORD_QUERY));

    if let Some(frame) = frame {
        url.query_pairs_mut().append_pair("frame", frame);
    }

    Ok(url.into())
}

/// Build the PATCH URL of a record
pub fn patch_url(base_url: &str, id: &str) -> Result<String> {
    portal_url(base_url, trim_id(id), false).map(String::from)
}

/// Build the collection URL a new record of a profile is POSTed to
pub fn collection_url(base_url: &str, profile_id: &str) -> String {
    format!("{}/{}", base_url, profile_id)
}

/// Build the profiles (schemas) listing URL
pub fn profiles_url(base_url: &str) -> String {
    format!("{}/profiles/?format=json", base_url)
}

/// Build the URL that reissues upload credentials for a file record
pub fn upload_credentials_url(base_url: &str, file_id: &str) -> Result<String> {
    let path = format!("files/{}/upload", trim_id(file_id));
    portal_url(base_url, &path, false).map(String::from)
}

/// `base_url` extended by the `/`-separated segments of `path`, each one
/// percent-encoded
fn portal_url(base_url: &str, path: &str, trailing_slash: bool) -> Result<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ClientError::config(format!("Invalid Portal URL '{base_url}': {e}")))?;

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| ClientError::config(format!("Portal URL '{base_url}' can't take a path")))?;
        segments
            .pop_if_empty()
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        if trailing_slash {
            segments.push("");
        }
    }

    Ok(url)
}

/// Build a search URL from query arguments
///
/// Arguments are sorted by key and form-urlencoded. `limit` is `all` unless
/// a number is given.
pub fn search_url(base_url: &str, args: &BTreeMap<String, String>, limit: Option<u32>) -> String {
    let limit = limit.map_or_else(|| "all".to_string(), |l| l.to_string());

    let mut pairs: Vec<(&str, &str)> = args
        .iter()
        .filter(|(key, _)| key.as_str() != "limit")
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    pairs.push(("limit", limit.as_str()));
    pairs.sort_by(|a, b| a.0.cmp(b.0));

    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();

    format!("{}/search/?{}", base_url, query)
}
