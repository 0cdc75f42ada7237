use jobscout_core::error::AppError;
use jobscout_core::models::ListingCandidate;
use jobscout_core::traits::SourceFetcher;
use jobscout_core::util::parse_timestamp_value;
use serde_json::Value;

use super::{first_text, present, validate_url, value_as_id};
use crate::cleaner::DescriptionCleaner;
use crate::http::JsonClient;

pub const REMOTEOK_URL: &str = "https://remoteok.com/api";
const SOURCE_NAME: &str = "remoteok";

/// RemoteOK public API. The payload is a bare array whose first element is
/// a legal/metadata notice rather than a posting.
#[derive(Clone)]
pub struct RemoteOkSource {
    client: JsonClient,
    cleaner: DescriptionCleaner,
    url: String,
}

impl RemoteOkSource {
    pub fn new(client: JsonClient, cleaner: DescriptionCleaner) -> Self {
        Self {
            client,
            cleaner,
            url: REMOTEOK_URL.to_string(),
        }
    }

    pub fn with_url(mut self, url: &str) -> Result<Self, AppError> {
        self.url = validate_url(url)?;
        Ok(self)
    }
}

impl SourceFetcher for RemoteOkSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch(&self, limit: usize) -> Result<Vec<ListingCandidate>, AppError> {
        let body = self.client.get_json(&self.url).await?;
        map_response(&body, limit, &self.cleaner)
    }
}

/// Map the response array, stopping once `limit` postings are collected.
pub(crate) fn map_response(
    body: &Value,
    limit: usize,
    cleaner: &DescriptionCleaner,
) -> Result<Vec<ListingCandidate>, AppError> {
    let Some(items) = body.as_array() else {
        return Err(AppError::MalformedResponse(
            "RemoteOK response is not a JSON array".into(),
        ));
    };

    let mut candidates = Vec::new();
    for item in items {
        if candidates.len() >= limit {
            break;
        }
        // Metadata entries carry no id.
        if !item.is_object() || item.get("id").is_none() {
            continue;
        }
        match map_item(item, cleaner) {
            Some(candidate) => candidates.push(candidate),
            None => tracing::debug!(item = %item, "Skipping unmappable RemoteOK item"),
        }
    }
    Ok(candidates)
}

pub(crate) fn map_item(item: &Value, cleaner: &DescriptionCleaner) -> Option<ListingCandidate> {
    let text = |key: &str| item.get(key).and_then(Value::as_str);

    let source_id = value_as_id(item.get("id"))?;
    let title = first_text([text("position"), text("title")]).unwrap_or_default();
    let url = first_text([text("url"), text("apply_url")]).unwrap_or_default();

    Some(ListingCandidate {
        source: SOURCE_NAME.to_string(),
        source_id,
        title,
        company: first_text([text("company")]).unwrap_or_default(),
        url,
        location: first_text([text("location")]),
        remote: Some(true),
        description: Some(text("description").map(|d| cleaner.clean(d)).unwrap_or_default()),
        published_at: present(item.get("date")).and_then(parse_timestamp_value),
    })
}
