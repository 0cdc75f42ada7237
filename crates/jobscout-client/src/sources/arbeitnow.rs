use jobscout_core::error::AppError;
use jobscout_core::models::ListingCandidate;
use jobscout_core::traits::SourceFetcher;
use jobscout_core::util::parse_timestamp_value;
use serde_json::Value;

use super::{first_text, present, validate_url, value_as_id};
use crate::cleaner::DescriptionCleaner;
use crate::http::JsonClient;

pub const ARBEITNOW_URL: &str = "https://www.arbeitnow.com/api/job-board-api";
const SOURCE_NAME: &str = "arbeitnow";

/// Arbeitnow job-board API (`{"data": [...]}` envelope).
#[derive(Clone)]
pub struct ArbeitnowSource {
    client: JsonClient,
    cleaner: DescriptionCleaner,
    url: String,
}

impl ArbeitnowSource {
    pub fn new(client: JsonClient, cleaner: DescriptionCleaner) -> Self {
        Self {
            client,
            cleaner,
            url: ARBEITNOW_URL.to_string(),
        }
    }

    /// Point the adapter at a different endpoint (mirrors, local fixtures).
    pub fn with_url(mut self, url: &str) -> Result<Self, AppError> {
        self.url = validate_url(url)?;
        Ok(self)
    }
}

impl SourceFetcher for ArbeitnowSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch(&self, limit: usize) -> Result<Vec<ListingCandidate>, AppError> {
        let body = self.client.get_json(&self.url).await?;
        map_response(&body, limit, &self.cleaner)
    }
}

/// Map the whole response body. A body without a `data` array is empty;
/// a body that is not an object at all is malformed.
pub(crate) fn map_response(
    body: &Value,
    limit: usize,
    cleaner: &DescriptionCleaner,
) -> Result<Vec<ListingCandidate>, AppError> {
    let Some(object) = body.as_object() else {
        return Err(AppError::MalformedResponse(
            "Arbeitnow response is not a JSON object".into(),
        ));
    };
    let Some(items) = object.get("data").and_then(Value::as_array) else {
        tracing::warn!("Arbeitnow response has no data array");
        return Ok(Vec::new());
    };

    let candidates = items
        .iter()
        .take(limit)
        .filter_map(|item| {
            let mapped = map_item(item, cleaner);
            if mapped.is_none() {
                tracing::debug!(item = %item, "Skipping unmappable Arbeitnow item");
            }
            mapped
        })
        .collect();
    Ok(candidates)
}

pub(crate) fn map_item(item: &Value, cleaner: &DescriptionCleaner) -> Option<ListingCandidate> {
    let text = |key: &str| item.get(key).and_then(Value::as_str);

    let source_id = value_as_id(item.get("slug"))
        .or_else(|| value_as_id(item.get("id")))
        .or_else(|| value_as_id(item.get("url")))?;
    let title = first_text([text("title")]).unwrap_or_default();
    let url = first_text([text("url")]).unwrap_or_default();

    let published_at = present(item.get("created_at"))
        .or_else(|| present(item.get("date")))
        .and_then(parse_timestamp_value);

    Some(ListingCandidate {
        source: SOURCE_NAME.to_string(),
        source_id,
        title,
        company: first_text([text("company_name")]).unwrap_or_default(),
        url,
        location: first_text([text("location")]),
        remote: Some(item.get("remote").and_then(Value::as_bool).unwrap_or(false)),
        description: text("description").map(|d| cleaner.clean(d)),
        published_at,
    })
}
