use derive_more::Display;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

/// Coarse bucket for how a visitor arrived.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficType {
    #[default]
    #[display("direct")]
    Direct,
    #[display("organic")]
    Organic,
    #[display("paid")]
    Paid,
    #[display("social")]
    Social,
    #[display("email")]
    Email,
    #[display("referral")]
    Referral,
    /// Tagged with UTM parameters whose medium maps to no other bucket.
    #[display("campaign")]
    Campaign,
}

/// First-touch attribution for one browsing session.
///
/// Fixed shape: every field is present, blank when unknown. Persisted as
/// camelCase JSON with `landingTime` in RFC 3339.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributionRecord {
    pub source: String,
    pub medium: String,
    pub campaign: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub term: String,
    #[serde(rename = "type")]
    pub traffic_type: TrafficType,
    pub referrer: String,
    pub landing_page: String,
    #[serde(with = "time::serde::rfc3339")]
    pub landing_time: OffsetDateTime,
}

/// What the tracker sees of the first page load: its URL and the document
/// referrer. Either may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Landing {
    pub url: Option<Url>,
    pub referrer: String,
}

impl Landing {
    #[must_use]
    pub fn new(url: Option<Url>, referrer: impl Into<String>) -> Self {
        Self {
            url,
            referrer: referrer.into(),
        }
    }

    /// Build from raw strings; an unparseable URL is treated as missing.
    #[must_use]
    pub fn parse(url: &str, referrer: &str) -> Self {
        Self::new(Url::parse(url).ok(), referrer.trim())
    }

    /// Path of the landing URL, `""` when unknown.
    #[must_use]
    pub fn path(&self) -> &str {
        self.url.as_ref().map_or("", Url::path)
    }
}
