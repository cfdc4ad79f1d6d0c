use url::Url;

use super::record::{Landing, TrafficType};
use super::utm::{ClickId, UtmParams};

const SEARCH_ENGINES: &[&str] = &[
    "google",
    "bing",
    "duckduckgo",
    "yahoo",
    "baidu",
    "yandex",
    "ecosia",
    "naver",
];

const SOCIAL_DOMAINS: &[(&str, &str)] = &[
    ("facebook", "facebook.com"),
    ("facebook", "fb.com"),
    ("facebook", "fb.me"),
    ("instagram", "instagram.com"),
    ("x", "x.com"),
    ("twitter", "twitter.com"),
    ("twitter", "t.co"),
    ("linkedin", "linkedin.com"),
    ("linkedin", "lnkd.in"),
    ("tiktok", "tiktok.com"),
    ("youtube", "youtube.com"),
    ("youtube", "youtu.be"),
    ("reddit", "reddit.com"),
    ("pinterest", "pinterest.com"),
    ("threads", "threads.net"),
    ("snapchat", "snapchat.com"),
];

/// Classification fields of an [`AttributionRecord`](super::AttributionRecord).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub source: String,
    pub medium: String,
    pub campaign: String,
    pub content: String,
    pub term: String,
    pub traffic_type: TrafficType,
}

impl Classification {
    fn new(source: impl Into<String>, medium: impl Into<String>, traffic_type: TrafficType) -> Self {
        Self {
            source: source.into(),
            medium: medium.into(),
            traffic_type,
            ..Self::default()
        }
    }

    fn direct() -> Self {
        Self::new("direct", "none", TrafficType::Direct)
    }
}

/// Decides where a visit came from.
///
/// Precedence: UTM tags, then ad click identifiers, then the referrer.
#[derive(Debug, Clone)]
pub struct Classifier {
    search_engines: Vec<String>,
    social_domains: Vec<(String, String)>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            search_engines: SEARCH_ENGINES.iter().map(|s| (*s).to_owned()).collect(),
            social_domains: SOCIAL_DOMAINS
                .iter()
                .map(|(source, domain)| ((*source).to_owned(), (*domain).to_owned()))
                .collect(),
        }
    }
}

impl Classifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recognize another search engine by the brand label in its host
    /// (`"kagi"` matches `kagi.com`, `www.kagi.co.uk`).
    #[must_use]
    pub fn with_search_engine(mut self, brand: impl Into<String>) -> Self {
        self.search_engines.push(brand.into().to_ascii_lowercase());
        self
    }

    /// Recognize another social network by domain, reported as `source`.
    #[must_use]
    pub fn with_social_domain(mut self, source: impl Into<String>, domain: impl Into<String>) -> Self {
        self.social_domains
            .push((source.into(), domain.into().to_ascii_lowercase()));
        self
    }

    #[must_use]
    pub fn classify(&self, landing: &Landing) -> Classification {
        if let Some(url) = &landing.url {
            let utm = UtmParams::from_url(url);
            if !utm.is_empty() {
                return from_utm(utm);
            }
            if let Some(click) = ClickId::from_url(url) {
                return Classification::new(click.source(), "cpc", TrafficType::Paid);
            }
        }
        self.from_referrer(landing)
    }

    fn from_referrer(&self, landing: &Landing) -> Classification {
        let referrer = landing.referrer.trim();
        if referrer.is_empty() {
            return Classification::direct();
        }

        let Some(host) = Url::parse(referrer)
            .ok()
            .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
        else {
            return Classification::new(referrer, "referral", TrafficType::Referral);
        };
        let host = strip_www(&host);

        let landing_host = landing.url.as_ref().and_then(Url::host_str);
        if landing_host.is_some_and(|own| strip_www(own).eq_ignore_ascii_case(host)) {
            return Classification::direct();
        }

        if let Some((source, _)) = self
            .social_domains
            .iter()
            .find(|(_, domain)| domain_matches(host, domain))
        {
            return Classification::new(source.clone(), "social", TrafficType::Social);
        }

        if let Some(engine) = self
            .search_engines
            .iter()
            .find(|brand| has_brand_label(host, brand))
        {
            return Classification::new(engine.clone(), "organic", TrafficType::Organic);
        }

        Classification::new(host, "referral", TrafficType::Referral)
    }
}

/// Bucket for a UTM medium value.
#[must_use]
pub fn medium_type(medium: &str) -> TrafficType {
    match medium.trim().to_ascii_lowercase().as_str() {
        "cpc" | "ppc" | "paid" | "paidsearch" | "paid_search" | "paid-social" | "paid_social"
        | "cpm" | "cpv" | "display" | "banner" => TrafficType::Paid,
        "email" | "e-mail" | "newsletter" => TrafficType::Email,
        "social" | "social-media" | "social_media" | "social-network" | "social_network"
        | "sm" => TrafficType::Social,
        "organic" => TrafficType::Organic,
        "referral" => TrafficType::Referral,
        _ => TrafficType::Campaign,
    }
}

fn from_utm(utm: UtmParams) -> Classification {
    let traffic_type = utm
        .medium
        .as_deref()
        .map_or(TrafficType::Campaign, medium_type);
    Classification {
        source: utm.source.unwrap_or_default(),
        medium: utm.medium.unwrap_or_default(),
        campaign: utm.campaign.unwrap_or_default(),
        content: utm.content.unwrap_or_default(),
        term: utm.term.unwrap_or_default(),
        traffic_type,
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

fn domain_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

// Any label except the TLD, so "google" matches google.com and google.co.uk
// but not googleusercontent.com.
fn has_brand_label(host: &str, brand: &str) -> bool {
    let labels: Vec<&str> = host.split('.').collect();
    labels.len() > 1 && labels[..labels.len() - 1].iter().any(|label| *label == brand)
}
