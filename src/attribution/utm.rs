use url::Url;

/// Recognized campaign-tagging query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtmParams {
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub content: Option<String>,
    pub term: Option<String>,
}

impl UtmParams {
    /// Read `utm_source`, `utm_medium`, `utm_campaign`, `utm_content` and
    /// `utm_term` from the query string. The first non-blank occurrence of
    /// each wins.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            let slot = match &*key {
                "utm_source" => &mut params.source,
                "utm_medium" => &mut params.medium,
                "utm_campaign" => &mut params.campaign,
                "utm_content" => &mut params.content,
                "utm_term" => &mut params.term,
                _ => continue,
            };
            let value = value.trim();
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value.to_owned());
            }
        }
        params
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.medium.is_none()
            && self.campaign.is_none()
            && self.content.is_none()
            && self.term.is_none()
    }
}

/// Ad-platform click identifiers that imply paid traffic when no UTM tags
/// are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickId {
    Google,
    Microsoft,
}

impl ClickId {
    #[must_use]
    pub fn from_url(url: &Url) -> Option<Self> {
        url.query_pairs().find_map(|(key, value)| {
            if value.trim().is_empty() {
                return None;
            }
            match &*key {
                "gclid" | "gbraid" | "wbraid" => Some(Self::Google),
                "msclkid" => Some(Self::Microsoft),
                _ => None,
            }
        })
    }

    #[must_use]
    pub fn source(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Microsoft => "bing",
        }
    }
}
