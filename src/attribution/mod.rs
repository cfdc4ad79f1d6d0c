//! First-touch traffic attribution.
//!
//! The first page load of a browsing session classifies the visit and
//! persists an [`AttributionRecord`]; every later load in that session gets
//! the same record back.

mod classify;
mod record;
mod utm;

use std::sync::{Arc, Mutex};

use time::OffsetDateTime;

pub use classify::{Classification, Classifier, medium_type};
pub use record::{AttributionRecord, Landing, TrafficType};
pub use utm::{ClickId, UtmParams};

use crate::storage::KeyValueStore;

/// Session-scoped storage key of the persisted record.
pub const DEFAULT_ATTRIBUTION_KEY: &str = "session_attribution";

/// Longest referrer kept in a record, in bytes.
pub const MAX_REFERRER_LEN: usize = 1024;

type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

/// Captures attribution once per browsing session.
///
/// `store` should be session-scoped (cleared when the browsing session
/// ends); the tracker itself never expires a record.
pub struct AttributionTracker<S> {
    store: S,
    storage_key: String,
    classifier: Classifier,
    clock: Clock,
    // Set only while the store has refused to persist the record.
    held: Mutex<Option<AttributionRecord>>,
}

impl<S: KeyValueStore> AttributionTracker<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            storage_key: DEFAULT_ATTRIBUTION_KEY.into(),
            classifier: Classifier::default(),
            clock: Arc::new(OffsetDateTime::now_utc),
            held: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> OffsetDateTime + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Return this session's record, capturing it from `landing` if none
    /// exists yet.
    ///
    /// Never fails: unreadable or malformed storage counts as "no record",
    /// and a failed write leaves the record held only by this tracker.
    pub fn initialize_session_tracking(&self, landing: &Landing) -> AttributionRecord {
        if let Some(record) = self.current() {
            return record;
        }

        let record = self.capture(landing);
        if self.persist(&record) {
            self.hold(None);
        } else {
            self.hold(Some(&record));
        }
        record
    }

    /// Read the record without capturing. Repeated reads have no effect on
    /// storage.
    ///
    /// The store is consulted first; a record this tracker failed to persist
    /// is returned only when the store has none.
    #[must_use]
    pub fn current(&self) -> Option<AttributionRecord> {
        self.load().or_else(|| self.held())
    }

    /// Forget the record so the next page load captures a fresh one.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the persisted record could not be removed.
    pub fn reset(&self) -> Result<(), crate::Error> {
        self.hold(None);
        self.store.remove(&self.storage_key)
    }

    fn capture(&self, landing: &Landing) -> AttributionRecord {
        let Classification {
            source,
            medium,
            campaign,
            content,
            term,
            traffic_type,
        } = self.classifier.classify(landing);

        let record = AttributionRecord {
            source,
            medium,
            campaign,
            content,
            term,
            traffic_type,
            referrer: cap_referrer(&landing.referrer),
            landing_page: landing.path().to_owned(),
            landing_time: truncate_to_millis((self.clock)()),
        };

        tracing::info!(
            source = %record.source,
            medium = %record.medium,
            traffic_type = %record.traffic_type,
            landing_page = %record.landing_page,
            "Attribution captured"
        );
        record
    }

    fn load(&self) -> Option<AttributionRecord> {
        let raw = match self.store.get(&self.storage_key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::debug!(error = %e, "Attribution unreadable, treating as absent");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "Stored attribution is malformed, recapturing");
                None
            }
        }
    }

    fn persist(&self, record: &AttributionRecord) -> bool {
        let result = serde_json::to_string(record)
            .map_err(|e| crate::Error::StorageWrite(e.to_string()))
            .and_then(|json| self.store.set(&self.storage_key, &json));

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Attribution persist failed, keeping it for this page only");
                false
            }
        }
    }

    fn held(&self) -> Option<AttributionRecord> {
        self.held.lock().ok().and_then(|held| held.clone())
    }

    fn hold(&self, record: Option<&AttributionRecord>) {
        if let Ok(mut held) = self.held.lock() {
            *held = record.cloned();
        }
    }
}

fn cap_referrer(referrer: &str) -> String {
    if referrer.len() <= MAX_REFERRER_LEN {
        return referrer.to_owned();
    }
    let mut end = MAX_REFERRER_LEN;
    while !referrer.is_char_boundary(end) {
        end -= 1;
    }
    referrer[..end].to_owned()
}

// Millisecond precision, so the RFC 3339 text reads back as the same value.
fn truncate_to_millis(t: OffsetDateTime) -> OffsetDateTime {
    t.replace_nanosecond(u32::from(t.millisecond()) * 1_000_000)
        .unwrap_or(t)
}
