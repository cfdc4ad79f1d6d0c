use url::Url;

use super::error::GateError;
use crate::attribution::{AttributionTracker, Classifier};
use crate::gate::{DEFAULT_LOGIN_PATH, DEFAULT_SESSION_KEY, SessionGate};
use crate::navigation::Navigator;
use crate::storage::KeyValueStore;

const DEFAULT_ATTRIBUTION_COOKIE: &str = "__linkbio_attribution";

/// Session gate and attribution settings for the page router.
///
/// Use [`from_env()`](GateConfig::from_env) for convention-based setup, or
/// [`new()`](GateConfig::new) with `with_*` methods for full control.
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub(super) session_cookie_name: String,
    pub(super) login_path: String,
    pub(super) attribution_cookie_name: String,
    pub(super) public_origin: Option<Url>,
    pub(super) return_to: bool,
    pub(super) secure_cookies: bool,
    pub(super) classifier: Classifier,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: DEFAULT_SESSION_KEY.into(),
            login_path: DEFAULT_LOGIN_PATH.into(),
            attribution_cookie_name: DEFAULT_ATTRIBUTION_COOKIE.into(),
            public_origin: None,
            return_to: false,
            secure_cookies: true,
            classifier: Classifier::default(),
        }
    }
}

impl GateConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from environment variables.
    ///
    /// # Optional env vars
    /// - `LINKBIO_SESSION_COOKIE`: cookie the login flow stores the user ID in
    /// - `LINKBIO_LOGIN_PATH`: strict-gate redirect target (must start with `/`)
    /// - `LINKBIO_ATTRIBUTION_COOKIE`: session cookie holding the attribution record
    /// - `LINKBIO_PUBLIC_ORIGIN`: public site origin, e.g. `https://bio.example`
    /// - `LINKBIO_RETURN_TO`: `"1"` or `"true"` to add `?next=` to login redirects
    /// - `DEV_AUTH`: `"1"` or `"true"` to disable secure cookies
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Config`] if a value is present but invalid.
    pub fn from_env() -> Result<Self, GateError> {
        let mut config = Self::new();

        if let Ok(name) = std::env::var("LINKBIO_SESSION_COOKIE") {
            config = config.with_session_cookie_name(non_blank("LINKBIO_SESSION_COOKIE", name)?);
        }
        if let Ok(path) = std::env::var("LINKBIO_LOGIN_PATH") {
            if !path.starts_with('/') {
                return Err(GateError::Config(format!(
                    "LINKBIO_LOGIN_PATH must be an absolute path, got '{path}'"
                )));
            }
            config = config.with_login_path(path);
        }
        if let Ok(name) = std::env::var("LINKBIO_ATTRIBUTION_COOKIE") {
            config =
                config.with_attribution_cookie_name(non_blank("LINKBIO_ATTRIBUTION_COOKIE", name)?);
        }
        if let Ok(origin) = std::env::var("LINKBIO_PUBLIC_ORIGIN") {
            let url: Url = origin
                .parse()
                .map_err(|e| GateError::Config(format!("LINKBIO_PUBLIC_ORIGIN: {e}")))?;
            config = config.with_public_origin(url);
        }

        let return_to = env_flag("LINKBIO_RETURN_TO");
        let dev_auth = env_flag("DEV_AUTH");

        Ok(config.with_return_to(return_to).with_secure_cookies(!dev_auth))
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.session_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    #[must_use]
    pub fn with_attribution_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.attribution_cookie_name = name.into();
        self
    }

    /// Origin used to rebuild landing URLs and spot same-site referrers.
    /// Without it the `Host` header is used.
    #[must_use]
    pub fn with_public_origin(mut self, origin: Url) -> Self {
        self.public_origin = Some(origin);
        self
    }

    #[must_use]
    pub fn with_return_to(mut self, enabled: bool) -> Self {
        self.return_to = enabled;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Gate for one request. `requested` is the path to return to after
    /// login, used when return-to is enabled.
    pub(super) fn session_gate<S: KeyValueStore, N: Navigator>(
        &self,
        store: S,
        navigator: N,
        requested: &str,
    ) -> SessionGate<S, N> {
        let gate = SessionGate::new(store, navigator)
            .with_session_key(self.session_cookie_name.clone())
            .with_login_path(self.login_path.clone());
        if self.return_to {
            gate.with_return_to(requested)
        } else {
            gate
        }
    }

    pub(super) fn attribution_tracker<S: KeyValueStore>(&self, store: S) -> AttributionTracker<S> {
        AttributionTracker::new(store)
            .with_storage_key(self.attribution_cookie_name.clone())
            .with_classifier(self.classifier.clone())
    }
}

fn env_flag(key: &str) -> bool {
    matches!(std::env::var(key).as_deref(), Ok("1") | Ok("true"))
}

fn non_blank(key: &str, value: String) -> Result<String, GateError> {
    if value.trim().is_empty() {
        return Err(GateError::Config(format!("{key} is set but empty")));
    }
    Ok(value)
}
