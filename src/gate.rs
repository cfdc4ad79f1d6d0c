use crate::navigation::Navigator;
use crate::storage::KeyValueStore;
use crate::types::{GateMode, SessionResult, UserId};

/// Storage key the login flow writes the user ID under.
pub const DEFAULT_SESSION_KEY: &str = "session_user";
/// Where the strict gate sends visitors without a session.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Resolves whether a usable local session exists.
///
/// The gate only reads: it never writes or clears the session key. Every
/// call re-reads storage, there is no cache across calls.
///
/// ```rust,ignore
/// let gate = SessionGate::new(&store, &navigator);
///
/// // checkout, customize: hard gate
/// let SessionResult::Authenticated { user_id } = gate.require_session() else {
///     return PageView::Nothing;
/// };
///
/// // shared layout: vary the nav bar, never evict
/// let logged_in = gate.peek_session().is_authenticated();
/// ```
#[derive(Debug, Clone)]
pub struct SessionGate<S, N> {
    store: S,
    navigator: N,
    session_key: String,
    login_path: String,
    return_to: Option<String>,
}

impl<S: KeyValueStore, N: Navigator> SessionGate<S, N> {
    #[must_use]
    pub fn new(store: S, navigator: N) -> Self {
        Self {
            store,
            navigator,
            session_key: DEFAULT_SESSION_KEY.into(),
            login_path: DEFAULT_LOGIN_PATH.into(),
            return_to: None,
        }
    }

    #[must_use]
    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }

    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Append `?next=<path>` to the login redirect so the login flow can
    /// send the visitor back.
    #[must_use]
    pub fn with_return_to(mut self, path: impl Into<String>) -> Self {
        self.return_to = Some(path.into());
        self
    }

    /// Check for a session, redirecting to the login page in strict mode.
    ///
    /// In strict mode the navigation does not halt the caller: a page must
    /// still treat `Unauthenticated` as "render nothing".
    pub fn check(&self, mode: GateMode) -> SessionResult {
        if let Some(user_id) = self.read_user_id() {
            return SessionResult::Authenticated { user_id };
        }

        if mode == GateMode::Strict {
            let target = self.login_target();
            if let Err(e) = self.navigator.navigate(&target) {
                tracing::error!(error = %e, target = %target, "Login redirect failed");
            }
        }

        SessionResult::Unauthenticated
    }

    /// Strict gate: redirects to the login page when there is no session.
    pub fn require_session(&self) -> SessionResult {
        self.check(GateMode::Strict)
    }

    /// Tolerant gate: reports the session state with no side effects.
    pub fn peek_session(&self) -> SessionResult {
        self.check(GateMode::Tolerant)
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    fn read_user_id(&self) -> Option<UserId> {
        let raw = match self.store.get(&self.session_key) {
            Ok(value) => value?,
            Err(e) => {
                tracing::debug!(error = %e, key = %self.session_key, "Session unreadable, treating as absent");
                return None;
            }
        };

        if raw.is_empty() {
            return None;
        }
        Some(UserId(raw))
    }

    fn login_target(&self) -> String {
        match &self.return_to {
            Some(path) => format!("{}?next={}", self.login_path, urlencoding::encode(path)),
            None => self.login_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::navigation::DeferredNavigator;
    use crate::storage::MemoryStore;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, Error> {
            Err(Error::StorageRead("storage disabled".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), Error> {
            Err(Error::StorageWrite("storage disabled".into()))
        }

        fn remove(&self, _key: &str) -> Result<(), Error> {
            Err(Error::StorageWrite("storage disabled".into()))
        }
    }

    struct RefusingNavigator;

    impl Navigator for RefusingNavigator {
        fn navigate(&self, _path: &str) -> Result<(), Error> {
            Err(Error::Navigation("no window".into()))
        }
    }

    fn absent_stores() -> Vec<MemoryStore> {
        vec![
            MemoryStore::new(),
            MemoryStore::new().with_entry(DEFAULT_SESSION_KEY, ""),
            MemoryStore::new().with_entry("other_key", "abc123"),
        ]
    }

    #[test]
    fn present_session_is_authenticated_in_tolerant_mode() {
        let store = MemoryStore::new().with_entry("session_user", "abc123");
        let nav = DeferredNavigator::new();
        let gate = SessionGate::new(&store, &nav);

        assert_eq!(
            gate.check(GateMode::Tolerant),
            SessionResult::Authenticated {
                user_id: UserId::from("abc123")
            }
        );
        assert!(nav.requested().is_empty());
    }

    #[test]
    fn present_session_never_navigates_in_either_mode() {
        for id in ["abc123", "u", "0000-ffff"] {
            let store = MemoryStore::new().with_entry(DEFAULT_SESSION_KEY, id);
            let nav = DeferredNavigator::new();
            let gate = SessionGate::new(&store, &nav);

            let expected = SessionResult::Authenticated {
                user_id: UserId::from(id),
            };
            assert_eq!(gate.require_session(), expected);
            assert_eq!(gate.peek_session(), expected);
            assert!(nav.requested().is_empty(), "navigated for {id}");
        }
    }

    #[test]
    fn stored_id_is_returned_verbatim() {
        for id in ["   ", " abc123 "] {
            let store = MemoryStore::new().with_entry(DEFAULT_SESSION_KEY, id);
            let nav = DeferredNavigator::new();
            let gate = SessionGate::new(&store, &nav);

            let expected = SessionResult::Authenticated {
                user_id: UserId::from(id),
            };
            assert_eq!(gate.peek_session(), expected);
            assert_eq!(gate.require_session(), expected);
            assert!(nav.requested().is_empty(), "navigated for {id:?}");
        }
    }

    #[test]
    fn strict_absent_session_navigates_exactly_once() {
        for store in absent_stores() {
            let nav = DeferredNavigator::new();
            let gate = SessionGate::new(&store, &nav);

            assert_eq!(gate.require_session(), SessionResult::Unauthenticated);
            assert_eq!(nav.requested(), vec!["/login".to_string()]);
        }
    }

    #[test]
    fn tolerant_absent_session_never_navigates() {
        for store in absent_stores() {
            let nav = DeferredNavigator::new();
            let gate = SessionGate::new(&store, &nav);

            assert_eq!(gate.peek_session(), SessionResult::Unauthenticated);
            assert!(nav.requested().is_empty());
        }
    }

    #[test]
    fn unreadable_storage_degrades_to_unauthenticated() {
        let nav = DeferredNavigator::new();
        let gate = SessionGate::new(BrokenStore, &nav);

        assert_eq!(gate.peek_session(), SessionResult::Unauthenticated);
        assert!(nav.requested().is_empty());
        assert_eq!(gate.require_session(), SessionResult::Unauthenticated);
        assert_eq!(nav.requested(), vec!["/login".to_string()]);
    }

    #[test]
    fn navigation_failure_is_swallowed() {
        let store = MemoryStore::new();
        let gate = SessionGate::new(&store, RefusingNavigator);
        assert_eq!(gate.require_session(), SessionResult::Unauthenticated);
    }

    #[test]
    fn custom_key_login_path_and_return_to() {
        let store = MemoryStore::new().with_entry("session_user", "abc123");
        let nav = DeferredNavigator::new();
        let gate = SessionGate::new(&store, &nav)
            .with_session_key("uid")
            .with_login_path("/signin")
            .with_return_to("/checkout?plan=pro");

        assert_eq!(gate.require_session(), SessionResult::Unauthenticated);
        assert_eq!(
            nav.take().as_deref(),
            Some("/signin?next=%2Fcheckout%3Fplan%3Dpro")
        );
    }

    #[test]
    fn every_check_rereads_storage() {
        let store = MemoryStore::new();
        let nav = DeferredNavigator::new();
        let gate = SessionGate::new(&store, &nav);

        assert!(!gate.peek_session().is_authenticated());
        store.set(DEFAULT_SESSION_KEY, "abc123").unwrap();
        assert!(gate.peek_session().is_authenticated());
        store.remove(DEFAULT_SESSION_KEY).unwrap();
        assert!(!gate.peek_session().is_authenticated());
    }
}
