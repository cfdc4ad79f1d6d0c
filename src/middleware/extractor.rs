use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;

use super::config::GateConfig;
use super::cookies::CookieStore;
use super::error::GateError;
use crate::attribution::AttributionRecord;
use crate::navigation::DeferredNavigator;
use crate::page::{MountState, PageMount};
use crate::types::{GateMode, SessionResult, UserId};

/// Strict gate as an extractor.
///
/// Rejects with a redirect to the login path when the request carries no
/// session cookie, so the handler body (the protected content) never runs.
///
/// # Example
///
/// ```rust,ignore
/// async fn checkout(RequireSession(user_id): RequireSession) -> impl IntoResponse {
///     format!("Checkout for {user_id}")
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireSession(pub UserId);

impl<S> FromRequestParts<S> for RequireSession
where
    GateConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = GateConfig::from_ref(state);
        let store = CookieStore::plain(CookieJar::from_headers(&parts.headers), config.secure_cookies);
        let navigator = DeferredNavigator::new();
        let requested = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());
        let gate = config.session_gate(&store, &navigator, requested);

        let mut mount = PageMount::new(GateMode::Strict);
        match mount.run(&gate) {
            MountState::Authenticated(user_id) => Ok(Self(user_id.clone())),
            _ => match navigator.take() {
                Some(location) => Err(GateError::Unauthenticated { location }),
                None => Err(GateError::NavigationFailed),
            },
        }
    }
}

/// Tolerant gate as an extractor. Never rejects.
///
/// ```rust,ignore
/// async fn nav(PeekSession(session): PeekSession) -> impl IntoResponse {
///     if session.is_authenticated() { "Dashboard" } else { "Log in" }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PeekSession(pub SessionResult);

impl<S> FromRequestParts<S> for PeekSession
where
    GateConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = GateConfig::from_ref(state);
        let store = CookieStore::plain(CookieJar::from_headers(&parts.headers), config.secure_cookies);
        let navigator = DeferredNavigator::new();
        let gate = config.session_gate(&store, &navigator, "/");

        let mut mount = PageMount::new(GateMode::Tolerant);
        let result = match mount.run(&gate) {
            MountState::Authenticated(user_id) => SessionResult::Authenticated {
                user_id: user_id.clone(),
            },
            _ => SessionResult::Unauthenticated,
        };
        Ok(Self(result))
    }
}

/// The record captured by [`track_attribution`](super::track_attribution).
#[derive(Debug, Clone)]
pub struct Attribution(pub AttributionRecord);

impl<S: Send + Sync> FromRequestParts<S> for Attribution {
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AttributionRecord>()
            .cloned()
            .map(Self)
            .ok_or_else(|| GateError::Config("track_attribution layer is not installed".into()))
    }
}
